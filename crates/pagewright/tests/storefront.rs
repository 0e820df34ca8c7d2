//! End-to-end scenarios against the scripted storefront.

mod common;

use common::*;
use pagewright::{
    HomePage, LoginPage, PageObject, PagewrightError, ProductsPage, RegisterData, RegisterPage,
    RegistrationStage, Title,
};

mod login_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_login_from_home_page() {
        let session = session();
        let home = HomePage::new(&session);
        home.goto().await.unwrap();
        home.wait_until_loaded().await.unwrap();
        assert!(!home.is_logged_in().await.unwrap());

        home.click_login_link().await.unwrap();
        let login = LoginPage::new(&session);
        assert!(login.is_current().await.unwrap());
        login.login(EMAIL, PASSWORD).await.unwrap();

        assert!(home.is_current().await.unwrap());
        assert!(home.is_logged_in().await.unwrap());
        assert!(login.is_logged_in().await.unwrap());
        assert_eq!(home.get_logged_in_username().await.unwrap(), USERNAME);
    }

    #[tokio::test]
    async fn test_wrong_password_shows_error() {
        let session = session();
        let login = LoginPage::new(&session);
        login.goto().await.unwrap();
        login.login(EMAIL, "wrong").await.unwrap();

        assert!(!login.is_logged_in().await.unwrap());
        assert_eq!(login.get_error_message().await.unwrap(), LOGIN_ERROR);
        assert_eq!(login.get_error_message().await.unwrap(), LOGIN_ERROR);
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let session = session();
        let login = LoginPage::new(&session);
        login.goto().await.unwrap();
        login.login(EMAIL, PASSWORD).await.unwrap();

        let home = HomePage::new(&session);
        home.click_logout_link().await.unwrap();
        assert!(login.is_current().await.unwrap());
        assert!(!home.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_read_actions_are_idempotent() {
        let session = session();
        let home = HomePage::new(&session);
        home.goto().await.unwrap();
        assert_eq!(home.title().await.unwrap(), home.title().await.unwrap());
        assert_eq!(
            home.is_logged_in().await.unwrap(),
            home.is_logged_in().await.unwrap()
        );
    }
}

mod search_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_search_from_products_link() {
        let session = session();
        let home = HomePage::new(&session);
        home.goto().await.unwrap();
        home.click_products_link().await.unwrap();

        let products = ProductsPage::new(&session);
        assert!(products.is_current().await.unwrap());
        assert_eq!(products.get_product_names().await.unwrap().len(), CATALOG.len());

        products.search_product("dress").await.unwrap();
        assert!(products.is_search_results_visible().await.unwrap());
        assert_eq!(
            products.get_product_names().await.unwrap(),
            vec!["Sleeveless Dress", "Stylish Dress"]
        );
    }

    #[tokio::test]
    async fn test_search_with_no_matches_is_empty() {
        let session = session();
        let products = ProductsPage::new(&session);
        products.goto().await.unwrap();
        products.search_product("zzz-unknown").await.unwrap();
        assert!(products.get_product_names().await.unwrap().is_empty());
    }
}

mod registration_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_minimal_record_creates_account() {
        let session = session();
        let mut register = RegisterPage::new(&session);
        register.goto().await.unwrap();
        register.register(&minimal_record()).await.unwrap();

        assert!(register.is_account_created().await.unwrap());
        assert_eq!(register.stage(), RegistrationStage::AccountCreated);

        register.click_continue().await.unwrap();
        assert!(HomePage::new(&session).is_current().await.unwrap());
    }

    #[tokio::test]
    async fn test_full_record_fills_every_control() {
        let session = session();
        let data = RegisterData::builder()
            .name("Ana")
            .email("ana@example.test")
            .password("pw")
            .title(Title::Mrs)
            .first_name("Ana")
            .last_name("Horvat")
            .date_of_birth("15", "March", "1992")
            .company("Acme")
            .address("Ilica 1")
            .address2("Floor 3")
            .country("Australia")
            .state("NSW")
            .city("Sydney")
            .zipcode("2000")
            .mobile_number("0400000000")
            .build()
            .unwrap();

        let mut register = RegisterPage::new(&session);
        register.goto().await.unwrap();
        register.start_signup(data.name(), data.email()).await.unwrap();
        register.fill_account_details(&data).await.unwrap();

        let engine = session.engine();
        assert!(engine.element("#id_gender2").unwrap().checked);
        assert_eq!(engine.element(qa("days")).unwrap().value, "15");
        assert_eq!(engine.element(qa("months")).unwrap().value, "March");
        assert_eq!(engine.element(qa("years")).unwrap().value, "1992");
        assert_eq!(engine.element(qa("company")).unwrap().value, "Acme");
        assert_eq!(engine.element(qa("address2")).unwrap().value, "Floor 3");
        assert_eq!(engine.element(qa("country")).unwrap().value, "Australia");
    }

    #[tokio::test]
    async fn test_unknown_country_fails_and_keeps_stage() {
        let session = session();
        let data = RegisterData::builder()
            .name("Filip")
            .email("filip@example.test")
            .password("s3cret")
            .first_name("Filip")
            .last_name("Novak")
            .address("Main Street 1")
            .country("Atlantis")
            .state("s")
            .city("c")
            .zipcode("z")
            .mobile_number("1")
            .build()
            .unwrap();

        let mut register = RegisterPage::new(&session);
        register.goto().await.unwrap();
        register.start_signup(data.name(), data.email()).await.unwrap();
        let err = register.fill_account_details(&data).await.unwrap_err();
        assert!(matches!(err, PagewrightError::ElementNotInteractable { .. }));
        assert_eq!(register.stage(), RegistrationStage::Stage1Submitted);
    }

    #[tokio::test]
    async fn test_failed_submission_is_retried_without_stage1() {
        let session = session();
        let mut register = RegisterPage::new(&session);
        register.goto().await.unwrap();
        register.start_signup("Filip", "filip@example.test").await.unwrap();
        register.fill_account_details(&minimal_record()).await.unwrap();

        session.engine().with_state(|s| {
            s.document.first_mut(qa("create-account")).unwrap().visible = false;
        });
        assert!(register.click_create_account().await.is_err());
        assert_eq!(register.stage(), RegistrationStage::Stage2Filled);

        session.engine().with_state(|s| {
            s.document.first_mut(qa("create-account")).unwrap().visible = true;
        });
        session.engine().clear_history();
        register.click_create_account().await.unwrap();
        assert!(register.is_account_created().await.unwrap());
        assert!(!session
            .engine()
            .history()
            .iter()
            .any(|call| call.contains("signup-")));
    }
}

mod session_scenarios {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_page_is_navigation_error() {
        let session = session();
        session.engine().set_unreachable(PRODUCTS);
        let err = ProductsPage::new(&session).goto().await.unwrap_err();
        assert!(err.is_navigation());
    }

    #[tokio::test]
    async fn test_busy_network_times_out() {
        let session = session();
        let home = HomePage::new(&session);
        home.goto().await.unwrap();
        session.engine().set_network_busy(true);
        assert!(home.wait_until_loaded().await.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_independent_sessions_in_parallel() {
        let first = tokio::spawn(async {
            let session = session();
            let login = LoginPage::new(&session);
            login.goto().await.unwrap();
            login.login(EMAIL, PASSWORD).await.unwrap();
            login.is_logged_in().await.unwrap()
        });
        let second = tokio::spawn(async {
            let session = session();
            let login = LoginPage::new(&session);
            login.goto().await.unwrap();
            login.is_logged_in().await.unwrap()
        });
        assert!(first.await.unwrap());
        assert!(!second.await.unwrap());
    }
}

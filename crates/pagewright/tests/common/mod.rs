//! A scripted automationexercise storefront served by `MockEngine`.

#![allow(dead_code)]

use pagewright::{MockDocument, MockElement, MockEngine, MockState, RegisterData, Session, SessionConfig};
use std::time::Duration;

pub const BASE: &str = "https://automationexercise.test";
pub const HOME: &str = "https://automationexercise.test/";
pub const LOGIN: &str = "https://automationexercise.test/login";
pub const PRODUCTS: &str = "https://automationexercise.test/products";
pub const SIGNUP: &str = "https://automationexercise.test/signup";
pub const CREATED: &str = "https://automationexercise.test/account_created";

pub const EMAIL: &str = "user@test.com";
pub const PASSWORD: &str = "secret";
pub const USERNAME: &str = "Filip";
pub const LOGIN_ERROR: &str = "Your email or password is incorrect!";

pub const CATALOG: [&str; 5] = [
    "Blue Top",
    "Men Tshirt",
    "Sleeveless Dress",
    "Stylish Dress",
    "Winter Top",
];

pub fn qa(name: &str) -> String {
    format!("[data-qa=\"{name}\"]")
}

fn nav(title: &str) -> MockDocument {
    MockDocument::new(title)
        .with(r#"a[href="/login"]"#, MockElement::with_text("Signup / Login"))
        .with(r#"a[href="/products"]"#, MockElement::with_text("Products"))
        .with(r#"a[href="/view_cart"]"#, MockElement::with_text("Cart"))
}

fn login_page() -> MockDocument {
    nav("Automation Exercise - Signup / Login")
        .with(qa("login-email"), MockElement::new())
        .with(qa("login-password"), MockElement::new())
        .with(qa("login-button"), MockElement::with_text("Login"))
        .with(qa("signup-name"), MockElement::new())
        .with(qa("signup-email"), MockElement::new())
        .with(qa("signup-button"), MockElement::with_text("Signup"))
}

fn products_page() -> MockDocument {
    CATALOG.iter().fold(
        nav("Automation Exercise - All Products")
            .with("#search_product", MockElement::new())
            .with("#submit_search", MockElement::new()),
        |doc, name| doc.with(".productinfo p", MockElement::with_text(*name)),
    )
}

fn signup_page() -> MockDocument {
    let mut doc = nav("Automation Exercise - Signup")
        .with("#id_gender1", MockElement::new())
        .with("#id_gender2", MockElement::new())
        .with(qa("days"), MockElement::new().with_options((1..=31).map(|d| d.to_string())))
        .with(
            qa("months"),
            MockElement::new().with_options(["January", "February", "March", "December"]),
        )
        .with(qa("years"), MockElement::new().with_options((1900..=2021).map(|y| y.to_string())))
        .with(
            qa("country"),
            MockElement::new().with_options(["India", "United States", "Canada", "Australia"]),
        );
    for field in [
        "password",
        "first_name",
        "last_name",
        "company",
        "address",
        "address2",
        "state",
        "city",
        "zipcode",
        "mobile_number",
        "create-account",
    ] {
        doc.insert(qa(field), MockElement::new());
    }
    doc
}

fn created_page() -> MockDocument {
    nav("Automation Exercise - Account Created")
        .with(qa("account-created"), MockElement::with_text("ACCOUNT CREATED!"))
        .with(qa("continue-button"), MockElement::with_text("Continue"))
}

fn submit_login(state: &mut MockState) -> pagewright::PagewrightResult<()> {
    let email = state.value_of(qa("login-email")).unwrap_or_default();
    let password = state.value_of(qa("login-password")).unwrap_or_default();
    if email == EMAIL && password == PASSWORD {
        state.load(HOME)?;
        state.document.remove(r#"a[href="/login"]"#);
        state.document.insert(r#"a[href="/logout"]"#, MockElement::with_text("Logout"));
        state.document.insert(
            r#"a:has-text("Logged in as")"#,
            MockElement::with_text(format!("Logged in as {USERNAME}")),
        );
    } else {
        state.document.remove(r#"[action="/login"] p"#);
        state
            .document
            .insert(r#"[action="/login"] p"#, MockElement::with_text(LOGIN_ERROR));
    }
    Ok(())
}

fn submit_search(state: &mut MockState) -> pagewright::PagewrightResult<()> {
    let term = state.value_of("#search_product").unwrap_or_default().to_lowercase();
    state.document.remove(".productinfo p");
    for name in CATALOG.iter().filter(|n| n.to_lowercase().contains(&term)) {
        state.document.insert(".productinfo p", MockElement::with_text(*name));
    }
    state
        .document
        .insert("#search_product_results", MockElement::with_text("Searched Products"));
    Ok(())
}

/// The storefront engine with its pages and form submissions wired up
pub fn storefront() -> MockEngine {
    let engine = MockEngine::new()
        .with_page(HOME, nav("Automation Exercise"))
        .with_page(LOGIN, login_page())
        .with_page(PRODUCTS, products_page())
        .with_page(SIGNUP, signup_page())
        .with_page(CREATED, created_page());
    engine.on_click(r#"a[href="/login"]"#, |s| s.load(LOGIN));
    engine.on_click(r#"a[href="/products"]"#, |s| s.load(PRODUCTS));
    engine.on_click(r#"a[href="/logout"]"#, |s| s.load(LOGIN));
    engine.on_click(qa("login-button"), submit_login);
    engine.on_click("#submit_search", submit_search);
    engine.on_click(qa("signup-button"), |s| s.load(SIGNUP));
    engine.on_click(qa("create-account"), |s| s.load(CREATED));
    engine.on_click(qa("continue-button"), |s| s.load(HOME));
    engine
}

pub fn config() -> SessionConfig {
    SessionConfig::new()
        .with_base_url(BASE)
        .with_action_timeout(Duration::from_millis(100))
        .with_load_timeout(Duration::from_millis(100))
        .with_poll_interval(Duration::from_millis(5))
}

pub fn session() -> Session<MockEngine> {
    Session::open(storefront(), config()).unwrap()
}

pub fn minimal_record() -> RegisterData {
    RegisterData::builder()
        .name("Filip")
        .email("filip@example.test")
        .password("s3cret")
        .first_name("Filip")
        .last_name("Novak")
        .address("Main Street 1")
        .country("Canada")
        .state("Ontario")
        .city("Toronto")
        .zipcode("M5H 2N2")
        .mobile_number("5551234")
        .build()
        .unwrap()
}

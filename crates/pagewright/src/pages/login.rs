//! Login form on the "Signup / Login" screen.

use super::logged_in_label;
use crate::driver::BrowserEngine;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::PagewrightResult;
use crate::session::Session;
use tracing::info;

/// Login page (`/login`)
#[derive(Debug)]
pub struct LoginPage<'s, E: BrowserEngine> {
    session: &'s Session<E>,
    email_input: Locator,
    password_input: Locator,
    login_button: Locator,
    error_message: Locator,
    logged_in_label: Locator,
}

impl<'s, E: BrowserEngine> LoginPage<'s, E> {
    /// Bind the page to a session
    #[must_use]
    pub fn new(session: &'s Session<E>) -> Self {
        Self {
            session,
            email_input: Locator::data_qa("login-email"),
            password_input: Locator::data_qa("login-password"),
            login_button: Locator::data_qa("login-button"),
            error_message: Locator::new(r#"[action="/login"] p"#).described("login error"),
            logged_in_label: logged_in_label(),
        }
    }

    /// Type the email address
    pub async fn fill_email(&self, email: &str) -> PagewrightResult<()> {
        self.session.fill(&self.email_input, email).await
    }

    /// Type the password
    pub async fn fill_password(&self, password: &str) -> PagewrightResult<()> {
        self.session.fill(&self.password_input, password).await
    }

    /// Submit the form
    pub async fn click_login_button(&self) -> PagewrightResult<()> {
        self.session.click(&self.login_button).await
    }

    /// Fill both fields and submit; stops at the first failing step.
    ///
    /// Success of the login itself is observed afterwards through
    /// [`is_logged_in`](Self::is_logged_in) or
    /// [`get_error_message`](Self::get_error_message).
    pub async fn login(&self, email: &str, password: &str) -> PagewrightResult<()> {
        info!(email, "logging in");
        self.fill_email(email).await?;
        self.fill_password(password).await?;
        self.click_login_button().await
    }

    /// Error text rendered under the form, verbatim
    pub async fn get_error_message(&self) -> PagewrightResult<String> {
        self.session.inner_text(&self.error_message).await
    }

    /// Whether the "Logged in as" label is shown
    pub async fn is_logged_in(&self) -> PagewrightResult<bool> {
        self.session.is_visible(&self.logged_in_label).await
    }
}

impl<E: BrowserEngine> PageObject for LoginPage<'_, E> {
    type Engine = E;

    fn session(&self) -> &Session<E> {
        self.session
    }

    fn path(&self) -> &str {
        "/login"
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

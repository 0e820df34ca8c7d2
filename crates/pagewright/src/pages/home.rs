//! Landing page and its navigation bar.

use super::{logged_in_label, LOGGED_IN_PREFIX};
use crate::driver::BrowserEngine;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::PagewrightResult;
use crate::session::Session;
use tracing::debug;

/// Home page (`/`)
#[derive(Debug)]
pub struct HomePage<'s, E: BrowserEngine> {
    session: &'s Session<E>,
    login_link: Locator,
    logout_link: Locator,
    products_link: Locator,
    cart_link: Locator,
    logged_in_label: Locator,
}

impl<'s, E: BrowserEngine> HomePage<'s, E> {
    /// Bind the page to a session
    #[must_use]
    pub fn new(session: &'s Session<E>) -> Self {
        Self {
            session,
            login_link: Locator::new(r#"a[href="/login"]"#).described("login link"),
            logout_link: Locator::new(r#"a[href="/logout"]"#).described("logout link"),
            products_link: Locator::new(r#"a[href="/products"]"#).described("products link"),
            cart_link: Locator::new(r#"a[href="/view_cart"]"#).described("cart link"),
            logged_in_label: logged_in_label(),
        }
    }

    /// Follow the "Signup / Login" link
    pub async fn click_login_link(&self) -> PagewrightResult<()> {
        self.session.click(&self.login_link).await
    }

    /// Follow the "Logout" link
    pub async fn click_logout_link(&self) -> PagewrightResult<()> {
        self.session.click(&self.logout_link).await
    }

    /// Follow the "Products" link
    pub async fn click_products_link(&self) -> PagewrightResult<()> {
        self.session.click(&self.products_link).await
    }

    /// Follow the "Cart" link
    pub async fn click_cart_link(&self) -> PagewrightResult<()> {
        self.session.click(&self.cart_link).await
    }

    /// Whether the "Logged in as" label is shown
    pub async fn is_logged_in(&self) -> PagewrightResult<bool> {
        self.session.is_visible(&self.logged_in_label).await
    }

    /// Username from the label, e.g. `"Filip"` for `"Logged in as Filip"`
    pub async fn get_logged_in_username(&self) -> PagewrightResult<String> {
        let label = self.session.inner_text(&self.logged_in_label).await?;
        let username = label.replacen(LOGGED_IN_PREFIX, "", 1).trim().to_string();
        debug!(%username, "logged-in user");
        Ok(username)
    }
}

impl<E: BrowserEngine> PageObject for HomePage<'_, E> {
    type Engine = E;

    fn session(&self) -> &Session<E> {
        self.session
    }

    fn path(&self) -> &str {
        "/"
    }

    fn page_name(&self) -> &str {
        "home"
    }
}

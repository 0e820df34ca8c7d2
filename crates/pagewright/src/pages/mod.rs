//! Page objects for the storefront screens.
//!
//! Each page object borrows a [`Session`](crate::Session) and declares its
//! locators once at construction.

pub mod home;
pub mod login;
pub mod products;
pub mod register;

pub use home::HomePage;
pub use login::LoginPage;
pub use products::ProductsPage;
pub use register::{RegisterPage, RegistrationStage};

use crate::locator::Locator;

/// Prefix of the navigation label shown to a logged-in user
pub const LOGGED_IN_PREFIX: &str = "Logged in as";

/// The "Logged in as …" navigation label
pub(crate) fn logged_in_label() -> Locator {
    Locator::new("a")
        .with_text(LOGGED_IN_PREFIX)
        .described("logged-in label")
}

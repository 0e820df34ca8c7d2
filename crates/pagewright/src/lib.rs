//! Pagewright: page objects for the automationexercise storefront.
//!
//! Test scenarios talk to the storefront through semantic, page-scoped
//! operations ("log in", "search for a product", "register an account")
//! instead of raw selectors. Every page object borrows one [`Session`], the
//! shared navigation primitive, which wraps a single [`BrowserEngine`] tab.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ HomePage   LoginPage   ProductsPage   RegisterPage       │  page objects
//! ├──────────────────────────────────────────────────────────┤
//! │ Session: navigate · title · wait_for_page_load ·         │  navigation
//! │          is_visible · click · fill · select_option ...   │  primitive
//! ├──────────────────────────────────────────────────────────┤
//! │ BrowserEngine: ChromiumEngine (feature browser) │ Mock    │  engine
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pagewright::{HomePage, LoginPage, MockEngine, PageObject, Session, SessionConfig};
//!
//! # async fn scenario() -> pagewright::PagewrightResult<()> {
//! let session = Session::open(MockEngine::new(), SessionConfig::default())?;
//! let home = HomePage::new(&session);
//! home.goto().await?;
//! home.click_login_link().await?;
//!
//! let login = LoginPage::new(&session);
//! login.login("user@test.com", "secret").await?;
//! assert!(home.is_logged_in().await?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod driver;
pub mod locator;
pub mod page_object;
pub mod pages;
pub mod registration;
pub mod result;
pub mod session;
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::ChromiumEngine;
pub use config::{RunnerConfig, ScreenshotMode, SessionConfig, DEFAULT_BASE_URL};
pub use driver::{BrowserEngine, EngineConfig, MockDocument, MockElement, MockEngine, MockState};
pub use locator::{Locator, Selector};
pub use page_object::{PageObject, UrlMatcher};
pub use pages::{HomePage, LoginPage, ProductsPage, RegisterPage, RegistrationStage};
pub use registration::{DateOfBirth, RegisterData, RegisterDataBuilder, Title};
pub use result::{PagewrightError, PagewrightResult};
pub use session::Session;
pub use wait::{LoadState, NetworkIdleTracker, WaitOptions};

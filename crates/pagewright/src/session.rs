//! The navigation primitive shared by every page object.
//!
//! A [`Session`] wraps one engine handle (one browser tab) together with the
//! configuration it was opened with. The scenario owns the session; page
//! objects borrow it. All four base operations share one failure vocabulary:
//!
//! | operation | fails with |
//! |-----------|------------|
//! | [`Session::navigate`] | `Navigation` |
//! | [`Session::title`] | engine errors only |
//! | [`Session::wait_for_page_load`] | `Timeout` |
//! | [`Session::is_visible`] | never for absence |

use crate::config::SessionConfig;
use crate::driver::BrowserEngine;
use crate::locator::Locator;
use crate::result::PagewrightResult;
use crate::wait::LoadState;
use tracing::{debug, trace, warn};

/// One browser tab plus its configuration
#[derive(Debug)]
pub struct Session<E: BrowserEngine> {
    engine: E,
    config: SessionConfig,
}

impl<E: BrowserEngine> Session<E> {
    /// Wrap an engine handle
    pub const fn new(engine: E, config: SessionConfig) -> Self {
        Self { engine, config }
    }

    /// Wrap an engine handle after checking the configuration
    pub fn open(engine: E, config: SessionConfig) -> PagewrightResult<Self> {
        config.validate()?;
        Ok(Self::new(engine, config))
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying engine
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Go to `base_url + path` and wait for the document to load
    pub async fn navigate(&self, path: &str) -> PagewrightResult<()> {
        let url = self.config.resolve(path);
        debug!(%url, "navigate");
        self.engine
            .goto(&url, self.config.navigation_timeout)
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "navigation failed");
                e
            })
    }

    /// Current document title
    pub async fn title(&self) -> PagewrightResult<String> {
        self.engine.title().await
    }

    /// Current URL
    pub async fn current_url(&self) -> PagewrightResult<String> {
        self.engine.current_url().await
    }

    /// Suspend until the network has gone quiet
    pub async fn wait_for_page_load(&self) -> PagewrightResult<()> {
        debug!(timeout = ?self.config.load_timeout, "waiting for network idle");
        self.engine
            .wait_for_load_state(LoadState::NetworkIdle, self.config.load_wait())
            .await
    }

    /// Whether the element is visible; absence is `false`, never an error
    pub async fn is_visible(&self, locator: &Locator) -> PagewrightResult<bool> {
        let visible = self.engine.is_visible(locator.selector()).await?;
        trace!(locator = %locator.description(), visible, "visibility");
        Ok(visible)
    }

    /// Click an element
    pub async fn click(&self, locator: &Locator) -> PagewrightResult<()> {
        debug!(locator = %locator.description(), "click");
        self.engine
            .click(locator.selector(), self.config.action_wait())
            .await
    }

    /// Replace the value of an input
    pub async fn fill(&self, locator: &Locator, value: &str) -> PagewrightResult<()> {
        debug!(locator = %locator.description(), "fill");
        self.engine
            .fill(locator.selector(), value, self.config.action_wait())
            .await
    }

    /// Select an option by value or label
    pub async fn select_option(&self, locator: &Locator, value: &str) -> PagewrightResult<()> {
        debug!(locator = %locator.description(), value, "select option");
        self.engine
            .select_option(locator.selector(), value, self.config.action_wait())
            .await
    }

    /// Check a checkbox or radio button
    pub async fn check(&self, locator: &Locator) -> PagewrightResult<()> {
        debug!(locator = %locator.description(), "check");
        self.engine
            .check(locator.selector(), self.config.action_wait())
            .await
    }

    /// Checked state of a checkbox or radio button
    pub async fn is_checked(&self, locator: &Locator) -> PagewrightResult<bool> {
        self.engine.is_checked(locator.selector()).await
    }

    /// Current value of an input or select
    pub async fn input_value(&self, locator: &Locator) -> PagewrightResult<String> {
        self.engine.input_value(locator.selector()).await
    }

    /// Rendered text of an element
    pub async fn inner_text(&self, locator: &Locator) -> PagewrightResult<String> {
        self.engine
            .inner_text(locator.selector(), self.config.action_wait())
            .await
    }

    /// Rendered text of every match, in DOM order
    pub async fn all_inner_texts(&self, locator: &Locator) -> PagewrightResult<Vec<String>> {
        self.engine.all_inner_texts(locator.selector()).await
    }

    /// PNG screenshot of the viewport
    pub async fn screenshot(&self) -> PagewrightResult<Vec<u8>> {
        self.engine.screenshot().await
    }

    /// Close the tab
    pub async fn close(&self) -> PagewrightResult<()> {
        debug!("closing session");
        self.engine.close().await
    }
}

//! Browser-automation engine boundary.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  BrowserEngine (Abstract Trait)                               │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐       │
//! │  │  ChromiumEngine     │        │  MockEngine         │       │
//! │  │  (feature browser)  │        │  (scripted, tests)  │       │
//! │  │  CDP via            │        │  in-memory          │       │
//! │  │  chromiumoxide      │        │  documents          │       │
//! │  └─────────────────────┘        └─────────────────────┘       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects never talk to an engine directly; they go through
//! [`Session`](crate::Session), which hands the engine fixed selectors and
//! literal values only.

use crate::locator::Selector;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{poll_until, LoadState, WaitOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: None,
            executable_path: None,
            sandbox: true,
        }
    }
}

impl EngineConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the browser executable
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract engine trait for browser automation
///
/// One engine value drives exactly one tab. Calls are issued strictly one at a
/// time by [`Session`](crate::Session); implementations may assume no two DOM
/// operations overlap.
///
/// # Implementations
///
/// - `ChromiumEngine` - real Chromium over CDP (feature `browser`)
/// - [`MockEngine`] - scripted in-memory documents for unit testing
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Load `url` as a new document
    async fn goto(&self, url: &str, timeout: Duration) -> PagewrightResult<()>;

    /// URL of the current document
    async fn current_url(&self) -> PagewrightResult<String>;

    /// Title of the current document
    async fn title(&self) -> PagewrightResult<String>;

    /// Suspend until `state` is reached or the bound expires
    async fn wait_for_load_state(&self, state: LoadState, wait: WaitOptions)
        -> PagewrightResult<()>;

    /// Whether the first match is rendered; absence is `false`
    async fn is_visible(&self, selector: &Selector) -> PagewrightResult<bool>;

    /// Click the first match
    async fn click(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()>;

    /// Replace the value of an input
    async fn fill(&self, selector: &Selector, value: &str, wait: WaitOptions)
        -> PagewrightResult<()>;

    /// Pick the option whose value or label equals `value`
    async fn select_option(
        &self,
        selector: &Selector,
        value: &str,
        wait: WaitOptions,
    ) -> PagewrightResult<()>;

    /// Check a checkbox or radio button
    async fn check(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()>;

    /// Checked state of a checkbox or radio button
    async fn is_checked(&self, selector: &Selector) -> PagewrightResult<bool>;

    /// Current value of an input or select
    async fn input_value(&self, selector: &Selector) -> PagewrightResult<String>;

    /// Rendered text of the first match
    async fn inner_text(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<String>;

    /// Rendered text of every match, in DOM order
    async fn all_inner_texts(&self, selector: &Selector) -> PagewrightResult<Vec<String>>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> PagewrightResult<Vec<u8>>;

    /// Close the tab
    async fn close(&self) -> PagewrightResult<()>;
}

// ============================================================================
// Mock engine
// ============================================================================

/// One element of a [`MockDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Accepts input
    pub enabled: bool,
    /// Current input value
    pub value: String,
    /// Checked state for checkboxes and radios
    pub checked: bool,
    /// Accepted option values/labels for selects; empty accepts anything
    pub options: Vec<String>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: true,
            enabled: true,
            value: String::new(),
            checked: false,
            options: Vec::new(),
        }
    }
}

impl MockElement {
    /// A visible, enabled, empty element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element rendering `text`
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Mark as hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Restrict a select to these options
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// A scripted document: a title plus elements keyed by rendered selector.
///
/// Several elements may share a key; they are kept in insertion (DOM) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockDocument {
    /// Document title
    pub title: String,
    elements: Vec<(String, MockElement)>,
}

impl MockDocument {
    /// Create an empty document
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
        }
    }

    /// Add an element under `key`
    #[must_use]
    pub fn with(mut self, key: impl ToString, element: MockElement) -> Self {
        self.insert(key, element);
        self
    }

    /// Add an element under `key`
    pub fn insert(&mut self, key: impl ToString, element: MockElement) {
        self.elements.push((key.to_string(), element));
    }

    /// Remove every element under `key`
    pub fn remove(&mut self, key: impl ToString) {
        let key = key.to_string();
        self.elements.retain(|(k, _)| *k != key);
    }

    /// First element under `key`
    #[must_use]
    pub fn first(&self, key: impl ToString) -> Option<&MockElement> {
        let key = key.to_string();
        self.elements.iter().find(|(k, _)| *k == key).map(|(_, e)| e)
    }

    /// First element under `key`, mutably
    pub fn first_mut(&mut self, key: impl ToString) -> Option<&mut MockElement> {
        let key = key.to_string();
        self.elements
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e)
    }

    /// Every element under `key`, in order
    pub fn all(&self, key: impl ToString) -> Vec<&MockElement> {
        let key = key.to_string();
        self.elements
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, e)| e)
            .collect()
    }
}

/// Mutable state of a [`MockEngine`], handed to click reactions
#[derive(Debug, Default)]
pub struct MockState {
    /// Current URL
    pub current_url: String,
    /// Current document
    pub document: MockDocument,
    /// Documents served by URL
    pub pages: HashMap<String, MockDocument>,
    /// Call history for verification
    pub history: Vec<String>,
    /// When set, quiescence is never reached
    pub network_busy: bool,
    unreachable: HashSet<String>,
    screenshot: Vec<u8>,
}

impl MockState {
    /// Replace the current document with the one registered for `url`
    pub fn load(&mut self, url: &str) -> PagewrightResult<()> {
        if self.unreachable.contains(url) {
            return Err(PagewrightError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        let document = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| PagewrightError::Navigation {
                url: url.to_string(),
                message: "no document registered for this URL".to_string(),
            })?;
        self.document = document;
        self.current_url = url.to_string();
        Ok(())
    }

    /// Value of the first element under `key` in the current document
    #[must_use]
    pub fn value_of(&self, key: impl ToString) -> Option<String> {
        self.document.first(key).map(|e| e.value.clone())
    }
}

/// Reaction run after a successful click on a given selector
pub type ClickReaction = Arc<dyn Fn(&mut MockState) -> PagewrightResult<()> + Send + Sync>;

/// Mock engine for unit testing
///
/// Serves scripted documents by URL and runs a reaction after a click, which
/// is how tests model form submissions (e.g. a login button that loads the
/// logged-in home page when the entered credentials match).
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
    reactions: Mutex<HashMap<String, ClickReaction>>,
}

impl fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reactions: Vec<String> = self.reactions().keys().cloned().collect();
        f.debug_struct("MockEngine")
            .field("state", &*self.state())
            .field("reactions", &reactions)
            .finish()
    }
}

impl MockEngine {
    /// Create new mock engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `url`
    #[must_use]
    pub fn with_page(self, url: impl Into<String>, document: MockDocument) -> Self {
        self.add_page(url, document);
        self
    }

    /// Serve `document` at `url`
    pub fn add_page(&self, url: impl Into<String>, document: MockDocument) {
        let _ = self.state().pages.insert(url.into(), document);
    }

    /// Run `reaction` after each successful click on `key`
    pub fn on_click<F>(&self, key: impl ToString, reaction: F)
    where
        F: Fn(&mut MockState) -> PagewrightResult<()> + Send + Sync + 'static,
    {
        let _ = self
            .reactions()
            .insert(key.to_string(), Arc::new(reaction));
    }

    /// Make navigation to `url` fail
    pub fn set_unreachable(&self, url: impl Into<String>) {
        let _ = self.state().unreachable.insert(url.into());
    }

    /// Keep the network permanently busy (or release it)
    pub fn set_network_busy(&self, busy: bool) {
        self.state().network_busy = busy;
    }

    /// Set mock screenshot bytes
    pub fn set_screenshot(&self, data: Vec<u8>) {
        self.state().screenshot = data;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.state().history.clear();
    }

    /// Snapshot of the first element under `key` in the current document
    #[must_use]
    pub fn element(&self, key: impl ToString) -> Option<MockElement> {
        self.state().document.first(key).cloned()
    }

    /// Inspect or edit the state directly
    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut *self.state())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reactions(&self) -> MutexGuard<'_, HashMap<String, ClickReaction>> {
        self.reactions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn actionable<'d>(
        document: &'d mut MockDocument,
        selector: &Selector,
    ) -> PagewrightResult<&'d mut MockElement> {
        let element = document
            .first_mut(selector)
            .ok_or_else(|| PagewrightError::not_found(selector))?;
        if !element.visible {
            return Err(PagewrightError::not_interactable(selector, "element is hidden"));
        }
        if !element.enabled {
            return Err(PagewrightError::not_interactable(selector, "element is disabled"));
        }
        Ok(element)
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn goto(&self, url: &str, _timeout: Duration) -> PagewrightResult<()> {
        let mut state = self.state();
        state.history.push(format!("goto:{url}"));
        state.load(url)
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn title(&self) -> PagewrightResult<String> {
        let mut state = self.state();
        state.history.push("title".to_string());
        Ok(state.document.title.clone())
    }

    async fn wait_for_load_state(
        &self,
        load_state: LoadState,
        wait: WaitOptions,
    ) -> PagewrightResult<()> {
        self.state().history.push(format!("wait:{load_state}"));
        poll_until(wait, load_state.event_name(), || {
            let settled = load_state != LoadState::NetworkIdle || !self.state().network_busy;
            async move { Ok(settled) }
        })
        .await
        .map(|_| ())
    }

    async fn is_visible(&self, selector: &Selector) -> PagewrightResult<bool> {
        let mut state = self.state();
        state.history.push(format!("is_visible:{selector}"));
        Ok(state.document.first(selector).is_some_and(|e| e.visible))
    }

    async fn click(&self, selector: &Selector, _wait: WaitOptions) -> PagewrightResult<()> {
        let reaction = self.reactions().get(&selector.to_string()).cloned();
        let mut state = self.state();
        state.history.push(format!("click:{selector}"));
        Self::actionable(&mut state.document, selector)?;
        match reaction {
            Some(reaction) => reaction(&mut *state),
            None => Ok(()),
        }
    }

    async fn fill(
        &self,
        selector: &Selector,
        value: &str,
        _wait: WaitOptions,
    ) -> PagewrightResult<()> {
        let mut state = self.state();
        state.history.push(format!("fill:{selector}={value}"));
        let element = Self::actionable(&mut state.document, selector)?;
        element.value = value.to_string();
        Ok(())
    }

    async fn select_option(
        &self,
        selector: &Selector,
        value: &str,
        _wait: WaitOptions,
    ) -> PagewrightResult<()> {
        let mut state = self.state();
        state.history.push(format!("select:{selector}={value}"));
        let element = Self::actionable(&mut state.document, selector)?;
        if !element.options.is_empty() && !element.options.iter().any(|o| o == value) {
            return Err(PagewrightError::not_interactable(
                selector,
                format!("no option matching {value:?}"),
            ));
        }
        element.value = value.to_string();
        Ok(())
    }

    async fn check(&self, selector: &Selector, _wait: WaitOptions) -> PagewrightResult<()> {
        let mut state = self.state();
        state.history.push(format!("check:{selector}"));
        let element = Self::actionable(&mut state.document, selector)?;
        element.checked = true;
        Ok(())
    }

    async fn is_checked(&self, selector: &Selector) -> PagewrightResult<bool> {
        let mut state = self.state();
        state.history.push(format!("is_checked:{selector}"));
        state
            .document
            .first(selector)
            .map(|e| e.checked)
            .ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn input_value(&self, selector: &Selector) -> PagewrightResult<String> {
        let mut state = self.state();
        state.history.push(format!("input_value:{selector}"));
        state
            .document
            .first(selector)
            .map(|e| e.value.clone())
            .ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn inner_text(&self, selector: &Selector, _wait: WaitOptions) -> PagewrightResult<String> {
        let mut state = self.state();
        state.history.push(format!("inner_text:{selector}"));
        state
            .document
            .first(selector)
            .map(|e| e.text.clone())
            .ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn all_inner_texts(&self, selector: &Selector) -> PagewrightResult<Vec<String>> {
        let mut state = self.state();
        state.history.push(format!("all_inner_texts:{selector}"));
        Ok(state
            .document
            .all(selector)
            .into_iter()
            .map(|e| e.text.clone())
            .collect())
    }

    async fn screenshot(&self) -> PagewrightResult<Vec<u8>> {
        let mut state = self.state();
        state.history.push("screenshot".to_string());
        Ok(state.screenshot.clone())
    }

    async fn close(&self) -> PagewrightResult<()> {
        self.state().history.push("close".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait() -> WaitOptions {
        WaitOptions::new()
            .with_timeout(Duration::from_millis(40))
            .with_poll_interval(Duration::from_millis(5))
    }

    mod engine_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = EngineConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert_eq!(config.viewport_width, 1280);
        }

        #[test]
        fn test_config_builder() {
            let config = EngineConfig::new()
                .headless(false)
                .viewport(800, 600)
                .user_agent("test-agent")
                .executable_path("/usr/bin/chromium")
                .no_sandbox();

            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.viewport_height, 600);
            assert_eq!(config.user_agent.as_deref(), Some("test-agent"));
            assert_eq!(config.executable_path.as_deref(), Some("/usr/bin/chromium"));
        }
    }

    mod mock_document_tests {
        use super::*;

        #[test]
        fn test_elements_keep_insertion_order() {
            let doc = MockDocument::new("All Products")
                .with(".productinfo p", MockElement::with_text("Blue Top"))
                .with(".productinfo p", MockElement::with_text("Men Tshirt"));
            let texts: Vec<_> = doc.all(".productinfo p").iter().map(|e| e.text.clone()).collect();
            assert_eq!(texts, vec!["Blue Top", "Men Tshirt"]);
            assert_eq!(doc.first(".productinfo p").unwrap().text, "Blue Top");
        }

        #[test]
        fn test_remove() {
            let mut doc = MockDocument::new("t").with("#a", MockElement::new());
            doc.remove("#a");
            assert!(doc.first("#a").is_none());
        }

        #[test]
        fn test_selector_keys_match_display() {
            let doc = MockDocument::new("t").with(Selector::data_qa("days"), MockElement::new());
            assert!(doc.first("[data-qa=\"days\"]").is_some());
        }
    }

    mod mock_engine_tests {
        use super::*;

        fn engine() -> MockEngine {
            MockEngine::new().with_page(
                "https://shop.test/",
                MockDocument::new("Automation Exercise")
                    .with("#visible", MockElement::with_text("hello"))
                    .with("#hidden", MockElement::new().hidden())
                    .with("#disabled", MockElement::new().disabled())
                    .with("#select", MockElement::new().with_options(["1", "2"])),
            )
        }

        #[tokio::test]
        async fn test_goto_and_title() {
            let engine = engine();
            engine.goto("https://shop.test/", Duration::from_secs(1)).await.unwrap();
            assert_eq!(engine.title().await.unwrap(), "Automation Exercise");
            assert_eq!(engine.current_url().await.unwrap(), "https://shop.test/");
            assert!(engine.was_called("goto:https://shop.test/"));
        }

        #[tokio::test]
        async fn test_goto_unknown_or_unreachable() {
            let engine = engine();
            let err = engine
                .goto("https://shop.test/missing", Duration::from_secs(1))
                .await
                .unwrap_err();
            assert!(err.is_navigation());

            engine.set_unreachable("https://shop.test/");
            let err = engine
                .goto("https://shop.test/", Duration::from_secs(1))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("ERR_CONNECTION_REFUSED"));
        }

        #[tokio::test]
        async fn test_visibility_never_errors_for_absence() {
            let engine = engine();
            engine.goto("https://shop.test/", Duration::from_secs(1)).await.unwrap();
            assert!(engine.is_visible(&Selector::css("#visible")).await.unwrap());
            assert!(!engine.is_visible(&Selector::css("#hidden")).await.unwrap());
            assert!(!engine.is_visible(&Selector::css("#nope")).await.unwrap());
        }

        #[tokio::test]
        async fn test_action_errors() {
            let engine = engine();
            engine.goto("https://shop.test/", Duration::from_secs(1)).await.unwrap();

            let err = engine.click(&Selector::css("#nope"), wait()).await.unwrap_err();
            assert!(err.is_absence());

            let err = engine.click(&Selector::css("#hidden"), wait()).await.unwrap_err();
            assert!(matches!(err, PagewrightError::ElementNotInteractable { .. }));

            let err = engine
                .fill(&Selector::css("#disabled"), "x", wait())
                .await
                .unwrap_err();
            assert!(err.to_string().contains("disabled"));
        }

        #[tokio::test]
        async fn test_select_option_respects_options() {
            let engine = engine();
            engine.goto("https://shop.test/", Duration::from_secs(1)).await.unwrap();
            let select = Selector::css("#select");
            engine.select_option(&select, "2", wait()).await.unwrap();
            assert_eq!(engine.input_value(&select).await.unwrap(), "2");
            let err = engine.select_option(&select, "9", wait()).await.unwrap_err();
            assert!(err.to_string().contains("no option matching"));
        }

        #[tokio::test]
        async fn test_click_reaction_runs_after_click() {
            let engine = engine().with_page("https://shop.test/next", MockDocument::new("Next"));
            engine.on_click("#visible", |state| state.load("https://shop.test/next"));
            engine.goto("https://shop.test/", Duration::from_secs(1)).await.unwrap();
            engine.click(&Selector::css("#visible"), wait()).await.unwrap();
            assert_eq!(engine.title().await.unwrap(), "Next");
        }

        #[tokio::test]
        async fn test_network_busy_times_out() {
            let engine = engine();
            engine.set_network_busy(true);
            let err = engine
                .wait_for_load_state(LoadState::NetworkIdle, wait())
                .await
                .unwrap_err();
            assert!(err.is_timeout());

            engine.set_network_busy(false);
            engine
                .wait_for_load_state(LoadState::NetworkIdle, wait())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_history_tracking() {
            let engine = engine();
            engine.set_screenshot(vec![0x89, 0x50, 0x4E, 0x47]);
            assert_eq!(engine.screenshot().await.unwrap().len(), 4);
            engine.close().await.unwrap();
            assert_eq!(engine.history(), vec!["screenshot", "close"]);
            engine.clear_history();
            assert!(engine.history().is_empty());
        }
    }
}

//! Result and error types for pagewright.

use thiserror::Error;

/// Result type for pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// Navigation target unreachable or the engine reported a load failure
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Quiescence or element-readiness bound exceeded
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Selector matched nothing when an action required a match
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Element is present but cannot be acted on
    #[error("Element {selector} is not interactable: {reason}")]
    ElementNotInteractable {
        /// Selector of the element
        selector: String,
        /// Why the action was refused (hidden, disabled, no such option)
        reason: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Engine-level failure outside the element/navigation vocabulary
    #[error("Engine error: {message}")]
    Engine {
        /// Error message
        message: String,
    },

    /// Registration record violates its construction rules
    #[error("Invalid registration record: {message}")]
    InvalidRecord {
        /// Error message
        message: String,
    },

    /// Workflow operation called in the wrong stage
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewrightError {
    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(selector: impl ToString) -> Self {
        Self::ElementNotFound {
            selector: selector.to_string(),
        }
    }

    /// Create an element-not-interactable error
    #[must_use]
    pub fn not_interactable(selector: impl ToString, reason: impl Into<String>) -> Self {
        Self::ElementNotInteractable {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-record error
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create an invalid-state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an engine error
    #[must_use]
    pub fn engine(message: impl ToString) -> Self {
        Self::Engine {
            message: message.to_string(),
        }
    }

    /// True when the error only says the element is not there
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// True for navigation failures
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }

    /// True for timeouts
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

//! Locator abstraction for element selection.
//!
//! # Design Philosophy
//!
//! - **Fixed descriptors**: a page object declares its locators once and never
//!   changes them; only the DOM node behind a selector changes as the document does.
//! - **Lazy resolution**: nothing is resolved at construction, every engine call
//!   looks the selector up again against the live document.
//! - **Readable keys**: `Display` renders the selector the way it is written in
//!   the page object, which is also how errors and logs name the element.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "#search_product")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Text content selector
    Text(String),
    /// `data-qa` attribute selector used throughout the storefront markup
    DataQa(String),
    /// CSS selector filtered by contained text (`a:has-text("Logged in as")`)
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a `data-qa` selector
    #[must_use]
    pub fn data_qa(name: impl Into<String>) -> Self {
        Self::DataQa(name.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Convert to a JavaScript expression yielding the first match (or null)
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('*')).find(el => el.children.length === 0 && el.textContent.includes({t:?}))")
            }
            Self::DataQa(name) => {
                let css = format!("[data-qa=\"{name}\"]");
                format!("document.querySelector({css:?})")
            }
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?}))")
            }
        }
    }

    /// Convert to a JavaScript expression yielding every match in DOM order
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::XPath(s) => {
                format!("(() => {{ const r = document.evaluate({s:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()")
            }
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('*')).filter(el => el.children.length === 0 && el.textContent.includes({t:?}))")
            }
            Self::DataQa(name) => {
                let css = format!("[data-qa=\"{name}\"]");
                format!("Array.from(document.querySelectorAll({css:?}))")
            }
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))")
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::DataQa(name) => write!(f, "[data-qa=\"{name}\"]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text(\"{text}\")"),
        }
    }
}

/// A named, immutable reference to one element on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    description: Option<&'static str>,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator for a `data-qa` attribute value
    #[must_use]
    pub fn data_qa(name: impl Into<String>) -> Self {
        Self::from_selector(Selector::DataQa(name.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            description: None,
        }
    }

    /// Filter by text content
    ///
    /// Only CSS selectors can carry a text filter; other selector kinds are
    /// returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self { selector, ..self }
    }

    /// Attach a human-readable name used in logs
    #[must_use]
    pub const fn described(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Human-readable name, falling back to the rendered selector
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .map_or_else(|| self.selector.to_string(), str::to_string)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

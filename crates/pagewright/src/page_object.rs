//! Page Object Model support.
//!
//! Page objects compose a borrowed [`Session`] rather than extending a base
//! type. Every page object exposes the same small surface (`goto`, readiness,
//! title, "am I on this page") through [`PageObject`], and builds its own
//! semantic actions on top by delegating to the session.

use crate::driver::BrowserEngine;
use crate::result::PagewrightResult;
use crate::session::Session;
use async_trait::async_trait;

/// A page or screen of the storefront.
///
/// # Example
///
/// ```ignore
/// struct CartPage<'s, E: BrowserEngine> {
///     session: &'s Session<E>,
///     checkout: Locator,
/// }
///
/// impl<E: BrowserEngine> PageObject for CartPage<'_, E> {
///     type Engine = E;
///
///     fn session(&self) -> &Session<E> {
///         self.session
///     }
///
///     fn path(&self) -> &str {
///         "/view_cart"
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Engine behind the session
    type Engine: BrowserEngine;

    /// The session this page drives
    fn session(&self) -> &Session<Self::Engine>;

    /// Path of the page relative to the base URL (e.g. "/login", "/product/:id")
    fn path(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate to this page
    async fn goto(&self) -> PagewrightResult<()> {
        tracing::info!(page = self.page_name(), path = self.path(), "opening page");
        self.session().navigate(self.path()).await
    }

    /// Wait for the network to go quiet
    async fn wait_until_loaded(&self) -> PagewrightResult<()> {
        self.session().wait_for_page_load().await
    }

    /// Title of the current document
    async fn title(&self) -> PagewrightResult<String> {
        self.session().title().await
    }

    /// Whether the current URL is this page
    async fn is_current(&self) -> PagewrightResult<bool> {
        let url = self.session().current_url().await?;
        Ok(UrlMatcher::new(self.path()).matches(url_path(&url)))
    }
}

/// Path component of a URL, without query or fragment
#[must_use]
pub fn url_path(url: &str) -> &str {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |idx| &rest[idx..]),
        None => url,
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Any,
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/category_products/*`
    /// - Named parameters: `/product_details/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" || s.starts_with(':') {
                    UrlSegment::Any
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // wildcards and parameters each consume exactly one segment
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(segment, part)| match segment {
                    UrlSegment::Literal(lit) => lit == part,
                    UrlSegment::Any => true,
                })
    }

    /// Pattern as written
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod url_path_tests {
        use super::*;

        #[test]
        fn test_strips_origin_query_and_fragment() {
            assert_eq!(url_path("https://shop.test/login?next=/cart"), "/login");
            assert_eq!(url_path("https://shop.test/products#top"), "/products");
            assert_eq!(url_path("https://shop.test"), "/");
            assert_eq!(url_path("https://shop.test/"), "/");
        }

        #[test]
        fn test_bare_path() {
            assert_eq!(url_path("/view_cart"), "/view_cart");
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches("/login"));
            assert!(!matcher.matches("/signup"));
            assert!(!matcher.matches("/login/extra"));
        }

        #[test]
        fn test_root_matches_only_root() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("/"));
            assert!(!matcher.matches("/products"));
        }

        #[test]
        fn test_wildcard_match() {
            let matcher = UrlMatcher::new("/category_products/*");
            assert!(matcher.matches("/category_products/1"));
            assert!(!matcher.matches("/category_products"));
            assert!(!matcher.matches("/brand_products/1"));
        }

        #[test]
        fn test_parameter_match() {
            let matcher = UrlMatcher::new("/product_details/:id");
            assert!(matcher.matches("/product_details/7"));
            assert!(!matcher.matches("/product_details"));
        }

        #[test]
        fn test_pattern_getter() {
            assert_eq!(UrlMatcher::new("/view_cart").pattern(), "/view_cart");
        }
    }

    mod page_object_trait_tests {
        use super::*;
        use crate::config::SessionConfig;
        use crate::driver::{MockDocument, MockEngine};

        struct CartPage<'s> {
            session: &'s Session<MockEngine>,
        }

        impl PageObject for CartPage<'_> {
            type Engine = MockEngine;

            fn session(&self) -> &Session<MockEngine> {
                self.session
            }

            fn path(&self) -> &str {
                "/view_cart"
            }
        }

        fn session() -> Session<MockEngine> {
            let engine = MockEngine::new()
                .with_page("https://shop.test/view_cart", MockDocument::new("Checkout"))
                .with_page("https://shop.test/", MockDocument::new("Home"));
            Session::new(engine, SessionConfig::new().with_base_url("https://shop.test"))
        }

        #[tokio::test]
        async fn test_goto_and_is_current() {
            let session = session();
            let page = CartPage { session: &session };
            page.goto().await.unwrap();
            assert!(page.is_current().await.unwrap());
            assert_eq!(page.title().await.unwrap(), "Checkout");

            session.navigate("/").await.unwrap();
            assert!(!page.is_current().await.unwrap());
        }

        #[tokio::test]
        async fn test_wait_until_loaded() {
            let session = session();
            let page = CartPage { session: &session };
            page.wait_until_loaded().await.unwrap();
            assert!(session.engine().was_called("wait:networkidle"));
        }

        #[test]
        fn test_page_name() {
            let session = session();
            let page = CartPage { session: &session };
            assert!(page.page_name().contains("CartPage"));
        }
    }
}

//! Product catalog and search.

use crate::driver::BrowserEngine;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::PagewrightResult;
use crate::session::Session;
use tracing::{debug, info};

/// Products page (`/products`)
#[derive(Debug)]
pub struct ProductsPage<'s, E: BrowserEngine> {
    session: &'s Session<E>,
    search_input: Locator,
    search_button: Locator,
    product_names: Locator,
    search_results: Locator,
}

impl<'s, E: BrowserEngine> ProductsPage<'s, E> {
    /// Bind the page to a session
    #[must_use]
    pub fn new(session: &'s Session<E>) -> Self {
        Self {
            session,
            search_input: Locator::new("#search_product").described("search input"),
            search_button: Locator::new("#submit_search").described("search button"),
            product_names: Locator::new(".productinfo p").described("product names"),
            search_results: Locator::new("#search_product_results").described("search results"),
        }
    }

    /// Type `name` into the search box and submit
    pub async fn search_product(&self, name: &str) -> PagewrightResult<()> {
        info!(term = name, "searching catalog");
        self.session.fill(&self.search_input, name).await?;
        self.session.click(&self.search_button).await
    }

    /// Names of the listed products in page order; empty when nothing matched
    pub async fn get_product_names(&self) -> PagewrightResult<Vec<String>> {
        let names = self.session.all_inner_texts(&self.product_names).await?;
        debug!(count = names.len(), "product names");
        Ok(names)
    }

    /// Whether the "Searched Products" section is shown
    pub async fn is_search_results_visible(&self) -> PagewrightResult<bool> {
        self.session.is_visible(&self.search_results).await
    }
}

impl<E: BrowserEngine> PageObject for ProductsPage<'_, E> {
    type Engine = E;

    fn session(&self) -> &Session<E> {
        self.session
    }

    fn path(&self) -> &str {
        "/products"
    }

    fn page_name(&self) -> &str {
        "products"
    }
}

//! Scenario files and the steps each scenario kind drives through the pages

use crate::error::{CliError, CliResult};
use pagewright::{
    BrowserEngine, HomePage, LoginPage, PageObject, ProductsPage, RegisterData, RegisterPage,
    Session,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One named scenario of a suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name, unique within a suite
    pub name: String,
    /// Run only scenarios marked `only` (refused under the CI policy)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub only: bool,
    /// What the scenario does
    #[serde(flatten)]
    pub kind: ScenarioKind,
}

/// The storefront flows a scenario can exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Open the home page and read its title
    Title {
        /// Required title
        #[serde(default)]
        expect: Option<String>,
    },
    /// Log in from the home page
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
        /// User that must end up logged in
        #[serde(default)]
        expect_user: Option<String>,
        /// Error the form must show instead
        #[serde(default)]
        expect_error: Option<String>,
    },
    /// Search the catalog
    Search {
        /// Search term
        term: String,
        /// Product names that must be listed, in order
        #[serde(default)]
        expect: Option<Vec<String>>,
    },
    /// Register a new account
    Register {
        /// Account record
        record: RegisterData,
        /// Press "Continue" on the confirmation screen
        #[serde(default)]
        continue_after: bool,
    },
}

impl ScenarioKind {
    /// Short label for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Title { .. } => "title",
            Self::Login { .. } => "login",
            Self::Search { .. } => "search",
            Self::Register { .. } => "register",
        }
    }
}

/// A YAML suite of scenarios
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suite {
    /// Scenarios in file order
    pub scenarios: Vec<Scenario>,
}

impl Suite {
    /// Parse a YAML suite
    pub fn from_yaml_str(yaml: &str) -> CliResult<Self> {
        let suite: Self = serde_yaml_ng::from_str(yaml)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Load a YAML suite file
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read suite {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    fn validate(&self) -> CliResult<()> {
        if self.scenarios.is_empty() {
            return Err(CliError::config("suite has no scenarios"));
        }
        for (i, scenario) in self.scenarios.iter().enumerate() {
            if scenario.name.trim().is_empty() {
                return Err(CliError::config(format!("scenario #{} has no name", i + 1)));
            }
            if self.scenarios[..i].iter().any(|s| s.name == scenario.name) {
                return Err(CliError::config(format!(
                    "duplicate scenario name `{}`",
                    scenario.name
                )));
            }
        }
        Ok(())
    }
}

/// Drive one scenario through the page objects and check its expectations.
///
/// Every submitting action is followed by a page-load wait, so the checks
/// read the document the submission produced. Returns a one-line
/// description of what was observed.
pub async fn execute<E: BrowserEngine>(
    session: &Session<E>,
    kind: &ScenarioKind,
) -> CliResult<String> {
    debug!(kind = kind.label(), "executing scenario");
    match kind {
        ScenarioKind::Title { expect } => {
            let home = HomePage::new(session);
            home.goto().await?;
            let title = home.title().await?;
            expect_eq("title", expect.as_ref(), &title)?;
            Ok(format!("title: {title}"))
        }
        ScenarioKind::Login {
            email,
            password,
            expect_user,
            expect_error,
        } => {
            let home = HomePage::new(session);
            home.goto().await?;
            home.click_login_link().await?;
            let login = LoginPage::new(session);
            login.wait_until_loaded().await?;
            login.login(email, password).await?;
            login.wait_until_loaded().await?;

            if let Some(expected) = expect_error {
                if login.is_logged_in().await? {
                    return Err(CliError::assertion(format!(
                        "expected login to be refused with \"{expected}\", but it succeeded"
                    )));
                }
                let shown = login.get_error_message().await?;
                expect_eq("login error", Some(expected), &shown)?;
                return Ok(format!("login refused: {shown}"));
            }

            if !home.is_logged_in().await? {
                let reason = login
                    .get_error_message()
                    .await
                    .unwrap_or_else(|_| "no error shown".to_string());
                return Err(CliError::assertion(format!("login failed: {reason}")));
            }
            let user = home.get_logged_in_username().await?;
            expect_eq("logged-in user", expect_user.as_ref(), &user)?;
            Ok(format!("logged in as {user}"))
        }
        ScenarioKind::Search { term, expect } => {
            let products = ProductsPage::new(session);
            products.goto().await?;
            products.search_product(term).await?;
            products.wait_until_loaded().await?;
            if !products.is_search_results_visible().await? {
                return Err(CliError::assertion("search results section not shown"));
            }
            let names = products.get_product_names().await?;
            if let Some(expected) = expect {
                if &names != expected {
                    return Err(CliError::assertion(format!(
                        "expected products {expected:?}, got {names:?}"
                    )));
                }
            }
            Ok(format!("{} product(s) for \"{term}\"", names.len()))
        }
        ScenarioKind::Register {
            record,
            continue_after,
        } => {
            let mut register = RegisterPage::new(session);
            register.goto().await?;
            register.register(record).await?;
            register.wait_until_loaded().await?;
            if !register.is_account_created().await? {
                return Err(CliError::assertion(format!(
                    "account for {} was not created",
                    record.email()
                )));
            }
            if *continue_after {
                register.click_continue().await?;
                register.wait_until_loaded().await?;
            }
            Ok(format!("account created for {}", record.email()))
        }
    }
}

fn expect_eq(what: &str, expected: Option<&String>, actual: &str) -> CliResult<()> {
    match expected {
        Some(expected) if expected != actual => Err(CliError::assertion(format!(
            "expected {what} \"{expected}\", got \"{actual}\""
        ))),
        _ => Ok(()),
    }
}

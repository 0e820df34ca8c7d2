//! Pagewright CLI library
//!
//! Runs storefront scenarios through the `pagewright` page objects under a
//! runner policy (retries, workers, screenshots) and reports the outcome.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod error;
mod output;
pub mod runner;
pub mod scenario;

pub use commands::{
    Cli, Commands, LoginArgs, RegisterArgs, SearchArgs, SuiteArgs, TitleArgs,
};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
#[cfg(feature = "browser")]
pub use runner::ChromiumFactory;
pub use runner::{EngineFactory, ScenarioOutcome, Status, SuiteReport, SuiteRunner, REPORT_FILE};
pub use scenario::{execute, Scenario, ScenarioKind, Suite};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr so command
/// output on stdout stays clean.
pub fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

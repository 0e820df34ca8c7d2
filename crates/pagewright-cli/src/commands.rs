//! CLI command definitions using clap

use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand};
use pagewright::RunnerConfig;
use std::path::PathBuf;

/// Pagewright: run storefront scenarios through the page objects
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Runner configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the storefront base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Use the CI policy (one retry, one worker, `only` forbidden).
    /// Any `CI` value other than a falsey one (`0`, `false`, `no`, `off`, empty) enables it.
    #[arg(
        long,
        env = "CI",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub ci: bool,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Override the number of concurrent sessions
    #[arg(short = 'j', long, global = true)]
    pub workers: Option<usize>,

    /// Override the number of retries for a failing scenario
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Directory for screenshots and the run report
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective runner policy.
    ///
    /// The config file (or the local policy) is the base; `--ci` applies the
    /// CI policy over it, then explicit flags win.
    pub fn runner_config(&self) -> CliResult<RunnerConfig> {
        let mut config = match self.config {
            Some(ref path) => RunnerConfig::from_path(path).map_err(|e| {
                CliError::config(format!("cannot load {}: {e}", path.display()))
            })?,
            None => RunnerConfig::local(),
        };

        if self.ci {
            let ci = RunnerConfig::ci();
            config.retries = ci.retries;
            config.workers = ci.workers;
            config.forbid_only = ci.forbid_only;
        }
        if let Some(ref url) = self.base_url {
            config.session.base_url.clone_from(url);
        }
        if self.headed {
            config.engine.headless = false;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(ref dir) = self.output {
            config.output_dir.clone_from(dir);
        }

        config.session.validate()?;
        Ok(config)
    }

    /// Log level selected by `-v`
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the home page and print its title
    Title(TitleArgs),

    /// Log in and report the logged-in user or the error shown
    Login(LoginArgs),

    /// Search the catalog and print the matching product names
    Search(SearchArgs),

    /// Register an account from a record file
    Register(RegisterArgs),

    /// Run a YAML suite of scenarios
    Suite(SuiteArgs),

    /// Print the effective runner configuration
    Config,
}

/// Arguments for the title command
#[derive(Parser, Debug)]
pub struct TitleArgs {
    /// Fail unless the title equals this text
    #[arg(long)]
    pub expect: Option<String>,
}

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Fail unless this user ends up logged in
    #[arg(long)]
    pub expect_user: Option<String>,

    /// Expect the login to be refused with this message
    #[arg(long, conflicts_with = "expect_user")]
    pub expect_error: Option<String>,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search term
    pub term: String,

    /// Fail unless exactly these products are listed, in order
    #[arg(long, value_delimiter = ',')]
    pub expect: Option<Vec<String>>,
}

/// Arguments for the register command
#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Registration record (YAML, or JSON with a `.json` extension)
    #[arg(short, long)]
    pub record: PathBuf,

    /// Press "Continue" after the account is created
    #[arg(long = "continue")]
    pub continue_after: bool,
}

/// Arguments for the suite command
#[derive(Parser, Debug)]
pub struct SuiteArgs {
    /// Suite file
    pub file: PathBuf,

    /// Run only scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

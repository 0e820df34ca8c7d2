//! Pagewright CLI: drive the automationexercise storefront from the shell
//!
//! ## Usage
//!
//! ```bash
//! pagewright title                                   # Print the home page title
//! pagewright login --email a@b.c --password pw       # Log in and report the user
//! pagewright search "top" --expect "Blue Top"        # Search the catalog
//! pagewright register --record account.yaml          # Register an account
//! pagewright --ci suite smoke.yaml                   # Run a suite under the CI policy
//! ```

use clap::Parser;
use pagewright::{RegisterData, RunnerConfig};
use pagewright_cli::{
    init_tracing, ChromiumFactory, Cli, CliError, CliResult, Commands, ProgressReporter, Scenario,
    ScenarioKind, Status, Suite, SuiteArgs, SuiteRunner,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level(), cli.json_logs);

    let config = cli.runner_config()?;

    let kind = match cli.command {
        Commands::Config => {
            print!("{}", config.to_yaml()?);
            return Ok(());
        }
        Commands::Suite(ref args) => return block_on(run_suite(config, args)),
        Commands::Title(args) => ScenarioKind::Title {
            expect: args.expect,
        },
        Commands::Login(args) => ScenarioKind::Login {
            email: args.email,
            password: args.password,
            expect_user: args.expect_user,
            expect_error: args.expect_error,
        },
        Commands::Search(args) => ScenarioKind::Search {
            term: args.term,
            expect: args.expect,
        },
        Commands::Register(args) => ScenarioKind::Register {
            record: RegisterData::from_path(&args.record)?,
            continue_after: args.continue_after,
        },
    };

    let scenario = Scenario {
        name: kind.label().to_string(),
        only: false,
        kind,
    };
    block_on(run_single(config, &scenario))
}

fn block_on<F: std::future::Future<Output = CliResult<()>>>(future: F) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(future)
}

fn factory(config: &RunnerConfig) -> ChromiumFactory {
    ChromiumFactory::new(config.engine.clone())
}

async fn run_single(config: RunnerConfig, scenario: &Scenario) -> CliResult<()> {
    let runner = SuiteRunner::new(factory(&config), config);
    let outcome = runner.run_scenario(scenario).await;
    for shot in &outcome.screenshots {
        eprintln!("screenshot: {}", shot.display());
    }
    match outcome.status {
        Status::Failed => Err(CliError::scenario_execution(outcome.message)),
        Status::Passed | Status::Flaky => {
            println!("{}", outcome.message);
            Ok(())
        }
    }
}

async fn run_suite(config: RunnerConfig, args: &SuiteArgs) -> CliResult<()> {
    let suite = Suite::from_path(&args.file)?;
    let runner = SuiteRunner::new(factory(&config), config);
    let selected = runner.select(&suite.scenarios, args.filter.as_deref())?;
    if selected.is_empty() {
        return Err(CliError::invalid_argument("no scenario matches the filter"));
    }

    let mut reporter = ProgressReporter::for_stderr();
    reporter.header(&format!("Suite {}", args.file.display()));
    reporter.info(&format!(
        "{} scenario(s), {} worker(s), {} retr{}",
        selected.len(),
        runner.config().effective_workers(),
        runner.config().retries,
        if runner.config().retries == 1 { "y" } else { "ies" }
    ));
    reporter.start_progress(selected.len() as u64, "scenarios");

    let report = runner
        .run(&selected, |outcome| {
            let line = format!(
                "{} ({} attempt(s)): {}",
                outcome.name, outcome.attempts, outcome.message
            );
            match outcome.status {
                Status::Passed => reporter.success(&line),
                Status::Flaky => reporter.warning(&line),
                Status::Failed => reporter.failure(&line),
            }
            reporter.increment(1);
        })
        .await;
    reporter.finish();

    let path = report.write_json(&runner.config().output_dir)?;
    reporter.info(&format!("report written to {}", path.display()));
    reporter.summary(
        report.count(Status::Passed),
        report.count(Status::Flaky),
        report.count(Status::Failed),
        report.duration(),
    );

    if report.success() {
        Ok(())
    } else {
        Err(CliError::scenario_execution(format!(
            "{} of {} scenario(s) failed",
            report.count(Status::Failed),
            report.outcomes.len()
        )))
    }
}

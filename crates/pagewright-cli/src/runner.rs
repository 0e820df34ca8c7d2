//! Suite runner: schedules scenarios over fresh sessions under a `RunnerConfig`

use crate::error::{CliError, CliResult};
use crate::scenario::{execute, Scenario};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use pagewright::{BrowserEngine, PagewrightResult, RunnerConfig, Session};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// File name of the run report inside the output directory
pub const REPORT_FILE: &str = "report.json";

/// Opens one engine (one tab) per scenario attempt
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Engine type produced
    type Engine: BrowserEngine;

    /// Open a fresh engine
    async fn open(&self) -> PagewrightResult<Self::Engine>;
}

#[async_trait]
impl<F, E> EngineFactory for F
where
    F: Fn() -> PagewrightResult<E> + Send + Sync,
    E: BrowserEngine,
{
    type Engine = E;

    async fn open(&self) -> PagewrightResult<E> {
        self()
    }
}

/// Launches a Chromium per attempt
#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct ChromiumFactory {
    config: pagewright::EngineConfig,
}

#[cfg(feature = "browser")]
impl ChromiumFactory {
    /// Create a factory for the given browser settings
    #[must_use]
    pub const fn new(config: pagewright::EngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl EngineFactory for ChromiumFactory {
    type Engine = pagewright::ChromiumEngine;

    async fn open(&self) -> PagewrightResult<Self::Engine> {
        pagewright::ChromiumEngine::launch(self.config.clone()).await
    }
}

/// Final status of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Passed on the first attempt
    Passed,
    /// Passed after at least one retry
    Flaky,
    /// Failed every attempt
    Failed,
}

/// Result of one scenario across its attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Final status
    pub status: Status,
    /// Attempts made
    pub attempts: u32,
    /// Observation of the passing attempt, or the last error
    pub message: String,
    /// Screenshots captured, in attempt order
    pub screenshots: Vec<PathBuf>,
    /// Wall time over all attempts
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Whether the scenario eventually passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        !matches!(self.status, Status::Failed)
    }
}

/// Outcomes of a suite, in suite order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-scenario outcomes
    pub outcomes: Vec<ScenarioOutcome>,
    /// Wall time of the whole run
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Number of scenarios with the given status
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Whether every scenario eventually passed
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    /// Total wall time
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Write the report as JSON into `dir`
    pub fn write_json(&self, dir: &Path) -> CliResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

/// Runs scenarios with the retry, worker and screenshot policy of a `RunnerConfig`
#[derive(Debug)]
pub struct SuiteRunner<F: EngineFactory> {
    factory: F,
    config: RunnerConfig,
}

impl<F: EngineFactory> SuiteRunner<F> {
    /// Create a runner
    #[must_use]
    pub const fn new(factory: F, config: RunnerConfig) -> Self {
        Self { factory, config }
    }

    /// Runner policy
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Pick the scenarios to run.
    ///
    /// Scenarios marked `only` narrow the run to themselves, unless the policy
    /// forbids `only`, in which case the suite is refused. A name filter then
    /// keeps scenarios whose name contains it.
    pub fn select<'a>(
        &self,
        scenarios: &'a [Scenario],
        filter: Option<&str>,
    ) -> CliResult<Vec<&'a Scenario>> {
        let focused: Vec<&Scenario> = scenarios.iter().filter(|s| s.only).collect();
        if let Some(first) = focused.first() {
            if self.config.forbid_only {
                return Err(CliError::config(format!(
                    "scenario `{}` is marked only, which this policy forbids",
                    first.name
                )));
            }
        }
        let base: Vec<&Scenario> = if focused.is_empty() {
            scenarios.iter().collect()
        } else {
            focused
        };
        Ok(base
            .into_iter()
            .filter(|s| filter.map_or(true, |f| s.name.contains(f)))
            .collect())
    }

    /// Run `scenarios` concurrently and report in their given order.
    ///
    /// `on_done` is called as each scenario finishes.
    pub async fn run<C>(&self, scenarios: &[&Scenario], on_done: C) -> SuiteReport
    where
        C: Fn(&ScenarioOutcome),
    {
        let start = Instant::now();
        let workers = self.config.effective_workers().max(1);
        info!(scenarios = scenarios.len(), workers, "running suite");

        let mut indexed: Vec<(usize, ScenarioOutcome)> =
            stream::iter(scenarios.iter().enumerate())
                .map(|(i, scenario)| async move { (i, self.run_scenario(scenario).await) })
                .buffer_unordered(workers)
                .inspect(|(_, outcome)| on_done(outcome))
                .collect()
                .await;
        indexed.sort_by_key(|(i, _)| *i);

        SuiteReport {
            outcomes: indexed.into_iter().map(|(_, o)| o).collect(),
            duration_ms: elapsed_ms(start),
        }
    }

    /// Run one scenario, retrying a failure up to `retries` times on a fresh session
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        let max_attempts = self.config.retries.saturating_add(1);
        let mut screenshots = Vec::new();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.attempt(scenario, attempt, &mut screenshots).await {
                Ok(message) => {
                    let status = if attempt == 1 {
                        Status::Passed
                    } else {
                        Status::Flaky
                    };
                    info!(scenario = %scenario.name, attempt, ?status, "scenario passed");
                    return ScenarioOutcome {
                        name: scenario.name.clone(),
                        status,
                        attempts: attempt,
                        message,
                        screenshots,
                        duration_ms: elapsed_ms(start),
                    };
                }
                Err(e) => {
                    warn!(scenario = %scenario.name, attempt, error = %e, "scenario attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        ScenarioOutcome {
            name: scenario.name.clone(),
            status: Status::Failed,
            attempts: max_attempts,
            message: last_error,
            screenshots,
            duration_ms: elapsed_ms(start),
        }
    }

    async fn attempt(
        &self,
        scenario: &Scenario,
        attempt: u32,
        screenshots: &mut Vec<PathBuf>,
    ) -> CliResult<String> {
        let engine = self.factory.open().await?;
        let session = Session::open(engine, self.config.session.clone())?;
        let result = execute(&session, &scenario.kind).await;

        if self.config.screenshot.should_capture(result.is_err()) {
            match self.capture(&session, scenario, attempt).await {
                Ok(path) => screenshots.push(path),
                Err(e) => warn!(scenario = %scenario.name, error = %e, "screenshot failed"),
            }
        }
        if let Err(e) = session.close().await {
            warn!(scenario = %scenario.name, error = %e, "closing session failed");
        }
        result
    }

    async fn capture<E: BrowserEngine>(
        &self,
        session: &Session<E>,
        scenario: &Scenario,
        attempt: u32,
    ) -> CliResult<PathBuf> {
        let png = session.screenshot().await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self
            .config
            .output_dir
            .join(format!("{}-attempt{attempt}.png", slug(&scenario.name)));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

/// File-name friendly form of a scenario name
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "scenario".to_string()
    } else {
        trimmed.to_string()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

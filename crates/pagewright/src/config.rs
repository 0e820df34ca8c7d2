//! Session and runner configuration.
//!
//! Configuration is explicit: the base URL, timeouts and runner policy are
//! handed to the session at startup. Nothing in this crate reads the ambient
//! environment; callers that care about CI pick [`RunnerConfig::ci`] themselves.

use crate::driver::EngineConfig;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storefront the page objects model
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

/// Per-session settings shared by every page object on that session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL that relative paths are resolved against
    pub base_url: String,
    /// Bound for a full document load
    #[serde(with = "duration_ms")]
    pub navigation_timeout: Duration,
    /// Bound for an element to become present and actionable
    #[serde(with = "duration_ms")]
    pub action_timeout: Duration,
    /// Bound for network quiescence
    #[serde(with = "duration_ms")]
    pub load_timeout: Duration,
    /// Delay between readiness checks
    #[serde(with = "duration_ms")]
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            navigation_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(5),
            load_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl SessionConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set quiescence timeout
    #[must_use]
    pub const fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Resolve `path` against the base URL.
    ///
    /// Absolute `http(s)://` targets pass through; otherwise base and path are
    /// joined with exactly one `/`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Wait options for the quiescence wait
    #[must_use]
    pub const fn load_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout: self.load_timeout,
            poll_interval: self.poll_interval,
        }
    }

    /// Wait options for element readiness
    #[must_use]
    pub const fn action_wait(&self) -> WaitOptions {
        WaitOptions {
            timeout: self.action_timeout,
            poll_interval: self.poll_interval,
        }
    }

    /// Check the settings before a session is opened
    pub fn validate(&self) -> PagewrightResult<()> {
        if self.base_url.is_empty() {
            return Err(PagewrightError::config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PagewrightError::config(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        for (name, value) in [
            ("navigation_timeout", self.navigation_timeout),
            ("action_timeout", self.action_timeout),
            ("load_timeout", self.load_timeout),
            ("poll_interval", self.poll_interval),
        ] {
            if value.is_zero() {
                return Err(PagewrightError::config(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

/// When to capture a screenshot of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    /// Never capture
    Off,
    /// Capture when a scenario fails
    #[default]
    OnlyOnFailure,
    /// Capture after every scenario
    On,
}

impl ScreenshotMode {
    /// Whether a scenario with the given outcome should be captured
    #[must_use]
    pub const fn should_capture(self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::OnlyOnFailure => failed,
            Self::On => true,
        }
    }
}

/// Runner policy: how scenarios are scheduled around the page objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Session settings for every scenario
    pub session: SessionConfig,
    /// Extra attempts for a failing scenario
    pub retries: u32,
    /// Concurrent sessions (0 = auto-detect)
    pub workers: usize,
    /// Run scenarios of one suite in parallel
    pub fully_parallel: bool,
    /// Refuse suites that mark a scenario `only`
    pub forbid_only: bool,
    /// Screenshot capture policy
    pub screenshot: ScreenshotMode,
    /// Directory for screenshots and reports
    pub output_dir: PathBuf,
    /// Browser settings
    pub engine: EngineConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl RunnerConfig {
    /// Developer-machine policy: no retries, auto-detected workers
    #[must_use]
    pub fn local() -> Self {
        Self {
            session: SessionConfig::default(),
            retries: 0,
            workers: 0,
            fully_parallel: true,
            forbid_only: false,
            screenshot: ScreenshotMode::OnlyOnFailure,
            output_dir: PathBuf::from("target/pagewright"),
            engine: EngineConfig::default(),
        }
    }

    /// CI policy: one retry, a single worker, `only` forbidden
    #[must_use]
    pub fn ci() -> Self {
        Self {
            retries: 1,
            workers: 1,
            forbid_only: true,
            ..Self::local()
        }
    }

    /// Pick the CI or local policy
    #[must_use]
    pub fn for_ci(ci: bool) -> Self {
        if ci {
            Self::ci()
        } else {
            Self::local()
        }
    }

    /// Set the session settings
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Set retries
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set workers
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set screenshot mode
    #[must_use]
    pub const fn with_screenshot(mut self, mode: ScreenshotMode) -> Self {
        self.screenshot = mode;
        self
    }

    /// Set output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set engine settings
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Effective number of concurrent sessions
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        if !self.fully_parallel {
            return 1;
        }
        if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.workers
        }
    }

    /// Parse a YAML document; missing keys keep their local defaults
    pub fn from_yaml_str(yaml: &str) -> PagewrightResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.session.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_path(path: &Path) -> PagewrightResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> PagewrightResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::default();
            assert_eq!(config.base_url, "https://automationexercise.com");
            assert_eq!(config.navigation_timeout, Duration::from_secs(30));
            assert_eq!(config.action_timeout, Duration::from_secs(5));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_resolve_joins_with_one_slash() {
            let config = SessionConfig::new().with_base_url("https://shop.test");
            assert_eq!(config.resolve("/login"), "https://shop.test/login");
            assert_eq!(config.resolve("login"), "https://shop.test/login");
            assert_eq!(config.resolve("/"), "https://shop.test/");

            let trailing = SessionConfig::new().with_base_url("https://shop.test/");
            assert_eq!(trailing.resolve("/products"), "https://shop.test/products");
        }

        #[test]
        fn test_resolve_keeps_absolute_urls() {
            let config = SessionConfig::new();
            assert_eq!(
                config.resolve("https://other.test/x"),
                "https://other.test/x"
            );
        }

        #[test]
        fn test_validate_rejects_bad_base() {
            assert!(SessionConfig::new().with_base_url("").validate().is_err());
            assert!(SessionConfig::new()
                .with_base_url("ftp://shop.test")
                .validate()
                .is_err());
        }

        #[test]
        fn test_validate_rejects_zero_timeouts() {
            let config = SessionConfig::new().with_load_timeout(Duration::ZERO);
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("load_timeout"));
        }

        #[test]
        fn test_wait_options() {
            let config = SessionConfig::new()
                .with_load_timeout(Duration::from_millis(900))
                .with_poll_interval(Duration::from_millis(10));
            assert_eq!(config.load_wait().timeout_ms(), 900);
            assert_eq!(config.action_wait().timeout_ms(), 5000);
        }
    }

    mod runner_config_tests {
        use super::*;

        #[test]
        fn test_local_policy() {
            let config = RunnerConfig::local();
            assert_eq!(config.retries, 0);
            assert_eq!(config.workers, 0);
            assert!(!config.forbid_only);
            assert!(config.effective_workers() >= 1);
        }

        #[test]
        fn test_ci_policy() {
            let config = RunnerConfig::ci();
            assert_eq!(config.retries, 1);
            assert_eq!(config.workers, 1);
            assert!(config.forbid_only);
            assert_eq!(config.effective_workers(), 1);
            assert_eq!(RunnerConfig::for_ci(true), config);
            assert_eq!(RunnerConfig::for_ci(false), RunnerConfig::local());
        }

        #[test]
        fn test_serial_suite_uses_one_worker() {
            let mut config = RunnerConfig::local().with_workers(4);
            assert_eq!(config.effective_workers(), 4);
            config.fully_parallel = false;
            assert_eq!(config.effective_workers(), 1);
        }

        #[test]
        fn test_screenshot_mode() {
            assert!(!ScreenshotMode::Off.should_capture(true));
            assert!(ScreenshotMode::OnlyOnFailure.should_capture(true));
            assert!(!ScreenshotMode::OnlyOnFailure.should_capture(false));
            assert!(ScreenshotMode::On.should_capture(false));
        }

        #[test]
        fn test_from_yaml_partial() {
            let yaml = "retries: 2\nsession:\n  base_url: https://staging.shop.test\n  action_timeout: 1500\nscreenshot: \"on\"\n";
            let config = RunnerConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.retries, 2);
            assert_eq!(config.session.base_url, "https://staging.shop.test");
            assert_eq!(config.session.action_timeout, Duration::from_millis(1500));
            assert_eq!(config.session.load_timeout, Duration::from_secs(30));
            assert_eq!(config.screenshot, ScreenshotMode::On);
        }

        #[test]
        fn test_from_yaml_rejects_invalid_session() {
            let yaml = "session:\n  base_url: not-a-url\n";
            assert!(matches!(
                RunnerConfig::from_yaml_str(yaml),
                Err(PagewrightError::Config { .. })
            ));
        }

        #[test]
        fn test_yaml_round_trip_through_file() {
            let config = RunnerConfig::ci().with_output_dir("reports");
            let yaml = config.to_yaml().unwrap();

            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(yaml.as_bytes()).unwrap();
            let loaded = RunnerConfig::from_path(file.path()).unwrap();
            assert_eq!(loaded, config);
        }
    }
}

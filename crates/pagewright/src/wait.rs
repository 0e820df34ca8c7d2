//! Wait mechanisms for synchronization.
//!
//! Every wait is bounded: it either observes the condition it was asked for or
//! fails with [`PagewrightError::Timeout`]. There is no silent fallback to the
//! last observed state.

use crate::result::{PagewrightError, PagewrightResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::trace;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Upper bound for the wait
    pub timeout: Duration,
    /// Delay between checks
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Timeout in whole milliseconds, for error reporting
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Tracks network activity and decides when a page has gone quiet.
///
/// The page counts as idle once nothing is in flight and no activity was seen
/// for [`NETWORK_IDLE_THRESHOLD_MS`].
#[derive(Debug, Clone)]
pub struct NetworkIdleTracker {
    pending_requests: usize,
    last_activity: Option<Instant>,
    threshold: Duration,
}

impl Default for NetworkIdleTracker {
    fn default() -> Self {
        Self {
            pending_requests: 0,
            last_activity: None,
            threshold: Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS),
        }
    }
}

impl NetworkIdleTracker {
    /// Create a tracker with the default idle window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the idle window
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Record activity observed at `at`, with `pending` requests still in flight
    pub fn record_activity(&mut self, pending: usize, at: Instant) {
        self.pending_requests = pending;
        self.last_activity = Some(at);
    }

    /// Update the in-flight count without marking new activity
    pub fn set_pending(&mut self, pending: usize) {
        self.pending_requests = pending;
    }

    /// Number of requests still in flight
    #[must_use]
    pub const fn pending_requests(&self) -> usize {
        self.pending_requests
    }

    /// Whether the network is idle as of `now`
    #[must_use]
    pub fn is_idle(&self, now: Instant) -> bool {
        if self.pending_requests > 0 {
            return false;
        }
        match self.last_activity {
            Some(last) => now.saturating_duration_since(last) >= self.threshold,
            None => true,
        }
    }
}

/// Poll `check` until it yields `true` or the bound in `options` expires.
///
/// Errors from `check` propagate immediately.
pub async fn poll_until<F, Fut>(
    options: WaitOptions,
    waited_for: &str,
    mut check: F,
) -> PagewrightResult<Duration>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagewrightResult<bool>>,
{
    let start = Instant::now();
    loop {
        if check().await? {
            trace!(waited_for, elapsed = ?start.elapsed(), "wait satisfied");
            return Ok(start.elapsed());
        }
        if start.elapsed() >= options.timeout {
            return Err(PagewrightError::Timeout {
                ms: options.timeout_ms(),
                waited_for: waited_for.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_load_state_event_names() {
            assert_eq!(LoadState::Load.event_name(), "load");
            assert_eq!(LoadState::DomContentLoaded.event_name(), "DOMContentLoaded");
            assert_eq!(LoadState::NetworkIdle.event_name(), "networkidle");
        }

        #[test]
        fn test_load_state_default() {
            assert_eq!(LoadState::default(), LoadState::Load);
        }

        #[test]
        fn test_load_state_display() {
            assert_eq!(format!("{}", LoadState::NetworkIdle), "networkidle");
        }
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms(), DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(
                opts.poll_interval,
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
            );
        }

        #[test]
        fn test_wait_options_builder() {
            let opts = WaitOptions::new()
                .with_timeout(Duration::from_millis(250))
                .with_poll_interval(Duration::from_millis(5));
            assert_eq!(opts.timeout_ms(), 250);
            assert_eq!(opts.poll_interval, Duration::from_millis(5));
        }
    }

    mod network_idle_tests {
        use super::*;

        #[test]
        fn test_fresh_tracker_is_idle() {
            assert!(NetworkIdleTracker::new().is_idle(Instant::now()));
        }

        #[test]
        fn test_pending_requests_block_idle() {
            let mut tracker = NetworkIdleTracker::new();
            let start = Instant::now();
            tracker.record_activity(2, start);
            assert!(!tracker.is_idle(start + Duration::from_secs(5)));
            tracker.set_pending(0);
            assert!(tracker.is_idle(start + Duration::from_secs(5)));
        }

        #[test]
        fn test_idle_window() {
            let mut tracker = NetworkIdleTracker::new();
            let start = Instant::now();
            tracker.record_activity(0, start);
            assert!(!tracker.is_idle(start + Duration::from_millis(499)));
            assert!(tracker.is_idle(start + Duration::from_millis(500)));
        }

        #[test]
        fn test_custom_threshold() {
            let mut tracker = NetworkIdleTracker::new().with_threshold(Duration::from_millis(10));
            let start = Instant::now();
            tracker.record_activity(0, start);
            assert!(tracker.is_idle(start + Duration::from_millis(10)));
        }
    }

    mod poll_until_tests {
        use super::*;

        fn quick() -> WaitOptions {
            WaitOptions::new()
                .with_timeout(Duration::from_millis(60))
                .with_poll_interval(Duration::from_millis(5))
        }

        #[tokio::test]
        async fn test_resolves_when_check_turns_true() {
            let calls = AtomicUsize::new(0);
            let result = poll_until(quick(), "third check", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            })
            .await;
            assert!(result.is_ok());
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_times_out() {
            let err = poll_until(quick(), "never", || async { Ok(false) })
                .await
                .unwrap_err();
            match err {
                PagewrightError::Timeout { ms, waited_for } => {
                    assert_eq!(ms, 60);
                    assert_eq!(waited_for, "never");
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_check_error_propagates() {
            let err = poll_until(quick(), "broken", || async {
                Err(PagewrightError::engine("connection closed"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, PagewrightError::Engine { .. }));
        }
    }
}

//! Real browser control over the Chrome `DevTools` Protocol.
//!
//! [`ChromiumEngine`] drives one Chromium tab through chromiumoxide. Element
//! operations go through the JavaScript lookup expressions of
//! [`Selector`](crate::Selector): an action first polls the element's status
//! until it is present, rendered and enabled, then performs the action in the
//! page. When the action wait expires the last observed status decides the
//! error (`ElementNotFound` or `ElementNotInteractable`).
//!
//! A script that runs while the document is being replaced sees its execution
//! context destroyed; that reads as "not ready yet", never as an error.
//! Network quiescence counts in-flight requests from CDP network events.

use crate::driver::{BrowserEngine, EngineConfig};
use crate::locator::Selector;
use crate::result::{PagewrightError, PagewrightResult};
use crate::wait::{poll_until, LoadState, NetworkIdleTracker, WaitOptions};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventLoadingFailed, EventLoadingFinished,
    EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// How long a click waits for the navigation it may have started
const NAVIGATION_GRACE: Duration = Duration::from_millis(500);

/// Evaluate errors raised when the page's document is replaced mid-call
const CONTEXT_LOST_MARKERS: [&str; 3] = [
    "Execution context was destroyed",
    "Cannot find context with specified id",
    "Inspected target navigated or closed",
];

fn is_context_lost(message: &str) -> bool {
    CONTEXT_LOST_MARKERS.iter().any(|m| message.contains(m))
}

/// Readiness of an element as reported by the status script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementStatus {
    Missing,
    Hidden,
    Disabled,
    Ready,
}

impl ElementStatus {
    fn parse(status: &str) -> Self {
        match status {
            "ok" => Self::Ready,
            "hidden" => Self::Hidden,
            "disabled" => Self::Disabled,
            _ => Self::Missing,
        }
    }

    fn into_error(self, selector: &Selector) -> PagewrightError {
        match self {
            Self::Missing => PagewrightError::not_found(selector),
            Self::Hidden => PagewrightError::not_interactable(selector, "element is hidden"),
            Self::Disabled => PagewrightError::not_interactable(selector, "element is disabled"),
            Self::Ready => PagewrightError::engine(format!("{selector} became ready after the wait expired")),
        }
    }
}

/// Map the string an action script returns onto a result
fn action_outcome(outcome: &str, selector: &Selector) -> PagewrightResult<()> {
    match outcome {
        "ok" => Ok(()),
        "no-option" => Err(PagewrightError::not_interactable(selector, "no matching option")),
        "unchecked" => Err(PagewrightError::not_interactable(
            selector,
            "element did not become checked",
        )),
        other => Err(ElementStatus::parse(other).into_error(selector)),
    }
}

/// In-flight requests of one tab, fed by CDP network events
#[derive(Debug, Default)]
struct RequestLedger {
    inflight: HashSet<String>,
    generation: u64,
}

impl RequestLedger {
    fn started(&mut self, id: String) {
        self.inflight.insert(id);
        self.generation += 1;
    }

    fn finished(&mut self, id: &str) {
        if self.inflight.remove(id) {
            self.generation += 1;
        }
    }

    fn pending(&self) -> usize {
        self.inflight.len()
    }

    const fn generation(&self) -> u64 {
        self.generation
    }
}

enum NetworkEvent {
    Started(String),
    Finished(String),
}

fn status_script(selector: &Selector) -> String {
    format!(
        "(el => {{ \
            if (!el) return 'missing'; \
            const style = window.getComputedStyle(el); \
            const rect = el.getBoundingClientRect(); \
            if (style.display === 'none' || style.visibility === 'hidden' || (rect.width === 0 && rect.height === 0)) return 'hidden'; \
            if (el.disabled) return 'disabled'; \
            return 'ok'; \
        }})({})",
        selector.to_query()
    )
}

fn click_script(selector: &Selector) -> String {
    format!(
        "(el => {{ \
            if (!el) return 'missing'; \
            el.scrollIntoView({{ block: 'center' }}); \
            el.click(); \
            return 'ok'; \
        }})({})",
        selector.to_query()
    )
}

fn fill_script(selector: &Selector, value: &str) -> PagewrightResult<String> {
    Ok(format!(
        "((el, v) => {{ \
            if (!el) return 'missing'; \
            el.focus(); \
            el.value = v; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return 'ok'; \
        }})({}, {})",
        selector.to_query(),
        js_string(value)?
    ))
}

fn select_script(selector: &Selector, value: &str) -> PagewrightResult<String> {
    Ok(format!(
        "((el, v) => {{ \
            if (!el) return 'missing'; \
            const opt = Array.from(el.options || []).find(o => o.value === v || o.label.trim() === v || o.text.trim() === v); \
            if (!opt) return 'no-option'; \
            el.value = opt.value; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return 'ok'; \
        }})({}, {})",
        selector.to_query(),
        js_string(value)?
    ))
}

fn check_script(selector: &Selector) -> String {
    format!(
        "(el => {{ \
            if (!el) return 'missing'; \
            if (!el.checked) el.click(); \
            return el.checked ? 'ok' : 'unchecked'; \
        }})({})",
        selector.to_query()
    )
}

fn js_string(value: &str) -> PagewrightResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// `BrowserEngine` backed by a Chromium tab
#[derive(Debug)]
pub struct ChromiumEngine {
    browser: tokio::sync::Mutex<CdpBrowser>,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
    requests: Arc<Mutex<RequestLedger>>,
    network: tokio::task::JoinHandle<()>,
    config: EngineConfig,
}

impl ChromiumEngine {
    /// Launch Chromium and open a blank tab
    pub async fn launch(config: EngineConfig) -> PagewrightResult<Self> {
        let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        if let Some(ref ua) = config.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }

        let cdp_config = builder
            .build()
            .map_err(|message| PagewrightError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| PagewrightError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PagewrightError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let requests = Arc::new(Mutex::new(RequestLedger::default()));
        let network = Self::track_requests(&page, Arc::clone(&requests)).await?;

        info!(headless = config.headless, "chromium launched");
        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            handler,
            requests,
            network,
            config,
        })
    }

    async fn track_requests(
        page: &CdpPage,
        requests: Arc<Mutex<RequestLedger>>,
    ) -> PagewrightResult<tokio::task::JoinHandle<()>> {
        let launch_error = |e: chromiumoxide::error::CdpError| PagewrightError::BrowserLaunch {
            message: e.to_string(),
        };
        page.execute(NetworkEnableParams::default())
            .await
            .map_err(launch_error)?;

        let sent = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(launch_error)?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(launch_error)?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(launch_error)?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));

        let streams: Vec<BoxStream<'static, NetworkEvent>> =
            vec![sent.boxed(), finished.boxed(), failed.boxed()];
        let mut events = stream::select_all(streams);
        Ok(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let mut ledger = requests.lock().unwrap_or_else(PoisonError::into_inner);
                match event {
                    NetworkEvent::Started(id) => ledger.started(id),
                    NetworkEvent::Finished(id) => ledger.finished(&id),
                }
            }
        }))
    }

    /// Launch settings
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> PagewrightResult<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(PagewrightError::engine)?;
        result.into_value().map_err(PagewrightError::engine)
    }

    /// Like `eval`, but `None` when the document went away under the call
    async fn try_eval<T: DeserializeOwned>(&self, script: String) -> PagewrightResult<Option<T>> {
        match self.page.evaluate(script).await {
            Ok(result) => result.into_value().map(Some).map_err(PagewrightError::engine),
            Err(e) if is_context_lost(&e.to_string()) => {
                trace!(error = %e, "execution context replaced");
                Ok(None)
            }
            Err(e) => Err(PagewrightError::engine(e)),
        }
    }

    /// Status of the first match; `None` while the document is being replaced
    async fn status(&self, selector: &Selector) -> PagewrightResult<Option<ElementStatus>> {
        let status: Option<String> = self.try_eval(status_script(selector)).await?;
        Ok(status.map(|s| ElementStatus::parse(&s)))
    }

    /// Run an action script that answers with an outcome string
    async fn act(&self, selector: &Selector, script: String) -> PagewrightResult<()> {
        let outcome: String = self.eval(script).await?;
        action_outcome(&outcome, selector)
    }

    /// Poll until the element satisfies `accept`, then report the last status
    async fn wait_for_status(
        &self,
        selector: &Selector,
        wait: WaitOptions,
        accept: fn(ElementStatus) -> bool,
    ) -> PagewrightResult<()> {
        let last = Mutex::new(ElementStatus::Missing);
        let last = &last;
        let waited_for = format!("{selector}");
        let outcome = poll_until(wait, &waited_for, move || async move {
            let Some(status) = self.status(selector).await? else {
                return Ok(false);
            };
            *last.lock().unwrap_or_else(PoisonError::into_inner) = status;
            Ok(accept(status))
        })
        .await;

        match outcome {
            Ok(_) => Ok(()),
            Err(PagewrightError::Timeout { .. }) => {
                let status = *last.lock().unwrap_or_else(PoisonError::into_inner);
                Err(status.into_error(selector))
            }
            Err(e) => Err(e),
        }
    }

    async fn actionable(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()> {
        self.wait_for_status(selector, wait, |s| s == ElementStatus::Ready)
            .await
    }

    async fn attached(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()> {
        self.wait_for_status(selector, wait, |s| s != ElementStatus::Missing)
            .await
    }

    /// `document.readyState`; `None` while the document is being replaced
    async fn ready_state(&self) -> PagewrightResult<Option<String>> {
        self.try_eval("document.readyState".to_string()).await
    }

    /// In-flight request count and the ledger generation
    fn network_snapshot(&self) -> (usize, u64) {
        let ledger = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        (ledger.pending(), ledger.generation())
    }

    async fn wait_network_idle(&self, wait: WaitOptions) -> PagewrightResult<()> {
        let tracker = Mutex::new((NetworkIdleTracker::new(), None::<u64>));
        let tracker = &tracker;
        poll_until(wait, LoadState::NetworkIdle.event_name(), move || async move {
            let loading = self
                .ready_state()
                .await?
                .map_or(true, |ready| ready != "complete");
            let (inflight, generation) = self.network_snapshot();
            let now = Instant::now();
            let mut guard = tracker.lock().unwrap_or_else(PoisonError::into_inner);
            let (idle, last_generation) = &mut *guard;
            let pending = inflight + usize::from(loading);
            if *last_generation != Some(generation) || pending > 0 {
                idle.record_activity(pending, now);
                *last_generation = Some(generation);
            } else {
                idle.set_pending(0);
            }
            Ok(idle.is_idle(now))
        })
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn goto(&self, url: &str, timeout: Duration) -> PagewrightResult<()> {
        debug!(url, "cdp goto");
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PagewrightError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(PagewrightError::Timeout {
                ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                waited_for: format!("navigation to {url}"),
            }),
        }
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        let url = self.page.url().await.map_err(PagewrightError::engine)?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> PagewrightResult<String> {
        let title = self.page.get_title().await.map_err(PagewrightError::engine)?;
        Ok(title.unwrap_or_default())
    }

    async fn wait_for_load_state(
        &self,
        state: LoadState,
        wait: WaitOptions,
    ) -> PagewrightResult<()> {
        match state {
            LoadState::NetworkIdle => self.wait_network_idle(wait).await,
            LoadState::Load | LoadState::DomContentLoaded => {
                poll_until(wait, state.event_name(), move || async move {
                    let Some(ready) = self.ready_state().await? else {
                        return Ok(false);
                    };
                    Ok(match state {
                        LoadState::Load => ready == "complete",
                        _ => ready != "loading",
                    })
                })
                .await
                .map(|_| ())
            }
        }
    }

    async fn is_visible(&self, selector: &Selector) -> PagewrightResult<bool> {
        let status = self.status(selector).await?;
        Ok(matches!(
            status,
            Some(ElementStatus::Ready | ElementStatus::Disabled)
        ))
    }

    async fn click(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()> {
        self.actionable(selector, wait).await?;
        let script = click_script(selector);
        // A click that replaces the document synchronously loses the reply
        if let Some(outcome) = self.try_eval::<String>(script).await? {
            action_outcome(&outcome, selector)?;
        }
        if tokio::time::timeout(NAVIGATION_GRACE, self.page.wait_for_navigation())
            .await
            .is_ok()
        {
            trace!(%selector, "click settled");
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str, wait: WaitOptions) -> PagewrightResult<()> {
        self.actionable(selector, wait).await?;
        let script = fill_script(selector, value)?;
        self.act(selector, script).await
    }

    async fn select_option(
        &self,
        selector: &Selector,
        value: &str,
        wait: WaitOptions,
    ) -> PagewrightResult<()> {
        self.actionable(selector, wait).await?;
        let outcome: String = self.eval(select_script(selector, value)?).await?;
        if outcome == "no-option" {
            return Err(PagewrightError::not_interactable(
                selector,
                format!("no option matching {value:?}"),
            ));
        }
        action_outcome(&outcome, selector)
    }

    async fn check(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<()> {
        self.actionable(selector, wait).await?;
        let script = check_script(selector);
        self.act(selector, script).await
    }

    async fn is_checked(&self, selector: &Selector) -> PagewrightResult<bool> {
        let script = format!("(el => el ? !!el.checked : null)({})", selector.to_query());
        let checked: Option<bool> = self.eval(script).await?;
        checked.ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn input_value(&self, selector: &Selector) -> PagewrightResult<String> {
        let script = format!("(el => el ? String(el.value) : null)({})", selector.to_query());
        let value: Option<String> = self.eval(script).await?;
        value.ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn inner_text(&self, selector: &Selector, wait: WaitOptions) -> PagewrightResult<String> {
        self.attached(selector, wait).await?;
        let script = format!("(el => el ? el.innerText : null)({})", selector.to_query());
        let text: Option<String> = self.eval(script).await?;
        text.ok_or_else(|| PagewrightError::not_found(selector))
    }

    async fn all_inner_texts(&self, selector: &Selector) -> PagewrightResult<Vec<String>> {
        let script = format!("{}.map(el => el.innerText)", selector.to_query_all());
        self.eval(script).await
    }

    async fn screenshot(&self) -> PagewrightResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(PagewrightError::engine)?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(PagewrightError::engine)
    }

    async fn close(&self) -> PagewrightResult<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(PagewrightError::engine)?;
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(PagewrightError::engine)?;
        let _ = browser.wait().await;
        self.network.abort();
        self.handler.abort();
        debug!("chromium closed");
        Ok(())
    }
}

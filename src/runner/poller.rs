//! Page-state polling
//!
//! Bridges "action submitted" and "application finished reacting": every
//! wait samples the page at a fixed sub-second interval until something
//! recognizable shows up or its timeout elapses. Nothing here waits
//! without a deadline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::common::{resolve_url, same_url};
use crate::driver::traits::{BrowserSession, Selector};
use crate::error::{HarnessError, HarnessResult};

/// What the current page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageState {
    FormReady,
    RedirectedToLogin,
    AccessDenied,
    ApprovalPending,
    Unknown,
}

impl PageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageState::FormReady => "form-ready",
            PageState::RedirectedToLogin => "redirected-to-login",
            PageState::AccessDenied => "access-denied",
            PageState::ApprovalPending => "approval-pending",
            PageState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only page check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Current URL contains the fragment, case-insensitively
    UrlContains(String),
    /// Current URL equals the target (relative targets resolve against the base URL)
    UrlEquals(String),
    ElementPresent(Selector),
    TextPresent(String),
}

impl Probe {
    pub async fn holds(&self, session: &dyn BrowserSession, url: &str) -> HarnessResult<bool> {
        match self {
            Probe::UrlContains(fragment) => {
                Ok(url.to_lowercase().contains(&fragment.to_lowercase()))
            }
            Probe::UrlEquals(target) => {
                Ok(same_url(url, &resolve_url(session.base_url(), target)))
            }
            Probe::ElementPresent(selector) => session.is_present(selector).await,
            Probe::TextPresent(text) => session.is_present(&Selector::text(text.as_str())).await,
        }
    }
}

/// Maps a probe to the state it indicates
#[derive(Debug, Clone)]
pub struct Recognizer {
    pub state: PageState,
    pub probe: Probe,
    /// Settling recognizers end the wait. Tentative ones (loading screens)
    /// are only reported if nothing settles before the timeout.
    pub settles: bool,
}

impl Recognizer {
    pub fn settle(state: PageState, probe: Probe) -> Self {
        Self {
            state,
            probe,
            settles: true,
        }
    }

    pub fn tentative(state: PageState, probe: Probe) -> Self {
        Self {
            state,
            probe,
            settles: false,
        }
    }
}

/// Timeout and tick interval of one wait
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(6),
            interval: Duration::from_millis(250),
        }
    }
}

/// Call `check` every `settings.interval` until it yields a value or the
/// timeout passes. At least one check always runs.
///
/// Driver errors are tolerated for the tick they happen in: reads race
/// against client-side navigation and the next sample usually succeeds.
pub async fn poll<T, F, Fut>(settings: PollSettings, mut check: F) -> HarnessResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<Option<T>>>,
{
    let deadline = Instant::now() + settings.timeout;

    loop {
        match check().await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(HarnessError::Driver(e)) => log::debug!("Poll sample failed: {:#}", e),
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(settings.interval.min(deadline - now)).await;
    }
}

/// Wait until any candidate text is on the page.
///
/// Returns the first candidate, in input order, present on a tick; DOM
/// order plays no part. An empty candidate list returns `None` at once.
pub async fn wait_for_any_text(
    session: &dyn BrowserSession,
    candidates: &[String],
    settings: PollSettings,
) -> HarnessResult<Option<String>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    poll(settings, || async move {
        for candidate in candidates {
            if session.is_present(&Selector::text(candidate.as_str())).await? {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    })
    .await
}

/// Wait until one of `recognizers` identifies the page.
///
/// Recognizers are evaluated in slice order on every tick.
pub async fn wait_for_state(
    session: &dyn BrowserSession,
    recognizers: &[Recognizer],
    settings: PollSettings,
) -> HarnessResult<PageState> {
    let deadline = Instant::now() + settings.timeout;
    let mut tentative: Option<PageState> = None;

    loop {
        match sample_state(session, recognizers, &mut tentative).await {
            Ok(Some(state)) => return Ok(state),
            Ok(None) => {}
            Err(HarnessError::Driver(e)) => log::debug!("State sample failed: {:#}", e),
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(tentative.unwrap_or(PageState::Unknown));
        }
        tokio::time::sleep(settings.interval.min(deadline - now)).await;
    }
}

async fn sample_state(
    session: &dyn BrowserSession,
    recognizers: &[Recognizer],
    tentative: &mut Option<PageState>,
) -> HarnessResult<Option<PageState>> {
    let url = session.current_url().await?;
    for recognizer in recognizers {
        if recognizer.probe.holds(session, &url).await? {
            if recognizer.settles {
                return Ok(Some(recognizer.state));
            }
            *tentative = Some(recognizer.state);
        }
    }
    Ok(None)
}

/// Wait until the current URL contains `fragment`; returns that URL
pub async fn wait_for_url(
    session: &dyn BrowserSession,
    fragment: &str,
    settings: PollSettings,
) -> HarnessResult<Option<String>> {
    let probe = Probe::UrlContains(fragment.to_string());
    let probe = &probe;
    poll(settings, || async move {
        let url = session.current_url().await?;
        Ok(probe.holds(session, &url).await?.then_some(url))
    })
    .await
}

/// Wait until `selector` matches at least one element
pub async fn wait_for_element(
    session: &dyn BrowserSession,
    selector: &Selector,
    settings: PollSettings,
) -> HarnessResult<bool> {
    let found = poll(settings, || async move {
        Ok(session.is_present(selector).await?.then_some(()))
    })
    .await?;
    Ok(found.is_some())
}

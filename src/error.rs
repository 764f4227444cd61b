use thiserror::Error;

use crate::runner::poller::PageState;

/// Failures raised by the session driver and the scenario steps.
///
/// Everything except [`HarnessError::Launch`] is scenario-local: the runner
/// turns it into a failed verdict and moves on to the next scenario.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Browser or driver could not be started. Aborts the whole run.
    #[error("failed to launch browser session: {0:#}")]
    Launch(anyhow::Error),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A required element was definitely absent.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Nothing expected showed up within the budget; it may still appear later.
    #[error("timed out after {after_ms}ms waiting for {what}")]
    Timeout { what: String, after_ms: u64 },

    #[error("unexpected page state: {0}")]
    UnexpectedPageState(PageState),

    #[error("driver error: {0:#}")]
    Driver(#[from] anyhow::Error),
}

impl HarnessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, HarnessError::Launch(_))
    }
}

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

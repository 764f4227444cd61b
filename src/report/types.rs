use crate::runner::state::{SuiteResult, Verdict};
use serde::{Deserialize, Serialize};

/// Persisted results of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub suite: String,
    pub session_id: String,
    pub verdicts: Vec<Verdict>,
    pub summary: SuiteResult,
    pub generated_at: String,
}

impl SuiteReport {
    pub fn new(suite: &str, verdicts: Vec<Verdict>) -> Self {
        let summary = SuiteResult::from_verdicts(&verdicts);
        Self {
            suite: suite.to_string(),
            session_id: uuid::Uuid::new_v4().to_string(),
            verdicts,
            summary,
            generated_at: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        }
    }
}

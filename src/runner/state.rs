use serde::{Deserialize, Serialize};

/// Scenario outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Passed,
    Failed,
    /// Nothing on the page to exercise; not evidence either way
    Skipped,
}

impl VerdictStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerdictStatus::Passed => "PASS",
            VerdictStatus::Failed => "FAIL",
            VerdictStatus::Skipped => "SKIP",
        }
    }
}

/// Result of one scenario. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub name: String,
    pub status: VerdictStatus,
    pub detail: String,
    pub duration_ms: u64,
}

impl Verdict {
    pub fn passed(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(name, VerdictStatus::Passed, detail, duration_ms)
    }

    pub fn failed(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(name, VerdictStatus::Failed, detail, duration_ms)
    }

    pub fn skipped(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(name, VerdictStatus::Skipped, detail, duration_ms)
    }

    fn new(name: &str, status: VerdictStatus, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
            duration_ms,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == VerdictStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == VerdictStatus::Failed
    }
}

/// Aggregate counts over a run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResult {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: u64,
}

impl SuiteResult {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        verdicts.iter().fold(Self::default(), |mut acc, v| {
            acc.total += 1;
            acc.total_duration_ms += v.duration_ms;
            match v.status {
                VerdictStatus::Passed => acc.passed += 1,
                VerdictStatus::Failed => acc.failed += 1,
                VerdictStatus::Skipped => acc.skipped += 1,
            }
            acc
        })
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Append-only, order-preserving verdict log of one suite run
#[derive(Debug, Clone, Default)]
pub struct VerdictLog {
    verdicts: Vec<Verdict>,
}

impl VerdictLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn summary(&self) -> SuiteResult {
        SuiteResult::from_verdicts(&self.verdicts)
    }

    pub fn into_verdicts(self) -> Vec<Verdict> {
        self.verdicts
    }
}

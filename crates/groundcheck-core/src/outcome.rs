use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Failed,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Skipped => write!(f, "skipped"),
            OutcomeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Last state a record reached in the per-record workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStage {
    Start,
    Prefiltered,
    Located,
    Validated,
    Submitted,
    Done,
}

/// Terminal classification of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub row: usize,
    pub record_id: String,
    pub status: OutcomeStatus,
    pub detail: String,
    pub stage: ProcessStage,
}

impl Outcome {
    pub fn success(
        row: usize,
        record_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            row,
            record_id: record_id.into(),
            status: OutcomeStatus::Success,
            detail: detail.into(),
            stage: ProcessStage::Done,
        }
    }

    pub fn skipped(
        row: usize,
        record_id: impl Into<String>,
        stage: ProcessStage,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            row,
            record_id: record_id.into(),
            status: OutcomeStatus::Skipped,
            detail: detail.into(),
            stage,
        }
    }

    pub fn failed(
        row: usize,
        record_id: impl Into<String>,
        stage: ProcessStage,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            row,
            record_id: record_id.into(),
            status: OutcomeStatus::Failed,
            detail: detail.into(),
            stage,
        }
    }
}

/// Running tally of outcomes for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunCounts {
    pub fn record(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Success => self.success += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

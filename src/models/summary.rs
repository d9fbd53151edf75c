use serde::{Deserialize, Serialize};

use super::filing::Office;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteSummary {
    pub members: usize,
    pub filings: usize,
    pub assets: usize,
    pub transactions_inserted: usize,
    pub duplicates_skipped: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilingFailure {
    pub doc_id: String,
    pub office: Office,
    pub kind: String,
    pub message: String,
}

/// Per-source counters for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceReport {
    pub scraped: usize,
    pub new_filings: usize,
    pub failed_filings: usize,
    pub transactions: usize,
    pub skipped: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub dry_run: bool,
    pub transactions: usize,
    pub house: SourceReport,
    pub senate: SourceReport,
    pub failures: Vec<FilingFailure>,
    pub write: Option<WriteSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunSummary),
    Aborted { reason: String },
}

impl RunOutcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            RunOutcome::Aborted { .. } => None,
        }
    }
}

use crate::record::RecordKey;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one copy run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CopySummary {
    /// Records returned by source scans.
    pub records_read: u64,

    /// Records the destination confirmed written.
    pub records_written: u64,

    /// Scan pages issued, including empty continuation pages.
    pub pages_scanned: u64,

    /// Batch submissions issued, including resubmissions of unprocessed
    /// subsets.
    pub batches_submitted: u64,

    /// Records that were never confirmed written after retries were
    /// exhausted. Reported so the operator can run a targeted repair
    /// instead of a full re-copy.
    pub failed: Vec<FailedRecord>,

    pub elapsed: Duration,
}

impl CopySummary {
    /// True when every record read was confirmed written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A record that remained unwritten when the run finished, identified by
/// its primary-key projection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FailedRecord {
    pub key: RecordKey,
    pub error: String,
    pub attempts: u32,
}

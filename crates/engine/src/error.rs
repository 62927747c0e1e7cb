use connectors::error::StoreError;
use model::pagination::Cursor;
use std::fmt;
use thiserror::Error;

/// Top-level errors of a copy run. Both variants carry the progress made
/// so far, so a re-run can be informed even though the engine keeps no
/// checkpoint state.
#[derive(Debug, Error)]
pub enum CopyError {
    /// A non-retryable store failure, or a read whose retries were
    /// exhausted. The cursor is the position the failed page was read
    /// from (it never advances on a failed read).
    #[error(
        "{operation} failed at cursor {cursor:?} after {records_written} of {records_read} read records were written: {source}"
    )]
    Store {
        operation: Operation,
        cursor: Cursor,
        records_read: u64,
        records_written: u64,
        #[source]
        source: StoreError,
    },

    /// External cancellation observed between pages.
    #[error(
        "shutdown requested after {records_written} of {records_read} read records were written"
    )]
    ShutdownRequested {
        records_read: u64,
        records_written: u64,
    },
}

/// Which store call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Scan,
    BatchWrite,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Scan => write!(f, "scan"),
            Operation::BatchWrite => write!(f, "batch write"),
        }
    }
}

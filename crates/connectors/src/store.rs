use crate::error::StoreError;
use async_trait::async_trait;
use model::{
    pagination::{Cursor, FetchResult},
    record::Record,
};

/// Hard ceiling the store imposes on a single batch-write request.
pub const STORE_BATCH_CEILING: usize = 25;

/// A key-value table endpoint the copy engine can read from or write to.
///
/// Contract:
/// - `scan_page` bounds the number of items *evaluated* server-side, not
///   the number returned; the previous page's cursor must be passed back
///   verbatim as the new start position.
/// - `write_batch` submits ONE batch of at most [`STORE_BATCH_CEILING`]
///   records and returns the subset the store declined (empty means all
///   accepted). Splitting a page into batches is the engine's job, as is
///   resubmitting the declined records.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Reads one page of records starting strictly after `cursor`.
    async fn scan_page(
        &self,
        table: &str,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<FetchResult, StoreError>;

    /// Submits one bounded batch of put operations and returns the records
    /// the store left unprocessed.
    async fn write_batch(&self, table: &str, records: &[Record])
    -> Result<Vec<Record>, StoreError>;

    /// Primary-key attribute names of the table, used for failure
    /// reporting.
    async fn key_names(&self, table: &str) -> Result<Vec<String>, StoreError>;
}

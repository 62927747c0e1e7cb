use crate::{
    config::CopyConfig,
    error::{CopyError, Operation},
    retry::{RetryDisposition, RetryPolicy, classify_store_error},
};
use connectors::store::TableStore;
use model::{
    pagination::{Cursor, FetchResult},
    record::Record,
    summary::{CopySummary, FailedRecord},
};
use std::{sync::Arc, time::Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// States of the copy loop: scan one page, write it in bounded batches,
/// repeat until a scan comes back without a continuation cursor.
enum CopyState {
    Scanning,
    Writing(FetchResult),
    Done,
}

/// One full-table copy between two store endpoints. Created per
/// invocation; the only mutable state is the cursor, and only the job's
/// own sequential loop ever advances it.
pub struct CopyJob {
    source: Arc<dyn TableStore>,
    destination: Arc<dyn TableStore>,
    config: CopyConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Progress {
    cursor: Cursor,
    records_read: u64,
    records_written: u64,
    pages_scanned: u64,
    batches_submitted: u64,
    failed: Vec<FailedRecord>,
}

impl Progress {
    fn into_summary(self, elapsed: std::time::Duration) -> CopySummary {
        CopySummary {
            records_read: self.records_read,
            records_written: self.records_written,
            pages_scanned: self.pages_scanned,
            batches_submitted: self.batches_submitted,
            failed: self.failed,
            elapsed,
        }
    }
}

impl CopyJob {
    pub fn new(
        source: Arc<dyn TableStore>,
        destination: Arc<dyn TableStore>,
        config: CopyConfig,
    ) -> Self {
        let retry = config.settings.retry_policy();
        Self {
            source,
            destination,
            config,
            retry,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancellation takes effect between pages, never mid-batch, so no
    /// page is left half-written.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Drives the copy to completion and returns what happened. Transient
    /// store errors are retried internally; everything else aborts with
    /// the progress made so far.
    pub async fn run(&self) -> Result<CopySummary, CopyError> {
        let started = Instant::now();
        info!(
            source = %self.config.source_table,
            target = %self.config.target_table,
            page_size = self.config.settings.page_size,
            batch_size = self.config.settings.effective_batch_size(),
            "Starting table copy"
        );

        // Key schema is only needed to identify records in failure
        // reports; a copy can proceed without it.
        let key_names = match self.destination.key_names(&self.config.target_table).await {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "Could not resolve destination key schema; failure reports will omit keys");
                Vec::new()
            }
        };

        let mut progress = Progress::default();
        let mut state = CopyState::Scanning;

        loop {
            state = match state {
                CopyState::Scanning => {
                    if self.cancel.is_cancelled() {
                        warn!("Shutdown requested; stopping between pages");
                        return Err(CopyError::ShutdownRequested {
                            records_read: progress.records_read,
                            records_written: progress.records_written,
                        });
                    }

                    let page = self.read_page(&progress).await?;
                    progress.pages_scanned += 1;
                    progress.records_read += page.records.len() as u64;
                    debug!(
                        page = progress.pages_scanned,
                        records = page.records.len(),
                        has_cursor = page.next_cursor.is_some(),
                        "Scanned page"
                    );

                    if page.records.is_empty() {
                        // An empty page with a continuation cursor means the
                        // items were filtered out server-side; keep scanning.
                        match page.next_cursor {
                            Some(key) => {
                                progress.cursor = Cursor::At(key);
                                CopyState::Scanning
                            }
                            None => CopyState::Done,
                        }
                    } else {
                        CopyState::Writing(page)
                    }
                }
                CopyState::Writing(page) => {
                    let next_cursor = page.next_cursor;
                    self.write_page(page.records, &key_names, &mut progress)
                        .await?;

                    // The cursor advances only once the page's writes are
                    // resolved, so a rerun resumes from the last fully
                    // attempted page (at-least-once for the page in flight).
                    match next_cursor {
                        Some(key) => {
                            progress.cursor = Cursor::At(key);
                            CopyState::Scanning
                        }
                        None => CopyState::Done,
                    }
                }
                CopyState::Done => break,
            };
        }

        let summary = progress.into_summary(started.elapsed());
        if summary.is_complete() {
            info!(
                records = summary.records_written,
                pages = summary.pages_scanned,
                elapsed_ms = summary.elapsed.as_millis(),
                "Table copy complete"
            );
        } else {
            warn!(
                records = summary.records_written,
                failed = summary.failed.len(),
                "Table copy finished with unwritten records"
            );
        }
        Ok(summary)
    }

    /// Reads one page under the retry policy. The cursor is not advanced
    /// on failure, so a retried read always resumes from last confirmed
    /// progress.
    async fn read_page(&self, progress: &Progress) -> Result<FetchResult, CopyError> {
        let source = self.source.clone();
        let table = self.config.source_table.clone();
        let cursor = progress.cursor.clone();
        let page_size = self.config.settings.page_size;

        let result = self
            .retry
            .run(
                || {
                    let source = source.clone();
                    let table = table.clone();
                    let cursor = cursor.clone();
                    async move { source.scan_page(&table, &cursor, page_size).await }
                },
                classify_store_error,
            )
            .await;

        result.map_err(|err| CopyError::Store {
            operation: Operation::Scan,
            cursor: progress.cursor.clone(),
            records_read: progress.records_read,
            records_written: progress.records_written,
            source: err.into_inner(),
        })
    }

    /// Writes one page in batches of at most the effective batch size,
    /// in page order.
    async fn write_page(
        &self,
        records: Vec<Record>,
        key_names: &[String],
        progress: &mut Progress,
    ) -> Result<(), CopyError> {
        let batch_size = self.config.settings.effective_batch_size();
        for chunk in records.chunks(batch_size) {
            self.submit_batch(chunk, key_names, progress).await?;
        }
        Ok(())
    }

    /// Submits one batch, resubmitting only the unprocessed subset with
    /// backoff. When the attempt budget runs out, the leftover records
    /// are reported by key rather than silently dropped. Fatal store
    /// errors abort the job.
    async fn submit_batch(
        &self,
        chunk: &[Record],
        key_names: &[String],
        progress: &mut Progress,
    ) -> Result<(), CopyError> {
        let mut pending: Vec<Record> = chunk.to_vec();
        let mut attempt = 0usize;

        loop {
            progress.batches_submitted += 1;
            match self
                .destination
                .write_batch(&self.config.target_table, &pending)
                .await
            {
                Ok(unprocessed) => {
                    let accepted = pending.len() - unprocessed.len();
                    progress.records_written += accepted as u64;

                    if unprocessed.is_empty() {
                        return Ok(());
                    }

                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            leftover = unprocessed.len(),
                            attempts = attempt,
                            "Write retries exhausted; reporting unwritten records"
                        );
                        self.report_failures(
                            unprocessed,
                            "unprocessed after retries",
                            attempt,
                            key_names,
                            progress,
                        );
                        return Ok(());
                    }

                    debug!(
                        unprocessed = unprocessed.len(),
                        attempt, "Store declined part of the batch; resubmitting"
                    );
                    pending = unprocessed;
                    sleep(self.retry.delay_for(attempt - 1)).await;
                }
                Err(err) => match classify_store_error(&err) {
                    RetryDisposition::Stop => {
                        return Err(CopyError::Store {
                            operation: Operation::BatchWrite,
                            cursor: progress.cursor.clone(),
                            records_read: progress.records_read,
                            records_written: progress.records_written,
                            source: err,
                        });
                    }
                    RetryDisposition::Retry => {
                        attempt += 1;
                        if attempt >= self.retry.max_attempts {
                            warn!(
                                error = %err,
                                records = pending.len(),
                                "Transient write errors exhausted the attempt budget; reporting the batch"
                            );
                            let message = err.to_string();
                            self.report_failures(pending, &message, attempt, key_names, progress);
                            return Ok(());
                        }
                        warn!(error = %err, attempt, "Transient error writing batch; backing off");
                        sleep(self.retry.delay_for(attempt - 1)).await;
                    }
                },
            }
        }
    }

    fn report_failures(
        &self,
        records: Vec<Record>,
        error: &str,
        attempts: usize,
        key_names: &[String],
        progress: &mut Progress,
    ) {
        for record in records {
            progress.failed.push(FailedRecord {
                key: record.project_key(key_names),
                error: error.to_string(),
                attempts: attempts as u32,
            });
        }
    }
}

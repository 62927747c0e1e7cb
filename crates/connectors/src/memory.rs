//! In-memory table backend. Behaves like the real store where it matters
//! to the engine: keyed idempotent overwrite, evaluated-item pagination,
//! and a bounded batch that may decline a trailing subset. Faults and
//! declined counts can be scripted, which is what the engine's tests use.

use crate::{
    error::StoreError,
    store::{STORE_BATCH_CEILING, TableStore},
};
use async_trait::async_trait;
use model::{
    pagination::{Cursor, FetchResult},
    record::{Record, RecordKey},
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct MemoryTable {
    key_names: Vec<String>,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<RecordKey, Record>,
    /// Keys that scans evaluate but do not return, emulating a
    /// server-side filter. An entirely filtered page comes back empty
    /// with its continuation cursor still present.
    filtered: BTreeSet<RecordKey>,
    /// Per-submission count of trailing records to decline as
    /// unprocessed. Consumed front to back, one entry per submission.
    unprocessed_plan: VecDeque<usize>,
    scan_faults: VecDeque<StoreError>,
    write_faults: VecDeque<StoreError>,
    scan_calls: usize,
    submissions: Vec<usize>,
}

impl MemoryTable {
    pub fn new(key_names: &[&str]) -> Self {
        Self {
            key_names: key_names.iter().map(|name| name.to_string()).collect(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Inserts records directly, bypassing the batch path.
    pub async fn load(&self, records: Vec<Record>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        for record in records {
            let key = self.full_key(&record)?;
            inner.rows.insert(key, record);
        }
        Ok(())
    }

    pub async fn records(&self) -> Vec<Record> {
        self.inner.lock().await.rows.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.rows.is_empty()
    }

    /// Marks keys as filtered: scans evaluate them (they advance the
    /// cursor) but never return them.
    pub async fn filter_out(&self, keys: Vec<RecordKey>) {
        self.inner.lock().await.filtered.extend(keys);
    }

    /// Scripts how many trailing records each upcoming submission
    /// declines as unprocessed.
    pub async fn plan_unprocessed(&self, counts: Vec<usize>) {
        self.inner.lock().await.unprocessed_plan.extend(counts);
    }

    pub async fn push_scan_fault(&self, fault: StoreError) {
        self.inner.lock().await.scan_faults.push_back(fault);
    }

    pub async fn push_write_fault(&self, fault: StoreError) {
        self.inner.lock().await.write_faults.push_back(fault);
    }

    pub async fn scan_calls(&self) -> usize {
        self.inner.lock().await.scan_calls
    }

    /// Sizes of every batch submission received, resubmissions included.
    pub async fn submissions(&self) -> Vec<usize> {
        self.inner.lock().await.submissions.clone()
    }

    fn full_key(&self, record: &Record) -> Result<RecordKey, StoreError> {
        let key = record.project_key(&self.key_names);
        if key.len() != self.key_names.len() {
            return Err(StoreError::ValidationRejected(format!(
                "record is missing key attributes {:?}",
                self.key_names
            )));
        }
        Ok(key)
    }
}

#[async_trait]
impl TableStore for MemoryTable {
    async fn scan_page(
        &self,
        _table: &str,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<FetchResult, StoreError> {
        let page_size = page_size.max(1);
        let mut inner = self.inner.lock().await;
        inner.scan_calls += 1;

        if let Some(fault) = inner.scan_faults.pop_front() {
            return Err(fault);
        }

        let start = match cursor {
            Cursor::Start => Bound::Unbounded,
            Cursor::At(key) => Bound::Excluded(key.clone()),
        };

        let mut records = Vec::new();
        let mut last_evaluated = None;
        for (key, record) in inner.rows.range((start, Bound::Unbounded)).take(page_size) {
            last_evaluated = Some(key.clone());
            if !inner.filtered.contains(key) {
                records.push(record.clone());
            }
        }

        let next_cursor = match &last_evaluated {
            Some(key)
                if inner
                    .rows
                    .range((Bound::Excluded(key.clone()), Bound::Unbounded))
                    .next()
                    .is_some() =>
            {
                Some(key.clone())
            }
            _ => None,
        };

        Ok(FetchResult {
            records,
            next_cursor,
        })
    }

    async fn write_batch(
        &self,
        _table: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, StoreError> {
        if records.len() > STORE_BATCH_CEILING {
            return Err(StoreError::BatchTooLarge {
                submitted: records.len(),
                ceiling: STORE_BATCH_CEILING,
            });
        }

        let mut inner = self.inner.lock().await;
        inner.submissions.push(records.len());

        if let Some(fault) = inner.write_faults.pop_front() {
            return Err(fault);
        }

        let declined = inner
            .unprocessed_plan
            .pop_front()
            .unwrap_or(0)
            .min(records.len());
        let accepted = records.len() - declined;

        for record in &records[..accepted] {
            let key = self.full_key(record)?;
            inner.rows.insert(key, record.clone());
        }

        Ok(records[accepted..].to_vec())
    }

    async fn key_names(&self, _table: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.key_names.clone())
    }
}

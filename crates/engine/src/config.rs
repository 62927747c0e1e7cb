use crate::retry::RetryPolicy;
use connectors::store::STORE_BATCH_CEILING;
use serde::Deserialize;
use std::time::Duration;

/// Tunables of one copy run. All fields have defaults, so a job file only
/// needs to override what it cares about.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CopySettings {
    /// Upper bound on items *evaluated* per scan page.
    pub page_size: usize,

    /// Records per batch submission, clamped to the store ceiling.
    pub max_batch_size: usize,

    /// Total submissions allowed per batch before the leftover records
    /// are reported as failed. Also bounds read retries.
    pub max_attempts: usize,

    /// Base backoff delay between retries, doubled per attempt.
    pub base_delay_ms: u64,

    /// Backoff cap.
    pub max_delay_ms: u64,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            page_size: 25,
            max_batch_size: STORE_BATCH_CEILING,
            max_attempts: 5,
            base_delay_ms: 50,
            max_delay_ms: 5_000,
        }
    }
}

impl CopySettings {
    /// The batch size actually used: at least one record, never above the
    /// store ceiling regardless of configuration.
    pub fn effective_batch_size(&self) -> usize {
        self.max_batch_size.clamp(1, STORE_BATCH_CEILING)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Full configuration of a copy job, passed into the constructor; the
/// engine holds no process-wide state.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    pub source_table: String,
    pub target_table: String,
    pub settings: CopySettings,
}

impl CopyConfig {
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            settings: CopySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CopySettings) -> Self {
        self.settings = settings;
        self
    }
}

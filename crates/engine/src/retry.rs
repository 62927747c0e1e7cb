use connectors::error::StoreError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Whether an error is worth another attempt or must bubble up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Terminal outcome of an operation run under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was fatal; no retry was attempted.
    Fatal(E),
    /// The error was retryable but the attempt budget ran out.
    AttemptsExceeded(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(err) | RetryError::AttemptsExceeded(err) => err,
        }
    }
}

/// Bounded exponential backoff: `base_delay * 2^attempt`, capped at
/// `max_delay`, for at most `max_attempts` total attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay < base_delay {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Delay before the retry following `attempt` (0-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32 << attempt.min(16) as u32;
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Runs `op` until it succeeds, a fatal error occurs, or the attempt
    /// budget is exhausted. `classify` decides which errors are worth
    /// retrying.
    pub async fn run<F, Fut, T, E, C>(&self, mut op: F, classify: C) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> RetryDisposition,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        attempt += 1;
                        if attempt >= self.max_attempts {
                            return Err(RetryError::AttemptsExceeded(err));
                        }
                        sleep(self.delay_for(attempt - 1)).await;
                    }
                },
            }
        }
    }
}

/// Classifies store errors for the retry policy. Throttling, timeouts and
/// availability blips are worth retrying; everything else terminates the
/// job (a validation rejection or missing table cannot succeed on
/// resubmission, and bad credentials stay bad).
pub fn classify_store_error(err: &StoreError) -> RetryDisposition {
    match err {
        StoreError::Throttled(_) | StoreError::Timeout(_) | StoreError::ServiceUnavailable(_) => {
            RetryDisposition::Retry
        }
        StoreError::TableNotFound(_)
        | StoreError::AccessDenied(_)
        | StoreError::ExpiredCredentials(_)
        | StoreError::ValidationRejected(_)
        | StoreError::BatchTooLarge { .. }
        | StoreError::Encoding(_)
        | StoreError::Unexpected(_) => RetryDisposition::Stop,
    }
}

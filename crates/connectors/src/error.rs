use thiserror::Error;

/// Errors surfaced by a table store backend.
///
/// The engine classifies these into retryable and fatal; the taxonomy here
/// only describes what happened, never what to do about it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store throttled the request (throughput or request limits).
    #[error("request throttled by the store: {0}")]
    Throttled(String),

    /// A network call exceeded its timeout.
    #[error("store call timed out: {0}")]
    Timeout(String),

    /// The store or the path to it is temporarily unavailable.
    #[error("store unavailable: {0}")]
    ServiceUnavailable(String),

    /// The named table does not exist in this account/region.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The caller's credentials do not permit this operation.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The short-lived credentials expired mid-run.
    #[error("credentials expired: {0}")]
    ExpiredCredentials(String),

    /// The store rejected the request as malformed or conflicting. A
    /// resubmission of the same payload can never succeed.
    #[error("request rejected by validation: {0}")]
    ValidationRejected(String),

    /// A single submission exceeded the store's batch ceiling.
    #[error("batch of {submitted} exceeds the store ceiling of {ceiling}")]
    BatchTooLarge { submitted: usize, ceiling: usize },

    /// An attribute encoding the data model cannot represent.
    #[error("attribute encoding not representable: {0}")]
    Encoding(String),

    /// Anything the taxonomy above does not cover.
    #[error("unexpected store error: {0}")]
    Unexpected(String),
}

/// Errors from resolving a credential context into a client configuration.
/// All of these are fatal: retrying with the same bad credentials cannot
/// help.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The role-assumption exchange was rejected, typically because the
    /// caller lacks `sts:AssumeRole` on the target ARN.
    #[error("failed to assume role {role_arn}: {message}")]
    AssumeRole { role_arn: String, message: String },

    /// The exchange succeeded but returned no credential payload. Must not
    /// proceed with undefined credentials.
    #[error("role assumption returned an empty credential payload")]
    EmptyCredentials,

    /// The role requires a one-time MFA code but no supplier was
    /// configured.
    #[error("role {0} requires an MFA code but no supplier was configured")]
    MfaCodeRequired(String),
}

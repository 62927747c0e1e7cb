use connectors::error::CredentialError;
use engine::error::CopyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read the job file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("Failed to parse the job file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Copy job failed: {0}")]
    Copy(#[from] CopyError),

    #[error("Failed to serialize report to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

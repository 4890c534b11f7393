use std::path::PathBuf;

use thiserror::Error;
use webjuris_core::ValidationErrors;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no case with id {0}")]
    NotFound(String),

    #[error("a case with id {0} is already in the working set")]
    DuplicateId(String),

    #[error("case number {0} already exists")]
    DuplicateCaseNumber(String),

    #[error("invalid case: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("'{0}' is not a case number (expected year/code/sequence)")]
    InvalidCaseNumber(String),

    #[error("case number {0} is used by a case")]
    NumberInUse(String),

    #[error("registry file {}: {source}", path.display())]
    RegistryFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("registry file is not valid JSON: {0}")]
    RegistryJson(#[from] serde_json::Error),
}

// Store error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("employee not found")]
    NotFound(String),
    #[error("employee already found")]
    AlreadyExists(String),
}

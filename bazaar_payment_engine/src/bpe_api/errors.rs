use std::time::Duration;

use thiserror::Error;

use crate::{helpers::OrderIdError, traits::StoreError};

#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    #[error("Store error. {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    MalformedOrderReference(#[from] OrderIdError),
    #[error("Processing did not complete within {0:?}")]
    Timeout(Duration),
}

impl ReconcilerError {
    /// Whether a redelivery of the same event has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcilerError::StoreError(e) => e.is_retryable(),
            ReconcilerError::MalformedOrderReference(_) => false,
            ReconcilerError::Timeout(_) => true,
        }
    }
}

use thiserror::Error;

use crate::db_types::{OrderId, Role};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("Stored data could not be (de)serialized: {0}")]
    SerializationError(String),
    #[error("The requested {0} {1} does not exist")]
    OrderNotFound(Role, OrderId),
    #[error("Cannot insert {0}, since order {1} already exists")]
    OrderAlreadyExists(Role, OrderId),
    #[error("Data integrity violation. Address {0} is the payment address of both a sale and a purchase")]
    AddressConflict(String),
}

impl StoreError {
    /// Transient failures are worth redelivering. Integrity violations will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

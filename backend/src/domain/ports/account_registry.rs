//! Port abstraction for account persistence adapters.

use async_trait::async_trait;

use crate::domain::account::{Account, Handle};

/// Persistence errors raised by account registry adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountRegistryError {
    /// Registry connection could not be established.
    #[error("account registry connection failed: {message}")]
    Connection {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("account registry query failed: {message}")]
    Query {
        /// Adapter-supplied detail.
        message: String,
    },
    /// An account for the handle already exists; the caller lost a creation
    /// race and should re-read the winner's record.
    #[error("an account already exists for handle {handle}")]
    Duplicate {
        /// Handle that collided.
        handle: String,
    },
}

impl AccountRegistryError {
    /// Connection failure with the given detail.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query failure with the given detail.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Uniqueness violation for the given handle.
    pub fn duplicate(handle: impl Into<String>) -> Self {
        Self::Duplicate {
            handle: handle.into(),
        }
    }
}

/// Durable keyed store of accounts, unique per handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// Fetch the account registered for a handle. Handles are normalised at
    /// the type boundary, so lookups are case-insensitive by construction.
    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<Account>, AccountRegistryError>;

    /// Insert a freshly created account. Must fail with
    /// [`AccountRegistryError::Duplicate`] rather than overwrite when the
    /// handle is already registered.
    async fn insert(&self, account: &Account) -> Result<(), AccountRegistryError>;

    /// List up to `limit` known handles in stable (alphabetical) order.
    async fn list_handles(&self, limit: usize) -> Result<Vec<Handle>, AccountRegistryError>;
}

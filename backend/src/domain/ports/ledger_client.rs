//! Port abstraction for the ledger network client.
//!
//! The transfer protocol is split into explicit build, submit, and confirm
//! steps so the executor's state machine stays visible and a stub client can
//! assert which steps were reached.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::account::AccountAddress;
use crate::domain::signing::MessageSignature;

/// Failures raised by ledger client adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerClientError {
    /// The node could not be reached.
    #[error("ledger node unreachable: {message}")]
    Connection {
        /// Adapter-supplied detail.
        message: String,
    },
    /// The node answered with an error payload.
    #[error("ledger node rejected the request: {message}")]
    Api {
        /// Adapter-supplied detail.
        message: String,
    },
    /// The transaction executed and failed on chain.
    #[error("transaction execution failed: {vm_status}")]
    ExecutionFailed {
        /// Virtual-machine status string reported by the node.
        vm_status: String,
    },
    /// Finality was not reported within the confirmation window.
    #[error("transaction not confirmed within {seconds}s")]
    ConfirmationTimeout {
        /// Window that elapsed.
        seconds: u64,
    },
}

impl LedgerClientError {
    /// Connection failure with the given detail.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// API failure with the given detail.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }
}

/// An unsigned transfer plus the node-supplied signing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    /// Sending address.
    pub sender: AccountAddress,
    /// Receiving address.
    pub recipient: AccountAddress,
    /// Transfer amount in base units.
    pub amount_base_units: u64,
    /// Sender's current sequence number.
    pub sequence_number: u64,
    /// Gas ceiling for execution.
    pub max_gas_amount: u64,
    /// Price per gas unit.
    pub gas_unit_price: u64,
    /// Unix expiry of the transaction.
    pub expiration_timestamp_secs: u64,
    /// Bytes the sender must sign, as computed by the node.
    pub signing_message: Vec<u8>,
}

/// A transfer ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// The built transfer this signature covers.
    pub unsigned: UnsignedTransfer,
    /// Signature and public key over the signing message.
    pub signature: MessageSignature,
}

/// Handle returned by the node on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Transaction hash to poll for finality.
    pub hash: String,
}

/// A transaction the network reports as final and successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    /// Confirmed transaction hash.
    pub hash: String,
    /// Gas consumed, when the node reports it.
    pub gas_used: Option<u64>,
}

/// Client for the ledger network's read and submission API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current balance of an address in base units. Addresses the network has
    /// never seen report zero.
    async fn account_balance(&self, address: &AccountAddress)
    -> Result<u64, LedgerClientError>;

    /// Build an unsigned transfer and obtain its signing message.
    async fn build_transfer(
        &self,
        sender: &AccountAddress,
        recipient: &AccountAddress,
        amount_base_units: u64,
    ) -> Result<UnsignedTransfer, LedgerClientError>;

    /// Submit a signed transfer; returns the pending-transaction handle.
    async fn submit(&self, transfer: &SignedTransfer)
    -> Result<PendingTransaction, LedgerClientError>;

    /// Block until the network reports finality for `hash`, or fail with
    /// [`LedgerClientError::ExecutionFailed`] / timeout after `timeout`.
    async fn wait_for_confirmation(
        &self,
        hash: &str,
        timeout: Duration,
    ) -> Result<ConfirmedTransaction, LedgerClientError>;
}

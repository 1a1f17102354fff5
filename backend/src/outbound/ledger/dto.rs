//! Wire representations of the fullnode REST API.
//!
//! The node encodes every u64 as a JSON string; these DTOs keep that quirk
//! out of the domain. They are implementation details of the ledger adapter
//! and never cross the port boundary.

use serde::Deserialize;

/// `GET /v1/accounts/{address}` response.
#[derive(Debug, Deserialize)]
pub(super) struct AccountDto {
    pub sequence_number: String,
}

/// `GET /v1/accounts/{address}/resource/{coin_store}` response.
#[derive(Debug, Deserialize)]
pub(super) struct CoinStoreResourceDto {
    pub data: CoinStoreDataDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct CoinStoreDataDto {
    pub coin: CoinValueDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct CoinValueDto {
    pub value: String,
}

/// `POST /v1/transactions` response.
#[derive(Debug, Deserialize)]
pub(super) struct PendingTransactionDto {
    pub hash: String,
}

/// `GET /v1/transactions/by_hash/{hash}` response, reduced to the fields the
/// confirmation loop inspects.
#[derive(Debug, Deserialize)]
pub(super) struct TransactionStatusDto {
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TransactionStatusDto {
    /// Whether the node still reports the transaction as in flight.
    pub fn is_pending(&self) -> bool {
        self.transaction_type == "pending_transaction"
    }
}

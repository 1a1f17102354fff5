//! Fullnode REST adapter for the ledger network.

mod dto;
mod http_client;

pub use http_client::{HttpLedgerClient, LedgerClientConfig};

//! Reqwest-backed ledger client.
//!
//! This adapter owns transport details only: REST request shapes, status
//! mapping, and the node's string-encoded integers. Transfers use the node's
//! `encode_submission` endpoint to obtain the exact signing message, so no
//! transaction serialisation logic lives client-side.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::time::{Instant, sleep};
use tracing::debug;
use url::Url;

use super::dto::{AccountDto, CoinStoreResourceDto, PendingTransactionDto, TransactionStatusDto};
use crate::domain::account::AccountAddress;
use crate::domain::ports::{
    ConfirmedTransaction, LedgerClient, LedgerClientError, PendingTransaction, SignedTransfer,
    UnsignedTransfer,
};

const COIN_STORE_RESOURCE: &str = "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>";
const TRANSFER_FUNCTION: &str = "0x1::aptos_account::transfer";
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Gas and expiry defaults applied to built transfers.
#[derive(Debug, Clone)]
pub struct LedgerClientConfig {
    /// Gas ceiling per transaction.
    pub max_gas_amount: u64,
    /// Price per gas unit, in base units.
    pub gas_unit_price: u64,
    /// Seconds a built transaction stays valid.
    pub expiration_window_secs: u64,
    /// Request timeout for individual node calls.
    pub request_timeout: Duration,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 2_000,
            gas_unit_price: 100,
            expiration_window_secs: 600,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Ledger client performing REST calls against one fullnode.
pub struct HttpLedgerClient {
    client: Client,
    base_url: Url,
    config: LedgerClientConfig,
}

impl HttpLedgerClient {
    /// Build a client with default gas and expiry settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        Self::with_config(base_url, LedgerClientConfig::default())
    }

    /// Build a client with explicit gas and expiry settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_config(base_url: Url, config: LedgerClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, LedgerClientError> {
        self.base_url
            .join(path)
            .map_err(|err| LedgerClientError::connection(format!("bad node url: {err}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, LedgerClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        let decoded = serde_json::from_slice(&body)
            .map_err(|err| LedgerClientError::api(format!("invalid node response: {err}")))?;
        Ok(Some(decoded))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Value,
    ) -> Result<T, LedgerClientError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| LedgerClientError::api(format!("invalid node response: {err}")))
    }

    async fn sequence_number(&self, address: &AccountAddress) -> Result<u64, LedgerClientError> {
        let url = self.api_url(&format!("v1/accounts/{address}"))?;
        let account: AccountDto = self
            .get_json(url)
            .await?
            .ok_or_else(|| LedgerClientError::api(format!("account {address} not on chain")))?;
        parse_u64(&account.sequence_number, "sequence_number")
    }
}

/// Request body shared by `encode_submission` and `submit`; the node demands
/// byte-identical transaction fields in both calls.
fn transfer_request_body(transfer: &UnsignedTransfer) -> Value {
    json!({
        "sender": transfer.sender.as_ref(),
        "sequence_number": transfer.sequence_number.to_string(),
        "max_gas_amount": transfer.max_gas_amount.to_string(),
        "gas_unit_price": transfer.gas_unit_price.to_string(),
        "expiration_timestamp_secs": transfer.expiration_timestamp_secs.to_string(),
        "payload": {
            "type": "entry_function_payload",
            "function": TRANSFER_FUNCTION,
            "type_arguments": [],
            "arguments": [
                transfer.recipient.as_ref(),
                transfer.amount_base_units.to_string(),
            ],
        },
    })
}

fn map_transport_error(error: reqwest::Error) -> LedgerClientError {
    LedgerClientError::connection(error.to_string())
}

fn api_error(status: StatusCode, body: &[u8]) -> LedgerClientError {
    let detail = String::from_utf8_lossy(body);
    LedgerClientError::api(format!("{status}: {}", detail.trim()))
}

fn parse_u64(raw: &str, field: &str) -> Result<u64, LedgerClientError> {
    raw.parse::<u64>()
        .map_err(|_| LedgerClientError::api(format!("non-numeric {field}: {raw}")))
}

fn decode_hex_message(raw: &str) -> Result<Vec<u8>, LedgerClientError> {
    hex::decode(raw.trim_start_matches("0x"))
        .map_err(|err| LedgerClientError::api(format!("invalid signing message hex: {err}")))
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn account_balance(
        &self,
        address: &AccountAddress,
    ) -> Result<u64, LedgerClientError> {
        let url = self.api_url(&format!(
            "v1/accounts/{address}/resource/{COIN_STORE_RESOURCE}"
        ))?;
        // Addresses without a coin store have never received funds.
        match self.get_json::<CoinStoreResourceDto>(url).await? {
            Some(resource) => parse_u64(&resource.data.coin.value, "coin value"),
            None => Ok(0),
        }
    }

    async fn build_transfer(
        &self,
        sender: &AccountAddress,
        recipient: &AccountAddress,
        amount_base_units: u64,
    ) -> Result<UnsignedTransfer, LedgerClientError> {
        let sequence_number = self.sequence_number(sender).await?;
        let mut transfer = UnsignedTransfer {
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount_base_units,
            sequence_number,
            max_gas_amount: self.config.max_gas_amount,
            gas_unit_price: self.config.gas_unit_price,
            expiration_timestamp_secs: unix_now() + self.config.expiration_window_secs,
            signing_message: Vec::new(),
        };

        let url = self.api_url("v1/transactions/encode_submission")?;
        let encoded: String = self
            .post_json(url, &transfer_request_body(&transfer))
            .await?;
        transfer.signing_message = decode_hex_message(&encoded)?;
        debug!(sender = %transfer.sender, sequence_number, "transfer built");
        Ok(transfer)
    }

    async fn submit(
        &self,
        transfer: &SignedTransfer,
    ) -> Result<PendingTransaction, LedgerClientError> {
        let mut body = transfer_request_body(&transfer.unsigned);
        body["signature"] = json!({
            "type": "ed25519_signature",
            "public_key": transfer.signature.public_key_hex,
            "signature": transfer.signature.signature_hex,
        });

        let url = self.api_url("v1/transactions")?;
        let pending: PendingTransactionDto = self.post_json(url, &body).await?;
        debug!(hash = %pending.hash, "transfer submitted");
        Ok(PendingTransaction { hash: pending.hash })
    }

    async fn wait_for_confirmation(
        &self,
        hash: &str,
        timeout: Duration,
    ) -> Result<ConfirmedTransaction, LedgerClientError> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = self.api_url(&format!("v1/transactions/by_hash/{hash}"))?;
            // 404 means the node has not seen the hash yet; keep polling.
            if let Some(status) = self.get_json::<TransactionStatusDto>(url).await? {
                if !status.is_pending() {
                    return match status.success {
                        Some(true) => Ok(ConfirmedTransaction {
                            hash: hash.to_owned(),
                            gas_used: status
                                .gas_used
                                .as_deref()
                                .and_then(|raw| raw.parse().ok()),
                        }),
                        _ => Err(LedgerClientError::ExecutionFailed {
                            vm_status: status
                                .vm_status
                                .unwrap_or_else(|| "unknown execution failure".to_owned()),
                        }),
                    };
                }
            }

            if Instant::now() + CONFIRMATION_POLL_INTERVAL > deadline {
                return Err(LedgerClientError::ConfirmationTimeout {
                    seconds: timeout.as_secs(),
                });
            }
            sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }
}

//! Transaction execution.
//!
//! A send runs the full resolve → convert → build → sign → submit → confirm
//! sequence as one unit of work; no intermediate state is exposed and no step
//! is retried automatically — resubmitting a transfer is unsafe without
//! idempotency tracking, so failures are reported and the caller must
//! re-issue the command. Balance is a single read-only call.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::account::{Account, AccountAddress, Handle};
use crate::domain::credential::{SigningKeyHex, to_signing_hex};
use crate::domain::error::Error;
use crate::domain::ports::{AccountRegistry, LedgerClient, LedgerClientError};
use crate::domain::signing::sign_message;
use crate::domain::units::{display_tokens, to_base_units};

/// Maximum number of known handles disclosed when a recipient is unknown.
///
/// Bounded deliberately: enumerating the whole registry in an error message
/// would leak every registered handle.
pub const RECIPIENT_HINT_LIMIT: usize = 5;

/// Default wait for transaction finality.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal outcome of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    /// The network reported finality.
    Confirmed {
        /// Confirmed transaction hash.
        hash: String,
    },
    /// The transfer failed before or after submission.
    Failed {
        /// Human-readable reason.
        reason: String,
    },
}

/// Drives ledger operations for resolved intents.
pub struct TransactionExecutor {
    ledger: Arc<dyn LedgerClient>,
    registry: Arc<dyn AccountRegistry>,
    confirm_timeout: Duration,
}

impl TransactionExecutor {
    /// Create an executor over the given ledger client and registry.
    pub fn new(ledger: Arc<dyn LedgerClient>, registry: Arc<dyn AccountRegistry>) -> Self {
        Self {
            ledger,
            registry,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    /// Override the confirmation wait.
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Execute a transfer of `amount` whole tokens to `recipient_handle`.
    ///
    /// An unknown recipient or unsendable amount fails before any network
    /// call is made; in particular the build step is never reached.
    pub async fn execute_send(
        &self,
        sender: &Account,
        amount: Decimal,
        recipient_handle: &str,
    ) -> TransactionResult {
        let recipient = match self.resolve_recipient(recipient_handle).await {
            Ok(address) => address,
            Err(reason) => return TransactionResult::Failed { reason },
        };

        let base_units = match to_base_units(amount) {
            Ok(units) => units,
            Err(err) => {
                return TransactionResult::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let signing_key = match sender_signing_key(sender) {
            Ok(key) => key,
            Err(reason) => return TransactionResult::Failed { reason },
        };

        match self
            .build_sign_submit_confirm(sender, &recipient, base_units, &signing_key)
            .await
        {
            Ok(hash) => {
                info!(
                    sender = %sender.handle(),
                    recipient = recipient_handle,
                    base_units,
                    %hash,
                    "transfer confirmed"
                );
                TransactionResult::Confirmed { hash }
            }
            Err((step, err)) => {
                warn!(
                    sender = %sender.handle(),
                    recipient = recipient_handle,
                    step,
                    error = %err,
                    "transfer failed"
                );
                TransactionResult::Failed {
                    reason: format!("{step} failed: {err}"),
                }
            }
        }
    }

    /// Sender's balance in whole tokens.
    pub async fn balance(&self, account: &Account) -> Result<Decimal, Error> {
        let base_units = self
            .ledger
            .account_balance(account.address())
            .await
            .map_err(|err| Error::service_unavailable(format!("balance query failed: {err}")))?;
        Ok(display_tokens(base_units))
    }

    async fn resolve_recipient(&self, recipient_handle: &str) -> Result<AccountAddress, String> {
        let handle = Handle::new(recipient_handle)
            .map_err(|err| format!("invalid recipient handle: {err}"))?;
        let found = self
            .registry
            .find_by_handle(&handle)
            .await
            .map_err(|err| format!("recipient lookup failed: {err}"))?;
        match found {
            Some(account) => Ok(account.address().clone()),
            None => Err(self.unknown_recipient_message(&handle).await),
        }
    }

    async fn unknown_recipient_message(&self, handle: &Handle) -> String {
        let hint = match self.registry.list_handles(RECIPIENT_HINT_LIMIT).await {
            Ok(handles) if !handles.is_empty() => {
                let joined = handles
                    .iter()
                    .map(|h| format!("@{h}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(" Did you mean one of: {joined}?")
            }
            _ => String::new(),
        };
        format!("recipient @{handle} is not registered.{hint}")
    }

    async fn build_sign_submit_confirm(
        &self,
        sender: &Account,
        recipient: &AccountAddress,
        base_units: u64,
        signing_key: &SigningKeyHex,
    ) -> Result<String, (&'static str, LedgerClientError)> {
        let unsigned = self
            .ledger
            .build_transfer(sender.address(), recipient, base_units)
            .await
            .map_err(|err| ("build", err))?;

        let signature = sign_message(signing_key, &unsigned.signing_message)
            .map_err(|err| ("sign", LedgerClientError::api(err.to_string())))?;

        let pending = self
            .ledger
            .submit(&crate::domain::ports::SignedTransfer {
                unsigned,
                signature,
            })
            .await
            .map_err(|err| ("submit", err))?;

        let confirmed = self
            .ledger
            .wait_for_confirmation(&pending.hash, self.confirm_timeout)
            .await
            .map_err(|err| ("confirm", err))?;

        Ok(confirmed.hash)
    }
}

fn sender_signing_key(sender: &Account) -> Result<SigningKeyHex, String> {
    to_signing_hex(sender.credential())
        .ok_or_else(|| "stored credential could not be normalised".to_owned())
}

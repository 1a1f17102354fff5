//! Command processing.
//!
//! Resolves free text into an intent and dispatches it. The sender must
//! already hold an account; an unknown handle is the caller's error and
//! surfaces as [`Error`]. Everything downstream of a recognised intent is
//! conversational: ledger and store failures become failure text in a
//! successful response so the host page can show them to the sender.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::account::{Account, Handle};
use crate::domain::donation_service::DonationTemplateService;
use crate::domain::error::Error;
use crate::domain::intent::{Intent, IntentResolver};
use crate::domain::ports::{
    AccountRegistry, CommandProcessor, CommandResponse, PriceFeed, PriceFeedError,
    ProcessCommandRequest,
};
use crate::domain::transaction_executor::{TransactionExecutor, TransactionResult};

/// Turns free-text commands into ledger operations and response text.
pub struct CommandService {
    registry: Arc<dyn AccountRegistry>,
    executor: TransactionExecutor,
    prices: Arc<dyn PriceFeed>,
    donations: Arc<DonationTemplateService>,
    resolver: IntentResolver,
    network_label: String,
}

impl CommandService {
    /// Wire a command service over its collaborators.
    ///
    /// `network_label` names the ledger network in explorer links, e.g.
    /// `mainnet` or `testnet`.
    pub fn new(
        registry: Arc<dyn AccountRegistry>,
        executor: TransactionExecutor,
        prices: Arc<dyn PriceFeed>,
        donations: Arc<DonationTemplateService>,
        network_label: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            executor,
            prices,
            donations,
            resolver: IntentResolver,
            network_label: network_label.into(),
        }
    }

    async fn sender(&self, handle: &Handle) -> Result<Account, Error> {
        self.registry
            .find_by_handle(handle)
            .await
            .map_err(|_| Error::service_unavailable("account registry is unavailable"))?
            .ok_or_else(|| Error::not_found(format!("no account registered for @{handle}")))
    }

    async fn balance_text(&self, sender: &Account) -> String {
        match self.executor.balance(sender).await {
            Ok(balance) => format!(
                "\u{1f4b0} Your balance is {} APT",
                amount_display(balance)
            ),
            Err(err) => format!("\u{274c} Could not fetch your balance: {}", err.message()),
        }
    }

    async fn send_text(&self, sender: &Account, amount: rust_decimal::Decimal, recipient: &str) -> String {
        match self.executor.execute_send(sender, amount, recipient).await {
            TransactionResult::Confirmed { hash } => format!(
                "\u{2705} Sent {} APT to @{}! View transaction: {}",
                amount_display(amount),
                recipient.trim_start_matches('@'),
                self.explorer_link(&hash)
            ),
            TransactionResult::Failed { reason } => {
                format!("\u{274c} Transfer failed: {reason}")
            }
        }
    }

    async fn price_text(&self, symbol: &str) -> String {
        match self.prices.quote(symbol).await {
            Ok(quote) => format!(
                "\u{1f4c8} {} is trading at ${}",
                quote.symbol,
                usd_display(quote.usd)
            ),
            Err(PriceFeedError::UnknownSymbol { .. }) => {
                format!("\u{274c} I don't have a price for {}", symbol.to_uppercase())
            }
            Err(PriceFeedError::Unavailable { .. }) => {
                "\u{274c} The price feed is unavailable right now".to_owned()
            }
        }
    }

    async fn donate_text(&self, sender: &Account, cause: Option<&str>) -> String {
        match self.donations.create(cause, sender).await {
            Ok(text) => text,
            Err(err) => format!("\u{274c} Could not create a donation page: {}", err.message()),
        }
    }

    fn explorer_link(&self, hash: &str) -> String {
        format!(
            "https://explorer.aptoslabs.com/txn/{hash}?network={}",
            self.network_label
        )
    }

    fn unknown_text() -> String {
        concat!(
            "I didn't understand that. Try one of:\n",
            "\u{2022} check my balance\n",
            "\u{2022} send 0.5 APT to @handle\n",
            "\u{2022} price of $APT\n",
            "\u{2022} donate for a cause"
        )
        .to_owned()
    }
}

#[async_trait]
impl CommandProcessor for CommandService {
    async fn process(&self, request: ProcessCommandRequest) -> Result<CommandResponse, Error> {
        let sender = self.sender(&request.handle).await?;
        let intent = self.resolver.resolve(&request.command, &request.context);
        debug!(handle = %request.handle, ?intent, "command resolved");

        let response_text = match intent {
            Intent::Balance => self.balance_text(&sender).await,
            Intent::Send {
                amount,
                recipient_handle,
            } => self.send_text(&sender, amount, &recipient_handle).await,
            Intent::Price { symbol } => self.price_text(&symbol).await,
            Intent::Donate { cause } => self.donate_text(&sender, cause.as_deref()).await,
            Intent::Unknown => Self::unknown_text(),
        };

        info!(handle = %request.handle, "command processed");
        Ok(CommandResponse { response_text })
    }
}

/// Token amount without trailing zeros.
fn amount_display(amount: rust_decimal::Decimal) -> String {
    amount.normalize().to_string()
}

/// Dollar figure with conventional two decimal places.
fn usd_display(usd: rust_decimal::Decimal) -> String {
    usd.round_dp(2).to_string()
}

//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`AccountRegistry`, `LedgerClient`, `ContentStore`,
//! `PriceFeed`) abstract the external collaborators; driving ports
//! (`CommandProcessor`, `AccountProvisioning`, `DonationPageQuery`) are the
//! use-case surface consumed by inbound adapters. Each driven port carries
//! its own error enum so adapters stay transport-specific and services own
//! the mapping into `domain::Error`.

mod account_registry;
mod command;
mod content_store;
mod ledger_client;
mod price_feed;

#[cfg(test)]
pub use account_registry::MockAccountRegistry;
pub use account_registry::{AccountRegistry, AccountRegistryError};
#[cfg(test)]
pub use command::{MockAccountProvisioning, MockCommandProcessor, MockDonationPageQuery};
pub use command::{
    AccountProvisioning, CommandProcessor, CommandResponse, DonationPageQuery,
    ProcessCommandRequest, ProvisionedAccount,
};
#[cfg(test)]
pub use content_store::MockContentStore;
pub use content_store::{ContentId, ContentIdValidationError, ContentStore, ContentStoreError};
#[cfg(test)]
pub use ledger_client::MockLedgerClient;
pub use ledger_client::{
    ConfirmedTransaction, LedgerClient, LedgerClientError, PendingTransaction, SignedTransfer,
    UnsignedTransfer,
};
#[cfg(test)]
pub use price_feed::MockPriceFeed;
pub use price_feed::{PriceFeed, PriceFeedError, PriceQuote, StaticPriceFeed};

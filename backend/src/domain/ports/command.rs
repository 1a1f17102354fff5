//! Driving ports consumed by inbound adapters.

use async_trait::async_trait;

use crate::domain::account::{AccountAddress, AccountId, Handle};
use crate::domain::error::Error;
use crate::domain::intent::CommandContext;
use crate::domain::ports::content_store::ContentId;

/// A free-text command attributed to a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommandRequest {
    /// Sender's normalised handle.
    pub handle: Handle,
    /// Raw command text.
    pub command: String,
    /// Optional page context.
    pub context: CommandContext,
}

/// Human-readable outcome of a processed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Text rendered back into the host page.
    pub response_text: String,
}

/// Use case: turn a free-text command into a response.
///
/// Domain failures inside a recognised command become failure text in a
/// successful response; only an unknown handle or malformed request surfaces
/// as an [`Error`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    /// Process one command end to end.
    async fn process(&self, request: ProcessCommandRequest) -> Result<CommandResponse, Error>;
}

/// Public view of an account. Never includes the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
    /// Stable account identifier.
    pub id: AccountId,
    /// Ledger address.
    pub address: AccountAddress,
    /// Whether this call created the record.
    pub created: bool,
}

/// Use case: idempotent account lookup-or-creation per handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountProvisioning: Send + Sync {
    /// Return the account for `handle`, creating it on first sight.
    async fn get_or_create(&self, handle: Handle) -> Result<ProvisionedAccount, Error>;
}

/// Use case: serve the interactive page for a stored donation descriptor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationPageQuery: Send + Sync {
    /// Render the self-contained HTML page bound to `id`.
    async fn render(&self, id: &ContentId) -> Result<String, Error>;
}

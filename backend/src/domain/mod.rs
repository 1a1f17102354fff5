//! Domain primitives, ports, and services.
//!
//! Purpose: Define the strongly typed core of the command-to-ledger
//! pipeline, independent of HTTP and of any concrete ledger, store, or
//! database. Inbound adapters drive the services through the traits in
//! [`ports`]; outbound adapters implement the driven traits there. Keep
//! types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — API error response payload and stable identifier.
//! - Account, Handle, AccountAddress — validated account identity.
//! - Intent, IntentResolver — free-text command classification.
//! - DonationDescriptor — immutable content-addressed collector document.
//! - AccountService, CommandService, TransactionExecutor,
//!   DonationTemplateService — the use-case implementations wired in main.

pub mod account;
pub mod account_service;
pub mod command_service;
pub mod credential;
pub mod donation;
pub mod donation_service;
pub mod error;
pub mod intent;
pub mod ports;
pub mod signing;
pub mod transaction_executor;
pub mod units;

pub use self::account::{Account, AccountAddress, AccountId, AccountValidationError, Handle};
pub use self::account_service::AccountService;
pub use self::command_service::CommandService;
pub use self::credential::{CredentialValue, SigningKeyHex};
pub use self::donation::{DonationDefaults, DonationDescriptor};
pub use self::donation_service::DonationTemplateService;
pub use self::error::{Error, ErrorCode};
pub use self::intent::{CommandContext, Intent, IntentResolver};
pub use self::transaction_executor::{TransactionExecutor, TransactionResult};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no account registered for @ghost"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

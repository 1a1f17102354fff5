//! Account data model.
//!
//! An account binds an external social-media handle to a ledger address and
//! the credential that controls it. All three are immutable after creation;
//! the credential is sensitive and is excluded from `Debug` output and from
//! every serialised representation of the account.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::credential::CredentialValue;

/// Validation errors for account value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    /// Handle is empty once normalised.
    #[error("handle must not be empty")]
    EmptyHandle,
    /// Handle contains characters outside `[a-z0-9_]`.
    #[error("handle may only contain letters, numbers, or underscores")]
    HandleInvalidCharacters,
    /// Handle exceeds the maximum length.
    #[error("handle must be at most {max} characters")]
    HandleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Address is not a 0x-prefixed 64-digit hex string.
    #[error("address must be a 0x-prefixed 64-digit hex string")]
    InvalidAddress,
}

/// Maximum permitted handle length after normalisation.
pub const HANDLE_MAX: usize = 32;

/// Normalised external identity of an account holder.
///
/// Handles are compared and stored lower-case with any leading `@` stripped,
/// which makes registry lookups case-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Normalise and validate a handle.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Handle;
    ///
    /// let handle = Handle::new("@Alice").unwrap();
    /// assert_eq!(handle.as_ref(), "alice");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let normalised = raw
            .as_ref()
            .trim()
            .trim_start_matches('@')
            .to_lowercase();
        if normalised.is_empty() {
            return Err(AccountValidationError::EmptyHandle);
        }
        if normalised.chars().count() > HANDLE_MAX {
            return Err(AccountValidationError::HandleTooLong { max: HANDLE_MAX });
        }
        if !normalised
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(AccountValidationError::HandleInvalidCharacters);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl TryFrom<String> for Handle {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Ledger account address: a 0x-prefixed 64-digit hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Validate and normalise an address to lower-case hex.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        let lowered = raw.as_ref().trim().to_lowercase();
        let digits = lowered
            .strip_prefix("0x")
            .ok_or(AccountValidationError::InvalidAddress)?;
        if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AccountValidationError::InvalidAddress);
        }
        Ok(Self(lowered))
    }
}

impl AsRef<str> for AccountAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<AccountAddress> for String {
    fn from(value: AccountAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity-bound account record.
///
/// ## Invariants
/// - Exactly one `address`, derived from exactly one `credential` at creation.
/// - Immutable after creation.
/// - `credential` never crosses the backend trust boundary.
#[derive(Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    handle: Handle,
    address: AccountAddress,
    credential: CredentialValue,
}

impl Account {
    /// Assemble an account from validated components.
    pub fn new(
        id: AccountId,
        handle: Handle,
        address: AccountAddress,
        credential: CredentialValue,
    ) -> Self {
        Self {
            id,
            handle,
            address,
            credential,
        }
    }

    /// Stable account identifier.
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Normalised external handle.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Ledger address controlled by this account's credential.
    pub fn address(&self) -> &AccountAddress {
        &self.address
    }

    /// Stored signing credential. Backend-internal; never serialised.
    pub fn credential(&self) -> &CredentialValue {
        &self.credential
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("address", &self.address)
            .field("credential", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@Alice", "alice")]
    #[case("BOB_42", "bob_42")]
    #[case("  @carol  ", "carol")]
    fn handles_normalise_case_and_strip_the_at_sign(#[case] raw: &str, #[case] expected: &str) {
        let handle = Handle::new(raw).expect("valid handle");
        assert_eq!(handle.as_ref(), expected);
    }

    #[rstest]
    #[case("", AccountValidationError::EmptyHandle)]
    #[case("@", AccountValidationError::EmptyHandle)]
    #[case("bad handle", AccountValidationError::HandleInvalidCharacters)]
    #[case("emoji🚀", AccountValidationError::HandleInvalidCharacters)]
    fn invalid_handles_are_rejected(#[case] raw: &str, #[case] expected: AccountValidationError) {
        assert_eq!(Handle::new(raw), Err(expected));
    }

    #[test]
    fn overlong_handles_are_rejected() {
        let raw = "a".repeat(HANDLE_MAX + 1);
        assert_eq!(
            Handle::new(raw),
            Err(AccountValidationError::HandleTooLong { max: HANDLE_MAX })
        );
    }

    #[test]
    fn addresses_normalise_to_lower_case() {
        let raw = format!("0x{}", "AB".repeat(32));
        let address = AccountAddress::new(&raw).expect("valid address");
        assert_eq!(address.as_ref(), format!("0x{}", "ab".repeat(32)));
    }

    #[rstest]
    #[case(String::new())]
    #[case("0x1234".to_owned())]
    #[case("ab".repeat(32))]
    #[case(format!("0x{}zz", "ab".repeat(31)))]
    fn malformed_addresses_are_rejected(#[case] raw: String) {
        assert_eq!(
            AccountAddress::new(raw),
            Err(AccountValidationError::InvalidAddress)
        );
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let account = Account::new(
            AccountId::random(),
            Handle::new("alice").expect("valid handle"),
            AccountAddress::new(format!("0x{}", "ab".repeat(32))).expect("valid address"),
            CredentialValue::from_hex("0xdeadbeef"),
        );
        let rendered = format!("{account:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("deadbeef"));
    }
}

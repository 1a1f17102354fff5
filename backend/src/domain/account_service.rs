//! Account provisioning.
//!
//! Provisioning is get-or-create: a handle maps to exactly one account for
//! the lifetime of the system. Concurrent first-time requests for the same
//! handle race on insert; the registry's uniqueness guarantee picks a winner
//! and the loser re-reads and returns the winning row, so both callers see
//! the same address.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account::{Account, AccountId, Handle};
use crate::domain::credential::to_signing_hex;
use crate::domain::error::Error;
use crate::domain::ports::{
    AccountProvisioning, AccountRegistry, AccountRegistryError, ProvisionedAccount,
};
use crate::domain::signing;

/// Creates accounts on first sight of a handle.
pub struct AccountService {
    registry: Arc<dyn AccountRegistry>,
}

impl AccountService {
    /// Create a service over the given registry.
    pub fn new(registry: Arc<dyn AccountRegistry>) -> Self {
        Self { registry }
    }

    /// Look up an existing account without creating one.
    pub async fn find_existing(&self, handle: &Handle) -> Result<Option<Account>, Error> {
        self.registry
            .find_by_handle(handle)
            .await
            .map_err(registry_error)
    }
}

#[async_trait]
impl AccountProvisioning for AccountService {
    async fn get_or_create(&self, handle: Handle) -> Result<ProvisionedAccount, Error> {
        if let Some(existing) = self.find_existing(&handle).await? {
            return Ok(ProvisionedAccount {
                id: existing.id(),
                address: existing.address().clone(),
                created: false,
            });
        }

        let generated = signing::generate();
        // A credential that cannot be normalised would brick every later
        // send for this handle; abort creation instead of persisting it.
        if to_signing_hex(&generated.credential).is_none() {
            return Err(Error::internal(
                "generated credential failed canonicalisation",
            ));
        }
        let account = Account::new(
            AccountId::random(),
            handle.clone(),
            generated.address,
            generated.credential,
        );

        match self.registry.insert(&account).await {
            Ok(()) => {
                info!(handle = %handle, address = %account.address(), "account created");
                Ok(ProvisionedAccount {
                    id: account.id(),
                    address: account.address().clone(),
                    created: true,
                })
            }
            Err(AccountRegistryError::Duplicate { .. }) => {
                // Lost the insert race; the winner's row is authoritative.
                let winner = self.find_existing(&handle).await?.ok_or_else(|| {
                    Error::internal(format!("handle @{handle} vanished after duplicate insert"))
                })?;
                Ok(ProvisionedAccount {
                    id: winner.id(),
                    address: winner.address().clone(),
                    created: false,
                })
            }
            Err(err) => Err(registry_error(err)),
        }
    }
}

fn registry_error(err: AccountRegistryError) -> Error {
    match err {
        AccountRegistryError::Connection { .. } => {
            Error::service_unavailable("account registry is unavailable")
        }
        other => Error::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::CredentialValue;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::MockAccountRegistry;

    fn stored_account(handle: &str) -> Account {
        let generated = signing::generate();
        Account::new(
            AccountId::random(),
            Handle::new(handle).expect("valid handle"),
            generated.address,
            CredentialValue::from_hex("0xff"),
        )
    }

    #[tokio::test]
    async fn an_existing_handle_is_returned_without_insert() {
        let existing = stored_account("alice");
        let expected_id = existing.id();
        let expected_address = existing.address().clone();

        let mut registry = MockAccountRegistry::new();
        registry
            .expect_find_by_handle()
            .returning(move |_| Ok(Some(existing.clone())));
        registry.expect_insert().times(0);

        let service = AccountService::new(Arc::new(registry));
        let provisioned = service
            .get_or_create(Handle::new("alice").expect("valid handle"))
            .await
            .expect("provision");
        assert!(!provisioned.created);
        assert_eq!(provisioned.id, expected_id);
        assert_eq!(provisioned.address, expected_address);
    }

    #[tokio::test]
    async fn a_new_handle_gets_a_fresh_account() {
        let mut registry = MockAccountRegistry::new();
        registry.expect_find_by_handle().returning(|_| Ok(None));
        registry
            .expect_insert()
            .withf(|account| account.handle().as_ref() == "carol")
            .returning(|_| Ok(()));

        let service = AccountService::new(Arc::new(registry));
        let provisioned = service
            .get_or_create(Handle::new("carol").expect("valid handle"))
            .await
            .expect("provision");
        assert!(provisioned.created);
    }

    #[tokio::test]
    async fn losing_the_insert_race_returns_the_winning_row() {
        let winner = stored_account("dave");
        let winner_id = winner.id();

        let mut registry = MockAccountRegistry::new();
        let mut first_read = true;
        registry.expect_find_by_handle().returning(move |_| {
            if first_read {
                first_read = false;
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
        registry.expect_insert().returning(|account| {
            Err(AccountRegistryError::Duplicate {
                handle: account.handle().to_string(),
            })
        });

        let service = AccountService::new(Arc::new(registry));
        let provisioned = service
            .get_or_create(Handle::new("dave").expect("valid handle"))
            .await
            .expect("provision");
        assert!(!provisioned.created);
        assert_eq!(provisioned.id, winner_id);
    }

    #[tokio::test]
    async fn connection_failures_map_to_service_unavailable() {
        let mut registry = MockAccountRegistry::new();
        registry
            .expect_find_by_handle()
            .returning(|_| Err(AccountRegistryError::connection("refused")));

        let service = AccountService::new(Arc::new(registry));
        let err = service
            .get_or_create(Handle::new("erin").expect("valid handle"))
            .await
            .expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}

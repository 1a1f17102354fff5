//! PostgreSQL-backed `AccountRegistry` implementation using Diesel ORM.
//!
//! This adapter implements the domain's `AccountRegistry` port. Handle
//! uniqueness is enforced by the database; a conflicting insert surfaces as
//! `AccountRegistryError::Duplicate` so the service layer can settle the
//! get-or-create race.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::account::{Account, AccountAddress, AccountId, Handle};
use crate::domain::credential::CredentialValue;
use crate::domain::ports::{AccountRegistry, AccountRegistryError};

use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRegistry` port.
#[derive(Clone)]
pub struct DieselAccountRegistry {
    pool: DbPool,
}

impl DieselAccountRegistry {
    /// Create a new registry with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain registry errors.
fn map_pool_error(error: PoolError) -> AccountRegistryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AccountRegistryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain registry errors.
fn map_diesel_error(error: diesel::result::Error) -> AccountRegistryError {
    use diesel::result::Error as DieselError;

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "diesel operation failed");
    }
    AccountRegistryError::query(error.to_string())
}

/// Reassemble a domain account from its stored row.
fn into_account(row: AccountRow) -> Result<Account, AccountRegistryError> {
    let handle = Handle::new(&row.handle)
        .map_err(|err| AccountRegistryError::query(format!("stored handle: {err}")))?;
    let address = AccountAddress::new(&row.address)
        .map_err(|err| AccountRegistryError::query(format!("stored address: {err}")))?;
    Ok(Account::new(
        AccountId::from_uuid(row.id),
        handle,
        address,
        CredentialValue::from_value(row.credential),
    ))
}

#[async_trait]
impl AccountRegistry for DieselAccountRegistry {
    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<Account>, AccountRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::handle.eq(handle.as_ref()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(into_account).transpose()
    }

    async fn insert(&self, account: &Account) -> Result<(), AccountRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewAccountRow {
            id: *account.id().as_uuid(),
            handle: account.handle().as_ref(),
            address: account.address().as_ref(),
            credential: account.credential().as_value(),
        };
        // on_conflict_do_nothing keeps the race settle-able: zero affected
        // rows means another writer claimed the handle first.
        let inserted = diesel::insert_into(accounts::table)
            .values(&new_row)
            .on_conflict(accounts::handle)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted == 0 {
            return Err(AccountRegistryError::duplicate(
                account.handle().to_string(),
            ));
        }
        Ok(())
    }

    async fn list_handles(&self, limit: usize) -> Result<Vec<Handle>, AccountRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let capped = i64::try_from(limit).unwrap_or(i64::MAX);
        let raw: Vec<String> = accounts::table
            .select(accounts::handle)
            .order(accounts::handle.asc())
            .limit(capped)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        raw.into_iter()
            .map(|value| {
                Handle::new(&value)
                    .map_err(|err| AccountRegistryError::query(format!("stored handle: {err}")))
            })
            .collect()
    }
}

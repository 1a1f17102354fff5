//! In-process adapters for development and tests.
//!
//! The in-memory registry enforces the same handle uniqueness the database
//! does, so the insert-race semantics services rely on hold without Postgres.
//! The in-memory store derives content ids by hashing the stored bytes, so
//! identical documents share an id just as a real content-addressed store
//! would.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::account::{Account, Handle};
use crate::domain::ports::{
    AccountRegistry, AccountRegistryError, ContentId, ContentStore, ContentStoreError,
};

/// Handle-keyed account registry backed by a `RwLock`ed map.
#[derive(Default)]
pub struct InMemoryAccountRegistry {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRegistry for InMemoryAccountRegistry {
    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<Account>, AccountRegistryError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AccountRegistryError::connection("registry lock poisoned"))?;
        Ok(accounts.get(handle.as_ref()).cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), AccountRegistryError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AccountRegistryError::connection("registry lock poisoned"))?;
        let key = account.handle().to_string();
        if accounts.contains_key(&key) {
            return Err(AccountRegistryError::Duplicate { handle: key });
        }
        accounts.insert(key, account.clone());
        Ok(())
    }

    async fn list_handles(&self, limit: usize) -> Result<Vec<Handle>, AccountRegistryError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AccountRegistryError::connection("registry lock poisoned"))?;
        let mut handles: Vec<&String> = accounts.keys().collect();
        handles.sort();
        handles
            .into_iter()
            .take(limit)
            .map(|raw| {
                Handle::new(raw)
                    .map_err(|err| AccountRegistryError::query(format!("stored handle: {err}")))
            })
            .collect()
    }
}

/// Content-addressed byte store backed by a `RwLock`ed map.
#[derive(Default)]
pub struct InMemoryContentStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn address(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, ContentStoreError> {
        let key = Self::address(bytes);
        let id = ContentId::new(&key)
            .map_err(|err| ContentStoreError::decode(format!("derived id: {err}")))?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ContentStoreError::unreachable("store lock poisoned"))?;
        entries.insert(key, bytes.to_vec());
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, ContentStoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ContentStoreError::unreachable("store lock poisoned"))?;
        entries
            .get(id.as_ref())
            .cloned()
            .ok_or_else(|| ContentStoreError::not_found(id.to_string()))
    }
}

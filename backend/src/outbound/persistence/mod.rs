//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the account registry port backed by PostgreSQL
//! via the Diesel ORM with async support through `diesel-async` and `bb8`
//! connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between Diesel models
//!   and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Async-safe pooling**: connections are managed via `bb8` pools with
//!   proper async integration through `diesel-async`.

mod diesel_account_registry;
mod models;
mod pool;
mod schema;

pub use diesel_account_registry::DieselAccountRegistry;
pub use pool::{DbPool, PoolConfig, PoolError};

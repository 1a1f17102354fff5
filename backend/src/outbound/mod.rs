//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed account registry using Diesel ORM
//! - **ledger**: fullnode REST client for balances, transfers, and finality
//! - **content_store**: HTTP content-addressed store for donation descriptors
//! - **memory**: in-process registry and store for development and tests
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod content_store;
pub mod ledger;
pub mod memory;
pub mod persistence;

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Registered accounts.
    ///
    /// `handle` carries a unique constraint; the insert race between two
    /// first-time requests for one handle is settled here.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised handle (lowercase, max 32 characters), unique.
        handle -> Varchar,
        /// 0x-prefixed ledger address.
        address -> Varchar,
        /// Stored signing credential in its original shape.
        credential -> Jsonb,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod commands;
pub mod donations;
pub mod error;
pub mod health;
pub mod state;

pub use error::ApiResult;
pub use state::HttpState;

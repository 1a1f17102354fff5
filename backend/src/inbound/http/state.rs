//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountProvisioning, CommandProcessor, DonationPageQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub commands: Arc<dyn CommandProcessor>,
    pub accounts: Arc<dyn AccountProvisioning>,
    pub donations: Arc<dyn DonationPageQuery>,
}

impl HttpState {
    /// Bundle port implementations for handler injection.
    pub fn new(
        commands: Arc<dyn CommandProcessor>,
        accounts: Arc<dyn AccountProvisioning>,
        donations: Arc<dyn DonationPageQuery>,
    ) -> Self {
        Self {
            commands,
            accounts,
            donations,
        }
    }
}

//! Donation descriptor document.
//!
//! A descriptor is written once to the content-addressed store and never
//! mutated; the page served for it embeds these fields verbatim, so the
//! serialised form is a stable public contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::account::AccountAddress;

/// Immutable, content-addressed payment-collection descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct DonationDescriptor {
    /// Locally generated unique token.
    pub id: Uuid,
    /// Display title of the collector.
    pub title: String,
    /// Longer description rendered on the page.
    pub description: String,
    /// Handle that created the collector and receives the funds.
    pub recipient_handle: String,
    /// Ledger address donations are transferred to.
    #[schema(value_type = String)]
    pub recipient_address: AccountAddress,
    /// Ordered quick-pick amounts, in whole tokens.
    #[schema(value_type = Vec<String>)]
    pub suggested_amounts: Vec<Decimal>,
    /// Smallest accepted custom amount, in whole tokens.
    #[schema(value_type = String)]
    pub minimum_amount: Decimal,
    /// Display symbol of the collected token.
    pub currency_symbol: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Default collector parameters applied when a command does not supply them.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationDefaults {
    /// Quick-pick amounts offered on the page.
    pub suggested_amounts: Vec<Decimal>,
    /// Minimum custom amount.
    pub minimum_amount: Decimal,
    /// Token symbol shown next to amounts.
    pub currency_symbol: String,
}

impl Default for DonationDefaults {
    fn default() -> Self {
        Self {
            suggested_amounts: vec![Decimal::ONE, Decimal::from(5), Decimal::from(10)],
            minimum_amount: Decimal::new(1, 1), // 0.1
            currency_symbol: "APT".to_owned(),
        }
    }
}

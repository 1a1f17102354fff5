//! Port abstraction for asset price lookups.

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Failures raised by price feed adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceFeedError {
    /// The feed has no quote for the symbol.
    #[error("no price available for symbol {symbol}")]
    UnknownSymbol {
        /// Symbol that failed to resolve.
        symbol: String,
    },
    /// The feed could not be reached.
    #[error("price feed unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied detail.
        message: String,
    },
}

/// A quoted asset price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// Upper-cased asset symbol.
    pub symbol: String,
    /// Price in US dollars, exact decimal.
    pub usd: Decimal,
}

/// Source of asset prices. A real feed slots in behind this trait; the
/// bundled [`StaticPriceFeed`] serves a fixed table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Quote a symbol, case-insensitively.
    async fn quote(&self, symbol: &str) -> Result<PriceQuote, PriceFeedError>;
}

/// Fixed-table price feed.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed;

/// Quoted symbols and their prices, in hundredths of a dollar.
const STATIC_QUOTES: &[(&str, i64)] = &[
    ("APT", 8_42),
    ("BTC", 97_250_00),
    ("ETH", 3_412_55),
    ("USDC", 1_00),
];

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn quote(&self, symbol: &str) -> Result<PriceQuote, PriceFeedError> {
        let wanted = symbol.trim().trim_start_matches('$').to_uppercase();
        STATIC_QUOTES
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|(known, cents)| PriceQuote {
                symbol: (*known).to_owned(),
                usd: Decimal::new(*cents, 2),
            })
            .ok_or(PriceFeedError::UnknownSymbol { symbol: wanted })
    }
}

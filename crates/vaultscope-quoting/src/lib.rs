mod cache;
mod coingecko;
mod config;
mod error;
mod source;

pub use cache::{CacheStats, PriceCache, PriceEntry, PriceQuote};
pub use coingecko::CoinGeckoFetcher;
pub use config::PricingConfig;
pub use error::QuoteError;
pub use source::PriceSource;

use std::time::Duration;

use rust_decimal::{Decimal, dec};
use vaultscope_types::{BASE_SEPOLIA_CHAIN_ID, ChainId};

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// How long a fetched price is served without asking upstream again.
    pub cache_ttl: Duration,
    /// Upper bound for a single upstream HTTP call.
    pub fetch_timeout: Duration,
    pub rate_limit_burst: u32,
    pub rate_limit_per_second: u32,
    /// How long a fetch may wait for a rate-limit permit before giving up.
    pub max_rate_limit_wait: Duration,
    /// Chains with no quotable liquidity. Prices there are mocked.
    pub test_network_chain_ids: Vec<ChainId>,
    pub mock_token_price: Decimal,
    pub mock_lp_price: Decimal,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(10),
            rate_limit_burst: 10,
            rate_limit_per_second: 1,
            max_rate_limit_wait: Duration::from_secs(5),
            test_network_chain_ids: vec![BASE_SEPOLIA_CHAIN_ID],
            mock_token_price: dec!(100.0),
            mock_lp_price: dec!(200.0),
            coingecko_base_url: DEFAULT_COINGECKO_URL.to_string(),
            coingecko_api_key: None,
        }
    }
}

impl PricingConfig {
    pub fn is_test_network(&self, chain_id: ChainId) -> bool {
        self.test_network_chain_ids.contains(&chain_id)
    }
}

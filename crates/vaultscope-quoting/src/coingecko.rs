use std::{collections::HashMap, num::NonZeroU32, sync::Arc};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use vaultscope_metrics::{FetchOutcome, PricingMetrics};
use vaultscope_types::{BASE_MAINNET_CHAIN_ID, Chain, PriceKind, TokenKey};

use crate::{config::PricingConfig, error::QuoteError, source::PriceSource};

/// Base mainnet tokens CoinGecko knows by coin id. Everything else goes
/// through the contract-address endpoint.
const BASE_MAINNET_COIN_IDS: [(&str, &str); 5] = [
    ("0x4200000000000000000000000000000000000006", "weth"),
    ("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", "usd-coin"),
    ("0x50c5725949a6f0c72e6c4a641f24049a917db0cb", "dai"),
    (
        "0x2ae3f1ec7f1f5012cfeab0185bfc7aa3cf0dec22",
        "coinbase-wrapped-staked-eth",
    ),
    ("0xd9aaec86b65d86f6a7b5b1b0c42ffa531710b6ca", "bridged-usd-coin-base"),
];

const VS_CURRENCY: &str = "usd";

/// `{ "<id or address>": { "usd": 1.0 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// Token prices from the CoinGecko `simple` endpoints, behind a token-bucket limiter.
pub struct CoinGeckoFetcher {
    client: reqwest::Client,
    config: PricingConfig,
    limiter: DefaultDirectRateLimiter,
    metrics: Option<Arc<PricingMetrics>>,
}

impl CoinGeckoFetcher {
    pub fn new(config: PricingConfig) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| QuoteError::Client(e.to_string()))?;

        let per_second = NonZeroU32::new(config.rate_limit_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.rate_limit_burst).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst));

        Ok(Self {
            client,
            config,
            limiter,
            metrics: None,
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<PricingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn coin_id(key: &TokenKey) -> Option<&'static str> {
        if key.chain_id != BASE_MAINNET_CHAIN_ID {
            return None;
        }
        BASE_MAINNET_COIN_IDS
            .iter()
            .find(|(address, _)| *address == key.address)
            .map(|(_, id)| *id)
    }

    fn api_key_header(&self) -> &'static str {
        if self.config.coingecko_base_url.contains("pro-api") {
            "x-cg-pro-api-key"
        } else {
            "x-cg-demo-api-key"
        }
    }

    /// Waits for a permit, at most `max_rate_limit_wait`.
    async fn acquire_permit(&self) -> Result<(), QuoteError> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }
        tokio::time::timeout(self.config.max_rate_limit_wait, self.limiter.until_ready())
            .await
            .map_err(|_| QuoteError::RateLimited)
    }

    async fn get_prices(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<SimplePriceResponse, QuoteError> {
        self.acquire_permit().await?;

        let url = format!(
            "{}{path}",
            self.config.coingecko_base_url.trim_end_matches('/')
        );
        let mut request = self.client.get(url).query(query);
        if let Some(api_key) = &self.config.coingecko_api_key {
            request = request.header(self.api_key_header(), api_key);
        }

        let response = request.send().await.map_err(transport_error)?;
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(path, "CoinGecko rate limit hit");
                Err(QuoteError::RateLimited)
            }
            status if !status.is_success() => Err(QuoteError::Status(status.as_u16())),
            _ => response.json().await.map_err(transport_error),
        }
    }

    async fn fetch_upstream(&self, key: &TokenKey) -> Result<Decimal, QuoteError> {
        if key.kind == PriceKind::Lp {
            return Err(QuoteError::LpNotQuotable);
        }
        let chain = Chain::from_id(key.chain_id).ok_or(QuoteError::UnsupportedChain(key.chain_id))?;

        if let Some(coin_id) = Self::coin_id(key) {
            match self
                .get_prices("/simple/price", &[("ids", coin_id), ("vs_currencies", VS_CURRENCY)])
                .await
            {
                Ok(body) => {
                    if let Some(price) = usd_price(&body, coin_id) {
                        return Ok(price);
                    }
                    tracing::debug!(token = %key, coin_id, "No USD quote by coin id");
                }
                Err(e) if e.is_rate_limited() => return Err(e),
                Err(e) => {
                    tracing::debug!(token = %key, coin_id, error = %e, "Lookup by coin id failed");
                }
            }
        }

        let path = format!("/simple/token_price/{}", chain.coingecko_platform());
        let body = self
            .get_prices(
                &path,
                &[
                    ("contract_addresses", key.address.as_str()),
                    ("vs_currencies", VS_CURRENCY),
                ],
            )
            .await?;

        usd_price(&body, &key.address).ok_or_else(|| QuoteError::MissingPrice(key.to_string()))
    }

    fn record(&self, key: &TokenKey, outcome: FetchOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(key.chain_id, outcome);
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinGeckoFetcher {
    async fn fetch(&self, key: &TokenKey) -> Result<Decimal, QuoteError> {
        if self.config.is_test_network(key.chain_id) {
            self.record(key, FetchOutcome::Mocked);
            return Ok(match key.kind {
                PriceKind::Token => self.config.mock_token_price,
                PriceKind::Lp => self.config.mock_lp_price,
            });
        }

        let result = self.fetch_upstream(key).await;
        match &result {
            Ok(_) => self.record(key, FetchOutcome::Ok),
            Err(QuoteError::RateLimited) => self.record(key, FetchOutcome::RateLimited),
            Err(e) => {
                tracing::warn!(token = %key, error = %e, "Price fetch failed");
                self.record(key, FetchOutcome::Failed);
            }
        }
        result
    }
}

fn usd_price(body: &SimplePriceResponse, id: &str) -> Option<Decimal> {
    body.get(id)
        .and_then(|quotes| quotes.get(VS_CURRENCY))
        .and_then(|usd| Decimal::from_f64(*usd))
        .filter(|price| !price.is_sign_negative())
}

fn transport_error(e: reqwest::Error) -> QuoteError {
    if e.is_timeout() {
        QuoteError::Timeout
    } else {
        QuoteError::Http(e)
    }
}

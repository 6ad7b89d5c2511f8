use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use rust_decimal::Decimal;
use vaultscope_adapters::{
    AdapterDescriptor, AdapterError, ChainReaders, FarmAdapter, FarmYield, LpAdapter, resolve,
    units::normalize,
};
use vaultscope_metrics::{ComputationKind, VaultMetrics};
use vaultscope_quoting::{PriceCache, PriceQuote};
use vaultscope_types::{ChainId, DataQuality, TokenKey, VaultConfig};

use crate::{
    compounding::{compound, net_apr},
    config::ApyConfig,
    error::CalculatorError,
    model::{ApyBreakdown, MetricsSnapshot, TvlResult},
    store::VaultStore,
};

/// `getPricePerFullShare` is scaled by 1e18 regardless of the vault's decimals.
const PRICE_PER_SHARE_DECIMALS: u8 = 18;

/// Farm figures behind an [`ApyBreakdown`], kept for metrics snapshots.
#[derive(Debug, Clone, Copy)]
struct YieldOutcome {
    breakdown: ApyBreakdown,
    farm: FarmYield,
    reward: PriceQuote,
}

/// Computes TVL, APY and metric snapshots for configured vaults.
///
/// Every price goes through the shared [`PriceCache`]. Upstream and on-chain
/// failures lower the data quality of the result instead of failing the call;
/// only unknown or malformed vaults are reported as errors.
pub struct Calculator {
    pub(crate) cache: Arc<PriceCache>,
    pub(crate) store: Arc<dyn VaultStore>,
    pub(crate) readers: ChainReaders,
    pub(crate) config: ApyConfig,
    pub(crate) metrics: Option<Arc<VaultMetrics>>,
}

impl Calculator {
    pub fn new(
        cache: Arc<PriceCache>,
        store: Arc<dyn VaultStore>,
        readers: ChainReaders,
        config: ApyConfig,
    ) -> Self {
        Self {
            cache,
            store,
            readers,
            config,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<VaultMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub const fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    pub const fn config(&self) -> &ApyConfig {
        &self.config
    }

    /// Whether on-chain reads are configured for `chain_id`.
    pub fn supports_chain(&self, chain_id: ChainId) -> bool {
        self.readers.chain_ids().any(|id| id == chain_id)
    }

    pub async fn compute_tvl(&self, vault_id: &str) -> Result<TvlResult, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        let adapters = adapters(&config)?;
        Ok(self.tvl_of(&config, adapters.as_ref()).await)
    }

    pub async fn compute_apy(&self, vault_id: &str) -> Result<ApyBreakdown, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        let adapters = adapters(&config)?;
        Ok(self.apy_of(&config, adapters.as_ref()).await)
    }

    /// Recomputes every figure of the vault and persists the snapshot.
    pub async fn refresh_metrics(&self, vault_id: &str) -> Result<MetricsSnapshot, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        let descriptor = adapters(&config)?;
        // Harvest fields outlive refreshes that cannot read them.
        let previous = self.store.get_metrics(&config.id).await?;
        let (previous_harvest_at, last_harvest_tx) = previous
            .map(|snapshot| (snapshot.last_harvest_at, snapshot.last_harvest_tx))
            .unwrap_or_default();

        let Some(descriptor) = descriptor else {
            let snapshot = MetricsSnapshot {
                data_quality: DataQuality::Error,
                last_harvest_at: previous_harvest_at,
                last_harvest_tx,
                ..MetricsSnapshot::empty(&config.id)
            };
            return Ok(self.store.save_metrics(snapshot).await?);
        };

        let lp = self.lp_price(config.chain_id, &descriptor).await;
        let tvl = self.tvl_with(&config, &descriptor, lp).await;
        let outcome = self.yield_with(&config, &descriptor, lp).await;
        self.record(&config.id, ComputationKind::Tvl, tvl.data_quality);
        self.record(&config.id, ComputationKind::Apy, outcome.breakdown.data_quality);

        let (shares, shares_quality) = self.share_figures(config.chain_id, &descriptor).await;
        let last_harvest_at = self
            .last_harvest(config.chain_id, &descriptor)
            .await
            .or(previous_harvest_at);

        let snapshot = MetricsSnapshot {
            vault_id: config.id.clone(),
            tvl: tvl.tvl,
            apr: outcome.breakdown.vault_apr,
            apy: outcome.breakdown.vault_apy,
            price_per_share: shares.price_per_share,
            total_supply: shares.total_supply,
            decimals: shares.decimals,
            lp_price: lp.price,
            reward_price: outcome.reward.price,
            yearly_rewards_usd: outcome.farm.yearly_rewards_usd,
            data_quality: DataQuality::worst([
                tvl.data_quality,
                outcome.breakdown.data_quality,
                shares_quality,
            ]),
            updated_at: Utc::now(),
            last_harvest_at,
            last_harvest_tx,
        };

        let saved = self.store.save_metrics(snapshot).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_refresh(&saved.vault_id);
        }
        tracing::info!(
            vault_id = %saved.vault_id,
            tvl = %saved.tvl,
            apy = %saved.apy,
            quality = %saved.data_quality,
            "Refreshed vault metrics"
        );
        Ok(saved)
    }

    /// Last persisted snapshot, or an empty one for a vault never refreshed.
    pub async fn get_metrics(&self, vault_id: &str) -> Result<MetricsSnapshot, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        Ok(self
            .store
            .get_metrics(&config.id)
            .await?
            .unwrap_or_else(|| MetricsSnapshot::empty(&config.id)))
    }

    pub(crate) async fn vault_config(&self, vault_id: &str) -> Result<VaultConfig, CalculatorError> {
        self.store
            .get_vault_config(vault_id)
            .await?
            .ok_or_else(|| CalculatorError::InvalidVaultConfig(format!("unknown vault {vault_id}")))
    }

    pub(crate) async fn tvl_of(
        &self,
        config: &VaultConfig,
        adapters: Option<&AdapterDescriptor>,
    ) -> TvlResult {
        let result = match adapters {
            Some(descriptor) => {
                let lp = self.lp_price(config.chain_id, descriptor).await;
                self.tvl_with(config, descriptor, lp).await
            }
            None => TvlResult::error(config.chain_id),
        };
        self.record(&config.id, ComputationKind::Tvl, result.data_quality);
        result
    }

    pub(crate) async fn apy_of(
        &self,
        config: &VaultConfig,
        adapters: Option<&AdapterDescriptor>,
    ) -> ApyBreakdown {
        let breakdown = match adapters {
            Some(descriptor) => {
                let lp = match descriptor.farm {
                    FarmAdapter::NoFarm => PriceQuote::new(Decimal::ZERO, DataQuality::Ok),
                    FarmAdapter::RewardPool { .. } => {
                        self.lp_price(config.chain_id, descriptor).await
                    }
                };
                self.yield_with(config, descriptor, lp).await.breakdown
            }
            None => ApyBreakdown::error(&self.config),
        };
        self.record(&config.id, ComputationKind::Apy, breakdown.data_quality);
        breakdown
    }

    /// Unit price of the vault's want token, cached under its `lp:` key.
    ///
    /// A single-token want is worth the token price itself. On test networks
    /// pairs get the configured LP mock. Elsewhere pair prices are derived
    /// from the underlying token prices and carry their worst quality.
    pub(crate) async fn lp_price(
        &self,
        chain_id: ChainId,
        descriptor: &AdapterDescriptor,
    ) -> PriceQuote {
        if self.cache.is_test_network(chain_id) {
            let key = match descriptor.lp {
                LpAdapter::SingleToken { token } => TokenKey::token(chain_id, &token.to_string()),
                LpAdapter::ConstantProductPair { pair, .. } => {
                    TokenKey::lp(chain_id, &pair.to_string())
                }
            };
            return self.cache.get(&key).await;
        }
        let key = TokenKey::lp(chain_id, &descriptor.want.to_string());
        self.cache
            .get_or_compute(&key, || self.derive_lp_price(chain_id, descriptor))
            .await
    }

    async fn derive_lp_price(
        &self,
        chain_id: ChainId,
        descriptor: &AdapterDescriptor,
    ) -> Result<PriceQuote, AdapterError> {
        let reader = self.readers.get(chain_id)?;

        let mut prices = HashMap::new();
        let mut quality = DataQuality::Ok;
        for token in descriptor.lp.priced_tokens() {
            let quote = self
                .cache
                .get(&TokenKey::token(chain_id, &token.to_string()))
                .await;
            if quote.quality.is_error() {
                return Err(AdapterError::MissingPrice(token.to_string()));
            }
            quality = quality.merge(quote.quality);
            prices.insert(token, quote.price);
        }

        let price = descriptor.lp.lp_unit_price(reader.as_ref(), &prices).await?;
        Ok(PriceQuote::new(price, quality))
    }

    async fn tvl_with(
        &self,
        config: &VaultConfig,
        descriptor: &AdapterDescriptor,
        lp: PriceQuote,
    ) -> TvlResult {
        if lp.quality.is_error() {
            return TvlResult::error(config.chain_id);
        }

        match self.vault_assets(config.chain_id, descriptor).await {
            Ok(assets) => match assets.checked_mul(lp.price) {
                Some(tvl) => TvlResult {
                    chain_id: config.chain_id,
                    tvl,
                    lp_price: lp.price,
                    data_quality: lp.quality,
                },
                None => {
                    tracing::warn!(vault_id = %config.id, "TVL overflowed");
                    TvlResult::error(config.chain_id)
                }
            },
            Err(e) => {
                tracing::warn!(vault_id = %config.id, error = %e, "Could not read vault assets");
                TvlResult {
                    lp_price: lp.price,
                    ..TvlResult::error(config.chain_id)
                }
            }
        }
    }

    /// `totalAssets()` of the vault in want token units.
    async fn vault_assets(
        &self,
        chain_id: ChainId,
        descriptor: &AdapterDescriptor,
    ) -> Result<Decimal, AdapterError> {
        let reader = self.readers.get(chain_id)?;
        let raw = reader.total_assets(descriptor.vault).await?;
        let decimals = reader.decimals(descriptor.want).await?;
        normalize(raw, decimals).ok_or(AdapterError::Overflow("total assets"))
    }

    async fn yield_with(
        &self,
        config: &VaultConfig,
        descriptor: &AdapterDescriptor,
        lp: PriceQuote,
    ) -> YieldOutcome {
        let no_reward = PriceQuote::new(Decimal::ZERO, DataQuality::Ok);
        let Some(reward_token) = descriptor.farm.reward_token() else {
            return YieldOutcome {
                breakdown: ApyBreakdown::zero(&self.config),
                farm: FarmYield::default(),
                reward: no_reward,
            };
        };

        let reward = self
            .cache
            .get(&TokenKey::token(config.chain_id, &reward_token.to_string()))
            .await;
        let failed = YieldOutcome {
            breakdown: ApyBreakdown::error(&self.config),
            farm: FarmYield::default(),
            reward,
        };

        let quality = lp.quality.merge(reward.quality);
        if quality.is_error() {
            return failed;
        }

        let reader = match self.readers.get(config.chain_id) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(vault_id = %config.id, error = %e, "No chain reader");
                return failed;
            }
        };

        match descriptor
            .farm
            .farm_apr(reader.as_ref(), descriptor.want, reward.price, lp.price)
            .await
        {
            Ok(farm) => {
                let vault_apr = net_apr(farm.gross_apr, self.config.performance_fee);
                let vault_apy = compound(
                    vault_apr,
                    self.config.compoundings_per_year,
                    self.config.max_apy,
                );
                YieldOutcome {
                    breakdown: ApyBreakdown::new(vault_apr, vault_apy, &self.config, quality),
                    farm,
                    reward,
                }
            }
            Err(e) => {
                tracing::warn!(vault_id = %config.id, error = %e, "Farm APR unavailable");
                failed
            }
        }
    }

    /// Share price, supply and decimals of the vault token. Unreadable values
    /// fall back to neutral defaults and mark the snapshot stale.
    async fn share_figures(
        &self,
        chain_id: ChainId,
        descriptor: &AdapterDescriptor,
    ) -> (ShareFigures, DataQuality) {
        let mut figures = ShareFigures::default();
        let Ok(reader) = self.readers.get(chain_id) else {
            return (figures, DataQuality::Stale);
        };

        let mut quality = DataQuality::Ok;
        match reader.decimals(descriptor.vault).await {
            Ok(decimals) => figures.decimals = decimals,
            Err(e) => {
                tracing::debug!(vault = %descriptor.vault, error = %e, "No share decimals");
                quality = DataQuality::Stale;
            }
        }

        match reader.price_per_full_share(descriptor.vault).await {
            Ok(raw) => {
                if let Some(pps) = normalize(raw, PRICE_PER_SHARE_DECIMALS) {
                    figures.price_per_share = pps;
                }
            }
            Err(e) => {
                tracing::debug!(vault = %descriptor.vault, error = %e, "No price per share");
                quality = DataQuality::Stale;
            }
        }

        match reader.total_supply(descriptor.vault).await {
            Ok(raw) => {
                if let Some(supply) = normalize(raw, figures.decimals) {
                    figures.total_supply = supply;
                }
            }
            Err(e) => {
                tracing::debug!(vault = %descriptor.vault, error = %e, "No share supply");
                quality = DataQuality::Stale;
            }
        }

        (figures, quality)
    }

    fn record(&self, vault_id: &str, kind: ComputationKind, quality: DataQuality) {
        if let Some(metrics) = &self.metrics {
            metrics.record_computation(vault_id, kind, quality.as_ref());
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ShareFigures {
    price_per_share: Decimal,
    total_supply: Decimal,
    decimals: u8,
}

impl Default for ShareFigures {
    fn default() -> Self {
        Self {
            price_per_share: Decimal::ONE,
            total_supply: Decimal::ZERO,
            decimals: 18,
        }
    }
}

/// Adapters for `config`. Malformed configs are errors; shapes no adapter
/// handles resolve to `None` so callers report them with error quality.
pub(crate) fn adapters(config: &VaultConfig) -> Result<Option<AdapterDescriptor>, CalculatorError> {
    match resolve(config) {
        Ok(descriptor) => Ok(Some(descriptor)),
        Err(AdapterError::InvalidVaultConfig(reason)) => Err(CalculatorError::InvalidVaultConfig(
            format!("{}: {reason}", config.id),
        )),
        Err(e) => {
            tracing::warn!(vault_id = %config.id, error = %e, "Vault has no usable adapter");
            Ok(None)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use alloy_primitives::{Address, U256, address};
    use rust_decimal::dec;
    use vaultscope_adapters::{PoolInfo, testing::FakeChain};
    use vaultscope_quoting::{CoinGeckoFetcher, PriceSource, PricingConfig, QuoteError};
    use vaultscope_types::{BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID};

    use super::*;
    use crate::store::InMemoryVaultStore;

    pub(crate) const VAULT: Address = address!("1111111111111111111111111111111111111111");
    pub(crate) const PAIR: Address = address!("2222222222222222222222222222222222222222");
    pub(crate) const FARM: Address = address!("3333333333333333333333333333333333333333");
    pub(crate) const REWARD: Address = address!("4444444444444444444444444444444444444444");
    pub(crate) const WETH: Address = address!("4200000000000000000000000000000000000006");
    pub(crate) const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

    pub(crate) fn e18(units: u128) -> U256 {
        U256::from(units * 10u128.pow(18))
    }

    /// Fixed prices per token address; anything else fails like a timeout.
    #[derive(Default)]
    pub(crate) struct FixedPrices {
        prices: HashMap<String, Decimal>,
        failing: Mutex<HashSet<String>>,
        calls: AtomicUsize,
    }

    impl FixedPrices {
        pub(crate) fn with(mut self, token: Address, price: Decimal) -> Self {
            self.prices.insert(token.to_string().to_lowercase(), price);
            self
        }

        /// Every later fetch of `token` fails.
        pub(crate) fn fail(&self, token: Address) {
            self.failing
                .lock()
                .unwrap()
                .insert(token.to_string().to_lowercase());
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl PriceSource for FixedPrices {
        async fn fetch(&self, key: &TokenKey) -> Result<Decimal, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(&key.address) {
                return Err(QuoteError::Timeout);
            }
            self.prices
                .get(&key.address)
                .copied()
                .ok_or(QuoteError::Timeout)
        }
    }

    pub(crate) fn single_token_vault(id: &str) -> VaultConfig {
        VaultConfig {
            id: id.to_string(),
            name: format!("{id} vault"),
            chain_id: BASE_MAINNET_CHAIN_ID,
            vault_address: VAULT.to_string(),
            want_address: WETH.to_string(),
            ..VaultConfig::default()
        }
    }

    pub(crate) fn pair_farm_vault(id: &str, chain_id: ChainId) -> VaultConfig {
        VaultConfig {
            id: id.to_string(),
            name: format!("{id} vault"),
            chain_id,
            vault_address: VAULT.to_string(),
            want_address: PAIR.to_string(),
            token0: Some(WETH.to_string()),
            token1: Some(USDC.to_string()),
            reward_token: Some(REWARD.to_string()),
            farm_address: Some(FARM.to_string()),
            ..VaultConfig::default()
        }
    }

    /// 10 WETH / 30 000 USDC backing 100 LP, so one LP is worth 600 USD.
    /// The farm emits 1 REWARD per second, half of it to the PAIR pool where
    /// 1 000 LP are staked. The vault holds 5 LP.
    pub(crate) fn pair_farm_chain() -> FakeChain {
        FakeChain::default()
            .with_decimals(WETH, 18)
            .with_decimals(USDC, 6)
            .with_decimals(PAIR, 18)
            .with_decimals(REWARD, 18)
            .with_decimals(VAULT, 18)
            .with_pair(
                PAIR,
                (WETH, USDC),
                (e18(10), U256::from(30_000u128 * 10u128.pow(6))),
            )
            .with_supply(PAIR, e18(100))
            .with_supply(VAULT, e18(4))
            .with_vault(VAULT, e18(5), U256::from(1_250_000_000_000_000_000u128))
            .with_reward_per_second(FARM, e18(1))
            .with_total_alloc_point(FARM, U256::from(200u32))
            .with_pools(
                FARM,
                vec![
                    PoolInfo {
                        lp_token: WETH,
                        alloc_point: U256::from(100u32),
                    },
                    PoolInfo {
                        lp_token: PAIR,
                        alloc_point: U256::from(100u32),
                    },
                ],
            )
            .with_balance(PAIR, FARM, e18(1_000))
    }

    pub(crate) fn calculator(
        source: Arc<dyn PriceSource>,
        store: InMemoryVaultStore,
        chain_id: ChainId,
        chain: FakeChain,
    ) -> Calculator {
        calculator_with_pricing(source, store, chain_id, chain, PricingConfig::default())
    }

    fn calculator_with_pricing(
        source: Arc<dyn PriceSource>,
        store: InMemoryVaultStore,
        chain_id: ChainId,
        chain: FakeChain,
        pricing: PricingConfig,
    ) -> Calculator {
        let cache = Arc::new(PriceCache::new(source, pricing));
        let readers = ChainReaders::new().with(chain_id, Arc::new(chain));
        Calculator::new(cache, Arc::new(store), readers, ApyConfig::default())
    }

    fn mainnet_prices() -> Arc<FixedPrices> {
        Arc::new(
            FixedPrices::default()
                .with(WETH, dec!(3000))
                .with(USDC, dec!(1))
                .with(REWARD, dec!(0.01)),
        )
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000001),
            "{actual} != {expected}"
        );
    }

    #[tokio::test]
    async fn test_unknown_vault_is_invalid_config() {
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new(),
            BASE_MAINNET_CHAIN_ID,
            FakeChain::default(),
        );

        assert!(matches!(
            calc.compute_apy("nope").await,
            Err(CalculatorError::InvalidVaultConfig(_))
        ));
        assert!(matches!(
            calc.compute_tvl("nope").await,
            Err(CalculatorError::InvalidVaultConfig(_))
        ));
        assert!(matches!(
            calc.get_metrics("nope").await,
            Err(CalculatorError::InvalidVaultConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_vault_is_invalid_config() {
        let broken = VaultConfig {
            vault_address: "not-an-address".to_string(),
            ..single_token_vault("broken")
        };
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new().with_vault(broken),
            BASE_MAINNET_CHAIN_ID,
            FakeChain::default(),
        );

        assert!(matches!(
            calc.compute_tvl("broken").await,
            Err(CalculatorError::InvalidVaultConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_shape_degrades_quality() {
        let odd = VaultConfig {
            token1: Some(USDC.to_string()),
            ..single_token_vault("odd")
        };
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new().with_vault(odd),
            BASE_MAINNET_CHAIN_ID,
            FakeChain::default(),
        );

        let apy = calc.compute_apy("odd").await.unwrap();
        assert_eq!(apy.data_quality, DataQuality::Error);
        assert_eq!(apy.total_apy, Decimal::ZERO);
        let tvl = calc.compute_tvl("odd").await.unwrap();
        assert_eq!(tvl.data_quality, DataQuality::Error);
    }

    #[tokio::test]
    async fn test_single_token_tvl() {
        let chain = FakeChain::default()
            .with_decimals(WETH, 18)
            .with_vault(VAULT, e18(10), e18(1));
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new().with_vault(single_token_vault("weth")),
            BASE_MAINNET_CHAIN_ID,
            chain,
        );

        let tvl = calc.compute_tvl("weth").await.unwrap();
        assert_eq!(tvl.tvl, dec!(30000));
        assert_eq!(tvl.lp_price, dec!(3000));
        assert_eq!(tvl.data_quality, DataQuality::Ok);

        // No farm: nothing to earn, nothing wrong.
        let apy = calc.compute_apy("weth").await.unwrap();
        assert_eq!(apy, ApyBreakdown::zero(calc.config()));
    }

    #[tokio::test]
    async fn test_failed_fetch_with_empty_cache_reports_error() {
        let chain = FakeChain::default()
            .with_decimals(WETH, 18)
            .with_vault(VAULT, e18(10), e18(1));
        let calc = calculator(
            Arc::new(FixedPrices::default()),
            InMemoryVaultStore::new().with_vault(single_token_vault("weth")),
            BASE_MAINNET_CHAIN_ID,
            chain,
        );

        let tvl = calc.compute_tvl("weth").await.unwrap();
        assert_eq!(tvl.tvl, Decimal::ZERO);
        assert_eq!(tvl.data_quality, DataQuality::Error);
    }

    #[tokio::test]
    async fn test_unreadable_vault_reports_error() {
        // Price is fine, but the vault contract does not answer.
        let chain = FakeChain::default().with_decimals(WETH, 18);
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new().with_vault(single_token_vault("weth")),
            BASE_MAINNET_CHAIN_ID,
            chain,
        );

        let tvl = calc.compute_tvl("weth").await.unwrap();
        assert_eq!(tvl.tvl, Decimal::ZERO);
        assert_eq!(tvl.lp_price, dec!(3000));
        assert_eq!(tvl.data_quality, DataQuality::Error);
    }

    #[tokio::test]
    async fn test_pair_with_farm_apy() {
        let prices = mainnet_prices();
        let calc = calculator(
            Arc::clone(&prices) as Arc<dyn PriceSource>,
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
        );

        let apy = calc.compute_apy("lp").await.unwrap();
        // 15_768_000 REWARD * 0.01 over 1_000 LP * 600, less the 4.5 % fee.
        assert_close(apy.vault_apr, dec!(0.2628) * dec!(0.955));
        assert!(apy.vault_apy >= apy.vault_apr);
        assert_eq!(apy.trading_apr, Decimal::ZERO);
        assert_eq!(apy.total_apy, apy.vault_apy + apy.trading_apr);
        assert_eq!(apy.data_quality, DataQuality::Ok);
        assert_eq!(apy.compoundings_per_year, 1460);

        let tvl = calc.compute_tvl("lp").await.unwrap();
        assert_close(tvl.tvl, dec!(3000));
        assert_eq!(tvl.data_quality, DataQuality::Ok);

        // WETH, USDC and REWARD were fetched once each; the LP price was cached.
        assert_eq!(prices.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_reward_price_fails_apy_only() {
        let prices = Arc::new(
            FixedPrices::default()
                .with(WETH, dec!(3000))
                .with(USDC, dec!(1)),
        );
        let calc = calculator(
            prices,
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
        );

        let apy = calc.compute_apy("lp").await.unwrap();
        assert_eq!(apy.data_quality, DataQuality::Error);
        assert_eq!(apy.vault_apy, Decimal::ZERO);

        let tvl = calc.compute_tvl("lp").await.unwrap();
        assert_eq!(tvl.data_quality, DataQuality::Ok);
    }

    #[tokio::test]
    async fn test_test_network_uses_mock_prices() {
        let fetcher = CoinGeckoFetcher::new(PricingConfig::default()).unwrap();
        let calc = calculator(
            Arc::new(fetcher),
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_SEPOLIA_CHAIN_ID)),
            BASE_SEPOLIA_CHAIN_ID,
            pair_farm_chain(),
        );

        let tvl = calc.compute_tvl("lp").await.unwrap();
        assert_eq!(tvl.lp_price, dec!(200));
        assert_eq!(tvl.tvl, dec!(1000));
        assert_eq!(tvl.data_quality, DataQuality::Ok);

        let apy = calc.compute_apy("lp").await.unwrap();
        assert_eq!(apy.data_quality, DataQuality::Ok);
        assert!(apy.vault_apy >= apy.vault_apr);
    }

    #[tokio::test]
    async fn test_refresh_persists_snapshot() {
        let calc = calculator(
            mainnet_prices(),
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
        );

        let before = calc.get_metrics("lp").await.unwrap();
        assert_eq!(before.tvl, Decimal::ZERO);
        assert_eq!(before.price_per_share, Decimal::ONE);

        let refreshed = calc.refresh_metrics("lp").await.unwrap();
        assert_close(refreshed.tvl, dec!(3000));
        assert_close(refreshed.lp_price, dec!(600));
        assert_eq!(refreshed.reward_price, dec!(0.01));
        assert_eq!(refreshed.price_per_share, dec!(1.25));
        assert_eq!(refreshed.total_supply, dec!(4));
        assert_eq!(refreshed.decimals, 18);
        assert_eq!(refreshed.yearly_rewards_usd, dec!(157680));
        assert!(refreshed.apy >= refreshed.apr);
        assert_eq!(refreshed.data_quality, DataQuality::Ok);

        assert_eq!(calc.get_metrics("lp").await.unwrap(), refreshed);
    }

    /// Every lookup goes back to the source.
    fn always_expired() -> PricingConfig {
        PricingConfig {
            cache_ttl: Duration::ZERO,
            ..PricingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stale_input_stales_tvl() {
        let prices = mainnet_prices();
        let chain = FakeChain::default()
            .with_decimals(WETH, 18)
            .with_vault(VAULT, e18(10), e18(1));
        let calc = calculator_with_pricing(
            Arc::clone(&prices) as Arc<dyn PriceSource>,
            InMemoryVaultStore::new().with_vault(single_token_vault("weth")),
            BASE_MAINNET_CHAIN_ID,
            chain,
            always_expired(),
        );

        assert_eq!(
            calc.compute_tvl("weth").await.unwrap().data_quality,
            DataQuality::Ok
        );
        prices.fail(WETH);

        let tvl = calc.compute_tvl("weth").await.unwrap();
        assert_eq!(tvl.data_quality, DataQuality::Stale);
        assert_eq!(tvl.tvl, dec!(30000));
    }

    #[tokio::test]
    async fn test_one_stale_pair_token_stales_the_vault() {
        let prices = mainnet_prices();
        let calc = calculator_with_pricing(
            Arc::clone(&prices) as Arc<dyn PriceSource>,
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
            always_expired(),
        );

        assert_eq!(
            calc.compute_tvl("lp").await.unwrap().data_quality,
            DataQuality::Ok
        );
        // USDC keeps answering; only WETH falls back to its last price.
        prices.fail(WETH);

        let tvl = calc.compute_tvl("lp").await.unwrap();
        assert_eq!(tvl.data_quality, DataQuality::Stale);
        assert_close(tvl.tvl, dec!(3000));

        let apy = calc.compute_apy("lp").await.unwrap();
        assert_eq!(apy.data_quality, DataQuality::Stale);
        assert_close(apy.vault_apr, dec!(0.2628) * dec!(0.955));
    }

    #[tokio::test]
    async fn test_single_token_on_test_network_uses_token_mock() {
        let fetcher = CoinGeckoFetcher::new(PricingConfig::default()).unwrap();
        let vault = VaultConfig {
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            ..single_token_vault("weth")
        };
        let chain = FakeChain::default()
            .with_decimals(WETH, 18)
            .with_vault(VAULT, e18(10), e18(1));
        let calc = calculator(
            Arc::new(fetcher),
            InMemoryVaultStore::new().with_vault(vault),
            BASE_SEPOLIA_CHAIN_ID,
            chain,
        );

        let tvl = calc.compute_tvl("weth").await.unwrap();
        assert_eq!(tvl.lp_price, dec!(100));
        assert_eq!(tvl.tvl, dec!(1000));
        assert_eq!(tvl.data_quality, DataQuality::Ok);
    }
}

use std::sync::Arc;

use opentelemetry::{KeyValue, global, metrics::Counter};

const METER_NAME: &str = "vaultscope-api";

#[derive(Debug)]
pub struct MetricsRegistry {
    pub pricing: Arc<PricingMetrics>,
    pub vaults: Arc<VaultMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pricing: PricingMetrics::new(),
            vaults: VaultMetrics::new(),
        })
    }
}

#[derive(Debug)]
pub struct PricingMetrics {
    cache_lookups: Counter<u64>,
    upstream_fetches: Counter<u64>,
}

impl PricingMetrics {
    fn new() -> Arc<Self> {
        let meter = global::meter(METER_NAME);
        let cache_lookups = meter
            .u64_counter("price_cache_lookups_total")
            .with_description("Price cache lookups by outcome")
            .with_unit("count")
            .init();

        let upstream_fetches = meter
            .u64_counter("price_upstream_fetches_total")
            .with_description("Calls made to the upstream price API by result")
            .with_unit("count")
            .init();

        Arc::new(Self {
            cache_lookups,
            upstream_fetches,
        })
    }

    pub fn record_lookup(&self, chain_id: u64, outcome: CacheOutcome) {
        self.cache_lookups.add(
            1,
            &[
                KeyValue::new("chain_id", chain_id.to_string()),
                KeyValue::new("outcome", outcome.as_str()),
            ],
        );
    }

    pub fn record_fetch(&self, chain_id: u64, result: FetchOutcome) {
        self.upstream_fetches.add(
            1,
            &[
                KeyValue::new("chain_id", chain_id.to_string()),
                KeyValue::new("result", result.as_str()),
            ],
        );
    }
}

#[derive(Debug)]
pub struct VaultMetrics {
    computations: Counter<u64>,
    refreshes: Counter<u64>,
}

impl VaultMetrics {
    fn new() -> Arc<Self> {
        let meter = global::meter(METER_NAME);
        let computations = meter
            .u64_counter("vault_computations_total")
            .with_description("Number of per-vault APY/TVL computations by data quality")
            .with_unit("count")
            .init();

        let refreshes = meter
            .u64_counter("vault_metrics_refreshes_total")
            .with_description("Number of vault metrics snapshots persisted")
            .with_unit("count")
            .init();

        Arc::new(Self {
            computations,
            refreshes,
        })
    }

    pub fn record_computation(&self, vault_id: &str, kind: ComputationKind, quality: &str) {
        self.computations.add(
            1,
            &[
                KeyValue::new("vault_id", vault_id.to_string()),
                KeyValue::new("kind", kind.as_str()),
                KeyValue::new("quality", quality.to_string()),
            ],
        );
    }

    pub fn record_refresh(&self, vault_id: &str) {
        self.refreshes
            .add(1, &[KeyValue::new("vault_id", vault_id.to_string())]);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Entry served within its TTL.
    Fresh,
    /// Entry missing or expired and successfully refetched.
    Refetched,
    /// Refetch failed, last known value served.
    Stale,
    /// Refetch failed with nothing to fall back on.
    Error,
}

impl CacheOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Refetched => "refetched",
            Self::Stale => "stale",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Ok,
    Mocked,
    Failed,
    RateLimited,
}

impl FetchOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Mocked => "mocked",
            Self::Failed => "failed",
            Self::RateLimited => "rate_limited",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputationKind {
    Apy,
    Tvl,
}

impl ComputationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apy => "apy",
            Self::Tvl => "tvl",
        }
    }
}

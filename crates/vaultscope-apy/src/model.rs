use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vaultscope_types::{ChainId, DataQuality};

use crate::config::ApyConfig;

/// Yield figures for one vault. Rates are fractions (0.12 is 12 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApyBreakdown {
    /// Farm APR net of the performance fee.
    pub vault_apr: Decimal,
    pub vault_apy: Decimal,
    /// Swap fee income. Always zero: no trading volume source is wired in.
    pub trading_apr: Decimal,
    pub total_apy: Decimal,
    pub compoundings_per_year: u32,
    pub performance_fee: Decimal,
    pub data_quality: DataQuality,
}

impl ApyBreakdown {
    pub fn new(vault_apr: Decimal, vault_apy: Decimal, config: &ApyConfig, quality: DataQuality) -> Self {
        let trading_apr = Decimal::ZERO;
        Self {
            vault_apr,
            vault_apy,
            trading_apr,
            total_apy: vault_apy + trading_apr,
            compoundings_per_year: config.compoundings_per_year,
            performance_fee: config.performance_fee,
            data_quality: quality,
        }
    }

    pub fn zero(config: &ApyConfig) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, config, DataQuality::Ok)
    }

    pub fn error(config: &ApyConfig) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, config, DataQuality::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvlResult {
    pub chain_id: ChainId,
    /// USD value of everything the vault manages.
    pub tvl: Decimal,
    pub lp_price: Decimal,
    pub data_quality: DataQuality,
}

impl TvlResult {
    pub const fn error(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            tvl: Decimal::ZERO,
            lp_price: Decimal::ZERO,
            data_quality: DataQuality::Error,
        }
    }
}

/// Persisted per-vault figures written by an explicit refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub vault_id: String,
    pub tvl: Decimal,
    pub apr: Decimal,
    pub apy: Decimal,
    pub price_per_share: Decimal,
    pub total_supply: Decimal,
    pub decimals: u8,
    pub lp_price: Decimal,
    pub reward_price: Decimal,
    pub yearly_rewards_usd: Decimal,
    pub data_quality: DataQuality,
    pub updated_at: DateTime<Utc>,
    pub last_harvest_at: Option<DateTime<Utc>>,
    /// Transaction of the last reported harvest.
    pub last_harvest_tx: Option<String>,
}

impl MetricsSnapshot {
    /// What a vault that was never refreshed reports.
    pub fn empty(vault_id: &str) -> Self {
        Self {
            vault_id: vault_id.to_string(),
            tvl: Decimal::ZERO,
            apr: Decimal::ZERO,
            apy: Decimal::ZERO,
            price_per_share: Decimal::ONE,
            total_supply: Decimal::ZERO,
            decimals: 18,
            lp_price: Decimal::ZERO,
            reward_price: Decimal::ZERO,
            yearly_rewards_usd: Decimal::ZERO,
            data_quality: DataQuality::Ok,
            updated_at: Utc::now(),
            last_harvest_at: None,
            last_harvest_tx: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRecord {
    pub vault_id: String,
    pub tx_hash: String,
    /// Profit reported by the harvester, in want token units.
    pub profit: Decimal,
    pub harvest_at: DateTime<Utc>,
}

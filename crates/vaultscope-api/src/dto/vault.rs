use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vaultscope_apy::{ApyBreakdown, HarvestRecord, MetricsSnapshot, TvlResult};
use vaultscope_types::{ChainId, DataQuality};

use super::{decimal_string, percent, percent_string};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TvlDto {
    /// USD, as a string for precision.
    pub tvl: String,
    pub chain_id: ChainId,
    pub data_quality: DataQuality,
}

impl From<TvlResult> for TvlDto {
    fn from(result: TvlResult) -> Self {
        Self {
            tvl: decimal_string(result.tvl),
            chain_id: result.chain_id,
            data_quality: result.data_quality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TvlResponse {
    pub vaults: BTreeMap<String, TvlDto>,
    pub updated_at: String,
}

/// APY breakdown in percent, rounded to 4 decimals. Rates are `null` when
/// the breakdown could not be computed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApyDto {
    pub vault_apr: Option<f64>,
    pub vault_apy: Option<f64>,
    pub trading_apr: Option<f64>,
    pub total_apy: Option<f64>,
    pub compoundings_per_year: u32,
    /// Fraction of rewards kept as fee, e.g. 0.045.
    pub performance_fee: f64,
    pub data_quality: DataQuality,
}

impl From<ApyBreakdown> for ApyDto {
    fn from(breakdown: ApyBreakdown) -> Self {
        let rate = |value| (!breakdown.data_quality.is_error()).then(|| percent(value));
        Self {
            vault_apr: rate(breakdown.vault_apr),
            vault_apy: rate(breakdown.vault_apy),
            trading_apr: rate(breakdown.trading_apr),
            total_apy: rate(breakdown.total_apy),
            compoundings_per_year: breakdown.compoundings_per_year,
            performance_fee: super::to_f64(breakdown.performance_fee),
            data_quality: breakdown.data_quality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApyResponse {
    pub vaults: BTreeMap<String, ApyDto>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VaultApyResponse {
    pub vault_id: String,
    #[serde(flatten)]
    pub apy: ApyDto,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VaultMetricsDto {
    pub vault_id: String,
    pub tvl: String,
    pub apr_pct: String,
    pub apy_pct: String,
    pub price_per_share: String,
    pub total_supply: String,
    pub decimals: u8,
    pub lp_price: String,
    pub reward_price: String,
    pub yearly_rewards_usd: String,
    pub data_quality: DataQuality,
    pub updated_at: String,
    pub last_harvest_at: Option<String>,
    pub last_harvest_tx: Option<String>,
}

impl From<MetricsSnapshot> for VaultMetricsDto {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            tvl: decimal_string(snapshot.tvl),
            apr_pct: percent_string(snapshot.apr),
            apy_pct: percent_string(snapshot.apy),
            price_per_share: decimal_string(snapshot.price_per_share),
            total_supply: decimal_string(snapshot.total_supply),
            decimals: snapshot.decimals,
            lp_price: decimal_string(snapshot.lp_price),
            reward_price: decimal_string(snapshot.reward_price),
            yearly_rewards_usd: decimal_string(snapshot.yearly_rewards_usd),
            data_quality: snapshot.data_quality,
            updated_at: snapshot.updated_at.to_rfc3339(),
            last_harvest_at: snapshot.last_harvest_at.map(|at| at.to_rfc3339()),
            last_harvest_tx: snapshot.last_harvest_tx,
            vault_id: snapshot.vault_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HarvestDto {
    pub tx_hash: String,
    /// Want token units, as a string for precision.
    pub profit: String,
    pub harvest_at: String,
}

impl From<HarvestRecord> for HarvestDto {
    fn from(harvest: HarvestRecord) -> Self {
        Self {
            profit: decimal_string(harvest.profit),
            harvest_at: harvest.harvest_at.to_rfc3339(),
            tx_hash: harvest.tx_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HarvestsResponse {
    pub vault_id: String,
    pub harvests: Vec<HarvestDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordHarvestRequest {
    pub tx_hash: String,
    /// Defaults to zero.
    #[serde(default)]
    #[schema(value_type = String)]
    pub profit: rust_decimal::Decimal,
}

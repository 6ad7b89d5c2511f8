use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vaultscope_quoting::{CacheStats, PriceEntry, PriceQuote};
use vaultscope_types::{ChainId, DataQuality};

use super::decimal_string;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceDto {
    /// USD unit price, as a string for precision.
    pub price: String,
    pub quality: DataQuality,
}

impl From<PriceQuote> for PriceDto {
    fn from(quote: PriceQuote) -> Self {
        Self {
            price: decimal_string(quote.price),
            quality: quote.quality,
        }
    }
}

impl From<&PriceEntry> for PriceDto {
    fn from(entry: &PriceEntry) -> Self {
        Self {
            price: decimal_string(entry.price),
            quality: entry.quality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricesResponse {
    pub chain_id: ChainId,
    /// Keyed by `price:<chain_id>:<address>`.
    pub prices: BTreeMap<String, PriceDto>,
    pub updated_at: String, // RFC3339 timestamp
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LpsResponse {
    pub chain_id: ChainId,
    /// LP unit price keyed by vault id.
    pub lps: BTreeMap<String, PriceDto>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheStatsResponse {
    pub total_entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub error: usize,
    pub ttl_secs: u64,
}

impl CacheStatsResponse {
    pub const fn new(stats: CacheStats, ttl_secs: u64) -> Self {
        Self {
            total_entries: stats.total_entries,
            fresh: stats.fresh,
            stale: stats.stale,
            error: stats.error,
            ttl_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheClearedResponse {
    /// Entries dropped, including error entries.
    pub cleared: usize,
}

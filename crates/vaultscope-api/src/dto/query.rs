use serde::Deserialize;
use utoipa::ToSchema;
use vaultscope_types::{BASE_MAINNET_CHAIN_ID, ChainId};

/// Query parameters for chain-scoped listings. Defaults to Base mainnet.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChainQuery {
    #[serde(default = "default_chain_id")]
    pub chain_id: ChainId,
}

const fn default_chain_id() -> ChainId {
    BASE_MAINNET_CHAIN_ID
}

/// Paging for harvest listings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HarvestQuery {
    #[serde(default = "default_harvest_limit")]
    pub limit: usize,
}

const fn default_harvest_limit() -> usize {
    20
}

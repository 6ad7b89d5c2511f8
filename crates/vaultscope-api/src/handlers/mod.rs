pub mod cache;
pub mod prices;
pub mod vaults;

pub use cache::{clear_cache, get_cache_stats};
pub use prices::{list_lps, list_prices};
pub use vaults::{
    get_vault_apy, get_vault_metrics, list_apy, list_tvl, list_vault_harvests, record_vault_harvest,
    refresh_vault_metrics,
};

use vaultscope_types::ChainId;

use crate::{AppState, errors::ApiError};

pub(crate) fn ensure_supported_chain(state: &AppState, chain_id: ChainId) -> Result<(), ApiError> {
    if state.calculator.supports_chain(chain_id) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Unsupported chain {chain_id}")))
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

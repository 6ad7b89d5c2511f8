use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// A vault as configured by the admin layer.
///
/// Address fields are raw strings: an empty string and `None` both mean
/// "not set". Parsing and validation happen when adapters are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub id: String,
    pub name: String,
    pub chain_id: ChainId,
    pub vault_address: String,
    pub strategy_address: String,
    /// The token the vault accepts, usually an LP token.
    pub want_address: String,
    pub token0: Option<String>,
    pub token1: Option<String>,
    pub reward_token: Option<String>,
    pub farm_address: Option<String>,
    /// MasterChef pool index. Discovered by scanning the farm when unset.
    pub farm_pool_id: Option<u32>,
    pub router_address: Option<String>,
    pub paused: bool,
    pub experimental: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VaultConfig {
    /// Trimmed value of an optional address field, `None` when blank.
    pub fn populated(field: Option<&str>) -> Option<&str> {
        field.map(str::trim).filter(|value| !value.is_empty())
    }

    pub fn strategy_address(&self) -> Option<&str> {
        Self::populated(Some(&self.strategy_address))
    }

    pub fn token0(&self) -> Option<&str> {
        Self::populated(self.token0.as_deref())
    }

    pub fn token1(&self) -> Option<&str> {
        Self::populated(self.token1.as_deref())
    }

    pub fn reward_token(&self) -> Option<&str> {
        Self::populated(self.reward_token.as_deref())
    }

    pub fn farm_address(&self) -> Option<&str> {
        Self::populated(self.farm_address.as_deref())
    }
}

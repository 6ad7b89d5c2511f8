use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type ChainId = u64;

pub const BASE_MAINNET_CHAIN_ID: ChainId = 8453;
pub const BASE_SEPOLIA_CHAIN_ID: ChainId = 84532;

/// Networks the service knows how to talk to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Base,
    BaseSepolia,
}

impl Chain {
    pub const fn id(self) -> ChainId {
        match self {
            Self::Base => BASE_MAINNET_CHAIN_ID,
            Self::BaseSepolia => BASE_SEPOLIA_CHAIN_ID,
        }
    }

    pub const fn from_id(chain_id: ChainId) -> Option<Self> {
        match chain_id {
            BASE_MAINNET_CHAIN_ID => Some(Self::Base),
            BASE_SEPOLIA_CHAIN_ID => Some(Self::BaseSepolia),
            _ => None,
        }
    }

    /// Platform slug used by CoinGecko's `simple/token_price` endpoint.
    pub const fn coingecko_platform(self) -> &'static str {
        match self {
            Self::Base | Self::BaseSepolia => "base",
        }
    }

    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Base => "https://mainnet.base.org",
            Self::BaseSepolia => "https://sepolia.base.org",
        }
    }
}

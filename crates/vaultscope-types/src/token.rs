use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chain::ChainId;

/// What a cached price refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    /// Unit price of a plain ERC20 token.
    Token,
    /// Unit price of a liquidity-pool share token.
    Lp,
}

impl PriceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "price",
            Self::Lp => "lp",
        }
    }
}

/// Cache key for a price: `<kind>:<chain id>:<lowercased address>`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct TokenKey {
    pub kind: PriceKind,
    pub chain_id: ChainId,
    pub address: String,
}

impl TokenKey {
    pub fn new(kind: PriceKind, chain_id: ChainId, address: &str) -> Self {
        Self {
            kind,
            chain_id,
            address: address.trim().to_lowercase(),
        }
    }

    pub fn token(chain_id: ChainId, address: &str) -> Self {
        Self::new(PriceKind::Token, chain_id, address)
    }

    pub fn lp(chain_id: ChainId, address: &str) -> Self {
        Self::new(PriceKind::Lp, chain_id, address)
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.as_str(), self.chain_id, self.address)
    }
}

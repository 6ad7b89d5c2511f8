use thiserror::Error;
use vaultscope_types::ChainId;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("no RPC endpoint configured for chain {0}")]
    UnsupportedChain(ChainId),

    #[error("eth_call {call} failed: {message}")]
    Rpc { call: &'static str, message: String },

    #[error("could not decode {call} output: {message}")]
    Decode { call: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The record is missing required fields or holds malformed addresses.
    #[error("invalid vault config: {0}")]
    InvalidVaultConfig(String),

    /// The populated fields match no known LP/farm combination.
    #[error("unsupported vault shape: {0}")]
    UnsupportedVaultShape(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("{0} is not staked in farm pool list")]
    PoolNotFound(String),

    #[error("missing price for token {0}")]
    MissingPrice(String),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

impl AdapterError {
    pub const fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidVaultConfig(_))
    }
}

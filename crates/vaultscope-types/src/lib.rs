pub mod chain;
pub mod quality;
pub mod token;
pub mod vault;

pub use chain::{BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID, Chain, ChainId};
pub use quality::DataQuality;
pub use token::{PriceKind, TokenKey};
pub use vault::VaultConfig;

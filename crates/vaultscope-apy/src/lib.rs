//! Vault valuation: TVL, farm APR, compounded APY and persisted metric snapshots.

mod aggregate;
pub mod calculator;
pub mod compounding;
pub mod config;
pub mod error;
mod harvest;
pub mod model;
pub mod postgres;
pub mod store;

pub use calculator::Calculator;
pub use config::ApyConfig;
pub use error::CalculatorError;
pub use harvest::MAX_HARVESTS;
pub use model::{ApyBreakdown, HarvestRecord, MetricsSnapshot, TvlResult};
pub use postgres::PgVaultStore;
pub use store::{InMemoryVaultStore, VaultStore};

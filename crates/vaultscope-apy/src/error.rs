use thiserror::Error;
use vaultscope_db::DatabaseError;

#[derive(Debug, Error)]
pub enum CalculatorError {
    /// Unknown vault id, or a record missing required fields.
    #[error("invalid vault config: {0}")]
    InvalidVaultConfig(String),

    /// A harvest report that cannot be stored as given.
    #[error("invalid harvest: {0}")]
    InvalidHarvest(String),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

pub mod harvest_event;
pub mod vault;
pub mod vault_metrics;

pub use harvest_event::{HarvestEvent, NewHarvestEvent};
pub use vault::Vault;
pub use vault_metrics::{NewVaultMetrics, VaultMetrics};

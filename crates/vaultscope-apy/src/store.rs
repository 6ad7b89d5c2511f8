use std::sync::Arc;

use dashmap::DashMap;
use vaultscope_db::DatabaseError;
use vaultscope_types::{ChainId, VaultConfig};

use crate::model::{HarvestRecord, MetricsSnapshot};

/// Access to vault configurations and their persisted metrics.
#[async_trait::async_trait]
pub trait VaultStore: Send + Sync {
    async fn get_vault_config(&self, vault_id: &str) -> Result<Option<VaultConfig>, DatabaseError>;

    /// All vaults, or only those on `chain_id`.
    async fn list_vault_configs(
        &self,
        chain_id: Option<ChainId>,
    ) -> Result<Vec<VaultConfig>, DatabaseError>;

    async fn get_metrics(&self, vault_id: &str) -> Result<Option<MetricsSnapshot>, DatabaseError>;

    async fn save_metrics(&self, snapshot: MetricsSnapshot) -> Result<MetricsSnapshot, DatabaseError>;

    async fn record_harvest(&self, harvest: HarvestRecord) -> Result<HarvestRecord, DatabaseError>;

    /// Up to `limit` harvests of the vault, newest first.
    async fn list_harvests(
        &self,
        vault_id: &str,
        limit: usize,
    ) -> Result<Vec<HarvestRecord>, DatabaseError>;
}

/// Non-persistent store, used by tests and local runs without a database.
#[derive(Default, Clone)]
pub struct InMemoryVaultStore {
    vaults: Arc<DashMap<String, VaultConfig>>,
    metrics: Arc<DashMap<String, MetricsSnapshot>>,
    harvests: Arc<DashMap<String, Vec<HarvestRecord>>>,
}

impl InMemoryVaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, config: VaultConfig) {
        self.vaults.insert(config.id.clone(), config);
    }

    #[must_use]
    pub fn with_vault(self, config: VaultConfig) -> Self {
        self.insert(config);
        self
    }
}

#[async_trait::async_trait]
impl VaultStore for InMemoryVaultStore {
    async fn get_vault_config(&self, vault_id: &str) -> Result<Option<VaultConfig>, DatabaseError> {
        Ok(self.vaults.get(vault_id).map(|entry| entry.value().clone()))
    }

    async fn list_vault_configs(
        &self,
        chain_id: Option<ChainId>,
    ) -> Result<Vec<VaultConfig>, DatabaseError> {
        let mut vaults: Vec<VaultConfig> = self
            .vaults
            .iter()
            .filter(|entry| chain_id.is_none_or(|chain_id| entry.value().chain_id == chain_id))
            .map(|entry| entry.value().clone())
            .collect();
        vaults.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(vaults)
    }

    async fn get_metrics(&self, vault_id: &str) -> Result<Option<MetricsSnapshot>, DatabaseError> {
        Ok(self.metrics.get(vault_id).map(|entry| entry.value().clone()))
    }

    async fn save_metrics(&self, snapshot: MetricsSnapshot) -> Result<MetricsSnapshot, DatabaseError> {
        self.metrics
            .insert(snapshot.vault_id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn record_harvest(&self, harvest: HarvestRecord) -> Result<HarvestRecord, DatabaseError> {
        self.harvests
            .entry(harvest.vault_id.clone())
            .or_default()
            .push(harvest.clone());
        Ok(harvest)
    }

    async fn list_harvests(
        &self,
        vault_id: &str,
        limit: usize,
    ) -> Result<Vec<HarvestRecord>, DatabaseError> {
        let mut harvests = self
            .harvests
            .get(vault_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        // Later reports first among equal timestamps.
        harvests.reverse();
        harvests.sort_by(|a, b| b.harvest_at.cmp(&a.harvest_at));
        harvests.truncate(limit);
        Ok(harvests)
    }
}

use std::str::FromStr;

use deadpool_diesel::postgres::Pool;
use vaultscope_db::{
    DatabaseError, PoolExt,
    models::{HarvestEvent, NewHarvestEvent, NewVaultMetrics, Vault, VaultMetrics},
};
use vaultscope_types::{ChainId, DataQuality, VaultConfig};

use crate::{
    model::{HarvestRecord, MetricsSnapshot},
    store::VaultStore,
};

/// [`VaultStore`] backed by the `vaults` and `vault_metrics` tables.
#[derive(Clone)]
pub struct PgVaultStore {
    pool: Pool,
}

impl PgVaultStore {
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VaultStore for PgVaultStore {
    async fn get_vault_config(&self, vault_id: &str) -> Result<Option<VaultConfig>, DatabaseError> {
        let id = vault_id.to_string();
        match self
            .pool
            .interact_with_context(format!("get vault {vault_id}"), move |conn| {
                Vault::find_by_id(&id, conn)
            })
            .await
        {
            Ok(vault) => Ok(Some(vault_config(vault))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_vault_configs(
        &self,
        chain_id: Option<ChainId>,
    ) -> Result<Vec<VaultConfig>, DatabaseError> {
        let vaults = match chain_id {
            Some(chain_id) => {
                let chain_id = i64::try_from(chain_id).unwrap_or(i64::MAX);
                self.pool
                    .interact_with_context(format!("list vaults on chain {chain_id}"), move |conn| {
                        Vault::find_by_chain(chain_id, conn)
                    })
                    .await?
            }
            None => {
                self.pool
                    .interact_with_context("list vaults".to_string(), Vault::find_all)
                    .await?
            }
        };
        Ok(vaults.into_iter().map(vault_config).collect())
    }

    async fn get_metrics(&self, vault_id: &str) -> Result<Option<MetricsSnapshot>, DatabaseError> {
        let id = vault_id.to_string();
        let row = self
            .pool
            .interact_with_context(format!("get metrics of vault {vault_id}"), move |conn| {
                VaultMetrics::find_by_vault(&id, conn)
            })
            .await?;
        Ok(row.map(snapshot))
    }

    async fn save_metrics(&self, metrics: MetricsSnapshot) -> Result<MetricsSnapshot, DatabaseError> {
        let operation = format!("upsert metrics of vault {}", metrics.vault_id);
        let row = new_row(metrics);
        let saved = self
            .pool
            .interact_with_context(operation, move |conn| VaultMetrics::upsert(&row, conn))
            .await?;
        Ok(snapshot(saved))
    }

    async fn record_harvest(&self, harvest: HarvestRecord) -> Result<HarvestRecord, DatabaseError> {
        let operation = format!("record harvest of vault {}", harvest.vault_id);
        let row = NewHarvestEvent {
            vault_id: harvest.vault_id,
            tx_hash: harvest.tx_hash,
            profit: harvest.profit,
            harvest_at: harvest.harvest_at,
        };
        let saved = self
            .pool
            .interact_with_context(operation, move |conn| HarvestEvent::create(&row, conn))
            .await?;
        Ok(harvest_record(saved))
    }

    async fn list_harvests(
        &self,
        vault_id: &str,
        limit: usize,
    ) -> Result<Vec<HarvestRecord>, DatabaseError> {
        let id = vault_id.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .pool
            .interact_with_context(format!("list harvests of vault {vault_id}"), move |conn| {
                HarvestEvent::find_recent(&id, limit, conn)
            })
            .await?;
        Ok(rows.into_iter().map(harvest_record).collect())
    }
}

fn vault_config(vault: Vault) -> VaultConfig {
    VaultConfig {
        // A negative chain id matches no configured reader.
        chain_id: ChainId::try_from(vault.chain_id).unwrap_or_default(),
        farm_pool_id: vault.farm_pool_id.and_then(|pid| u32::try_from(pid).ok()),
        id: vault.id,
        name: vault.name,
        vault_address: vault.vault_address,
        strategy_address: vault.strategy_address,
        want_address: vault.want_address,
        token0: vault.token0,
        token1: vault.token1,
        reward_token: vault.reward_token,
        farm_address: vault.farm_address,
        router_address: vault.router_address,
        paused: vault.paused,
        experimental: vault.experimental,
        created_at: Some(vault.created_at),
        updated_at: Some(vault.updated_at),
    }
}

fn snapshot(row: VaultMetrics) -> MetricsSnapshot {
    MetricsSnapshot {
        data_quality: DataQuality::from_str(&row.data_quality).unwrap_or(DataQuality::Error),
        decimals: u8::try_from(row.decimals).unwrap_or(18),
        vault_id: row.vault_id,
        tvl: row.tvl,
        apr: row.apr,
        apy: row.apy,
        price_per_share: row.price_per_share,
        total_supply: row.total_supply,
        lp_price: row.lp_price,
        reward_price: row.reward_price,
        yearly_rewards_usd: row.yearly_rewards_usd,
        updated_at: row.updated_at,
        last_harvest_at: row.last_harvest_at,
        last_harvest_tx: row.last_harvest_tx,
    }
}

fn harvest_record(row: HarvestEvent) -> HarvestRecord {
    HarvestRecord {
        vault_id: row.vault_id,
        tx_hash: row.tx_hash,
        profit: row.profit,
        harvest_at: row.harvest_at,
    }
}

fn new_row(snapshot: MetricsSnapshot) -> NewVaultMetrics {
    NewVaultMetrics {
        vault_id: snapshot.vault_id,
        tvl: snapshot.tvl,
        apr: snapshot.apr,
        apy: snapshot.apy,
        price_per_share: snapshot.price_per_share,
        total_supply: snapshot.total_supply,
        decimals: i32::from(snapshot.decimals),
        lp_price: snapshot.lp_price,
        reward_price: snapshot.reward_price,
        yearly_rewards_usd: snapshot.yearly_rewards_usd,
        data_quality: snapshot.data_quality.to_string(),
        updated_at: snapshot.updated_at,
        last_harvest_at: snapshot.last_harvest_at,
        last_harvest_tx: snapshot.last_harvest_tx,
    }
}

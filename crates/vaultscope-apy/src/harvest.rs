use std::str::FromStr;

use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vaultscope_adapters::AdapterDescriptor;
use vaultscope_types::ChainId;

use crate::{
    calculator::Calculator,
    error::CalculatorError,
    model::{HarvestRecord, MetricsSnapshot},
};

/// Upper bound on one harvest listing.
pub const MAX_HARVESTS: usize = 100;

impl Calculator {
    /// Stores a harvest reported for the vault and stamps its metrics snapshot
    /// with it.
    pub async fn record_harvest(
        &self,
        vault_id: &str,
        tx_hash: &str,
        profit: Decimal,
    ) -> Result<HarvestRecord, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        let tx_hash = B256::from_str(tx_hash.trim())
            .map_err(|e| CalculatorError::InvalidHarvest(format!("tx hash '{tx_hash}': {e}")))?;
        if profit.is_sign_negative() {
            return Err(CalculatorError::InvalidHarvest(format!(
                "negative profit {profit}"
            )));
        }

        let harvest = self
            .store
            .record_harvest(HarvestRecord {
                vault_id: config.id.clone(),
                tx_hash: tx_hash.to_string(),
                profit,
                harvest_at: Utc::now(),
            })
            .await?;

        let mut snapshot = self
            .store
            .get_metrics(&config.id)
            .await?
            .unwrap_or_else(|| MetricsSnapshot::empty(&config.id));
        snapshot.last_harvest_at = Some(harvest.harvest_at);
        snapshot.last_harvest_tx = Some(harvest.tx_hash.clone());
        self.store.save_metrics(snapshot).await?;

        tracing::info!(
            vault_id = %harvest.vault_id,
            tx = %harvest.tx_hash,
            profit = %harvest.profit,
            "Recorded harvest"
        );
        Ok(harvest)
    }

    /// Latest harvests of the vault, newest first. `limit` is clamped to
    /// `1..=MAX_HARVESTS`.
    pub async fn list_harvests(
        &self,
        vault_id: &str,
        limit: usize,
    ) -> Result<Vec<HarvestRecord>, CalculatorError> {
        let config = self.vault_config(vault_id).await?;
        Ok(self
            .store
            .list_harvests(&config.id, limit.clamp(1, MAX_HARVESTS))
            .await?)
    }

    /// `lastHarvest()` of the vault's strategy. `None` when no strategy is
    /// configured, it never harvested, or the read fails.
    pub(crate) async fn last_harvest(
        &self,
        chain_id: ChainId,
        descriptor: &AdapterDescriptor,
    ) -> Option<DateTime<Utc>> {
        let strategy = descriptor.strategy?;
        let reader = self.readers.get(chain_id).ok()?;
        let raw = match reader.last_harvest(strategy).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(strategy = %strategy, error = %e, "No last harvest");
                return None;
            }
        };

        let secs = i64::try_from(u64::try_from(raw).ok()?).ok()?;
        if secs == 0 {
            return None;
        }
        DateTime::from_timestamp(secs, 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy_primitives::{Address, address};
    use rust_decimal::dec;
    use vaultscope_types::{BASE_MAINNET_CHAIN_ID, VaultConfig};

    use super::*;
    use crate::{
        calculator::tests::{
            FixedPrices, REWARD, USDC, WETH, calculator, pair_farm_chain, pair_farm_vault,
        },
        store::InMemoryVaultStore,
    };

    const STRATEGY: Address = address!("5555555555555555555555555555555555555555");
    const TX: &str = "0xabababababababababababababababababababababababababababababababab";

    fn prices() -> Arc<FixedPrices> {
        Arc::new(
            FixedPrices::default()
                .with(WETH, dec!(3000))
                .with(USDC, dec!(1))
                .with(REWARD, dec!(0.01)),
        )
    }

    fn vault_with_strategy() -> VaultConfig {
        VaultConfig {
            strategy_address: STRATEGY.to_string(),
            ..pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)
        }
    }

    #[tokio::test]
    async fn test_refresh_reads_last_harvest_of_strategy() {
        let chain = pair_farm_chain().with_last_harvest(STRATEGY, 1_700_000_000);
        let calc = calculator(
            prices(),
            InMemoryVaultStore::new().with_vault(vault_with_strategy()),
            BASE_MAINNET_CHAIN_ID,
            chain,
        );

        let snapshot = calc.refresh_metrics("lp").await.unwrap();
        assert_eq!(
            snapshot.last_harvest_at,
            DateTime::from_timestamp(1_700_000_000, 0)
        );
        assert_eq!(snapshot.last_harvest_tx, None);
    }

    #[tokio::test]
    async fn test_never_harvested_strategy_has_no_timestamp() {
        let chain = pair_farm_chain().with_last_harvest(STRATEGY, 0);
        let calc = calculator(
            prices(),
            InMemoryVaultStore::new().with_vault(vault_with_strategy()),
            BASE_MAINNET_CHAIN_ID,
            chain,
        );

        let snapshot = calc.refresh_metrics("lp").await.unwrap();
        assert_eq!(snapshot.last_harvest_at, None);
    }

    #[tokio::test]
    async fn test_recorded_harvest_survives_refresh() {
        // No strategy configured, so refresh has nothing on-chain to read.
        let calc = calculator(
            prices(),
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
        );

        let harvest = calc.record_harvest("lp", TX, dec!(1.5)).await.unwrap();
        assert_eq!(harvest.tx_hash, TX);

        let stamped = calc.get_metrics("lp").await.unwrap();
        assert_eq!(stamped.last_harvest_at, Some(harvest.harvest_at));
        assert_eq!(stamped.last_harvest_tx.as_deref(), Some(TX));

        let refreshed = calc.refresh_metrics("lp").await.unwrap();
        assert_eq!(refreshed.last_harvest_at, Some(harvest.harvest_at));
        assert_eq!(refreshed.last_harvest_tx.as_deref(), Some(TX));

        let listed = calc.list_harvests("lp", 0).await.unwrap();
        assert_eq!(listed, vec![harvest]);
    }

    #[tokio::test]
    async fn test_rejected_harvest_reports() {
        let calc = calculator(
            prices(),
            InMemoryVaultStore::new().with_vault(pair_farm_vault("lp", BASE_MAINNET_CHAIN_ID)),
            BASE_MAINNET_CHAIN_ID,
            pair_farm_chain(),
        );

        assert!(matches!(
            calc.record_harvest("lp", "0x1234", Decimal::ZERO).await,
            Err(CalculatorError::InvalidHarvest(_))
        ));
        assert!(matches!(
            calc.record_harvest("lp", TX, dec!(-1)).await,
            Err(CalculatorError::InvalidHarvest(_))
        ));
        assert!(matches!(
            calc.record_harvest("nope", TX, Decimal::ZERO).await,
            Err(CalculatorError::InvalidVaultConfig(_))
        ));
        assert!(calc.list_harvests("lp", 20).await.unwrap().is_empty());
    }
}

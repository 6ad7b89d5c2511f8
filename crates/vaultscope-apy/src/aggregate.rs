use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;
use vaultscope_quoting::{PriceEntry, PriceQuote};
use vaultscope_types::{ChainId, PriceKind, TokenKey, VaultConfig};

use crate::{
    calculator::{Calculator, adapters},
    error::CalculatorError,
    model::{ApyBreakdown, TvlResult},
};

/// Batch views over every configured vault. A vault that cannot be valued
/// shows up with error quality; it never fails the whole listing.
impl Calculator {
    /// Token prices on `chain_id`, after refreshing every token a vault there
    /// depends on.
    pub async fn list_prices(
        &self,
        chain_id: ChainId,
    ) -> Result<Vec<(TokenKey, PriceEntry)>, CalculatorError> {
        let vaults = self.store.list_vault_configs(Some(chain_id)).await?;

        let mut tokens = BTreeSet::new();
        for vault in &vaults {
            let Ok(Some(descriptor)) = adapters(vault) else {
                continue;
            };
            tokens.extend(descriptor.lp.priced_tokens());
            tokens.extend(descriptor.farm.reward_token());
        }

        let keys: Vec<TokenKey> = tokens
            .into_iter()
            .map(|token| TokenKey::token(chain_id, &token.to_string()))
            .collect();
        join_all(keys.iter().map(|key| self.cache.get(key))).await;

        Ok(self.cache.snapshot(chain_id, PriceKind::Token))
    }

    /// LP unit price of every vault on `chain_id`, by vault id.
    pub async fn list_lps(
        &self,
        chain_id: ChainId,
    ) -> Result<BTreeMap<String, PriceQuote>, CalculatorError> {
        let vaults = self.store.list_vault_configs(Some(chain_id)).await?;

        let quotes = join_all(vaults.iter().map(|vault| async move {
            match adapters(vault) {
                Ok(Some(descriptor)) => self.lp_price(vault.chain_id, &descriptor).await,
                _ => PriceQuote::error(),
            }
        }))
        .await;

        Ok(by_vault_id(&vaults, quotes))
    }

    pub async fn list_tvl(&self) -> Result<BTreeMap<String, TvlResult>, CalculatorError> {
        let vaults = self.store.list_vault_configs(None).await?;

        let results = join_all(vaults.iter().map(|vault| async move {
            match adapters(vault) {
                Ok(descriptor) => self.tvl_of(vault, descriptor.as_ref()).await,
                Err(e) => {
                    tracing::warn!(vault_id = %vault.id, error = %e, "Skipping TVL");
                    TvlResult::error(vault.chain_id)
                }
            }
        }))
        .await;

        Ok(by_vault_id(&vaults, results))
    }

    pub async fn list_apy(&self) -> Result<BTreeMap<String, ApyBreakdown>, CalculatorError> {
        let vaults = self.store.list_vault_configs(None).await?;

        let results = join_all(vaults.iter().map(|vault| async move {
            match adapters(vault) {
                Ok(descriptor) => self.apy_of(vault, descriptor.as_ref()).await,
                Err(e) => {
                    tracing::warn!(vault_id = %vault.id, error = %e, "Skipping APY");
                    ApyBreakdown::error(&self.config)
                }
            }
        }))
        .await;

        Ok(by_vault_id(&vaults, results))
    }
}

fn by_vault_id<T>(vaults: &[VaultConfig], values: Vec<T>) -> BTreeMap<String, T> {
    vaults
        .iter()
        .map(|vault| vault.id.clone())
        .zip(values)
        .collect()
}

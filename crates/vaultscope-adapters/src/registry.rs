use std::str::FromStr;

use alloy_primitives::Address;
use vaultscope_types::VaultConfig;

use crate::{error::AdapterError, farm::FarmAdapter, lp::LpAdapter};

/// Valuation strategies that apply to one vault, recomputed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub vault: Address,
    /// Harvesting strategy behind the vault, when configured.
    pub strategy: Option<Address>,
    pub want: Address,
    pub lp: LpAdapter,
    pub farm: FarmAdapter,
}

/// Picks the LP and farm adapters from which fields of the config are set.
///
/// | token0 | token1 | LP                   |
/// |--------|--------|----------------------|
/// | set    | set    | constant-product pair|
/// | -      | -      | single token (want)  |
/// | set    | -      | single token (token0)|
/// | -      | set    | unsupported          |
///
/// A farm needs a reward token. No farm means no reward APR.
pub fn resolve(config: &VaultConfig) -> Result<AdapterDescriptor, AdapterError> {
    if config.id.trim().is_empty() {
        return Err(AdapterError::InvalidVaultConfig("missing id".to_string()));
    }
    let vault = required_address("vaultAddress", &config.vault_address)?;
    let want = required_address("wantAddress", &config.want_address)?;
    let strategy = optional_address("strategyAddress", config.strategy_address())?;

    let lp = match (
        optional_address("token0", config.token0())?,
        optional_address("token1", config.token1())?,
    ) {
        (Some(token0), Some(token1)) => LpAdapter::ConstantProductPair {
            pair: want,
            token0,
            token1,
        },
        (None, None) => LpAdapter::SingleToken { token: want },
        (Some(token0), None) => LpAdapter::SingleToken { token: token0 },
        (None, Some(_)) => {
            return Err(AdapterError::UnsupportedVaultShape(
                "token1 is set without token0".to_string(),
            ));
        }
    };

    let farm = match (
        optional_address("farmAddress", config.farm_address())?,
        optional_address("rewardToken", config.reward_token())?,
    ) {
        (Some(farm), Some(reward_token)) => FarmAdapter::RewardPool {
            farm,
            reward_token,
            pool_id: config.farm_pool_id,
        },
        (None, _) => FarmAdapter::NoFarm,
        (Some(_), None) => {
            return Err(AdapterError::UnsupportedVaultShape(
                "farm is set without a reward token".to_string(),
            ));
        }
    };

    Ok(AdapterDescriptor {
        vault,
        strategy,
        want,
        lp,
        farm,
    })
}

fn required_address(field: &str, value: &str) -> Result<Address, AdapterError> {
    optional_address(field, VaultConfig::populated(Some(value)))?
        .ok_or_else(|| AdapterError::InvalidVaultConfig(format!("missing {field}")))
}

fn optional_address(field: &str, value: Option<&str>) -> Result<Option<Address>, AdapterError> {
    value
        .map(|raw| {
            Address::from_str(raw).map_err(|e| {
                AdapterError::InvalidVaultConfig(format!("{field} '{raw}' is not an address: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const VAULT: &str = "0x1111111111111111111111111111111111111111";
    const WANT: &str = "0x2222222222222222222222222222222222222222";
    const TOKEN0: &str = "0x4200000000000000000000000000000000000006";
    const TOKEN1: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    const FARM: &str = "0x3333333333333333333333333333333333333333";
    const REWARD: &str = "0x4444444444444444444444444444444444444444";
    const STRATEGY: &str = "0x5555555555555555555555555555555555555555";

    fn config() -> VaultConfig {
        VaultConfig {
            id: "weth-usdc".to_string(),
            chain_id: 8453,
            vault_address: VAULT.to_string(),
            want_address: WANT.to_string(),
            ..VaultConfig::default()
        }
    }

    #[test]
    fn test_pair_with_reward_pool() {
        let config = VaultConfig {
            token0: Some(TOKEN0.to_string()),
            token1: Some(TOKEN1.to_string()),
            farm_address: Some(FARM.to_string()),
            reward_token: Some(REWARD.to_string()),
            farm_pool_id: Some(3),
            ..config()
        };

        let descriptor = resolve(&config).unwrap();
        assert_eq!(
            descriptor.lp,
            LpAdapter::ConstantProductPair {
                pair: address!("2222222222222222222222222222222222222222"),
                token0: address!("4200000000000000000000000000000000000006"),
                token1: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            }
        );
        assert_eq!(
            descriptor.farm,
            FarmAdapter::RewardPool {
                farm: address!("3333333333333333333333333333333333333333"),
                reward_token: address!("4444444444444444444444444444444444444444"),
                pool_id: Some(3),
            }
        );
    }

    #[test]
    fn test_strategy_is_optional() {
        assert_eq!(resolve(&config()).unwrap().strategy, None);

        let config = VaultConfig {
            strategy_address: STRATEGY.to_string(),
            ..config()
        };
        assert_eq!(
            resolve(&config).unwrap().strategy,
            Some(address!("5555555555555555555555555555555555555555"))
        );
    }

    #[test]
    fn test_no_tokens_prices_the_want_token() {
        let descriptor = resolve(&config()).unwrap();
        assert_eq!(
            descriptor.lp,
            LpAdapter::SingleToken {
                token: address!("2222222222222222222222222222222222222222")
            }
        );
        assert_eq!(descriptor.farm, FarmAdapter::NoFarm);
    }

    #[test]
    fn test_blank_strings_count_as_unset() {
        let config = VaultConfig {
            token0: Some(TOKEN0.to_string()),
            token1: Some("  ".to_string()),
            farm_address: Some(String::new()),
            ..config()
        };
        let descriptor = resolve(&config).unwrap();
        assert_eq!(
            descriptor.lp,
            LpAdapter::SingleToken {
                token: address!("4200000000000000000000000000000000000006")
            }
        );
        assert_eq!(descriptor.farm, FarmAdapter::NoFarm);
    }

    #[test]
    fn test_unsupported_shapes() {
        let token1_only = VaultConfig {
            token1: Some(TOKEN1.to_string()),
            ..config()
        };
        assert!(matches!(
            resolve(&token1_only),
            Err(AdapterError::UnsupportedVaultShape(_))
        ));

        let farm_without_reward = VaultConfig {
            farm_address: Some(FARM.to_string()),
            ..config()
        };
        assert!(matches!(
            resolve(&farm_without_reward),
            Err(AdapterError::UnsupportedVaultShape(_))
        ));
    }

    #[test]
    fn test_invalid_configs() {
        let missing_want = VaultConfig {
            want_address: String::new(),
            ..config()
        };
        assert!(resolve(&missing_want).unwrap_err().is_invalid_config());

        let missing_id = VaultConfig {
            id: String::new(),
            ..config()
        };
        assert!(resolve(&missing_id).unwrap_err().is_invalid_config());

        let bad_address = VaultConfig {
            vault_address: "0xnothex".to_string(),
            ..config()
        };
        assert!(resolve(&bad_address).unwrap_err().is_invalid_config());
    }
}

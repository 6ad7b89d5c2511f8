use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;

use crate::{chain::ChainReader, error::AdapterError, units::normalize};

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;
/// Base produces a block every two seconds.
pub const BLOCK_TIME_SECS: u64 = 2;
/// Pools scanned when the vault does not pin a pool id.
pub const MAX_POOL_SCAN: u32 = 50;

/// How the vault's reward emissions are valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmAdapter {
    /// MasterChef style farm emitting `reward_token` to stakers of the want token.
    RewardPool {
        farm: Address,
        reward_token: Address,
        pool_id: Option<u32>,
    },
    NoFarm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FarmYield {
    /// Reward tokens emitted to the pool per year.
    pub yearly_rewards: Decimal,
    pub yearly_rewards_usd: Decimal,
    /// USD value of the want tokens staked in the farm.
    pub pool_tvl: Decimal,
    /// Yearly rewards over pool TVL, before fees.
    pub gross_apr: Decimal,
}

impl FarmAdapter {
    pub const fn reward_token(&self) -> Option<Address> {
        match self {
            Self::RewardPool { reward_token, .. } => Some(*reward_token),
            Self::NoFarm => None,
        }
    }

    pub async fn farm_apr(
        &self,
        reader: &dyn ChainReader,
        want: Address,
        reward_price: Decimal,
        lp_price: Decimal,
    ) -> Result<FarmYield, AdapterError> {
        let Self::RewardPool {
            farm,
            reward_token,
            pool_id,
        } = *self
        else {
            return Ok(FarmYield::default());
        };

        let reward_decimals = reader.decimals(reward_token).await?;
        let per_second = emission_per_second(reader, farm, reward_decimals).await?;
        let share = pool_share(reader, farm, want, pool_id).await?;

        let yearly_rewards = per_second
            .checked_mul(Decimal::from(SECONDS_PER_YEAR))
            .and_then(|value| value.checked_mul(share))
            .ok_or(AdapterError::Overflow("yearly rewards"))?;

        let staked = normalize(
            reader.balance_of(want, farm).await?,
            reader.decimals(want).await?,
        )
        .ok_or(AdapterError::Overflow("staked balance"))?;

        let yearly_rewards_usd = yearly_rewards
            .checked_mul(reward_price)
            .ok_or(AdapterError::Overflow("yearly rewards in USD"))?;
        let pool_tvl = staked
            .checked_mul(lp_price)
            .ok_or(AdapterError::Overflow("pool TVL"))?;
        let gross_apr = if pool_tvl.is_zero() {
            Decimal::ZERO
        } else {
            yearly_rewards_usd
                .checked_div(pool_tvl)
                .ok_or(AdapterError::Overflow("gross APR"))?
        };

        Ok(FarmYield {
            yearly_rewards,
            yearly_rewards_usd,
            pool_tvl,
            gross_apr,
        })
    }
}

/// Reward tokens per second, falling back to per-block farms.
async fn emission_per_second(
    reader: &dyn ChainReader,
    farm: Address,
    reward_decimals: u8,
) -> Result<Decimal, AdapterError> {
    let (raw, divisor) = match reader.reward_per_second(farm).await {
        Ok(raw) => (raw, 1),
        Err(e) => {
            tracing::debug!(farm = %farm, error = %e, "No rewardPerSecond, trying rewardPerBlock");
            (reader.reward_per_block(farm).await?, BLOCK_TIME_SECS)
        }
    };

    normalize(raw, reward_decimals)
        .and_then(|rate| rate.checked_div(Decimal::from(divisor)))
        .ok_or(AdapterError::Overflow("emission rate"))
}

/// `allocPoint / totalAllocPoint` of the pool staking `want`.
async fn pool_share(
    reader: &dyn ChainReader,
    farm: Address,
    want: Address,
    pool_id: Option<u32>,
) -> Result<Decimal, AdapterError> {
    let alloc_point = pool_alloc_point(reader, farm, want, pool_id).await?;
    let total = reader.total_alloc_point(farm).await?;
    if total.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let alloc_point = normalize(alloc_point, 0).ok_or(AdapterError::Overflow("alloc point"))?;
    let total = normalize(total, 0).ok_or(AdapterError::Overflow("total alloc point"))?;
    alloc_point
        .checked_div(total)
        .ok_or(AdapterError::Overflow("pool share"))
}

async fn pool_alloc_point(
    reader: &dyn ChainReader,
    farm: Address,
    want: Address,
    pool_id: Option<u32>,
) -> Result<U256, AdapterError> {
    if let Some(pid) = pool_id {
        let info = reader.pool_info(farm, pid).await?;
        if info.lp_token != want {
            return Err(AdapterError::PoolNotFound(format!(
                "{want} (pool {pid} stakes {})",
                info.lp_token
            )));
        }
        return Ok(info.alloc_point);
    }

    let length = reader.pool_length(farm).await?;
    let scanned = u32::try_from(length).unwrap_or(u32::MAX).min(MAX_POOL_SCAN);
    for pid in 0..scanned {
        match reader.pool_info(farm, pid).await {
            Ok(info) if info.lp_token == want => return Ok(info.alloc_point),
            Ok(_) => {}
            Err(e) => tracing::debug!(farm = %farm, pid, error = %e, "Skipping unreadable pool"),
        }
    }

    Err(AdapterError::PoolNotFound(want.to_string()))
}

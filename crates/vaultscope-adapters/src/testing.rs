//! In-memory [`ChainReader`] for tests.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::{
    chain::{ChainReader, PoolInfo},
    error::ChainError,
};

/// Every read not explicitly configured fails like a reverted `eth_call`.
#[derive(Debug, Clone, Default)]
pub struct FakeChain {
    decimals: HashMap<Address, u8>,
    supplies: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    reserves: HashMap<Address, (U256, U256)>,
    pair_tokens: HashMap<Address, (Address, Address)>,
    total_assets: HashMap<Address, U256>,
    price_per_share: HashMap<Address, U256>,
    last_harvest: HashMap<Address, U256>,
    reward_per_second: HashMap<Address, U256>,
    reward_per_block: HashMap<Address, U256>,
    total_alloc_point: HashMap<Address, U256>,
    pools: HashMap<Address, Vec<PoolInfo>>,
}

impl FakeChain {
    #[must_use]
    pub fn with_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    #[must_use]
    pub fn with_supply(mut self, token: Address, supply: U256) -> Self {
        self.supplies.insert(token, supply);
        self
    }

    #[must_use]
    pub fn with_balance(mut self, token: Address, owner: Address, balance: U256) -> Self {
        self.balances.insert((token, owner), balance);
        self
    }

    #[must_use]
    pub fn with_pair(
        mut self,
        pair: Address,
        tokens: (Address, Address),
        reserves: (U256, U256),
    ) -> Self {
        self.pair_tokens.insert(pair, tokens);
        self.reserves.insert(pair, reserves);
        self
    }

    #[must_use]
    pub fn with_vault(mut self, vault: Address, total_assets: U256, price_per_share: U256) -> Self {
        self.total_assets.insert(vault, total_assets);
        self.price_per_share.insert(vault, price_per_share);
        self
    }

    #[must_use]
    pub fn with_last_harvest(mut self, strategy: Address, timestamp: u64) -> Self {
        self.last_harvest.insert(strategy, U256::from(timestamp));
        self
    }

    #[must_use]
    pub fn with_reward_per_second(mut self, farm: Address, rate: U256) -> Self {
        self.reward_per_second.insert(farm, rate);
        self
    }

    #[must_use]
    pub fn with_reward_per_block(mut self, farm: Address, rate: U256) -> Self {
        self.reward_per_block.insert(farm, rate);
        self
    }

    #[must_use]
    pub fn with_total_alloc_point(mut self, farm: Address, total: U256) -> Self {
        self.total_alloc_point.insert(farm, total);
        self
    }

    #[must_use]
    pub fn with_pools(mut self, farm: Address, pools: Vec<PoolInfo>) -> Self {
        self.pools.insert(farm, pools);
        self
    }
}

fn reverted(call: &'static str) -> ChainError {
    ChainError::Rpc {
        call,
        message: "execution reverted".to_string(),
    }
}

fn lookup<K, V>(map: &HashMap<K, V>, key: &K, call: &'static str) -> Result<V, ChainError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    map.get(key).cloned().ok_or_else(|| reverted(call))
}

#[async_trait::async_trait]
impl ChainReader for FakeChain {
    async fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        lookup(&self.decimals, &token, "decimals()")
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        lookup(&self.supplies, &token, "totalSupply()")
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        lookup(&self.balances, &(token, owner), "balanceOf(address)")
    }

    async fn reserves(&self, pair: Address) -> Result<(U256, U256), ChainError> {
        lookup(&self.reserves, &pair, "getReserves()")
    }

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError> {
        lookup(&self.pair_tokens, &pair, "token0()")
    }

    async fn total_assets(&self, vault: Address) -> Result<U256, ChainError> {
        lookup(&self.total_assets, &vault, "totalAssets()")
    }

    async fn price_per_full_share(&self, vault: Address) -> Result<U256, ChainError> {
        lookup(&self.price_per_share, &vault, "getPricePerFullShare()")
    }

    async fn last_harvest(&self, strategy: Address) -> Result<U256, ChainError> {
        lookup(&self.last_harvest, &strategy, "lastHarvest()")
    }

    async fn reward_per_second(&self, farm: Address) -> Result<U256, ChainError> {
        lookup(&self.reward_per_second, &farm, "rewardPerSecond()")
    }

    async fn reward_per_block(&self, farm: Address) -> Result<U256, ChainError> {
        lookup(&self.reward_per_block, &farm, "rewardPerBlock()")
    }

    async fn total_alloc_point(&self, farm: Address) -> Result<U256, ChainError> {
        lookup(&self.total_alloc_point, &farm, "totalAllocPoint()")
    }

    async fn pool_length(&self, farm: Address) -> Result<U256, ChainError> {
        self.pools
            .get(&farm)
            .map(|pools| U256::from(pools.len()))
            .ok_or_else(|| reverted("poolLength()"))
    }

    async fn pool_info(&self, farm: Address, pid: u32) -> Result<PoolInfo, ChainError> {
        self.pools
            .get(&farm)
            .and_then(|pools| pools.get(pid as usize))
            .copied()
            .ok_or_else(|| reverted("poolInfo(uint256)"))
    }
}

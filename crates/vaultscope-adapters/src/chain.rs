use std::{collections::HashMap, sync::Arc, time::Duration};

use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{SolCall, sol};
use moka::future::Cache;
use url::Url;
use vaultscope_types::ChainId;

use crate::error::ChainError;

sol! {
    interface IERC20 {
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
    }

    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }

    interface IVault {
        function totalAssets() external view returns (uint256);
        function getPricePerFullShare() external view returns (uint256);
    }

    interface IStrategy {
        function lastHarvest() external view returns (uint256);
    }

    interface IMasterChef {
        function rewardPerSecond() external view returns (uint256);
        function rewardPerBlock() external view returns (uint256);
        function totalAllocPoint() external view returns (uint256);
        function poolLength() external view returns (uint256);
        function poolInfo(uint256 pid) external view returns (address lpToken, uint256 allocPoint, uint256 lastRewardBlock, uint256 accRewardPerShare);
    }
}

/// A MasterChef pool entry, reduced to what valuation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolInfo {
    pub lp_token: Address,
    pub alloc_point: U256,
}

/// Read-only view of the EVM state the adapters depend on.
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    async fn decimals(&self, token: Address) -> Result<u8, ChainError>;

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    /// Raw `(reserve0, reserve1)` of a constant-product pair.
    async fn reserves(&self, pair: Address) -> Result<(U256, U256), ChainError>;

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError>;

    async fn total_assets(&self, vault: Address) -> Result<U256, ChainError>;

    async fn price_per_full_share(&self, vault: Address) -> Result<U256, ChainError>;

    /// Unix time of the strategy's last harvest, zero if it never harvested.
    async fn last_harvest(&self, strategy: Address) -> Result<U256, ChainError>;

    async fn reward_per_second(&self, farm: Address) -> Result<U256, ChainError>;

    async fn reward_per_block(&self, farm: Address) -> Result<U256, ChainError>;

    async fn total_alloc_point(&self, farm: Address) -> Result<U256, ChainError>;

    async fn pool_length(&self, farm: Address) -> Result<U256, ChainError>;

    async fn pool_info(&self, farm: Address, pid: u32) -> Result<PoolInfo, ChainError>;
}

/// [`ChainReader`] over JSON-RPC `eth_call`.
pub struct RpcChainReader {
    rpc_url: Url,
    decimals: Cache<Address, u8>,
}

impl RpcChainReader {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            // ERC20 decimals never change.
            decimals: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(24 * 3600))
                .build(),
        }
    }

    async fn call<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, ChainError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let tx = TransactionRequest::default()
            .to(to)
            .input(call.abi_encode().into());

        let output = provider.call(tx).await.map_err(|e| {
            tracing::debug!(call = C::SIGNATURE, contract = %to, error = %e, "eth_call failed");
            ChainError::Rpc {
                call: C::SIGNATURE,
                message: e.to_string(),
            }
        })?;

        C::abi_decode_returns(&output).map_err(|e| ChainError::Decode {
            call: C::SIGNATURE,
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ChainReader for RpcChainReader {
    async fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        if let Some(decimals) = self.decimals.get(&token).await {
            return Ok(decimals);
        }
        let decimals = self.call(token, IERC20::decimalsCall {}).await?;
        self.decimals.insert(token, decimals).await;
        Ok(decimals)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, ChainError> {
        self.call(token, IERC20::totalSupplyCall {}).await
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        self.call(token, IERC20::balanceOfCall { owner }).await
    }

    async fn reserves(&self, pair: Address) -> Result<(U256, U256), ChainError> {
        let reserves = self.call(pair, IUniswapV2Pair::getReservesCall {}).await?;
        Ok((
            U256::from(reserves.reserve0.to::<u128>()),
            U256::from(reserves.reserve1.to::<u128>()),
        ))
    }

    async fn pair_tokens(&self, pair: Address) -> Result<(Address, Address), ChainError> {
        let token0 = self.call(pair, IUniswapV2Pair::token0Call {}).await?;
        let token1 = self.call(pair, IUniswapV2Pair::token1Call {}).await?;
        Ok((token0, token1))
    }

    async fn total_assets(&self, vault: Address) -> Result<U256, ChainError> {
        self.call(vault, IVault::totalAssetsCall {}).await
    }

    async fn price_per_full_share(&self, vault: Address) -> Result<U256, ChainError> {
        self.call(vault, IVault::getPricePerFullShareCall {}).await
    }

    async fn last_harvest(&self, strategy: Address) -> Result<U256, ChainError> {
        self.call(strategy, IStrategy::lastHarvestCall {}).await
    }

    async fn reward_per_second(&self, farm: Address) -> Result<U256, ChainError> {
        self.call(farm, IMasterChef::rewardPerSecondCall {}).await
    }

    async fn reward_per_block(&self, farm: Address) -> Result<U256, ChainError> {
        self.call(farm, IMasterChef::rewardPerBlockCall {}).await
    }

    async fn total_alloc_point(&self, farm: Address) -> Result<U256, ChainError> {
        self.call(farm, IMasterChef::totalAllocPointCall {}).await
    }

    async fn pool_length(&self, farm: Address) -> Result<U256, ChainError> {
        self.call(farm, IMasterChef::poolLengthCall {}).await
    }

    async fn pool_info(&self, farm: Address, pid: u32) -> Result<PoolInfo, ChainError> {
        let info = self
            .call(farm, IMasterChef::poolInfoCall { pid: U256::from(pid) })
            .await?;
        Ok(PoolInfo {
            lp_token: info.lpToken,
            alloc_point: info.allocPoint,
        })
    }
}

/// One reader per configured chain.
#[derive(Clone, Default)]
pub struct ChainReaders(HashMap<ChainId, Arc<dyn ChainReader>>);

impl ChainReaders {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, chain_id: ChainId, reader: Arc<dyn ChainReader>) -> Self {
        self.0.insert(chain_id, reader);
        self
    }

    pub fn get(&self, chain_id: ChainId) -> Result<Arc<dyn ChainReader>, ChainError> {
        self.0
            .get(&chain_id)
            .cloned()
            .ok_or(ChainError::UnsupportedChain(chain_id))
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.0.keys().copied()
    }
}

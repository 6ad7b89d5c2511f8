use std::collections::HashMap;

use alloy_primitives::Address;
use rust_decimal::{Decimal, MathematicalOps};

use crate::{chain::ChainReader, error::AdapterError, units::normalize};

/// How the vault's want token is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpAdapter {
    /// Uniswap V2 style pair; the want token is the pair itself.
    ConstantProductPair {
        pair: Address,
        token0: Address,
        token1: Address,
    },
    /// The want token is priced directly.
    SingleToken { token: Address },
}

impl LpAdapter {
    /// Tokens whose USD price is needed to value one unit of the want token.
    pub fn priced_tokens(&self) -> Vec<Address> {
        match *self {
            Self::ConstantProductPair { token0, token1, .. } => vec![token0, token1],
            Self::SingleToken { token } => vec![token],
        }
    }

    /// USD value of one unit of the want token.
    pub async fn lp_unit_price(
        &self,
        reader: &dyn ChainReader,
        prices: &HashMap<Address, Decimal>,
    ) -> Result<Decimal, AdapterError> {
        match *self {
            Self::SingleToken { token } => price_of(prices, token),
            Self::ConstantProductPair {
                pair,
                token0,
                token1,
            } => {
                let (raw0, raw1) = reader.reserves(pair).await?;
                let (pair_token0, _) = reader.pair_tokens(pair).await?;
                // Configs may list the pair's tokens in either order.
                let (raw0, raw1) = if pair_token0 == token0 {
                    (raw0, raw1)
                } else if pair_token0 == token1 {
                    (raw1, raw0)
                } else {
                    return Err(AdapterError::UnsupportedVaultShape(format!(
                        "pair {pair} does not hold {token0}"
                    )));
                };

                let reserve0 = normalize(raw0, reader.decimals(token0).await?)
                    .ok_or(AdapterError::Overflow("reserve0"))?;
                let reserve1 = normalize(raw1, reader.decimals(token1).await?)
                    .ok_or(AdapterError::Overflow("reserve1"))?;
                let total_supply = normalize(
                    reader.total_supply(pair).await?,
                    reader.decimals(pair).await?,
                )
                .ok_or(AdapterError::Overflow("total supply"))?;

                constant_product_price(
                    reserve0,
                    reserve1,
                    price_of(prices, token0)?,
                    price_of(prices, token1)?,
                    total_supply,
                )
            }
        }
    }
}

/// Fair value of one pair share: `2 * sqrt(r0 * p0) * sqrt(r1 * p1) / supply`.
///
/// Equal to `2 * sqrt(r0 * r1 * p0 * p1) / supply`, split so the product
/// under the root stays small. An empty pair is worth zero.
pub fn constant_product_price(
    reserve0: Decimal,
    reserve1: Decimal,
    price0: Decimal,
    price1: Decimal,
    total_supply: Decimal,
) -> Result<Decimal, AdapterError> {
    if total_supply.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let side0 = reserve0
        .checked_mul(price0)
        .and_then(|value| value.sqrt())
        .ok_or(AdapterError::Overflow("token0 side value"))?;
    let side1 = reserve1
        .checked_mul(price1)
        .and_then(|value| value.sqrt())
        .ok_or(AdapterError::Overflow("token1 side value"))?;

    Decimal::TWO
        .checked_mul(side0)
        .and_then(|value| value.checked_mul(side1))
        .and_then(|value| value.checked_div(total_supply))
        .ok_or(AdapterError::Overflow("LP unit price"))
}

fn price_of(prices: &HashMap<Address, Decimal>, token: Address) -> Result<Decimal, AdapterError> {
    prices
        .get(&token)
        .copied()
        .ok_or_else(|| AdapterError::MissingPrice(token.to_string()))
}

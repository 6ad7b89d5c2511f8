use alloy_primitives::U256;
use rust_decimal::{Decimal, prelude::FromPrimitive};

const MAX_SCALE: u8 = 28;

/// Largest power of ten a `U256` holds.
const MAX_DECIMALS: u8 = 77;

/// Converts a raw token amount into whole units.
///
/// Fractional digits beyond what `Decimal` can hold are truncated. Returns
/// `None` when the whole part does not fit, or when `decimals` is too large
/// to scale by.
pub fn normalize(raw: U256, decimals: u8) -> Option<Decimal> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let scale = U256::from(10u8).pow(U256::from(decimals));
    let whole = Decimal::from_u128(u128::try_from(raw / scale).ok()?)?;

    let mut fraction = raw % scale;
    let mut fraction_scale = decimals;
    if decimals > MAX_SCALE {
        fraction /= U256::from(10u8).pow(U256::from(decimals - MAX_SCALE));
        fraction_scale = MAX_SCALE;
    }
    let fraction = i128::try_from(u128::try_from(fraction).ok()?).ok()?;
    let fraction = Decimal::try_from_i128_with_scale(fraction, u32::from(fraction_scale)).ok()?;

    whole.checked_add(fraction)
}

use rust_decimal::{Decimal, MathematicalOps};

/// Removes the performance fee from a gross APR.
pub fn net_apr(gross_apr: Decimal, performance_fee: Decimal) -> Decimal {
    gross_apr * (Decimal::ONE - performance_fee)
}

/// `(1 + apr / n)^n - 1`, bounded above by `max_apy` but never below `apr`.
///
/// Non-positive rates compound to zero.
pub fn compound(apr: Decimal, compoundings_per_year: u32, max_apy: Decimal) -> Decimal {
    if apr <= Decimal::ZERO || compoundings_per_year == 0 {
        return Decimal::ZERO;
    }

    let periods = Decimal::from(compoundings_per_year);
    let compounded = (Decimal::ONE + apr / periods)
        .checked_powu(u64::from(compoundings_per_year))
        .map_or(max_apy, |growth| growth - Decimal::ONE);

    compounded.min(max_apy).max(apr)
}

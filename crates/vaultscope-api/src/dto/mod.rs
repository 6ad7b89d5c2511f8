pub mod price;
pub mod query;
pub mod response;
pub mod vault;

pub use price::*;
pub use query::*;
pub use response::*;
pub use vault::*;

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Decimal without trailing zeros, as served in JSON bodies.
pub fn decimal_string(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Fraction to percent, rounded to 4 decimals.
pub fn percent(fraction: Decimal) -> f64 {
    to_f64(to_percent(fraction))
}

pub fn percent_string(fraction: Decimal) -> String {
    decimal_string(to_percent(fraction))
}

fn to_percent(fraction: Decimal) -> Decimal {
    fraction
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
        .round_dp(4)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use vaultscope_apy::{ApyBreakdown, ApyConfig};
    use vaultscope_types::DataQuality;

    use super::*;

    #[test]
    fn test_percent_rounding() {
        assert!((percent(dec!(0.123456789)) - 12.3457).abs() < 1e-9);
        assert_eq!(percent_string(dec!(0.05)), "5");
        assert_eq!(decimal_string(dec!(30000.000000)), "30000");
    }

    #[test]
    fn test_error_breakdown_renders_null_rates() {
        let config = ApyConfig::default();
        let dto = ApyDto::from(ApyBreakdown::error(&config));
        assert_eq!(dto.vault_apr, None);
        assert_eq!(dto.total_apy, None);
        assert_eq!(dto.compoundings_per_year, 1460);
        assert_eq!(dto.data_quality, DataQuality::Error);

        let ok = ApyDto::from(ApyBreakdown::new(dec!(0.1), dec!(0.105), &config, DataQuality::Stale));
        assert_eq!(ok.vault_apr, Some(10.0));
        assert_eq!(ok.total_apy, Some(10.5));
        assert_eq!(ok.trading_apr, Some(0.0));
    }
}

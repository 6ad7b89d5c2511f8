use rust_decimal::{Decimal, dec};

#[derive(Debug, Clone)]
pub struct ApyConfig {
    /// Harvests per year; the default is four per day.
    pub compoundings_per_year: u32,
    /// Share of farm rewards kept by the protocol, as a fraction.
    pub performance_fee: Decimal,
    /// Upper bound for a compounded APY, as a fraction (100 is 10 000 %).
    pub max_apy: Decimal,
}

impl Default for ApyConfig {
    fn default() -> Self {
        Self {
            compoundings_per_year: 1460,
            performance_fee: dec!(0.045),
            max_apy: dec!(100),
        }
    }
}

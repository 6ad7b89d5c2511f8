use rust_decimal::Decimal;
use vaultscope_types::TokenKey;

use crate::error::QuoteError;

/// Something that can produce a USD unit price for a token key.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, key: &TokenKey) -> Result<Decimal, QuoteError>;
}

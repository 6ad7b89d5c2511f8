use thiserror::Error;
use vaultscope_types::ChainId;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("upstream price API rate limit exceeded")]
    RateLimited,

    #[error("upstream price API did not answer in time")]
    Timeout,

    #[error("upstream price API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream price API answered with status {0}")]
    Status(u16),

    #[error("no usable price in upstream response for {0}")]
    MissingPrice(String),

    #[error("chain {0} has no upstream price platform")]
    UnsupportedChain(ChainId),

    #[error("LP prices are derived from on-chain reserves, not fetched")]
    LpNotQuotable,

    #[error("could not build HTTP client: {0}")]
    Client(String),
}

impl QuoteError {
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

use clap::Parser;
use rust_decimal::Decimal;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct VaultscopeCli {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// OTEL collector endpoint
    #[arg(long, env = "OTEL_COLLECTOR_ENDPOINT")]
    pub otel_collector_endpoint: Option<String>,

    /// API port
    #[arg(long, env = "API_PORT", default_value = "8080")]
    pub api_port: u16,

    /// JSON-RPC endpoint for Base mainnet
    #[arg(long, env = "BASE_RPC_URL")]
    pub base_rpc_url: Option<Url>,

    /// JSON-RPC endpoint for Base Sepolia
    #[arg(long, env = "BASE_SEPOLIA_RPC_URL")]
    pub base_sepolia_rpc_url: Option<Url>,

    /// CoinGecko API root
    #[arg(long, env = "COINGECKO_API_URL", default_value = "https://api.coingecko.com/api/v3")]
    pub coingecko_api_url: String,

    /// CoinGecko demo or pro API key
    #[arg(long, env = "COINGECKO_API_KEY")]
    pub coingecko_api_key: Option<String>,

    /// Seconds a fetched price is served from cache
    #[arg(long, env = "PRICE_CACHE_TTL_SECS", default_value = "300")]
    pub price_cache_ttl_secs: u64,

    /// Timeout of a single upstream price request, in seconds
    #[arg(long, env = "PRICE_FETCH_TIMEOUT_SECS", default_value = "10")]
    pub price_fetch_timeout_secs: u64,

    /// Upstream price requests allowed in a burst
    #[arg(long, env = "PRICE_RATE_LIMIT_BURST", default_value = "10")]
    pub price_rate_limit_burst: u32,

    /// Sustained upstream price requests per second
    #[arg(long, env = "PRICE_RATE_LIMIT_PER_SECOND", default_value = "1")]
    pub price_rate_limit_per_second: u32,

    /// Longest wait for an upstream rate-limit permit, in seconds
    #[arg(long, env = "PRICE_RATE_LIMIT_MAX_WAIT_SECS", default_value = "5")]
    pub price_rate_limit_max_wait_secs: u64,

    /// Harvests per year used to compound APR into APY
    #[arg(long, env = "COMPOUNDINGS_PER_YEAR", default_value = "1460")]
    pub compoundings_per_year: u32,

    /// Performance fee taken from farm rewards, as a fraction
    #[arg(long, env = "PERFORMANCE_FEE", default_value = "0.045")]
    pub performance_fee: Decimal,
}

mod cli;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use pragma_common::{services::{Service, ServiceGroup}, telemetry::init_telemetry};
use url::Url;

use crate::cli::VaultscopeCli;
use vaultscope_adapters::{ChainReaders, RpcChainReader};
use vaultscope_api::{ApiService, AppState};
use vaultscope_apy::{ApyConfig, Calculator, PgVaultStore};
use vaultscope_db::{init_pool, run_migrations};
use vaultscope_metrics::MetricsRegistry;
use vaultscope_quoting::{CoinGeckoFetcher, PriceCache, PricingConfig};
use vaultscope_types::Chain;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = VaultscopeCli::parse();

    let app_name = "vaultscope_api";
    if let Err(e) = init_telemetry(app_name, cli.otel_collector_endpoint.clone()) {
        anyhow::bail!("Could not init telemetry: {e}");
    }

    let pool = init_pool(app_name, &cli.database_url)?;
    run_migrations(&pool).await?;

    let metrics = MetricsRegistry::new();

    let pricing_config = PricingConfig {
        cache_ttl: Duration::from_secs(cli.price_cache_ttl_secs),
        fetch_timeout: Duration::from_secs(cli.price_fetch_timeout_secs),
        rate_limit_burst: cli.price_rate_limit_burst,
        rate_limit_per_second: cli.price_rate_limit_per_second,
        max_rate_limit_wait: Duration::from_secs(cli.price_rate_limit_max_wait_secs),
        coingecko_base_url: cli.coingecko_api_url.clone(),
        coingecko_api_key: cli.coingecko_api_key.clone(),
        ..PricingConfig::default()
    };
    let fetcher =
        CoinGeckoFetcher::new(pricing_config.clone())?.with_metrics(Arc::clone(&metrics.pricing));
    let cache = Arc::new(
        PriceCache::new(Arc::new(fetcher), pricing_config)
            .with_metrics(Arc::clone(&metrics.pricing)),
    );

    let readers = ChainReaders::new()
        .with(
            Chain::Base.id(),
            Arc::new(RpcChainReader::new(rpc_url(cli.base_rpc_url.clone(), Chain::Base)?)),
        )
        .with(
            Chain::BaseSepolia.id(),
            Arc::new(RpcChainReader::new(rpc_url(
                cli.base_sepolia_rpc_url.clone(),
                Chain::BaseSepolia,
            )?)),
        );

    let apy_config = ApyConfig {
        compoundings_per_year: cli.compoundings_per_year,
        performance_fee: cli.performance_fee,
        ..ApyConfig::default()
    };

    let calculator = Calculator::new(
        cache,
        Arc::new(PgVaultStore::new(pool)),
        readers,
        apy_config,
    )
    .with_metrics(Arc::clone(&metrics.vaults));

    let app_state = AppState {
        calculator: Arc::new(calculator),
    };
    let api_service = ApiService::new(app_state, "0.0.0.0", cli.api_port);

    ServiceGroup::default()
        .with_critical(api_service)
        .start_and_drive_to_end()
        .await?;

    Ok(())
}

fn rpc_url(configured: Option<Url>, chain: Chain) -> Result<Url> {
    match configured {
        Some(url) => Ok(url),
        None => {
            tracing::info!(chain_id = chain.id(), "No RPC url configured, using public endpoint");
            Ok(Url::parse(chain.default_rpc_url())?)
        }
    }
}

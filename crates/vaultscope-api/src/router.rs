use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};

use utoipa::OpenApi as OpenApiT;
use utoipa_swagger_ui::SwaggerUi;

use crate::{AppState, handlers};

pub fn api_router<T: OpenApiT>(_state: AppState) -> Router<AppState> {
    let open_api = T::openapi();

    let vaults_router = Router::new()
        .route("/{vault_id}/metrics", get(handlers::get_vault_metrics))
        .route(
            "/{vault_id}/metrics/refresh",
            post(handlers::refresh_vault_metrics),
        )
        .route(
            "/{vault_id}/harvests",
            get(handlers::list_vault_harvests).post(handlers::record_vault_harvest),
        );

    let v1 = Router::new()
        .route("/prices", get(handlers::list_prices))
        .route("/lps", get(handlers::list_lps))
        .route("/tvl", get(handlers::list_tvl))
        .route("/apy", get(handlers::list_apy))
        .route("/apy/{vault_id}", get(handlers::get_vault_apy))
        .route("/cache", delete(handlers::clear_cache))
        .route("/cache/stats", get(handlers::get_cache_stats))
        .nest("/vaults", vaults_router);

    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1)
        .merge(SwaggerUi::new("/v1/docs").url("/v1/docs/openapi.json", open_api))
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use alloy_primitives::{Address, U256, address};
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use rust_decimal::{Decimal, dec};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use vaultscope_adapters::{ChainReaders, testing::FakeChain};
    use vaultscope_apy::{ApyConfig, Calculator, InMemoryVaultStore};
    use vaultscope_quoting::{PriceCache, PriceSource, PricingConfig, QuoteError};
    use vaultscope_types::{BASE_MAINNET_CHAIN_ID, TokenKey, VaultConfig};

    use super::*;
    use crate::docs::ApiDoc;

    const VAULT: Address = address!("1111111111111111111111111111111111111111");
    const WETH: Address = address!("4200000000000000000000000000000000000006");

    struct StaticPrices(HashMap<String, Decimal>);

    #[async_trait::async_trait]
    impl PriceSource for StaticPrices {
        async fn fetch(&self, key: &TokenKey) -> Result<Decimal, QuoteError> {
            self.0
                .get(&key.address)
                .copied()
                .ok_or(QuoteError::Timeout)
        }
    }

    fn state() -> AppState {
        let source = StaticPrices(HashMap::from([(
            WETH.to_string().to_lowercase(),
            dec!(3000),
        )]));
        let cache = Arc::new(PriceCache::new(Arc::new(source), PricingConfig::default()));
        let chain = FakeChain::default()
            .with_decimals(WETH, 18)
            .with_decimals(VAULT, 18)
            .with_supply(VAULT, U256::from(10u128 * 10u128.pow(18)))
            .with_vault(
                VAULT,
                U256::from(10u128 * 10u128.pow(18)),
                U256::from(10u128.pow(18)),
            );
        let readers = ChainReaders::new().with(BASE_MAINNET_CHAIN_ID, Arc::new(chain));
        let store = InMemoryVaultStore::new().with_vault(VaultConfig {
            id: "weth".to_string(),
            name: "WETH vault".to_string(),
            chain_id: BASE_MAINNET_CHAIN_ID,
            vault_address: VAULT.to_string(),
            want_address: WETH.to_string(),
            ..VaultConfig::default()
        });

        AppState {
            calculator: Arc::new(Calculator::new(
                cache,
                Arc::new(store),
                readers,
                ApyConfig::default(),
            )),
        }
    }

    async fn call(state: &AppState, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(state, request).await
    }

    async fn post_json(state: &AppState, uri: &str, payload: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        send(state, request).await
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let app = api_router::<ApiDoc>(state.clone()).with_state(state.clone());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _) = call(&state(), Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = call(&state(), Method::GET, "/v1/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_vault_apy_is_404() {
        let (status, body) = call(&state(), Method::GET, "/v1/apy/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_vault_apy_without_farm() {
        let (status, body) = call(&state(), Method::GET, "/v1/apy/weth").await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["vault_id"], "weth");
        assert_eq!(data["vault_apy"], 0.0);
        assert_eq!(data["trading_apr"], 0.0);
        assert_eq!(data["compoundings_per_year"], 1460);
        assert_eq!(data["data_quality"], "ok");
    }

    #[tokio::test]
    async fn test_tvl_listing() {
        let (status, body) = call(&state(), Method::GET, "/v1/tvl").await;
        assert_eq!(status, StatusCode::OK);
        let weth = &body["data"]["vaults"]["weth"];
        assert_eq!(weth["tvl"], "30000");
        assert_eq!(weth["chain_id"], 8453);
        assert_eq!(weth["data_quality"], "ok");
    }

    #[tokio::test]
    async fn test_apy_listing() {
        let (status, body) = call(&state(), Method::GET, "/v1/apy").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["vaults"]["weth"]["total_apy"], 0.0);
    }

    #[tokio::test]
    async fn test_prices_default_to_base_mainnet() {
        let (status, body) = call(&state(), Method::GET, "/v1/prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["chain_id"], 8453);
        let key = format!("price:8453:{}", WETH.to_string().to_lowercase());
        assert_eq!(body["data"]["prices"][key.as_str()]["price"], "3000");
        assert_eq!(body["data"]["prices"][key.as_str()]["quality"], "ok");
    }

    #[tokio::test]
    async fn test_prices_reject_unknown_chain() {
        let (status, body) = call(&state(), Method::GET, "/v1/prices?chain_id=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_lps_by_vault() {
        let (status, body) = call(&state(), Method::GET, "/v1/lps?chain_id=8453").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["lps"]["weth"]["price"], "3000");
    }

    #[tokio::test]
    async fn test_metrics_refresh_then_read() {
        let state = state();

        let (status, body) = call(&state, Method::GET, "/v1/vaults/weth/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tvl"], "0");
        assert_eq!(body["data"]["price_per_share"], "1");

        let (status, body) = call(&state, Method::POST, "/v1/vaults/weth/metrics/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tvl"], "30000");
        assert_eq!(body["data"]["total_supply"], "10");

        let (_, body) = call(&state, Method::GET, "/v1/vaults/weth/metrics").await;
        assert_eq!(body["data"]["tvl"], "30000");
        assert_eq!(body["data"]["data_quality"], "ok");

        let (status, _) = call(&state, Method::POST, "/v1/vaults/missing/metrics/refresh").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let state = state();
        call(&state, Method::GET, "/v1/tvl").await;

        let (status, body) = call(&state, Method::GET, "/v1/cache/stats").await;
        assert_eq!(status, StatusCode::OK);
        // One token price and the derived LP price.
        assert_eq!(body["data"]["total_entries"], 2);
        assert_eq!(body["data"]["fresh"], 2);
        assert_eq!(body["data"]["ttl_secs"], 300);
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let state = state();
        call(&state, Method::GET, "/v1/tvl").await;

        let (status, body) = call(&state, Method::DELETE, "/v1/cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cleared"], 2);

        let (_, body) = call(&state, Method::GET, "/v1/cache/stats").await;
        assert_eq!(body["data"]["total_entries"], 0);
    }

    #[tokio::test]
    async fn test_harvest_record_then_list() {
        let state = state();
        let tx = format!("0x{}", "ab".repeat(32));

        let (status, body) = post_json(
            &state,
            "/v1/vaults/weth/harvests",
            &json!({ "tx_hash": tx, "profit": "1.50" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tx_hash"], tx.as_str());
        assert_eq!(body["data"]["profit"], "1.5");

        let (status, body) = call(&state, Method::GET, "/v1/vaults/weth/harvests?limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["vault_id"], "weth");
        assert_eq!(body["data"]["harvests"].as_array().unwrap().len(), 1);

        let (_, body) = call(&state, Method::GET, "/v1/vaults/weth/metrics").await;
        assert_eq!(body["data"]["last_harvest_tx"], tx.as_str());
        assert!(body["data"]["last_harvest_at"].is_string());
    }

    #[tokio::test]
    async fn test_harvest_rejections() {
        let state = state();

        let (status, body) = post_json(
            &state,
            "/v1/vaults/weth/harvests",
            &json!({ "tx_hash": "0x1234" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = call(&state, Method::GET, "/v1/vaults/missing/harvests").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

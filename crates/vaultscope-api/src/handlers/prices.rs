use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    AppState,
    dto::{ApiResponse, ChainQuery, LpsResponse, PriceDto, PricesResponse},
    errors::ApiError,
    handlers::{ensure_supported_chain, now_rfc3339},
};

#[utoipa::path(
    get,
    path = "/prices",
    tag = "Prices",
    params(
        ("chain_id" = Option<u64>, Query, description = "Chain id, defaults to Base mainnet", example = 8453)
    ),
    responses(
        (status = 200, description = "Token prices used by the vaults of the chain", body = PricesResponse),
        (status = 400, description = "Unsupported chain"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_prices(
    State(state): State<AppState>,
    Query(params): Query<ChainQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_supported_chain(&state, params.chain_id)?;

    let entries = state.calculator.list_prices(params.chain_id).await?;
    let prices = entries
        .iter()
        .map(|(key, entry)| (key.to_string(), PriceDto::from(entry)))
        .collect();

    Ok(Json(ApiResponse::ok(PricesResponse {
        chain_id: params.chain_id,
        prices,
        updated_at: now_rfc3339(),
    })))
}

#[utoipa::path(
    get,
    path = "/lps",
    tag = "Prices",
    params(
        ("chain_id" = Option<u64>, Query, description = "Chain id, defaults to Base mainnet", example = 8453)
    ),
    responses(
        (status = 200, description = "LP unit price of every vault on the chain", body = LpsResponse),
        (status = 400, description = "Unsupported chain"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_lps(
    State(state): State<AppState>,
    Query(params): Query<ChainQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_supported_chain(&state, params.chain_id)?;

    let quotes = state.calculator.list_lps(params.chain_id).await?;
    let lps = quotes
        .into_iter()
        .map(|(vault_id, quote)| (vault_id, PriceDto::from(quote)))
        .collect();

    Ok(Json(ApiResponse::ok(LpsResponse {
        chain_id: params.chain_id,
        lps,
        updated_at: now_rfc3339(),
    })))
}

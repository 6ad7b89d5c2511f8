use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    AppState,
    dto::{
        ApiResponse, ApyDto, ApyResponse, HarvestDto, HarvestQuery, HarvestsResponse,
        RecordHarvestRequest, TvlDto, TvlResponse, VaultApyResponse, VaultMetricsDto,
    },
    errors::ApiError,
    handlers::now_rfc3339,
};

#[utoipa::path(
    get,
    path = "/tvl",
    tag = "Vaults",
    responses(
        (status = 200, description = "TVL of every configured vault", body = TvlResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_tvl(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let results = state.calculator.list_tvl().await?;
    let vaults = results
        .into_iter()
        .map(|(vault_id, tvl)| (vault_id, TvlDto::from(tvl)))
        .collect();

    Ok(Json(ApiResponse::ok(TvlResponse {
        vaults,
        updated_at: now_rfc3339(),
    })))
}

#[utoipa::path(
    get,
    path = "/apy",
    tag = "Vaults",
    responses(
        (status = 200, description = "APY breakdown of every configured vault", body = ApyResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_apy(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let results = state.calculator.list_apy().await?;
    let vaults = results
        .into_iter()
        .map(|(vault_id, breakdown)| (vault_id, ApyDto::from(breakdown)))
        .collect();

    Ok(Json(ApiResponse::ok(ApyResponse {
        vaults,
        updated_at: now_rfc3339(),
    })))
}

#[utoipa::path(
    get,
    path = "/apy/{vault_id}",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault identifier")
    ),
    responses(
        (status = 200, description = "APY breakdown", body = VaultApyResponse),
        (status = 404, description = "Vault not found or invalid"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_vault_apy(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = state.calculator.compute_apy(&vault_id).await?;

    Ok(Json(ApiResponse::ok(VaultApyResponse {
        vault_id,
        apy: ApyDto::from(breakdown),
        updated_at: now_rfc3339(),
    })))
}

#[utoipa::path(
    get,
    path = "/vaults/{vault_id}/metrics",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault identifier")
    ),
    responses(
        (status = 200, description = "Last refreshed metrics snapshot", body = VaultMetricsDto),
        (status = 404, description = "Vault not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_vault_metrics(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.calculator.get_metrics(&vault_id).await?;
    Ok(Json(ApiResponse::ok(VaultMetricsDto::from(snapshot))))
}

#[utoipa::path(
    post,
    path = "/vaults/{vault_id}/metrics/refresh",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault identifier")
    ),
    responses(
        (status = 200, description = "Freshly computed and stored snapshot", body = VaultMetricsDto),
        (status = 404, description = "Vault not found or invalid"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn refresh_vault_metrics(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.calculator.refresh_metrics(&vault_id).await?;
    Ok(Json(ApiResponse::ok(VaultMetricsDto::from(snapshot))))
}

#[utoipa::path(
    get,
    path = "/vaults/{vault_id}/harvests",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault identifier"),
        ("limit" = Option<usize>, Query, description = "Maximum harvests returned (default 20, at most 100)")
    ),
    responses(
        (status = 200, description = "Latest harvests, newest first", body = HarvestsResponse),
        (status = 404, description = "Vault not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_vault_harvests(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
    Query(query): Query<HarvestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let harvests = state
        .calculator
        .list_harvests(&vault_id, query.limit)
        .await?
        .into_iter()
        .map(HarvestDto::from)
        .collect();

    Ok(Json(ApiResponse::ok(HarvestsResponse { vault_id, harvests })))
}

#[utoipa::path(
    post,
    path = "/vaults/{vault_id}/harvests",
    tag = "Vaults",
    params(
        ("vault_id" = String, Path, description = "Vault identifier")
    ),
    request_body = RecordHarvestRequest,
    responses(
        (status = 200, description = "Recorded harvest", body = HarvestDto),
        (status = 400, description = "Malformed transaction hash or negative profit"),
        (status = 404, description = "Vault not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_vault_harvest(
    State(state): State<AppState>,
    Path(vault_id): Path<String>,
    Json(payload): Json<RecordHarvestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let harvest = state
        .calculator
        .record_harvest(&vault_id, &payload.tx_hash, payload.profit)
        .await?;
    Ok(Json(ApiResponse::ok(HarvestDto::from(harvest))))
}

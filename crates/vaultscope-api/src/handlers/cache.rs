use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    AppState,
    dto::{ApiResponse, CacheClearedResponse, CacheStatsResponse},
    errors::ApiError,
};

#[utoipa::path(
    get,
    path = "/cache/stats",
    tag = "Prices",
    responses(
        (status = 200, description = "Price cache occupancy", body = CacheStatsResponse)
    )
)]
pub async fn get_cache_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cache = state.calculator.cache();
    let stats = CacheStatsResponse::new(cache.stats(), cache.config().cache_ttl.as_secs());
    Ok(Json(ApiResponse::ok(stats)))
}

#[utoipa::path(
    delete,
    path = "/cache",
    tag = "Prices",
    responses(
        (status = 200, description = "Every cached price dropped", body = CacheClearedResponse)
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cleared = state.calculator.cache().clear();
    tracing::info!(cleared, "Price cache cleared");
    Ok(Json(ApiResponse::ok(CacheClearedResponse { cleared })))
}

//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::StatsResponse};

use super::CurrentUser;

/// Admin dashboard counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters", body = StatsResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats(&principal).await?;
    Ok(Json(stats))
}

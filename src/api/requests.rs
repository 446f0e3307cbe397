//! Request endpoints: submit, approve, deny

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        item::Item,
        request::{CreateRequest, Request, RequestDetails},
    },
};

use super::{CurrentUser, StatusResponse};

/// Caller's held items and pending requests
#[derive(Serialize, ToSchema)]
pub struct MyCounts {
    pub held_items: i64,
    pub pending_requests: i64,
}

/// Submit a request for an item or a return of a held item
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request stored", body = Request),
        (status = 400, description = "Invalid request type", body = crate::error::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Duplicate request or item in the wrong state", body = crate::error::ErrorResponse),
        (status = 422, description = "No event currently accepts this request", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Json(data): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    let request = state.services.requests.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's pending requests
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending requests", body = Vec<RequestDetails>)
    )
)]
pub async fn list_my_requests(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.list_mine(&principal).await?;
    Ok(Json(requests))
}

/// Counts of the caller's held items and pending requests
#[utoipa::path(
    get,
    path = "/requests/mine/counts",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts", body = MyCounts)
    )
)]
pub async fn my_counts(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<MyCounts>> {
    let held_items = state.services.items.count_mine(&principal).await?;
    let pending_requests = state.services.requests.count_mine(&principal).await?;
    Ok(Json(MyCounts { held_items, pending_requests }))
}

/// Approve a request (manager of the item's responsibility)
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Approved; the updated item", body = Item),
        (status = 403, description = "Not a manager of this responsibility", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Item state changed since the request", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state.services.requests.approve(&principal, id).await?;
    Ok(Json(item))
}

/// Deny a request (manager of the item's responsibility)
#[utoipa::path(
    post,
    path = "/requests/{id}/deny",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request denied", body = StatusResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn deny_request(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.requests.deny(&principal, id).await?;
    Ok(Json(StatusResponse::success("Request denied")))
}

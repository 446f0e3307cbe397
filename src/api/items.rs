//! Item endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        item::{Item, ItemName},
        request::{Request, RequestDetails},
    },
    services::items::HeldItem,
};

use super::{CurrentUser, StatusResponse};

/// Items held by the caller
#[utoipa::path(
    get,
    path = "/items/mine",
    tag = "items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Held items, each with whether returns are open", body = Vec<HeldItem>)
    )
)]
pub async fn list_my_items(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<Vec<HeldItem>>> {
    let items = state.services.items.list_mine(&principal).await?;
    Ok(Json(items))
}

/// Rename an item (manager of its responsibility)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    request_body = ItemName,
    responses(
        (status = 200, description = "Item renamed", body = Item),
        (status = 400, description = "Invalid name", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used in this responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn rename_item(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<ItemName>,
) -> AppResult<Json<Item>> {
    let item = state.services.items.rename(&principal, id, &data.name).await?;
    Ok(Json(item))
}

/// Delete an item and its pending requests (manager of its responsibility)
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = StatusResponse),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.items.delete(&principal, id).await?;
    Ok(Json(StatusResponse::success("Item deleted")))
}

/// Pending requests on an item (manager of its responsibility)
#[utoipa::path(
    get,
    path = "/items/{id}/requests",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Pending requests", body = Vec<RequestDetails>)
    )
)]
pub async fn list_item_requests(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state.services.requests.list_by_item(&principal, id).await?;
    Ok(Json(requests))
}

/// The caller's own pending request on an item, or null
#[utoipa::path(
    get,
    path = "/items/{id}/my-request",
    tag = "items",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Pending request, or null when there is none", body = Request)
    )
)]
pub async fn my_request(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Option<Request>>> {
    let request = state.services.requests.find_mine(&principal, id).await?;
    Ok(Json(request))
}

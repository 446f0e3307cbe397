//! Responsibility endpoints: listing, description, items and pending requests

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        item::{Item, ItemName, ItemQuery},
        request::{RequestDetails, RequestQuery},
        responsibility::{Responsibility, ResponsibilityWithManagers, UpdateDescription},
    },
    services::items::ResponsibilityItems,
};

use super::CurrentUser;

/// Item and pending request counts of a responsibility
#[derive(Serialize, ToSchema)]
pub struct ResponsibilityCounts {
    pub items: i64,
    pub pending_requests: i64,
}

/// List responsibilities with their managers
#[utoipa::path(
    get,
    path = "/responsibilities",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Responsibilities", body = Vec<ResponsibilityWithManagers>)
    )
)]
pub async fn list_responsibilities(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<Vec<ResponsibilityWithManagers>>> {
    let responsibilities = state.services.responsibilities.list(&principal).await?;
    Ok(Json(responsibilities))
}

/// Get a responsibility with its managers
#[utoipa::path(
    get,
    path = "/responsibilities/{id}",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID")),
    responses(
        (status = 200, description = "Responsibility", body = ResponsibilityWithManagers),
        (status = 404, description = "Responsibility not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_responsibility(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ResponsibilityWithManagers>> {
    let responsibility = state.services.responsibilities.get(&principal, id).await?;
    Ok(Json(responsibility))
}

/// Find a responsibility by its exact name
#[utoipa::path(
    get,
    path = "/responsibilities/by-name/{name}",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Responsibility name")),
    responses(
        (status = 200, description = "Responsibility", body = Responsibility),
        (status = 404, description = "Responsibility not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_responsibility_by_name(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<Responsibility>> {
    let responsibility = state.services.responsibilities.get_by_name(&principal, &name).await?;
    Ok(Json(responsibility))
}

/// Update the description of the caller's responsibility (manager)
#[utoipa::path(
    put,
    path = "/responsibilities/{id}/description",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID")),
    request_body = UpdateDescription,
    responses(
        (status = 200, description = "Description updated", body = Responsibility),
        (status = 403, description = "Not a manager of this responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_description(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateDescription>,
) -> AppResult<Json<Responsibility>> {
    let responsibility = state
        .services
        .responsibilities
        .update_description(&principal, id, data.description)
        .await?;
    Ok(Json(responsibility))
}

/// Items of a responsibility with request hints and the current request window
#[utoipa::path(
    get,
    path = "/responsibilities/{id}/items",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID"), ItemQuery),
    responses(
        (status = 200, description = "Items", body = ResponsibilityItems)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<ResponsibilityItems>> {
    let items = state
        .services
        .items
        .list_by_responsibility(&principal, id, query.status)
        .await?;
    Ok(Json(items))
}

/// Create an item in the caller's responsibility (manager)
#[utoipa::path(
    post,
    path = "/responsibilities/{id}/items",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID")),
    request_body = ItemName,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 409, description = "Name already used in this responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<ItemName>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = state.services.items.create(&principal, id, &data.name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Pending requests of a responsibility in submission order (manager)
#[utoipa::path(
    get,
    path = "/responsibilities/{id}/requests",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID"), RequestQuery),
    responses(
        (status = 200, description = "Pending requests", body = Vec<RequestDetails>),
        (status = 403, description = "Not a manager of this responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<RequestDetails>>> {
    let requests = state
        .services
        .requests
        .list_by_responsibility(&principal, id, query.request_type)
        .await?;
    Ok(Json(requests))
}

/// Item and pending request counts (manager)
#[utoipa::path(
    get,
    path = "/responsibilities/{id}/counts",
    tag = "responsibilities",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Responsibility ID")),
    responses(
        (status = 200, description = "Counts", body = ResponsibilityCounts)
    )
)]
pub async fn counts(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ResponsibilityCounts>> {
    let pending_requests = state.services.requests.count_by_responsibility(&principal, id).await?;
    let items = state.services.items.count_by_responsibility(&principal, id).await?;
    Ok(Json(ResponsibilityCounts { items, pending_requests }))
}

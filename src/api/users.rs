//! User directory and role management endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        enums::Role,
        responsibility::Responsibility,
        user::{AdminUpdateUser, AssignResponsibility, UserSummary},
    },
};

use super::{CountResponse, CurrentUser, StatusResponse};

/// List non-admin users (admins and chiefs)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User directory", body = Vec<UserSummary>),
        (status = 403, description = "Not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<Vec<UserSummary>>> {
    let users = state.services.users.list(&principal).await?;
    Ok(Json(users))
}

/// Edit a user's names and role (admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = AdminUpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserSummary),
        (status = 403, description = "Cannot modify admin users", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<AdminUpdateUser>,
) -> AppResult<Json<UserSummary>> {
    let user = state.services.users.update_by_admin(&principal, id, data).await?;
    Ok(Json(user))
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = StatusResponse),
        (status = 403, description = "Cannot delete admin users", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.delete(&principal, id).await?;
    Ok(Json(StatusResponse::success("User deleted")))
}

/// Delete every non-admin user (admin)
#[utoipa::path(
    delete,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users deleted", body = CountResponse)
    )
)]
pub async fn delete_all_users(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<CountResponse>> {
    let deleted = state.services.users.delete_all_non_admin(&principal).await?;
    Ok(Json(CountResponse::success(deleted)))
}

/// Demote every manager to user (admin)
#[utoipa::path(
    post,
    path = "/users/demote-managers",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Managers demoted", body = CountResponse)
    )
)]
pub async fn demote_managers(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<CountResponse>> {
    let demoted = state.services.users.demote_all(&principal, Role::Manager).await?;
    Ok(Json(CountResponse::success(demoted)))
}

/// Demote every chief to user (admin)
#[utoipa::path(
    post,
    path = "/users/demote-chiefs",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Chiefs demoted", body = CountResponse)
    )
)]
pub async fn demote_chiefs(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<CountResponse>> {
    let demoted = state.services.users.demote_all(&principal, Role::Chief).await?;
    Ok(Json(CountResponse::success(demoted)))
}

/// Promote a user or manager to chief (chief)
#[utoipa::path(
    post,
    path = "/users/{id}/promote-chief",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User promoted", body = StatusResponse),
        (status = 422, description = "User is already a chief", body = crate::error::ErrorResponse)
    )
)]
pub async fn promote_chief(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.promote_to_chief(&principal, id).await?;
    Ok(Json(StatusResponse::success("User promoted to chief")))
}

/// Demote a chief to user (chief)
#[utoipa::path(
    post,
    path = "/users/{id}/demote-chief",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Chief demoted", body = StatusResponse),
        (status = 422, description = "User is not a chief", body = crate::error::ErrorResponse)
    )
)]
pub async fn demote_chief(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.demote_chief(&principal, id).await?;
    Ok(Json(StatusResponse::success("Chief demoted to user")))
}

/// Assign a responsibility by name, making the user a manager (chief)
#[utoipa::path(
    put,
    path = "/users/{id}/responsibility",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = AssignResponsibility,
    responses(
        (status = 200, description = "Responsibility assigned", body = Responsibility),
        (status = 409, description = "User already has a responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign_responsibility(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<AssignResponsibility>,
) -> AppResult<Json<Responsibility>> {
    let responsibility = state
        .services
        .users
        .assign_responsibility(&principal, id, data)
        .await?;
    Ok(Json(responsibility))
}

/// Remove a manager from their responsibility (chief)
#[utoipa::path(
    delete,
    path = "/users/{id}/responsibility",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Responsibility removed", body = StatusResponse),
        (status = 422, description = "User has no responsibility", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_responsibility(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.remove_responsibility(&principal, id).await?;
    Ok(Json(StatusResponse::success("Responsibility removed")))
}

//! Authentication and own-profile endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{RegisterUser, UpdateName, UpdatePhone, User, UserSummary},
};

use super::CurrentUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the Authorization header
    pub token: String,
    pub token_type: String,
    pub user: User,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or phone already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(data): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.auth.register(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate and obtain a token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.services.auth.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Get current user with role and responsibility
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserSummary),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
) -> AppResult<Json<UserSummary>> {
    let user = state.services.auth.me(&principal).await?;
    Ok(Json(user))
}

/// Change own first and last name
#[utoipa::path(
    put,
    path = "/auth/name",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateName,
    responses(
        (status = 200, description = "Name updated", body = User),
        (status = 400, description = "Invalid name", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_name(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Json(data): Json<UpdateName>,
) -> AppResult<Json<User>> {
    let user = state.services.auth.update_name(&principal, data).await?;
    Ok(Json(user))
}

/// Change own phone number
#[utoipa::path(
    put,
    path = "/auth/phone",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdatePhone,
    responses(
        (status = 200, description = "Phone updated", body = User),
        (status = 409, description = "Phone already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_phone(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Json(data): Json<UpdatePhone>,
) -> AppResult<Json<User>> {
    let user = state.services.auth.update_phone(&principal, data).await?;
    Ok(Json(user))
}

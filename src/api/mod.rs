//! API handlers for Quartermaster REST endpoints

pub mod auth;
pub mod events;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod responsibilities;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::access::Principal, AppState};

/// Extractor for the authenticated caller.
///
/// Decodes the bearer token, then reloads role and responsibility from the
/// database so a demotion takes effect on the next call.
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.decode_token(token)?;
        let principal = state.services.auth.principal(&claims).await?;

        Ok(CurrentUser(principal))
    }
}

/// Body of mutations that return no entity
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always "success"
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Body of bulk mutations
#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    /// Always "success"
    pub status: String,
    pub count: u64,
}

impl CountResponse {
    pub fn success(count: u64) -> Self {
        Self {
            status: "success".to_string(),
            count,
        }
    }
}

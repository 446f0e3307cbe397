//! Responsibility model (equipment category managed by one or more managers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::user::UserSummary;

/// Responsibility record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Responsibility {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub crea_date: DateTime<Utc>,
}

/// Responsibility with its assigned managers
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponsibilityWithManagers {
    #[serde(flatten)]
    pub responsibility: Responsibility,
    pub managers: Vec<UserSummary>,
}

/// Update description request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDescription {
    pub description: Option<String>,
}

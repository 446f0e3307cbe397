//! Statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        access::{Capability, Principal},
        enums::{EventStatus, ItemStatus, RequestKind},
    },
    repository::Repository,
};

/// Admin dashboard counters
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Users per role
    pub users: Vec<StatEntry>,
    pub responsibilities: i64,
    pub items: ItemStats,
    pub requests: RequestStats,
    /// Events per status
    pub events: Vec<StatEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemStats {
    pub total: i64,
    pub available: i64,
    pub in_use: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestStats {
    pub requests: i64,
    pub returns: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_stats(&self, principal: &Principal) -> AppResult<StatsResponse> {
        principal.require(Capability::ViewMetrics)?;

        let users = self
            .repository
            .users
            .count_by_role()
            .await?
            .into_iter()
            .map(|(role, value)| StatEntry { label: role.to_string(), value })
            .collect();

        let responsibilities = self.repository.responsibilities.count().await?;

        let available = self.repository.items.count_by_status(ItemStatus::Available).await?;
        let in_use = self.repository.items.count_by_status(ItemStatus::InUse).await?;

        let requests = RequestStats {
            requests: self.repository.requests.count_by_kind(RequestKind::Request).await?,
            returns: self.repository.requests.count_by_kind(RequestKind::Return).await?,
        };

        let mut events = Vec::new();
        for status in [EventStatus::NotActive, EventStatus::Active, EventStatus::EquipmentReturn] {
            events.push(StatEntry {
                label: status.to_string(),
                value: self.repository.events.count_by_status(status).await?,
            });
        }

        Ok(StatsResponse {
            users,
            responsibilities,
            items: ItemStats {
                total: available + in_use,
                available,
                in_use,
            },
            requests,
            events,
        })
    }
}

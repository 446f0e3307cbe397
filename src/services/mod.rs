//! Business logic services

pub mod auth;
pub mod events;
pub mod items;
pub mod requests;
pub mod responsibilities;
pub mod stats;
pub mod users;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub responsibilities: responsibilities::ResponsibilitiesService,
    pub items: items::ItemsService,
    pub requests: requests::RequestsService,
    pub events: events::EventsService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            responsibilities: responsibilities::ResponsibilitiesService::new(repository.clone()),
            items: items::ItemsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            events: events::EventsService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Database reachability, for the readiness probe
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

//! Repository layer for database operations

pub mod events;
pub mod items;
pub mod requests;
pub mod responsibilities;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub responsibilities: responsibilities::ResponsibilitiesRepository,
    pub items: items::ItemsRepository,
    pub requests: requests::RequestsRepository,
    pub events: events::EventsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            responsibilities: responsibilities::ResponsibilitiesRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, for readiness probes
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

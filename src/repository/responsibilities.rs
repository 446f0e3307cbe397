//! Responsibilities repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        responsibility::{Responsibility, ResponsibilityWithManagers},
        user::UserSummary,
    },
};

use super::{items::ItemsRepository, users::SUMMARY_SELECT};

#[derive(Clone)]
pub struct ResponsibilitiesRepository {
    pool: Pool<Postgres>,
}

impl ResponsibilitiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all responsibilities with their managers
    pub async fn list_with_managers(&self) -> AppResult<Vec<ResponsibilityWithManagers>> {
        let responsibilities = sqlx::query_as::<_, Responsibility>("SELECT * FROM responsibilities ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let managers = sqlx::query_as::<_, UserSummary>(&format!(
            "{} WHERE res.id IS NOT NULL ORDER BY u.last_name, u.first_name",
            SUMMARY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(responsibilities
            .into_iter()
            .map(|responsibility| {
                let managers = managers
                    .iter()
                    .filter(|m| m.responsibility_id == Some(responsibility.id))
                    .cloned()
                    .collect();
                ResponsibilityWithManagers { responsibility, managers }
            })
            .collect())
    }

    /// Get responsibility by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Responsibility> {
        sqlx::query_as::<_, Responsibility>("SELECT * FROM responsibilities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Responsibility not found".to_string()))
    }

    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<Responsibility>> {
        let responsibility = sqlx::query_as::<_, Responsibility>(
            "SELECT * FROM responsibilities WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(responsibility)
    }

    /// Managers currently assigned to a responsibility
    pub async fn managers(&self, id: i32) -> AppResult<Vec<UserSummary>> {
        let managers = sqlx::query_as::<_, UserSummary>(&format!(
            "{} WHERE res.id = $1 ORDER BY u.last_name, u.first_name",
            SUMMARY_SELECT
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(managers)
    }

    pub async fn update_description(&self, id: i32, description: Option<&str>) -> AppResult<Responsibility> {
        sqlx::query_as::<_, Responsibility>(
            "UPDATE responsibilities SET description = $1 WHERE id = $2 RETURNING *",
        )
        .bind(description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Responsibility not found".to_string()))
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responsibilities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetch the responsibility called `name` (any case), inserting it first if missing
    pub(crate) async fn get_or_create_in(conn: &mut PgConnection, name: &str) -> AppResult<Responsibility> {
        sqlx::query("INSERT INTO responsibilities (name) VALUES ($1) ON CONFLICT ((LOWER(name))) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;

        let responsibility = sqlx::query_as::<_, Responsibility>(
            "SELECT * FROM responsibilities WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
        Ok(responsibility)
    }

    /// Destroy a responsibility left without managers.
    ///
    /// Its event links and assignments cascade and pending requests on its
    /// items are deleted. The items themselves stay, still pointing at the
    /// old id. Returns whether anything was destroyed.
    pub(crate) async fn drop_if_unmanaged(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
        let managed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_responsibilities WHERE responsibility_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        if managed {
            return Ok(false);
        }

        ItemsRepository::lock_for_responsibility(&mut *conn, id).await?;

        sqlx::query("DELETE FROM requests WHERE item_id IN (SELECT id FROM items WHERE responsibility_id = $1)")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM responsibilities WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Destroy every responsibility that currently has a manager
    pub(crate) async fn drop_all_managed(conn: &mut PgConnection) -> AppResult<u64> {
        ItemsRepository::lock_managed(&mut *conn).await?;

        sqlx::query(
            r#"
            DELETE FROM requests WHERE item_id IN (
                SELECT i.id FROM items i
                JOIN user_responsibilities ur ON ur.responsibility_id = i.responsibility_id
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query(
            "DELETE FROM responsibilities WHERE id IN (SELECT responsibility_id FROM user_responsibilities)",
        )
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

//! Items repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{on_unique_violation, AppError, AppResult},
    models::{
        enums::ItemStatus,
        item::{Item, OwnedItem},
    },
};

const DUPLICATE_NAME: &str = "Item name already exists in this responsibility";

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    /// Items of a responsibility, optionally restricted to one status
    pub async fn list_by_responsibility(
        &self,
        responsibility_id: i32,
        status: Option<ItemStatus>,
    ) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE responsibility_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY name
            "#,
        )
        .bind(responsibility_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Items held by a user
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<OwnedItem>> {
        let items = sqlx::query_as::<_, OwnedItem>(
            r#"
            SELECT i.id, i.name, i.status, i.responsibility_id,
                   r.name AS responsibility_name, i.owner_id
            FROM items i
            LEFT JOIN responsibilities r ON r.id = i.responsibility_id
            WHERE i.owner_id = $1
            ORDER BY r.name, i.name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn count_by_responsibility(&self, responsibility_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE responsibility_id = $1")
            .bind(responsibility_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_owner(&self, owner_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Items per status across all responsibilities
    pub async fn count_by_status(&self, status: ItemStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Check if a name is taken within a responsibility
    pub async fn name_exists(&self, responsibility_id: i32, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM items
                WHERE responsibility_id = $1 AND name = $2 AND ($3::INTEGER IS NULL OR id != $3)
            )
            "#,
        )
        .bind(responsibility_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create an item, Available with no owner
    pub async fn create(&self, responsibility_id: i32, name: &str) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, status, responsibility_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(ItemStatus::Available)
        .bind(responsibility_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_NAME))
    }

    pub async fn rename(&self, id: i32, name: &str) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("UPDATE items SET name = $1, modif_date = NOW() WHERE id = $2 RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| on_unique_violation(e, DUPLICATE_NAME))?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    /// Delete an item; its pending requests cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        Ok(())
    }

    // Row locks on items, taken in id order.
    //
    // Any transaction that deletes requests locks the items they point at
    // first, the same order `RequestsRepository::approve` uses, so writers
    // queue on the item rows and never hold a request row while waiting for
    // an item.

    /// Lock the items a user holds, has requested, or manages
    pub(crate) async fn lock_for_user(conn: &mut PgConnection, user_id: i32) -> AppResult<()> {
        Self::lock(
            conn,
            r#"
            SELECT id FROM items
            WHERE owner_id = $1
               OR id IN (SELECT item_id FROM requests WHERE user_id = $1)
               OR responsibility_id IN (SELECT responsibility_id FROM user_responsibilities WHERE user_id = $1)
            ORDER BY id
            FOR UPDATE
            "#,
            Some(user_id),
        )
        .await
    }

    /// Lock every item of a responsibility
    pub(crate) async fn lock_for_responsibility(conn: &mut PgConnection, responsibility_id: i32) -> AppResult<()> {
        Self::lock(
            conn,
            "SELECT id FROM items WHERE responsibility_id = $1 ORDER BY id FOR UPDATE",
            Some(responsibility_id),
        )
        .await
    }

    /// Lock the items of every responsibility attached to an event
    pub(crate) async fn lock_for_event(conn: &mut PgConnection, event_id: i32) -> AppResult<()> {
        Self::lock(
            conn,
            r#"
            SELECT id FROM items
            WHERE responsibility_id IN (SELECT responsibility_id FROM event_responsibilities WHERE event_id = $1)
            ORDER BY id
            FOR UPDATE
            "#,
            Some(event_id),
        )
        .await
    }

    /// Lock every item of a managed responsibility
    pub(crate) async fn lock_managed(conn: &mut PgConnection) -> AppResult<()> {
        Self::lock(
            conn,
            r#"
            SELECT id FROM items
            WHERE responsibility_id IN (SELECT responsibility_id FROM user_responsibilities)
            ORDER BY id
            FOR UPDATE
            "#,
            None,
        )
        .await
    }

    /// Lock every item that is held, requested, or managed
    pub(crate) async fn lock_all_in_play(conn: &mut PgConnection) -> AppResult<()> {
        Self::lock(
            conn,
            r#"
            SELECT id FROM items
            WHERE owner_id IS NOT NULL
               OR id IN (SELECT item_id FROM requests)
               OR responsibility_id IN (SELECT responsibility_id FROM user_responsibilities)
            ORDER BY id
            FOR UPDATE
            "#,
            None,
        )
        .await
    }

    async fn lock(conn: &mut PgConnection, sql: &str, id: Option<i32>) -> AppResult<()> {
        let mut query = sqlx::query_scalar::<_, i32>(sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        query.fetch_all(&mut *conn).await?;
        Ok(())
    }
}

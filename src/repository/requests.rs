//! Requests repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{on_unique_violation, AppError, AppResult},
    models::{
        enums::RequestKind,
        item::Item,
        request::{Approval, Request, RequestDetails},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT q.id, q.request_type, q.crea_date,
           u.id AS user_id, u.first_name AS user_first_name, u.last_name AS user_last_name,
           i.id AS item_id, i.name AS item_name, i.status AS item_status,
           i.responsibility_id, r.name AS responsibility_name
    FROM requests q
    JOIN users u ON u.id = q.user_id
    JOIN items i ON i.id = q.item_id
    LEFT JOIN responsibilities r ON r.id = i.responsibility_id
"#;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Request> {
        sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    /// Pending request of a user on an item, if any
    pub async fn find(&self, user_id: i32, item_id: i32) -> AppResult<Option<Request>> {
        let request = sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    /// Pending requests of a responsibility in submission order
    pub async fn list_by_responsibility(
        &self,
        responsibility_id: i32,
        kind: Option<RequestKind>,
    ) -> AppResult<Vec<RequestDetails>> {
        let requests = sqlx::query_as::<_, RequestDetails>(&format!(
            "{} WHERE i.responsibility_id = $1 AND ($2::TEXT IS NULL OR q.request_type = $2) ORDER BY q.crea_date, q.id",
            DETAILS_SELECT
        ))
        .bind(responsibility_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        let requests = sqlx::query_as::<_, RequestDetails>(&format!(
            "{} WHERE q.user_id = $1 ORDER BY q.crea_date DESC, q.id DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_by_item(&self, item_id: i32) -> AppResult<Vec<RequestDetails>> {
        let requests = sqlx::query_as::<_, RequestDetails>(&format!(
            "{} WHERE q.item_id = $1 ORDER BY q.crea_date, q.id",
            DETAILS_SELECT
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Raw pending requests on the items of a responsibility, for request hints
    pub async fn pending_in_responsibility(&self, responsibility_id: i32) -> AppResult<Vec<Request>> {
        let requests = sqlx::query_as::<_, Request>(
            r#"
            SELECT q.* FROM requests q
            JOIN items i ON i.id = q.item_id
            WHERE i.responsibility_id = $1
            "#,
        )
        .bind(responsibility_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn count_by_responsibility(&self, responsibility_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests q JOIN items i ON i.id = q.item_id WHERE i.responsibility_id = $1",
        )
        .bind(responsibility_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_by_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_kind(&self, kind: RequestKind) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE request_type = $1")
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a pending request. A concurrent duplicate hits the unique index.
    pub async fn create(&self, user_id: i32, item_id: i32, kind: RequestKind) -> AppResult<Request> {
        sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (user_id, item_id, request_type, crea_date)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, "You already have a pending request for this item"))
    }

    /// Delete a request without touching its item
    pub async fn delete(&self, id: i32) -> AppResult<Request> {
        sqlx::query_as::<_, Request>("DELETE FROM requests WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    /// Approve a request in one transaction.
    ///
    /// The item row is locked first, then the request is read again under
    /// that lock, so competing approvals on one item queue on the item and
    /// the later one finds its request gone or the item taken. `authorize`
    /// runs against the locked item, and the item transition and request
    /// deletions are committed together. Returns the approved request and the updated item
    /// plus the number of competing requests removed.
    pub async fn approve<F>(&self, id: i32, authorize: F) -> AppResult<(Request, Item, usize)>
    where
        F: FnOnce(&Item) -> AppResult<()>,
    {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, Item>(
            "SELECT i.* FROM items i JOIN requests q ON q.item_id = i.id WHERE q.id = $1 FOR UPDATE OF i",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        // A competing approval may have deleted it while we waited on the item
        let request = sqlx::query_as::<_, Request>("SELECT * FROM requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        authorize(&item)?;
        let approval = Approval::plan(&request, &item)?;

        let pending = sqlx::query_as::<_, Request>(
            "SELECT * FROM requests WHERE item_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(item.id)
        .fetch_all(&mut *tx)
        .await?;
        let doomed = approval.doomed_requests(&request, &pending);

        let item = sqlx::query_as::<_, Item>(
            "UPDATE items SET status = $1, owner_id = $2, modif_date = NOW() WHERE id = $3 RETURNING *",
        )
        .bind(approval.status)
        .bind(approval.owner_id)
        .bind(item.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM requests WHERE id = ANY($1)")
            .bind(&doomed[..])
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((request, item, doomed.len() - 1))
    }
}

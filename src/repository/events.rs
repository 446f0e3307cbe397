//! Events repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{on_unique_violation, AppError, AppResult},
    models::{
        enums::{EventStatus, ItemStatus, RequestKind},
        event::{Event, EventFields, EventTransition, ItemsInUse},
        request::RequestWindow,
        responsibility::Responsibility,
    },
};

use super::items::ItemsRepository;

const DUPLICATE_NAME: &str = "An event with this name already exists";

/// Result of a status change
pub struct TransitionOutcome {
    pub event: Event,
    /// Pending claims dropped when switching to equipment return
    pub dropped_requests: u64,
}

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List events, newest first; `ongoing` keeps active and equipment-return ones
    pub async fn list(&self, ongoing: bool) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE (NOT $1 OR status != $2) ORDER BY crea_date DESC, id DESC",
        )
        .bind(ongoing)
        .bind(EventStatus::NotActive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get event by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Case-insensitive name check, optionally ignoring one event
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE LOWER(name) = LOWER($1) AND ($2::INTEGER IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create an event in `not-active` state
    pub async fn create(&self, data: &EventFields) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, description, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(EventStatus::NotActive)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_NAME))
    }

    pub async fn update(&self, id: i32, data: &EventFields) -> AppResult<Event> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET name = $1, description = $2 WHERE id = $3 AND status = $4 RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(id)
        .bind(EventStatus::NotActive)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, DUPLICATE_NAME))?
        .ok_or_else(|| AppError::BusinessRule("Only not-active events can be edited".to_string()))
    }

    /// Delete a not-active event; its responsibility links cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(EventStatus::NotActive)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BusinessRule("Only not-active events can be deleted".to_string()));
        }
        Ok(())
    }

    /// Apply a lifecycle transition under a row lock on the event.
    ///
    /// Activation needs an attached responsibility, completion needs every
    /// item of the attached responsibilities back, and switching to equipment
    /// return drops their pending claims in the same transaction.
    pub async fn transition(&self, id: i32, transition: EventTransition) -> AppResult<TransitionOutcome> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let target = transition.check(event.status)?;
        let mut dropped_requests = 0;

        match transition {
            EventTransition::Activate => {
                let linked: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM event_responsibilities WHERE event_id = $1",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                if linked == 0 {
                    return Err(AppError::BusinessRule(
                        "Event must have at least one responsibility before activation".to_string(),
                    ));
                }
            }
            EventTransition::SwitchToReturn => {
                ItemsRepository::lock_for_event(&mut *tx, id).await?;

                dropped_requests = sqlx::query(
                    r#"
                    DELETE FROM requests q
                    USING items i, event_responsibilities er
                    WHERE q.item_id = i.id
                      AND i.responsibility_id = er.responsibility_id
                      AND er.event_id = $1
                      AND q.request_type = $2
                    "#,
                )
                .bind(id)
                .bind(RequestKind::Request)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
            EventTransition::Complete => {
                let blocking = sqlx::query_as::<_, ItemsInUse>(
                    r#"
                    SELECT r.name AS responsibility_name, COUNT(i.id) AS in_use
                    FROM event_responsibilities er
                    JOIN responsibilities r ON r.id = er.responsibility_id
                    JOIN items i ON i.responsibility_id = r.id
                    WHERE er.event_id = $1 AND i.status = $2
                    GROUP BY r.name
                    ORDER BY r.name
                    LIMIT 1
                    "#,
                )
                .bind(id)
                .bind(ItemStatus::InUse)
                .fetch_optional(&mut *tx)
                .await?;

                if let Some(blocking) = blocking {
                    return Err(blocking.into_error());
                }
            }
            EventTransition::SwitchToActive => {}
        }

        let event = sqlx::query_as::<_, Event>("UPDATE events SET status = $1 WHERE id = $2 RETURNING *")
            .bind(target)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(TransitionOutcome { event, dropped_requests })
    }

    /// Responsibilities attached to an event
    pub async fn attached(&self, event_id: i32) -> AppResult<Vec<Responsibility>> {
        let rows = sqlx::query_as::<_, Responsibility>(
            r#"
            SELECT r.* FROM responsibilities r
            JOIN event_responsibilities er ON er.responsibility_id = r.id
            WHERE er.event_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Responsibilities not yet attached to an event
    pub async fn unattached(&self, event_id: i32) -> AppResult<Vec<Responsibility>> {
        let rows = sqlx::query_as::<_, Responsibility>(
            r#"
            SELECT r.* FROM responsibilities r
            WHERE NOT EXISTS (
                SELECT 1 FROM event_responsibilities er
                WHERE er.responsibility_id = r.id AND er.event_id = $1
            )
            ORDER BY r.name
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn attach(&self, event_id: i32, responsibility_id: i32) -> AppResult<()> {
        sqlx::query("INSERT INTO event_responsibilities (event_id, responsibility_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(responsibility_id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_unique_violation(e, "Responsibility is already assigned to this event"))?;
        Ok(())
    }

    pub async fn detach(&self, event_id: i32, responsibility_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM event_responsibilities WHERE event_id = $1 AND responsibility_id = $2")
            .bind(event_id)
            .bind(responsibility_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Responsibility is not assigned to this event".to_string()));
        }
        Ok(())
    }

    /// Request window of a responsibility, from the events it belongs to
    pub async fn window_for(&self, responsibility_id: i32) -> AppResult<RequestWindow> {
        let statuses = sqlx::query_scalar::<_, EventStatus>(
            r#"
            SELECT e.status FROM events e
            JOIN event_responsibilities er ON er.event_id = e.id
            WHERE er.responsibility_id = $1
            "#,
        )
        .bind(responsibility_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RequestWindow::from_statuses(statuses))
    }

    /// Events per status
    pub async fn count_by_status(&self, status: EventStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

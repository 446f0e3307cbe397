//! Users repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{on_unique_violation, AppError, AppResult},
    models::{
        access::Principal,
        enums::{ItemStatus, Role},
        responsibility::Responsibility,
        user::{RegisterUser, User, UserSummary},
    },
};

use super::{items::ItemsRepository, responsibilities::ResponsibilitiesRepository};

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.phone, u.first_name, u.last_name, u.password,
           r.name AS role, u.crea_date
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

pub(crate) const SUMMARY_SELECT: &str = r#"
    SELECT u.id, u.email, u.phone, u.first_name, u.last_name, r.name AS role,
           res.id AS responsibility_id, res.name AS responsibility_name
    FROM users u
    JOIN roles r ON r.id = u.role_id
    LEFT JOIN user_responsibilities ur ON ur.user_id = u.id
    LEFT JOIN responsibilities res ON res.id = ur.responsibility_id
"#;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Get user by email (authentication)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{} WHERE LOWER(u.email) = LOWER($1)", USER_SELECT))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if phone already exists, optionally ignoring one user
    pub async fn phone_exists(&self, phone: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1 AND ($2::INTEGER IS NULL OR id != $2))",
        )
        .bind(phone)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users u JOIN roles r ON r.id = u.role_id WHERE r.name = 'admin')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a user; `password_hash` is the argon2 PHC string
    pub async fn create(&self, data: &RegisterUser, password_hash: &str, role: Role) -> AppResult<User> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, phone, first_name, last_name, password, role_id)
            VALUES ($1, $2, $3, $4, $5, (SELECT id FROM roles WHERE name = $6))
            RETURNING id
            "#,
        )
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, "Email or phone number already in use"))?;

        self.get_by_id(id).await
    }

    /// Resolve the caller from its current role and responsibility
    pub async fn principal(&self, user_id: i32) -> AppResult<Principal> {
        let row = sqlx::query(
            r#"
            SELECT r.name AS role, ur.responsibility_id
            FROM users u
            JOIN roles r ON r.id = u.role_id
            LEFT JOIN user_responsibilities ur ON ur.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;

        Ok(Principal {
            user_id,
            role: row.try_get("role")?,
            responsibility_id: row.try_get("responsibility_id")?,
        })
    }

    pub async fn get_summary(&self, id: i32) -> AppResult<UserSummary> {
        sqlx::query_as::<_, UserSummary>(&format!("{} WHERE u.id = $1", SUMMARY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Directory listing, admins excluded unless asked for
    pub async fn list(&self, include_admins: bool) -> AppResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(&format!(
            "{} WHERE ($1 OR r.name != 'admin') ORDER BY u.last_name, u.first_name, u.id",
            SUMMARY_SELECT
        ))
        .bind(include_admins)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update_name(&self, id: i32, first_name: &str, last_name: &str) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET first_name = $1, last_name = $2 WHERE id = $3")
            .bind(first_name)
            .bind(last_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.get_by_id(id).await
    }

    pub async fn update_phone(&self, id: i32, phone: &str) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET phone = $1 WHERE id = $2")
            .bind(phone)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| on_unique_violation(e, "Phone number already in use"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.get_by_id(id).await
    }

    /// Plain role change for users holding no responsibility
    pub async fn set_role(&self, id: i32, role: Role) -> AppResult<()> {
        sqlx::query("UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $1) WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Make `user_id` a manager of the responsibility called `name`,
    /// creating the responsibility if needed.
    pub async fn assign_responsibility(&self, user_id: i32, name: &str) -> AppResult<Responsibility> {
        let mut tx = self.pool.begin().await?;

        let responsibility = ResponsibilitiesRepository::get_or_create_in(&mut *tx, name).await?;

        sqlx::query("INSERT INTO user_responsibilities (user_id, responsibility_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(responsibility.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_unique_violation(e, "User already has a responsibility assigned"))?;

        sqlx::query("UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $1) WHERE id = $2")
            .bind(Role::Manager)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(responsibility)
    }

    /// Drop the user's responsibility and give them `new_role`.
    ///
    /// Returns the id of the responsibility destroyed because its last manager
    /// left, if any.
    pub async fn release_responsibility(&self, user_id: i32, new_role: Role) -> AppResult<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        let released: Option<i32> = sqlx::query_scalar(
            "DELETE FROM user_responsibilities WHERE user_id = $1 RETURNING responsibility_id",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $1) WHERE id = $2")
            .bind(new_role)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let dropped = match released {
            Some(id) if ResponsibilitiesRepository::drop_if_unmanaged(&mut *tx, id).await? => Some(id),
            _ => None,
        };

        tx.commit().await?;
        Ok(dropped)
    }

    /// Delete a user: held items go back to Available, their responsibility
    /// is cleaned up and their pending requests cascade.
    pub async fn delete(&self, user_id: i32) -> AppResult<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        ItemsRepository::lock_for_user(&mut *tx, user_id).await?;

        sqlx::query(
            "UPDATE items SET status = $1, owner_id = NULL, modif_date = NOW() WHERE owner_id = $2",
        )
        .bind(ItemStatus::Available)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let released: Option<i32> = sqlx::query_scalar(
            "DELETE FROM user_responsibilities WHERE user_id = $1 RETURNING responsibility_id",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let dropped = match released {
            Some(id) if ResponsibilitiesRepository::drop_if_unmanaged(&mut *tx, id).await? => Some(id),
            _ => None,
        };

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(dropped)
    }

    /// Delete every chief, manager and user. Returns the number of accounts removed.
    pub async fn delete_all_non_admin(&self) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        ItemsRepository::lock_all_in_play(&mut *tx).await?;

        sqlx::query(
            r#"
            UPDATE items SET status = $1, owner_id = NULL, modif_date = NOW()
            WHERE owner_id IN (
                SELECT u.id FROM users u JOIN roles r ON r.id = u.role_id WHERE r.name != 'admin'
            )
            "#,
        )
        .bind(ItemStatus::Available)
        .execute(&mut *tx)
        .await?;

        // Only managers hold responsibilities, so every one of them loses its last manager
        ResponsibilitiesRepository::drop_all_managed(&mut *tx).await?;

        let result = sqlx::query(
            "DELETE FROM users WHERE role_id IN (SELECT id FROM roles WHERE name != 'admin')",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Turn every holder of `role` into a plain user. Demoting managers also
    /// destroys their responsibilities.
    pub async fn demote_all(&self, role: Role) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        if role == Role::Manager {
            ResponsibilitiesRepository::drop_all_managed(&mut *tx).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $1)
            WHERE role_id = (SELECT id FROM roles WHERE name = $2)
            "#,
        )
        .bind(Role::User)
        .bind(role)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Users per role
    pub async fn count_by_role(&self) -> AppResult<Vec<(Role, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT r.name AS role, COUNT(u.id) AS total
            FROM roles r
            LEFT JOIN users u ON u.role_id = r.id
            GROUP BY r.id, r.name
            ORDER BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> AppResult<(Role, i64)> { Ok((row.try_get("role")?, row.try_get("total")?)) })
            .collect()
    }
}

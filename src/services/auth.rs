//! Authentication, own-profile operations and principal resolution

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::{AdminConfig, AuthConfig},
    error::{AppError, AppResult},
    models::{
        access::Principal,
        enums::Role,
        user::{RegisterUser, UpdateName, UpdatePhone, User, UserClaims, UserSummary},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account with the `user` role
    pub async fn register(&self, data: RegisterUser) -> AppResult<User> {
        let data = data.normalized();
        data.validate()?;

        if self.repository.users.email_exists(&data.email).await? {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        if self.repository.users.phone_exists(&data.phone, None).await? {
            return Err(AppError::Conflict("Phone number is already registered".to_string()));
        }

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, &hash, Role::User).await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::warn!(user_id = user.id, "Rejected login attempt");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Decode a bearer token
    pub fn decode_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }

    /// Current role and responsibility of the token holder. The role in the
    /// token may be stale, so the database is authoritative.
    pub async fn principal(&self, claims: &UserClaims) -> AppResult<Principal> {
        self.repository.users.principal(claims.user_id).await
    }

    pub async fn me(&self, principal: &Principal) -> AppResult<UserSummary> {
        self.repository.users.get_summary(principal.user_id).await
    }

    pub async fn update_name(&self, principal: &Principal, data: UpdateName) -> AppResult<User> {
        let data = data.normalized();
        data.validate()?;

        self.repository
            .users
            .update_name(principal.user_id, &data.first_name, &data.last_name)
            .await
    }

    pub async fn update_phone(&self, principal: &Principal, data: UpdatePhone) -> AppResult<User> {
        let phone = data.phone.trim().to_string();
        UpdatePhone { phone: phone.clone() }.validate()?;

        if self.repository.users.phone_exists(&phone, Some(principal.user_id)).await? {
            return Err(AppError::Conflict("Phone number is already registered".to_string()));
        }

        self.repository.users.update_phone(principal.user_id, &phone).await
    }

    /// Create the configured administrator when no admin account exists yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let data = RegisterUser {
            email: admin.email.clone(),
            phone: admin.phone.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            password: admin.password.clone(),
        }
        .normalized();
        data.validate()?;

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, &hash, Role::Admin).await?;

        tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin account created");
        Ok(())
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("Secret12!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "Secret12!").unwrap());
        assert!(!verify_password(&hash, "Secret13!").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        assert!(matches!(verify_password("plain", "plain"), Err(AppError::Internal(_))));
    }
}

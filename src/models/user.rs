//! User model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::Role;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{1,20}$").expect("valid name pattern"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone pattern"));
static PASSWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&]{8,16}$").expect("valid password pattern"));

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub crea_date: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// User with the responsibility they manage, for directory listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub responsibility_id: Option<i32>,
    pub responsibility_name: Option<String>,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "Phone number must be exactly 10 digits"))]
    pub phone: String,
    #[validate(regex(path = *NAME_RE, message = "First name must contain only letters and be 1-20 characters long"))]
    pub first_name: String,
    #[validate(regex(path = *NAME_RE, message = "Last name must contain only letters and be 1-20 characters long"))]
    pub last_name: String,
    #[validate(regex(
        path = *PASSWORD_RE,
        message = "Password must be 8-16 characters of letters, numbers and @$!%*?&"
    ))]
    pub password: String,
}

impl RegisterUser {
    /// Trim everything; emails and names are stored lowercase
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            first_name: self.first_name.trim().to_lowercase(),
            last_name: self.last_name.trim().to_lowercase(),
            password: self.password,
        }
    }
}

/// Change own name
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateName {
    #[validate(regex(path = *NAME_RE, message = "First name must contain only letters and be 1-20 characters long"))]
    pub first_name: String,
    #[validate(regex(path = *NAME_RE, message = "Last name must contain only letters and be 1-20 characters long"))]
    pub last_name: String,
}

impl UpdateName {
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_lowercase(),
            last_name: self.last_name.trim().to_lowercase(),
        }
    }
}

/// Change own phone
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePhone {
    #[validate(regex(path = *PHONE_RE, message = "Phone number must be exactly 10 digits"))]
    pub phone: String,
}

/// Admin edit of another user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUser {
    #[validate(regex(path = *NAME_RE, message = "First name must contain only letters and be 1-20 characters long"))]
    pub first_name: Option<String>,
    #[validate(regex(path = *NAME_RE, message = "Last name must contain only letters and be 1-20 characters long"))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl AdminUpdateUser {
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.map(|s| s.trim().to_lowercase()),
            last_name: self.last_name.map(|s| s.trim().to_lowercase()),
            role: self.role,
        }
    }
}

/// Assign a responsibility (by name) to a user
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignResponsibility {
    pub responsibility_name: String,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterUser {
        RegisterUser {
            email: "  Alice@Example.com ".to_string(),
            phone: "0123456789".to_string(),
            first_name: " Alice ".to_string(),
            last_name: "Smith".to_string(),
            password: "Secret12!".to_string(),
        }
    }

    #[test]
    fn test_registration_normalized_and_valid() {
        let data = registration().normalized();
        assert_eq!(data.email, "alice@example.com");
        assert_eq!(data.first_name, "alice");
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_phone_must_have_ten_digits() {
        let mut data = registration().normalized();
        data.phone = "12345".to_string();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_password_charset_and_length() {
        let mut data = registration().normalized();
        data.password = "short".to_string();
        assert!(data.validate().is_err());
        data.password = "no spaces allowed".to_string();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_names_letters_only() {
        let data = UpdateName {
            first_name: "R2D2".to_string(),
            last_name: "droid".to_string(),
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_token_roundtrip_keeps_role() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "alice@example.com".to_string(),
            user_id: 4,
            role: Role::Manager,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 4);
        assert_eq!(decoded.role, Role::Manager);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }
}

//! Shared domain enums, stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

use crate::error::AppError;

/// Implements the sqlx text codec for an enum exposing `as_str()` and `FromStr`.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse::<$ty>().map_err(|e| e.to_string().into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role. Every user holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Chief,
    Manager,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Chief, Role::Manager, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Chief => "chief",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "chief" => Ok(Role::Chief),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            _ => Err(AppError::Validation(format!("Role not found: {}", s))),
        }
    }
}

text_column!(Role);

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Item availability. `InUse` always comes with an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "In Use")]
    InUse,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "Available",
            ItemStatus::InUse => "In Use",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(ItemStatus::Available),
            "In Use" => Ok(ItemStatus::InUse),
            _ => Err(AppError::Validation(format!(
                "Invalid item status '{}'. Must be 'Available' or 'In Use'",
                s
            ))),
        }
    }
}

text_column!(ItemStatus);

// ---------------------------------------------------------------------------
// RequestKind
// ---------------------------------------------------------------------------

/// Pending action kind: claim an item or give it back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Request,
    Return,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Request => "request",
            RequestKind::Return => "return",
        }
    }
}

impl std::str::FromStr for RequestKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(RequestKind::Request),
            "return" => Ok(RequestKind::Return),
            _ => Err(AppError::Validation(
                "Invalid request type. Must be 'request' or 'return'".to_string(),
            )),
        }
    }
}

text_column!(RequestKind);

// ---------------------------------------------------------------------------
// EventStatus
// ---------------------------------------------------------------------------

/// Event lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventStatus {
    #[serde(rename = "not-active")]
    NotActive,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "equipment return")]
    EquipmentReturn,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::NotActive => "not-active",
            EventStatus::Active => "active",
            EventStatus::EquipmentReturn => "equipment return",
        }
    }

    /// Upper-case label without dashes ("NOT ACTIVE")
    pub fn display_label(&self) -> String {
        self.as_str().to_uppercase().replace('-', " ")
    }
}

impl std::str::FromStr for EventStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-active" => Ok(EventStatus::NotActive),
            "active" => Ok(EventStatus::Active),
            "equipment return" => Ok(EventStatus::EquipmentReturn),
            _ => Err(AppError::Validation(
                "Invalid status. Valid statuses are: not-active, active, equipment return".to_string(),
            )),
        }
    }
}

text_column!(EventStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_item_status_text() {
        assert_eq!(ItemStatus::InUse.as_str(), "In Use");
        assert_eq!("Available".parse::<ItemStatus>().unwrap(), ItemStatus::Available);
        assert!("Unavailable".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_request_kind_rejects_unknown() {
        assert_eq!("return".parse::<RequestKind>().unwrap(), RequestKind::Return);
        let err = "borrow".parse::<RequestKind>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_event_status_serde_names() {
        let json = serde_json::to_string(&EventStatus::EquipmentReturn).unwrap();
        assert_eq!(json, "\"equipment return\"");
        assert_eq!(EventStatus::NotActive.display_label(), "NOT ACTIVE");
    }
}

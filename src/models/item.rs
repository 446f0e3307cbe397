//! Item (single piece of equipment) model and related types.
//!
//! An item belongs to exactly one responsibility and is either `Available`
//! with no owner, or `In Use` by exactly one user. The pair only changes when a
//! manager approves a request or a return.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{ItemStatus, RequestKind};
use super::request::Request;
use crate::error::{AppError, AppResult};

static ITEM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]{1,32}$").expect("valid item name pattern"));

/// Item record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub status: ItemStatus,
    pub responsibility_id: i32,
    /// Current holder, present iff status is `In Use`
    pub owner_id: Option<i32>,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Item {
    pub fn is_available(&self) -> bool {
        self.status == ItemStatus::Available && self.owner_id.is_none()
    }

    pub fn is_in_use(&self) -> bool {
        self.status == ItemStatus::InUse
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.owner_id == Some(user_id)
    }

    /// `In Use` iff an owner is recorded
    pub fn is_consistent(&self) -> bool {
        self.is_in_use() == self.owner_id.is_some()
    }
}

/// Display hint derived from the pending requests of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestHint {
    #[serde(rename = "Item being requested")]
    BeingRequested,
    #[serde(rename = "Return pending")]
    ReturnPending,
}

/// Scans pending requests for `item_id`; a pending return wins over claims.
pub fn request_hint(item_id: i32, pending: &[Request]) -> Option<RequestHint> {
    let mut requested = false;

    for request in pending.iter().filter(|r| r.item_id == item_id) {
        match request.request_type {
            RequestKind::Return => return Some(RequestHint::ReturnPending),
            RequestKind::Request => requested = true,
        }
    }

    requested.then_some(RequestHint::BeingRequested)
}

/// Item with its request hint, for responsibility listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub request_hint: Option<RequestHint>,
}

/// Item owned by the caller, with the name of its responsibility
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OwnedItem {
    pub id: i32,
    pub name: String,
    pub status: ItemStatus,
    pub responsibility_id: i32,
    pub responsibility_name: Option<String>,
    pub owner_id: Option<i32>,
}

/// Create or rename item request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemName {
    pub name: String,
}

/// Query parameters for item listings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ItemQuery {
    /// Restrict to one status ("Available" or "In Use")
    pub status: Option<ItemStatus>,
}

/// Trims and checks an item name: letters, digits and spaces, 1 to 32 characters
pub fn validate_item_name(name: &str) -> AppResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(AppError::Validation("Item name cannot be empty".to_string()));
    }

    if !ITEM_NAME_RE.is_match(name) {
        return Err(AppError::Validation(
            "Item name must contain only letters, numbers, and spaces, max 32 characters".to_string(),
        ));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, owner_id: Option<i32>) -> Item {
        Item {
            id,
            name: format!("Radio {}", id),
            status: if owner_id.is_some() { ItemStatus::InUse } else { ItemStatus::Available },
            responsibility_id: 1,
            owner_id,
            crea_date: Utc::now(),
            modif_date: None,
        }
    }

    fn pending(id: i32, item_id: i32, kind: RequestKind) -> Request {
        Request {
            id,
            user_id: id + 100,
            item_id,
            request_type: kind,
            crea_date: Utc::now(),
        }
    }

    #[test]
    fn test_derived_status() {
        let free = item(1, None);
        assert!(free.is_available());
        assert!(!free.is_in_use());
        assert!(free.is_consistent());

        let held = item(2, Some(9));
        assert!(held.is_in_use());
        assert!(held.is_owned_by(9));
        assert!(!held.is_owned_by(8));
        assert!(held.is_consistent());
    }

    #[test]
    fn test_inconsistent_item_detected() {
        let mut broken = item(1, None);
        broken.status = ItemStatus::InUse;
        assert!(!broken.is_consistent());
        assert!(!broken.is_available());
    }

    #[test]
    fn test_request_hint() {
        let requests = vec![
            pending(1, 10, RequestKind::Request),
            pending(2, 11, RequestKind::Request),
            pending(3, 11, RequestKind::Return),
        ];
        assert_eq!(request_hint(10, &requests), Some(RequestHint::BeingRequested));
        assert_eq!(request_hint(11, &requests), Some(RequestHint::ReturnPending));
        assert_eq!(request_hint(12, &requests), None);
    }

    #[test]
    fn test_item_name_validation() {
        assert_eq!(validate_item_name("  Tent 4 ").unwrap(), "Tent 4");
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name("Tent-4").is_err());
        assert!(validate_item_name(&"x".repeat(33)).is_err());
    }
}

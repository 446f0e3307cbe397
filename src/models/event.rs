//! Event model and lifecycle.
//!
//! Events gate the request window of the responsibilities attached to them:
//!
//! ```text
//! not-active --activate--> active --switch_to_return--> equipment return
//!      ^                     ^                               |  |
//!      |                     +--------switch_to_active-------+  |
//!      +-----------------------------complete-------------------+
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::EventStatus;
use crate::error::{AppError, AppResult};

pub const EVENT_NAME_MAX: usize = 100;
pub const EVENT_DESCRIPTION_MAX: usize = 500;

/// Event record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub crea_date: DateTime<Utc>,
}

impl Event {
    /// Active or in equipment return
    pub fn is_ongoing(&self) -> bool {
        self.status != EventStatus::NotActive
    }

    pub fn can_edit(&self) -> AppResult<()> {
        if self.status != EventStatus::NotActive {
            return Err(AppError::BusinessRule(
                "Only not-active events can be edited".to_string(),
            ));
        }
        Ok(())
    }

    pub fn can_delete(&self) -> AppResult<()> {
        if self.status != EventStatus::NotActive {
            return Err(AppError::BusinessRule(
                "Only not-active events can be deleted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle transition of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTransition {
    Activate,
    SwitchToReturn,
    SwitchToActive,
    Complete,
}

impl EventTransition {
    fn from_status(&self) -> EventStatus {
        match self {
            EventTransition::Activate => EventStatus::NotActive,
            EventTransition::SwitchToReturn => EventStatus::Active,
            EventTransition::SwitchToActive | EventTransition::Complete => EventStatus::EquipmentReturn,
        }
    }

    pub fn target(&self) -> EventStatus {
        match self {
            EventTransition::Activate | EventTransition::SwitchToActive => EventStatus::Active,
            EventTransition::SwitchToReturn => EventStatus::EquipmentReturn,
            EventTransition::Complete => EventStatus::NotActive,
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            EventTransition::Activate => "Only not-active events can be activated",
            EventTransition::SwitchToReturn => "Only active events can be switched to return mode",
            EventTransition::SwitchToActive => {
                "Only events in equipment return mode can be switched back to active"
            }
            EventTransition::Complete => "Only events in equipment return mode can be completed",
        }
    }

    /// Returns the status the event moves to, or the reason it cannot.
    pub fn check(&self, current: EventStatus) -> AppResult<EventStatus> {
        if current != self.from_status() {
            return Err(AppError::BusinessRule(self.rejection().to_string()));
        }
        Ok(self.target())
    }
}

/// Items still held in one responsibility, blocking completion
#[derive(Debug, Clone, FromRow)]
pub struct ItemsInUse {
    pub responsibility_name: String,
    pub in_use: i64,
}

impl ItemsInUse {
    pub fn into_error(self) -> AppError {
        AppError::BusinessRule(format!(
            "Cannot complete event: {} item(s) still in use in responsibility '{}'. \
             All items must be returned before completing the event.",
            self.in_use, self.responsibility_name
        ))
    }
}

/// Create or edit event request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventFields {
    pub name: String,
    pub description: Option<String>,
}

impl EventFields {
    /// Trims both fields, checks lengths and maps an empty description to none.
    pub fn validated(self) -> AppResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Event name is required".to_string()));
        }
        if name.chars().count() > EVENT_NAME_MAX {
            return Err(AppError::Validation(format!(
                "Event name cannot exceed {} characters",
                EVENT_NAME_MAX
            )));
        }

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > EVENT_DESCRIPTION_MAX {
                return Err(AppError::Validation(format!(
                    "Event description cannot exceed {} characters",
                    EVENT_DESCRIPTION_MAX
                )));
            }
        }

        Ok(Self { name, description })
    }
}

/// Query parameters for events
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EventQuery {
    /// Only active and equipment-return events
    pub ongoing: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: EventStatus) -> Event {
        Event {
            id: 1,
            name: "Summer camp".to_string(),
            description: None,
            status,
            crea_date: Utc::now(),
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let mut status = EventStatus::NotActive;
        for transition in [
            EventTransition::Activate,
            EventTransition::SwitchToReturn,
            EventTransition::SwitchToActive,
            EventTransition::SwitchToReturn,
            EventTransition::Complete,
        ] {
            status = transition.check(status).unwrap();
        }
        assert_eq!(status, EventStatus::NotActive);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        assert!(EventTransition::Activate.check(EventStatus::Active).is_err());
        assert!(EventTransition::SwitchToReturn.check(EventStatus::NotActive).is_err());
        assert!(EventTransition::SwitchToActive.check(EventStatus::Active).is_err());
        let err = EventTransition::Complete.check(EventStatus::Active).unwrap_err();
        assert_eq!(
            err.public_message(),
            "Only events in equipment return mode can be completed"
        );
    }

    #[test]
    fn test_only_not_active_events_are_editable() {
        assert!(event(EventStatus::NotActive).can_edit().is_ok());
        assert!(event(EventStatus::Active).can_edit().is_err());
        assert!(event(EventStatus::EquipmentReturn).can_delete().is_err());
    }

    #[test]
    fn test_ongoing() {
        assert!(!event(EventStatus::NotActive).is_ongoing());
        assert!(event(EventStatus::Active).is_ongoing());
        assert!(event(EventStatus::EquipmentReturn).is_ongoing());
    }

    #[test]
    fn test_fields_validation() {
        let fields = EventFields {
            name: "  Winter  ".to_string(),
            description: Some("   ".to_string()),
        }
        .validated()
        .unwrap();
        assert_eq!(fields.name, "Winter");
        assert_eq!(fields.description, None);

        let blank = EventFields { name: " ".to_string(), description: None };
        assert!(blank.validated().is_err());

        let long = EventFields {
            name: "x".repeat(EVENT_NAME_MAX + 1),
            description: None,
        };
        assert!(long.validated().is_err());

        let wordy = EventFields {
            name: "Fair".to_string(),
            description: Some("y".repeat(EVENT_DESCRIPTION_MAX + 1)),
        };
        assert!(wordy.validated().is_err());
    }

    #[test]
    fn test_items_in_use_message() {
        let blocked = ItemsInUse { responsibility_name: "tents".to_string(), in_use: 2 };
        assert!(blocked
            .into_error()
            .public_message()
            .starts_with("Cannot complete event: 2 item(s) still in use in responsibility 'tents'"));
    }
}

//! Capability matrix and the resolved caller of a service operation

use serde::Serialize;
use utoipa::ToSchema;

use super::enums::Role;
use crate::error::{AppError, AppResult};

/// Actions guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewMetrics,
    ManageUsers,
    ManageEvents,
    AssignManagers,
    ViewUserDirectory,
    ManageItems,
    DecideRequests,
    SubmitRequests,
    SubmitReturns,
    ViewCatalog,
}

impl Capability {
    fn describe(&self) -> &'static str {
        match self {
            Capability::ViewMetrics => "view metrics",
            Capability::ManageUsers => "manage users",
            Capability::ManageEvents => "manage events",
            Capability::AssignManagers => "assign managers",
            Capability::ViewUserDirectory => "view the user directory",
            Capability::ManageItems => "manage items",
            Capability::DecideRequests => "approve or deny requests",
            Capability::SubmitRequests => "request items",
            Capability::SubmitReturns => "return items",
            Capability::ViewCatalog => "view the catalog",
        }
    }
}

impl Role {
    /// The single source of truth for who may do what
    pub fn grants(self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin => matches!(
                capability,
                ViewMetrics | ManageUsers | ManageEvents | ViewUserDirectory | SubmitReturns | ViewCatalog
            ),
            Role::Chief => matches!(
                capability,
                ManageEvents | AssignManagers | ViewUserDirectory | SubmitReturns | ViewCatalog
            ),
            Role::Manager => matches!(
                capability,
                ManageItems | DecideRequests | SubmitRequests | SubmitReturns | ViewCatalog
            ),
            Role::User => matches!(capability, SubmitRequests | SubmitReturns | ViewCatalog),
        }
    }
}

/// Caller identity as currently stored, resolved once per HTTP call
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Principal {
    pub user_id: i32,
    pub role: Role,
    /// Responsibility managed by the caller (managers only)
    pub responsibility_id: Option<i32>,
}

impl Principal {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Your role cannot {}",
                capability.describe()
            )))
        }
    }

    /// A manager may only touch items and requests of their own responsibility
    pub fn require_responsibility(&self, responsibility_id: i32) -> AppResult<()> {
        match self.responsibility_id {
            _ if self.role != Role::Manager => Err(AppError::Authorization(
                "Only managers can manage a responsibility".to_string(),
            )),
            None => Err(AppError::Authorization(
                "You have no responsibility assigned".to_string(),
            )),
            Some(own) if own != responsibility_id => Err(AppError::Authorization(
                "You don't have permission to manage this responsibility".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Capability check followed by the responsibility scope check
    pub fn require_within(&self, capability: Capability, responsibility_id: i32) -> AppResult<()> {
        self.require(capability)?;
        self.require_responsibility(responsibility_id)
    }

    pub fn is_self(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, responsibility_id: Option<i32>) -> Principal {
        Principal { user_id: 7, role, responsibility_id }
    }

    #[test]
    fn test_only_admin_views_metrics() {
        for role in Role::ALL {
            assert_eq!(role.grants(Capability::ViewMetrics), role == Role::Admin);
        }
    }

    #[test]
    fn test_admins_and_chiefs_cannot_request_items() {
        assert!(!Role::Admin.grants(Capability::SubmitRequests));
        assert!(!Role::Chief.grants(Capability::SubmitRequests));
        assert!(Role::Manager.grants(Capability::SubmitRequests));
        assert!(Role::User.grants(Capability::SubmitRequests));
    }

    #[test]
    fn test_everyone_can_return() {
        assert!(Role::ALL.iter().all(|r| r.grants(Capability::SubmitReturns)));
    }

    #[test]
    fn test_event_management() {
        assert!(Role::Admin.grants(Capability::ManageEvents));
        assert!(Role::Chief.grants(Capability::ManageEvents));
        assert!(!Role::Manager.grants(Capability::ManageEvents));
        assert!(!Role::User.grants(Capability::ManageEvents));
    }

    #[test]
    fn test_manager_scoped_to_own_responsibility() {
        let manager = principal(Role::Manager, Some(3));
        assert!(manager.require_within(Capability::DecideRequests, 3).is_ok());
        assert!(matches!(
            manager.require_within(Capability::DecideRequests, 4),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_manager_without_responsibility_is_rejected() {
        let manager = principal(Role::Manager, None);
        assert!(manager.require_responsibility(3).is_err());
    }

    #[test]
    fn test_chief_cannot_decide_requests() {
        let chief = principal(Role::Chief, Some(3));
        assert!(chief.require_within(Capability::DecideRequests, 3).is_err());
        assert!(chief.require_responsibility(3).is_err());
    }
}

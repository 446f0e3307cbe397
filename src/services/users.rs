//! User directory and role management (chief and admin operations)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{Capability, Principal},
        enums::Role,
        responsibility::Responsibility,
        user::{AdminUpdateUser, AssignResponsibility, User, UserSummary},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Non-admin accounts with their responsibility
    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<UserSummary>> {
        principal.require(Capability::ViewUserDirectory)?;
        self.repository.users.list(false).await
    }

    /// Load a target user that the caller is allowed to modify
    async fn modifiable(&self, user_id: i32) -> AppResult<User> {
        let user = self.repository.users.get_by_id(user_id).await?;
        if user.role == Role::Admin {
            return Err(AppError::Authorization("Cannot modify admin users".to_string()));
        }
        Ok(user)
    }

    /// Make a user the manager of the named responsibility, creating it if needed
    pub async fn assign_responsibility(
        &self,
        principal: &Principal,
        user_id: i32,
        data: AssignResponsibility,
    ) -> AppResult<Responsibility> {
        principal.require(Capability::AssignManagers)?;

        let name = data.responsibility_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Responsibility name cannot be empty".to_string()));
        }

        let user = self.modifiable(user_id).await?;
        if user.role == Role::Chief {
            return Err(AppError::BusinessRule("Chiefs cannot manage a responsibility".to_string()));
        }
        if self.repository.users.principal(user_id).await?.responsibility_id.is_some() {
            return Err(AppError::Conflict("User already has a responsibility assigned".to_string()));
        }

        let responsibility = self.repository.users.assign_responsibility(user_id, name).await?;

        tracing::info!(
            user_id,
            responsibility_id = responsibility.id,
            by = principal.user_id,
            "Responsibility assigned"
        );
        Ok(responsibility)
    }

    /// Remove a manager from their responsibility and demote them to user
    pub async fn remove_responsibility(&self, principal: &Principal, user_id: i32) -> AppResult<()> {
        principal.require(Capability::AssignManagers)?;

        let target = self.repository.users.principal(user_id).await.map_err(|_| {
            AppError::NotFound("User not found".to_string())
        })?;
        if target.responsibility_id.is_none() {
            return Err(AppError::BusinessRule("User has no responsibility assigned".to_string()));
        }

        let dropped = self.repository.users.release_responsibility(user_id, Role::User).await?;

        tracing::info!(user_id, by = principal.user_id, "Responsibility removed");
        if let Some(id) = dropped {
            tracing::info!(responsibility_id = id, "Responsibility destroyed, no managers left");
        }
        Ok(())
    }

    /// Promote a user or manager to chief. A manager first loses their responsibility.
    pub async fn promote_to_chief(&self, principal: &Principal, user_id: i32) -> AppResult<()> {
        principal.require(Capability::AssignManagers)?;

        let user = self.modifiable(user_id).await?;
        match user.role {
            Role::Chief => return Err(AppError::BusinessRule("User is already a chief".to_string())),
            Role::Manager => {
                self.repository.users.release_responsibility(user_id, Role::Chief).await?;
            }
            _ => self.repository.users.set_role(user_id, Role::Chief).await?,
        }

        tracing::info!(user_id, by = principal.user_id, "User promoted to chief");
        Ok(())
    }

    pub async fn demote_chief(&self, principal: &Principal, user_id: i32) -> AppResult<()> {
        principal.require(Capability::AssignManagers)?;

        let user = self.modifiable(user_id).await?;
        if user.role != Role::Chief {
            return Err(AppError::BusinessRule("User is not a chief".to_string()));
        }

        self.repository.users.set_role(user_id, Role::User).await?;

        tracing::info!(user_id, by = principal.user_id, "Chief demoted to user");
        Ok(())
    }

    /// Admin edit of names and role.
    ///
    /// The manager role is only reachable through a responsibility assignment;
    /// moving a manager to another role releases their responsibility.
    pub async fn update_by_admin(&self, principal: &Principal, user_id: i32, data: AdminUpdateUser) -> AppResult<UserSummary> {
        principal.require(Capability::ManageUsers)?;

        let data = data.normalized();
        data.validate()?;

        let user = self.modifiable(user_id).await?;

        match (data.first_name.as_deref(), data.last_name.as_deref()) {
            (Some(first), Some(last)) => {
                self.repository.users.update_name(user_id, first, last).await?;
            }
            (None, None) => {}
            _ => {
                return Err(AppError::Validation(
                    "First and last name must be provided together".to_string(),
                ))
            }
        }

        if let Some(role) = data.role {
            match role {
                Role::Admin => {
                    return Err(AppError::Authorization("Cannot assign admin role".to_string()))
                }
                Role::Manager if user.role != Role::Manager => {
                    return Err(AppError::BusinessRule(
                        "Managers are created by assigning a responsibility".to_string(),
                    ))
                }
                _ if role == user.role => {}
                _ if user.role == Role::Manager => {
                    self.repository.users.release_responsibility(user_id, role).await?;
                }
                _ => self.repository.users.set_role(user_id, role).await?,
            }
        }

        tracing::info!(user_id, by = principal.user_id, "User updated by admin");
        self.repository.users.get_summary(user_id).await
    }

    /// Delete a non-admin account other than the caller's own
    pub async fn delete(&self, principal: &Principal, user_id: i32) -> AppResult<()> {
        principal.require(Capability::ManageUsers)?;

        if principal.is_self(user_id) {
            return Err(AppError::BusinessRule("You cannot delete your own account".to_string()));
        }

        let user = self.repository.users.get_by_id(user_id).await?;
        if user.role == Role::Admin {
            tracing::warn!(user_id, by = principal.user_id, "Refused to delete admin account");
            return Err(AppError::Authorization("Cannot delete admin users".to_string()));
        }

        let dropped = self.repository.users.delete(user_id).await?;

        tracing::info!(user_id, by = principal.user_id, "User deleted");
        if let Some(id) = dropped {
            tracing::info!(responsibility_id = id, "Responsibility destroyed, no managers left");
        }
        Ok(())
    }

    pub async fn delete_all_non_admin(&self, principal: &Principal) -> AppResult<u64> {
        principal.require(Capability::ManageUsers)?;

        let deleted = self.repository.users.delete_all_non_admin().await?;
        tracing::info!(deleted, by = principal.user_id, "All non-admin users deleted");
        Ok(deleted)
    }

    /// Demote every holder of `role` (manager or chief) to user
    pub async fn demote_all(&self, principal: &Principal, role: Role) -> AppResult<u64> {
        principal.require(Capability::ManageUsers)?;

        if !matches!(role, Role::Manager | Role::Chief) {
            return Err(AppError::Validation("Only managers or chiefs can be demoted".to_string()));
        }

        let demoted = self.repository.users.demote_all(role).await?;
        tracing::info!(demoted, role = %role, by = principal.user_id, "Bulk demotion");
        Ok(demoted)
    }
}

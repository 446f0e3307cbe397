//! Responsibilities service

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{Capability, Principal},
        responsibility::{Responsibility, ResponsibilityWithManagers},
    },
    repository::Repository,
};

const DESCRIPTION_MAX: usize = 500;

#[derive(Clone)]
pub struct ResponsibilitiesService {
    repository: Repository,
}

impl ResponsibilitiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<ResponsibilityWithManagers>> {
        principal.require(Capability::ViewCatalog)?;
        self.repository.responsibilities.list_with_managers().await
    }

    pub async fn get(&self, principal: &Principal, id: i32) -> AppResult<ResponsibilityWithManagers> {
        principal.require(Capability::ViewCatalog)?;

        let responsibility = self.repository.responsibilities.get_by_id(id).await?;
        let managers = self.repository.responsibilities.managers(id).await?;
        Ok(ResponsibilityWithManagers { responsibility, managers })
    }

    pub async fn get_by_name(&self, principal: &Principal, name: &str) -> AppResult<Responsibility> {
        principal.require(Capability::ViewCatalog)?;

        self.repository
            .responsibilities
            .get_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Responsibility not found".to_string()))
    }

    /// Managers edit the description of their own responsibility
    pub async fn update_description(
        &self,
        principal: &Principal,
        id: i32,
        description: Option<String>,
    ) -> AppResult<Responsibility> {
        principal.require_within(Capability::ManageItems, id)?;

        let description = description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        if description.as_ref().is_some_and(|d| d.chars().count() > DESCRIPTION_MAX) {
            return Err(AppError::Validation(format!(
                "Description cannot exceed {} characters",
                DESCRIPTION_MAX
            )));
        }

        let responsibility = self
            .repository
            .responsibilities
            .update_description(id, description.as_deref())
            .await?;

        tracing::info!(responsibility_id = id, by = principal.user_id, "Responsibility description updated");
        Ok(responsibility)
    }
}

//! Events service

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{Capability, Principal},
        event::{Event, EventFields, EventTransition},
        responsibility::Responsibility,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
}

impl EventsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All events newest first, or only the ongoing ones
    pub async fn list(&self, principal: &Principal, ongoing: bool) -> AppResult<Vec<Event>> {
        principal.require(Capability::ViewCatalog)?;
        self.repository.events.list(ongoing).await
    }

    pub async fn get_by_id(&self, principal: &Principal, id: i32) -> AppResult<Event> {
        principal.require(Capability::ViewCatalog)?;
        self.repository.events.get_by_id(id).await
    }

    pub async fn create(&self, principal: &Principal, data: EventFields) -> AppResult<Event> {
        principal.require(Capability::ManageEvents)?;

        let data = data.validated()?;
        if self.repository.events.name_exists(&data.name, None).await? {
            return Err(AppError::Conflict("An event with this name already exists".to_string()));
        }

        let event = self.repository.events.create(&data).await?;

        tracing::info!(event_id = event.id, by = principal.user_id, "Event created");
        Ok(event)
    }

    pub async fn update(&self, principal: &Principal, id: i32, data: EventFields) -> AppResult<Event> {
        principal.require(Capability::ManageEvents)?;

        self.repository.events.get_by_id(id).await?.can_edit()?;

        let data = data.validated()?;
        if self.repository.events.name_exists(&data.name, Some(id)).await? {
            return Err(AppError::Conflict("An event with this name already exists".to_string()));
        }

        let event = self.repository.events.update(id, &data).await?;

        tracing::info!(event_id = id, by = principal.user_id, "Event updated");
        Ok(event)
    }

    pub async fn delete(&self, principal: &Principal, id: i32) -> AppResult<()> {
        principal.require(Capability::ManageEvents)?;

        self.repository.events.get_by_id(id).await?.can_delete()?;
        self.repository.events.delete(id).await?;

        tracing::info!(event_id = id, by = principal.user_id, "Event deleted");
        Ok(())
    }

    /// Move an event through its lifecycle
    pub async fn transition(
        &self,
        principal: &Principal,
        id: i32,
        transition: EventTransition,
    ) -> AppResult<Event> {
        principal.require(Capability::ManageEvents)?;

        let outcome = self.repository.events.transition(id, transition).await?;

        tracing::info!(
            event_id = id,
            status = %outcome.event.status,
            dropped_requests = outcome.dropped_requests,
            by = principal.user_id,
            "Event status changed"
        );
        Ok(outcome.event)
    }

    pub async fn attached(&self, principal: &Principal, id: i32) -> AppResult<Vec<Responsibility>> {
        principal.require(Capability::ViewCatalog)?;
        self.repository.events.get_by_id(id).await?;
        self.repository.events.attached(id).await
    }

    /// Responsibilities that could still be attached
    pub async fn unattached(&self, principal: &Principal, id: i32) -> AppResult<Vec<Responsibility>> {
        principal.require(Capability::ManageEvents)?;
        self.repository.events.get_by_id(id).await?;
        self.repository.events.unattached(id).await
    }

    pub async fn add_responsibility(&self, principal: &Principal, id: i32, responsibility_id: i32) -> AppResult<()> {
        principal.require(Capability::ManageEvents)?;

        self.repository.events.get_by_id(id).await?;
        self.repository.responsibilities.get_by_id(responsibility_id).await?;
        self.repository.events.attach(id, responsibility_id).await?;

        tracing::info!(event_id = id, responsibility_id, by = principal.user_id, "Responsibility attached to event");
        Ok(())
    }

    pub async fn remove_responsibility(&self, principal: &Principal, id: i32, responsibility_id: i32) -> AppResult<()> {
        principal.require(Capability::ManageEvents)?;

        self.repository.events.get_by_id(id).await?;
        self.repository.events.detach(id, responsibility_id).await?;

        tracing::info!(event_id = id, responsibility_id, by = principal.user_id, "Responsibility detached from event");
        Ok(())
    }
}

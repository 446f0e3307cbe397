//! Item catalog service: listings with request hints, and manager edits

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{Capability, Principal},
        enums::ItemStatus,
        item::{request_hint, validate_item_name, Item, ItemView, OwnedItem},
        request::RequestWindow,
    },
    repository::Repository,
};

/// Items held by the caller, each with the return window of its responsibility
#[derive(Debug, Serialize, ToSchema)]
pub struct HeldItem {
    #[serde(flatten)]
    pub item: OwnedItem,
    pub returns_open: bool,
}

/// Items of a responsibility and whether it currently accepts requests
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponsibilityItems {
    pub responsibility_id: i32,
    pub window: RequestWindow,
    pub items: Vec<ItemView>,
}

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Items of a responsibility, each with its request hint
    pub async fn list_by_responsibility(
        &self,
        principal: &Principal,
        responsibility_id: i32,
        status: Option<ItemStatus>,
    ) -> AppResult<ResponsibilityItems> {
        principal.require(Capability::ViewCatalog)?;

        let items = self
            .repository
            .items
            .list_by_responsibility(responsibility_id, status)
            .await?;
        let pending = self
            .repository
            .requests
            .pending_in_responsibility(responsibility_id)
            .await?;
        let window = self.repository.events.window_for(responsibility_id).await?;

        let items = items
            .into_iter()
            .map(|item| ItemView {
                request_hint: request_hint(item.id, &pending),
                item,
            })
            .collect();

        Ok(ResponsibilityItems { responsibility_id, window, items })
    }

    /// Items currently held by the caller
    pub async fn list_mine(&self, principal: &Principal) -> AppResult<Vec<HeldItem>> {
        let items = self.repository.items.list_by_owner(principal.user_id).await?;

        let mut held = Vec::with_capacity(items.len());
        for item in items {
            let window = self.repository.events.window_for(item.responsibility_id).await?;
            held.push(HeldItem { item, returns_open: window.returns_open });
        }
        Ok(held)
    }

    pub async fn count_by_responsibility(&self, principal: &Principal, responsibility_id: i32) -> AppResult<i64> {
        principal.require(Capability::ViewCatalog)?;
        self.repository.items.count_by_responsibility(responsibility_id).await
    }

    pub async fn count_mine(&self, principal: &Principal) -> AppResult<i64> {
        self.repository.items.count_by_owner(principal.user_id).await
    }

    /// Create an item in the caller's responsibility
    pub async fn create(&self, principal: &Principal, responsibility_id: i32, name: &str) -> AppResult<Item> {
        principal.require_within(Capability::ManageItems, responsibility_id)?;
        self.repository.responsibilities.get_by_id(responsibility_id).await?;

        let name = validate_item_name(name)?;
        if self.repository.items.name_exists(responsibility_id, &name, None).await? {
            return Err(AppError::Conflict(
                "Item name already exists in this responsibility".to_string(),
            ));
        }

        let item = self.repository.items.create(responsibility_id, &name).await?;

        tracing::info!(item_id = item.id, responsibility_id, by = principal.user_id, "Item created");
        Ok(item)
    }

    pub async fn rename(&self, principal: &Principal, item_id: i32, name: &str) -> AppResult<Item> {
        let item = self.repository.items.get_by_id(item_id).await?;
        principal.require_within(Capability::ManageItems, item.responsibility_id)?;

        let name = validate_item_name(name)?;
        if self
            .repository
            .items
            .name_exists(item.responsibility_id, &name, Some(item_id))
            .await?
        {
            return Err(AppError::Conflict(
                "Item name already exists in this responsibility".to_string(),
            ));
        }

        let item = self.repository.items.rename(item_id, &name).await?;

        tracing::info!(item_id, by = principal.user_id, "Item renamed");
        Ok(item)
    }

    /// Delete an item and its pending requests
    pub async fn delete(&self, principal: &Principal, item_id: i32) -> AppResult<()> {
        let item = self.repository.items.get_by_id(item_id).await?;
        principal.require_within(Capability::ManageItems, item.responsibility_id)?;

        self.repository.items.delete(item_id).await?;

        tracing::info!(item_id, by = principal.user_id, "Item deleted");
        Ok(())
    }
}

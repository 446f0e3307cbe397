//! Request intake, approval and denial

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{Capability, Principal},
        enums::RequestKind,
        item::Item,
        request::{check_intake, CreateRequest, Request, RequestDetails},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Submit a claim or a return for an item.
    ///
    /// Every check runs before the single insert, so a rejected request
    /// leaves no trace.
    pub async fn create(&self, principal: &Principal, data: CreateRequest) -> AppResult<Request> {
        let kind: RequestKind = data.request_type.trim().parse()?;

        let capability = match kind {
            RequestKind::Request => Capability::SubmitRequests,
            RequestKind::Return => Capability::SubmitReturns,
        };
        principal.require(capability)?;

        let user = self.repository.users.get_by_id(principal.user_id).await?;
        let item = self.repository.items.get_by_id(data.item_id).await?;

        let has_pending = self.repository.requests.find(user.id, item.id).await?.is_some();
        let window = self.repository.events.window_for(item.responsibility_id).await?;
        check_intake(&item, user.id, kind, has_pending, window)?;

        let request = self.repository.requests.create(user.id, item.id, kind).await?;

        tracing::info!(
            request_id = request.id,
            user_id = user.id,
            item_id = item.id,
            kind = %kind,
            "Request created"
        );
        Ok(request)
    }

    /// Approve a pending request. Runs as one transaction; see
    /// [`crate::repository::requests::RequestsRepository::approve`].
    pub async fn approve(&self, principal: &Principal, request_id: i32) -> AppResult<Item> {
        principal.require(Capability::DecideRequests)?;

        let (request, item, superseded) = self
            .repository
            .requests
            .approve(request_id, |item| {
                principal.require_responsibility(item.responsibility_id)
            })
            .await
            .map_err(|e| {
                if matches!(e, AppError::Authorization(_)) {
                    tracing::warn!(request_id, by = principal.user_id, "Approval outside own responsibility refused");
                }
                e
            })?;

        tracing::info!(
            request_id,
            item_id = item.id,
            user_id = request.user_id,
            kind = %request.request_type,
            superseded,
            by = principal.user_id,
            "Request approved"
        );
        Ok(item)
    }

    /// Deny a pending request; the item is left untouched
    pub async fn deny(&self, principal: &Principal, request_id: i32) -> AppResult<()> {
        principal.require(Capability::DecideRequests)?;

        let request = self.repository.requests.get_by_id(request_id).await?;
        let item = self.repository.items.get_by_id(request.item_id).await?;
        principal.require_responsibility(item.responsibility_id)?;

        self.repository.requests.delete(request_id).await?;

        tracing::info!(request_id, item_id = item.id, by = principal.user_id, "Request denied");
        Ok(())
    }

    /// Pending requests of a responsibility, for its managers
    pub async fn list_by_responsibility(
        &self,
        principal: &Principal,
        responsibility_id: i32,
        kind: Option<RequestKind>,
    ) -> AppResult<Vec<RequestDetails>> {
        principal.require_within(Capability::DecideRequests, responsibility_id)?;
        self.repository
            .requests
            .list_by_responsibility(responsibility_id, kind)
            .await
    }

    pub async fn list_mine(&self, principal: &Principal) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_by_user(principal.user_id).await
    }

    /// Pending requests on one item, for the managers of its responsibility
    pub async fn list_by_item(&self, principal: &Principal, item_id: i32) -> AppResult<Vec<RequestDetails>> {
        let item = self.repository.items.get_by_id(item_id).await?;
        principal.require_within(Capability::DecideRequests, item.responsibility_id)?;
        self.repository.requests.list_by_item(item_id).await
    }

    /// The caller's own pending request on an item
    pub async fn find_mine(&self, principal: &Principal, item_id: i32) -> AppResult<Option<Request>> {
        self.repository.requests.find(principal.user_id, item_id).await
    }

    pub async fn count_by_responsibility(&self, principal: &Principal, responsibility_id: i32) -> AppResult<i64> {
        principal.require_within(Capability::DecideRequests, responsibility_id)?;
        self.repository.requests.count_by_responsibility(responsibility_id).await
    }

    pub async fn count_mine(&self, principal: &Principal) -> AppResult<i64> {
        self.repository.requests.count_by_user(principal.user_id).await
    }
}

//! Pending request model and the request/approval state machine.
//!
//! A request is a pending user action on an item: `request` (claim it) or
//! `return` (give it back). It lives until a manager approves or denies it and
//! is then deleted; nothing is archived. Approval is the only place where item
//! ownership changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{EventStatus, ItemStatus, RequestKind};
use super::item::Item;
use crate::error::{AppError, AppResult};

/// Request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Request {
    pub id: i32,
    pub user_id: i32,
    pub item_id: i32,
    pub request_type: RequestKind,
    pub crea_date: DateTime<Utc>,
}

/// Request with requester and item details for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub request_type: RequestKind,
    pub crea_date: DateTime<Utc>,
    pub user_id: i32,
    pub user_first_name: String,
    pub user_last_name: String,
    pub item_id: i32,
    pub item_name: String,
    pub item_status: ItemStatus,
    pub responsibility_id: i32,
    pub responsibility_name: Option<String>,
}

/// Create request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequest {
    pub item_id: i32,
    /// "request" or "return"
    pub request_type: String,
}

/// Query parameters for request listings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    /// Restrict to one type ("request" or "return")
    #[serde(rename = "type")]
    pub request_type: Option<RequestKind>,
}

/// Whether a responsibility currently accepts claims and returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RequestWindow {
    pub requests_open: bool,
    pub returns_open: bool,
}

impl RequestWindow {
    /// Claims need an `active` event; returns accept `active` or `equipment return`.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = EventStatus>,
    {
        statuses
            .into_iter()
            .fold(RequestWindow::default(), |window, status| match status {
                EventStatus::Active => RequestWindow {
                    requests_open: true,
                    returns_open: true,
                },
                EventStatus::EquipmentReturn => RequestWindow {
                    returns_open: true,
                    ..window
                },
                EventStatus::NotActive => window,
            })
    }
}

/// Validates a new request against the item state.
///
/// Checks run in a fixed order: duplicate pending request, event window, then
/// item status and ownership. Nothing is written by the caller unless this
/// returns `Ok`.
pub fn check_intake(
    item: &Item,
    user_id: i32,
    kind: RequestKind,
    has_pending: bool,
    window: RequestWindow,
) -> AppResult<()> {
    if has_pending {
        return Err(AppError::Conflict(
            "You already have a pending request for this item".to_string(),
        ));
    }

    match kind {
        RequestKind::Request => {
            if !window.requests_open {
                return Err(AppError::BusinessRule(
                    "Item requests are not allowed at this time. No active events for this responsibility."
                        .to_string(),
                ));
            }
            if item.status != ItemStatus::Available {
                return Err(AppError::Conflict("Item is not available for request".to_string()));
            }
            if item.owner_id.is_some() {
                return Err(AppError::Conflict("Item is already owned by another user".to_string()));
            }
        }
        RequestKind::Return => {
            if !window.returns_open {
                return Err(AppError::BusinessRule(
                    "Item returns are not allowed at this time. No active or return-mode events for this responsibility."
                        .to_string(),
                ));
            }
            if !item.is_in_use() {
                return Err(AppError::Conflict("Item is not currently in use".to_string()));
            }
            if !item.is_owned_by(user_id) {
                return Err(AppError::Conflict("You don't own this item".to_string()));
            }
        }
    }

    Ok(())
}

/// Item state to write when a request is approved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    pub status: ItemStatus,
    pub owner_id: Option<i32>,
    /// Claim approvals also drop every competing request on the item
    pub supersedes_competitors: bool,
}

impl Approval {
    /// Computes the item transition for `request`, re-checking the item state
    /// so a stale request cannot break the status/owner pairing.
    pub fn plan(request: &Request, item: &Item) -> AppResult<Self> {
        if request.item_id != item.id {
            return Err(AppError::Internal(format!(
                "Request {} does not reference item {}",
                request.id, item.id
            )));
        }

        match request.request_type {
            RequestKind::Request => {
                if !item.is_available() {
                    return Err(AppError::Conflict("Item is no longer available".to_string()));
                }
                Ok(Approval {
                    status: ItemStatus::InUse,
                    owner_id: Some(request.user_id),
                    supersedes_competitors: true,
                })
            }
            RequestKind::Return => {
                if !item.is_in_use() || !item.is_owned_by(request.user_id) {
                    return Err(AppError::Conflict(
                        "Item is no longer held by the requesting user".to_string(),
                    ));
                }
                Ok(Approval {
                    status: ItemStatus::Available,
                    owner_id: None,
                    supersedes_competitors: false,
                })
            }
        }
    }

    /// Ids of the requests to delete: the approved one, plus every other
    /// pending request on the same item when the approval is a claim.
    pub fn doomed_requests(&self, approved: &Request, pending: &[Request]) -> Vec<i32> {
        let mut ids = vec![approved.id];

        if self.supersedes_competitors {
            ids.extend(
                pending
                    .iter()
                    .filter(|r| r.item_id == approved.item_id && r.id != approved.id)
                    .map(|r| r.id),
            );
        }

        ids
    }

    pub fn apply(&self, item: &mut Item) {
        item.status = self.status;
        item.owner_id = self.owner_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: RequestWindow = RequestWindow {
        requests_open: true,
        returns_open: true,
    };

    fn item(id: i32, owner_id: Option<i32>) -> Item {
        Item {
            id,
            name: format!("Tent {}", id),
            status: if owner_id.is_some() { ItemStatus::InUse } else { ItemStatus::Available },
            responsibility_id: 1,
            owner_id,
            crea_date: Utc::now(),
            modif_date: None,
        }
    }

    /// In-memory stand-in for the items and requests tables, driven by the
    /// same rules the repository runs inside its transactions.
    struct Store {
        items: Vec<Item>,
        requests: Vec<Request>,
        next_id: i32,
    }

    impl Store {
        fn new(items: Vec<Item>) -> Self {
            Self { items, requests: Vec::new(), next_id: 1 }
        }

        fn item(&self, id: i32) -> &Item {
            self.items.iter().find(|i| i.id == id).unwrap()
        }

        fn submit(&mut self, user_id: i32, item_id: i32, kind: &str) -> AppResult<i32> {
            let kind: RequestKind = kind.parse()?;
            let has_pending = self
                .requests
                .iter()
                .any(|r| r.user_id == user_id && r.item_id == item_id);
            check_intake(self.item(item_id), user_id, kind, has_pending, OPEN)?;

            let id = self.next_id;
            self.next_id += 1;
            self.requests.push(Request {
                id,
                user_id,
                item_id,
                request_type: kind,
                crea_date: Utc::now(),
            });
            Ok(id)
        }

        fn approve(&mut self, request_id: i32) -> AppResult<()> {
            let request = self
                .requests
                .iter()
                .find(|r| r.id == request_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;
            let approval = Approval::plan(&request, self.item(request.item_id))?;
            let doomed = approval.doomed_requests(&request, &self.requests);

            let item = self.items.iter_mut().find(|i| i.id == request.item_id).unwrap();
            approval.apply(item);
            self.requests.retain(|r| !doomed.contains(&r.id));
            Ok(())
        }

        fn deny(&mut self, request_id: i32) -> AppResult<()> {
            let before = self.requests.len();
            self.requests.retain(|r| r.id != request_id);
            if self.requests.len() == before {
                return Err(AppError::NotFound("Request not found".to_string()));
            }
            Ok(())
        }

        fn pending_for(&self, item_id: i32) -> usize {
            self.requests.iter().filter(|r| r.item_id == item_id).count()
        }

        fn assert_invariants(&self) {
            assert!(self.items.iter().all(Item::is_consistent));
            for (i, a) in self.requests.iter().enumerate() {
                for b in &self.requests[i + 1..] {
                    assert!(!(a.user_id == b.user_id && a.item_id == b.item_id));
                }
            }
        }
    }

    #[test]
    fn test_window_from_statuses() {
        assert_eq!(RequestWindow::from_statuses([]), RequestWindow::default());
        assert_eq!(
            RequestWindow::from_statuses([EventStatus::EquipmentReturn]),
            RequestWindow { requests_open: false, returns_open: true }
        );
        assert_eq!(
            RequestWindow::from_statuses([EventStatus::EquipmentReturn, EventStatus::Active]),
            OPEN
        );
        assert_eq!(
            RequestWindow::from_statuses([EventStatus::NotActive]),
            RequestWindow::default()
        );
    }

    #[test]
    fn test_duplicate_pending_rejected() {
        let err = check_intake(&item(1, None), 5, RequestKind::Request, true, OPEN).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_request_needs_active_event() {
        let window = RequestWindow { requests_open: false, returns_open: true };
        let err = check_intake(&item(1, None), 5, RequestKind::Request, false, window).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[test]
    fn test_request_on_item_in_use_rejected() {
        let err = check_intake(&item(1, Some(9)), 5, RequestKind::Request, false, OPEN).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_return_by_non_owner_rejected() {
        let err = check_intake(&item(1, Some(9)), 5, RequestKind::Return, false, OPEN).unwrap_err();
        assert_eq!(err.public_message(), "You don't own this item");
    }

    #[test]
    fn test_return_of_available_item_rejected() {
        assert!(check_intake(&item(1, None), 5, RequestKind::Return, false, OPEN).is_err());
    }

    #[test]
    fn test_return_allowed_during_equipment_return() {
        let window = RequestWindow::from_statuses([EventStatus::EquipmentReturn]);
        assert!(check_intake(&item(1, Some(5)), 5, RequestKind::Return, false, window).is_ok());
    }

    #[test]
    fn test_rejected_intake_writes_nothing() {
        let mut store = Store::new(vec![item(1, Some(9))]);
        assert!(store.submit(5, 1, "request").is_err());
        assert!(store.submit(5, 1, "borrow").is_err());
        assert!(store.requests.is_empty());
    }

    #[test]
    fn test_competing_claims_first_approval_wins() {
        let (alice, bob) = (1, 2);
        let mut store = Store::new(vec![item(10, None)]);

        let a = store.submit(alice, 10, "request").unwrap();
        store.submit(bob, 10, "request").unwrap();
        assert_eq!(store.pending_for(10), 2);
        assert!(store.submit(alice, 10, "request").is_err());

        store.approve(a).unwrap();

        let taken = store.item(10);
        assert_eq!(taken.status, ItemStatus::InUse);
        assert_eq!(taken.owner_id, Some(alice));
        assert_eq!(store.pending_for(10), 0);
        store.assert_invariants();
    }

    #[test]
    fn test_approved_return_releases_item() {
        let mut store = Store::new(vec![item(10, Some(1))]);

        let r = store.submit(1, 10, "return").unwrap();
        store.approve(r).unwrap();

        let released = store.item(10);
        assert_eq!(released.status, ItemStatus::Available);
        assert_eq!(released.owner_id, None);
        assert!(store.requests.is_empty());
        store.assert_invariants();
    }

    #[test]
    fn test_return_approval_keeps_other_items_requests() {
        let mut store = Store::new(vec![item(10, Some(1)), item(11, None)]);

        let r = store.submit(1, 10, "return").unwrap();
        let other = store.submit(2, 11, "request").unwrap();
        store.approve(r).unwrap();

        assert_eq!(store.requests.len(), 1);
        assert_eq!(store.requests[0].id, other);
    }

    #[test]
    fn test_deny_leaves_item_untouched() {
        let mut store = Store::new(vec![item(10, None)]);

        let a = store.submit(1, 10, "request").unwrap();
        store.deny(a).unwrap();

        assert!(store.item(10).is_available());
        assert!(store.requests.is_empty());
        assert!(matches!(store.deny(a), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_claim_then_return_cycle() {
        let mut store = Store::new(vec![item(10, None)]);

        let claim = store.submit(1, 10, "request").unwrap();
        store.approve(claim).unwrap();
        assert!(store.submit(2, 10, "request").is_err());

        let give_back = store.submit(1, 10, "return").unwrap();
        store.approve(give_back).unwrap();

        assert!(store.item(10).is_available());
        assert!(store.submit(2, 10, "request").is_ok());
        store.assert_invariants();
    }

    #[test]
    fn test_stale_claim_cannot_overwrite_owner() {
        let request = Request {
            id: 1,
            user_id: 2,
            item_id: 10,
            request_type: RequestKind::Request,
            crea_date: Utc::now(),
        };
        let err = Approval::plan(&request, &item(10, Some(1))).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_doomed_requests_for_claim() {
        let approved = Request {
            id: 1,
            user_id: 2,
            item_id: 10,
            request_type: RequestKind::Request,
            crea_date: Utc::now(),
        };
        let pending = vec![
            approved.clone(),
            Request { id: 2, user_id: 3, ..approved.clone() },
            Request { id: 3, user_id: 3, item_id: 11, ..approved.clone() },
        ];
        let approval = Approval::plan(&approved, &item(10, None)).unwrap();
        let mut doomed = approval.doomed_requests(&approved, &pending);
        doomed.sort();
        assert_eq!(doomed, vec![1, 2]);
    }
}

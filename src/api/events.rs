//! Events API endpoints (lifecycle and responsibility links)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        event::{Event, EventFields, EventQuery, EventTransition},
        responsibility::Responsibility,
    },
};

use super::{CurrentUser, StatusResponse};

/// List events, newest first
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(EventQuery),
    responses(
        (status = 200, description = "Events list", body = Vec<Event>)
    )
)]
pub async fn list_events(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<Vec<Event>>> {
    let events = state
        .services
        .events
        .list(&principal, query.ongoing.unwrap_or(false))
        .await?;
    Ok(Json(events))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    let event = state.services.events.get_by_id(&principal, id).await?;
    Ok(Json(event))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    request_body = EventFields,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Json(data): Json<EventFields>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = state.services.events.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update a not-active event
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    request_body = EventFields,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 422, description = "Event is not editable", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
    Json(data): Json<EventFields>,
) -> AppResult<Json<Event>> {
    let event = state.services.events.update(&principal, id, data).await?;
    Ok(Json(event))
}

/// Delete a not-active event
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = StatusResponse),
        (status = 422, description = "Event is not deletable", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.events.delete(&principal, id).await?;
    Ok(Json(StatusResponse::success("Event deleted")))
}

async fn transition(
    state: crate::AppState,
    principal: crate::models::access::Principal,
    id: i32,
    transition: EventTransition,
) -> AppResult<Json<Event>> {
    let event = state.services.events.transition(&principal, id, transition).await?;
    Ok(Json(event))
}

/// Open the request window: not-active to active
#[utoipa::path(
    post,
    path = "/events/{id}/activate",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event activated", body = Event),
        (status = 422, description = "Wrong state or no responsibility attached", body = crate::error::ErrorResponse)
    )
)]
pub async fn activate_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    transition(state, principal, id, EventTransition::Activate).await
}

/// Close claims and accept returns only; drops pending claims
#[utoipa::path(
    post,
    path = "/events/{id}/switch-to-return",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event in equipment return", body = Event),
        (status = 422, description = "Event is not active", body = crate::error::ErrorResponse)
    )
)]
pub async fn switch_to_return(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    transition(state, principal, id, EventTransition::SwitchToReturn).await
}

/// Reopen claims: equipment return to active
#[utoipa::path(
    post,
    path = "/events/{id}/switch-to-active",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event active again", body = Event),
        (status = 422, description = "Event is not in equipment return", body = crate::error::ErrorResponse)
    )
)]
pub async fn switch_to_active(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    transition(state, principal, id, EventTransition::SwitchToActive).await
}

/// Finish the event once every item is back
#[utoipa::path(
    post,
    path = "/events/{id}/complete",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event completed", body = Event),
        (status = 422, description = "Wrong state or items still in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_event(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    transition(state, principal, id, EventTransition::Complete).await
}

/// Responsibilities attached to an event
#[utoipa::path(
    get,
    path = "/events/{id}/responsibilities",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Attached responsibilities", body = Vec<Responsibility>)
    )
)]
pub async fn list_attached(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Responsibility>>> {
    let responsibilities = state.services.events.attached(&principal, id).await?;
    Ok(Json(responsibilities))
}

/// Responsibilities that can still be attached to an event
#[utoipa::path(
    get,
    path = "/events/{id}/available-responsibilities",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Unattached responsibilities", body = Vec<Responsibility>)
    )
)]
pub async fn list_unattached(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Responsibility>>> {
    let responsibilities = state.services.events.unattached(&principal, id).await?;
    Ok(Json(responsibilities))
}

/// Attach a responsibility to an event
#[utoipa::path(
    post,
    path = "/events/{id}/responsibilities/{responsibility_id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Event ID"),
        ("responsibility_id" = i32, Path, description = "Responsibility ID")
    ),
    responses(
        (status = 200, description = "Responsibility attached", body = StatusResponse),
        (status = 409, description = "Already attached", body = crate::error::ErrorResponse)
    )
)]
pub async fn attach_responsibility(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path((id, responsibility_id)): Path<(i32, i32)>,
) -> AppResult<Json<StatusResponse>> {
    state
        .services
        .events
        .add_responsibility(&principal, id, responsibility_id)
        .await?;
    Ok(Json(StatusResponse::success("Responsibility added to event")))
}

/// Detach a responsibility from an event
#[utoipa::path(
    delete,
    path = "/events/{id}/responsibilities/{responsibility_id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Event ID"),
        ("responsibility_id" = i32, Path, description = "Responsibility ID")
    ),
    responses(
        (status = 200, description = "Responsibility detached", body = StatusResponse),
        (status = 409, description = "Not attached", body = crate::error::ErrorResponse)
    )
)]
pub async fn detach_responsibility(
    State(state): State<crate::AppState>,
    CurrentUser(principal): CurrentUser,
    Path((id, responsibility_id)): Path<(i32, i32)>,
) -> AppResult<Json<StatusResponse>> {
    state
        .services
        .events
        .remove_responsibility(&principal, id, responsibility_id)
        .await?;
    Ok(Json(StatusResponse::success("Responsibility removed from event")))
}

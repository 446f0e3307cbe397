//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, events, health, items, requests, responsibilities, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quartermaster API",
        version = "1.0.0",
        description = "Role-based equipment checkout REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::update_name,
        auth::update_phone,
        // Users
        users::list_users,
        users::update_user,
        users::delete_user,
        users::delete_all_users,
        users::demote_managers,
        users::demote_chiefs,
        users::promote_chief,
        users::demote_chief,
        users::assign_responsibility,
        users::remove_responsibility,
        // Responsibilities
        responsibilities::list_responsibilities,
        responsibilities::get_responsibility,
        responsibilities::get_responsibility_by_name,
        responsibilities::update_description,
        responsibilities::list_items,
        responsibilities::create_item,
        responsibilities::list_requests,
        responsibilities::counts,
        // Items
        items::list_my_items,
        items::rename_item,
        items::delete_item,
        items::list_item_requests,
        items::my_request,
        // Requests
        requests::create_request,
        requests::list_my_requests,
        requests::my_counts,
        requests::approve_request,
        requests::deny_request,
        // Events
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::activate_event,
        events::switch_to_return,
        events::switch_to_active,
        events::complete_event,
        events::list_attached,
        events::list_unattached,
        events::attach_responsibility,
        events::detach_responsibility,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Shared
            crate::api::StatusResponse,
            crate::api::CountResponse,
            crate::models::enums::Role,
            crate::models::enums::ItemStatus,
            crate::models::enums::RequestKind,
            crate::models::enums::EventStatus,
            // Auth and users
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateName,
            crate::models::user::UpdatePhone,
            crate::models::user::AdminUpdateUser,
            crate::models::user::AssignResponsibility,
            // Responsibilities
            crate::models::responsibility::Responsibility,
            crate::models::responsibility::ResponsibilityWithManagers,
            crate::models::responsibility::UpdateDescription,
            responsibilities::ResponsibilityCounts,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemView,
            crate::models::item::OwnedItem,
            crate::models::item::ItemName,
            crate::models::item::RequestHint,
            crate::services::items::HeldItem,
            crate::services::items::ResponsibilityItems,
            // Requests
            crate::models::request::Request,
            crate::models::request::RequestDetails,
            crate::models::request::CreateRequest,
            crate::models::request::RequestWindow,
            requests::MyCounts,
            // Events
            crate::models::event::Event,
            crate::models::event::EventFields,
            // Stats
            crate::services::stats::StatsResponse,
            crate::services::stats::ItemStats,
            crate::services::stats::RequestStats,
            crate::services::stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and own profile"),
        (name = "users", description = "User directory and role management"),
        (name = "responsibilities", description = "Responsibilities, their items and pending requests"),
        (name = "items", description = "Item management"),
        (name = "requests", description = "Request intake and approval"),
        (name = "events", description = "Event lifecycle"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

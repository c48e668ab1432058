//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, categories, health, items, requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShareLocal API",
        version = "0.1.0",
        description = "Local item-sharing marketplace REST API",
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
        // Items
        items::list_items,
        items::get_item,
        items::my_items,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::toggle_availability,
        // Categories
        categories::list_categories,
        categories::create_category,
        // Users
        users::get_user,
        // Requests
        requests::submit_request,
        requests::list_received,
        requests::list_sent,
        requests::request_history,
        requests::pending_count,
        requests::get_request,
        requests::accept_request,
        requests::reject_request,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::User,
            crate::models::user::UserShort,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemShort,
            crate::models::item::ItemInput,
            crate::models::item::ItemType,
            crate::models::item::ItemStatus,
            items::ItemDetailResponse,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            // Requests
            crate::models::request::ItemRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            requests::SubmitRequestResponse,
            requests::RequestActionResponse,
            requests::RequestHistoryResponse,
            requests::PendingCountResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "items", description = "Item listings"),
        (name = "categories", description = "Item categories"),
        (name = "users", description = "User profiles"),
        (name = "requests", description = "Item request lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! Item (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::item::{Item, ItemInput, ItemQuery, ItemShort},
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Item detail with related listings
#[derive(Serialize, ToSchema)]
pub struct ItemDetailResponse {
    /// The item
    pub item: Item,
    /// Other available items from the same category
    pub related: Vec<ItemShort>,
}

/// List available items with search and pagination
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(ItemQuery),
    responses(
        (status = 200, description = "List of available items", body = PaginatedResponse<ItemShort>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<PaginatedResponse<ItemShort>>> {
    let (items, total) = state.services.catalog.search_items(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(12),
    }))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetailResponse),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ItemDetailResponse>> {
    let (item, related) = state.services.catalog.get_item(id).await?;
    Ok(Json(ItemDetailResponse { item, related }))
}

/// List the current user's own items
#[utoipa::path(
    get,
    path = "/items/mine",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("available" = Option<bool>, Query, description = "Filter by availability")
    ),
    responses(
        (status = 200, description = "The user's items", body = Vec<ItemShort>)
    )
)]
pub async fn my_items(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<MyItemsParams>,
) -> AppResult<Json<Vec<ItemShort>>> {
    let items = state
        .services
        .catalog
        .my_items(claims.user_id, params.available)
        .await?;
    Ok(Json(items))
}

#[derive(Deserialize)]
pub struct MyItemsParams {
    pub available: Option<bool>,
}

/// Create a new item listing
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    request_body = ItemInput,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<ItemInput>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let created = state.services.catalog.create_item(claims.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing item (owner only)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = ItemInput,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(input): Json<ItemInput>,
) -> AppResult<Json<Item>> {
    let updated = state
        .services
        .catalog
        .update_item(id, claims.user_id, input)
        .await?;
    Ok(Json(updated))
}

/// Delete an item (owner only)
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_item(id, claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle listing availability (owner only)
#[utoipa::path(
    post,
    path = "/items/{id}/availability",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Availability toggled", body = Item),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn toggle_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state
        .services
        .catalog
        .toggle_availability(id, claims.user_id)
        .await?;
    Ok(Json(item))
}

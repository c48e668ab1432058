//! Item request lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::request::{ItemRequest, RequestDetails, RequestQuery, RequestStatus},
};

use super::items::PaginatedResponse;
use super::AuthenticatedUser;

/// Response for a request submission
#[derive(Serialize, ToSchema)]
pub struct SubmitRequestResponse {
    /// Whether a new request was created; false when an existing
    /// pending/rejected request blocks the submission
    pub created: bool,
    /// Status message
    pub message: String,
    /// The created request, or the existing blocking one
    pub request: ItemRequest,
}

/// Response for accept/reject actions
#[derive(Serialize, ToSchema)]
pub struct RequestActionResponse {
    /// Status message
    pub message: String,
    /// The updated request
    pub request: ItemRequest,
}

/// Sent and received requests for the history view
#[derive(Serialize, ToSchema)]
pub struct RequestHistoryResponse {
    /// Requests made by the current user
    pub sent: Vec<RequestDetails>,
    /// Requests received on the current user's items
    pub received: Vec<RequestDetails>,
}

/// Count of pending requests on the current user's items
#[derive(Serialize, ToSchema)]
pub struct PendingCountResponse {
    pub pending_count: i64,
}

/// Submit a request for an item
#[utoipa::path(
    post,
    path = "/items/{id}/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 201, description = "Request created", body = SubmitRequestResponse),
        (status = 200, description = "Existing request already blocks this item", body = SubmitRequestResponse),
        (status = 404, description = "Item not found"),
        (status = 422, description = "Cannot request own item")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(item_id): Path<i32>,
) -> AppResult<(StatusCode, Json<SubmitRequestResponse>)> {
    let outcome = state
        .services
        .requests
        .submit_request(item_id, claims.user_id)
        .await?;

    let (status, message) = if outcome.is_created() {
        (StatusCode::CREATED, "Request has been sent".to_string())
    } else {
        (
            StatusCode::OK,
            "You have already requested this item".to_string(),
        )
    };
    let created = outcome.is_created();

    Ok((
        status,
        Json(SubmitRequestResponse {
            created,
            message,
            request: outcome.request().clone(),
        }),
    ))
}

/// List requests received on the current user's items
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests for the user's items", body = PaginatedResponse<RequestDetails>)
    )
)]
pub async fn list_received(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<PaginatedResponse<RequestDetails>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let status = RequestStatus::parse_filter(query.status.as_deref());

    let (requests, total) = state
        .services
        .requests
        .list_received(claims.user_id, status, page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items: requests,
        total,
        page,
        per_page,
    }))
}

/// List requests made by the current user
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests made by the user", body = PaginatedResponse<RequestDetails>)
    )
)]
pub async fn list_sent(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<PaginatedResponse<RequestDetails>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let status = RequestStatus::parse_filter(query.status.as_deref());

    let (requests, total) = state
        .services
        .requests
        .list_sent(claims.user_id, status, page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items: requests,
        total,
        page,
        per_page,
    }))
}

/// Sent and received request history
#[utoipa::path(
    get,
    path = "/requests/history",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Status filter; unknown values are ignored")
    ),
    responses(
        (status = 200, description = "Request history", body = RequestHistoryResponse)
    )
)]
pub async fn request_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<RequestHistoryResponse>> {
    let status = RequestStatus::parse_filter(query.status.as_deref());
    let (sent, received) = state.services.requests.history(claims.user_id, status).await?;

    Ok(Json(RequestHistoryResponse { sent, received }))
}

/// Count pending requests on the current user's items
#[utoipa::path(
    get,
    path = "/requests/pending-count",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending request count", body = PendingCountResponse)
    )
)]
pub async fn pending_count(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<PendingCountResponse>> {
    let pending_count = state.services.requests.pending_count(claims.user_id).await?;
    Ok(Json(PendingCountResponse { pending_count }))
}

/// Get request details
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestDetails),
        (status = 403, description = "Not the requester or item owner"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<RequestDetails>> {
    let details = state
        .services
        .requests
        .get_detail(request_id, claims.user_id)
        .await?;
    Ok(Json(details))
}

/// Accept a request for an owned item
#[utoipa::path(
    post,
    path = "/requests/{id}/accept",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request accepted", body = RequestActionResponse),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn accept_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<RequestActionResponse>> {
    let request = state
        .services
        .requests
        .accept_request(request_id, claims.user_id)
        .await?;

    Ok(Json(RequestActionResponse {
        message: "Request has been accepted".to_string(),
        request,
    }))
}

/// Reject a request for an owned item
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request rejected", body = RequestActionResponse),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(request_id): Path<i32>,
) -> AppResult<Json<RequestActionResponse>> {
    let request = state
        .services
        .requests
        .reject_request(request_id, claims.user_id)
        .await?;

    Ok(Json(RequestActionResponse {
        message: "Request has been rejected".to_string(),
        request,
    }))
}

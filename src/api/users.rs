//! User profile endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::user::UserShort};

use super::AuthenticatedUser;

/// Get a user's public profile
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = UserShort),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserShort>> {
    let profile = state.services.auth.get_profile(id).await?;
    Ok(Json(profile))
}

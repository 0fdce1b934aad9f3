// HTTP handlers for staff listing endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::{ApiError, ErrorResponse};
use crate::extractors::EntityId;
use crate::query::{QueryValidator, UserListParams};
use crate::users::models::{DoctorListEnvelope, UserEnvelope, UserListEnvelope};
use crate::AppState;

/// List accounts, optionally restricted to a comma-separated role set
#[utoipa::path(
    get,
    path = "/users",
    params(UserListParams),
    responses(
        (status = 200, description = "Matching accounts (possibly empty)", body = UserListEnvelope),
        (status = 400, description = "Unknown role name", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<UserListEnvelope>, ApiError> {
    let roles = QueryValidator::role_filter(params)?;
    let users = state.user_service.list(&roles).await?;
    Ok(Json(UserListEnvelope { users }))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account with appointments", body = UserEnvelope),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = state.user_service.get(id).await?;
    Ok(Json(UserEnvelope { user }))
}

#[utoipa::path(
    get,
    path = "/doctors",
    responses(
        (status = 200, description = "All doctors (possibly empty)", body = DoctorListEnvelope)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<DoctorListEnvelope>, ApiError> {
    let doctors = state.user_service.list_doctors().await?;
    Ok(Json(DoctorListEnvelope { doctors }))
}

use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Json;
use crate::models::User;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingUserAction {
    pub user_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/admin/pending-users",
    responses((status = 200, description = "Accounts awaiting approval, oldest first", body = [User])),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "pending-users"
)]
pub async fn list_pending(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.pending_users().await)
}

#[utoipa::path(
    post,
    path = "/api/admin/pending-users",
    request_body = PendingUserAction,
    responses(
        (status = 200, description = "Approved user", body = User),
        (status = 400, description = "User is not pending"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "pending-users"
)]
pub async fn approve(
    State(state): State<AppState>,
    Json(body): Json<PendingUserAction>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.approve_user(body.user_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/pending-users",
    request_body = PendingUserAction,
    responses(
        (status = 200, description = "Declined and deleted user", body = User),
        (status = 400, description = "User is not pending"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "pending-users"
)]
pub async fn decline(
    State(state): State<AppState>,
    Json(body): Json<PendingUserAction>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.decline_user(body.user_id).await?))
}

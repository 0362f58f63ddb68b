use axum::{extract::State, response::IntoResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::models::{ClientPackage, ClientView, Notification, PackageType, User};
use crate::query::{ClientQuery, filter_clients};

#[utoipa::path(
    get,
    path = "/api/admin/clients",
    params(ClientQuery),
    responses(
        (status = 200, description = "Clients with package status", body = [ClientView]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> impl IntoResponse {
    let clients = state.store.client_views(state.settings.today()).await;
    Json(filter_clients(clients, &query))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReminderResult {
    pub success: bool,
    pub notification: Notification,
}

/// Email delivery is not wired up; the reminder is logged and recorded as a
/// notification.
#[utoipa::path(
    post,
    path = "/api/admin/clients/{id}/remind",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Reminder recorded", body = ReminderResult),
        (status = 400, description = "No active package or reminders disabled"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn remind(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state.store.send_reminder(id, state.settings.today()).await?;
    Ok(Json(ReminderResult {
        success: true,
        notification,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPackage {
    pub package_type: PackageType,
    /// Overrides the class count of limited packages.
    pub total_classes: Option<u32>,
}

#[utoipa::path(
    post,
    path = "/api/admin/clients/{id}/assign-package",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = AssignPackage,
    responses(
        (status = 200, description = "New active package", body = ClientPackage),
        (status = 400, description = "Invalid package"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn assign_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignPackage>,
) -> Result<impl IntoResponse, ApiError> {
    if body.total_classes == Some(0) {
        return Err(ApiError::BadRequest("totalClasses must be at least 1".into()));
    }
    let package = state
        .store
        .assign_package(id, body.package_type, body.total_classes, state.settings.today())
        .await?;
    Ok(Json(package))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustClasses {
    pub package_id: Uuid,
    pub new_classes_remaining: u32,
    #[serde(default)]
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/admin/clients/{id}/adjust-classes",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = AdjustClasses,
    responses(
        (status = 200, description = "Adjusted package", body = ClientPackage),
        (status = 400, description = "No active package or count above total"),
        (status = 404, description = "Client or package not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn adjust_classes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AdjustClasses>,
) -> Result<impl IntoResponse, ApiError> {
    let package = state
        .store
        .adjust_classes(
            id,
            body.package_id,
            body.new_classes_remaining,
            state.settings.today(),
        )
        .await?;
    info!(client_id = %id, reason = %body.reason, "class adjustment reason");
    Ok(Json(package))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClasses {
    pub client_id: Uuid,
    pub package_id: Uuid,
    pub classes_remaining: u32,
}

#[utoipa::path(
    post,
    path = "/api/admin/clients/update-classes",
    request_body = UpdateClasses,
    responses(
        (status = 200, description = "Adjusted package", body = ClientPackage),
        (status = 400, description = "No active package or count above total"),
        (status = 404, description = "Client or package not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn update_classes(
    State(state): State<AppState>,
    Json(body): Json<UpdateClasses>,
) -> Result<impl IntoResponse, ApiError> {
    let package = state
        .store
        .adjust_classes(
            body.client_id,
            body.package_id,
            body.classes_remaining,
            state.settings.today(),
        )
        .await?;
    Ok(Json(package))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpiration {
    pub client_id: Uuid,
    pub package_id: Uuid,
    #[schema(value_type = String, format = "date")]
    pub new_expiration_date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/api/admin/clients/update-expiration",
    request_body = UpdateExpiration,
    responses(
        (status = 200, description = "Package with new end date", body = ClientPackage),
        (status = 404, description = "Client or package not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn update_expiration(
    State(state): State<AppState>,
    Json(body): Json<UpdateExpiration>,
) -> Result<impl IntoResponse, ApiError> {
    let package = state
        .store
        .update_expiration(body.client_id, body.package_id, body.new_expiration_date)
        .await?;
    Ok(Json(package))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<User>,
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "Approved users", body = UserList)),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    Json(UserList {
        users: state.store.bookable_users().await,
    })
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted user with their bookings and packages", body = User),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.delete_user(id).await?))
}

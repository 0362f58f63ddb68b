use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Query};
use crate::models::{Notification, NotificationType, Role, UserSummary};
use crate::validation::validate_limit;

const SAMPLE_CANCELLATIONS: [&str; 3] = [
    "John Smith cancelled CrossFit WOD on Mon, Nov 18 at 8:00 AM",
    "Sarah Johnson cancelled CrossFit HIIT on Tue, Nov 19 at 6:00 PM",
    "Mike Davis cancelled CrossFit Strength on Wed, Nov 20 at 7:00 AM",
];

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    pub unread_only: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[utoipa::path(
    get,
    path = "/api/admin/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationList),
        (status = 400, description = "Invalid limit")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.map(validate_limit).transpose()?;
    let notifications = state.store.notifications(query.unread_only, limit).await;
    let unread_count = state.store.unread_count().await;
    Ok(Json(NotificationList {
        notifications,
        unread_count,
    }))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkRead {
    pub notification_ids: Vec<Uuid>,
    pub mark_all_read: bool,
}

#[utoipa::path(
    put,
    path = "/api/admin/notifications",
    request_body = MarkRead,
    responses(
        (status = 200, description = "Number of notifications marked read"),
        (status = 400, description = "Nothing to update")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Json(body): Json<MarkRead>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = if body.mark_all_read {
        state.store.mark_all_read().await
    } else if !body.notification_ids.is_empty() {
        state.store.mark_read(&body.notification_ids).await
    } else {
        return Err(ApiError::BadRequest(
            "Provide notificationIds or markAllRead".into(),
        ));
    };
    Ok(Json(serde_json::json!({ "success": true, "updated": updated })))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationId {
    pub id: Uuid,
}

#[utoipa::path(
    delete,
    path = "/api/admin/notifications",
    params(NotificationId),
    responses(
        (status = 200, description = "Deleted notification", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Query(query): Query<NotificationId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.delete_notification(query.id).await?))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCheck {
    pub notifications: Vec<Notification>,
    pub admin_users: Vec<UserSummary>,
    pub unread_count: usize,
    pub total_notifications: usize,
}

/// Diagnostic view: the ten latest notifications and who receives them.
#[utoipa::path(
    get,
    path = "/api/admin/check-notifications",
    responses((status = 200, description = "Notification diagnostics", body = NotificationCheck)),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn check_notifications(State(state): State<AppState>) -> impl IntoResponse {
    let (notifications, admins, unread_count) = futures::join!(
        state.store.notifications(false, Some(10)),
        state.store.list_users(Some(Role::Admin)),
        state.store.unread_count(),
    );
    Json(NotificationCheck {
        total_notifications: notifications.len(),
        notifications,
        admin_users: admins.iter().map(UserSummary::from).collect(),
        unread_count,
    })
}

#[utoipa::path(
    post,
    path = "/api/admin/test-notifications",
    responses((status = 200, description = "Sample cancellation notifications created")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn create_test_notifications(State(state): State<AppState>) -> impl IntoResponse {
    for message in SAMPLE_CANCELLATIONS {
        state
            .store
            .push_notification(NotificationType::AdminCancellation, message.to_string())
            .await;
    }
    let created = SAMPLE_CANCELLATIONS.len();
    Json(serde_json::json!({
        "success": true,
        "message": format!("Created {created} test notifications"),
        "testMessages": SAMPLE_CANCELLATIONS,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admin/test-notifications",
    responses((status = 200, description = "Cancellation notifications cleared")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "notifications"
)]
pub async fn clear_test_notifications(State(state): State<AppState>) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_notifications_of(NotificationType::AdminCancellation)
        .await;
    Json(serde_json::json!({
        "success": true,
        "message": format!("Cleared {deleted} notifications"),
        "deletedCount": deleted,
    }))
}

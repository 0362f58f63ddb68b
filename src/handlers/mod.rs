pub mod bookings;
pub mod classes;
pub mod clients;
pub mod notifications;
pub mod pending_users;
pub mod studio;

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::extract::Json;
use crate::models::{ClassView, Notification};
use crate::schedule::time_sort_key;

#[utoipa::path(get, path = "/", tag = "health")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Gym Admin API",
        "endpoints": {
            "/api/admin/dashboard": "Dashboard summary",
            "/api/admin/classes": "Manage classes",
            "/api/admin/bookings": "Manage bookings",
            "/api/admin/clients": "Manage clients and packages",
            "/api/admin/pending-users": "Approve new registrations",
            "/api/admin/notifications": "Admin notifications",
            "/api/admin/settings": "Studio settings"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "health")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "health")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

const UPCOMING_CLASSES: usize = 5;
const RECENT_NOTIFICATIONS: usize = 5;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub upcoming_classes: Vec<ClassView>,
    pub client_count: usize,
    pub expiring_packages: usize,
    pub pending_users: usize,
    pub unread_notifications: usize,
    pub recent_notifications: Vec<Notification>,
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardSummary),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let today = state.settings.today();
    let store = &state.store;

    let (classes, clients, expiring, pending, unread, recent) = futures::join!(
        store.class_views(),
        store.client_views(today),
        store.expiring_clients(today),
        store.pending_users(),
        store.unread_count(),
        store.notifications(false, Some(RECENT_NOTIFICATIONS)),
    );

    let mut upcoming: Vec<ClassView> = classes
        .into_iter()
        .filter(|c| c.class.enabled && c.class.date >= today)
        .collect();
    upcoming.sort_by_key(|c| (c.class.date, time_sort_key(&c.class.time)));
    upcoming.truncate(UPCOMING_CLASSES);

    Json(DashboardSummary {
        upcoming_classes: upcoming,
        client_count: clients.len(),
        expiring_packages: expiring,
        pending_users: pending.len(),
        unread_notifications: unread,
        recent_notifications: recent,
    })
}

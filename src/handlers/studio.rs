use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Json;
use crate::models::{SettingsUpdate, StudioSettings};
use crate::validation::{validate_capacity, validate_package_duration};

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsEnvelope {
    pub settings: StudioSettings,
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses((status = 200, description = "Studio settings", body = SettingsEnvelope)),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    Json(SettingsEnvelope {
        settings: state.store.studio_settings().await,
    })
}

/// Replaces one section: `{"section": "general" | "notifications" | "packages", "settings": {...}}`.
#[utoipa::path(
    post,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "Updated studio settings", body = SettingsEnvelope),
        (status = 400, description = "Invalid settings")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    match &update {
        SettingsUpdate::General(general) => {
            validate_capacity(general.class_capacity)?;
        }
        SettingsUpdate::Notifications(notifications) if notifications.reminder_days < 0 => {
            return Err(ApiError::BadRequest("reminderDays cannot be negative".into()));
        }
        SettingsUpdate::Packages(packages) => {
            validate_package_duration(packages.package_duration)?;
        }
        _ => {}
    }
    let settings = state.store.update_studio_settings(update).await;
    Ok(Json(SettingsEnvelope { settings }))
}

/// Full store contents in the same JSON layout the data file is loaded from.
#[utoipa::path(
    get,
    path = "/api/admin/export",
    responses((status = 200, description = "Snapshot of users, classes, bookings, packages, notifications and settings")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "settings"
)]
pub async fn export_data(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    info!(
        users = snapshot.users.len(),
        classes = snapshot.classes.len(),
        "exported store snapshot"
    );
    Json(snapshot)
}

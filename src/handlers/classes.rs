use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::models::{Booking, Class, ClassView, User};
use crate::query::{ClassQuery, available_users, filter_classes};
use crate::schedule::{
    ScheduleStatus, WeekGroup, day_name, default_year_schedule, group_classes_by_week,
    schedule_status,
};
use crate::validation::{normalize_time, validate_capacity, validate_name};

#[utoipa::path(
    get,
    path = "/api/admin/classes",
    params(ClassQuery),
    responses(
        (status = 200, description = "Classes with their bookings", body = [ClassView]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    Query(query): Query<ClassQuery>,
) -> impl IntoResponse {
    Json(filter_classes(state.store.class_views().await, &query))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub time: String,
    pub capacity: Option<u32>,
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes",
    request_body = NewClass,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Invalid class data")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    Json(body): Json<NewClass>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&body.name)?;
    let time = normalize_time(&body.time)?;
    let capacity = match body.capacity {
        Some(capacity) => capacity,
        None => state.store.studio_settings().await.general.class_capacity,
    };
    let capacity = validate_capacity(capacity)?;

    let class = Class {
        id: Uuid::new_v4(),
        name,
        day: day_name(body.date).to_string(),
        date: body.date,
        time,
        capacity,
        enabled: body.enabled.unwrap_or(true),
        description: body.description.filter(|d| !d.trim().is_empty()),
    };
    let class = state.store.insert_class(class).await;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Deleted class", body = Class),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.delete_class(id).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleEnabled {
    pub enabled: bool,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/{id}/toggle-enabled",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = ToggleEnabled,
    responses(
        (status = 200, description = "Updated class", body = Class),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn toggle_enabled(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ToggleEnabled>,
) -> Result<impl IntoResponse, ApiError> {
    let class = state.store.set_class_enabled(id, body.enabled).await?;
    info!(class_id = %id, enabled = body.enabled, "toggled class");
    Ok(Json(class))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchToggle {
    pub class_ids: Vec<Uuid>,
    pub enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchToggleResult {
    pub updated_count: usize,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/batch-toggle",
    request_body = BatchToggle,
    responses(
        (status = 200, description = "Number of classes updated", body = BatchToggleResult),
        (status = 400, description = "No class ids given")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn batch_toggle(
    State(state): State<AppState>,
    Json(body): Json<BatchToggle>,
) -> Result<impl IntoResponse, ApiError> {
    if body.class_ids.is_empty() {
        return Err(ApiError::BadRequest("classIds must not be empty".into()));
    }
    let updated_count = state
        .store
        .set_classes_enabled(&body.class_ids, body.enabled)
        .await;
    Ok(Json(BatchToggleResult { updated_count }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddUser {
    pub user_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/{id}/add-user",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = AddUser,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "User not approved"),
        (status = 404, description = "Class or user not found"),
        (status = 409, description = "Class full or user already booked")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn add_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddUser>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .store
        .add_user_to_class(id, body.user_id, state.settings.today())
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUser {
    pub booking_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/{id}/remove-user",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = RemoveUser,
    responses(
        (status = 200, description = "Removed booking", body = Booking),
        (status = 404, description = "Booking not found in this class")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RemoveUser>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .store
        .remove_booking_from_class(id, body.booking_id, state.settings.today())
        .await?;
    Ok(Json(booking))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearch {
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/admin/classes/{id}/available-users",
    params(("id" = Uuid, Path, description = "Class id"), UserSearch),
    responses(
        (status = 200, description = "Users that can be added to the class", body = [User]),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn list_available_users(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let class = state.store.class_view(id).await?;
    let users = state.store.bookable_users().await;
    Ok(Json(available_users(users, &class, query.search.as_deref())))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedClasses {
    pub deleted: usize,
    pub deleted_class_ids: Vec<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/delete-past",
    responses((status = 200, description = "Classes older than 7 days removed", body = DeletedClasses)),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn delete_past(State(state): State<AppState>) -> impl IntoResponse {
    let deleted_class_ids = state
        .store
        .delete_past_classes(state.settings.today())
        .await;
    Json(DeletedClasses {
        deleted: deleted_class_ids.len(),
        deleted_class_ids,
    })
}

#[utoipa::path(
    delete,
    path = "/api/admin/classes/clear-all",
    responses((status = 200, description = "All classes removed")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn clear_all(State(state): State<AppState>) -> impl IntoResponse {
    let deleted = state.store.clear_classes().await;
    Json(serde_json::json!({ "deleted": deleted }))
}

#[utoipa::path(
    post,
    path = "/api/admin/classes/generate-default-schedule",
    responses((status = 200, description = "Year-long weekday schedule created")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn generate_default_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let capacity = state.store.studio_settings().await.general.class_capacity;
    let classes = default_year_schedule(state.settings.today(), capacity);
    let total_classes_created = state.store.insert_generated_classes(classes).await;
    Json(serde_json::json!({ "totalClassesCreated": total_classes_created }))
}

#[utoipa::path(
    get,
    path = "/api/admin/classes/status",
    responses((status = 200, description = "Whether a year schedule exists", body = ScheduleStatus)),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(schedule_status(state.store.count_classes().await))
}

#[utoipa::path(
    get,
    path = "/api/admin/classes/weeks",
    responses((status = 200, description = "Classes grouped by week and day", body = [WeekGroup])),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn weeks(State(state): State<AppState>) -> impl IntoResponse {
    Json(group_classes_by_week(state.store.class_views().await))
}

#[utoipa::path(
    get,
    path = "/api/admin/classes.ical",
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 404, description = "No classes found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn export_ical(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let classes: Vec<Class> = state
        .store
        .class_views()
        .await
        .into_iter()
        .map(|view| view.class)
        .collect();
    if classes.is_empty() {
        return Err(ApiError::NotFound("No classes found".into()));
    }

    let studio = state.store.studio_settings().await.general;
    let body = state.exporter.generate(&studio, &classes);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            ("content-disposition", "attachment; filename=classes.ics"),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/update-class-capacities",
    responses((status = 200, description = "Upcoming classes set to the default capacity")),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn update_capacities(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let capacity = state.store.studio_settings().await.general.class_capacity;
    let capacity = validate_capacity(capacity)?;
    let updated = state
        .store
        .update_capacities(state.settings.today(), capacity)
        .await;
    Ok(Json(serde_json::json!({
        "updated": updated,
        "message": format!("Updated {updated} classes to capacity {capacity}")
    })))
}

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::models::BookingView;
use crate::query::{BookingQuery, filter_bookings};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub bookings: Vec<BookingView>,
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = BookingList),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> impl IntoResponse {
    let bookings = filter_bookings(state.store.booking_views().await, &query);
    Json(BookingList { bookings })
}

#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Cancelled booking", body = BookingView),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking already cancelled")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .store
        .cancel_booking(id, state.settings.today())
        .await?;
    Ok(Json(booking))
}

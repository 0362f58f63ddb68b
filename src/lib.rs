pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod ical;
pub mod models;
pub mod openapi;
pub mod packages;
pub mod query;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod validation;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use handlers::{bookings, classes, clients, notifications, pending_users, studio};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ical::ICalExporter;
use crate::openapi::ApiDoc;
use crate::settings::Settings;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<Store>,
    pub exporter: Arc<ICalExporter>,
}

impl AppState {
    pub fn new(settings: Settings, store: Store) -> Self {
        Self {
            settings,
            store: Arc::new(store),
            exporter: Arc::new(ICalExporter::new()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let store = match &settings.data_file {
        Some(path) => Store::load(Path::new(path)).await?,
        None => Store::new(),
    };
    let state = AppState::new(settings.clone(), store);

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!(timezone = %state.settings.timezone, "Starting Gym Admin API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route(
            "/classes",
            get(classes::list_classes).post(classes::create_class),
        )
        .route("/classes.ical", get(classes::export_ical))
        .route("/classes/status", get(classes::status))
        .route("/classes/weeks", get(classes::weeks))
        .route("/classes/batch-toggle", post(classes::batch_toggle))
        .route("/classes/delete-past", post(classes::delete_past))
        .route("/classes/clear-all", delete(classes::clear_all))
        .route(
            "/classes/generate-default-schedule",
            post(classes::generate_default_schedule),
        )
        .route("/classes/{id}", delete(classes::delete_class))
        .route("/classes/{id}/toggle-enabled", post(classes::toggle_enabled))
        .route("/classes/{id}/add-user", post(classes::add_user))
        .route("/classes/{id}/remove-user", post(classes::remove_user))
        .route(
            "/classes/{id}/available-users",
            get(classes::list_available_users),
        )
        .route("/update-class-capacities", post(classes::update_capacities))
        .route("/clients", get(clients::list_clients))
        .route("/clients/update-classes", post(clients::update_classes))
        .route("/clients/update-expiration", post(clients::update_expiration))
        .route("/clients/{id}/remind", post(clients::remind))
        .route("/clients/{id}/assign-package", post(clients::assign_package))
        .route("/clients/{id}/adjust-classes", post(clients::adjust_classes))
        .route("/users", get(clients::list_users))
        .route("/users/{id}", delete(clients::delete_user))
        .route(
            "/pending-users",
            get(pending_users::list_pending)
                .post(pending_users::approve)
                .delete(pending_users::decline),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications)
                .put(notifications::mark_read)
                .delete(notifications::delete_notification),
        )
        .route(
            "/check-notifications",
            get(notifications::check_notifications),
        )
        .route(
            "/test-notifications",
            post(notifications::create_test_notifications)
                .delete(notifications::clear_test_notifications),
        )
        .route(
            "/settings",
            get(studio::get_settings).post(studio::update_settings),
        )
        .route("/export", get(studio::export_data))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz/live", get(handlers::healthz_live))
        .route("/healthz/ready", get(handlers::healthz_ready))
        .nest("/api/admin", admin_routes(state.clone()))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    if state.settings.debug {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(trace_layer)
}

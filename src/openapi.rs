use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{
    DashboardSummary, bookings, classes, clients, notifications, pending_users, studio,
};
use crate::models::{
    Booking, BookingStatus, BookingView, Class, ClassBooking, ClassView, ClientPackage,
    ClientStatus, ClientView, GeneralSettings, Notification, NotificationSettings,
    NotificationType, PackageSettings, PackageType, PackageView, Role, StudioSettings, User,
    UserSummary,
};
use crate::schedule::{DayGroup, ScheduleStatus, WeekGroup};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::dashboard,
        bookings::list_bookings,
        bookings::cancel_booking,
        classes::list_classes,
        classes::create_class,
        classes::delete_class,
        classes::toggle_enabled,
        classes::batch_toggle,
        classes::add_user,
        classes::remove_user,
        classes::list_available_users,
        classes::delete_past,
        classes::clear_all,
        classes::generate_default_schedule,
        classes::status,
        classes::weeks,
        classes::export_ical,
        classes::update_capacities,
        clients::list_clients,
        clients::remind,
        clients::assign_package,
        clients::adjust_classes,
        clients::update_classes,
        clients::update_expiration,
        clients::list_users,
        clients::delete_user,
        pending_users::list_pending,
        pending_users::approve,
        pending_users::decline,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::delete_notification,
        notifications::check_notifications,
        notifications::create_test_notifications,
        notifications::clear_test_notifications,
        studio::get_settings,
        studio::update_settings,
        studio::export_data
    ),
    components(schemas(
        Role,
        User,
        UserSummary,
        Class,
        ClassBooking,
        ClassView,
        Booking,
        BookingStatus,
        BookingView,
        PackageType,
        ClientPackage,
        PackageView,
        ClientStatus,
        ClientView,
        NotificationType,
        Notification,
        GeneralSettings,
        NotificationSettings,
        PackageSettings,
        StudioSettings,
        DayGroup,
        WeekGroup,
        ScheduleStatus,
        DashboardSummary
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "dashboard", description = "Admin dashboard summary"),
        (name = "bookings", description = "Class bookings"),
        (name = "classes", description = "Class schedule management"),
        (name = "clients", description = "Clients and their packages"),
        (name = "pending-users", description = "Registration approval"),
        (name = "notifications", description = "Admin notifications"),
        (name = "settings", description = "Studio settings")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    /// Weekday name derived from `date`, e.g. `Monday`.
    pub day: String,
    #[schema(value_type = String, format = "date", example = "2025-11-24")]
    pub date: NaiveDate,
    /// Start time as displayed to clients, e.g. `7:00 AM`.
    pub time: String,
    pub capacity: u32,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub class_id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum PackageType {
    #[serde(rename = "8-class")]
    EightClass,
    #[serde(rename = "12-class")]
    TwelveClass,
    #[serde(rename = "unlimited")]
    Unlimited,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPackage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub package_type: PackageType,
    /// `None` for unlimited packages.
    pub total_classes: Option<u32>,
    pub classes_remaining: Option<u32>,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AdminCancellation,
    RenewalReminder,
    NewRegistration,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub studio_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cancel_hours: u32,
    pub class_capacity: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            studio_name: "GymXam".to_string(),
            email: "info@gymxam.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            address: "123 Fitness Ave, New York, NY 10001".to_string(),
            cancel_hours: 8,
            class_capacity: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub send_booking_confirmations: bool,
    pub send_cancellation_notifications: bool,
    pub send_renewal_reminders: bool,
    pub reminder_days: i64,
    pub allow_client_emails: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            send_booking_confirmations: true,
            send_cancellation_notifications: true,
            send_renewal_reminders: true,
            reminder_days: 7,
            allow_client_emails: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageSettings {
    pub package8_price: u32,
    pub package12_price: u32,
    pub package_duration: i64,
    pub allow_auto_renewal: bool,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            package8_price: 120,
            package12_price: 160,
            package_duration: 30,
            allow_auto_renewal: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(default)]
pub struct StudioSettings {
    pub general: GeneralSettings,
    pub notifications: NotificationSettings,
    pub packages: PackageSettings,
}

/// Body of `POST /api/admin/settings`: one section replaced at a time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "section", content = "settings", rename_all = "lowercase")]
pub enum SettingsUpdate {
    General(GeneralSettings),
    Notifications(NotificationSettings),
    Packages(PackageSettings),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassView {
    #[serde(flatten)]
    pub class: Class,
    pub current_bookings: u32,
    pub bookings: Vec<ClassBooking>,
}

impl ClassView {
    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.class.capacity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub class_id: Uuid,
    pub class_name: String,
    #[schema(value_type = String, format = "date")]
    pub class_date: NaiveDate,
    pub class_time: String,
    pub client: UserSummary,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageView {
    pub id: Uuid,
    pub name: String,
    pub package_type: PackageType,
    pub total_classes: Option<u32>,
    pub classes_remaining: Option<u32>,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Warning,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// The current package, if any.
    pub package: Option<PackageView>,
    pub packages: Vec<PackageView>,
    pub status: ClientStatus,
    pub join_date: DateTime<Utc>,
    pub total_bookings: u32,
    pub next_class: Option<String>,
}

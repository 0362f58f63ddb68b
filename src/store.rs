use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    Booking, BookingStatus, BookingView, Class, ClassBooking, ClassView, ClientPackage,
    ClientView, Notification, NotificationType, PackageType, Role, SettingsUpdate,
    StudioSettings, User, UserSummary,
};
use crate::packages::{client_status, in_reminder_window};
use crate::schedule::time_sort_key;

/// Classes dated further back than this are removed by past-class cleanup.
pub const PAST_CLASS_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),
    #[error("Class {0} not found")]
    ClassNotFound(Uuid),
    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),
    #[error("Package {0} not found")]
    PackageNotFound(Uuid),
    #[error("Notification {0} not found")]
    NotificationNotFound(Uuid),
    #[error("User {0} is not pending approval")]
    NotPending(Uuid),
    #[error("User {0} has not been approved yet")]
    NotApproved(Uuid),
    #[error("User is already booked into this class")]
    AlreadyBooked,
    #[error("Class is full")]
    ClassFull,
    #[error("Booking is already cancelled")]
    AlreadyCancelled,
    #[error("No active package found for this client")]
    NoActivePackage,
    #[error("Package does not belong to this client")]
    PackageOwnerMismatch,
    #[error("Classes remaining cannot exceed the package total of {0}")]
    ExceedsPackageTotal(u32),
    #[error("Package duration of {0} days is out of range")]
    InvalidDuration(i64),
    #[error("Unlimited packages have no class count")]
    UnlimitedPackage,
    #[error("Renewal reminders are disabled in settings")]
    RemindersDisabled,
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full contents of the store, used for seeding and export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub classes: Vec<Class>,
    pub bookings: Vec<Booking>,
    pub packages: Vec<ClientPackage>,
    pub notifications: Vec<Notification>,
    pub settings: StudioSettings,
}

impl Snapshot {
    fn user(&self, id: Uuid) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))
    }

    fn class(&self, id: Uuid) -> Result<&Class, StoreError> {
        self.classes
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::ClassNotFound(id))
    }

    fn current_package_mut(&mut self, user_id: Uuid, today: NaiveDate) -> Option<&mut ClientPackage> {
        self.packages
            .iter_mut()
            .filter(|p| p.user_id == user_id && p.is_current(today))
            .max_by_key(|p| p.end_date)
    }

    fn current_package(&self, user_id: Uuid, today: NaiveDate) -> Option<&ClientPackage> {
        self.packages
            .iter()
            .filter(|p| p.user_id == user_id && p.is_current(today))
            .max_by_key(|p| p.end_date)
    }

    fn class_view(&self, class: &Class) -> ClassView {
        let bookings: Vec<ClassBooking> = self
            .bookings
            .iter()
            .filter(|b| b.class_id == class.id)
            .filter_map(|b| {
                let user = self.user(b.user_id).ok()?;
                Some(ClassBooking {
                    id: b.id,
                    user_id: b.user_id,
                    status: b.status,
                    created_at: b.created_at,
                    user: UserSummary::from(user),
                })
            })
            .collect();
        let current_bookings = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Active)
            .count() as u32;
        ClassView {
            class: class.clone(),
            current_bookings,
            bookings,
        }
    }

    fn booking_view(&self, booking: &Booking) -> Option<BookingView> {
        let class = self.class(booking.class_id).ok()?;
        let user = self.user(booking.user_id).ok()?;
        Some(BookingView {
            id: booking.id,
            class_id: class.id,
            class_name: class.name.clone(),
            class_date: class.date,
            class_time: class.time.clone(),
            client: UserSummary::from(user),
            status: booking.status,
            created_at: booking.created_at,
        })
    }

    fn push_notification(&mut self, kind: NotificationType, message: String) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message,
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.push(notification.clone());
        notification
    }
}

/// `Mon, Nov 24 at 7:00 AM`
pub fn describe_slot(class: &Class) -> String {
    format!("{} at {}", class.date.format("%a, %b %-d"), class.time)
}

/// In-memory record store shared by all handlers.
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<Snapshot>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read(path).await?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        info!(
            path = %path.display(),
            users = snapshot.users.len(),
            classes = snapshot.classes.len(),
            "loaded data file"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    // ---- users ----

    pub async fn insert_user(&self, user: User) -> User {
        self.data.write().await.users.push(user.clone());
        user
    }

    pub async fn list_users(&self, role: Option<Role>) -> Vec<User> {
        let data = self.data.read().await;
        data.users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect()
    }

    /// Approved accounts that can be booked into classes.
    pub async fn bookable_users(&self) -> Vec<User> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data
            .users
            .iter()
            .filter(|u| u.role != Role::Pending)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.name.to_lowercase());
        users
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<User, StoreError> {
        let mut data = self.data.write().await;
        let idx = data
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;
        let user = data.users.remove(idx);
        data.bookings.retain(|b| b.user_id != id);
        data.packages.retain(|p| p.user_id != id);
        info!(user_id = %id, "deleted user");
        Ok(user)
    }

    pub async fn pending_users(&self) -> Vec<User> {
        let mut users = self.list_users(Some(Role::Pending)).await;
        users.sort_by_key(|u| u.created_at);
        users
    }

    pub async fn approve_user(&self, id: Uuid) -> Result<User, StoreError> {
        let mut data = self.data.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;
        if user.role != Role::Pending {
            return Err(StoreError::NotPending(id));
        }
        user.role = Role::Client;
        info!(user_id = %id, "approved user");
        Ok(user.clone())
    }

    pub async fn decline_user(&self, id: Uuid) -> Result<User, StoreError> {
        let mut data = self.data.write().await;
        let idx = data
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::UserNotFound(id))?;
        if data.users[idx].role != Role::Pending {
            return Err(StoreError::NotPending(id));
        }
        let user = data.users.remove(idx);
        info!(user_id = %id, "declined user");
        Ok(user)
    }

    // ---- classes ----

    pub async fn class_views(&self) -> Vec<ClassView> {
        let data = self.data.read().await;
        data.classes.iter().map(|c| data.class_view(c)).collect()
    }

    pub async fn class_view(&self, id: Uuid) -> Result<ClassView, StoreError> {
        let data = self.data.read().await;
        let class = data.class(id)?;
        Ok(data.class_view(class))
    }

    pub async fn insert_class(&self, class: Class) -> Class {
        info!(class_id = %class.id, name = %class.name, date = %class.date, "created class");
        self.data.write().await.classes.push(class.clone());
        class
    }

    pub async fn delete_class(&self, id: Uuid) -> Result<Class, StoreError> {
        let mut data = self.data.write().await;
        let idx = data
            .classes
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::ClassNotFound(id))?;
        let class = data.classes.remove(idx);
        data.bookings.retain(|b| b.class_id != id);
        info!(class_id = %id, "deleted class");
        Ok(class)
    }

    pub async fn set_class_enabled(&self, id: Uuid, enabled: bool) -> Result<Class, StoreError> {
        let mut data = self.data.write().await;
        let class = data
            .classes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::ClassNotFound(id))?;
        class.enabled = enabled;
        Ok(class.clone())
    }

    /// Unknown ids are skipped; returns how many classes were updated.
    pub async fn set_classes_enabled(&self, ids: &[Uuid], enabled: bool) -> usize {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for class in data.classes.iter_mut().filter(|c| ids.contains(&c.id)) {
            class.enabled = enabled;
            updated += 1;
        }
        info!(requested = ids.len(), updated, enabled, "batch toggled classes");
        updated
    }

    pub async fn count_classes(&self) -> usize {
        self.data.read().await.classes.len()
    }

    pub async fn clear_classes(&self) -> usize {
        let mut data = self.data.write().await;
        let deleted = data.classes.len();
        data.classes.clear();
        data.bookings.clear();
        info!(deleted, "cleared all classes");
        deleted
    }

    pub async fn delete_past_classes(&self, today: NaiveDate) -> Vec<Uuid> {
        let cutoff = today - Duration::days(PAST_CLASS_RETENTION_DAYS);
        let mut data = self.data.write().await;
        let deleted: Vec<Uuid> = data
            .classes
            .iter()
            .filter(|c| c.date < cutoff)
            .map(|c| c.id)
            .collect();
        data.classes.retain(|c| c.date >= cutoff);
        data.bookings.retain(|b| !deleted.contains(&b.class_id));
        info!(deleted = deleted.len(), %cutoff, "deleted past classes");
        deleted
    }

    /// Adds generated classes, skipping any (date, time) slot already taken.
    pub async fn insert_generated_classes(&self, classes: Vec<Class>) -> usize {
        let mut data = self.data.write().await;
        let mut created = 0;
        for class in classes {
            let taken = data
                .classes
                .iter()
                .any(|c| c.date == class.date && c.time == class.time);
            if taken {
                continue;
            }
            data.classes.push(class);
            created += 1;
        }
        info!(created, "generated classes");
        created
    }

    /// Sets the capacity of every class from `today` onwards.
    pub async fn update_capacities(&self, today: NaiveDate, capacity: u32) -> usize {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for class in data.classes.iter_mut().filter(|c| c.date >= today) {
            if class.capacity != capacity {
                class.capacity = capacity;
                updated += 1;
            }
        }
        info!(updated, capacity, "updated class capacities");
        updated
    }

    /// Books a user into a class. Disabled classes accept bookings so that
    /// admins can pre-fill them.
    pub async fn add_user_to_class(
        &self,
        class_id: Uuid,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Booking, StoreError> {
        let mut data = self.data.write().await;
        let class = data.class(class_id)?;
        let user = data.user(user_id)?;
        if user.role == Role::Pending {
            return Err(StoreError::NotApproved(user_id));
        }

        let active: Vec<&Booking> = data
            .bookings
            .iter()
            .filter(|b| b.class_id == class_id && b.status == BookingStatus::Active)
            .collect();
        if active.iter().any(|b| b.user_id == user_id) {
            return Err(StoreError::AlreadyBooked);
        }
        if active.len() as u32 >= class.capacity {
            return Err(StoreError::ClassFull);
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            class_id,
            user_id,
            status: BookingStatus::Active,
            created_at: Utc::now(),
        };
        data.bookings.push(booking.clone());
        let consumed = data
            .current_package_mut(user_id, today)
            .is_some_and(ClientPackage::consume_class);
        info!(%class_id, %user_id, consumed, "added user to class");
        Ok(booking)
    }

    pub async fn remove_booking_from_class(
        &self,
        class_id: Uuid,
        booking_id: Uuid,
        today: NaiveDate,
    ) -> Result<Booking, StoreError> {
        let mut data = self.data.write().await;
        let idx = data
            .bookings
            .iter()
            .position(|b| b.id == booking_id && b.class_id == class_id)
            .ok_or(StoreError::BookingNotFound(booking_id))?;
        let booking = data.bookings.remove(idx);
        if booking.status == BookingStatus::Active
            && let Some(package) = data.current_package_mut(booking.user_id, today)
        {
            package.refund_class();
        }
        info!(%class_id, %booking_id, "removed user from class");
        Ok(booking)
    }

    // ---- bookings ----

    pub async fn booking_views(&self) -> Vec<BookingView> {
        let data = self.data.read().await;
        let mut views: Vec<BookingView> = data
            .bookings
            .iter()
            .filter_map(|b| data.booking_view(b))
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }

    pub async fn cancel_booking(&self, id: Uuid, today: NaiveDate) -> Result<BookingView, StoreError> {
        let mut data = self.data.write().await;
        let booking = data
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::BookingNotFound(id))?;
        if booking.status == BookingStatus::Cancelled {
            return Err(StoreError::AlreadyCancelled);
        }
        booking.status = BookingStatus::Cancelled;
        let booking = booking.clone();

        if let Some(package) = data.current_package_mut(booking.user_id, today) {
            package.refund_class();
        }

        let view = data
            .booking_view(&booking)
            .ok_or(StoreError::BookingNotFound(id))?;
        if data.settings.notifications.send_cancellation_notifications {
            let class = data.class(booking.class_id)?;
            let message = format!(
                "{} cancelled {} on {}",
                view.client.name,
                class.name,
                describe_slot(class)
            );
            data.push_notification(NotificationType::AdminCancellation, message);
        }
        info!(booking_id = %id, "cancelled booking");
        Ok(view)
    }

    // ---- clients and packages ----

    pub async fn client_views(&self, today: NaiveDate) -> Vec<ClientView> {
        let data = self.data.read().await;
        data.users
            .iter()
            .filter(|u| u.role == Role::Client)
            .map(|user| {
                let mut packages: Vec<&ClientPackage> =
                    data.packages.iter().filter(|p| p.user_id == user.id).collect();
                packages.sort_by(|a, b| b.end_date.cmp(&a.end_date));
                let current = data.current_package(user.id, today);

                let bookings: Vec<&Booking> = data
                    .bookings
                    .iter()
                    .filter(|b| b.user_id == user.id)
                    .collect();
                let next_class = bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Active)
                    .filter_map(|b| data.class(b.class_id).ok())
                    .filter(|c| c.date >= today)
                    .min_by_key(|c| (c.date, time_sort_key(&c.time)))
                    .map(|c| format!("{} on {}", c.name, describe_slot(c)));

                ClientView {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    package: current.map(|p| p.view(today)),
                    packages: packages.iter().map(|p| p.view(today)).collect(),
                    status: client_status(current, today),
                    join_date: user.created_at,
                    total_bookings: bookings.len() as u32,
                    next_class,
                }
            })
            .collect()
    }

    /// Gives the client a fresh package; any other package is deactivated.
    pub async fn assign_package(
        &self,
        user_id: Uuid,
        package_type: PackageType,
        total_classes: Option<u32>,
        today: NaiveDate,
    ) -> Result<ClientPackage, StoreError> {
        let mut data = self.data.write().await;
        data.user(user_id)?;
        let duration = data.settings.packages.package_duration;
        let end_date = Duration::try_days(duration)
            .and_then(|span| today.checked_add_signed(span))
            .ok_or(StoreError::InvalidDuration(duration))?;

        for package in data.packages.iter_mut().filter(|p| p.user_id == user_id) {
            package.active = false;
        }

        let total = match package_type.default_classes() {
            Some(default) => Some(total_classes.unwrap_or(default)),
            None => None,
        };
        let package = ClientPackage {
            id: Uuid::new_v4(),
            user_id,
            name: package_type.display_name().to_string(),
            package_type,
            total_classes: total,
            classes_remaining: total,
            start_date: today,
            end_date,
            active: true,
        };
        data.packages.push(package.clone());
        info!(%user_id, package_id = %package.id, ?package_type, "assigned package");
        Ok(package)
    }

    fn owned_package_mut<'a>(
        data: &'a mut Snapshot,
        user_id: Uuid,
        package_id: Uuid,
    ) -> Result<&'a mut ClientPackage, StoreError> {
        data.user(user_id)?;
        let package = data
            .packages
            .iter_mut()
            .find(|p| p.id == package_id)
            .ok_or(StoreError::PackageNotFound(package_id))?;
        if package.user_id != user_id {
            return Err(StoreError::PackageOwnerMismatch);
        }
        Ok(package)
    }

    pub async fn adjust_classes(
        &self,
        user_id: Uuid,
        package_id: Uuid,
        classes_remaining: u32,
        today: NaiveDate,
    ) -> Result<ClientPackage, StoreError> {
        let mut data = self.data.write().await;
        let package = Self::owned_package_mut(&mut data, user_id, package_id)?;
        if !package.is_current(today) {
            return Err(StoreError::NoActivePackage);
        }
        if let Some(total) = package.total_classes
            && classes_remaining > total
        {
            return Err(StoreError::ExceedsPackageTotal(total));
        }
        if package.total_classes.is_none() {
            return Err(StoreError::UnlimitedPackage);
        }
        let previous = package.classes_remaining;
        package.classes_remaining = Some(classes_remaining);
        info!(%user_id, %package_id, ?previous, classes_remaining, "adjusted classes");
        Ok(package.clone())
    }

    pub async fn update_expiration(
        &self,
        user_id: Uuid,
        package_id: Uuid,
        end_date: NaiveDate,
    ) -> Result<ClientPackage, StoreError> {
        let mut data = self.data.write().await;
        let package = Self::owned_package_mut(&mut data, user_id, package_id)?;
        package.end_date = end_date;
        info!(%user_id, %package_id, %end_date, "updated package expiration");
        Ok(package.clone())
    }

    /// Records a renewal reminder for the client's current package.
    pub async fn send_reminder(&self, user_id: Uuid, today: NaiveDate) -> Result<Notification, StoreError> {
        let mut data = self.data.write().await;
        let reminders = data.settings.notifications.clone();
        if !reminders.send_renewal_reminders {
            return Err(StoreError::RemindersDisabled);
        }
        let user = data.user(user_id)?.clone();
        let package = data
            .current_package(user_id, today)
            .ok_or(StoreError::NoActivePackage)?;
        let days = package.days_remaining(today);
        if !in_reminder_window(package, today, reminders.reminder_days) {
            debug!(%user_id, days, "reminder sent outside the usual window");
        }
        let message = format!(
            "Renewal reminder sent to {} ({}): {} expires in {} days",
            user.name, user.email, package.name, days
        );
        let notification = data.push_notification(NotificationType::RenewalReminder, message);
        info!(%user_id, email = %user.email, days, "renewal reminder queued");
        Ok(notification)
    }

    /// Clients whose current package is inside the reminder window.
    pub async fn expiring_clients(&self, today: NaiveDate) -> usize {
        let data = self.data.read().await;
        let window = data.settings.notifications.reminder_days;
        data.users
            .iter()
            .filter(|u| u.role == Role::Client)
            .filter_map(|u| data.current_package(u.id, today))
            .filter(|p| in_reminder_window(p, today, window))
            .count()
    }

    // ---- notifications ----

    /// Newest first.
    pub async fn notifications(&self, unread_only: bool, limit: Option<usize>) -> Vec<Notification> {
        let data = self.data.read().await;
        let mut items: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| !unread_only || !n.read)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        items
    }

    pub async fn unread_count(&self) -> usize {
        let data = self.data.read().await;
        data.notifications.iter().filter(|n| !n.read).count()
    }

    /// Returns how many notifications changed from unread to read.
    pub async fn mark_read(&self, ids: &[Uuid]) -> usize {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for notification in data
            .notifications
            .iter_mut()
            .filter(|n| !n.read && ids.contains(&n.id))
        {
            notification.read = true;
            updated += 1;
        }
        updated
    }

    pub async fn mark_all_read(&self) -> usize {
        let mut data = self.data.write().await;
        let mut updated = 0;
        for notification in data.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            updated += 1;
        }
        updated
    }

    pub async fn delete_notification(&self, id: Uuid) -> Result<Notification, StoreError> {
        let mut data = self.data.write().await;
        let idx = data
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(StoreError::NotificationNotFound(id))?;
        Ok(data.notifications.remove(idx))
    }

    pub async fn push_notification(&self, kind: NotificationType, message: String) -> Notification {
        self.data.write().await.push_notification(kind, message)
    }

    pub async fn delete_notifications_of(&self, kind: NotificationType) -> usize {
        let mut data = self.data.write().await;
        let before = data.notifications.len();
        data.notifications.retain(|n| n.kind != kind);
        before - data.notifications.len()
    }

    // ---- studio settings ----

    pub async fn studio_settings(&self) -> StudioSettings {
        self.data.read().await.settings.clone()
    }

    pub async fn update_studio_settings(&self, update: SettingsUpdate) -> StudioSettings {
        let mut data = self.data.write().await;
        match update {
            SettingsUpdate::General(general) => data.settings.general = general,
            SettingsUpdate::Notifications(notifications) => {
                data.settings.notifications = notifications
            }
            SettingsUpdate::Packages(packages) => data.settings.packages = packages,
        }
        info!("updated studio settings");
        data.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 11, 20)
    }

    fn user(name: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            created_at: Utc::now(),
        }
    }

    fn class(name: &str, date: NaiveDate, capacity: u32) -> Class {
        Class {
            id: Uuid::new_v4(),
            name: name.to_string(),
            day: crate::schedule::day_name(date).to_string(),
            date,
            time: "7:00 AM".to_string(),
            capacity,
            enabled: true,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_pending_user_lifecycle() {
        let store = Store::new();
        let pending = store.insert_user(user("Pia", Role::Pending)).await;
        let client = store.insert_user(user("Carl", Role::Client)).await;

        assert_eq!(store.pending_users().await.len(), 1);
        assert!(matches!(
            store.approve_user(client.id).await,
            Err(StoreError::NotPending(_))
        ));

        let approved = store.approve_user(pending.id).await.unwrap();
        assert_eq!(approved.role, Role::Client);
        assert!(store.pending_users().await.is_empty());

        let other = store.insert_user(user("Dora", Role::Pending)).await;
        store.decline_user(other.id).await.unwrap();
        assert!(matches!(
            store.decline_user(other.id).await,
            Err(StoreError::UserNotFound(_))
        ));
        assert_eq!(store.list_users(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_add_user_respects_capacity_and_duplicates() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let ben = store.insert_user(user("Ben", Role::Client)).await;
        let pia = store.insert_user(user("Pia", Role::Pending)).await;
        let wod = store.insert_class(class("WOD", today(), 1)).await;

        store.add_user_to_class(wod.id, anna.id, today()).await.unwrap();
        assert!(matches!(
            store.add_user_to_class(wod.id, anna.id, today()).await,
            Err(StoreError::AlreadyBooked)
        ));
        assert!(matches!(
            store.add_user_to_class(wod.id, ben.id, today()).await,
            Err(StoreError::ClassFull)
        ));
        assert!(matches!(
            store.add_user_to_class(wod.id, pia.id, today()).await,
            Err(StoreError::NotApproved(_))
        ));

        let view = store.class_view(wod.id).await.unwrap();
        assert_eq!(view.current_bookings, 1);
        assert!(view.is_full());
    }

    #[tokio::test]
    async fn test_booking_consumes_and_refunds_package_classes() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let wod = store.insert_class(class("WOD", today(), 5)).await;
        let package = store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        assert_eq!(package.classes_remaining, Some(8));
        assert_eq!(package.end_date, date(2025, 12, 20));

        let booking = store.add_user_to_class(wod.id, anna.id, today()).await.unwrap();
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].package.as_ref().unwrap().classes_remaining, Some(7));
        assert_eq!(clients[0].next_class.as_deref(), Some("WOD on Thu, Nov 20 at 7:00 AM"));

        store
            .remove_booking_from_class(wod.id, booking.id, today())
            .await
            .unwrap();
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].package.as_ref().unwrap().classes_remaining, Some(8));
        assert_eq!(clients[0].total_bookings, 0);
    }

    #[tokio::test]
    async fn test_cancel_booking_emits_notification() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let wod = store.insert_class(class("WOD", date(2025, 11, 24), 5)).await;
        let booking = store.add_user_to_class(wod.id, anna.id, today()).await.unwrap();

        let view = store.cancel_booking(booking.id, today()).await.unwrap();
        assert_eq!(view.status, BookingStatus::Cancelled);
        assert!(matches!(
            store.cancel_booking(booking.id, today()).await,
            Err(StoreError::AlreadyCancelled)
        ));

        let notifications = store.notifications(false, None).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationType::AdminCancellation);
        assert_eq!(
            notifications[0].message,
            "Anna cancelled WOD on Mon, Nov 24 at 7:00 AM"
        );
        assert_eq!(store.class_view(wod.id).await.unwrap().current_bookings, 0);
    }

    #[tokio::test]
    async fn test_cancel_without_notification_when_disabled() {
        let store = Store::new();
        let mut notifications = StudioSettings::default().notifications;
        notifications.send_cancellation_notifications = false;
        store
            .update_studio_settings(SettingsUpdate::Notifications(notifications))
            .await;
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let wod = store.insert_class(class("WOD", today(), 5)).await;
        let booking = store.add_user_to_class(wod.id, anna.id, today()).await.unwrap();

        store.cancel_booking(booking.id, today()).await.unwrap();
        assert_eq!(store.unread_count().await, 0);
    }

    #[tokio::test]
    async fn test_assign_package_deactivates_previous() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let first = store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        let second = store
            .assign_package(anna.id, PackageType::Unlimited, Some(40), today())
            .await
            .unwrap();
        assert_eq!(second.classes_remaining, None);

        let clients = store.client_views(today()).await;
        let anna_view = &clients[0];
        assert_eq!(anna_view.packages.len(), 2);
        assert_eq!(anna_view.package.as_ref().unwrap().id, second.id);
        assert_eq!(anna_view.packages.iter().filter(|p| p.active).count(), 1);
        assert!(matches!(
            store.adjust_classes(anna.id, first.id, 3, today()).await,
            Err(StoreError::NoActivePackage)
        ));
    }

    #[tokio::test]
    async fn test_adjust_classes_checks_owner_and_total() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let ben = store.insert_user(user("Ben", Role::Client)).await;
        let package = store
            .assign_package(anna.id, PackageType::TwelveClass, None, today())
            .await
            .unwrap();

        assert!(matches!(
            store.adjust_classes(ben.id, package.id, 3, today()).await,
            Err(StoreError::PackageOwnerMismatch)
        ));
        assert!(matches!(
            store.adjust_classes(anna.id, package.id, 13, today()).await,
            Err(StoreError::ExceedsPackageTotal(12))
        ));
        let adjusted = store
            .adjust_classes(anna.id, package.id, 4, today())
            .await
            .unwrap();
        assert_eq!(adjusted.classes_remaining, Some(4));
    }

    #[tokio::test]
    async fn test_adjust_classes_rejects_unlimited_package() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let package = store
            .assign_package(anna.id, PackageType::Unlimited, None, today())
            .await
            .unwrap();

        assert!(matches!(
            store.adjust_classes(anna.id, package.id, 3, today()).await,
            Err(StoreError::UnlimitedPackage)
        ));
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].package.as_ref().unwrap().classes_remaining, None);
    }

    #[tokio::test]
    async fn test_assign_package_with_oversized_duration_keeps_current() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let current = store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        store
            .update_studio_settings(SettingsUpdate::Packages(crate::models::PackageSettings {
                package_duration: i64::MAX,
                ..Default::default()
            }))
            .await;

        let result = store
            .assign_package(anna.id, PackageType::TwelveClass, None, today())
            .await;

        assert!(matches!(result, Err(StoreError::InvalidDuration(i64::MAX))));
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].packages.len(), 1);
        assert_eq!(clients[0].package.as_ref().unwrap().id, current.id);
        assert!(clients[0].package.as_ref().unwrap().active);
    }

    #[tokio::test]
    async fn test_next_class_puts_unparseable_times_last() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let mut odd = class("Open Gym", date(2025, 11, 21), 5);
        odd.time = "TBD".to_string();
        let mut evening = class("WOD", date(2025, 11, 21), 5);
        evening.time = "6:00 PM".to_string();
        let odd = store.insert_class(odd).await;
        let evening = store.insert_class(evening).await;
        store.add_user_to_class(odd.id, anna.id, today()).await.unwrap();
        store.add_user_to_class(evening.id, anna.id, today()).await.unwrap();

        let clients = store.client_views(today()).await;
        assert_eq!(
            clients[0].next_class.as_deref(),
            Some("WOD on Fri, Nov 21 at 6:00 PM")
        );
    }

    #[tokio::test]
    async fn test_update_expiration_changes_status() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let package = store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        store
            .update_expiration(anna.id, package.id, date(2025, 11, 23))
            .await
            .unwrap();
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].status, crate::models::ClientStatus::Warning);
        assert_eq!(store.expiring_clients(today()).await, 1);

        store
            .update_expiration(anna.id, package.id, date(2025, 11, 19))
            .await
            .unwrap();
        let clients = store.client_views(today()).await;
        assert_eq!(clients[0].status, crate::models::ClientStatus::Expired);
        assert!(clients[0].package.is_none());
    }

    #[tokio::test]
    async fn test_send_reminder() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        assert!(matches!(
            store.send_reminder(anna.id, today()).await,
            Err(StoreError::NoActivePackage)
        ));

        store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        let notification = store.send_reminder(anna.id, today()).await.unwrap();
        assert_eq!(notification.kind, NotificationType::RenewalReminder);
        assert!(notification.message.contains("30 days"));

        let mut settings = StudioSettings::default().notifications;
        settings.send_renewal_reminders = false;
        store
            .update_studio_settings(SettingsUpdate::Notifications(settings))
            .await;
        assert!(matches!(
            store.send_reminder(anna.id, today()).await,
            Err(StoreError::RemindersDisabled)
        ));
    }

    #[tokio::test]
    async fn test_delete_past_classes_keeps_last_week() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let old = store.insert_class(class("Old", date(2025, 11, 12), 5)).await;
        let recent = store.insert_class(class("Recent", date(2025, 11, 13), 5)).await;
        store.add_user_to_class(old.id, anna.id, today()).await.unwrap();

        let deleted = store.delete_past_classes(today()).await;
        assert_eq!(deleted, vec![old.id]);
        assert_eq!(store.count_classes().await, 1);
        assert!(store.class_view(recent.id).await.is_ok());
        assert!(store.booking_views().await.is_empty());
    }

    #[tokio::test]
    async fn test_generated_classes_skip_taken_slots() {
        let store = Store::new();
        let existing = store.insert_class(class("WOD", today(), 5)).await;
        let mut duplicate = class("CrossFit", today(), 5);
        duplicate.time = existing.time.clone();
        let fresh = class("CrossFit", date(2025, 11, 21), 5);

        let created = store
            .insert_generated_classes(vec![duplicate, fresh])
            .await;
        assert_eq!(created, 1);
        assert_eq!(store.count_classes().await, 2);
    }

    #[tokio::test]
    async fn test_batch_toggle_and_capacities() {
        let store = Store::new();
        let past = store.insert_class(class("Past", date(2025, 11, 18), 5)).await;
        let future = store.insert_class(class("Future", date(2025, 11, 25), 5)).await;

        let updated = store
            .set_classes_enabled(&[past.id, future.id, Uuid::new_v4()], false)
            .await;
        assert_eq!(updated, 2);
        assert!(store.class_views().await.iter().all(|c| !c.class.enabled));

        assert_eq!(store.update_capacities(today(), 10).await, 1);
        assert_eq!(store.class_view(future.id).await.unwrap().class.capacity, 10);
        assert_eq!(store.class_view(past.id).await.unwrap().class.capacity, 5);
    }

    #[tokio::test]
    async fn test_notifications_read_and_delete() {
        let store = Store::new();
        let first = store
            .push_notification(NotificationType::System, "first".into())
            .await;
        store
            .push_notification(NotificationType::AdminCancellation, "second".into())
            .await;
        store
            .push_notification(NotificationType::AdminCancellation, "third".into())
            .await;

        assert_eq!(store.unread_count().await, 3);
        assert_eq!(store.mark_read(&[first.id]).await, 1);
        assert_eq!(store.mark_read(&[first.id]).await, 0);
        assert_eq!(store.notifications(true, None).await.len(), 2);
        assert_eq!(store.notifications(false, Some(1)).await.len(), 1);
        assert_eq!(store.mark_all_read().await, 2);
        assert_eq!(store.unread_count().await, 0);

        assert_eq!(
            store
                .delete_notifications_of(NotificationType::AdminCancellation)
                .await,
            2
        );
        store.delete_notification(first.id).await.unwrap();
        assert!(matches!(
            store.delete_notification(first.id).await,
            Err(StoreError::NotificationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = Store::new();
        let anna = store.insert_user(user("Anna", Role::Client)).await;
        let wod = store.insert_class(class("WOD", today(), 5)).await;
        store
            .assign_package(anna.id, PackageType::EightClass, None, today())
            .await
            .unwrap();
        store.add_user_to_class(wod.id, anna.id, today()).await.unwrap();

        store.delete_user(anna.id).await.unwrap();
        let snapshot = store.snapshot().await;
        assert!(snapshot.bookings.is_empty());
        assert!(snapshot.packages.is_empty());
    }

    #[tokio::test]
    async fn test_load_snapshot_file() {
        let anna = user("Anna", Role::Client);
        let snapshot = Snapshot {
            users: vec![anna.clone()],
            classes: vec![class("WOD", today(), 5)],
            ..Default::default()
        };
        let path = std::env::temp_dir().join(format!("gym-admin-{}.json", Uuid::new_v4()));
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        let store = Store::load(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;
        assert_eq!(store.list_users(Some(Role::Client)).await[0].id, anna.id);
        assert_eq!(store.count_classes().await, 1);
        assert_eq!(store.studio_settings().await, StudioSettings::default());
    }
}

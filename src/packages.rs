use chrono::NaiveDate;

use crate::models::{ClientPackage, ClientStatus, PackageType, PackageView};

/// Packages with this many days left or fewer are flagged as expiring.
pub const WARNING_DAYS: i64 = 7;

impl PackageType {
    /// Class allotment for the package; `None` means unlimited.
    pub fn default_classes(self) -> Option<u32> {
        match self {
            PackageType::EightClass => Some(8),
            PackageType::TwelveClass => Some(12),
            PackageType::Unlimited => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PackageType::EightClass => "8-Class Package",
            PackageType::TwelveClass => "12-Class Package",
            PackageType::Unlimited => "Unlimited Package",
        }
    }
}

pub fn days_remaining(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (end_date - today).num_days().max(0)
}

impl ClientPackage {
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.active && self.end_date >= today
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        days_remaining(self.end_date, today)
    }

    /// Takes one class off a limited package. Returns whether a class was used.
    pub fn consume_class(&mut self) -> bool {
        match self.classes_remaining.as_mut() {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Gives one class back, never going above the package total.
    pub fn refund_class(&mut self) {
        if let (Some(remaining), Some(total)) = (self.classes_remaining.as_mut(), self.total_classes)
            && *remaining < total
        {
            *remaining += 1;
        }
    }

    pub fn view(&self, today: NaiveDate) -> PackageView {
        PackageView {
            id: self.id,
            name: self.name.clone(),
            package_type: self.package_type,
            total_classes: self.total_classes,
            classes_remaining: self.classes_remaining,
            end_date: self.end_date,
            days_remaining: self.days_remaining(today),
            active: self.is_current(today),
        }
    }
}

pub fn client_status(current: Option<&ClientPackage>, today: NaiveDate) -> ClientStatus {
    match current {
        None => ClientStatus::Expired,
        Some(package) if package.days_remaining(today) <= WARNING_DAYS => ClientStatus::Warning,
        Some(_) => ClientStatus::Active,
    }
}

pub fn in_reminder_window(package: &ClientPackage, today: NaiveDate, reminder_days: i64) -> bool {
    let days = package.days_remaining(today);
    package.is_current(today) && days > 0 && days <= reminder_days
}

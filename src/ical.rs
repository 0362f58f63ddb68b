use chrono::{Duration, NaiveDateTime};
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::{Class, GeneralSettings};
use crate::schedule::parse_class_time;

/// Renders classes as an iCalendar feed for the studio.
#[derive(Clone, Default)]
pub struct ICalExporter;

impl ICalExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, studio: &GeneralSettings, classes: &[Class]) -> Vec<u8> {
        if classes.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(&format!("{} Classes", studio.studio_name));

        for class in classes {
            // Classes with a malformed time are placed at midnight
            let time = parse_class_time(&class.time).unwrap_or_default();
            let start = NaiveDateTime::new(class.date, time);

            let mut event = Event::new();
            event.summary(&format!("{}: {}", studio.studio_name, class.name));
            event.starts(start);
            event.ends(start + Duration::hours(1));
            event.location(&studio.address);
            let mut description = format!("Capacity: {}", class.capacity);
            if let Some(extra) = &class.description {
                description.push('\n');
                description.push_str(extra);
            }
            event.description(&description);
            event.uid(&format!("{}-gym-admin", class.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_generate_single_class() {
        let exporter = ICalExporter::new();
        let class = Class {
            id: Uuid::new_v4(),
            name: "WOD".to_string(),
            day: "Monday".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 24).unwrap(),
            time: "6:00 AM".to_string(),
            capacity: 5,
            enabled: true,
            description: None,
        };
        let bytes = exporter.generate(&GeneralSettings::default(), &[class]);
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("BEGIN:VEVENT"));
        assert!(body.contains("GymXam: WOD"));
        assert!(body.contains("20251124T060000"));
    }

    #[test]
    fn test_generate_empty() {
        let exporter = ICalExporter::new();
        let bytes = exporter.generate(&GeneralSettings::default(), &[]);
        assert!(bytes.is_empty());
    }
}

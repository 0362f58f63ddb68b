use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Class, ClassView};

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*([AaPp][Mm])?\s*$").expect("regex compiles")
});

/// Hourly slots from 5:00 AM to 9:00 PM.
pub const DEFAULT_SLOT_HOURS: std::ops::RangeInclusive<u32> = 5..=21;
pub const DEFAULT_CLASS_NAME: &str = "CrossFit";
pub const SCHEDULE_WEEKS: i64 = 52;
pub const SCHEDULE_DAYS_PER_WEEK: i64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid class time '{0}', expected e.g. 7:00 AM or 18:30")]
    InvalidTime(String),
}

pub fn parse_class_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(value.to_string());
    let caps = TIME_REGEX.captures(value).ok_or_else(invalid)?;
    let mut hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;

    if let Some(period) = caps.get(3) {
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }
        let pm = period.as_str().eq_ignore_ascii_case("pm");
        if pm && hour < 12 {
            hour += 12;
        } else if !pm && hour == 12 {
            hour = 0;
        }
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

pub fn format_class_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if pm { "PM" } else { "AM" }
    )
}

pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Minutes since midnight; unparseable times sort after every valid one.
pub(crate) fn time_sort_key(time: &str) -> u32 {
    parse_class_time(time)
        .map(|t| t.hour() * 60 + t.minute())
        .unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    pub day: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub classes: Vec<ClassView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekGroup {
    pub week_number: i64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    /// Friday of the week; the studio runs Monday to Friday.
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub class_count: u32,
    pub enabled_count: u32,
    pub day_groups: Vec<DayGroup>,
}

pub fn group_classes_by_week(mut classes: Vec<ClassView>) -> Vec<WeekGroup> {
    classes.sort_by_key(|c| c.class.date);
    let Some(first) = classes.first() else {
        return Vec::new();
    };
    let first_monday = week_monday(first.class.date);

    let mut weeks: Vec<WeekGroup> = Vec::new();
    for view in classes {
        let monday = week_monday(view.class.date);
        let week_number = (monday - first_monday).num_weeks();

        let idx = match weeks.iter().position(|w| w.week_number == week_number) {
            Some(idx) => idx,
            None => {
                weeks.push(WeekGroup {
                    week_number,
                    start_date: monday,
                    end_date: monday + Duration::days(4),
                    class_count: 0,
                    enabled_count: 0,
                    day_groups: Vec::new(),
                });
                weeks.len() - 1
            }
        };
        let week = &mut weeks[idx];

        week.class_count += 1;
        if view.class.enabled {
            week.enabled_count += 1;
        }

        let day = day_name(view.class.date);
        match week.day_groups.iter_mut().find(|d| d.day == day) {
            Some(group) => group.classes.push(view),
            None => week.day_groups.push(DayGroup {
                day: day.to_string(),
                date: view.class.date,
                classes: vec![view],
            }),
        }
    }

    for week in &mut weeks {
        week.day_groups
            .sort_by_key(|d| d.date.weekday().num_days_from_monday());
        for day in &mut week.day_groups {
            day.classes.sort_by_key(|c| time_sort_key(&c.class.time));
        }
    }

    weeks
}

/// Builds a year of weekday classes starting with the week containing `today`.
/// Days already in the past are skipped.
pub fn default_year_schedule(today: NaiveDate, capacity: u32) -> Vec<Class> {
    let start = week_monday(today);
    let mut classes = Vec::new();
    for week in 0..SCHEDULE_WEEKS {
        for offset in 0..SCHEDULE_DAYS_PER_WEEK {
            let date = start + Duration::weeks(week) + Duration::days(offset);
            if date < today {
                continue;
            }
            for hour in DEFAULT_SLOT_HOURS {
                let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
                    continue;
                };
                classes.push(Class {
                    id: Uuid::new_v4(),
                    name: DEFAULT_CLASS_NAME.to_string(),
                    day: day_name(date).to_string(),
                    date,
                    time: format_class_time(time),
                    capacity,
                    enabled: false,
                    description: None,
                });
            }
        }
    }
    classes
}

pub fn expected_yearly_classes() -> usize {
    DEFAULT_SLOT_HOURS.count() * (SCHEDULE_DAYS_PER_WEEK * SCHEDULE_WEEKS) as usize
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub class_count: usize,
    pub has_year_schedule: bool,
    pub message: String,
}

pub fn schedule_status(class_count: usize) -> ScheduleStatus {
    // 80% of a full year counts as generated
    let has_year_schedule = class_count * 10 > expected_yearly_classes() * 8;
    let message = if has_year_schedule {
        "Year-long schedule is already generated"
    } else {
        "Year-long schedule not detected"
    };
    ScheduleStatus {
        class_count,
        has_year_schedule,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn view(date: NaiveDate, time: &str, enabled: bool) -> ClassView {
        ClassView {
            class: Class {
                id: Uuid::new_v4(),
                name: format!("WOD {time}"),
                day: day_name(date).to_string(),
                date,
                time: time.to_string(),
                capacity: 5,
                enabled,
                description: None,
            },
            current_bookings: 0,
            bookings: Vec::new(),
        }
    }

    #[test]
    fn test_parse_class_time() {
        assert_eq!(
            parse_class_time("7:00 AM").unwrap(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
        assert_eq!(
            parse_class_time("12:30 pm").unwrap(),
            NaiveTime::from_hms_opt(12, 30, 0).unwrap()
        );
        assert_eq!(
            parse_class_time("12:00 AM").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_class_time("6:15PM").unwrap(),
            NaiveTime::from_hms_opt(18, 15, 0).unwrap()
        );
        assert_eq!(
            parse_class_time("18:30").unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert!(parse_class_time("13:00 PM").is_err());
        assert!(parse_class_time("25:00").is_err());
        assert!(parse_class_time("noon").is_err());
    }

    #[test]
    fn test_format_class_time() {
        assert_eq!(format_class_time(NaiveTime::from_hms_opt(5, 0, 0).unwrap()), "5:00 AM");
        assert_eq!(format_class_time(NaiveTime::from_hms_opt(12, 5, 0).unwrap()), "12:05 PM");
        assert_eq!(format_class_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), "12:00 AM");
        assert_eq!(format_class_time(NaiveTime::from_hms_opt(21, 0, 0).unwrap()), "9:00 PM");
    }

    #[test]
    fn test_group_empty() {
        assert!(group_classes_by_week(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_classes_by_week() {
        // 2025-11-24 is a Monday
        let classes = vec![
            view(date(2025, 12, 3), "6:00 PM", true),
            view(date(2025, 11, 26), "9:00 AM", false),
            view(date(2025, 11, 24), "6:00 PM", true),
            view(date(2025, 11, 24), "7:00 AM", true),
            view(date(2025, 11, 30), "10:00 AM", true),
        ];

        let weeks = group_classes_by_week(classes);
        assert_eq!(weeks.len(), 2);

        let first = &weeks[0];
        assert_eq!(first.week_number, 0);
        assert_eq!(first.start_date, date(2025, 11, 24));
        assert_eq!(first.end_date, date(2025, 11, 28));
        assert_eq!(first.class_count, 4);
        assert_eq!(first.enabled_count, 3);
        let days: Vec<&str> = first.day_groups.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Wednesday", "Sunday"]);
        let monday_times: Vec<&str> = first.day_groups[0]
            .classes
            .iter()
            .map(|c| c.class.time.as_str())
            .collect();
        assert_eq!(monday_times, vec!["7:00 AM", "6:00 PM"]);

        let second = &weeks[1];
        assert_eq!(second.week_number, 1);
        assert_eq!(second.start_date, date(2025, 12, 1));
        assert_eq!(second.class_count, 1);
    }

    #[test]
    fn test_group_skipped_week_keeps_number() {
        let weeks = group_classes_by_week(vec![
            view(date(2025, 11, 24), "7:00 AM", true),
            view(date(2025, 12, 10), "7:00 AM", true),
        ]);
        let numbers: Vec<i64> = weeks.iter().map(|w| w.week_number).collect();
        assert_eq!(numbers, vec![0, 2]);
    }

    #[test]
    fn test_unparseable_time_sorts_last() {
        let weeks = group_classes_by_week(vec![
            view(date(2025, 11, 24), "whenever", true),
            view(date(2025, 11, 24), "9:00 PM", true),
        ]);
        assert_eq!(weeks[0].day_groups[0].classes[0].class.time, "9:00 PM");
    }

    #[test]
    fn test_default_year_schedule() {
        // Wednesday: Monday and Tuesday of the first week are skipped
        let today = date(2025, 11, 26);
        let classes = default_year_schedule(today, 5);
        assert_eq!(classes.len(), expected_yearly_classes() - 2 * 17);
        assert_eq!(classes[0].date, today);
        assert_eq!(classes[0].time, "5:00 AM");
        assert_eq!(classes[16].time, "9:00 PM");
        assert!(classes.iter().all(|c| !c.enabled && c.capacity == 5));
        assert!(classes.iter().all(|c| c.date.weekday().num_days_from_monday() < 5));
    }

    #[test]
    fn test_schedule_status() {
        assert!(!schedule_status(0).has_year_schedule);
        assert!(!schedule_status(3536).has_year_schedule);
        assert!(schedule_status(3537).has_year_schedule);
        assert_eq!(expected_yearly_classes(), 4420);
    }
}

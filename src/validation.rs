use crate::error::ApiError;
use crate::schedule::{format_class_time, parse_class_time};

pub const MAX_CLASS_CAPACITY: u32 = 100;

pub fn validate_capacity(value: u32) -> Result<u32, ApiError> {
    if (1..=MAX_CLASS_CAPACITY).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "capacity must be between 1 and {MAX_CLASS_CAPACITY}"
        )))
    }
}

/// Longest package an admin can configure, ten years.
pub const MAX_PACKAGE_DURATION_DAYS: i64 = 3650;

pub fn validate_package_duration(days: i64) -> Result<i64, ApiError> {
    if (1..=MAX_PACKAGE_DURATION_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ApiError::BadRequest(format!(
            "packageDuration must be between 1 and {MAX_PACKAGE_DURATION_DAYS} days"
        )))
    }
}

pub fn validate_limit(value: usize) -> Result<usize, ApiError> {
    if (1..=100).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest("limit must be between 1 and 100".into()))
    }
}

pub fn validate_name(value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest("Class name is required".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parses any accepted time form and returns the canonical `h:mm AM` string.
pub fn normalize_time(value: &str) -> Result<String, ApiError> {
    parse_class_time(value)
        .map(format_class_time)
        .map_err(|err| ApiError::BadRequest(err.to_string()))
}

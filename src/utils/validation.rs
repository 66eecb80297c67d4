use std::borrow::Cow;
use std::str::FromStr;

use validator::ValidationError;

use crate::error::{Error, Result};

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("phone", "Phone number must be exactly 10 digits"))
    }
}

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match crate::utils::time::parse_date(value) {
        Some(_) => Ok(()),
        None => Err(error("date", "Date must be a valid date string.")),
    }
}

pub fn validate_datetime(value: &str) -> Result<(), ValidationError> {
    match crate::utils::time::parse_datetime(value) {
        Some(_) => Ok(()),
        None => Err(error("date", "Follow-up date must be a valid date string.")),
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Trims a required string field in place.
pub fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trims an optional field and collapses blank input to `None`.
pub fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value.take() {
        let trimmed = v.trim();
        if !trimmed.is_empty() {
            *value = Some(trimmed.to_string());
        }
    }
}

/// Parses an optional query-string filter; blank means absent, anything
/// unparseable is a 400.
pub fn parse_filter<E>(raw: Option<&str>) -> Result<Option<E>>
where
    E: FromStr<Err = String>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<E>().map(Some).map_err(Error::BadRequest),
    }
}

use chrono::{NaiveDate, Utc};
use garde::Validate;

use crate::error::{FeedError, Result};

/// Message shown when a password does not meet the strength rule.
pub const PASSWORD_RULE: &str = "Password must be at least 8 characters and include uppercase, lowercase, number, and special character";

/// Validates a password against the API's strength rule.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(long_enough && has_upper && has_lower && has_digit && has_special) {
        return Err(FeedError::ValidationRejected(PASSWORD_RULE.to_string()));
    }

    if password.len() > 128 {
        return Err(FeedError::ValidationRejected(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Runs the garde rules of a request payload.
pub fn validate_request<T: Validate>(request: &T) -> Result<()>
where
    T::Context: Default,
{
    request
        .validate()
        .map_err(|report| FeedError::ValidationRejected(report.to_string()))
}

pub fn strong_password(value: &str, _: &()) -> garde::Result {
    validate_password(value).map_err(|_| garde::Error::new(PASSWORD_RULE))
}

pub fn past_date(value: &str, _: &()) -> garde::Result {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| garde::Error::new("Date of birth must be a valid date"))?;
    if date >= Utc::now().date_naive() {
        return Err(garde::Error::new("Date of birth must be in the past"));
    }
    Ok(())
}

pub fn known_gender(value: &str, _: &()) -> garde::Result {
    match value {
        "male" | "female" => Ok(()),
        _ => Err(garde::Error::new("Gender must be male or female")),
    }
}

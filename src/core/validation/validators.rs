//! Reusable field validators
//!
//! Each validator receives the field name and the raw submitted value
//! (`None` when the field was not submitted at all). A validator only
//! reports on inputs it is responsible for: `positive` lets non-numeric input
//! through because `numeric` already rejects it.

use crate::core::invoice::{coerce_amount, out_of_range_amount, to_minor_units};
use rust_decimal::Decimal;

/// Validator: field must be submitted and non-empty
pub fn required(
    message: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: Option<&str>| match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Validator: field must coerce to a number
///
/// Missing and blank values coerce to zero and are accepted here, and so are
/// numbers too large to represent; `max_minor_units` reports those.
pub fn numeric(
    message: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: Option<&str>| {
        if coerce_amount(value).is_some() || out_of_range_amount(value).is_some() {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }
}

/// Validator: coerced number must be strictly greater than zero
pub fn positive(
    message: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: Option<&str>| match coerce_amount(value) {
        Some(amount) if amount <= Decimal::ZERO => Err(message.to_string()),
        None if out_of_range_amount(value).is_some_and(|v| v < 0.0) => Err(message.to_string()),
        _ => Ok(()),
    }
}

/// Validator: a positive amount must fit in integer minor units
pub fn max_minor_units(
    message: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: Option<&str>| match coerce_amount(value) {
        Some(amount) if amount > Decimal::ZERO && to_minor_units(amount).is_none() => {
            Err(message.to_string())
        }
        None if out_of_range_amount(value).is_some_and(|v| v > 0.0) => Err(message.to_string()),
        _ => Ok(()),
    }
}

/// Validator: value must be exactly one of the allowed literals
pub fn in_list(
    allowed: &'static [&'static str],
    message: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: Option<&str>| match value {
        Some(v) if allowed.contains(&v) => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: Option<&str>| {
        if let Some(s) = value {
            match chrono::NaiveDate::parse_from_str(s, format) {
                Ok(_) => Ok(()),
                Err(_) => Err(format!(
                    "'{}' must use the {} format (got: {})",
                    field, format, s
                )),
            }
        } else {
            Ok(())
        }
    }
}

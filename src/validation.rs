//! Field-level parsing and validation shared by every entity form.
//!
//! Parsers take the raw submitted string, report a human-readable message
//! into [`FieldErrors`] on failure and return `None`, so a form can run all
//! of its fields and report every problem at once.

use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, macros::format_description};

use crate::constants::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field(&self, field: &str) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// Returns `value` when no error was recorded, otherwise the errors.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        // every parser that returned None also recorded an error
        value().ok_or(self)
    }
}

fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) -> bool {
    let count = value.chars().count();
    if count > max {
        errors.push(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, count
            ),
        );
        return false;
    }
    true
}

pub fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    max: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    check_length(errors, field, value, max).then(|| value.to_string())
}

/// Blank input maps to `None`; an over-long value records an error.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    max: Option<usize>,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(max) = max {
        if !check_length(errors, field, value, max) {
            return None;
        }
    }
    Some(value.to_string())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Accepts `YYYY-MM-DDTHH:MM` as sent by `datetime-local` inputs, a space
/// separator, and optional seconds.
pub fn parse_datetime(raw: &str) -> Option<PrimitiveDateTime> {
    let normalized = raw.trim().replacen('T', " ", 1);
    PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
    })
    .ok()
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub fn format_datetime(datetime: PrimitiveDateTime) -> String {
    datetime
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_default()
}

pub fn required_date(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Date> {
    if raw.trim().is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    optional_date(errors, field, raw)
}

pub fn optional_date(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Date> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.push(field, ERR_INVALID_DATE);
    }
    parsed
}

pub fn required_datetime(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<PrimitiveDateTime> {
    if raw.trim().is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    optional_datetime(errors, field, raw)
}

pub fn optional_datetime(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<PrimitiveDateTime> {
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        errors.push(field, ERR_INVALID_DATETIME);
    }
    parsed
}

pub fn required_money(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Decimal> {
    if raw.trim().is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    optional_money(errors, field, raw)
}

/// Fixed-point amount with at most `MONEY_MAX_DIGITS` digits, of which
/// `MONEY_DECIMAL_PLACES` after the point. The result always has scale 2.
pub fn optional_money(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<Decimal> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let Ok(parsed) = value.parse::<Decimal>() else {
        errors.push(field, ERR_INVALID_NUMBER);
        return None;
    };

    // counted as written: trailing zeros after the point still count
    let places = parsed.scale();
    let digits = significant_digits(parsed).max(places);
    let whole_digits = digits.saturating_sub(places);
    let max_whole = MONEY_MAX_DIGITS - MONEY_DECIMAL_PLACES;

    if digits > MONEY_MAX_DIGITS {
        errors.push(
            field,
            format!(
                "Ensure that there are no more than {} digits in total.",
                MONEY_MAX_DIGITS
            ),
        );
        return None;
    }
    if places > MONEY_DECIMAL_PLACES {
        errors.push(
            field,
            format!(
                "Ensure that there are no more than {} decimal places.",
                MONEY_DECIMAL_PLACES
            ),
        );
        return None;
    }
    if whole_digits > max_whole {
        errors.push(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole
            ),
        );
        return None;
    }

    let mut amount = parsed;
    amount.rescale(MONEY_DECIMAL_PLACES);
    Some(amount)
}

fn significant_digits(value: Decimal) -> u32 {
    let mantissa = value.mantissa().unsigned_abs();
    if mantissa == 0 {
        return 1;
    }
    mantissa.to_string().len() as u32
}

pub fn money_to_cents(amount: Decimal) -> i64 {
    let mut scaled = amount;
    scaled.rescale(MONEY_DECIMAL_PLACES);
    scaled.mantissa() as i64
}

pub fn cents_to_money(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_DECIMAL_PLACES)
}

pub fn required_int(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    let parsed = value.parse::<i32>().ok();
    if parsed.is_none() {
        errors.push(field, ERR_INVALID_INTEGER);
    }
    parsed
}

pub fn checkbox(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

/// A value restricted to a fixed set of `(value, label)` pairs.
pub trait Choice: Sized + Copy + 'static {
    const CHOICES: &'static [Self];

    fn value(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_value(raw: &str) -> Option<Self> {
        Self::CHOICES.iter().copied().find(|c| c.value() == raw)
    }

    fn options() -> Vec<(&'static str, &'static str)> {
        Self::CHOICES.iter().map(|c| (c.value(), c.label())).collect()
    }
}

pub fn required_choice<C: Choice>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<C> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, ERR_REQUIRED);
        return None;
    }
    let parsed = C::from_value(value);
    if parsed.is_none() {
        errors.push(
            field,
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                value
            ),
        );
    }
    parsed
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
        && !domain.ends_with('.')
}

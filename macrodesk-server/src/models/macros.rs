//! Macro record and request payload
//!
//! `MacroPayload` is what clients send, `MacroInput` is the validated form
//! handed to the store, and `Macro` is a stored row.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

use super::ValidationError;

/// Required text fields, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 4] = ["item", "model", "description", "vendor"];

/// Fractional digits kept by the `NUMERIC(12, 4)` multiplier column
pub const MULTIPLIER_SCALE: u32 = 4;

/// Integer digits that fit the multiplier column (12 - 4)
pub const MULTIPLIER_INTEGER_DIGITS: u32 = 8;

/// Decimal literal: optional sign, digits with an optional point, optional exponent
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sign>[+-]?)(?:(?P<int>[0-9]+)(?:\.(?P<frac>[0-9]*))?|\.(?P<frac_only>[0-9]+))(?:[eE](?P<exp>[+-]?[0-9]+))?$")
        .expect("invalid decimal regex")
});

/// Request body for create and update.
///
/// Every field is optional at the type level so that a missing field
/// produces a `ValidationError` naming it instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacroPayload {
    pub item: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub multiplier: Option<NumericInput>,
    pub notes: Option<String>,
}

/// Multiplier as sent by clients: a JSON number, a numeric string, or
/// something else that gets rejected during validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

/// Validated macro fields, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroInput {
    pub item: String,
    pub model: String,
    pub description: String,
    pub vendor: String,
    pub multiplier: Option<Decimal>,
    pub notes: Option<String>,
}

impl MacroPayload {
    /// Validate the payload.
    ///
    /// # Rules
    /// - item, model, description, vendor must be non-blank; the first
    ///   failing field in that order is reported
    /// - multiplier: absent, null or `""` is null, otherwise it must be a
    ///   decimal number
    /// - notes: absent, null or `""` is null, otherwise trimmed
    pub fn validate(self) -> Result<MacroInput, ValidationError> {
        let [item, model, description, vendor] = [
            (REQUIRED_FIELDS[0], self.item),
            (REQUIRED_FIELDS[1], self.model),
            (REQUIRED_FIELDS[2], self.description),
            (REQUIRED_FIELDS[3], self.vendor),
        ]
        .map(|(field, value)| required(field, value));

        Ok(MacroInput {
            item: item?,
            model: model?,
            description: description?,
            vendor: vendor?,
            multiplier: parse_multiplier(self.multiplier)?,
            notes: self
                .notes
                .filter(|n| !n.is_empty())
                .map(|n| n.trim().to_owned()),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ValidationError::Required { field }),
    }
}

fn parse_multiplier(input: Option<NumericInput>) -> Result<Option<Decimal>, ValidationError> {
    let text = match input {
        None => return Ok(None),
        Some(NumericInput::Text(s)) if s.is_empty() => return Ok(None),
        Some(NumericInput::Text(s)) => s,
        Some(NumericInput::Number(n)) => n.to_string(),
        Some(NumericInput::Other(_)) => {
            return Err(ValidationError::NotNumeric { field: "multiplier" })
        }
    };

    match parse_decimal(&text) {
        Ok(d) => Ok(Some(d)),
        Err(DecimalError::NotNumeric) => Err(ValidationError::NotNumeric { field: "multiplier" }),
        Err(DecimalError::OutOfRange) => Err(ValidationError::OutOfRange {
            field: "multiplier",
            max_integer_digits: MULTIPLIER_INTEGER_DIGITS,
        }),
    }
}

/// Why a multiplier string was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalError {
    /// Not a decimal literal at all
    NotNumeric,
    /// A number, but its integer part does not fit the column
    OutOfRange,
}

/// Parse a decimal from plain (`"12.3456"`) or scientific (`"1.5e3"`) notation.
///
/// The value is rounded half away from zero to `MULTIPLIER_SCALE` places,
/// the way `NUMERIC(12, 4)` stores it, so `"1e-30"` becomes `0.0000`. A
/// rounded value with more than `MULTIPLIER_INTEGER_DIGITS` integer digits
/// is `OutOfRange`.
pub fn parse_decimal(s: &str) -> Result<Decimal, DecimalError> {
    let s = s.trim();
    let caps = DECIMAL_RE.captures(s).ok_or(DecimalError::NotNumeric)?;

    if let Ok(d) = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        return within_column(
            d.round_dp_with_strategy(MULTIPLIER_SCALE, RoundingStrategy::MidpointAwayFromZero),
        );
    }

    let negative = &caps["sign"] == "-";
    let int = caps.name("int").map_or("", |m| m.as_str());
    let frac = caps
        .name("frac")
        .or_else(|| caps.name("frac_only"))
        .map_or("", |m| m.as_str());
    let digits: Vec<u8> = int.bytes().chain(frac.bytes()).map(|b| b - b'0').collect();

    // value = 0.d0 d1 d2 ... * 10^point
    let point = match caps.name("exp").map(|m| m.as_str().parse::<i64>()) {
        None => int.len() as i64,
        Some(Ok(exp)) => (int.len() as i64).saturating_add(exp),
        Some(Err(_)) if caps["exp"].starts_with('-') => i64::MIN,
        Some(Err(_)) => i64::MAX,
    };

    let Some(first_nonzero) = digits.iter().position(|&d| d != 0) else {
        return Ok(Decimal::new(0, MULTIPLIER_SCALE));
    };
    if point.saturating_sub(first_nonzero as i64) > MULTIPLIER_INTEGER_DIGITS as i64 {
        return Err(DecimalError::OutOfRange);
    }

    // At most 8 integer digits remain, so the scaled mantissa fits in i64
    let digit_at = |k: i64| -> i64 {
        usize::try_from(k)
            .ok()
            .and_then(|k| digits.get(k))
            .map_or(0, |&d| i64::from(d))
    };
    let cut = point.saturating_add(MULTIPLIER_SCALE as i64);
    let mut mantissa = (first_nonzero as i64..cut).fold(0i64, |acc, k| acc * 10 + digit_at(k));
    if digit_at(cut) >= 5 {
        mantissa += 1;
    }
    if negative {
        mantissa = -mantissa;
    }

    within_column(Decimal::new(mantissa, MULTIPLIER_SCALE))
}

fn within_column(d: Decimal) -> Result<Decimal, DecimalError> {
    if d.abs() >= Decimal::from(10u64.pow(MULTIPLIER_INTEGER_DIGITS)) {
        Err(DecimalError::OutOfRange)
    } else {
        Ok(d)
    }
}

/// Stored macro row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Macro {
    pub id: String,
    pub item: String,
    pub model: String,
    pub description: String,
    pub vendor: String,
    #[serde(serialize_with = "decimal_as_number")]
    pub multiplier: Option<Decimal>,
    pub notes: Option<String>,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl Macro {
    /// Build a row from validated input. Used by stores that assign the id
    /// and timestamp themselves.
    pub fn from_input(id: String, input: MacroInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            item: input.item,
            model: input.model,
            description: input.description,
            vendor: input.vendor,
            multiplier: input.multiplier,
            notes: input.notes,
            created_at,
        }
    }
}

/// JSON number via the decimal's text form, so the float is the nearest
/// double to the exact value.
fn decimal_as_number<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => {
            let f: f64 = d
                .to_string()
                .parse::<f64>()
                .map_err(<S::Error as serde::ser::Error>::custom)?;
            serializer.serialize_f64(f)
        }
        None => serializer.serialize_none(),
    }
}

/// `2024-05-01T12:30:00+00:00`, with `.ffffff` only when microseconds are set
fn iso8601<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    let format = if ts.nanosecond() / 1_000 == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    serializer.serialize_str(&ts.to_rfc3339_opts(format, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> MacroPayload {
        serde_json::from_value(value).unwrap()
    }

    fn widget() -> serde_json::Value {
        json!({"item": "Widget", "model": "X1", "description": "d", "vendor": "Acme"})
    }

    #[test]
    fn minimal_payload_is_valid() {
        let input = payload(widget()).validate().unwrap();
        assert_eq!(input.item, "Widget");
        assert_eq!(input.multiplier, None);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn required_fields_are_trimmed() {
        let input = payload(json!({
            "item": "  Widget ", "model": "X1\n", "description": " d", "vendor": "Acme  "
        }))
        .validate()
        .unwrap();
        assert_eq!(input.item, "Widget");
        assert_eq!(input.model, "X1");
        assert_eq!(input.description, "d");
        assert_eq!(input.vendor, "Acme");
    }

    #[test]
    fn first_missing_field_wins() {
        let err = payload(json!({"description": "d"})).validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "item" });

        let err = payload(json!({"item": "a", "vendor": "v"})).validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "model" });

        let err = payload(json!({"item": "a", "model": "m", "description": "   ", "vendor": ""}))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "description" });
    }

    #[test]
    fn empty_payload_reports_item() {
        let err = MacroPayload::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "item is required");
    }

    #[test]
    fn required_check_runs_before_multiplier() {
        let err = payload(json!({"item": "a", "multiplier": "abc"})).validate().unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "model" });
    }

    #[test]
    fn multiplier_empty_or_null_is_none() {
        for m in [json!(""), json!(null)] {
            let mut body = widget();
            body["multiplier"] = m;
            assert_eq!(payload(body).validate().unwrap().multiplier, None);
        }
    }

    #[test]
    fn multiplier_keeps_exact_decimal() {
        let mut body = widget();
        body["multiplier"] = json!("12.3456");
        let input = payload(body).validate().unwrap();
        assert_eq!(input.multiplier, Some(Decimal::new(123456, 4)));
    }

    #[test]
    fn multiplier_accepts_json_numbers_and_padding() {
        let mut body = widget();
        body["multiplier"] = json!(2.5);
        assert_eq!(payload(body).validate().unwrap().multiplier, Some(Decimal::new(25, 1)));

        let mut body = widget();
        body["multiplier"] = json!(3);
        assert_eq!(payload(body).validate().unwrap().multiplier, Some(Decimal::from(3)));

        let mut body = widget();
        body["multiplier"] = json!(" 1.5e2 ");
        assert_eq!(payload(body).validate().unwrap().multiplier, Some(Decimal::from(150)));
    }

    #[test]
    fn multiplier_rejects_non_numeric() {
        for m in [json!("abc"), json!(" "), json!(true), json!([1]), json!({"v": 1})] {
            let mut body = widget();
            body["multiplier"] = m.clone();
            let err = payload(body).validate().unwrap_err();
            assert_eq!(err, ValidationError::NotNumeric { field: "multiplier" }, "{m}");
        }
    }

    #[test]
    fn multiplier_underflow_rounds_to_zero() {
        for m in [json!("1e-30"), json!(1e-30), json!("-0.00000000000000000000000000000001")] {
            let mut body = widget();
            body["multiplier"] = m.clone();
            let value = payload(body).validate().unwrap().multiplier;
            assert_eq!(value, Some(Decimal::ZERO), "{m}");
        }
    }

    #[test]
    fn multiplier_rounds_overlong_fraction_to_scale() {
        let long = format!("1.2345{}", "9".repeat(40));
        assert_eq!(parse_decimal(&long), Ok(Decimal::new(12346, 4)));
        assert_eq!(parse_decimal(".5e-4"), Ok(Decimal::new(1, 4)));
        assert_eq!(parse_decimal("-0.00005"), Ok(Decimal::new(-1, 4)));
        assert_eq!(parse_decimal("99999999.99995"), Err(DecimalError::OutOfRange));
    }

    #[test]
    fn multiplier_overflow_is_distinct_from_not_numeric() {
        for m in [
            json!("123456789012345678901234567890"),
            json!(1e30),
            json!("123456789.5"),
            json!("-1e8"),
            json!("1e999999999999999999999"),
        ] {
            let mut body = widget();
            body["multiplier"] = m.clone();
            let err = payload(body).validate().unwrap_err();
            assert_eq!(
                err,
                ValidationError::OutOfRange {
                    field: "multiplier",
                    max_integer_digits: MULTIPLIER_INTEGER_DIGITS,
                },
                "{m}"
            );
        }
    }

    #[test]
    fn multiplier_at_column_limit_is_accepted() {
        assert_eq!(parse_decimal("99999999.9999"), Ok(Decimal::new(999_999_999_999, 4)));
        assert_eq!(parse_decimal("-1e7"), Ok(Decimal::from(-10_000_000)));
        assert_eq!(parse_decimal("1e-999999999999999999999"), Ok(Decimal::ZERO));
        assert_eq!(parse_decimal("1.2.3"), Err(DecimalError::NotNumeric));
        assert_eq!(parse_decimal("NaN"), Err(DecimalError::NotNumeric));
        assert_eq!(parse_decimal("."), Err(DecimalError::NotNumeric));
    }

    #[test]
    fn notes_empty_is_none_otherwise_trimmed() {
        let mut body = widget();
        body["notes"] = json!("");
        assert_eq!(payload(body).validate().unwrap().notes, None);

        let mut body = widget();
        body["notes"] = json!("   ");
        assert_eq!(payload(body).validate().unwrap().notes.as_deref(), Some(""));

        let mut body = widget();
        body["notes"] = json!("  keep me ");
        assert_eq!(payload(body).validate().unwrap().notes.as_deref(), Some("keep me"));
    }

    #[test]
    fn serializes_multiplier_as_number() {
        let input = MacroInput {
            item: "Widget".into(),
            model: "X1".into(),
            description: "d".into(),
            vendor: "Acme".into(),
            multiplier: Some(Decimal::new(123456, 4)),
            notes: None,
        };
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let row = Macro::from_input("abc".into(), input, created_at);

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["multiplier"], json!(12.3456));
        assert_eq!(value["notes"], json!(null));
        assert_eq!(value["created_at"], json!("2024-05-01T12:30:00+00:00"));
    }

    #[test]
    fn serializes_created_at_with_microseconds_when_present() {
        let created_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();
        let row = Macro::from_input("abc".into(), payload(widget()).validate().unwrap(), created_at);
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["created_at"], json!("2024-05-01T12:30:00.123456+00:00"));
    }

    #[test]
    fn serializes_missing_multiplier_as_null() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let row = Macro::from_input(
            "abc".into(),
            payload(widget()).validate().unwrap(),
            created_at,
        );
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["multiplier"], json!(null));
    }
}

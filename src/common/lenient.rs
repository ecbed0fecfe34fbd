// src/common/lenient.rs
//
// Deserializers for records written by the UI layer. Numeric fields may arrive
// as numbers, numeric strings, empty strings or garbage; dates may carry a
// time component. Anything unusable becomes "absent" so it counts as zero
// instead of poisoning a sum.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Normalizes a raw JSON value into a decimal. `None` means absent.
pub fn normalize_decimal(raw: &Value) -> Option<Decimal> {
    match raw {
        Value::Null => None,
        Value::Number(n) => {
            let parsed = if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            };
            if parsed.is_none() {
                warn_normalized(raw);
            }
            parsed
        }
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match Decimal::from_str(s.trim()) {
            Ok(d) => Some(d),
            Err(_) => {
                warn_normalized(raw);
                None
            }
        },
        other => {
            warn_normalized(other);
            None
        }
    }
}

fn warn_normalized(raw: &Value) {
    tracing::warn!(value = %raw, "numeric normalization: malformed value treated as zero");
}

/// `#[serde(deserialize_with = "lenient::decimal")]` on `Option<Decimal>` fields.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_decimal(&raw))
}

/// Same as [`decimal`] for fields that default to zero.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_decimal(&raw).unwrap_or(Decimal::ZERO))
}

/// Parses `YYYY-MM-DD`, ignoring any trailing time-of-day component.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Calendar-day deserializer for record dates.
pub fn day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_parse() {
        assert_eq!(normalize_decimal(&json!(8)), Some(dec!(8)));
        assert_eq!(normalize_decimal(&json!(12.5)), Some(dec!(12.5)));
        assert_eq!(normalize_decimal(&json!(" 3.25 ")), Some(dec!(3.25)));
    }

    #[test]
    fn malformed_values_become_absent() {
        assert_eq!(normalize_decimal(&json!("")), None);
        assert_eq!(normalize_decimal(&json!("abc")), None);
        assert_eq!(normalize_decimal(&json!(true)), None);
        assert_eq!(normalize_decimal(&json!(null)), None);
        assert_eq!(normalize_decimal(&json!({"x": 1})), None);
    }

    #[test]
    fn day_ignores_time_component() {
        assert_eq!(parse_day("2024-01-03"), NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(
            parse_day("2024-01-03T23:59:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
        assert_eq!(parse_day("03/01/2024"), None);
        assert_eq!(parse_day("2024"), None);
    }
}

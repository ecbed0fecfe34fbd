// src/models/work_log.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

/// One worker-day. Carries hourly fields, contract fields, or both.
///
/// `daily_earnings` is stamped at entry time. Payslips recompute earnings from
/// the raw fields instead of summing it (see `services::earnings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: String,

    pub worker_id: String,

    #[serde(default)]
    pub worker_name: Option<String>,

    #[serde(deserialize_with = "lenient::day")]
    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,

    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>, example = 8.0)]
    pub hours: Option<Decimal>,

    // Contract name or ad-hoc task label
    #[serde(default)]
    pub contract_job: Option<String>,

    // Flat amount, overrides units * unit_rate
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>)]
    pub contract_amount: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>)]
    pub units: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>)]
    pub unit_rate: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64)]
    pub daily_earnings: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_work_entry"))]
pub struct WorkLogPayload {
    #[validate(length(min = 1, message = "required"))]
    pub worker_id: String,

    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub date: NaiveDate,

    #[schema(value_type = Option<f64>, example = 8.0)]
    pub hours: Option<Decimal>,

    // Either a stored contract...
    pub contract_id: Option<String>,

    // ...or an ad-hoc task label
    #[validate(length(max = 100, message = "task must be at most 100 characters"))]
    pub task: Option<String>,

    #[schema(value_type = Option<f64>)]
    pub contract_amount: Option<Decimal>,

    #[schema(value_type = Option<f64>)]
    pub units: Option<Decimal>,

    // Ignored when `contract_id` is set; the contract's rate is snapshotted
    #[schema(value_type = Option<f64>)]
    pub unit_rate: Option<Decimal>,
}

fn check_range(
    value: Option<Decimal>,
    max: i64,
    code: &'static str,
    message: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::from(max) => {
            Err(ValidationError::new(code).with_message(message.into()))
        }
        _ => Ok(()),
    }
}

fn validate_work_entry(payload: &WorkLogPayload) -> Result<(), ValidationError> {
    check_range(payload.hours, 24, "hours_range", "hours must be 0-24")?;
    check_range(payload.units, 10_000, "units_range", "units must be 0-10000")?;
    check_range(
        payload.contract_amount,
        100_000,
        "contract_amount_range",
        "contract amount must be 0-100000",
    )?;
    check_range(payload.unit_rate, 10_000, "unit_rate_range", "unit rate must be 0-10000")?;

    let has_hours = payload.hours.is_some();
    let has_contract = payload.contract_amount.is_some() || payload.units.is_some();
    if !has_hours && !has_contract {
        return Err(ValidationError::new("empty_entry")
            .with_message("a work entry needs hours or contract work".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkHoursEntry {
    pub worker_id: String,

    // Falls back to the bulk default when absent
    #[schema(value_type = Option<f64>)]
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkHourlyPayload {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[schema(value_type = f64, example = 8.0)]
    pub default_hours: Decimal,

    #[validate(length(min = 1, message = "select at least one worker"))]
    pub entries: Vec<BulkHoursEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUnitsEntry {
    pub worker_id: String,

    #[schema(value_type = f64)]
    pub units: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUnitsPayload {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[validate(length(min = 1, message = "required"))]
    pub contract_id: String,

    #[validate(length(min = 1, message = "select at least one worker"))]
    pub entries: Vec<BulkUnitsEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogFilter {
    pub worker_id: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_coercion_artifacts_normalize() {
        let log: WorkLog = serde_json::from_value(json!({
            "id": "1",
            "workerId": "w1",
            "date": "2024-01-02T00:00:00.000Z",
            "hours": "",
            "contractJob": null,
            "contractAmount": "NaN",
            "units": "4",
            "unitRate": 2.5,
            "dailyEarnings": 10
        }))
        .unwrap();

        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(log.hours, None);
        assert_eq!(log.contract_amount, None);
        assert_eq!(log.units, Some(Decimal::from(4)));
    }

    #[test]
    fn empty_entry_is_rejected() {
        let payload = WorkLogPayload {
            worker_id: "w1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            hours: None,
            contract_id: None,
            task: None,
            contract_amount: None,
            units: None,
            unit_rate: None,
        };
        assert!(payload.validate().is_err());
    }
}

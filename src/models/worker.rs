// src/models/worker.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayType {
    Hourly,
    Contract,
    Both,
}

impl PayType {
    pub fn is_hourly(self) -> bool {
        matches!(self, PayType::Hourly | PayType::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[schema(example = "1718000000000")]
    pub id: String,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[serde(default)]
    pub contact: Option<String>,

    pub pay_type: PayType,

    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>, example = 20.0)]
    pub hourly_rate: Option<Decimal>,

    // UI convenience only
    #[serde(default)]
    pub task_descriptions: Vec<String>,

    #[serde(default)]
    pub car_fare: bool,

    #[serde(default, deserialize_with = "lenient::decimal")]
    #[schema(value_type = Option<f64>)]
    pub car_fare_amount: Option<Decimal>,

    // Flat, deducted once per payslip
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 50.0)]
    pub weekly_rent: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_worker_rates", skip_on_field_errors = false))]
pub struct WorkerPayload {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    #[schema(example = "Jane Doe")]
    pub name: String,

    #[validate(length(max = 50, message = "contact must be at most 50 characters"))]
    pub contact: Option<String>,

    pub pay_type: PayType,

    #[schema(value_type = Option<f64>, example = 20.0)]
    pub hourly_rate: Option<Decimal>,

    #[serde(default)]
    pub task_descriptions: Vec<String>,

    #[serde(default)]
    pub car_fare: bool,

    #[schema(value_type = Option<f64>)]
    pub car_fare_amount: Option<Decimal>,

    #[serde(default)]
    #[schema(value_type = f64, example = 50.0)]
    pub weekly_rent: Decimal,
}

fn out_of_range(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_worker_rates(payload: &WorkerPayload) -> Result<(), ValidationError> {
    match payload.hourly_rate {
        None if payload.pay_type.is_hourly() => {
            return Err(out_of_range(
                "hourly_rate_required",
                "hourly rate is required for hourly workers",
            ));
        }
        Some(rate) if rate < Decimal::ZERO || rate > Decimal::from(1000) => {
            return Err(out_of_range("hourly_rate_range", "hourly rate must be 0-1000"));
        }
        _ => {}
    }

    if payload.weekly_rent < Decimal::ZERO || payload.weekly_rent > Decimal::from(10_000) {
        return Err(out_of_range("weekly_rent_range", "weekly rent must be 0-10000"));
    }

    if let Some(amount) = payload.car_fare_amount {
        if amount < Decimal::ZERO || amount > Decimal::from(1000) {
            return Err(out_of_range("car_fare_range", "car fare amount must be 0-1000"));
        }
    }

    Ok(())
}

impl WorkerPayload {
    pub fn into_worker(self, id: String) -> Worker {
        let task_descriptions = self
            .task_descriptions
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Worker {
            id,
            name: self.name.trim().to_string(),
            contact: self.contact.filter(|c| !c.trim().is_empty()),
            pay_type: self.pay_type,
            hourly_rate: self.hourly_rate,
            task_descriptions,
            car_fare: self.car_fare,
            car_fare_amount: if self.car_fare { self.car_fare_amount } else { None },
            weekly_rent: self.weekly_rent,
        }
    }
}

/// Counts returned by the cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRemoval {
    pub work_logs_removed: usize,
    pub advances_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;
    use serde_json::json;

    fn payload(pay_type: PayType, hourly_rate: Option<Decimal>) -> WorkerPayload {
        WorkerPayload {
            name: "Jane Doe".into(),
            contact: None,
            pay_type,
            hourly_rate,
            task_descriptions: vec![],
            car_fare: false,
            car_fare_amount: None,
            weekly_rent: dec!(50),
        }
    }

    #[test]
    fn hourly_rate_required_only_for_hourly_pay() {
        assert!(payload(PayType::Hourly, None).validate().is_err());
        assert!(payload(PayType::Both, None).validate().is_err());
        assert!(payload(PayType::Contract, None).validate().is_ok());
        assert!(payload(PayType::Hourly, Some(dec!(20))).validate().is_ok());
        assert!(payload(PayType::Hourly, Some(dec!(1001))).validate().is_err());
    }

    #[test]
    fn legacy_record_with_blank_numbers_loads() {
        let worker: Worker = serde_json::from_value(json!({
            "id": "1",
            "name": "Sam",
            "payType": "contract",
            "hourlyRate": "",
            "carFare": true,
            "carFareAmount": "5",
            "weeklyRent": null
        }))
        .unwrap();

        assert_eq!(worker.hourly_rate, None);
        assert_eq!(worker.car_fare_amount, Some(dec!(5)));
        assert_eq!(worker.weekly_rent, Decimal::ZERO);
        assert!(worker.task_descriptions.is_empty());
    }

    #[test]
    fn car_fare_amount_dropped_when_disabled() {
        let mut p = payload(PayType::Contract, None);
        p.car_fare_amount = Some(dec!(4));
        let worker = p.into_worker("w".into());
        assert_eq!(worker.car_fare_amount, None);
    }
}

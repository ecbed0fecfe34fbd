// src/models/car_fare.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CarFareType {
    Bulk,
    Individual,
}

/// At most one entry per (worker, date); enforced when entries are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarFareEntry {
    pub id: String,

    pub worker_id: String,

    #[serde(default)]
    pub worker_name: Option<String>,

    #[serde(deserialize_with = "lenient::day")]
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 5.0)]
    pub amount: Decimal,

    #[serde(rename = "type")]
    pub kind: CarFareType,
}

fn validate_fare(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO || *amount > Decimal::from(1000) {
        return Err(ValidationError::new("amount_range")
            .with_message("car fare must be greater than 0 and at most 1000".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarFarePayload {
    #[validate(length(min = 1, message = "required"))]
    pub worker_id: String,

    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[validate(custom(function = "validate_fare"))]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCarFarePayload {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[validate(custom(function = "validate_fare"))]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCarFareOutcome {
    pub added: usize,
    // Eligible workers that already had an entry that day
    pub already_present: usize,
}

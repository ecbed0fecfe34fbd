// src/models/advance.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advance {
    pub id: String,

    pub worker_id: String,

    #[serde(deserialize_with = "lenient::day")]
    #[schema(value_type = String, format = Date, example = "2024-01-02")]
    pub date: NaiveDate,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Decimal,

    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvancePayload {
    #[validate(length(min = 1, message = "required"))]
    pub worker_id: String,

    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[validate(custom(function = "validate_advance_amount"))]
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Decimal,

    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

fn validate_advance_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::new(1, 2) || *amount > Decimal::from(100_000) {
        return Err(ValidationError::new("amount_range")
            .with_message("amount must be 0.01-100000".into()));
    }
    Ok(())
}

/// Per-worker roll-up shown next to the advances list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceSummary {
    pub worker_id: String,
    pub worker_name: String,

    #[schema(value_type = f64)]
    pub total_amount: Decimal,

    pub count: usize,

    #[schema(value_type = String, format = Date)]
    pub last_advance_date: NaiveDate,
}

// src/models/contract.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::lenient;

/// Reference data only. Work logs snapshot `name` and `rate` when created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,

    #[schema(example = "Brick laying")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    #[schema(value_type = f64, example = 3.0)]
    pub rate: Decimal,

    #[schema(example = "brick")]
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractPayload {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_contract_rate"))]
    #[schema(value_type = f64)]
    pub rate: Decimal,

    #[validate(length(min = 1, max = 50, message = "unit must be 1-50 characters"))]
    pub unit: String,
}

fn validate_contract_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate < Decimal::ZERO || *rate > Decimal::from(10_000) {
        return Err(ValidationError::new("rate_range").with_message("rate must be 0-10000".into()));
    }
    Ok(())
}

impl ContractPayload {
    pub fn into_contract(self, id: String) -> Contract {
        Contract {
            id,
            name: self.name.trim().to_string(),
            rate: self.rate,
            unit: self.unit.trim().to_string(),
        }
    }
}

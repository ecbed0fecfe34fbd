// src/models/payslip.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::{advance::Advance, car_fare::CarFareEntry, work_log::WorkLog},
};

/// Inclusive `[start, end]` day range a payslip covers. Not necessarily 7 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayWindow {
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
}

impl PayWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    #[schema(value_type = f64)]
    pub hourly: Decimal,
    #[schema(value_type = f64)]
    pub contract: Decimal,
    #[schema(value_type = f64)]
    pub total: Decimal,
    #[schema(value_type = f64)]
    pub total_hours: Decimal,
    #[schema(value_type = f64)]
    pub total_units: Decimal,
    // One per work log, even when a log has both hourly and contract work
    pub work_days: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    #[schema(value_type = f64)]
    pub total_advances: Decimal,
    #[schema(value_type = f64)]
    pub weekly_rent_deduction: Decimal,
    #[schema(value_type = f64)]
    pub total_car_fare_deductions: Decimal,
    #[schema(value_type = f64)]
    pub total_deductions: Decimal,
}

/// A computed payslip. `net_pay` can be negative; it is never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub worker_id: String,
    pub worker_name: String,

    #[schema(value_type = String, format = Date)]
    pub week_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub week_end: NaiveDate,

    pub work_logs: Vec<WorkLog>,
    pub advances: Vec<Advance>,
    pub car_fare_entries: Vec<CarFareEntry>,

    pub earnings: Earnings,

    #[serde(flatten)]
    pub deductions: Deductions,

    #[schema(value_type = f64)]
    pub net_pay: Decimal,

    #[schema(value_type = String, format = Date)]
    pub generated_date: NaiveDate,

    pub company_name: String,
}

/// History record: the payslip plus the fields added when it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedPayslip {
    pub id: String,

    #[serde(flatten)]
    pub payslip: Payslip,

    // Alias of earnings.total
    #[schema(value_type = f64)]
    pub total_gross_earnings: Decimal,

    pub saved: bool,
}

impl SavedPayslip {
    pub fn new(id: String, payslip: Payslip) -> Self {
        let total_gross_earnings = payslip.earnings.total;
        Self {
            id,
            payslip,
            total_gross_earnings,
            saved: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayslipRequest {
    pub worker_id: String,

    #[schema(value_type = String, format = Date, example = "2024-01-01")]
    pub week_start: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2024-01-07")]
    pub week_end: NaiveDate,

    #[serde(default)]
    pub include_advances: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    pub worker_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn window_rejects_reversed_range() {
        let err = PayWindow::new(day(7), day(1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange { .. }));
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let window = PayWindow::new(day(1), day(7)).unwrap();
        assert!(window.contains(day(1)));
        assert!(window.contains(day(7)));
        assert!(!window.contains(day(8)));

        let single = PayWindow::new(day(3), day(3)).unwrap();
        assert!(single.contains(day(3)));
    }
}

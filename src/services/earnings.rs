// src/services/earnings.rs
//
// Earnings are always recomputed from a log's raw fields and the worker's
// current hourly rate. The `dailyEarnings` stamped on the log at entry time is
// not consulted, so a rate change applies retroactively to unsaved payslips.

use rust_decimal::Decimal;

use crate::models::{payslip::Earnings, work_log::WorkLog, worker::Worker};

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Hourly component of a single log, if any.
fn hourly_part(log: &WorkLog, worker: &Worker) -> Option<(Decimal, Decimal)> {
    let hours = positive(log.hours)?;
    let rate = positive(worker.hourly_rate)?;
    Some((hours, hours * rate))
}

/// Contract component of a single log: a flat amount wins over units x rate.
/// Returns `(units counted, earnings)`.
fn contract_part(log: &WorkLog) -> Option<(Decimal, Decimal)> {
    if let Some(flat) = log.contract_amount {
        return Some((Decimal::ZERO, flat));
    }
    match (log.units, log.unit_rate) {
        (Some(units), Some(rate)) => Some((units, units * rate)),
        _ => None,
    }
}

/// Contract earnings of one log, zero when it has no contract work.
pub fn contract_earnings(log: &WorkLog) -> Decimal {
    contract_part(log).map(|(_, e)| e).unwrap_or_default()
}

/// Earnings of one log under the current policy (used for entry-time stamps
/// and for per-log rows on rendered payslips).
pub fn log_earnings(log: &WorkLog, worker: &Worker) -> Decimal {
    let hourly = hourly_part(log, worker).map(|(_, e)| e).unwrap_or_default();
    hourly + contract_earnings(log)
}

/// Sums earnings over logs already filtered to one worker and pay window.
pub fn compute_earnings(work_logs: &[WorkLog], worker: &Worker) -> Earnings {
    let mut earnings = Earnings {
        work_days: work_logs.len(),
        ..Earnings::default()
    };

    for log in work_logs {
        if let Some((hours, amount)) = hourly_part(log, worker) {
            earnings.hourly += amount;
            earnings.total_hours += hours;
        }
        if let Some((units, amount)) = contract_part(log) {
            earnings.contract += amount;
            earnings.total_units += units;
        }
    }

    earnings.total = earnings.hourly + earnings.contract;
    earnings
}

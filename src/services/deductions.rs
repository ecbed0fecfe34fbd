// src/services/deductions.rs

use rust_decimal::Decimal;

use crate::models::{
    advance::Advance, car_fare::CarFareEntry, payslip::Deductions, worker::Worker,
};

/// Sums the already-filtered deduction streams. Rent is flat per payslip,
/// whatever the window length.
pub fn compute_deductions(
    advances: &[Advance],
    car_fare_entries: &[CarFareEntry],
    worker: &Worker,
) -> Deductions {
    let total_advances: Decimal = advances.iter().map(|a| a.amount).sum();
    let total_car_fare_deductions: Decimal = car_fare_entries.iter().map(|e| e.amount).sum();
    let weekly_rent_deduction = worker.weekly_rent;

    Deductions {
        total_advances,
        weekly_rent_deduction,
        total_car_fare_deductions,
        total_deductions: total_advances + weekly_rent_deduction + total_car_fare_deductions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{car_fare::CarFareType, worker::PayType};
    use chrono::NaiveDate;
    use rust_decimal::dec;

    fn worker(rent: Decimal) -> Worker {
        Worker {
            id: "w1".into(),
            name: "Jane".into(),
            contact: None,
            pay_type: PayType::Contract,
            hourly_rate: None,
            task_descriptions: vec![],
            car_fare: true,
            car_fare_amount: None,
            weekly_rent: rent,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn sums_all_three_streams() {
        let advances = vec![
            Advance { id: "a1".into(), worker_id: "w1".into(), date: day(2), amount: dec!(30), notes: None },
            Advance { id: "a2".into(), worker_id: "w1".into(), date: day(4), amount: dec!(12.5), notes: None },
        ];
        let fares = vec![CarFareEntry {
            id: "f1".into(),
            worker_id: "w1".into(),
            worker_name: None,
            date: day(3),
            amount: dec!(5),
            kind: CarFareType::Bulk,
        }];

        let d = compute_deductions(&advances, &fares, &worker(dec!(50)));
        assert_eq!(d.total_advances, dec!(42.5));
        assert_eq!(d.total_car_fare_deductions, dec!(5));
        assert_eq!(d.weekly_rent_deduction, dec!(50));
        assert_eq!(d.total_deductions, dec!(97.5));
    }

    #[test]
    fn rent_applies_with_no_records() {
        let d = compute_deductions(&[], &[], &worker(dec!(40)));
        assert_eq!(d.total_deductions, dec!(40));
        assert_eq!(d.total_advances, Decimal::ZERO);
    }
}

// src/services/payslip_service.rs

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filenames},
    db::{CollectionKey, RecordStore},
    models::{
        advance::Advance,
        car_fare::CarFareEntry,
        payslip::{HistoryFilter, PayWindow, Payslip, PayslipRequest, SavedPayslip},
        settings::Settings,
        work_log::WorkLog,
        worker::Worker,
    },
    services::{
        deductions::compute_deductions,
        document_service::{DocumentRenderer, RenderedDocument},
        earnings::compute_earnings,
    },
};

/// Every record stream, loaded once. Builds against a snapshot never see
/// writes that happen after it was taken.
#[derive(Debug, Clone, Default)]
pub struct RecordSnapshot {
    pub workers: Vec<Worker>,
    pub work_logs: Vec<WorkLog>,
    pub advances: Vec<Advance>,
    pub car_fare_entries: Vec<CarFareEntry>,
    pub settings: Settings,
}

impl RecordSnapshot {
    pub async fn load(store: &RecordStore) -> Result<Self, AppError> {
        Ok(Self {
            workers: store.load_records(CollectionKey::Workers).await?,
            work_logs: store.load_records(CollectionKey::WorkLogs).await?,
            advances: store.load_records(CollectionKey::Advances).await?,
            car_fare_entries: store.load_records(CollectionKey::CarFareEntries).await?,
            settings: store.load_document(CollectionKey::Settings).await?,
        })
    }

    pub fn worker(&self, worker_id: &str) -> Result<&Worker, AppError> {
        self.workers
            .iter()
            .find(|w| w.id == worker_id)
            .ok_or_else(|| AppError::WorkerNotFound(worker_id.to_string()))
    }
}

fn in_window<'a, T, F>(records: &'a [T], worker_id: &str, window: PayWindow, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&'a T) -> (&'a str, NaiveDate),
{
    records
        .iter()
        .filter(|r| {
            let (owner, day) = key(*r);
            owner == worker_id && window.contains(day)
        })
        .cloned()
        .collect()
}

/// Assembles a payslip for a worker already resolved from the snapshot.
pub fn build_for_worker(
    snapshot: &RecordSnapshot,
    worker: &Worker,
    window: PayWindow,
    include_advances: bool,
    generated_date: NaiveDate,
) -> Payslip {
    let work_logs = in_window(&snapshot.work_logs, &worker.id, window, |l| {
        (l.worker_id.as_str(), l.date)
    });
    // Opting out only affects this payslip's math; stored advances are untouched.
    let advances = if include_advances {
        in_window(&snapshot.advances, &worker.id, window, |a| {
            (a.worker_id.as_str(), a.date)
        })
    } else {
        Vec::new()
    };
    let car_fare_entries = in_window(&snapshot.car_fare_entries, &worker.id, window, |e| {
        (e.worker_id.as_str(), e.date)
    });

    let earnings = compute_earnings(&work_logs, worker);
    let deductions = compute_deductions(&advances, &car_fare_entries, worker);
    let net_pay = earnings.total - deductions.total_deductions;

    Payslip {
        worker_id: worker.id.clone(),
        worker_name: worker.name.clone(),
        week_start: window.start,
        week_end: window.end,
        work_logs,
        advances,
        car_fare_entries,
        earnings,
        deductions,
        net_pay,
        generated_date,
        company_name: snapshot.settings.company_name().to_string(),
    }
}

/// Validates the range, resolves the worker, then builds.
pub fn build_payslip(
    snapshot: &RecordSnapshot,
    worker_id: &str,
    week_start: NaiveDate,
    week_end: NaiveDate,
    include_advances: bool,
    generated_date: NaiveDate,
) -> Result<Payslip, AppError> {
    let window = PayWindow::new(week_start, week_end)?;
    let worker = snapshot.worker(worker_id)?;
    Ok(build_for_worker(snapshot, worker, window, include_advances, generated_date))
}

/// Checks that a client-supplied payslip is internally consistent: every
/// record belongs to the worker and window, and the earnings, deductions and
/// net pay equal what the builder derives from those records.
pub fn verify_payslip(payslip: &Payslip, worker: &Worker) -> Result<(), AppError> {
    let window = PayWindow::new(payslip.week_start, payslip.week_end)?;

    let belongs = |owner: &str, day: NaiveDate| owner == worker.id && window.contains(day);
    let foreign = payslip.work_logs.iter().any(|l| !belongs(&l.worker_id, l.date))
        || payslip.advances.iter().any(|a| !belongs(&a.worker_id, a.date))
        || payslip.car_fare_entries.iter().any(|e| !belongs(&e.worker_id, e.date));
    if foreign {
        return Err(AppError::BadRequest(
            "payslip holds records of another worker or outside its window".into(),
        ));
    }

    let earnings = compute_earnings(&payslip.work_logs, worker);
    let deductions = compute_deductions(&payslip.advances, &payslip.car_fare_entries, worker);
    let net_pay = earnings.total - deductions.total_deductions;
    if payslip.earnings != earnings || payslip.deductions != deductions || payslip.net_pay != net_pay {
        tracing::warn!(worker_id = %worker.id, "payslip totals do not match its records");
        return Err(AppError::BadRequest(
            "payslip totals do not match its records; preview it again".into(),
        ));
    }
    Ok(())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Clone)]
pub struct PayslipService {
    store: RecordStore,
    renderer: Arc<dyn DocumentRenderer>,
}

impl PayslipService {
    pub fn new(store: RecordStore, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self { store, renderer }
    }

    /// Builds without persisting anything.
    pub async fn preview(&self, request: &PayslipRequest) -> Result<Payslip, AppError> {
        let snapshot = RecordSnapshot::load(&self.store).await?;
        build_payslip(
            &snapshot,
            &request.worker_id,
            request.week_start,
            request.week_end,
            request.include_advances,
            today(),
        )
    }

    /// Persists a payslip into history once its totals check out against its
    /// own records and the stored worker.
    pub async fn save(&self, payslip: Payslip) -> Result<SavedPayslip, AppError> {
        let _writes = self.store.write_lock().await;

        // 1. Resolve the worker the payslip claims to be for
        let workers: Vec<Worker> = self.store.load_records(CollectionKey::Workers).await?;
        let worker = workers
            .iter()
            .find(|w| w.id == payslip.worker_id)
            .ok_or_else(|| AppError::WorkerNotFound(payslip.worker_id.clone()))?;

        // 2. Recompute from the submitted records and reject any drift
        verify_payslip(&payslip, worker)?;

        // 3. Append to history
        let mut history: Vec<SavedPayslip> = self.store.load_records(CollectionKey::Payslips).await?;
        let saved = SavedPayslip::new(Uuid::new_v4().to_string(), payslip);
        history.push(saved.clone());
        self.store.save_records(CollectionKey::Payslips, &history).await?;

        tracing::info!(
            payslip_id = %saved.id,
            worker_id = %saved.payslip.worker_id,
            net_pay = %saved.payslip.net_pay,
            "payslip saved"
        );
        Ok(saved)
    }

    /// Newest `generatedDate` first.
    pub async fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<SavedPayslip>, AppError> {
        let mut history: Vec<SavedPayslip> = self.store.load_records(CollectionKey::Payslips).await?;
        if let Some(worker_id) = &filter.worker_id {
            history.retain(|p| &p.payslip.worker_id == worker_id);
        }
        history.sort_by(|a, b| b.payslip.generated_date.cmp(&a.payslip.generated_date));
        Ok(history)
    }

    pub async fn get_history(&self, id: &str) -> Result<SavedPayslip, AppError> {
        let history: Vec<SavedPayslip> = self.store.load_records(CollectionKey::Payslips).await?;
        history
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found("Payslip", id))
    }

    pub async fn delete_history(&self, id: &str) -> Result<(), AppError> {
        let _writes = self.store.write_lock().await;
        let mut history: Vec<SavedPayslip> = self.store.load_records(CollectionKey::Payslips).await?;
        let before = history.len();
        history.retain(|p| p.id != id);
        if history.len() == before {
            return Err(AppError::not_found("Payslip", id));
        }
        self.store.save_records(CollectionKey::Payslips, &history).await
    }

    pub async fn render(&self, payslip: &Payslip) -> Result<RenderedDocument, AppError> {
        let settings: Settings = self.store.load_document(CollectionKey::Settings).await?;
        let bytes = self.renderer.render(payslip, &settings).await?;
        Ok(RenderedDocument {
            filename: filenames::payslip_filename(&payslip.worker_name, payslip.week_end),
            bytes,
        })
    }

    pub async fn render_saved(&self, id: &str) -> Result<RenderedDocument, AppError> {
        let saved = self.get_history(id).await?;
        self.render(&saved.payslip).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        db::MemoryRepository,
        models::{car_fare::CarFareType, worker::PayType},
        services::document_service::tests::FakeRenderer,
    };
    use rust_decimal::{dec, Decimal};

    pub(crate) fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    pub(crate) fn hourly_worker(id: &str, name: &str) -> Worker {
        Worker {
            id: id.into(),
            name: name.into(),
            contact: None,
            pay_type: PayType::Hourly,
            hourly_rate: Some(dec!(20)),
            task_descriptions: vec![],
            car_fare: false,
            car_fare_amount: None,
            weekly_rent: dec!(50),
        }
    }

    pub(crate) fn hours_log(id: &str, worker_id: &str, date: NaiveDate, hours: Decimal) -> WorkLog {
        WorkLog {
            id: id.into(),
            worker_id: worker_id.into(),
            worker_name: None,
            date,
            hours: Some(hours),
            contract_job: None,
            contract_amount: None,
            units: None,
            unit_rate: None,
            daily_earnings: Decimal::ZERO,
        }
    }

    pub(crate) fn advance(id: &str, worker_id: &str, date: NaiveDate, amount: Decimal) -> Advance {
        Advance {
            id: id.into(),
            worker_id: worker_id.into(),
            date,
            amount,
            notes: None,
        }
    }

    // Mon 2024-01-01 .. Sun 2024-01-07
    pub(crate) fn week_snapshot() -> RecordSnapshot {
        RecordSnapshot {
            workers: vec![hourly_worker("w1", "Jane Doe")],
            work_logs: vec![
                hours_log("l1", "w1", day(1), dec!(8)),
                hours_log("l2", "w1", day(3), dec!(6)),
                hours_log("l3", "w1", day(8), dec!(9)),
                hours_log("l4", "w2", day(2), dec!(7)),
            ],
            advances: vec![advance("a1", "w1", day(2), dec!(30))],
            car_fare_entries: vec![],
            settings: Settings::default(),
        }
    }

    #[test]
    fn end_to_end_week() {
        let p = build_payslip(&week_snapshot(), "w1", day(1), day(7), true, day(8)).unwrap();

        assert_eq!(p.earnings.total, dec!(280));
        assert_eq!(p.deductions.total_advances, dec!(30));
        assert_eq!(p.deductions.weekly_rent_deduction, dec!(50));
        assert_eq!(p.deductions.total_deductions, dec!(80));
        assert_eq!(p.net_pay, dec!(200));
        assert_eq!(p.work_logs.len(), 2);
        assert_eq!(p.earnings.work_days, 2);
        assert_eq!(p.company_name, "Company Name");
    }

    #[test]
    fn advance_opt_out_empties_advances() {
        let p = build_payslip(&week_snapshot(), "w1", day(1), day(7), false, day(8)).unwrap();
        assert!(p.advances.is_empty());
        assert_eq!(p.deductions.total_advances, Decimal::ZERO);
        assert_eq!(p.net_pay, dec!(230));
    }

    #[test]
    fn zero_records_leave_only_rent() {
        let p = build_payslip(&week_snapshot(), "w1", day(20), day(26), true, day(27)).unwrap();
        assert_eq!(p.earnings.total, Decimal::ZERO);
        assert_eq!(p.deductions.total_deductions, dec!(50));
        assert_eq!(p.net_pay, dec!(-50));
    }

    #[test]
    fn unknown_worker_fails() {
        let err = build_payslip(&week_snapshot(), "ghost", day(1), day(7), true, day(8)).unwrap_err();
        assert!(matches!(err, AppError::WorkerNotFound(id) if id == "ghost"));
    }

    #[test]
    fn reversed_range_fails_before_lookup() {
        let err = build_payslip(&week_snapshot(), "ghost", day(7), day(1), true, day(8)).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange { .. }));
    }

    #[test]
    fn identical_inputs_build_identical_payslips() {
        let snapshot = week_snapshot();
        let a = build_payslip(&snapshot, "w1", day(1), day(7), true, day(8)).unwrap();
        let b = build_payslip(&snapshot, "w1", day(1), day(7), true, day(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn earnings_add_across_contiguous_split() {
        let mut snapshot = week_snapshot();
        snapshot.work_logs.push(WorkLog {
            units: Some(dec!(4)),
            unit_rate: Some(dec!(2.5)),
            ..hours_log("l5", "w1", day(5), Decimal::ZERO)
        });

        let full = build_payslip(&snapshot, "w1", day(1), day(7), true, day(8)).unwrap();
        let first = build_payslip(&snapshot, "w1", day(1), day(3), true, day(8)).unwrap();
        let second = build_payslip(&snapshot, "w1", day(4), day(7), true, day(8)).unwrap();

        assert_eq!(full.earnings.total, first.earnings.total + second.earnings.total);
        assert_eq!(full.earnings.total, dec!(290));
    }

    #[test]
    fn car_fare_in_window_is_deducted() {
        let mut snapshot = week_snapshot();
        snapshot.car_fare_entries = vec![
            CarFareEntry {
                id: "f1".into(),
                worker_id: "w1".into(),
                worker_name: None,
                date: day(1),
                amount: dec!(5),
                kind: CarFareType::Individual,
            },
            CarFareEntry {
                id: "f2".into(),
                worker_id: "w1".into(),
                worker_name: None,
                date: day(9),
                amount: dec!(5),
                kind: CarFareType::Bulk,
            },
        ];
        let p = build_payslip(&snapshot, "w1", day(1), day(7), false, day(8)).unwrap();
        assert_eq!(p.deductions.total_car_fare_deductions, dec!(5));
        assert_eq!(p.car_fare_entries.len(), 1);
    }

    async fn seeded_service() -> PayslipService {
        let store = RecordStore::new(Arc::new(MemoryRepository::new()));
        let snapshot = week_snapshot();
        store.save_records(CollectionKey::Workers, &snapshot.workers).await.unwrap();
        store.save_records(CollectionKey::WorkLogs, &snapshot.work_logs).await.unwrap();
        store.save_records(CollectionKey::Advances, &snapshot.advances).await.unwrap();
        PayslipService::new(store, Arc::new(FakeRenderer::default()))
    }

    #[tokio::test]
    async fn save_adds_history_fields() {
        let service = seeded_service().await;
        let payslip = service
            .preview(&PayslipRequest {
                worker_id: "w1".into(),
                week_start: day(1),
                week_end: day(7),
                include_advances: true,
            })
            .await
            .unwrap();

        let saved = service.save(payslip).await.unwrap();
        assert!(saved.saved);
        assert_eq!(saved.total_gross_earnings, dec!(280));

        let value = serde_json::to_value(&saved).unwrap();
        assert_eq!(value["saved"], serde_json::json!(true));
        assert_eq!(value["workerName"], serde_json::json!("Jane Doe"));
        assert!(value.get("totalDeductions").is_some());

        let fetched = service.get_history(&saved.id).await.unwrap();
        assert_eq!(fetched.id, saved.id);
        assert_eq!(fetched.payslip.net_pay, dec!(200));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_deletable() {
        let service = seeded_service().await;
        let snapshot = week_snapshot();
        let older = build_payslip(&snapshot, "w1", day(1), day(7), true, day(8)).unwrap();
        let newer = build_payslip(&snapshot, "w1", day(1), day(7), true, day(15)).unwrap();

        let first = service.save(older).await.unwrap();
        service.save(newer).await.unwrap();

        let history = service.list_history(&HistoryFilter::default()).await.unwrap();
        assert_eq!(history[0].payslip.generated_date, day(15));

        service.delete_history(&first.id).await.unwrap();
        assert_eq!(service.list_history(&HistoryFilter::default()).await.unwrap().len(), 1);
        assert!(matches!(
            service.delete_history(&first.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn save_rejects_altered_totals() {
        let service = seeded_service().await;
        let payslip = build_payslip(&week_snapshot(), "w1", day(1), day(7), true, day(8)).unwrap();

        let mut inflated = payslip.clone();
        inflated.net_pay = dec!(9000);

        let mut forged_earnings = payslip.clone();
        forged_earnings.earnings.total = dec!(1000);
        forged_earnings.net_pay = dec!(920);

        let mut uneven_deductions = payslip.clone();
        uneven_deductions.deductions.total_deductions = dec!(10);
        uneven_deductions.net_pay = dec!(270);

        let mut foreign_log = payslip.clone();
        foreign_log.work_logs.push(hours_log("l4", "w2", day(2), dec!(7)));

        for altered in [inflated, forged_earnings, uneven_deductions, foreign_log] {
            let err = service.save(altered).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert!(service.list_history(&HistoryFilter::default()).await.unwrap().is_empty());

        // The untouched payslip still goes through
        service.save(payslip).await.unwrap();
    }

    #[tokio::test]
    async fn save_requires_known_worker() {
        let service = seeded_service().await;
        let mut snapshot = week_snapshot();
        snapshot.workers.push(hourly_worker("w9", "Gone"));
        let payslip = build_payslip(&snapshot, "w9", day(1), day(7), true, day(8)).unwrap();

        assert!(matches!(
            service.save(payslip).await,
            Err(AppError::WorkerNotFound(id)) if id == "w9"
        ));
    }

    #[tokio::test]
    async fn render_uses_deterministic_filename() {
        let service = seeded_service().await;
        let payslip = build_payslip(&week_snapshot(), "w1", day(1), day(7), true, day(8)).unwrap();
        let doc = service.render(&payslip).await.unwrap();
        assert_eq!(doc.filename, "payslip_Jane_Doe_2024-01-07.pdf");
        assert!(!doc.bytes.is_empty());
    }
}

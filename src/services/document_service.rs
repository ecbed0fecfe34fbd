// src/services/document_service.rs

use std::path::PathBuf;

use async_trait::async_trait;
use genpdf::{elements, style, Alignment, Element};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{payslip::Payslip, settings::Settings, work_log::WorkLog},
    services::earnings,
};

/// Turns a computed payslip into document bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, payslip: &Payslip, settings: &Settings) -> Result<Vec<u8>, AppError>;
}

/// A rendered payslip together with its download name.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `#rrggbb` (or `rrggbb`) to an RGB color.
pub fn parse_hex_color(hex: &str) -> Result<style::Color, AppError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(AppError::rendering(format!("invalid color '{}'", hex)));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| AppError::rendering(format!("invalid color '{}'", hex)))
    };
    Ok(style::Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Rate implied by the payslip's own hourly totals; `None` when no hours were paid.
fn implied_hourly_rate(payslip: &Payslip) -> Option<Decimal> {
    if payslip.earnings.total_hours > Decimal::ZERO {
        Some(payslip.earnings.hourly / payslip.earnings.total_hours)
    } else {
        None
    }
}

fn row_amount(log: &WorkLog, hourly_rate: Option<Decimal>) -> Decimal {
    let hourly = match (log.hours.filter(|h| *h > Decimal::ZERO), hourly_rate) {
        (Some(hours), Some(rate)) => hours * rate,
        _ => Decimal::ZERO,
    };
    (hourly + earnings::contract_earnings(log)).round_dp(2)
}

fn table_error(e: genpdf::error::Error) -> AppError {
    AppError::rendering(e)
}

/// PDF payslips drawn with genpdf, fonts loaded from a local directory.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    fonts_dir: PathBuf,
    font_family: String,
}

impl PdfRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
        }
    }

    fn render_pdf(&self, payslip: &Payslip, settings: &Settings) -> Result<Vec<u8>, AppError> {
        // 1. Fonts and colors
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                AppError::rendering(format!(
                    "font '{}' not found in {}: {}",
                    self.font_family,
                    self.fonts_dir.display(),
                    e
                ))
            })?;

        let primary = parse_hex_color(settings.primary_color())?;
        let accent = parse_hex_color(settings.accent_color())?;
        let symbol = settings.currency_symbol();
        let money = |amount: Decimal| format!("{}{:.2}", symbol, amount);

        // 2. Page setup
        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Payslip {} {}", payslip.worker_name, payslip.week_end));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        doc.set_font_size(10);

        // 3. Header
        if let Some(path) = settings.company_logo_path.as_deref().filter(|p| !p.trim().is_empty()) {
            let logo = image::open(path)
                .map_err(|e| AppError::rendering(format!("company logo '{}': {}", path, e)))?;
            let logo = elements::Image::from_dynamic_image(logo)
                .map_err(|e| AppError::rendering(format!("company logo '{}': {}", path, e)))?
                .with_scale(genpdf::Scale::new(0.4, 0.4));
            doc.push(logo);
        }

        doc.push(
            elements::Paragraph::new(payslip.company_name.clone())
                .styled(style::Style::new().bold().with_font_size(18).with_color(primary)),
        );
        doc.push(
            elements::Paragraph::new("PAYSLIP")
                .aligned(Alignment::Right)
                .styled(style::Style::new().bold().with_font_size(14).with_color(accent)),
        );
        doc.push(elements::Break::new(1.5));

        // 4. Employee details and period summary
        doc.push(
            elements::Paragraph::new(format!("Employee: {}", payslip.worker_name))
                .styled(style::Style::new().bold()),
        );
        doc.push(elements::Paragraph::new(format!(
            "Pay period: {} to {}",
            payslip.week_start.format("%Y-%m-%d"),
            payslip.week_end.format("%Y-%m-%d")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Generated: {}",
            payslip.generated_date.format("%Y-%m-%d")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Days worked: {}   Hours: {}   Units: {}",
            payslip.earnings.work_days,
            payslip.earnings.total_hours.normalize(),
            payslip.earnings.total_units.normalize()
        )));
        doc.push(elements::Break::new(1.5));

        let heading = style::Style::new().bold().with_color(primary);

        // 5. Earnings
        let mut earnings_table = elements::TableLayout::new(vec![4, 2]);
        earnings_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        earnings_table
            .row()
            .element(elements::Paragraph::new("EARNINGS").styled(heading))
            .element(elements::Paragraph::new("AMOUNT").aligned(Alignment::Right).styled(heading))
            .push()
            .map_err(table_error)?;
        let earning_rows = [
            ("Hourly work", payslip.earnings.hourly),
            ("Contract work", payslip.earnings.contract),
        ];
        for (label, amount) in earning_rows.into_iter().filter(|(_, a)| !a.is_zero()) {
            earnings_table
                .row()
                .element(elements::Paragraph::new(label))
                .element(elements::Paragraph::new(money(amount)).aligned(Alignment::Right))
                .push()
                .map_err(table_error)?;
        }
        earnings_table
            .row()
            .element(elements::Paragraph::new("Gross earnings").styled(style::Style::new().bold()))
            .element(
                elements::Paragraph::new(money(payslip.earnings.total))
                    .aligned(Alignment::Right)
                    .styled(style::Style::new().bold()),
            )
            .push()
            .map_err(table_error)?;
        doc.push(earnings_table);
        doc.push(elements::Break::new(1));

        // 6. Deductions, only rows with an amount, then net pay
        let mut deductions_table = elements::TableLayout::new(vec![4, 2]);
        deductions_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        deductions_table
            .row()
            .element(elements::Paragraph::new("DEDUCTIONS").styled(heading))
            .element(elements::Paragraph::new("AMOUNT").aligned(Alignment::Right).styled(heading))
            .push()
            .map_err(table_error)?;
        let deduction_rows = [
            ("Advances", payslip.deductions.total_advances),
            ("Weekly rent", payslip.deductions.weekly_rent_deduction),
            ("Car fare", payslip.deductions.total_car_fare_deductions),
        ];
        for (label, amount) in deduction_rows.into_iter().filter(|(_, a)| !a.is_zero()) {
            deductions_table
                .row()
                .element(elements::Paragraph::new(label))
                .element(elements::Paragraph::new(money(amount)).aligned(Alignment::Right))
                .push()
                .map_err(table_error)?;
        }
        deductions_table
            .row()
            .element(elements::Paragraph::new("Total deductions").styled(style::Style::new().bold()))
            .element(
                elements::Paragraph::new(money(payslip.deductions.total_deductions))
                    .aligned(Alignment::Right)
                    .styled(style::Style::new().bold()),
            )
            .push()
            .map_err(table_error)?;
        doc.push(deductions_table);
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("NET PAY: {}", money(payslip.net_pay)))
                .aligned(Alignment::Right)
                .styled(style::Style::new().bold().with_font_size(14).with_color(accent)),
        );

        // 7. Work log detail, oldest day first
        if !payslip.work_logs.is_empty() {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new("WORK LOG").styled(heading));

            let rate = implied_hourly_rate(payslip);
            let mut log_table = elements::TableLayout::new(vec![2, 1, 3, 1, 2]);
            log_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            log_table
                .row()
                .element(elements::Paragraph::new("Date").styled(heading))
                .element(elements::Paragraph::new("Hours").styled(heading))
                .element(elements::Paragraph::new("Job").styled(heading))
                .element(elements::Paragraph::new("Units").styled(heading))
                .element(elements::Paragraph::new("Earned").aligned(Alignment::Right).styled(heading))
                .push()
                .map_err(table_error)?;

            let mut logs: Vec<&WorkLog> = payslip.work_logs.iter().collect();
            logs.sort_by_key(|l| l.date);
            for log in logs {
                let hours = log.hours.map(|h| h.normalize().to_string()).unwrap_or_default();
                let units = log.units.map(|u| u.normalize().to_string()).unwrap_or_default();
                log_table
                    .row()
                    .element(elements::Paragraph::new(log.date.format("%Y-%m-%d").to_string()))
                    .element(elements::Paragraph::new(hours))
                    .element(elements::Paragraph::new(log.contract_job.clone().unwrap_or_default()))
                    .element(elements::Paragraph::new(units))
                    .element(
                        elements::Paragraph::new(money(row_amount(log, rate)))
                            .aligned(Alignment::Right),
                    )
                    .push()
                    .map_err(table_error)?;
            }
            doc.push(log_table);
        }

        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new(format!("Amounts in {}", settings.currency()))
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        // 8. Render to an in-memory buffer
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(AppError::rendering)?;
        Ok(buffer)
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(&self, payslip: &Payslip, settings: &Settings) -> Result<Vec<u8>, AppError> {
        let bytes = self.render_pdf(payslip, settings)?;
        tracing::debug!(
            worker_id = %payslip.worker_id,
            bytes = bytes.len(),
            "payslip rendered"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    /// Deterministic stand-in renderer. Fails for the listed worker ids.
    #[derive(Default)]
    pub(crate) struct FakeRenderer {
        pub failing: Vec<String>,
        pub calls: AtomicUsize,
        pub rendered: Mutex<Vec<String>>,
    }

    impl FakeRenderer {
        pub(crate) fn failing_for(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|id| id.to_string()).collect(),
                ..Self::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentRenderer for FakeRenderer {
        async fn render(&self, payslip: &Payslip, settings: &Settings) -> Result<Vec<u8>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&payslip.worker_id) {
                return Err(AppError::rendering("template exploded"));
            }
            self.rendered.lock().unwrap().push(payslip.worker_id.clone());
            Ok(format!(
                "{}|{}|{}|{}",
                settings.company_name(),
                payslip.worker_id,
                payslip.week_end,
                payslip.net_pay
            )
            .into_bytes())
        }
    }

    #[test]
    fn parses_hex_colors() {
        assert!(matches!(
            parse_hex_color("#0d9488").unwrap(),
            style::Color::Rgb(0x0d, 0x94, 0x88)
        ));
        assert!(matches!(
            parse_hex_color("14b8a6").unwrap(),
            style::Color::Rgb(0x14, 0xb8, 0xa6)
        ));
        assert!(matches!(parse_hex_color("#fff"), Err(AppError::Rendering(_))));
        assert!(matches!(parse_hex_color("#gggggg"), Err(AppError::Rendering(_))));
    }

    #[tokio::test]
    async fn missing_fonts_is_a_rendering_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path(), "Nope");
        let snapshot = crate::services::payslip_service::tests::week_snapshot();
        let day = crate::services::payslip_service::tests::day;
        let payslip = crate::services::payslip_service::build_payslip(
            &snapshot, "w1", day(1), day(7), true, day(8),
        )
        .unwrap();

        let err = renderer.render(&payslip, &Settings::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Rendering(_)));
    }

    #[test]
    fn work_log_rows_follow_current_rate() {
        let snapshot = crate::services::payslip_service::tests::week_snapshot();
        let day = crate::services::payslip_service::tests::day;
        let payslip = crate::services::payslip_service::build_payslip(
            &snapshot, "w1", day(1), day(7), true, day(8),
        )
        .unwrap();

        let rate = implied_hourly_rate(&payslip);
        let amounts: Vec<Decimal> = payslip.work_logs.iter().map(|l| row_amount(l, rate)).collect();
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), payslip.earnings.total);
    }
}

// src/common/filenames.rs

use chrono::NaiveDate;

/// Whitespace runs become `_`, then anything outside `[A-Za-z0-9_]` is dropped.
pub fn sanitize_worker_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        }
    }
    out
}

/// `payslip_<name>_<weekEnd>.pdf`
pub fn payslip_filename(worker_name: &str, week_end: NaiveDate) -> String {
    format!(
        "payslip_{}_{}.pdf",
        sanitize_worker_name(worker_name),
        week_end.format("%Y-%m-%d")
    )
}

/// `payslips_<weekStart>_to_<weekEnd>.zip`
pub fn archive_filename(week_start: NaiveDate, week_end: NaiveDate) -> String {
    format!(
        "payslips_{}_to_{}.zip",
        week_start.format("%Y-%m-%d"),
        week_end.format("%Y-%m-%d")
    )
}

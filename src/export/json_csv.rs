use crate::errors::{AppError, AppResult};
use crate::export::report::Report;

/// Pretty-printed report, rows and totals included.
pub(crate) fn render_json(report: &Report) -> AppResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// One line per session (header from serde), then a totals line.
pub(crate) fn render_csv(report: &Report) -> AppResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    for row in &report.rows {
        wtr.serialize(row)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    if report.rows.is_empty() {
        wtr.write_record(super::report::HEADERS)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    wtr.write_record([
        "Total",
        "",
        "",
        report.total_worked.as_str(),
        report.total_break.as_str(),
    ])
    .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;

    wtr.into_inner()
        .map_err(|e| AppError::Export(format!("CSV flush error: {e}")))
}

//! Report rendering. Every format produces an in-memory buffer; callers
//! decide whether it goes to an HTTP body or a file.

mod json_csv;
mod pdf;
pub mod report;
mod xlsx;

pub use report::{Period, Report, ReportRow};

use crate::errors::{AppError, AppResult};
use crate::export::pdf::ReportPdf;
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(AppError::InvalidExportFormat(s.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn render(&self, report: &Report) -> AppResult<Vec<u8>> {
        match self {
            ExportFormat::Csv => json_csv::render_csv(report),
            ExportFormat::Json => json_csv::render_json(report),
            ExportFormat::Xlsx => xlsx::render_xlsx(report),
            ExportFormat::Pdf => {
                let mut pdf = ReportPdf::new();
                pdf.write_report(report);
                Ok(pdf.finish())
            }
        }
    }
}

/// `<user>_<period>_<YYYY-MM-DD>.<ext>`, used as the download name.
pub fn file_name(report: &Report, format: ExportFormat) -> String {
    format!(
        "{}_{}_{}.{}",
        report.user,
        report.period.as_str(),
        report.first_day.format("%Y-%m-%d"),
        format.extension()
    )
}

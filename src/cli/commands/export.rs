use crate::config::Config;
use crate::core::clock::SystemClock;
use crate::core::tracker::Tracker;
use crate::db::SqliteGateway;
use crate::errors::{AppError, AppResult};
use crate::export::{ExportFormat, Period};
use crate::ui::messages::{info, success};
use crate::utils::path::{ensure_writable, expand_tilde};
use std::fs;
use std::sync::Arc;

pub struct ExportArgs<'a> {
    pub user: &'a str,
    pub period: Period,
    pub format: ExportFormat,
    pub file: &'a str,
    pub force: bool,
}

pub fn handle(args: ExportArgs<'_>, cfg: &Config) -> AppResult<()> {
    let path_buf = expand_tilde(args.file);
    let path = path_buf.as_path();
    if !path.is_absolute() {
        return Err(AppError::Export(format!(
            "output path must be absolute: {}",
            args.file
        )));
    }
    ensure_writable(path, args.force)?;

    let tz = cfg.tz()?;
    let gateway = SqliteGateway::open(&cfg.database, cfg.defaults, &cfg.legacy_user, tz)?;
    let tracker = Tracker::new(Arc::new(gateway), Arc::new(SystemClock::new(tz)));

    info(format!(
        "Exporting {} report of '{}' to {}: {}",
        args.period,
        args.user,
        args.format.as_str().to_uppercase(),
        path.display()
    ));

    let report = tracker.report(args.user, args.period)?;
    let bytes = args.format.render(&report)?;
    fs::write(path, bytes)?;

    tracker
        .gateway()
        .audit("export", args.user, &format!("{} {}", args.period, args.format.as_str()));

    success(format!(
        "{} export completed: {} ({} sessions, {} worked)",
        args.format.as_str().to_uppercase(),
        path.display(),
        report.rows.len(),
        report.total_worked
    ));
    Ok(())
}

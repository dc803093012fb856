use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(print: bool, cfg: &Config) -> AppResult<()> {
    if !print {
        info("Nothing to do: use --print to show the internal log.");
        return Ok(());
    }

    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn, &cfg.legacy_user, cfg.tz()?)?;
    LogLogic::print_log(&pool)
}

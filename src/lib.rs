//! rTimeTracker library root.
//! Exposes the CLI parser, the HTTP server, the high-level run() function
//! and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod logging;
pub mod models;
pub mod server;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands::export::ExportArgs;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Serve { listen } => cli::commands::serve::handle(listen.as_deref(), cfg),
        Commands::User { action } => cli::commands::user::handle(action, cfg),
        Commands::Export {
            user,
            period,
            format,
            file,
            force,
        } => cli::commands::export::handle(
            ExportArgs {
                user,
                period: *period,
                format: *format,
                file,
                force: *force,
            },
            cfg,
        ),
        Commands::Backup {
            file,
            compress,
            force,
        } => cli::commands::backup::handle(file, *compress, *force, cfg),
        Commands::Log { print } => cli::commands::log::handle(*print, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // load the configuration once; --db wins over the file
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}

use crate::export::{ExportFormat, Period};
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimeTracker
/// Clock-in / clock-out web service with SQLite storage
#[derive(Parser)]
#[command(
    name = "rtimetracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Clock-in/clock-out tracker: work sessions, breaks, overtime and reports over HTTP",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP server
    Serve {
        /// Listen address (ip:port), overrides the configuration file
        #[arg(long = "listen")]
        listen: Option<String>,
    },

    /// Manage login accounts
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Export a period report of a user's sessions
    Export {
        /// Owner of the sessions
        #[arg(long = "user")]
        user: String,

        /// Period to export (today, this week, this month)
        #[arg(long = "period", value_enum, default_value_t = Period::Daily)]
        period: Period,

        /// Output format
        #[arg(long = "format", value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Absolute path of the output file
        #[arg(long = "file")]
        file: String,

        /// Overwrite an existing file without asking
        #[arg(long = "force")]
        force: bool,
    },

    /// Copy the database to a file, optionally compressed
    Backup {
        /// Destination file
        #[arg(long = "file")]
        file: String,

        /// Write a .zip archive instead of a plain copy
        #[arg(long = "compress")]
        compress: bool,

        /// Overwrite an existing file without asking
        #[arg(long = "force")]
        force: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a login account
    Add {
        username: String,

        /// Password; read from stdin when omitted
        #[arg(long = "password")]
        password: Option<String>,
    },
}

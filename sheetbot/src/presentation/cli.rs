use clap::{Parser, Subcommand};
use sheetbot_core::dates::PeriodPreset;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "sheetbot: spreadsheet reports for the team chat",
    long_about = None
)]
pub struct Cli {
    /// TOML config file (defaults to $SHEETBOT_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Send the report to this chat instead of printing it
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub chat: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record count, deposit and verification for one day (yesterday by default)
    Daily {
        /// DD.MM.YYYY or DD.MM
        #[arg(long)]
        date: Option<String>,
    },

    /// Total records over a period
    Period {
        /// DD.MM-DD.MM, either side may carry .YYYY
        #[arg(required_unless_present = "preset", conflicts_with = "preset")]
        range: Option<String>,

        /// week, month or all
        #[arg(long)]
        preset: Option<PeriodPreset>,
    },

    /// Records of one project over a period
    Project {
        /// leading text of the project name, e.g. "[П1]"
        tag: String,
        /// DD.MM-DD.MM, either side may carry .YYYY
        range: String,
    },

    /// Active tariff projects from the secondary sheet (yesterday by default)
    Secondary {
        #[arg(long)]
        date: Option<String>,
    },

    /// List the configured project tags
    Projects,

    /// Send a test message to verify delivery
    TestDelivery,

    /// Run the daily scheduler until interrupted
    Serve,
}

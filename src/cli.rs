//! Command-line interface.
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Voice-controlled light controller
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Voice-controlled light controller")]
pub struct Cli {
    /// Path to configuration file (default: lumen.toml if present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Device identifier override
    #[arg(long, value_name = "ID")]
    pub device_id: Option<String>,

    /// Human-readable device name override
    #[arg(long, value_name = "NAME")]
    pub device_name: Option<String>,

    /// Power-state file override
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<String>,

    /// Start with the voice pipeline disabled
    #[arg(long)]
    pub no_voice: bool,

    /// Suppress output (quiet mode)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The default log filter implied by the quiet/verbose flags.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

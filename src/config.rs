use clap::{Parser, Subcommand};

use crate::registry::DEFAULT_COOLDOWN;

/// Coalesce bursts of events into leading and trailing calls
#[derive(Parser, Debug)]
#[command(name = "throttle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter, e.g. `info` or `throttle=debug`
    #[arg(long, global = true, env = "THROTTLE_LOG", default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read events from stdin, one per line, and throttle their dispatch
    Pump {
        /// Key for lines without an `@key` prefix
        #[arg(long, default_value = "search")]
        key: String,
        /// Cooldown window in milliseconds
        #[arg(long, default_value_t = DEFAULT_COOLDOWN.as_millis() as u64)]
        cooldown_ms: u64,
    },
    /// Print whether LEFT is earlier than RIGHT
    Compare { left: String, right: String },
}

impl Cli {
    /// The chosen subcommand, falling back to `pump` with its defaults.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or_else(|| Command::Pump {
            key: "search".to_string(),
            cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
        })
    }
}

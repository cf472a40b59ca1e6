use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use throttle::{
    compare_dates,
    config::{Cli, Command},
    pump, Throttle,
};
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log)?)
        .with_writer(std::io::stderr)
        .init();

    match cli.into_command() {
        Command::Pump { key, cooldown_ms } => {
            let throttle = Throttle::new();
            info!(key = %key, cooldown_ms, "reading events from stdin");

            let report = pump::run(
                &throttle,
                &key,
                Duration::from_millis(cooldown_ms),
                BufReader::new(io::stdin()),
            )
            .await?;

            info!(
                events = report.events,
                dispatched = report.dispatched,
                keys = throttle.keys(),
                "input closed"
            );
        }
        Command::Compare { left, right } => {
            println!("{}", compare_dates(&left, &right)?);
        }
    }

    Ok(())
}

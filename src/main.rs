mod chart;
mod config;
mod error;
mod job;
mod pipeline;
mod scheduler;
mod source;
mod types;

use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::job::RefreshJob;
use crate::scheduler::Scheduler;

// Jobs run inline on the scheduler loop.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cfg = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let interval = cfg.refresh_interval()?;
    print_banner(&cfg, interval);

    let job = RefreshJob::from_config(&cfg);
    Scheduler::new(interval).run(|| job.run()).await
}

fn print_banner(cfg: &Config, interval: Duration) {
    println!("[{} {}]", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("source            : {}", cfg.source.display());
    println!("sheet             : {}", cfg.sheet);
    println!("output            : {}", cfg.output.display());
    println!("annotation column : {}", cfg.annotation_column().unwrap_or("(none)"));
    if interval.is_zero() {
        println!("refresh           : run once");
    } else {
        println!("refresh           : every {} h", cfg.interval_hours);
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use schedsync_core::config::SyncConfig;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::build_syncer;
use crate::render::Render;

pub async fn run(config: &SyncConfig, interval: Option<&str>) -> Result<()> {
    let period = match interval {
        Some(text) => parse_interval(text)?,
        None => config.sync.interval()?,
    };

    let syncer = build_syncer(config)?;

    // A run that outlasts the period delays the next one instead of stacking up
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(interval = %humantime::format_duration(period), "watching for changes");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("stopping");
                break;
            }
        }

        match syncer.run(Utc::now()).await {
            Ok(report) if report.is_noop() => {}
            Ok(report) => println!("{}", report.render()),
            // The next tick retries with fresh data
            Err(e) => error!(error = %e, "sync run failed"),
        }
    }

    Ok(())
}

fn parse_interval(text: &str) -> Result<Duration> {
    let period = humantime::parse_duration(text)
        .with_context(|| format!("Invalid interval '{}'", text))?;

    if period.is_zero() {
        anyhow::bail!("Interval must be greater than zero");
    }

    Ok(period)
}

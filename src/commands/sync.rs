use anyhow::Result;
use chrono::Utc;
use schedsync_core::config::SyncConfig;

use super::build_syncer;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &SyncConfig) -> Result<()> {
    let syncer = build_syncer(config)?;

    let spinner = tui::create_spinner("Syncing Notion to Google Calendar".to_string());
    let result = syncer.run(Utc::now()).await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.render());

    Ok(())
}

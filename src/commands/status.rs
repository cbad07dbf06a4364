use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use schedsync_core::config::SyncConfig;

use super::build_syncer;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &SyncConfig) -> Result<()> {
    let syncer = build_syncer(config)?;

    let spinner = tui::create_spinner("Comparing Notion and Google Calendar".to_string());
    let result = syncer.plan(Utc::now()).await;
    spinner.finish_and_clear();

    let plan = result?;

    println!("{}", format!("Notion → {}", config.google.calendar_id).bold());
    println!("{}", plan.render());

    if !plan.is_empty() {
        println!("\nRun `schedsync sync` to apply these changes.");
    }

    Ok(())
}

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use schedsync_core::config::SyncConfig;
use schedsync_core::remote::SourceClient;
use schedsync_provider_google::GoogleCalendar;
use schedsync_provider_notion::NotionClient;

use crate::utils::tui;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => SyncConfig::config_path()?,
    };

    let config = match SyncConfig::load(Some(path.as_path())) {
        Ok(config) => config,
        Err(e) if !path.exists() => {
            SyncConfig::create_default_config(&path)?;
            println!("{}", e.to_string().red());
            println!("\nCreated {}", path.display());
            println!("Fill in the empty settings and run `schedsync check` again.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", format!("Config: {}", path.display()).bold());
    for (key, value) in describe(&config) {
        println!("   {} {}", format!("{}:", key).dimmed(), value);
    }
    println!();

    let mut failed = false;

    let spinner = tui::create_spinner("Querying Notion".to_string());
    let notion = NotionClient::new(config.notion.clone()).query().await;
    spinner.finish_and_clear();
    match notion {
        Ok(items) => {
            let eligible = items.iter().filter(|item| item.is_eligible()).count();
            println!("{} Notion: {} schedule records", "✓".green(), eligible);
        }
        Err(e) => {
            failed = true;
            println!("{} Notion: {}", "✗".red(), e.to_string().red());
        }
    }

    let spinner = tui::create_spinner("Checking Google Calendar".to_string());
    let calendar = GoogleCalendar::new(&config.google);
    let google = calendar.verify().await;
    spinner.finish_and_clear();
    match google {
        Ok(name) => println!(
            "{} Google Calendar: {} ({})",
            "✓".green(),
            name,
            calendar.account()
        ),
        Err(e) => {
            failed = true;
            println!("{} Google Calendar: {}", "✗".red(), format!("{:#}", e).red());
        }
    }

    if failed {
        anyhow::bail!("Some checks failed");
    }

    Ok(())
}

/// Resolved settings as shown to the user, with the API key masked.
fn describe(config: &SyncConfig) -> Vec<(&'static str, String)> {
    vec![
        ("notion.api_key", mask(&config.notion.api_key)),
        ("notion.database_id", config.notion.database_id.clone()),
        ("notion.schedule_tag_id", config.notion.schedule_tag_id.clone()),
        ("notion.base_url", config.notion.base_url.clone()),
        ("google.account", config.google.account.clone()),
        ("google.calendar_id", config.google.calendar_id.clone()),
        (
            "google.color_id",
            config.google.color_id.clone().unwrap_or_else(|| "(default)".to_string()),
        ),
        ("sync.time_zone", config.sync.time_zone.clone()),
        ("sync.interval", config.sync.interval.clone()),
        (
            "sync.window",
            format!(
                "{} days back, {} days ahead",
                config.sync.window_past_days, config.sync.window_future_days
            ),
        ),
    ]
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

pub mod auth;
pub mod check;
pub mod status;
pub mod sync;
pub mod watch;

use anyhow::Result;
use schedsync_core::config::SyncConfig;
use schedsync_core::sync::Syncer;
use schedsync_provider_google::GoogleCalendar;
use schedsync_provider_notion::NotionClient;

pub type AppSyncer = Syncer<NotionClient, GoogleCalendar>;

/// Wire the Notion source and Google target from a loaded config.
pub fn build_syncer(config: &SyncConfig) -> Result<AppSyncer> {
    let source = NotionClient::new(config.notion.clone());
    let target = GoogleCalendar::new(&config.google);

    Ok(Syncer::from_settings(source, target, &config.sync)?)
}

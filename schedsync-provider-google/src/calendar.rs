//! Google Calendar as the schedsync target.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::types::{MinAccessRole, OrderBy, SendUpdates};
use tracing::debug;

use schedsync_core::config::GoogleConfig;
use schedsync_core::error::{RemoteWriteError, Side, SyncError, SyncResult};
use schedsync_core::event::{NormalizedEvent, RawTargetEvent};
use schedsync_core::remote::TargetClient;
use schedsync_core::window::SyncWindow;

use crate::convert::{FromGoogle, with_color};
use crate::session::Session;

const CANCELLED: &str = "cancelled";
/// Google's alias for the user's main calendar
const PRIMARY_CALENDAR: &str = "primary";

/// One calendar of one authenticated account.
pub struct GoogleCalendar {
    account: String,
    calendar_id: String,
    color_id: Option<String>,
}

impl GoogleCalendar {
    pub fn new(config: &GoogleConfig) -> Self {
        GoogleCalendar {
            account: config.account.clone(),
            calendar_id: config.calendar_id.clone(),
            color_id: config.color_id.clone().filter(|c| !c.is_empty()),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    async fn client(&self) -> Result<google_calendar::Client> {
        Session::load_valid(&self.account).await?.client()
    }

    /// Refreshes the session if needed and reads the calendar's name.
    pub async fn verify(&self) -> Result<String> {
        let calendars = self
            .client()
            .await?
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to list calendars")?
            .body;

        calendars
            .into_iter()
            .find(|cal| {
                cal.id == self.calendar_id || (self.calendar_id == PRIMARY_CALENDAR && cal.primary)
            })
            .map(|cal| cal.summary)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Calendar {} not found for {}",
                    self.calendar_id,
                    self.account
                )
            })
    }

    async fn list_events(&self, window: &SyncWindow) -> Result<Vec<RawTargetEvent>> {
        let response = self
            .client()
            .await?
            .events()
            .list_all(
                &self.calendar_id,
                "",
                0,
                OrderBy::default(),
                &[],
                "", // search query
                &[],
                false, // show deleted
                false, // show hidden invitations
                true,  // expand recurring events
                &window.to_rfc3339(),
                &window.from_rfc3339(),
                "",
                "",
            )
            .await
            .context("Failed to fetch events")?;

        response
            .body
            .into_iter()
            .filter(|event| event.status != CANCELLED)
            .map(RawTargetEvent::from_google)
            .collect()
    }

    async fn insert_event(&self, event: &NormalizedEvent) -> Result<String> {
        let google_event = with_color(event, self.color_id.as_deref());

        let response = self
            .client()
            .await?
            .events()
            .insert(
                &self.calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.title))?;

        Ok(response.body.id)
    }

    async fn update_event(&self, event_id: &str, event: &NormalizedEvent) -> Result<()> {
        let google_event = with_color(event, self.color_id.as_deref());

        self.client()
            .await?
            .events()
            .update(
                &self.calendar_id,
                event_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to update event: {}", event.title))?;

        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.client()
            .await?
            .events()
            .delete(&self.calendar_id, event_id, false, SendUpdates::None)
            .await
            .with_context(|| format!("Failed to delete event: {}", event_id))?;

        Ok(())
    }
}

#[async_trait]
impl TargetClient for GoogleCalendar {
    async fn list(&self, window: &SyncWindow) -> SyncResult<Vec<RawTargetEvent>> {
        let events = self
            .list_events(window)
            .await
            .map_err(|e| SyncError::bulk_fetch(Side::Target, format!("{:#}", e)))?;

        debug!(count = events.len(), calendar = %self.calendar_id, "listed Google events");
        Ok(events)
    }

    async fn insert(&self, event: &NormalizedEvent) -> Result<String, RemoteWriteError> {
        self.insert_event(event)
            .await
            .map_err(|e| RemoteWriteError::Failed(format!("{:#}", e)))
    }

    async fn update(
        &self,
        target_id: &str,
        event: &NormalizedEvent,
    ) -> Result<(), RemoteWriteError> {
        self.update_event(target_id, event)
            .await
            .map_err(|e| classify(target_id, &e))
    }

    async fn remove(&self, target_id: &str) -> Result<(), RemoteWriteError> {
        match self.delete_event(target_id).await {
            Ok(()) => Ok(()),
            Err(e) => match classify(target_id, &e) {
                // Already deleted
                RemoteWriteError::NotFound(_) => Ok(()),
                other => Err(other),
            },
        }
    }
}

/// Google reports a missing event as 404, and one deleted earlier as 410.
/// Only the API error is inspected, never the context carrying the title.
fn classify(event_id: &str, error: &anyhow::Error) -> RemoteWriteError {
    let cause = error.root_cause().to_string();

    let gone = ["404", "Not Found", "410", "Gone"]
        .iter()
        .any(|needle| cause.contains(needle));

    if gone {
        RemoteWriteError::NotFound(event_id.to_string())
    } else {
        RemoteWriteError::Failed(format!("{:#}", error))
    }
}

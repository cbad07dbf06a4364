//! Seams to the external systems.
//!
//! `SourceClient` and `TargetClient` are implemented by the provider crates.
//! The reconciliation engine only sees `ChangeApplier`, the four writes it
//! can issue; `ClientApplier` wires it to a pair of clients.

use async_trait::async_trait;

use crate::error::{RemoteWriteError, SyncResult};
use crate::event::{NormalizedEvent, RawTargetEvent};
use crate::source::SourceItem;
use crate::window::SyncWindow;

/// The task database holding schedule records.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Every record that carries the schedule tag and has a start date.
    async fn query(&self) -> SyncResult<Vec<SourceItem>>;

    /// Store the calendar event id on the source record.
    async fn patch_back_link(&self, source_id: &str, target_id: &str)
    -> Result<(), RemoteWriteError>;
}

/// The calendar mirroring the schedule.
#[async_trait]
pub trait TargetClient: Send + Sync {
    /// All events in the window, owned by schedsync or not.
    async fn list(&self, window: &SyncWindow) -> SyncResult<Vec<RawTargetEvent>>;

    /// Returns the id assigned by the calendar.
    async fn insert(&self, event: &NormalizedEvent) -> Result<String, RemoteWriteError>;

    async fn update(&self, target_id: &str, event: &NormalizedEvent)
    -> Result<(), RemoteWriteError>;

    /// Removing an event that is already gone succeeds.
    async fn remove(&self, target_id: &str) -> Result<(), RemoteWriteError>;
}

/// Writes issued by the reconciliation engine.
#[async_trait]
pub trait ChangeApplier: Send + Sync {
    async fn create(&self, event: &NormalizedEvent) -> Result<String, RemoteWriteError>;

    /// `RemoteWriteError::NotFound` when the event vanished since it was listed.
    async fn update(&self, target_id: &str, event: &NormalizedEvent)
    -> Result<(), RemoteWriteError>;

    async fn delete(&self, target_id: &str) -> Result<(), RemoteWriteError>;

    async fn patch_back_link(&self, source_id: &str, target_id: &str)
    -> Result<(), RemoteWriteError>;
}

/// Applies engine writes through a source and a target client.
pub struct ClientApplier<'a, S, T> {
    source: &'a S,
    target: &'a T,
}

impl<'a, S, T> ClientApplier<'a, S, T>
where
    S: SourceClient,
    T: TargetClient,
{
    pub fn new(source: &'a S, target: &'a T) -> Self {
        ClientApplier { source, target }
    }
}

#[async_trait]
impl<'a, S, T> ChangeApplier for ClientApplier<'a, S, T>
where
    S: SourceClient,
    T: TargetClient,
{
    async fn create(&self, event: &NormalizedEvent) -> Result<String, RemoteWriteError> {
        self.target.insert(event).await
    }

    async fn update(
        &self,
        target_id: &str,
        event: &NormalizedEvent,
    ) -> Result<(), RemoteWriteError> {
        self.target.update(target_id, event).await
    }

    async fn delete(&self, target_id: &str) -> Result<(), RemoteWriteError> {
        match self.target.remove(target_id).await {
            Err(RemoteWriteError::NotFound(_)) => Ok(()),
            result => result,
        }
    }

    async fn patch_back_link(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), RemoteWriteError> {
        self.source.patch_back_link(source_id, target_id).await
    }
}

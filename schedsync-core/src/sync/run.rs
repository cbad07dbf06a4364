//! One synchronization cycle: fetch both sides, plan, apply.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::SyncSettings;
use crate::error::SyncResult;
use crate::event::{TargetEvent, owned_events};
use crate::normalize::DateNormalizer;
use crate::remote::{ClientApplier, SourceClient, TargetClient};
use crate::source::SourceItem;
use crate::sync::{ReconciliationEngine, SyncPlan, SyncReport};
use crate::window::SyncWindow;

/// Both collections as read at the start of a run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub window: SyncWindow,
    /// Eligible records inside the window or linked to a listed event.
    pub source: Vec<SourceItem>,
    /// Owned events only, in listing order.
    pub target: Vec<TargetEvent>,
    /// Listed events without the sync marker.
    pub foreign: usize,
    /// Eligible records left out because they fall outside the window.
    pub outside_window: usize,
}

pub struct Syncer<S, T> {
    source: S,
    target: T,
    engine: ReconciliationEngine,
    past_days: i64,
    future_days: i64,
}

impl<S, T> Syncer<S, T>
where
    S: SourceClient,
    T: TargetClient,
{
    pub fn new(source: S, target: T, engine: ReconciliationEngine) -> Self {
        Syncer {
            source,
            target,
            engine,
            past_days: crate::window::DEFAULT_PAST_DAYS,
            future_days: crate::window::DEFAULT_FUTURE_DAYS,
        }
    }

    pub fn from_settings(source: S, target: T, settings: &SyncSettings) -> SyncResult<Self> {
        let engine = ReconciliationEngine::new(DateNormalizer::new(settings.time_zone()?));
        Ok(Syncer::new(source, target, engine)
            .with_window(settings.window_past_days, settings.window_future_days))
    }

    pub fn with_window(mut self, past_days: i64, future_days: i64) -> Self {
        self.past_days = past_days;
        self.future_days = future_days;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Reads both sides. Either failing aborts the run before anything is written.
    ///
    /// The calendar is only listed over the window, so records outside it are
    /// kept only while their event is still listed. Any other record would
    /// look unlinked and get a fresh event on every run.
    pub async fn fetch(&self, now: DateTime<Utc>) -> SyncResult<Snapshot> {
        let window = SyncWindow::around(now, self.past_days, self.future_days);

        let records = self.source.query().await?;
        let total = records.len();
        let eligible: Vec<SourceItem> =
            records.into_iter().filter(SourceItem::is_eligible).collect();

        let listed = self.target.list(&window).await?;
        let listed_count = listed.len();
        let target = owned_events(listed);

        let linked: HashSet<&str> = target
            .iter()
            .filter_map(|event| event.linked_source_id.as_deref())
            .collect();
        let eligible_count = eligible.len();
        let source: Vec<SourceItem> = eligible
            .into_iter()
            .filter(|item| {
                linked.contains(item.id.as_str()) || self.engine.within_window(item, &window)
            })
            .collect();

        debug!(
            total,
            eligible = eligible_count,
            outside_window = eligible_count - source.len(),
            "fetched source records"
        );
        debug!(
            listed = listed_count,
            owned = target.len(),
            from = %window.from_rfc3339(),
            to = %window.to_rfc3339(),
            "fetched calendar events"
        );

        Ok(Snapshot {
            window,
            outside_window: eligible_count - source.len(),
            source,
            foreign: listed_count - target.len(),
            target,
        })
    }

    /// Computes the changes a run would make without making them.
    pub async fn plan(&self, now: DateTime<Utc>) -> SyncResult<SyncPlan> {
        let snapshot = self.fetch(now).await?;
        Ok(self.engine.plan(&snapshot.source, &snapshot.target))
    }

    pub async fn run(&self, now: DateTime<Utc>) -> SyncResult<SyncReport> {
        let snapshot = self.fetch(now).await?;
        let plan = self.engine.plan(&snapshot.source, &snapshot.target);

        if plan.is_empty() {
            info!("calendar already up to date");
            return Ok(SyncReport::default());
        }

        let applier = ClientApplier::new(&self.source, &self.target);
        let report = self.engine.apply(plan, &applier).await;

        info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            failed = report.failures().count(),
            "sync finished"
        );

        Ok(report)
    }
}

//! Reconciliation of source records against owned calendar events.
//!
//! `plan` links both collections and decides what to change without touching
//! anything; `apply` issues the writes one at a time and collects a report.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use crate::error::RemoteWriteError;
use crate::event::{EventTime, NormalizedEvent, RawTargetEvent, TargetEvent, owned_events};
use crate::link;
use crate::normalize::{DateNormalizer, NormalizedRange};
use crate::remote::ChangeApplier;
use crate::source::SourceItem;
use crate::sync::{
    DiffKind, ItemOutcome, OutcomeStatus, RejectedItem, Stage, SyncAction, SyncPlan, SyncReport,
    UpdateReason,
};
use crate::window::SyncWindow;

#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine {
    normalizer: DateNormalizer,
}

impl ReconciliationEngine {
    pub fn new(normalizer: DateNormalizer) -> Self {
        ReconciliationEngine { normalizer }
    }

    /// Link, then decide. `target` must only hold owned events.
    pub fn plan(&self, source: &[SourceItem], target: &[TargetEvent]) -> SyncPlan {
        // First event seen for a source id wins; later duplicates are left alone.
        let mut linked: HashMap<&str, &TargetEvent> = HashMap::new();
        for event in target {
            if let Some(source_id) = event.linked_source_id.as_deref() {
                linked.entry(source_id).or_insert(event);
            }
        }

        let mut plan = SyncPlan::default();

        for item in source {
            let existing = linked.get(item.id.as_str()).copied();

            let range = match self.normalizer.normalize(&item.action_day) {
                Ok(range) => range,
                Err(e) => {
                    warn!(
                        source_id = %item.id,
                        title = %item.title,
                        error = %e,
                        "skipping record with unusable date"
                    );
                    plan.rejected.push(RejectedItem {
                        kind: if existing.is_some() {
                            DiffKind::Update
                        } else {
                            DiffKind::Create
                        },
                        source: item.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match existing {
                None => {
                    debug!(source_id = %item.id, title = %item.title, "no linked event, will create");
                    plan.actions.push(SyncAction::Create {
                        source: item.clone(),
                        event: build_event(item, range),
                    });
                }
                Some(target) => {
                    let reasons = self.update_reasons(item, &range, target);
                    if reasons.is_empty() {
                        debug!(source_id = %item.id, target_id = %target.id, "event up to date");
                        continue;
                    }

                    debug!(source_id = %item.id, target_id = %target.id, ?reasons, "event out of date");
                    plan.actions.push(SyncAction::Update {
                        source: item.clone(),
                        target: target.clone(),
                        event: build_event(item, range),
                        reasons,
                    });
                }
            }
        }

        // Covers deleted records as well as records that lost their date.
        let source_ids: HashSet<&str> = source.iter().map(|item| item.id.as_str()).collect();
        for event in target {
            let Some(source_id) = event.linked_source_id.as_deref() else {
                continue;
            };
            if !source_ids.contains(source_id) {
                debug!(source_id, target_id = %event.id, "linked record is gone, will delete");
                plan.actions.push(SyncAction::Delete {
                    target: event.clone(),
                });
            }
        }

        plan
    }

    /// Empty when the event already reflects the record.
    pub fn update_reasons(
        &self,
        item: &SourceItem,
        range: &NormalizedRange,
        target: &TargetEvent,
    ) -> Vec<UpdateReason> {
        let mut reasons = Vec::new();
        let day = |time: &EventTime| self.normalizer.calendar_day(time);

        if item.title != target.title {
            reasons.push(UpdateReason::Title);
        }

        if day(&range.start) != day(&target.start) {
            reasons.push(UpdateReason::StartDay);
        }

        // Both ends are exclusive for all-day spans, so an unchanged range compares equal.
        if item.action_day.end().is_some() && day(&range.end) != day(&target.end) {
            reasons.push(UpdateReason::EndDay);
        }

        if target
            .last_modified_at
            .is_some_and(|updated| item.last_modified_at > updated)
        {
            reasons.push(UpdateReason::SourceNewer);
        }

        reasons
    }

    /// Whether the record's range reaches into `window`. Records with an
    /// unusable date count as inside so that `plan` reports them.
    pub fn within_window(&self, item: &SourceItem, window: &SyncWindow) -> bool {
        match self.normalizer.normalize(&item.action_day) {
            Ok(range) => window.overlaps(
                self.normalizer.instant(&range.start),
                self.normalizer.instant(&range.end),
            ),
            Err(_) => true,
        }
    }

    /// Issue the planned writes in order. Failures are recorded, never propagated.
    pub async fn apply<A>(&self, plan: SyncPlan, applier: &A) -> SyncReport
    where
        A: ChangeApplier + ?Sized,
    {
        let mut report = SyncReport::default();

        for rejected in plan.rejected {
            report.record(ItemOutcome {
                kind: rejected.kind,
                item_id: rejected.source.id,
                title: rejected.source.title,
                status: OutcomeStatus::Failed {
                    stage: Stage::Normalize,
                    error: rejected.reason,
                },
            });
        }

        for action in plan.actions {
            let outcome = apply_action(action, applier).await;
            report.record(outcome);
        }

        report
    }

    /// Plan and apply in one go, starting from unfiltered collections.
    pub async fn run<A>(
        &self,
        source: &[SourceItem],
        raw_target: Vec<RawTargetEvent>,
        applier: &A,
    ) -> SyncReport
    where
        A: ChangeApplier + ?Sized,
    {
        let eligible: Vec<SourceItem> = source
            .iter()
            .filter(|item| item.is_eligible())
            .cloned()
            .collect();
        let target = owned_events(raw_target);

        let plan = self.plan(&eligible, &target);
        self.apply(plan, applier).await
    }
}

fn build_event(item: &SourceItem, range: NormalizedRange) -> NormalizedEvent {
    NormalizedEvent {
        title: item.title.clone(),
        start: range.start,
        end: range.end,
        annotation: link::embed(&item.id, item.status.as_deref(), item.url.as_deref()),
    }
}

async fn apply_action<A>(action: SyncAction, applier: &A) -> ItemOutcome
where
    A: ChangeApplier + ?Sized,
{
    match action {
        SyncAction::Create { source, event } => {
            let outcome = |status| ItemOutcome {
                kind: DiffKind::Create,
                item_id: source.id.clone(),
                title: event.title.clone(),
                status,
            };

            let target_id = match applier.create(&event).await {
                Ok(id) => id,
                Err(e) => {
                    error!(source_id = %source.id, title = %event.title, error = %e, "failed to create event");
                    return outcome(failed(Stage::Create, e));
                }
            };
            info!(source_id = %source.id, target_id = %target_id, title = %event.title, "created event");

            // The event stays even if the back-link fails; the marker is authoritative.
            if let Err(e) = applier.patch_back_link(&source.id, &target_id).await {
                error!(source_id = %source.id, target_id = %target_id, error = %e, "failed to store event id on record");
                return outcome(failed(Stage::PatchBackLink, e));
            }

            outcome(OutcomeStatus::Applied)
        }
        SyncAction::Update {
            source,
            target,
            event,
            reasons,
        } => {
            let status = match applier.update(&target.id, &event).await {
                Ok(()) => {
                    info!(source_id = %source.id, target_id = %target.id, title = %event.title, ?reasons, "updated event");
                    OutcomeStatus::Applied
                }
                Err(RemoteWriteError::NotFound(_)) => {
                    warn!(source_id = %source.id, target_id = %target.id, "event disappeared before update");
                    OutcomeStatus::Skipped("event no longer exists".to_string())
                }
                Err(e) => {
                    error!(source_id = %source.id, target_id = %target.id, error = %e, "failed to update event");
                    failed(Stage::Update, e)
                }
            };

            ItemOutcome {
                kind: DiffKind::Update,
                item_id: source.id,
                title: event.title,
                status,
            }
        }
        SyncAction::Delete { target } => {
            let status = match applier.delete(&target.id).await {
                Ok(()) | Err(RemoteWriteError::NotFound(_)) => {
                    info!(target_id = %target.id, title = %target.title, "deleted event");
                    OutcomeStatus::Applied
                }
                Err(e) => {
                    error!(target_id = %target.id, title = %target.title, error = %e, "failed to delete event");
                    failed(Stage::Delete, e)
                }
            };

            ItemOutcome {
                kind: DiffKind::Delete,
                item_id: target.linked_source_id.unwrap_or(target.id),
                title: target.title,
                status,
            }
        }
    }
}

fn failed(stage: Stage, error: RemoteWriteError) -> OutcomeStatus {
    OutcomeStatus::Failed {
        stage,
        error: error.to_string(),
    }
}

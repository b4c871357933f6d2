//! Runtime layer that executes kernel effects.
//!
//! The kernel is pure and produces effects. The runtime takes these effects
//! and applies them to a [`Store`].

use geocast_store::{EventField, EventPatch, Predicate, Store, StoreError, StreamField, StreamPatch};
use geocast_types::{EventId, EventStatus, StreamStatus, Timestamp};
use tracing::{debug, info, warn};

use crate::effects::Effect;
use crate::kernel;

/// Executes effects against a store.
#[derive(Debug, Clone)]
pub struct Runtime {
    store: Store,
    member_scan_limit: usize,
}

impl Runtime {
    /// `member_scan_limit` bounds the live members read by an aggregate
    /// recompute. Past it the count is still exact but the centroid is taken
    /// over the scanned members.
    pub fn new(store: Store, member_scan_limit: usize) -> Self {
        Self {
            store,
            member_scan_limit,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Executes a single effect.
    pub fn execute_effect(&self, effect: Effect) -> Result<(), RuntimeError> {
        match effect {
            Effect::EventInsert(event) => {
                info!(event_id = %event.id, stream_count = event.stream_count, "event created");
                self.store.events().insert(event)?;
            }

            Effect::AssignEvent {
                stream_ids,
                event_id,
            } => {
                let updated = self
                    .store
                    .streams()
                    .update_many_by_ids(&stream_ids, &StreamPatch::assign_event(event_id))?;
                debug!(%event_id, requested = stream_ids.len(), updated, "streams assigned");
            }

            Effect::RecomputeAggregate { event_id, at } => self.recompute(event_id, at)?,

            Effect::EndEvent { event_id, at } => self.end_event(event_id, at)?,
        }

        Ok(())
    }

    /// Executes all effects in order.
    ///
    /// Stops at the first error and returns it.
    pub fn execute_effects(&self, effects: Vec<Effect>) -> Result<(), RuntimeError> {
        for effect in effects {
            self.execute_effect(effect)?;
        }
        Ok(())
    }

    fn recompute(&self, event_id: EventId, at: Timestamp) -> Result<(), RuntimeError> {
        let members = self
            .store
            .streams()
            .find_where(&members_of(event_id), self.member_scan_limit)?;

        let Some(mut aggregate) = kernel::aggregate(&members) else {
            return self.end_event(event_id, at);
        };
        if members.len() >= self.member_scan_limit {
            let total = self.store.streams().count_where(&members_of(event_id))?;
            if total > members.len() {
                warn!(
                    %event_id,
                    total,
                    scanned = members.len(),
                    "event exceeds member scan limit; centroid covers scanned members only"
                );
            }
            aggregate.stream_count = total as u64;
        }

        let patch = EventPatch::aggregate(aggregate.centroid, aggregate.stream_count);
        match self.store.events().update_fields(&event_id, &patch)? {
            Some(_) => debug!(
                %event_id,
                stream_count = aggregate.stream_count,
                "event aggregate recomputed"
            ),
            None => warn!(%event_id, "recompute targeted a missing event"),
        }
        Ok(())
    }

    fn end_event(&self, event_id: EventId, at: Timestamp) -> Result<(), RuntimeError> {
        let live = Predicate::eq(EventField::Status, EventStatus::Live);
        if self
            .store
            .events()
            .update_if(&event_id, &live, &EventPatch::end(at))?
            .is_some()
        {
            info!(%event_id, "event ended");
        }
        Ok(())
    }
}

/// Live streams assigned to `event_id`.
fn members_of(event_id: EventId) -> Predicate<StreamField> {
    Predicate::eq(StreamField::EventId, event_id)
        .and(Predicate::eq(StreamField::Status, StreamStatus::Live))
}

/// Errors that can occur during effect execution.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

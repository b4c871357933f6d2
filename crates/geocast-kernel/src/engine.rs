//! The clustering engine: the imperative shell around [`crate::kernel`].
//!
//! On stream creation the engine reads neighbor candidates from the store,
//! hands them to the pure planner and executes the resulting effects. On
//! stream end it performs the guarded status transition, then closes the
//! stream's event once no live member remains or re-aggregates it.

use std::sync::Arc;

use geocast_config::ClusterConfig;
use geocast_geo::BoundingBox;
use geocast_store::{Predicate, Store, StoreError, StreamField, StreamPatch};
use geocast_types::{Clock, EventId, GeoPoint, Stream, StreamId, StreamStatus};
use tracing::{debug, info};

use crate::cell_lock::{CellGuard, CellLocks};
use crate::effects::Effect;
use crate::kernel::{self, Decision};
use crate::runtime::{Runtime, RuntimeError};

/// Errors from clustering operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// No live stream with this id exists.
    #[error("live stream not found: {0}")]
    StreamNotFound(StreamId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The cluster configuration failed validation.
    #[error("invalid cluster configuration: {0}")]
    InvalidConfig(String),
}

/// Result of ending a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEnded {
    /// The stream as persisted after the transition.
    pub stream: Stream,
    /// The event this transition closed, if it was the last live member.
    pub closed_event: Option<EventId>,
}

/// Assigns streams to events and closes events when they empty.
pub struct ClusterEngine {
    runtime: Runtime,
    clock: Arc<dyn Clock>,
    config: ClusterConfig,
    locks: Option<CellLocks>,
}

impl ClusterEngine {
    /// # Errors
    ///
    /// [`KernelError::InvalidConfig`] if `config` fails
    /// [`ClusterConfig::validate`].
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        config: ClusterConfig,
    ) -> Result<Self, KernelError> {
        config
            .validate()
            .map_err(|err| KernelError::InvalidConfig(err.to_string()))?;
        let locks = config
            .cell_locking
            .then(|| CellLocks::new(config.cell_size_deg));
        Ok(Self {
            runtime: Runtime::new(store, config.member_scan_limit),
            clock,
            config,
            locks,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn store(&self) -> &Store {
        self.runtime.store()
    }

    fn lock_around(&self, center: GeoPoint) -> Option<CellGuard<'_>> {
        self.locks.as_ref().map(|locks| {
            locks.lock_region(&BoundingBox::around(center, self.config.prefilter_radius_m))
        })
    }

    /// Clusters a stream that has already been persisted.
    ///
    /// Returns the event the stream belongs to afterwards, which may be one
    /// a concurrent pass already put it in. A stream that is no longer live
    /// (or no longer stored) by the time its region lock is acquired is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Store failures. A failure while reading neighbors leaves the store
    /// exactly as it was.
    pub fn on_stream_created(&self, stream: &Stream) -> Result<Option<EventId>, KernelError> {
        let _guard = self.lock_around(stream.location);

        // Another pass may have pulled the stream into an event while we
        // waited for the lock.
        let Some(current) = self.store().streams().find_by_id(&stream.id)? else {
            debug!(stream_id = %stream.id, "stream vanished before clustering");
            return Ok(None);
        };
        if !current.is_live() {
            return Ok(current.event_id);
        }

        let now = self.clock.now();
        let bbox = BoundingBox::around(current.location, self.config.prefilter_radius_m);
        let candidates = Predicate::eq(StreamField::Status, StreamStatus::Live)
            .and(Predicate::gte(
                StreamField::StartedAt,
                now.saturating_sub(self.config.window()),
            ))
            .and(Predicate::between(StreamField::Lat, bbox.min_lat, bbox.max_lat))
            .and(Predicate::between(StreamField::Lng, bbox.min_lng, bbox.max_lng))
            .and(Predicate::ne(StreamField::Id, current.id));
        let candidates = self
            .store()
            .streams()
            .find_where(&candidates, self.config.candidate_limit)?;
        let candidate_count = candidates.len();

        let neighbors = kernel::select_neighbors(&current, candidates, self.config.join_radius_m);
        let (decision, effects) = kernel::plan_assignment(
            &current,
            &neighbors,
            EventId::generate(),
            now,
            self.config.event_radius_m,
        );
        self.runtime.execute_effects(effects)?;

        match &decision {
            Decision::Standalone => debug!(
                stream_id = %current.id,
                candidates = candidate_count,
                "no co-located neighbors"
            ),
            Decision::Join { event_id } => {
                info!(stream_id = %current.id, %event_id, "stream joined event");
            }
            Decision::Create {
                event_id,
                participants,
            } => info!(
                stream_id = %current.id,
                %event_id,
                participants = participants.len(),
                "stream formed event"
            ),
        }

        // Standalone keeps whatever assignment the stream already had.
        Ok(decision.event_id().or(current.event_id))
    }

    /// Transitions a live stream to ended. Its event is closed if it was the
    /// last live member, and re-aggregated over the remaining members
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`KernelError::StreamNotFound`] if the id is unknown or the stream
    /// has already ended.
    pub fn on_stream_ended(&self, stream_id: StreamId) -> Result<StreamEnded, KernelError> {
        let current = self
            .store()
            .streams()
            .find_by_id(&stream_id)?
            .ok_or(KernelError::StreamNotFound(stream_id))?;
        let _guard = self.lock_around(current.location);

        let now = self.clock.now();
        let live = Predicate::eq(StreamField::Status, StreamStatus::Live);
        let stream = self
            .store()
            .streams()
            .update_if(&stream_id, &live, &StreamPatch::end(now))?
            .ok_or(KernelError::StreamNotFound(stream_id))?;
        debug!(%stream_id, "stream ended");

        let Some(event_id) = stream.event_id else {
            return Ok(StreamEnded {
                stream,
                closed_event: None,
            });
        };

        let members = Predicate::eq(StreamField::EventId, event_id).and(live);
        let live_members = self.store().streams().count_where(&members)?;
        let effect = kernel::plan_after_end(event_id, live_members, now);
        let closed_event = matches!(effect, Effect::EndEvent { .. }).then_some(event_id);
        self.runtime.execute_effect(effect)?;

        Ok(StreamEnded {
            stream,
            closed_event,
        })
    }
}

impl std::fmt::Debug for ClusterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterEngine")
            .field("config", &self.config)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

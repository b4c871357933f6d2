//! Effects produced by the kernel.
//!
//! Effects represent store writes that the runtime must execute after a
//! clustering decision. The kernel is pure - it produces effects but never
//! executes them directly.

use geocast_types::{Event, EventId, StreamId, Timestamp};

/// A store write to be executed by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist a brand-new event aggregate.
    EventInsert(Event),

    /// Point every listed stream at `event_id`.
    AssignEvent {
        stream_ids: Vec<StreamId>,
        event_id: EventId,
    },

    /// Re-derive centroid and stream count from the event's live members.
    ///
    /// If no live member remains the event is ended at `at` instead.
    RecomputeAggregate { event_id: EventId, at: Timestamp },

    /// Transition a live event to ended.
    EndEvent { event_id: EventId, at: Timestamp },
}

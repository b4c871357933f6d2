//! Documents held by the store and their indexed fields.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use geocast_types::{
    Event, EventId, EventStatus, GeoPoint, Stream, StreamId, StreamStatus, Timestamp,
};

use crate::value::Value;

/// A record type the store can hold.
///
/// `Field` names the indexed fields predicates may reference, and `Patch`
/// is the set of partial updates the record accepts.
pub trait Document: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync;
    type Field: Copy + Debug + Send + Sync;
    type Patch: Debug + Send + Sync;

    /// Collection name used in errors and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    fn field(&self, field: Self::Field) -> Value;

    fn apply(&mut self, patch: &Self::Patch);
}

// ============================================================================
// Streams
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamField {
    Id,
    UserId,
    Status,
    StartedAt,
    EndedAt,
    Lat,
    Lng,
    EventId,
    PrivacyMode,
}

/// Partial update of a stream. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamPatch {
    pub status: Option<StreamStatus>,
    pub ended_at: Option<Timestamp>,
    pub event_id: Option<EventId>,
    pub viewer_count_peak: Option<u64>,
}

impl StreamPatch {
    /// Live -> ended transition stamped at `at`.
    pub fn end(at: Timestamp) -> Self {
        Self {
            status: Some(StreamStatus::Ended),
            ended_at: Some(at),
            ..Self::default()
        }
    }

    pub fn assign_event(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }
}

impl Document for Stream {
    type Id = StreamId;
    type Field = StreamField;
    type Patch = StreamPatch;

    const COLLECTION: &'static str = "streams";

    fn id(&self) -> &StreamId {
        &self.id
    }

    fn field(&self, field: StreamField) -> Value {
        match field {
            StreamField::Id => self.id.into(),
            StreamField::UserId => (&self.user_id).into(),
            StreamField::Status => self.status.into(),
            StreamField::StartedAt => self.started_at.into(),
            StreamField::EndedAt => self.ended_at.into(),
            StreamField::Lat => self.location.lat.into(),
            StreamField::Lng => self.location.lng.into(),
            StreamField::EventId => self.event_id.into(),
            StreamField::PrivacyMode => self.privacy_mode.into(),
        }
    }

    fn apply(&mut self, patch: &StreamPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ended_at) = patch.ended_at {
            self.ended_at = Some(ended_at);
        }
        if let Some(event_id) = patch.event_id {
            self.event_id = Some(event_id);
        }
        if let Some(peak) = patch.viewer_count_peak {
            self.viewer_count_peak = peak;
        }
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Id,
    Status,
    CreatedAt,
    EndedAt,
    CentroidLat,
    CentroidLng,
}

/// Partial update of an event. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub centroid: Option<GeoPoint>,
    pub stream_count: Option<u64>,
    pub status: Option<EventStatus>,
    pub ended_at: Option<Timestamp>,
}

impl EventPatch {
    /// Replaces the derived aggregate fields.
    pub fn aggregate(centroid: GeoPoint, stream_count: u64) -> Self {
        Self {
            centroid: Some(centroid),
            stream_count: Some(stream_count),
            ..Self::default()
        }
    }

    /// Live -> ended transition stamped at `at`.
    pub fn end(at: Timestamp) -> Self {
        Self {
            status: Some(EventStatus::Ended),
            ended_at: Some(at),
            ..Self::default()
        }
    }
}

impl Document for Event {
    type Id = EventId;
    type Field = EventField;
    type Patch = EventPatch;

    const COLLECTION: &'static str = "events";

    fn id(&self) -> &EventId {
        &self.id
    }

    fn field(&self, field: EventField) -> Value {
        match field {
            EventField::Id => self.id.into(),
            EventField::Status => self.status.into(),
            EventField::CreatedAt => self.created_at.into(),
            EventField::EndedAt => self.ended_at.into(),
            EventField::CentroidLat => self.centroid.lat.into(),
            EventField::CentroidLng => self.centroid.lng.into(),
        }
    }

    fn apply(&mut self, patch: &EventPatch) {
        if let Some(centroid) = patch.centroid {
            self.centroid = centroid;
        }
        if let Some(count) = patch.stream_count {
            self.stream_count = count;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ended_at) = patch.ended_at {
            self.ended_at = Some(ended_at);
        }
    }
}

//! Client-facing views.
//!
//! Views are what leaves the process. Stream coordinates in a view are
//! always masked per the stream's privacy mode; raw coordinates never
//! appear in one.

use geocast_geo::mask_location_with;
use geocast_types::{
    DeviceCamera, Event, EventId, EventStatus, PrivacyMode, Stream, StreamId, StreamStatus,
    Timestamp, UserId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A stream as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamView {
    pub id: StreamId,
    pub user_id: UserId,
    pub lat: f64,
    pub lng: f64,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub viewer_count_peak: u64,
    pub event_id: Option<EventId>,
    pub status: StreamStatus,
    pub privacy_mode: PrivacyMode,
    pub device_camera: DeviceCamera,
}

impl StreamView {
    /// Builds a view with freshly masked coordinates.
    pub fn masked(stream: &Stream) -> Self {
        Self::masked_with(&mut rand::thread_rng(), stream)
    }

    pub fn masked_with<R: Rng + ?Sized>(rng: &mut R, stream: &Stream) -> Self {
        let shown = mask_location_with(rng, stream.location, stream.privacy_mode);
        Self {
            id: stream.id,
            user_id: stream.user_id.clone(),
            lat: shown.lat,
            lng: shown.lng,
            started_at: stream.started_at,
            ended_at: stream.ended_at,
            viewer_count_peak: stream.viewer_count_peak,
            event_id: stream.event_id,
            status: stream.status,
            privacy_mode: stream.privacy_mode,
            device_camera: stream.device_camera,
        }
    }
}

/// An event aggregate as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub id: EventId,
    pub centroid_lat: f64,
    pub centroid_lng: f64,
    pub radius_meters: u32,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub viewer_count_total: u64,
    pub stream_count: u64,
    pub hashtags: Vec<String>,
    pub status: EventStatus,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            centroid_lat: event.centroid.lat,
            centroid_lng: event.centroid.lng,
            radius_meters: event.radius_meters,
            created_at: event.created_at,
            ended_at: event.ended_at,
            viewer_count_total: event.viewer_count_total,
            stream_count: event.stream_count,
            hashtags: event.hashtags,
            status: event.status,
        }
    }
}

/// An event plus every stream that references it, in any status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: EventView,
    pub streams: Vec<StreamView>,
}

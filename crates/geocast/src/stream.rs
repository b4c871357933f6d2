//! Inputs and outputs of the stream lifecycle operations.

use geocast_types::{DeviceCamera, EventId, PrivacyMode, StreamId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A request to start broadcasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStream {
    pub user_id: UserId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub privacy_mode: PrivacyMode,
    #[serde(default)]
    pub device_camera: DeviceCamera,
}

impl NewStream {
    /// An exact-location, back-camera stream.
    pub fn new(user_id: impl Into<UserId>, lat: f64, lng: f64) -> Self {
        Self {
            user_id: user_id.into(),
            lat,
            lng,
            privacy_mode: PrivacyMode::default(),
            device_camera: DeviceCamera::default(),
        }
    }

    pub fn with_privacy(mut self, mode: PrivacyMode) -> Self {
        self.privacy_mode = mode;
        self
    }

    pub fn with_camera(mut self, camera: DeviceCamera) -> Self {
        self.device_camera = camera;
        self
    }
}

/// Outcome of ending a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEnd {
    pub stream_id: StreamId,
    pub ended_at: Timestamp,
    /// Set when this stream was the last live member of its event.
    pub closed_event: Option<EventId>,
}

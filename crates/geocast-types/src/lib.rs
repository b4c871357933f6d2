//! # geocast-types: Core types for `Geocast`
//!
//! This crate contains shared types used across the `Geocast` system:
//! - Entity IDs ([`StreamId`], [`EventId`], [`UserId`])
//! - Temporal types ([`Timestamp`], [`Clock`])
//! - Coordinates ([`GeoPoint`])
//! - Lifecycle and privacy enums ([`StreamStatus`], [`EventStatus`], [`PrivacyMode`], [`DeviceCamera`])
//! - Records ([`Stream`], [`Event`])

use std::{
    fmt::{Debug, Display},
    str::FromStr,
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

/// Nominal radius stamped on every event, in meters.
pub const EVENT_RADIUS_METERS: u32 = 50;

// ============================================================================
// Entity IDs - All Copy (16-byte UUIDs)
// ============================================================================

/// Unique identifier for a live broadcast session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(Uuid);

impl StreamId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random stream id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for StreamId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Unique identifier for an event aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mints a fresh random event id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for EventId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Opaque identifier of the broadcaster that owns a stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Timestamp - Copy (UTC wall-clock instant)
// ============================================================================

/// Wall-clock instant in UTC.
///
/// Serialized as RFC 3339. Ordering follows chronological order, which is
/// what the store's range predicates compare on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current system time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Builds a timestamp from milliseconds since the Unix epoch.
    ///
    /// Out-of-range values clamp to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or(DateTime::UNIX_EPOCH),
        )
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Parses an RFC 3339 string such as `2026-10-18T12:00:00Z`.
    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns `self - duration`, saturating at the earliest representable instant.
    pub fn saturating_sub(self, duration: Duration) -> Self {
        chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| self.0.checked_sub_signed(d))
            .map_or(Self(DateTime::<Utc>::MIN_UTC), Self)
    }

    /// Returns `self + duration`, saturating at the latest representable instant.
    pub fn saturating_add(self, duration: Duration) -> Self {
        chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| self.0.checked_add_signed(d))
            .map_or(Self(DateTime::<Utc>::MAX_UTC), Self)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Coordinates - Copy
// ============================================================================

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true when both components are finite and inside the
    /// `[-90, 90]` / `[-180, 180]` ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Arithmetic mean of a set of points, or `None` for an empty set.
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<GeoPoint> {
        let (count, lat_sum, lng_sum) = points
            .into_iter()
            .fold((0usize, 0.0f64, 0.0f64), |(n, lat, lng), p| {
                (n + 1, lat + p.lat, lng + p.lng)
            });
        if count == 0 {
            return None;
        }
        Some(GeoPoint::new(lat_sum / count as f64, lng_sum / count as f64))
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

// ============================================================================
// Lifecycle and privacy enums
// ============================================================================

/// Lifecycle of a stream. Transitions `Live -> Ended` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    #[default]
    Live,
    Ended,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Live => "live",
            StreamStatus::Ended => "ended",
        }
    }
}

impl Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an event. Becomes `Ended` when its last live member ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Live,
    Ended,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Live => "live",
            EventStatus::Ended => "ended",
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of a stream's true location is disclosed at read time.
///
/// The stored coordinates are always raw; masking happens per read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyMode {
    #[default]
    Exact,
    #[serde(rename = "masked_100m")]
    Masked100m,
    #[serde(rename = "masked_1km")]
    Masked1km,
}

impl PrivacyMode {
    /// Radius of the masking disk in meters, `None` for exact disclosure.
    pub fn mask_radius_meters(&self) -> Option<f64> {
        match self {
            PrivacyMode::Exact => None,
            PrivacyMode::Masked100m => Some(100.0),
            PrivacyMode::Masked1km => Some(1000.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyMode::Exact => "exact",
            PrivacyMode::Masked100m => "masked_100m",
            PrivacyMode::Masked1km => "masked_1km",
        }
    }
}

impl Display for PrivacyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(PrivacyMode::Exact),
            "masked_100m" => Ok(PrivacyMode::Masked100m),
            "masked_1km" => Ok(PrivacyMode::Masked1km),
            other => Err(format!("unknown privacy mode: {other}")),
        }
    }
}

/// Which camera the broadcaster streams from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCamera {
    Front,
    #[default]
    Back,
}

// ============================================================================
// Records
// ============================================================================

/// A live broadcast session.
///
/// Identity, owner, location, start time and privacy mode are fixed at
/// creation. Only `status`, `ended_at`, `event_id` and `viewer_count_peak`
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: StreamId,
    pub user_id: UserId,
    pub location: GeoPoint,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub status: StreamStatus,
    pub privacy_mode: PrivacyMode,
    pub device_camera: DeviceCamera,
    pub event_id: Option<EventId>,
    pub viewer_count_peak: u64,
}

impl Stream {
    /// Creates a live, unassigned stream.
    pub fn new(
        id: StreamId,
        user_id: UserId,
        location: GeoPoint,
        privacy_mode: PrivacyMode,
        device_camera: DeviceCamera,
        started_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            location,
            started_at,
            ended_at: None,
            status: StreamStatus::Live,
            privacy_mode,
            device_camera,
            event_id: None,
            viewer_count_peak: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == StreamStatus::Live
    }
}

/// An aggregate of co-located concurrent streams.
///
/// `centroid` and `stream_count` are derived from the live member set at
/// the last membership change; they are never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub centroid: GeoPoint,
    pub radius_meters: u32,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub stream_count: u64,
    pub viewer_count_total: u64,
    pub hashtags: Vec<String>,
    pub status: EventStatus,
}

impl Event {
    /// Creates a live event with the nominal radius.
    pub fn new(id: EventId, centroid: GeoPoint, stream_count: u64, created_at: Timestamp) -> Self {
        Self {
            id,
            centroid,
            radius_meters: EVENT_RADIUS_METERS,
            created_at,
            ended_at: None,
            stream_count,
            viewer_count_total: 0,
            hashtags: Vec::new(),
            status: EventStatus::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == EventStatus::Live
    }
}

//! geocast-query: Read-side queries for `Geocast`
//!
//! Turns bounding-box and time-range requests into store scans and maps the
//! results to client views. Stream coordinates are masked on every read.
//!
//! Nothing here writes to the store.

use std::sync::Arc;

use geocast_config::QueryConfig;
use geocast_geo::{BoundingBox, GeoError};
use geocast_store::{EventField, Predicate, Store, StoreError, StreamField};
use geocast_types::{Clock, EventId, EventStatus, StreamStatus, Timestamp};
use tracing::debug;

mod view;

#[cfg(test)]
mod tests;

pub use view::{EventDetail, EventView, StreamView};

/// Errors from read-side queries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid time range: from {from} is after to {to}")]
    InvalidRange { from: Timestamp, to: Timestamp },

    #[error(transparent)]
    InvalidBoundingBox(#[from] GeoError),

    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parses an optional `ne`/`sw` corner pair of `"lat,lng"` strings.
pub fn parse_bbox(ne: Option<&str>, sw: Option<&str>) -> Result<Option<BoundingBox>, QueryError> {
    Ok(BoundingBox::parse_corners(ne, sw)?)
}

/// Serves the four read operations over a shared [`Store`].
pub struct QueryService {
    store: Store,
    clock: Arc<dyn Clock>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(store: Store, clock: Arc<dyn Clock>, config: QueryConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Live streams that have started, optionally inside `bbox` (raw
    /// coordinates), each masked per its own privacy mode.
    pub fn list_live_streams(
        &self,
        bbox: Option<&BoundingBox>,
    ) -> Result<Vec<StreamView>, QueryError> {
        let now = self.clock.now();
        let mut predicate = Predicate::eq(StreamField::Status, StreamStatus::Live)
            .and(Predicate::lte(StreamField::StartedAt, now));
        if let Some(bbox) = bbox {
            predicate = predicate
                .and(Predicate::between(StreamField::Lat, bbox.min_lat, bbox.max_lat))
                .and(Predicate::between(StreamField::Lng, bbox.min_lng, bbox.max_lng));
        }

        let streams = self
            .store
            .streams()
            .find_where(&predicate, self.config.live_streams_limit)?;
        debug!(count = streams.len(), bounded = bbox.is_some(), "listed live streams");
        Ok(streams.iter().map(StreamView::masked).collect())
    }

    /// Live events, optionally with their centroid inside `bbox`.
    pub fn list_live_events(&self, bbox: Option<&BoundingBox>) -> Result<Vec<EventView>, QueryError> {
        let predicate =
            within(Predicate::eq(EventField::Status, EventStatus::Live), bbox);
        let events = self
            .store
            .events()
            .find_where(&predicate, self.config.live_events_limit)?;
        debug!(count = events.len(), bounded = bbox.is_some(), "listed live events");
        Ok(events.into_iter().map(EventView::from).collect())
    }

    /// Events of any status created in `[from, to]`, optionally with their
    /// centroid inside `bbox`.
    ///
    /// `to` defaults to now and `from` to the configured look-back before
    /// now.
    pub fn list_events_in_range(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        bbox: Option<&BoundingBox>,
    ) -> Result<Vec<EventView>, QueryError> {
        let now = self.clock.now();
        let to = to.unwrap_or(now);
        let from = from.unwrap_or_else(|| now.saturating_sub(self.config.default_range()));
        if from > to {
            return Err(QueryError::InvalidRange { from, to });
        }

        let predicate = within(Predicate::between(EventField::CreatedAt, from, to), bbox);
        let events = self
            .store
            .events()
            .find_where(&predicate, self.config.range_events_limit)?;
        debug!(count = events.len(), %from, %to, "listed events in range");
        Ok(events.into_iter().map(EventView::from).collect())
    }

    /// The event aggregate plus its streams of any status, masked.
    pub fn get_event_detail(&self, event_id: EventId) -> Result<EventDetail, QueryError> {
        let event = self
            .store
            .events()
            .find_by_id(&event_id)?
            .ok_or(QueryError::EventNotFound(event_id))?;
        let streams = self.store.streams().find_where(
            &Predicate::eq(StreamField::EventId, event_id),
            self.config.event_streams_limit,
        )?;

        Ok(EventDetail {
            event: event.into(),
            streams: streams.iter().map(StreamView::masked).collect(),
        })
    }
}

/// Narrows an event predicate to centroids inside `bbox`.
fn within(predicate: Predicate<EventField>, bbox: Option<&BoundingBox>) -> Predicate<EventField> {
    match bbox {
        None => predicate,
        Some(bbox) => predicate
            .and(Predicate::between(EventField::CentroidLat, bbox.min_lat, bbox.max_lat))
            .and(Predicate::between(EventField::CentroidLng, bbox.min_lng, bbox.max_lng)),
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

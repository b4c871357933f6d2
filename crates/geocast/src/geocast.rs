//! Main entry point for the Geocast SDK.
//!
//! `Geocast` owns the store handle, the clustering engine and the query
//! service, and exposes the stream lifecycle plus the four read operations.

use std::sync::Arc;

use geocast_config::GeocastConfig;
use geocast_geo::BoundingBox;
use geocast_kernel::ClusterEngine;
use geocast_query::{EventDetail, EventView, QueryService, StreamView};
use geocast_store::Store;
use geocast_types::{Clock, EventId, GeoPoint, Stream, StreamId, SystemClock, Timestamp};
use tracing::{debug, warn};

use crate::error::{GeocastError, Result};
use crate::stream::{NewStream, StreamEnd};

/// Handle to a Geocast instance.
///
/// Cheap to share behind an `Arc`; every operation takes `&self` and may be
/// called from many threads at once.
///
/// # Example
///
/// ```
/// use geocast::{Geocast, GeocastConfig, NewStream, PrivacyMode};
///
/// let geocast = Geocast::in_memory(GeocastConfig::default()).unwrap();
///
/// let a = geocast.create_stream(NewStream::new("ana", 41.0082, 28.9784)).unwrap();
/// assert_eq!(a.event_id, None);
///
/// let b = geocast
///     .create_stream(NewStream::new("bo", 41.00825, 28.97845).with_privacy(PrivacyMode::Masked100m))
///     .unwrap();
/// let event_id = b.event_id.unwrap();
///
/// let detail = geocast.get_event_detail(event_id).unwrap();
/// assert_eq!(detail.event.stream_count, 2);
/// ```
pub struct Geocast {
    store: Store,
    clock: Arc<dyn Clock>,
    config: GeocastConfig,
    engine: ClusterEngine,
    queries: QueryService,
}

impl Geocast {
    /// Builds an instance over an explicitly constructed store and clock.
    ///
    /// # Errors
    ///
    /// [`crate::GeocastError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: GeocastConfig, store: Store, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let engine =
            ClusterEngine::new(store.clone(), Arc::clone(&clock), config.cluster.clone())?;
        let queries = QueryService::new(store.clone(), Arc::clone(&clock), config.query.clone());
        Ok(Self {
            store,
            clock,
            config,
            engine,
            queries,
        })
    }

    /// Opens the store backend selected by `config.store` with the system
    /// clock.
    pub fn open(config: GeocastConfig) -> Result<Self> {
        let store = Store::open(&config.store);
        Self::new(config, store, Arc::new(SystemClock))
    }

    /// An instance over a fresh in-memory store with the system clock.
    pub fn in_memory(config: GeocastConfig) -> Result<Self> {
        Self::new(config, Store::in_memory(), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &GeocastConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Persists a new live stream and clusters it.
    ///
    /// Clustering is best-effort: if it fails the stream stays persisted
    /// and unassigned, the failure is logged, and the call still succeeds.
    /// The returned view carries masked coordinates and the resolved event.
    ///
    /// # Errors
    ///
    /// [`crate::GeocastError::StoreUnavailable`] if the stream cannot be
    /// persisted.
    pub fn create_stream(&self, request: NewStream) -> Result<StreamView> {
        let mut stream = Stream::new(
            StreamId::generate(),
            request.user_id,
            GeoPoint::new(request.lat, request.lng),
            request.privacy_mode,
            request.device_camera,
            self.clock.now(),
        );
        self.store.streams().insert(stream.clone())?;
        debug!(stream_id = %stream.id, privacy = %stream.privacy_mode, "stream created");

        match self.engine.on_stream_created(&stream) {
            Ok(event_id) => stream.event_id = event_id,
            Err(error) => warn!(
                stream_id = %stream.id,
                %error,
                "clustering failed; stream left unassigned"
            ),
        }

        Ok(StreamView::masked(&stream))
    }

    /// Ends a live stream, closing its event if it was the last live member.
    ///
    /// # Errors
    ///
    /// [`crate::GeocastError::NotFound`] if the stream does not exist or has
    /// already ended.
    pub fn end_stream(&self, stream_id: StreamId) -> Result<StreamEnd> {
        let ended = self.engine.on_stream_ended(stream_id)?;
        Ok(StreamEnd {
            stream_id,
            ended_at: ended.stream.ended_at.unwrap_or_else(|| self.clock.now()),
            closed_event: ended.closed_event,
        })
    }

    /// A single stream in any status, masked.
    ///
    /// # Errors
    ///
    /// [`crate::GeocastError::NotFound`] if no stream has this id.
    pub fn get_stream(&self, stream_id: StreamId) -> Result<StreamView> {
        let stream = self
            .store
            .streams()
            .find_by_id(&stream_id)?
            .ok_or_else(|| GeocastError::NotFound(format!("stream {stream_id} not found")))?;
        Ok(StreamView::masked(&stream))
    }

    /// Live, started streams, masked, optionally inside `bbox`.
    pub fn list_live_streams(&self, bbox: Option<&BoundingBox>) -> Result<Vec<StreamView>> {
        Ok(self.queries.list_live_streams(bbox)?)
    }

    /// Live events, optionally with their centroid inside `bbox`.
    pub fn list_live_events(&self, bbox: Option<&BoundingBox>) -> Result<Vec<EventView>> {
        Ok(self.queries.list_live_events(bbox)?)
    }

    /// Events created in `[from, to]`; defaults to the last hour.
    pub fn list_events_in_range(
        &self,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        bbox: Option<&BoundingBox>,
    ) -> Result<Vec<EventView>> {
        Ok(self.queries.list_events_in_range(from, to, bbox)?)
    }

    /// An event plus all of its streams, masked.
    pub fn get_event_detail(&self, event_id: EventId) -> Result<EventDetail> {
        Ok(self.queries.get_event_detail(event_id)?)
    }

    /// Parses a client `ne`/`sw` corner pair into an optional filter.
    pub fn parse_bbox(ne: Option<&str>, sw: Option<&str>) -> Result<Option<BoundingBox>> {
        Ok(BoundingBox::parse_corners(ne, sw)?)
    }

    /// Tears down the store. Every later operation fails with
    /// [`crate::GeocastError::StoreUnavailable`].
    pub fn shutdown(&self) {
        self.store.shutdown();
    }
}

impl std::fmt::Debug for Geocast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocast")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! Unit tests for geocast-query

use std::sync::Arc;

use geocast_config::QueryConfig;
use geocast_geo::{BoundingBox, distance};
use geocast_store::{Store, StoreError, StreamPatch};
use geocast_types::{
    DeviceCamera, Event, EventId, EventStatus, GeoPoint, ManualClock, PrivacyMode, Stream,
    StreamId, StreamStatus, Timestamp, UserId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use test_case::test_case;

use crate::*;

// ============================================================================
// Test Helpers
// ============================================================================

const NOW_MS: i64 = 1_700_000_000_000;

fn t(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis)
}

struct Fixture {
    store: Store,
    service: QueryService,
}

impl Fixture {
    fn new() -> Self {
        let store = Store::in_memory();
        let clock = Arc::new(ManualClock::new(t(NOW_MS)));
        let service = QueryService::new(store.clone(), clock, QueryConfig::default());
        Self { store, service }
    }

    fn stream(&self, lat: f64, lng: f64, mode: PrivacyMode, started_ms: i64) -> Stream {
        let stream = Stream::new(
            StreamId::generate(),
            UserId::from("viewer"),
            GeoPoint::new(lat, lng),
            mode,
            DeviceCamera::Front,
            t(started_ms),
        );
        self.store.streams().insert(stream.clone()).unwrap();
        stream
    }

    fn event(&self, lat: f64, lng: f64, created_ms: i64) -> Event {
        let event = Event::new(EventId::generate(), GeoPoint::new(lat, lng), 2, t(created_ms));
        self.store.events().insert(event.clone()).unwrap();
        event
    }
}

fn bbox(ne: &str, sw: &str) -> BoundingBox {
    parse_bbox(Some(ne), Some(sw)).unwrap().unwrap()
}

// ============================================================================
// Live Stream Tests
// ============================================================================

#[test]
fn live_streams_excludes_ended_and_future() {
    let f = Fixture::new();
    let live = f.stream(41.0, 29.0, PrivacyMode::Exact, NOW_MS - 1_000);
    let ended = f.stream(41.0, 29.0, PrivacyMode::Exact, NOW_MS - 2_000);
    f.stream(41.0, 29.0, PrivacyMode::Exact, NOW_MS + 60_000);
    f.store
        .streams()
        .update_fields(&ended.id, &StreamPatch::end(t(NOW_MS)))
        .unwrap();

    let views = f.service.list_live_streams(None).unwrap();
    let ids: Vec<_> = views.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![live.id]);
}

#[test]
fn live_streams_bbox_filters_on_raw_coordinates() {
    let f = Fixture::new();
    let inside = f.stream(41.0, 29.0, PrivacyMode::Masked1km, NOW_MS);
    f.stream(42.0, 29.0, PrivacyMode::Exact, NOW_MS);

    let area = bbox("41.001,29.001", "40.999,28.999");
    let views = f.service.list_live_streams(Some(&area)).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, inside.id);
    assert_eq!(views[0].privacy_mode, PrivacyMode::Masked1km);
    assert_eq!(views[0].device_camera, DeviceCamera::Front);
}

#[test]
fn live_streams_respect_page_size() {
    let store = Store::in_memory();
    let clock = Arc::new(ManualClock::new(t(NOW_MS)));
    let config = QueryConfig {
        live_streams_limit: 3,
        ..QueryConfig::default()
    };
    let service = QueryService::new(store.clone(), clock, config);
    for i in 0..5 {
        let stream = Stream::new(
            StreamId::generate(),
            UserId::from("u"),
            GeoPoint::new(f64::from(i), 0.0),
            PrivacyMode::Exact,
            DeviceCamera::Back,
            t(NOW_MS),
        );
        store.streams().insert(stream).unwrap();
    }
    assert_eq!(service.list_live_streams(None).unwrap().len(), 3);
}

#[test_case(PrivacyMode::Exact, 0.0 ; "exact")]
#[test_case(PrivacyMode::Masked100m, 100.0 ; "masked 100m")]
#[test_case(PrivacyMode::Masked1km, 1000.0 ; "masked 1km")]
fn views_mask_within_the_mode_radius(mode: PrivacyMode, radius: f64) {
    let f = Fixture::new();
    let stream = f.stream(41.0082, 28.9784, mode, NOW_MS);

    for _ in 0..50 {
        let view = &f.service.list_live_streams(None).unwrap()[0];
        let shown = GeoPoint::new(view.lat, view.lng);
        assert!(distance(shown, stream.location) <= radius + 1e-6);
    }
}

#[test]
fn masked_view_is_reproducible_with_a_seeded_rng() {
    let f = Fixture::new();
    let stream = f.stream(41.0, 29.0, PrivacyMode::Masked100m, NOW_MS);
    let a = StreamView::masked_with(&mut StdRng::seed_from_u64(7), &stream);
    let b = StreamView::masked_with(&mut StdRng::seed_from_u64(7), &stream);
    assert_eq!(a, b);
}

// ============================================================================
// Event Tests
// ============================================================================

#[test]
fn live_events_bbox_filters_on_centroid() {
    let f = Fixture::new();
    let near = f.event(41.0, 29.0, NOW_MS);
    f.event(10.0, 10.0, NOW_MS);

    let area = bbox("41.5,29.5", "40.5,28.5");
    let views = f.service.list_live_events(Some(&area)).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, near.id);
    assert_eq!(views[0].centroid_lat, 41.0);
    assert_eq!(views[0].radius_meters, 50);
    assert_eq!(views[0].status, EventStatus::Live);
}

#[test]
fn range_defaults_to_the_last_hour() {
    let f = Fixture::new();
    let recent = f.event(0.0, 0.0, NOW_MS - 30 * 60 * 1000);
    f.event(0.0, 0.0, NOW_MS - 2 * 60 * 60 * 1000);

    let views = f.service.list_events_in_range(None, None, None).unwrap();
    let ids: Vec<_> = views.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![recent.id]);
}

#[test]
fn range_bounds_are_inclusive() {
    let f = Fixture::new();
    let at_from = f.event(0.0, 0.0, 1_000);
    let at_to = f.event(0.0, 0.0, 2_000);
    f.event(0.0, 0.0, 2_001);

    let views = f
        .service
        .list_events_in_range(Some(t(1_000)), Some(t(2_000)), None)
        .unwrap();
    let ids: Vec<_> = views.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![at_from.id, at_to.id]);
}

#[test]
fn inverted_range_is_rejected() {
    let f = Fixture::new();
    let result = f
        .service
        .list_events_in_range(Some(t(5_000)), Some(t(4_999)), None);
    assert_eq!(
        result,
        Err(QueryError::InvalidRange {
            from: t(5_000),
            to: t(4_999),
        })
    );
}

#[test]
fn from_in_the_future_without_to_is_rejected() {
    let f = Fixture::new();
    let from = t(NOW_MS + 60_000);
    assert!(matches!(
        f.service.list_events_in_range(Some(from), None, None),
        Err(QueryError::InvalidRange { .. })
    ));
}

#[test]
fn event_detail_includes_streams_of_any_status() {
    let f = Fixture::new();
    let event = f.event(41.0, 29.0, NOW_MS);
    let a = f.stream(41.0, 29.0, PrivacyMode::Exact, NOW_MS);
    let b = f.stream(41.0, 29.0, PrivacyMode::Masked100m, NOW_MS);
    f.stream(41.0, 29.0, PrivacyMode::Exact, NOW_MS);
    for id in [a.id, b.id] {
        f.store
            .streams()
            .update_fields(&id, &StreamPatch::assign_event(event.id))
            .unwrap();
    }
    f.store
        .streams()
        .update_fields(&a.id, &StreamPatch::end(t(NOW_MS + 1)))
        .unwrap();

    let detail = f.service.get_event_detail(event.id).unwrap();
    assert_eq!(detail.event.id, event.id);
    let ids: Vec<_> = detail.streams.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert_eq!(detail.streams[0].status, StreamStatus::Ended);
    assert_eq!(detail.streams[0].lat, 41.0);
}

#[test]
fn unknown_event_detail_is_not_found() {
    let f = Fixture::new();
    let id = EventId::generate();
    assert_eq!(
        f.service.get_event_detail(id),
        Err(QueryError::EventNotFound(id))
    );
}

#[test]
fn closed_store_is_reported() {
    let f = Fixture::new();
    f.store.shutdown();
    assert!(matches!(
        f.service.list_live_events(None),
        Err(QueryError::Store(StoreError::Unavailable(_)))
    ));
}

// ============================================================================
// Parsing / Serialization Tests
// ============================================================================

#[test_case(Some("41,29"), None ; "missing sw")]
#[test_case(Some("north"), Some("40,28") ; "unparsable")]
#[test_case(Some("40,28"), Some("41,29") ; "inverted")]
fn bad_bbox_is_rejected(ne: Option<&str>, sw: Option<&str>) {
    assert!(matches!(
        parse_bbox(ne, sw),
        Err(QueryError::InvalidBoundingBox(_))
    ));
}

#[test]
fn absent_bbox_is_unfiltered() {
    assert_eq!(parse_bbox(None, None), Ok(None));
}

#[test]
fn event_view_serializes_flat_centroid() {
    let event = Event::new(EventId::generate(), GeoPoint::new(1.5, 2.5), 3, t(0));
    let json = serde_json::to_value(EventView::from(event)).unwrap();
    assert_eq!(json["centroid_lat"], 1.5);
    assert_eq!(json["centroid_lng"], 2.5);
    assert_eq!(json["stream_count"], 3);
    assert_eq!(json["status"], "live");
    assert_eq!(json["hashtags"], serde_json::json!([]));
}

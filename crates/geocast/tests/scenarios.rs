//! End-to-end scenarios through the public SDK.

use std::sync::Arc;
use std::time::Duration;

use geocast::{
    BoundingBox, Clock, EventStatus, GeoPoint, Geocast, GeocastConfig, GeocastError, ManualClock,
    NewStream, PrivacyMode, Store, StreamStatus, Timestamp, distance,
};
use proptest::prelude::*;

fn harness() -> (Geocast, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(1_760_000_000_000)));
    let geocast =
        Geocast::new(GeocastConfig::default(), Store::in_memory(), clock.clone()).unwrap();
    (geocast, clock)
}

fn istanbul_bbox() -> BoundingBox {
    Geocast::parse_bbox(Some("41.1,29.1"), Some("40.9,28.9"))
        .unwrap()
        .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn two_broadcasters_together_form_an_event() {
    let (geocast, clock) = harness();

    let a = geocast
        .create_stream(NewStream::new("ana", 41.0082, 28.9784))
        .unwrap();
    assert_eq!(a.event_id, None);

    clock.advance(Duration::from_secs(120));
    let b = geocast
        .create_stream(
            NewStream::new("bo", 41.00825, 28.97845).with_privacy(PrivacyMode::Masked100m),
        )
        .unwrap();
    let event_id = b.event_id.expect("co-located stream should form an event");

    let detail = geocast.get_event_detail(event_id).unwrap();
    assert_eq!(detail.event.stream_count, 2);
    assert_eq!(detail.event.status, EventStatus::Live);
    assert_eq!(detail.event.radius_meters, 50);
    assert_eq!(detail.streams.len(), 2);
    assert!(detail.streams.iter().all(|s| s.event_id == Some(event_id)));
}

#[test]
fn distant_broadcaster_stays_alone() {
    let (geocast, _) = harness();
    geocast
        .create_stream(NewStream::new("ana", 41.0082, 28.9784))
        .unwrap();
    geocast
        .create_stream(NewStream::new("bo", 41.00825, 28.97845))
        .unwrap();

    let c = geocast
        .create_stream(NewStream::new("cem", 41.02, 28.99))
        .unwrap();
    assert_eq!(c.event_id, None);
}

#[test]
fn ending_both_members_closes_the_event() {
    let (geocast, clock) = harness();
    let a = geocast
        .create_stream(NewStream::new("ana", 41.0082, 28.9784))
        .unwrap();
    let b = geocast
        .create_stream(NewStream::new("bo", 41.00825, 28.97845))
        .unwrap();
    let event_id = b.event_id.unwrap();
    let bbox = istanbul_bbox();

    clock.advance(Duration::from_secs(60));
    let first = geocast.end_stream(a.id).unwrap();
    assert_eq!(first.closed_event, None);
    let live = geocast.list_live_events(Some(&bbox)).unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].stream_count, 1);

    clock.advance(Duration::from_secs(60));
    let second = geocast.end_stream(b.id).unwrap();
    assert_eq!(second.closed_event, Some(event_id));
    assert_eq!(second.ended_at, clock.now());

    assert!(geocast.list_live_events(Some(&bbox)).unwrap().is_empty());
    let detail = geocast.get_event_detail(event_id).unwrap();
    assert_eq!(detail.event.status, EventStatus::Ended);
    assert_eq!(detail.event.ended_at, Some(clock.now()));
    assert!(detail.streams.iter().all(|s| s.status == StreamStatus::Ended));
}

#[test]
fn inverted_range_is_invalid() {
    let (geocast, clock) = harness();
    let t = clock.now();
    let before = Timestamp::from_millis(t.as_millis() - 1);
    assert!(matches!(
        geocast.list_events_in_range(Some(t), Some(before), None),
        Err(GeocastError::InvalidRange { .. })
    ));
}

#[test]
fn ending_twice_reports_not_found() {
    let (geocast, _) = harness();
    let a = geocast
        .create_stream(NewStream::new("ana", 41.0, 29.0))
        .unwrap();

    assert!(geocast.end_stream(a.id).is_ok());
    assert!(matches!(
        geocast.end_stream(a.id),
        Err(GeocastError::NotFound(_))
    ));
}

#[test]
fn recent_events_are_listed_in_range() {
    let (geocast, clock) = harness();
    geocast
        .create_stream(NewStream::new("ana", 41.0082, 28.9784))
        .unwrap();
    let b = geocast
        .create_stream(NewStream::new("bo", 41.00825, 28.97845))
        .unwrap();

    let events = geocast.list_events_in_range(None, None, None).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(Some(events[0].id), b.event_id);

    clock.advance(Duration::from_secs(2 * 60 * 60));
    assert!(geocast.list_events_in_range(None, None, None).unwrap().is_empty());
}

#[test]
fn live_stream_listing_masks_and_filters() {
    let (geocast, _) = harness();
    let masked = geocast
        .create_stream(NewStream::new("ana", 41.0, 29.0).with_privacy(PrivacyMode::Masked1km))
        .unwrap();
    geocast
        .create_stream(NewStream::new("bo", 52.52, 13.405))
        .unwrap();

    let listed = geocast.list_live_streams(Some(&istanbul_bbox())).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, masked.id);
    let shown = GeoPoint::new(listed[0].lat, listed[0].lng);
    assert!(distance(shown, GeoPoint::new(41.0, 29.0)) <= 1000.0 + 1e-6);
}

// ============================================================================
// Properties
// ============================================================================

/// A point `meters` due east of (41.0, 29.0).
fn east_of_origin(meters: f64) -> (f64, f64) {
    let lng_degree = 111_194.93 * 41.0f64.to_radians().cos();
    (41.0, 29.0 + meters / lng_degree)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pairs_beyond_fifty_meters_never_share_an_event(
        meters in 50.5..500.0f64,
        gap_secs in 0u64..=600,
    ) {
        let (geocast, clock) = harness();
        let (lat, lng) = east_of_origin(meters);
        let a = geocast.create_stream(NewStream::new("a", 41.0, 29.0)).unwrap();
        clock.advance(Duration::from_secs(gap_secs));
        let b = geocast.create_stream(NewStream::new("b", lat, lng)).unwrap();

        prop_assume!(distance(GeoPoint::new(41.0, 29.0), GeoPoint::new(lat, lng)) > 50.0);
        prop_assert_eq!(a.event_id, None);
        prop_assert_eq!(b.event_id, None);
    }

    #[test]
    fn pairs_within_fifty_meters_share_an_event(
        meters in 0.0..49.5f64,
        gap_secs in 0u64..=600,
    ) {
        let (geocast, clock) = harness();
        let (lat, lng) = east_of_origin(meters);
        let a = geocast.create_stream(NewStream::new("a", 41.0, 29.0)).unwrap();
        clock.advance(Duration::from_secs(gap_secs));
        let b = geocast.create_stream(NewStream::new("b", lat, lng)).unwrap();

        let event_id = b.event_id;
        prop_assert!(event_id.is_some());
        let detail = geocast.get_event_detail(event_id.unwrap()).unwrap();
        let ids: Vec<_> = detail.streams.iter().map(|s| s.id).collect();
        prop_assert_eq!(ids, vec![a.id, b.id]);
    }
}

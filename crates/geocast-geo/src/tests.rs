//! Unit tests for geocast-geo

use geocast_types::{GeoPoint, PrivacyMode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use test_case::test_case;

use crate::*;

// ============================================================================
// Distance Tests
// ============================================================================

#[test]
fn distance_to_self_is_zero() {
    let p = GeoPoint::new(41.0082, 28.9784);
    assert_eq!(distance(p, p), 0.0);
}

#[test]
fn paris_to_london_is_about_344_km() {
    let paris = GeoPoint::new(48.8566, 2.3522);
    let london = GeoPoint::new(51.5074, -0.1278);
    let d = distance(paris, london);
    assert!((d - 343_556.0).abs() < 1_000.0, "got {d}");
}

#[test]
fn co_located_broadcasters_are_within_join_radius() {
    let a = GeoPoint::new(41.0082, 28.9784);
    let b = GeoPoint::new(41.00825, 28.97845);
    let d = distance(a, b);
    assert!(d > 5.0 && d < 10.0, "got {d}");
}

#[test]
fn distant_broadcaster_is_outside_join_radius() {
    let a = GeoPoint::new(41.0082, 28.9784);
    let c = GeoPoint::new(41.02, 28.99);
    assert!(distance(a, c) > 50.0);
}

#[test]
fn distance_is_symmetric() {
    let a = GeoPoint::new(-33.8688, 151.2093);
    let b = GeoPoint::new(-37.8136, 144.9631);
    assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
}

// ============================================================================
// Bounding Box Tests
// ============================================================================

#[test]
fn bbox_at_equator_is_square_in_degrees() {
    let bbox = BoundingBox::around(GeoPoint::new(0.0, 0.0), 111_320.0);
    assert!((bbox.max_lat - 1.0).abs() < 1e-12);
    assert!((bbox.max_lng - 1.0).abs() < 1e-12);
    assert!((bbox.min_lat + 1.0).abs() < 1e-12);
}

#[test]
fn bbox_widens_in_longitude_away_from_equator() {
    let bbox = BoundingBox::around(GeoPoint::new(60.0, 10.0), 1_000.0);
    let lat_span = bbox.max_lat - bbox.min_lat;
    let lng_span = bbox.max_lng - bbox.min_lng;
    assert!((lng_span / lat_span - 2.0).abs() < 1e-6);
}

#[test]
fn bbox_stays_finite_at_the_pole() {
    let bbox = BoundingBox::around(GeoPoint::new(90.0, 0.0), 60.0);
    assert!(bbox.min_lng.is_finite());
    assert!(bbox.max_lng.is_finite());
}

#[test]
fn bbox_contains_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    assert!(bbox.contains(GeoPoint::new(0.0, 1.0)));
    assert!(!bbox.contains(GeoPoint::new(1.0001, 0.5)));
}

#[test]
fn parse_corners_accepts_a_well_formed_pair() {
    let bbox = BoundingBox::parse_corners(Some("41.1,29.1"), Some("40.9, 28.9"))
        .unwrap()
        .unwrap();
    assert_eq!(bbox, BoundingBox::new(40.9, 28.9, 41.1, 29.1));
}

#[test]
fn parse_corners_without_any_corner_is_unfiltered() {
    assert_eq!(BoundingBox::parse_corners(None, None).unwrap(), None);
}

#[test_case(Some("41.1,29.1"), None ; "missing sw")]
#[test_case(None, Some("40.9,28.9") ; "missing ne")]
#[test_case(Some("41.1"), Some("40.9,28.9") ; "single component")]
#[test_case(Some("41.1,29.1,3"), Some("40.9,28.9") ; "three components")]
#[test_case(Some("north,29.1"), Some("40.9,28.9") ; "not a number")]
#[test_case(Some("91.0,29.1"), Some("40.9,28.9") ; "latitude out of range")]
#[test_case(Some("40.0,29.1"), Some("40.9,28.9") ; "inverted latitude")]
#[test_case(Some("41.1,28.0"), Some("40.9,28.9") ; "inverted longitude")]
fn parse_corners_rejects_malformed_pairs(ne: Option<&str>, sw: Option<&str>) {
    assert!(matches!(
        BoundingBox::parse_corners(ne, sw),
        Err(GeoError::InvalidBoundingBox(_))
    ));
}

// ============================================================================
// Masking Tests
// ============================================================================

#[test]
fn exact_mode_is_identity() {
    let p = GeoPoint::new(41.0082, 28.9784);
    assert_eq!(mask_location(p, PrivacyMode::Exact), p);
}

#[test]
fn masking_is_redrawn_on_every_call() {
    let mut rng = StdRng::seed_from_u64(7);
    let p = GeoPoint::new(41.0082, 28.9784);
    let first = mask_location_with(&mut rng, p, PrivacyMode::Masked1km);
    let second = mask_location_with(&mut rng, p, PrivacyMode::Masked1km);
    assert_ne!(first, second);
}

#[test_case(PrivacyMode::Masked100m, 100.0)]
#[test_case(PrivacyMode::Masked1km, 1000.0)]
fn masking_stays_inside_radius_near_the_pole(mode: PrivacyMode, radius: f64) {
    let mut rng = StdRng::seed_from_u64(42);
    let p = GeoPoint::new(89.999, 45.0);
    for _ in 0..500 {
        let masked = mask_location_with(&mut rng, p, mode);
        assert!(distance(p, masked) <= radius);
        assert!(masked.is_valid());
    }
}

mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn masked_100m_within_bound(lat in -85.0f64..85.0, lng in -179.9f64..179.9, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = GeoPoint::new(lat, lng);
            let masked = mask_location_with(&mut rng, p, PrivacyMode::Masked100m);
            prop_assert!(distance(p, masked) <= 100.0);
        }

        #[test]
        fn masked_1km_within_bound(lat in -85.0f64..85.0, lng in -180.0f64..180.0, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = GeoPoint::new(lat, lng);
            let masked = mask_location_with(&mut rng, p, PrivacyMode::Masked1km);
            prop_assert!(distance(p, masked) <= 1000.0);
        }

        #[test]
        fn exact_mask_is_identity(lat in -90.0f64..90.0, lng in -180.0f64..180.0) {
            let p = GeoPoint::new(lat, lng);
            prop_assert_eq!(mask_location(p, PrivacyMode::Exact), p);
        }

        #[test]
        fn prefilter_box_covers_join_radius(
            lat in -80.0f64..80.0,
            lng in -179.0f64..179.0,
            bearing in 0.0f64..std::f64::consts::TAU,
            meters in 0.0f64..50.0,
        ) {
            // Walk `meters` from the center along `bearing` using the same
            // flat projection the box uses; anything within 50 m of
            // great-circle distance must land inside the 60 m box.
            let center = GeoPoint::new(lat, lng);
            let dlat = meters / METERS_PER_DEGREE * bearing.sin();
            let dlng = meters / (METERS_PER_DEGREE * lat.to_radians().cos()) * bearing.cos();
            let other = GeoPoint::new(lat + dlat, lng + dlng);
            prop_assume!(distance(center, other) <= 50.0);
            prop_assert!(BoundingBox::around(center, 60.0).contains(other));
        }
    }
}

//! Read-time location masking.
//!
//! Each call draws a fresh angle and distance fraction, so successive reads
//! of the same stream yield different coordinates. Nothing is cached per
//! stream.

use std::f64::consts::TAU;

use geocast_types::{GeoPoint, PrivacyMode};
use rand::Rng;

use crate::{METERS_PER_DEGREE, distance, meters_per_degree_lng};

/// Masks `point` according to `mode` using the thread-local RNG.
///
/// `Exact` returns the point unchanged. The masked modes return a point
/// whose haversine distance from `point` never exceeds the mode's radius.
pub fn mask_location(point: GeoPoint, mode: PrivacyMode) -> GeoPoint {
    mask_location_with(&mut rand::thread_rng(), point, mode)
}

/// Like [`mask_location`] but with a caller-supplied RNG.
pub fn mask_location_with<R: Rng + ?Sized>(
    rng: &mut R,
    point: GeoPoint,
    mode: PrivacyMode,
) -> GeoPoint {
    let Some(radius) = mode.mask_radius_meters() else {
        return point;
    };

    let angle = rng.gen_range(0.0..TAU);
    let fraction: f64 = rng.gen_range(0.0..1.0);
    let offset = fraction * radius;

    let dlat = offset / METERS_PER_DEGREE * angle.sin();
    let dlng = offset / meters_per_degree_lng(point.lat) * angle.cos();

    // The flat-earth offset can overshoot the great-circle radius close to
    // the poles; pull it back toward the center until it fits.
    let mut scale = 1.0;
    let mut masked = offset_point(point, dlat, dlng, scale);
    for _ in 0..16 {
        let actual = distance(point, masked);
        if actual <= radius {
            return masked;
        }
        scale *= radius / actual * 0.999;
        masked = offset_point(point, dlat, dlng, scale);
    }
    point
}

fn offset_point(point: GeoPoint, dlat: f64, dlng: f64, scale: f64) -> GeoPoint {
    let lat = (point.lat + dlat * scale).clamp(-90.0, 90.0);
    let lng = point.lng + dlng * scale;
    let lng = if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    };
    GeoPoint::new(lat, lng)
}

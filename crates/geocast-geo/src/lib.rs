//! geocast-geo: Geo-math for `Geocast`
//!
//! Pure functions with no state:
//!
//! - [`haversine_distance`] / [`distance`]: great-circle distance in meters
//! - [`BoundingBox::around`]: coarse lat/lng box around a center and radius
//! - [`mask_location`]: privacy jitter applied at read time
//!
//! The bounding box uses a flat 111,320 m-per-degree approximation and is
//! only ever a pre-filter. The haversine distance is the authoritative test.
//!
//! # Example
//!
//! ```
//! use geocast_geo::{BoundingBox, distance};
//! use geocast_types::GeoPoint;
//!
//! let a = GeoPoint::new(41.0082, 28.9784);
//! let b = GeoPoint::new(41.00825, 28.97845);
//! assert!(distance(a, b) < 50.0);
//!
//! let bbox = BoundingBox::around(a, 60.0);
//! assert!(bbox.contains(b));
//! ```

mod bbox;
mod mask;

#[cfg(test)]
mod tests;

pub use bbox::{BoundingBox, GeoError};
pub use mask::{mask_location, mask_location_with};

use geocast_types::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude used by the bounding-box approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Floor for the cosine factor so longitude spans stay finite near the poles.
pub const MIN_COS_LAT: f64 = 0.000_01;

/// Haversine distance between two points in meters.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Haversine distance between two [`GeoPoint`]s in meters.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

/// Meters spanned by one degree of longitude at `lat`, with the pole guard.
pub(crate) fn meters_per_degree_lng(lat: f64) -> f64 {
    METERS_PER_DEGREE * lat.to_radians().cos().max(MIN_COS_LAT)
}

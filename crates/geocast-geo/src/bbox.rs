//! Axis-aligned latitude/longitude boxes.

use geocast_types::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::{METERS_PER_DEGREE, meters_per_degree_lng};

/// Errors produced while building a bounding box from client input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// An axis-aligned lat/lng rectangle, bounds inclusive.
///
/// Boxes crossing the antimeridian are not representable; callers split
/// them if they need that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Builds a box from explicit bounds without validation.
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Expands a center and radius into a box.
    ///
    /// One degree of latitude is taken as 111,320 m and one degree of
    /// longitude as 111,320 m x cos(lat), with the cosine floored at
    /// [`crate::MIN_COS_LAT`].
    pub fn around(center: GeoPoint, radius_meters: f64) -> Self {
        let lat_delta = radius_meters / METERS_PER_DEGREE;
        let lng_delta = radius_meters / meters_per_degree_lng(center.lat);
        Self {
            min_lat: center.lat - lat_delta,
            min_lng: center.lng - lng_delta,
            max_lat: center.lat + lat_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    /// Builds a box from its north-east and south-west corners.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBoundingBox`] if either corner is outside
    /// the valid coordinate range or the south-west corner lies north or
    /// east of the north-east one.
    pub fn from_corners(ne: GeoPoint, sw: GeoPoint) -> Result<Self, GeoError> {
        if !ne.is_valid() || !sw.is_valid() {
            return Err(GeoError::InvalidBoundingBox(format!(
                "corner out of range: ne={ne} sw={sw}"
            )));
        }
        if sw.lat > ne.lat || sw.lng > ne.lng {
            return Err(GeoError::InvalidBoundingBox(format!(
                "south-west corner {sw} is not below and left of north-east corner {ne}"
            )));
        }
        Ok(Self::new(sw.lat, sw.lng, ne.lat, ne.lng))
    }

    /// Parses an optional `"lat,lng"` corner pair as sent by clients.
    ///
    /// Both absent means no spatial filter. Exactly one present is an error.
    pub fn parse_corners(ne: Option<&str>, sw: Option<&str>) -> Result<Option<Self>, GeoError> {
        match (ne, sw) {
            (None, None) => Ok(None),
            (Some(ne), Some(sw)) => {
                let ne = parse_corner(ne)?;
                let sw = parse_corner(sw)?;
                Self::from_corners(ne, sw).map(Some)
            }
            _ => Err(GeoError::InvalidBoundingBox(
                "both ne and sw corners are required".to_string(),
            )),
        }
    }

    /// Returns true if `point` lies inside the box, edges included.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

fn parse_corner(raw: &str) -> Result<GeoPoint, GeoError> {
    let mut parts = raw.split(',');
    let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeoError::InvalidBoundingBox(format!(
            "expected 'lat,lng', got '{raw}'"
        )));
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| GeoError::InvalidBoundingBox(format!("not a number: '{s}'")))
    };
    Ok(GeoPoint::new(parse(lat)?, parse(lng)?))
}

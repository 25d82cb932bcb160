//! Great-circle helpers.

use crate::model::{Observer, OrbitalPosition};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Half-width in degrees of the aircraft query box around the observer.
pub const AIRCRAFT_BOX_DEGREES: f64 = 1.5;

/// Great-circle distance between two `(lat, lon)` pairs in degrees, in kilometres.
///
/// ```
/// use intel_core::geo::haversine_km;
///
/// let d = haversine_km((0.0, 0.0), (0.0, 180.0));
/// assert!((d - 20015.1).abs() < 1.0);
/// ```
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards sqrt(1 - a) against a drifting past 1.0 at the antipode.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance from the observer to the orbital ground point.
pub fn distance_to(observer: &Observer, position: &OrbitalPosition) -> f64 {
    haversine_km(
        (observer.lat, observer.lon),
        (position.latitude, position.longitude),
    )
}

/// Lat/lon query rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge.
    pub lamin: f64,
    /// Western edge.
    pub lomin: f64,
    /// Northern edge.
    pub lamax: f64,
    /// Eastern edge.
    pub lomax: f64,
}

impl BoundingBox {
    /// Square of `half_width` degrees on each side of `(lat, lon)`.
    pub fn around(lat: f64, lon: f64, half_width: f64) -> Self {
        Self {
            lamin: lat - half_width,
            lomin: lon - half_width,
            lamax: lat + half_width,
            lomax: lon + half_width,
        }
    }
}

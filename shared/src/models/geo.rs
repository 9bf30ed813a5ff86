//! Coordinate Model

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for distance estimates
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Geographic coordinate (`{lat, lng}`)
///
/// Represents either the user's current position or the map's current
/// center. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Joinville city center, used whenever no live position is available
    pub const DEFAULT_CENTER: Coordinate = Coordinate {
        lat: -26.3045,
        lng: -48.8487,
    };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns a coordinate only if both components are finite and in range
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::DEFAULT_CENTER
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

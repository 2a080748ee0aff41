//! Great-circle distance and user location types.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius used by [`compute_distance`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Distance reported for offers whose seller has no coordinate.
///
/// Ranking never compares this value against real distances; offers with an
/// unknown location always sort after offers with a known one.
pub const UNKNOWN_DISTANCE_METERS: f64 = 999_999.0;

/// Reference point in La Serena, Chile, used when no precise location exists.
pub const DEFAULT_FALLBACK: Coordinate = Coordinate {
    lat: -29.9027,
    lng: -71.2519,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is NaN/inf.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let coordinate = Self { lat, lng };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Re-check a coordinate that arrived through deserialization.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Coordinate::new`].
    pub fn validate(&self) -> Result<(), CoreError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Haversine distance in meters between two coordinates.
#[must_use]
pub fn compute_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Human label for a distance: whole meters below 1 km, one-decimal km above.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", meters.round())
    }
}

/// Where the user coordinate came from. Affects presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvenance {
    /// Reported by the user's device.
    Precise,
    /// The configured reference point.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub provenance: LocationProvenance,
}

impl UserLocation {
    #[must_use]
    pub fn precise(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provenance: LocationProvenance::Precise,
        }
    }

    #[must_use]
    pub fn fallback(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provenance: LocationProvenance::Fallback,
        }
    }

    #[must_use]
    pub fn is_precise(&self) -> bool {
        self.provenance == LocationProvenance::Precise
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.provenance == LocationProvenance::Fallback
    }
}

use serde::{Deserialize, Serialize};
use tienda_core::Coordinate;

/// Best match for an address lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    /// Full place name as reported by the geocoder.
    pub display_name: String,
}

/// One element of a Nominatim `/search?format=json` array. Coordinates come
/// back as decimal strings.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

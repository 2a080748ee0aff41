//! Address geocoding against a Nominatim-compatible search endpoint.
//!
//! Used when registering a seller to turn a street address into the
//! coordinate that distance ranking depends on.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::GeocodeClient;
pub use error::GeocodeError;
pub use normalize::normalize_address;
pub use types::GeocodeHit;

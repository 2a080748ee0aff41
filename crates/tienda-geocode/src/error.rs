use thiserror::Error;
use tienda_core::CoreError;

/// Errors returned by the geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid geocoder base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("address must not be empty")]
    EmptyAddress,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A result carried `lat`/`lon` strings that are not numbers.
    #[error("geocoder returned unparsable coordinate ({lat}, {lon})")]
    BadCoordinate { lat: String, lon: String },

    /// A result parsed to a coordinate outside the valid range.
    #[error(transparent)]
    Coordinate(#[from] CoreError),
}

//! HTTP client for a Nominatim-compatible `/search` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use tienda_core::{AppConfig, Coordinate};

use crate::error::GeocodeError;
use crate::normalize::normalize_address;
use crate::types::{GeocodeHit, NominatimPlace};

const DEFAULT_COUNTRY: &str = "Chile";

/// Client for address lookups.
///
/// Use [`GeocodeClient::from_config`] in the server or
/// [`GeocodeClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
    country: String,
}

impl GeocodeClient {
    /// # Errors
    ///
    /// See [`GeocodeClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GeocodeError> {
        Self::with_base_url(
            &config.geocoder_url,
            config.geocoder_timeout_secs,
            &config.user_agent,
        )
    }

    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|_| GeocodeError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            country: DEFAULT_COUNTRY.to_owned(),
        })
    }

    /// Overrides the country appended to every query. An empty string
    /// disables the suffix.
    #[must_use]
    pub fn with_country(mut self, country: &str) -> Self {
        country.trim().clone_into(&mut self.country);
        self
    }

    /// Looks up `address` and returns the best match, or `None` when the
    /// geocoder knows no such place.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::EmptyAddress`] for a blank address.
    /// - [`GeocodeError::Http`] on network failure or non-2xx status.
    /// - [`GeocodeError::Deserialize`] if the body is not a result array.
    /// - [`GeocodeError::BadCoordinate`] / [`GeocodeError::Coordinate`] for a
    ///   result whose coordinate does not parse or is out of range.
    pub async fn search(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        let query =
            normalize_address(address, &self.country).ok_or(GeocodeError::EmptyAddress)?;
        let url = self.build_url(&query);

        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let Some(place) = places.into_iter().next() else {
            tracing::debug!(query = %query, "geocoder returned no results");
            return Ok(None);
        };
        let hit = parse_place(place)?;
        tracing::debug!(
            query = %query,
            lat = hit.coordinate.lat,
            lng = hit.coordinate.lng,
            "address geocoded"
        );
        Ok(Some(hit))
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", "1");
        url
    }
}

fn parse_place(place: NominatimPlace) -> Result<GeocodeHit, GeocodeError> {
    let bad = || GeocodeError::BadCoordinate {
        lat: place.lat.clone(),
        lon: place.lon.clone(),
    };
    let lat: f64 = place.lat.trim().parse().map_err(|_| bad())?;
    let lng: f64 = place.lon.trim().parse().map_err(|_| bad())?;
    let coordinate = Coordinate::new(lat, lng)?;
    Ok(GeocodeHit {
        coordinate,
        display_name: place.display_name,
    })
}

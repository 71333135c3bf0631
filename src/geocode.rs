//! Forward geocoding via the Mapbox places API.
//!
//! Optional enrichment: when a reporter types a location, we resolve it to
//! coordinates for the persisted report. No token configured means no
//! geocoding — intake never depends on it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeocodeError;

const PLACES_API_BASE: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// A resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Client for Mapbox forward geocoding.
pub struct MapboxGeocoder {
    access_token: SecretString,
    client: reqwest::Client,
}

impl MapboxGeocoder {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// Resolve a place description to coordinates.
    ///
    /// Returns `Ok(None)` when the API finds no feature for the query —
    /// that's a routine outcome for vague locations, not an error.
    pub async fn forward(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = places_url(place);

        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.access_token.expose_secret())])
            .send()
            .await
            .map_err(|e| GeocodeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::ApiStatus(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GeocodeError::MalformedResponse(e.to_string()))?;

        let coords = extract_coordinates(&body)?;
        debug!(place, found = coords.is_some(), "Forward geocode");
        Ok(coords)
    }
}

/// Pull the first feature's coordinates out of a geocoding response.
///
/// Mapbox returns positions as `[longitude, latitude]`.
pub fn extract_coordinates(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(|f| f.as_array())
        .ok_or_else(|| GeocodeError::MalformedResponse("missing features array".into()))?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let coords = first
        .pointer("/geometry/coordinates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| GeocodeError::MalformedResponse("feature has no coordinates".into()))?;

    match (coords.first().and_then(|v| v.as_f64()), coords.get(1).and_then(|v| v.as_f64())) {
        (Some(longitude), Some(latitude)) => Ok(Some(Coordinates {
            latitude,
            longitude,
        })),
        _ => Err(GeocodeError::MalformedResponse(
            "non-numeric coordinates".into(),
        )),
    }
}

/// Places URL for a forward-geocode query. The place goes in the path, so it
/// has to be percent-encoded.
fn places_url(place: &str) -> String {
    format!("{PLACES_API_BASE}/{}.json", urlencoding::encode(place))
}

//! Google Maps API client.
//!
//! Covers the two endpoints the address helper needs:
//!
//! - Distance Matrix: route distance and duration between two points
//! - Geocoding: coordinates and address components for a free-form address
//!
//! # API Reference
//!
//! See: <https://developers.google.com/maps/documentation/distance-matrix>
//! and <https://developers.google.com/maps/documentation/geocoding>

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MappingService, ServiceResponse};
use crate::error::GeoError;
use crate::model::{Coordinates, GeoPoint, LocationComponent, RouteDistance, TextValue};

/// Base URL for the Google Maps web services.
const GOOGLE_MAPS_API_BASE: &str = "https://maps.googleapis.com/maps/api";

/// Status Google reports for a successful request.
const STATUS_OK: &str = "OK";

/// Client for the Google Maps Distance Matrix and Geocoding APIs.
#[derive(Clone)]
pub struct GoogleMapsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Default for GoogleMapsClient {
    fn default() -> Self {
        Self::new("")
    }
}

impl GoogleMapsClient {
    /// Create a new Google Maps client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key. Google rejects keyless requests with `REQUEST_DENIED`.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(GOOGLE_MAPS_API_BASE, api_key)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch `url`, decode the body and reduce it with `convert`.
    ///
    /// Non-2xx answers never reach `convert`; they become an unsuccessful
    /// response carrying the HTTP code.
    async fn fetch<B, U>(
        &self,
        url: &str,
        convert: impl FnOnce(B) -> ServiceResponse<U>,
    ) -> Result<ServiceResponse<U>, GeoError>
    where
        B: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed").to_string();
            return Ok(ServiceResponse::failure(status.as_u16().to_string(), vec![reason]));
        }

        let body = response
            .json::<B>()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;
        Ok(convert(body))
    }
}

impl MappingService for GoogleMapsClient {
    /// Distance and duration of the route between two points.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GoogleMapsClient::new("your-api-key");
    /// let response = client
    ///     .distance(GeoPoint::new(55.7558, 37.6173), GeoPoint::new(59.9343, 30.3351))
    ///     .await?;
    /// ```
    async fn distance(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<ServiceResponse<RouteDistance>, GeoError> {
        let url = format!(
            "{}/distancematrix/json?origins={},{}&destinations={},{}&units=metric&key={}",
            self.base_url,
            from.lat,
            from.lon,
            to.lat,
            to.lon,
            urlencoding::encode(&self.api_key)
        );
        debug!("Google distance matrix request");

        self.fetch(&url, DistanceMatrixResponse::into_service_response)
            .await
    }

    /// Geocode an address, returning the first match.
    async fn geocode(&self, address: &str) -> Result<ServiceResponse<GeocodeResult>, GeoError> {
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );
        debug!("Google geocode request");

        self.fetch(&url, GeocodeResponse::into_service_response)
            .await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the Distance Matrix endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrixResponse {
    /// Top-level status ("OK", "INVALID_REQUEST", "REQUEST_DENIED", ...).
    #[serde(default)]
    pub status: String,

    /// Explanation accompanying a non-OK status.
    #[serde(default)]
    pub error_message: Option<String>,

    /// One row per origin.
    #[serde(default)]
    pub rows: Vec<DistanceMatrixRow>,
}

/// A row of the distance matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrixRow {
    /// One element per destination.
    #[serde(default)]
    pub elements: Vec<DistanceMatrixElement>,
}

/// A single origin/destination pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrixElement {
    /// Element status ("OK", "NOT_FOUND", "ZERO_RESULTS", ...).
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub distance: Option<TextValue>,

    #[serde(default)]
    pub duration: Option<TextValue>,

    /// Remaining attributes (`duration_in_traffic`, `fare`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DistanceMatrixResponse {
    /// Reduce a one-origin, one-destination matrix to its single element.
    ///
    /// A top-level OK with a failed element reports the element status.
    pub fn into_service_response(self) -> ServiceResponse<RouteDistance> {
        let errors: Vec<String> = self.error_message.into_iter().collect();

        if self.status != STATUS_OK {
            return ServiceResponse::failure(self.status, errors);
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next());

        match element {
            Some(DistanceMatrixElement {
                status,
                distance: Some(distance),
                duration: Some(duration),
                extra,
            }) if status == STATUS_OK => ServiceResponse::success(
                status,
                RouteDistance {
                    distance,
                    duration,
                    extra,
                },
            ),
            Some(element) => ServiceResponse::failure(element.status, errors),
            None => ServiceResponse::failure("ZERO_RESULTS", errors),
        }
    }
}

/// Response from the Geocoding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    /// Status ("OK", "ZERO_RESULTS", "REQUEST_DENIED", ...).
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

impl GeocodeResponse {
    /// Keep only the best match.
    pub fn into_service_response(self) -> ServiceResponse<GeocodeResult> {
        let errors: Vec<String> = self.error_message.into_iter().collect();

        if self.status != STATUS_OK {
            return ServiceResponse::failure(self.status, errors);
        }

        match self.results.into_iter().next() {
            Some(result) => ServiceResponse::success(self.status, result),
            None => ServiceResponse::failure("ZERO_RESULTS", errors),
        }
    }
}

/// A single geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,

    /// Address components, most specific first.
    #[serde(default)]
    pub address_components: Vec<LocationComponent>,

    pub geometry: Geometry,
}

impl GeocodeResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.geometry.location.lat,
            lon: self.geometry.location.lng,
        }
    }
}

/// Geometry of a geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// Google's latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

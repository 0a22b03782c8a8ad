//! Upstream services the address helper talks to.
//!
//! # Data Sources
//!
//! - [`kladr`]: KLADR address API - regions, districts, cities and their parent chains
//! - [`gmaps`]: Google Maps - distance matrix and forward geocoding
//!
//! The helper only depends on the [`DivisionLookup`] and [`MappingService`]
//! traits, so either side can be swapped for another implementation.

pub mod gmaps;
pub mod kladr;

pub use gmaps::{GeocodeResult, GoogleMapsClient};
pub use kladr::{ContentType, Division, KladrClient, SearchPayload, SearchRequest};

use crate::error::GeoError;
use crate::model::{GeoPoint, RouteDistance};

/// Outcome of a single upstream call.
///
/// Transport and decoding failures are reported as `Err(GeoError)` by the
/// clients; everything the upstream itself said comes back here.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse<T> {
    /// Whether the upstream considered the request successful.
    pub success: bool,

    /// Upstream status: an HTTP code for KLADR, the API status for Google.
    pub status: String,

    /// Error messages reported by the upstream, if any.
    pub errors: Vec<String>,

    /// The payload. Present only on success.
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn success(status: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status: status.into(),
            errors: Vec::new(),
            data: Some(data),
        }
    }

    pub fn failure(status: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            errors,
            data: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success && self.data.is_some()
    }

    /// Join all error messages with `separator`.
    pub fn errors_concat(&self, separator: &str) -> String {
        self.errors.join(separator)
    }

    /// The payload of a successful response, or the upstream failure.
    pub fn into_result(self) -> Result<T, GeoError> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(GeoError::Upstream {
                message: self.errors.join(", "),
                status: self.status,
            }),
        }
    }

    /// The payload when the call succeeded, `None` otherwise.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

/// The administrative-division lookup service.
pub trait DivisionLookup: Send + Sync {
    /// Run a search against the address classifier.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<ServiceResponse<SearchPayload>, GeoError>> + Send;
}

/// The mapping/geocoding service.
pub trait MappingService: Send + Sync {
    /// Distance attributes of the route between two points.
    fn distance(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> impl Future<Output = Result<ServiceResponse<RouteDistance>, GeoError>> + Send;

    /// Forward-geocode a free-form address.
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<ServiceResponse<GeocodeResult>, GeoError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_concat() {
        let response: ServiceResponse<()> = ServiceResponse::failure(
            "INVALID_REQUEST",
            vec!["origins missing".to_string(), "destinations missing".to_string()],
        );

        assert!(!response.is_successful());
        assert_eq!(
            response.errors_concat(", "),
            "origins missing, destinations missing"
        );
    }

    #[test]
    fn test_into_result_failure_carries_status_and_errors() {
        let response: ServiceResponse<u32> =
            ServiceResponse::failure("OVER_QUERY_LIMIT", vec!["slow down".to_string()]);

        match response.into_result() {
            Err(GeoError::Upstream { status, message }) => {
                assert_eq!(status, "OVER_QUERY_LIMIT");
                assert_eq!(message, "slow down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_into_result_success() {
        let response = ServiceResponse::success("OK", 42u32);
        assert!(response.is_successful());
        assert_eq!(response.into_result().unwrap(), 42);
    }

    #[test]
    fn test_success_flag_without_data_is_failure() {
        let response: ServiceResponse<u32> = ServiceResponse {
            success: true,
            status: "200".to_string(),
            errors: vec![],
            data: None,
        };

        assert!(!response.is_successful());
        assert!(response.into_result().is_err());
    }
}

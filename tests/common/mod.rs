//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Mutex;

use axum::Router;
use tokio::net::TcpListener;

use georesolve::GeoError;
use georesolve::data_sources::{
    Division, DivisionLookup, GeocodeResult, MappingService, SearchPayload, SearchRequest,
    ServiceResponse,
};
use georesolve::model::{GeoPoint, RouteDistance};

type SearchFn = dyn Fn(&SearchRequest) -> ServiceResponse<SearchPayload> + Send + Sync;

/// KLADR stand-in answering every search through a closure.
pub struct ScriptedKladr {
    answer: Box<SearchFn>,
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedKladr {
    pub fn new(
        answer: impl Fn(&SearchRequest) -> ServiceResponse<SearchPayload> + Send + Sync + 'static,
    ) -> Self {
        Self {
            answer: Box::new(answer),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A KLADR that never finds anything.
    pub fn empty() -> Self {
        Self::new(|_| ServiceResponse::success("200", SearchPayload::default()))
    }
}

impl DivisionLookup for ScriptedKladr {
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<ServiceResponse<SearchPayload>, GeoError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.answer)(request))
    }
}

/// Mapping service stand-in with fixed answers.
pub struct FixedMaps {
    pub distance: ServiceResponse<RouteDistance>,
    pub geocode: ServiceResponse<GeocodeResult>,
}

impl Default for FixedMaps {
    fn default() -> Self {
        Self {
            distance: ServiceResponse::failure(
                "REQUEST_DENIED",
                vec!["The provided API key is invalid.".to_string()],
            ),
            geocode: ServiceResponse::failure("ZERO_RESULTS", vec![]),
        }
    }
}

impl MappingService for FixedMaps {
    async fn distance(
        &self,
        _from: GeoPoint,
        _to: GeoPoint,
    ) -> Result<ServiceResponse<RouteDistance>, GeoError> {
        Ok(self.distance.clone())
    }

    async fn geocode(&self, _address: &str) -> Result<ServiceResponse<GeocodeResult>, GeoError> {
        Ok(self.geocode.clone())
    }
}

pub fn division(id: &str, name: &str, type_short: &str, content_type: &str) -> Division {
    Division {
        id: id.to_string(),
        name: name.to_string(),
        type_name: type_short.to_string(),
        type_short: type_short.to_string(),
        content_type: content_type.to_string(),
        ..Default::default()
    }
}

pub fn found(result: Vec<Division>) -> ServiceResponse<SearchPayload> {
    ServiceResponse::success("200", SearchPayload { result })
}

/// Serve `app` on an ephemeral localhost port.
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

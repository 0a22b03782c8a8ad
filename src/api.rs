//! HTTP API handlers for georesolve.
//!
//! Every [`GeoHelper`] operation is exposed as a JSON endpoint:
//!
//! - `GET /health` - Health check
//! - `GET /distance-sql` - SQL distance expression for a point
//! - `GET /address/:code` - Textual address for a KLADR code
//! - `GET /distance` - Route distance between two points
//! - `GET /coordinates` - Coordinates of an address
//! - `GET /regions`, `GET /districts`, `GET /localities` - KLADR name lookups
//! - `GET /cities` - Cities by name with their parent chains
//! - `POST /administrative-address` - Resolve geocoder location components
//!
//! Tokens never appear in logs: handlers record only the query itself.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::data_sources::{Division, DivisionLookup, GoogleMapsClient, KladrClient, MappingService};
use crate::error::GeoError;
use crate::geo::GeoHelper;
use crate::model::{
    AddressComponent, AdministrativeAddress, Coordinates, GeoPoint, LocationComponent,
    RouteDistance,
};

/// Application state shared across handlers.
pub struct AppState<K = KladrClient, M = GoogleMapsClient> {
    pub helper: Arc<GeoHelper<K, M>>,
}

impl<K, M> Clone for AppState<K, M> {
    fn clone(&self) -> Self {
        Self {
            helper: Arc::clone(&self.helper),
        }
    }
}

/// Build the router over a helper.
pub fn router<K, M>(helper: GeoHelper<K, M>) -> Router
where
    K: DivisionLookup + 'static,
    M: MappingService + 'static,
{
    let state = AppState {
        helper: Arc::new(helper),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/distance-sql", get(get_distance_sql::<K, M>))
        .route("/address/:code", get(get_address::<K, M>))
        .route("/distance", get(get_distance::<K, M>))
        .route("/coordinates", get(get_coordinates::<K, M>))
        .route("/regions", get(get_region::<K, M>))
        .route("/districts", get(get_district::<K, M>))
        .route("/localities", get(get_locality::<K, M>))
        .route("/cities", get(get_cities::<K, M>))
        .route(
            "/administrative-address",
            post(post_administrative_address::<K, M>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Map a helper failure onto an HTTP status.
///
/// An unknown code is the caller's problem (404); anything the upstreams did
/// wrong is reported as a bad gateway.
fn error_response(error: GeoError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        GeoError::AddressNotRetrievable { .. } => StatusCode::NOT_FOUND,
        GeoError::Upstream { .. } | GeoError::Transport(_) | GeoError::InvalidResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    warn!(error = %error, status = %status, "Lookup failed");

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

// ============================================================================
// SQL and address endpoints
// ============================================================================

/// Query parameters for GET /distance-sql.
#[derive(Debug, Deserialize)]
pub struct DistanceSqlQuery {
    /// Latitude; a decimal comma is accepted.
    pub lat: String,
    /// Longitude; a decimal comma is accepted.
    pub lon: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceSqlResponse {
    pub expression: String,
}

/// GET /distance-sql - SQL distance expression for a point.
///
/// # Response
///
/// ```json
/// { "expression": "(6371 * 2 * ASIN(...))  as distanceDb" }
/// ```
pub async fn get_distance_sql<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<DistanceSqlQuery>,
) -> Json<DistanceSqlResponse>
where
    K: DivisionLookup,
    M: MappingService,
{
    Json(DistanceSqlResponse {
        expression: state
            .helper
            .resolve_distance_expression(&query.lon, &query.lat),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressResponse {
    pub code: String,
    pub address: String,
}

/// GET /address/:code - Textual address for a KLADR code.
///
/// Returns `404 Not Found` when KLADR cannot resolve the code.
#[instrument(skip(state))]
pub async fn get_address<K, M>(
    State(state): State<AppState<K, M>>,
    Path(code): Path<String>,
) -> ApiResult<AddressResponse>
where
    K: DivisionLookup,
    M: MappingService,
{
    let address = state
        .helper
        .resolve_address_by_code(&code)
        .await
        .map_err(error_response)?;

    info!(code = %code, "Address resolved");
    Ok(Json(AddressResponse { code, address }))
}

// ============================================================================
// Mapping endpoints
// ============================================================================

/// Query parameters for GET /distance.
#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
}

/// GET /distance - Route distance between two points.
///
/// # Response
///
/// ```json
/// {
///     "distance": { "text": "178 km", "value": 178312 },
///     "duration": { "text": "2 hours 41 mins", "value": 9660 }
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_distance<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<DistanceQuery>,
) -> ApiResult<RouteDistance>
where
    K: DivisionLookup,
    M: MappingService,
{
    let from = GeoPoint::new(query.from_lat, query.from_lon);
    let to = GeoPoint::new(query.to_lat, query.to_lon);

    let distance = state
        .helper
        .resolve_distance_between(from, to)
        .await
        .map_err(error_response)?;

    info!(meters = distance.distance.value, "Distance resolved");
    Ok(Json(distance))
}

/// Query parameters for GET /coordinates.
#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub address: String,
}

/// GET /coordinates - Coordinates of an address.
#[instrument(skip(state))]
pub async fn get_coordinates<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<CoordinatesQuery>,
) -> ApiResult<Coordinates>
where
    K: DivisionLookup,
    M: MappingService,
{
    state
        .helper
        .resolve_coordinates_for_address(&query.address)
        .await
        .map(Json)
        .map_err(error_response)
}

// ============================================================================
// KLADR name lookups
// ============================================================================

/// Query parameters for GET /regions.
#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub query: String,
}

/// GET /regions - Region a query belongs to.
///
/// A miss is a `200` with empty `id` and `name`.
#[instrument(skip(state))]
pub async fn get_region<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<RegionQuery>,
) -> ApiResult<AddressComponent>
where
    K: DivisionLookup,
    M: MappingService,
{
    state
        .helper
        .resolve_region_name(&query.query)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Query parameters for GET /districts.
#[derive(Debug, Deserialize)]
pub struct DistrictQuery {
    pub query: String,
    #[serde(default)]
    pub region_id: String,
}

/// GET /districts - District inside a region.
#[instrument(skip(state))]
pub async fn get_district<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<DistrictQuery>,
) -> ApiResult<AddressComponent>
where
    K: DivisionLookup,
    M: MappingService,
{
    state
        .helper
        .resolve_district_name(&query.query, &query.region_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Query parameters for GET /localities.
#[derive(Debug, Deserialize)]
pub struct LocalityQuery {
    pub query: String,
    #[serde(default)]
    pub region_id: String,
    #[serde(default)]
    pub district_id: String,
}

/// GET /localities - Locality inside a region and district.
#[instrument(skip(state))]
pub async fn get_locality<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<LocalityQuery>,
) -> ApiResult<AddressComponent>
where
    K: DivisionLookup,
    M: MappingService,
{
    state
        .helper
        .resolve_locality_name(&query.query, &query.region_id, &query.district_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Query parameters for GET /cities.
#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    pub name: String,
}

/// GET /cities - Cities by name, as KLADR returns them.
#[instrument(skip(state))]
pub async fn get_cities<K, M>(
    State(state): State<AppState<K, M>>,
    Query(query): Query<CitiesQuery>,
) -> ApiResult<Vec<Division>>
where
    K: DivisionLookup,
    M: MappingService,
{
    let cities = state
        .helper
        .resolve_cities_by_name(&query.name)
        .await
        .map_err(error_response)?;

    info!(name = %query.name, count = cities.len(), "Cities queried");
    Ok(Json(cities))
}

/// POST /administrative-address - Resolve geocoder location components.
///
/// # Request Body
///
/// ```json
/// [
///     { "types": ["administrative_area_level_1", "political"], "short_name": "CA" },
///     { "types": ["locality", "political"], "short_name": "Los Angeles" }
/// ]
/// ```
#[instrument(skip(state, components))]
pub async fn post_administrative_address<K, M>(
    State(state): State<AppState<K, M>>,
    Json(components): Json<Vec<LocationComponent>>,
) -> ApiResult<AdministrativeAddress>
where
    K: DivisionLookup,
    M: MappingService,
{
    let address = state
        .helper
        .resolve_administrative_address(&components)
        .await
        .map_err(error_response)?;

    info!(
        components = components.len(),
        region = %address.region.id,
        district = %address.district.id,
        "Administrative address resolved"
    );
    Ok(Json(address))
}

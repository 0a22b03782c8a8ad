//! Integration tests for the upstream clients.
//!
//! A local axum server plays KLADR and Google Maps so the real reqwest
//! clients can be exercised end to end, URL building and decoding included.

mod common;

use std::collections::HashMap;

use axum::{Json, Router, extract::Query, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::{Value, json};

use common::spawn_upstream;
use georesolve::data_sources::{
    ContentType, DivisionLookup, GoogleMapsClient, KladrClient, MappingService, SearchRequest,
};
use georesolve::{
    AddressComponent, AdministrativeAddress, Coordinates, GeoConfig, GeoError, GeoHelper, GeoPoint,
    LocationComponent,
};

const TOKEN: &str = "test-token";

async fn mock_kladr(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("token").map(String::as_str) != Some(TOKEN) {
        return (StatusCode::FORBIDDEN, "Invalid token").into_response();
    }

    let region = json!({
        "id": "6900000000000", "name": "Тверская", "type": "Область",
        "typeShort": "обл", "contentType": "region"
    });

    let body = match (
        params.get("cityId").map(String::as_str),
        params.get("query").map(String::as_str),
        params.get("contentType").map(String::as_str),
    ) {
        (Some("6900000100000"), _, Some("city")) => json!({
            "result": [{
                "id": "6900000100000", "name": "Тверь", "zip": 170000,
                "type": "Город", "typeShort": "г", "contentType": "city",
                "parents": [region]
            }]
        }),
        (_, Some("Тверь"), Some("region")) => json!({
            "searchContext": { "query": "Тверь", "contentType": "region" },
            "result": [{
                "id": "6900000100000", "name": "Тверь", "type": "Город",
                "typeShort": "г", "contentType": "city", "parents": [region]
            }]
        }),
        (_, Some("Тверская"), Some("region")) => json!({
            "result": [{
                "id": "6900000000000", "name": "Тверская", "typeShort": null,
                "contentType": "region", "parents": null
            }]
        }),
        _ => json!({ "searchContext": {}, "result": [] }),
    };

    Json(body).into_response()
}

async fn mock_distance(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("key").map(String::as_str) != Some(TOKEN) {
        return Json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "rows": []
        }));
    }

    Json(json!({
        "status": "OK",
        "origin_addresses": [params.get("origins")],
        "destination_addresses": [params.get("destinations")],
        "rows": [{
            "elements": [{
                "status": "OK",
                "distance": { "text": "178 km", "value": 178312 },
                "duration": { "text": "2 hours 41 mins", "value": 9660 }
            }]
        }]
    }))
}

async fn mock_geocode(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("address").map(String::as_str) {
        Some("Тверь, Россия") => Json(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Tver, Tver Oblast, Russia",
                "address_components": [
                    { "long_name": "Tver", "short_name": "Тверь", "types": ["locality", "political"] },
                    { "long_name": "Tver Oblast", "short_name": "Тверь",
                      "types": ["administrative_area_level_1", "political"] },
                    { "long_name": "Russia", "short_name": "RU", "types": ["country", "political"] }
                ],
                "geometry": { "location": { "lat": 56.8587214, "lng": 35.9175965 } }
            }]
        })),
        _ => Json(json!({ "status": "ZERO_RESULTS", "results": [] })),
    }
}

async fn mock_upstream() -> String {
    let app = Router::new()
        .route("/api.php", get(mock_kladr))
        .route("/maps/api/distancematrix/json", get(mock_distance))
        .route("/maps/api/geocode/json", get(mock_geocode))
        .route(
            "/broken/distancematrix/json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "") }),
        )
        .route("/garbage/geocode/json", get(|| async { "not json" }));

    format!("http://{}", spawn_upstream(app).await)
}

async fn helper(base: &str, token: &str) -> GeoHelper {
    let config = GeoConfig {
        kladr_base_url: Some(format!("{}/api.php", base)),
        google_base_url: Some(format!("{}/maps/api", base)),
        credentials: georesolve::Credentials::new(token, token),
        ..GeoConfig::default()
    };
    GeoHelper::from_config(&config)
}

#[tokio::test]
async fn test_kladr_search_decodes_payload() {
    let base = mock_upstream().await;
    let client = KladrClient::with_base_url(&format!("{}/api.php", base), TOKEN);

    let request = SearchRequest::new()
        .city_id("6900000100000")
        .with_parent()
        .content_type(ContentType::City);
    let response = client.search(&request).await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.status, "200");
    let payload = response.data.unwrap();
    assert_eq!(payload.result[0].parents[0].type_short, "обл");
    assert_eq!(payload.result[0].extra.get("zip"), Some(&json!(170000)));
}

#[tokio::test]
async fn test_kladr_http_error_is_unsuccessful_response() {
    let base = mock_upstream().await;
    let client = KladrClient::with_base_url(&format!("{}/api.php", base), "wrong");

    let response = client.search(&SearchRequest::new().query("Тверь")).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.status, "403");
    assert_eq!(response.errors, vec!["Invalid token".to_string()]);
}

#[tokio::test]
async fn test_google_http_error_is_unsuccessful_response() {
    let base = mock_upstream().await;
    let client = GoogleMapsClient::with_base_url(&format!("{}/broken", base), TOKEN);

    let response = client
        .distance(GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0))
        .await
        .unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.status, "503");
}

#[tokio::test]
async fn test_google_undecodable_body() {
    let base = mock_upstream().await;
    let client = GoogleMapsClient::with_base_url(&format!("{}/garbage", base), TOKEN);

    let err = client.geocode("anything").await.unwrap_err();

    assert!(matches!(err, GeoError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_address_by_code_end_to_end() {
    let base = mock_upstream().await;
    let helper = helper(&base, TOKEN).await;

    let address = helper.resolve_address_by_code("6900000100000").await.unwrap();

    assert_eq!(address, "Тверская Область, Тверь, Город");
}

#[tokio::test]
async fn test_bad_token_fails_only_on_use() {
    let base = mock_upstream().await;
    let helper = helper(&base, "").await;

    let err = helper
        .resolve_address_by_code("6900000100000")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoError::AddressNotRetrievable { ref code } if code == "6900000100000"));

    // a rejected lookup is still just "not found" for name resolution
    assert_eq!(
        helper.resolve_region_name("Тверь").await.unwrap(),
        AddressComponent::empty()
    );
}

#[tokio::test]
async fn test_distance_end_to_end() {
    let base = mock_upstream().await;

    let distance = helper(&base, TOKEN)
        .await
        .resolve_distance_between(GeoPoint::new(55.7558, 37.6173), GeoPoint::new(56.8587, 35.9176))
        .await
        .unwrap();
    assert_eq!(distance.distance.value, 178312);
    assert!((distance.kilometers() - 178.312).abs() < 1e-9);

    let err = helper(&base, "nope")
        .await
        .resolve_distance_between(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "upstream request failed: REQUEST_DENIED: The provided API key is invalid."
    );
}

#[tokio::test]
async fn test_coordinates_end_to_end() {
    let base = mock_upstream().await;
    let helper = helper(&base, TOKEN).await;

    let coords = helper
        .resolve_coordinates_for_address("Тверь, Россия")
        .await
        .unwrap();
    assert_eq!(
        coords,
        Coordinates {
            lat: 56.8587214,
            lon: 35.9175965
        }
    );

    let err = helper
        .resolve_coordinates_for_address("Atlantis")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoError::Upstream { ref status, .. } if status == "ZERO_RESULTS"));
}

#[tokio::test]
async fn test_administrative_address_for_end_to_end() {
    let base = mock_upstream().await;
    let helper = helper(&base, TOKEN).await;

    let address = helper
        .resolve_administrative_address_for("Тверь, Россия")
        .await
        .unwrap();

    assert_eq!(
        address.region,
        AddressComponent::new("6900000000000", "Тверская, обл")
    );
    // the locality lookup ran before a region was known and found nothing
    assert!(address.district.is_empty());
    assert!(address.city.is_empty());

    let direct = helper
        .resolve_administrative_address(&[LocationComponent::new("country", "RU")])
        .await
        .unwrap();
    assert_eq!(direct, AdministrativeAddress::default());
}

#[tokio::test]
async fn test_null_parents_resolve_to_empty_region() {
    let base = mock_upstream().await;
    let helper = helper(&base, TOKEN).await;

    let region = helper.resolve_region_name("Тверская").await.unwrap();

    assert_eq!(region, AddressComponent::empty());
}

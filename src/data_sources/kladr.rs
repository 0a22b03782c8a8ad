//! KLADR address API client.
//!
//! KLADR is the Russian classifier of addresses. Its API resolves regions,
//! districts, cities and streets by name or by classifier code, and can
//! return the full chain of parent entities for every hit.
//!
//! # API Reference
//!
//! See: <https://kladr-api.ru/integration/>

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DivisionLookup, ServiceResponse};
use crate::error::GeoError;

/// Base URL for the KLADR API.
const KLADR_API_BASE: &str = "https://kladr-api.ru/api.php";

/// Client for querying the KLADR address classifier.
#[derive(Clone)]
pub struct KladrClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl Default for KladrClient {
    fn default() -> Self {
        Self::new("")
    }
}

impl KladrClient {
    /// Create a new KLADR client.
    ///
    /// # Arguments
    ///
    /// * `token` - API token. An empty token is sent as-is; KLADR decides whether to honor it.
    pub fn new(token: &str) -> Self {
        Self::with_base_url(KLADR_API_BASE, token)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    fn build_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}?token={}",
            self.base_url,
            urlencoding::encode(&self.token)
        );

        for (key, value) in request.params() {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(&value)));
        }

        url
    }
}

impl DivisionLookup for KladrClient {
    /// Search the classifier.
    ///
    /// Non-2xx answers become an unsuccessful [`ServiceResponse`] carrying the
    /// HTTP code and the response body (or the reason phrase when the body is empty).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = KladrClient::new("your-token");
    /// let request = SearchRequest::new()
    ///     .query("Москва")
    ///     .content_type(ContentType::City)
    ///     .with_parent();
    /// let response = client.search(&request).await?;
    /// ```
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<ServiceResponse<SearchPayload>, GeoError> {
        let url = self.build_url(request);
        debug!(content_type = ?request.content_type, "KLADR search");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match body.trim() {
                "" => status.canonical_reason().unwrap_or("request failed").to_string(),
                text => text.to_string(),
            };
            return Ok(ServiceResponse::failure(status.as_u16().to_string(), vec![message]));
        }

        let payload = response
            .json::<SearchPayload>()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        Ok(ServiceResponse::success(status.as_u16().to_string(), payload))
    }
}

/// KLADR entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Region,
    District,
    City,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Region => "region",
            ContentType::District => "district",
            ContentType::City => "city",
        }
    }
}

/// Parameters of a KLADR search. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub city_id: Option<String>,
    pub region_id: Option<String>,
    pub district_id: Option<String>,
    pub limit: Option<u32>,
    pub content_type: Option<ContentType>,
    /// Include the parent chain of every hit.
    pub with_parent: bool,
    /// Treat `query` as a full one-line address.
    pub one_string: bool,
    pub type_code: Option<u32>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn city_id(mut self, city_id: impl Into<String>) -> Self {
        self.city_id = Some(city_id.into());
        self
    }

    pub fn region_id(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn district_id(mut self, district_id: impl Into<String>) -> Self {
        self.district_id = Some(district_id.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_parent(mut self) -> Self {
        self.with_parent = true;
        self
    }

    pub fn one_string(mut self) -> Self {
        self.one_string = true;
        self
    }

    pub fn type_code(mut self, type_code: u32) -> Self {
        self.type_code = Some(type_code);
        self
    }

    /// Query parameters in KLADR's naming, unencoded.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(query) = &self.query {
            params.push(("query", query.clone()));
        }
        if let Some(city_id) = &self.city_id {
            params.push(("cityId", city_id.clone()));
        }
        if let Some(region_id) = &self.region_id {
            params.push(("regionId", region_id.clone()));
        }
        if let Some(district_id) = &self.district_id {
            params.push(("districtId", district_id.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(content_type) = self.content_type {
            params.push(("contentType", content_type.as_str().to_string()));
        }
        if self.with_parent {
            params.push(("withParent", "1".to_string()));
        }
        if self.one_string {
            params.push(("oneString", "1".to_string()));
        }
        if let Some(type_code) = self.type_code {
            params.push(("typeCode", type_code.to_string()));
        }

        params
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Body of a successful KLADR search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    /// Matching entities. Missing or null in the body means no matches.
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<Division>,
}

/// A KLADR entity: region, district, city, street or building.
///
/// KLADR sends `null` for absent attributes; those decode as empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Division {
    /// Classifier code, e.g. "7700000000000".
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Full type name, e.g. "Город".
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub type_name: String,

    /// Abbreviated type, e.g. "г".
    #[serde(default, rename = "typeShort", deserialize_with = "null_as_default")]
    pub type_short: String,

    /// Entity kind as KLADR spells it ("region", "district", "city", ...).
    #[serde(default, rename = "contentType", deserialize_with = "null_as_default")]
    pub content_type: String,

    /// Parent chain, outermost first. Only filled when `withParent` was requested.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parents: Vec<Division>,

    /// Everything else KLADR returned (zip, okato, guid, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Division {
    /// Whether this entity is of the given kind.
    pub fn is(&self, content_type: ContentType) -> bool {
        self.content_type == content_type.as_str()
    }

    /// Whether KLADR identified this entity. Hits without an id are ignored.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

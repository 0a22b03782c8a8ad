//! The address resolution helper.
//!
//! [`GeoHelper`] sits in front of the KLADR address API and Google Maps. It
//! turns caller-level questions ("what is the address for this code", "how far
//! apart are these points") into upstream requests and reshapes the answers
//! into plain values.
//!
//! # Usage
//!
//! ```ignore
//! let helper = GeoHelper::new(&Credentials::new("kladr-token", "google-key"));
//! let address = helper.resolve_address_by_code("7700000000000").await?;
//! ```
//!
//! Lookups that find nothing are not errors: the region/district/locality
//! resolvers return [`AddressComponent::empty`] in that case.

use tracing::{debug, instrument, warn};

use crate::config::GeoConfig;
use crate::data_sources::{
    ContentType, Division, DivisionLookup, GoogleMapsClient, KladrClient, MappingService,
    SearchPayload, SearchRequest, ServiceResponse,
};
use crate::error::GeoError;
use crate::model::{
    ADMINISTRATIVE_AREA_LEVEL_1, ADMINISTRATIVE_AREA_LEVEL_2, AddressComponent,
    AdministrativeAddress, Coordinates, Credentials, GeoPoint, LOCALITY, LocalityPlacement,
    LocationComponent, RouteDistance,
};
use crate::sql;

/// KLADR type code for cities proper (as opposed to settlements and villages).
const CITY_TYPE_CODE: u32 = 1;

/// Facade over the administrative-division and mapping services.
///
/// Both clients are built up front and owned by the helper, so a helper can
/// be shared freely once constructed.
#[derive(Clone)]
pub struct GeoHelper<K = KladrClient, M = GoogleMapsClient> {
    kladr: K,
    maps: M,
    locality_placement: LocalityPlacement,
}

impl GeoHelper {
    /// Create a helper talking to the public KLADR and Google Maps APIs.
    ///
    /// Never fails: missing tokens are sent as empty strings, and any
    /// resulting rejection surfaces only when a lookup is made.
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_clients(
            KladrClient::new(credentials.primary_token()),
            GoogleMapsClient::new(credentials.secondary_token()),
        )
    }

    /// Create a helper from configuration, honoring base URL overrides.
    pub fn from_config(config: &GeoConfig) -> Self {
        let credentials = &config.credentials;

        let kladr = match &config.kladr_base_url {
            Some(url) => KladrClient::with_base_url(url, credentials.primary_token()),
            None => KladrClient::new(credentials.primary_token()),
        };
        let maps = match &config.google_base_url {
            Some(url) => GoogleMapsClient::with_base_url(url, credentials.secondary_token()),
            None => GoogleMapsClient::new(credentials.secondary_token()),
        };

        Self::with_clients(kladr, maps).with_locality_placement(config.locality_placement)
    }
}

impl<K, M> GeoHelper<K, M>
where
    K: DivisionLookup,
    M: MappingService,
{
    /// Assemble a helper from any pair of upstream implementations.
    pub fn with_clients(kladr: K, maps: M) -> Self {
        Self {
            kladr,
            maps,
            locality_placement: LocalityPlacement::default(),
        }
    }

    /// Choose where [`resolve_administrative_address`](Self::resolve_administrative_address)
    /// writes a resolved locality.
    pub fn with_locality_placement(mut self, placement: LocalityPlacement) -> Self {
        self.locality_placement = placement;
        self
    }

    pub fn locality_placement(&self) -> LocalityPlacement {
        self.locality_placement
    }

    /// SQL expression for the distance in kilometers from a row to (`lat`, `lon`).
    ///
    /// See [`sql::distance_expression`].
    pub fn resolve_distance_expression(&self, lon: &str, lat: &str) -> String {
        sql::distance_expression(lon, lat)
    }

    /// Full textual address for a KLADR code.
    ///
    /// Parents come first, outermost to innermost, each as `"<name> <type>, "`,
    /// followed by the entity itself as `"<name>, <type>"`.
    #[instrument(skip(self))]
    pub async fn resolve_address_by_code(&self, code: &str) -> Result<String, GeoError> {
        let request = SearchRequest::new()
            .city_id(code)
            .with_parent()
            .content_type(ContentType::City);

        let response = self.kladr.search(&request).await?;
        let status = response.status.clone();

        let Some(entity) = first_result(response) else {
            warn!(code, status = %status, "KLADR could not resolve code");
            return Err(GeoError::AddressNotRetrievable {
                code: code.to_string(),
            });
        };

        let mut address: String = entity
            .parents
            .iter()
            .map(|parent| format!("{} {}, ", parent.name, parent.type_name))
            .collect();
        address.push_str(&format!("{}, {}", entity.name, entity.type_name));

        Ok(address)
    }

    /// Distance attributes between two points, exactly as the mapping service reports them.
    #[instrument(skip(self))]
    pub async fn resolve_distance_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<RouteDistance, GeoError> {
        let response = self.maps.distance(from, to).await?;
        upstream_result(response)
    }

    /// Coordinates of a free-form address.
    #[instrument(skip(self))]
    pub async fn resolve_coordinates_for_address(
        &self,
        address: &str,
    ) -> Result<Coordinates, GeoError> {
        let response = self.maps.geocode(address).await?;
        Ok(upstream_result(response)?.coordinates())
    }

    /// Region that the best KLADR match for `query` belongs to.
    ///
    /// Takes the first parent of the first hit; empty when there is none or
    /// when it carries no id.
    #[instrument(skip(self))]
    pub async fn resolve_region_name(&self, query: &str) -> Result<AddressComponent, GeoError> {
        let request = SearchRequest::new()
            .query(query)
            .limit(1)
            .content_type(ContentType::Region)
            .one_string()
            .with_parent();

        let response = self.kladr.search(&request).await?;

        Ok(first_result(response)
            .and_then(|hit| hit.parents.into_iter().next())
            .filter(Division::has_id)
            .map(|region| short_component(&region))
            .unwrap_or_default())
    }

    /// District matching `query` inside a region.
    ///
    /// Accepted only when the first hit has an id and its second parent is an
    /// identified district; empty otherwise.
    #[instrument(skip(self))]
    pub async fn resolve_district_name(
        &self,
        query: &str,
        region_id: &str,
    ) -> Result<AddressComponent, GeoError> {
        let request = SearchRequest::new()
            .query(query)
            .limit(1)
            .content_type(ContentType::District)
            .one_string()
            .with_parent()
            .region_id(region_id);

        let response = self.kladr.search(&request).await?;

        Ok(first_result(response)
            .filter(Division::has_id)
            .and_then(|hit| hit.parents.into_iter().nth(1))
            .filter(|parent| parent.has_id() && parent.is(ContentType::District))
            .map(|district| short_component(&district))
            .unwrap_or_default())
    }

    /// Locality matching `query` inside a region and district.
    ///
    /// Returns the hit itself, but only when it has an id and its second
    /// parent is a district.
    #[instrument(skip(self))]
    pub async fn resolve_locality_name(
        &self,
        query: &str,
        region_id: &str,
        district_id: &str,
    ) -> Result<AddressComponent, GeoError> {
        let request = SearchRequest::new()
            .query(query)
            .limit(1)
            .content_type(ContentType::City)
            .with_parent()
            .district_id(district_id)
            .region_id(region_id);

        let response = self.kladr.search(&request).await?;

        Ok(first_result(response)
            .filter(|hit| {
                hit.has_id()
                    && hit
                        .parents
                        .get(1)
                        .is_some_and(|parent| parent.is(ContentType::District))
            })
            .map(|locality| short_component(&locality))
            .unwrap_or_default())
    }

    /// Cities named `name`, with their parent chains, as KLADR returns them.
    ///
    /// Empty when KLADR found nothing or reported a failure.
    #[instrument(skip(self))]
    pub async fn resolve_cities_by_name(&self, name: &str) -> Result<Vec<Division>, GeoError> {
        let request = SearchRequest::new()
            .query(name)
            .content_type(ContentType::City)
            .type_code(CITY_TYPE_CODE)
            .with_parent();

        let response = self.kladr.search(&request).await?;

        Ok(response
            .into_data()
            .map(|payload| payload.result)
            .unwrap_or_default())
    }

    /// Resolve geocoder location components into KLADR region, district and city.
    ///
    /// Components are processed in order. Regions feed the district lookup,
    /// regions and districts feed the locality lookup. Unknown component types
    /// are skipped. With the default [`LocalityPlacement::District`] a locality
    /// overwrites the district slot and `city` stays empty.
    #[instrument(skip(self, components), fields(count = components.len()))]
    pub async fn resolve_administrative_address(
        &self,
        components: &[LocationComponent],
    ) -> Result<AdministrativeAddress, GeoError> {
        let mut address = AdministrativeAddress::default();

        for component in components {
            match component.kind() {
                Some(ADMINISTRATIVE_AREA_LEVEL_1) => {
                    address.region = self.resolve_region_name(&component.short_name).await?;
                }
                Some(ADMINISTRATIVE_AREA_LEVEL_2) => {
                    address.district = self
                        .resolve_district_name(&component.short_name, &address.region.id)
                        .await?;
                }
                Some(LOCALITY) => {
                    let locality = self
                        .resolve_locality_name(
                            &component.short_name,
                            &address.region.id,
                            &address.district.id,
                        )
                        .await?;
                    match self.locality_placement {
                        LocalityPlacement::District => address.district = locality,
                        LocalityPlacement::City => address.city = locality,
                    }
                }
                other => debug!(kind = ?other, "Skipping location component"),
            }
        }

        Ok(address)
    }

    /// Geocode `address` and resolve its components into KLADR terms.
    #[instrument(skip(self))]
    pub async fn resolve_administrative_address_for(
        &self,
        address: &str,
    ) -> Result<AdministrativeAddress, GeoError> {
        let response = self.maps.geocode(address).await?;
        let result = upstream_result(response)?;
        self.resolve_administrative_address(&result.address_components)
            .await
    }
}

/// First hit of a successful search.
fn first_result(response: ServiceResponse<SearchPayload>) -> Option<Division> {
    response
        .into_data()
        .and_then(|payload| payload.result.into_iter().next())
}

/// `{id, "name, typeShort"}` of a KLADR entity.
fn short_component(division: &Division) -> AddressComponent {
    AddressComponent::new(
        division.id.clone(),
        format!("{}, {}", division.name, division.type_short),
    )
}

fn upstream_result<T>(response: ServiceResponse<T>) -> Result<T, GeoError> {
    if !response.is_successful() {
        warn!(
            status = %response.status,
            errors = %response.errors_concat(", "),
            "Mapping service request failed"
        );
    }
    response.into_result()
}

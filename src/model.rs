//! Data models for georesolve.
//!
//! These are short-lived values: credentials handed to the helper once,
//! points and addresses supplied by callers, and the reshaped results the
//! helper hands back. Nothing here is persisted.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Location component type for first-level administrative areas (regions).
pub const ADMINISTRATIVE_AREA_LEVEL_1: &str = "administrative_area_level_1";

/// Location component type for second-level administrative areas (districts).
pub const ADMINISTRATIVE_AREA_LEVEL_2: &str = "administrative_area_level_2";

/// Location component type for cities and towns.
pub const LOCALITY: &str = "locality";

/// Tokens for the two upstream services.
///
/// Both tokens are optional. A missing token is sent as an empty string, so a
/// misconfigured helper only fails once an upstream actually rejects a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Token for the KLADR address API.
    #[serde(default)]
    pub primary: Option<String>,

    /// API key for Google Maps.
    #[serde(default)]
    pub secondary: Option<String>,
}

impl Credentials {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: Some(primary.into()),
            secondary: Some(secondary.into()),
        }
    }

    /// Build credentials from a string map.
    ///
    /// Recognises `primary` and `secondary`, and the service names `kladr`
    /// and `google` as aliases. Unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            primary: first_present(map, &["primary", "kladr"]),
            secondary: first_present(map, &["secondary", "google"]),
        }
    }

    /// The KLADR token, or `""` when absent.
    pub fn primary_token(&self) -> &str {
        self.primary.as_deref().unwrap_or("")
    }

    /// The Google Maps key, or `""` when absent.
    pub fn secondary_token(&self) -> &str {
        self.secondary.as_deref().unwrap_or("")
    }
}

fn first_present(map: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key)).cloned()
}

/// A latitude/longitude pair in decimal degrees.
///
/// No range validation is performed; the mapping service decides what it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Coordinates returned by forward geocoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// An `{id, name}` pair naming a region, district or city.
///
/// Empty id and name mean "not found". This is a normal result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub id: String,
    pub name: String,
}

impl AddressComponent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The "not found" component.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

/// Region, district and city resolved from a geocoder's location components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeAddress {
    pub region: AddressComponent,
    pub district: AddressComponent,
    pub city: AddressComponent,
}

/// One entry of a geocoding result's `address_components`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationComponent {
    /// Component types, most specific first (e.g. `["locality", "political"]`).
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub short_name: String,

    #[serde(default)]
    pub long_name: String,
}

impl LocationComponent {
    pub fn new(kind: &str, short_name: &str) -> Self {
        Self {
            types: vec![kind.to_string()],
            short_name: short_name.to_string(),
            long_name: short_name.to_string(),
        }
    }

    /// The primary type of this component. Only this one drives resolution.
    pub fn kind(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }
}

/// A `{text, value}` measurement as the Distance Matrix API reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    /// Human-readable form, e.g. "12.3 km".
    #[serde(default)]
    pub text: String,

    /// Meters for distances, seconds for durations.
    #[serde(default)]
    pub value: i64,
}

/// Distance attributes between two points, passed through from the mapping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDistance {
    pub distance: TextValue,
    pub duration: TextValue,

    /// Any other element attributes (`duration_in_traffic`, `fare`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RouteDistance {
    pub fn new(distance: TextValue, duration: TextValue) -> Self {
        Self {
            distance,
            duration,
            extra: serde_json::Map::new(),
        }
    }

    /// Route length in kilometers.
    pub fn kilometers(&self) -> f64 {
        self.distance.value as f64 / 1000.0
    }
}

/// Where a resolved locality is written when folding location components.
///
/// The established behavior writes the locality over the district slot and
/// leaves `city` empty. `City` fills the city slot instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalityPlacement {
    #[default]
    District,
    City,
}

impl fmt::Display for LocalityPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::District => write!(f, "district"),
            Self::City => write!(f, "city"),
        }
    }
}

impl FromStr for LocalityPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "district" => Ok(Self::District),
            "city" => Ok(Self::City),
            other => Err(format!("unknown locality placement '{}'", other)),
        }
    }
}

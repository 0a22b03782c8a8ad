//! Helper configuration.
//!
//! The library never reads the environment on its own; [`GeoConfig::from_env`]
//! exists for the binary and for embedders that want the same variables.

use tracing::warn;

use crate::model::{Credentials, LocalityPlacement};

/// Environment variable holding the KLADR token.
pub const ENV_KLADR_TOKEN: &str = "GEORESOLVE_KLADR_TOKEN";
/// Environment variable holding the Google Maps API key.
pub const ENV_GOOGLE_TOKEN: &str = "GEORESOLVE_GOOGLE_TOKEN";
/// Environment variable overriding the KLADR endpoint.
pub const ENV_KLADR_URL: &str = "GEORESOLVE_KLADR_URL";
/// Environment variable overriding the Google Maps base URL.
pub const ENV_GOOGLE_URL: &str = "GEORESOLVE_GOOGLE_URL";
/// Environment variable selecting where localities are written (`district` or `city`).
pub const ENV_LOCALITY_PLACEMENT: &str = "GEORESOLVE_LOCALITY_PLACEMENT";

/// Configuration for [`GeoHelper`](crate::geo::GeoHelper).
#[derive(Debug, Clone, Default)]
pub struct GeoConfig {
    /// Upstream tokens.
    pub credentials: Credentials,

    /// KLADR endpoint; the public API when `None`.
    pub kladr_base_url: Option<String>,

    /// Google Maps base URL; the public API when `None`.
    pub google_base_url: Option<String>,

    /// Where a resolved locality lands in an administrative address.
    pub locality_placement: LocalityPlacement,
}

impl GeoConfig {
    /// Load configuration from `GEORESOLVE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset. An unrecognised locality placement is
    /// logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let locality_placement = match get(ENV_LOCALITY_PLACEMENT) {
            Some(value) => value.parse::<LocalityPlacement>().unwrap_or_else(|e: String| {
                warn!(error = %e, "Ignoring {}", ENV_LOCALITY_PLACEMENT);
                LocalityPlacement::default()
            }),
            None => LocalityPlacement::default(),
        };

        Self {
            credentials: Credentials {
                primary: get(ENV_KLADR_TOKEN),
                secondary: get(ENV_GOOGLE_TOKEN),
            },
            kladr_base_url: get(ENV_KLADR_URL),
            google_base_url: get(ENV_GOOGLE_URL),
            locality_placement,
        }
    }
}

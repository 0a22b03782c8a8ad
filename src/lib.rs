//! Georesolve - address resolution over the KLADR address API and Google Maps.
//!
//! # Overview
//!
//! Georesolve is a thin helper that composes two third-party services:
//!
//! - the KLADR address classifier, which knows Russian regions, districts and
//!   cities and their parent chains, and
//! - Google Maps, which geocodes addresses and measures routes.
//!
//! It answers questions such as "what is the textual address for this
//! classifier code" or "how far apart are these two points", and it builds
//! the SQL expression used to sort database rows by great-circle distance.
//!
//! Nothing is cached or retried; every call is one request to one upstream.
//!
//! # Modules
//!
//! - [`geo`]: The [`GeoHelper`] facade
//! - [`data_sources`]: Upstream clients and the traits the facade depends on
//! - [`model`]: Credentials, points and the reshaped lookup results
//! - [`sql`]: The distance expression builder
//! - [`config`]: Configuration, optionally read from the environment
//! - [`error`]: Error types
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod geo;
pub mod model;
pub mod sql;

pub use config::GeoConfig;
pub use error::GeoError;
pub use geo::GeoHelper;
pub use model::{
    AddressComponent, AdministrativeAddress, Coordinates, Credentials, GeoPoint,
    LocalityPlacement, LocationComponent, RouteDistance,
};

//! Error types for address resolution.
//!
//! "Not found" is deliberately absent here: lookups that find nothing return
//! an empty [`AddressComponent`](crate::model::AddressComponent) instead.

use thiserror::Error;

/// Failures surfaced by [`GeoHelper`](crate::geo::GeoHelper) and the upstream clients.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The address API could not resolve the given administrative code.
    #[error("address not retrievable for code {code}")]
    AddressNotRetrievable { code: String },

    /// An upstream service answered, but reported the request as failed.
    #[error("upstream request failed: {status}: {message}")]
    Upstream { status: String, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a body we could not decode.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

//! SQL expression for great-circle distance.
//!
//! The expression is evaluated by the database, not here. It assumes the
//! queried table has `lat` and `lon` columns in decimal degrees and yields the
//! distance in kilometers as column `distanceDb`.

/// Mean Earth radius in kilometers used by the expression.
pub const EARTH_RADIUS_KM: u32 = 6371;

/// Build the haversine distance expression from a table row to (`lat`, `lon`).
///
/// Values are substituted verbatim apart from a decimal comma becoming a
/// decimal point. Nothing is validated or escaped: callers must pass numbers.
///
/// # Example
///
/// ```
/// let expr = georesolve::sql::distance_expression("37,6173", "55,7558");
/// assert!(expr.contains("ABS(55.7558)"));
/// assert!(expr.ends_with("as distanceDb"));
/// ```
pub fn distance_expression(lon: &str, lat: &str) -> String {
    let lat = lat.replace(',', ".");
    let lon = lon.replace(',', ".");

    format!(
        "({EARTH_RADIUS_KM} * 2 * ASIN(SQRT(POWER(SIN((lat - ABS({lat})) * PI()/180 / 2), 2) \
         + COS(lat * PI()/180) * COS(ABS({lat}) * PI()/180) \
         * POWER(SIN((lon - {lon}) * PI()/180 / 2), 2))))  as distanceDb"
    )
}

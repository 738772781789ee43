//! Parser — turns a raw USGS GeoJSON body into [`Quake`](crate::Quake) records.
//!
//! Parsing never fails the caller. A body that is not JSON, not an object, or
//! has no `features` array yields an empty vector: a malformed feed means "no
//! data this cycle", not an outage.
//!
//! Each feature is read field by field. A missing, null or wrongly typed
//! field leaves the record's default in place. The minimum-magnitude
//! admission filter is applied here, at parse time.

use crate::Quake;
use serde_json::Value;
use std::cmp::Ordering;

/// Parse `body` and keep only records with `magnitude >= min_magnitude`.
///
/// Output order matches the order of the features in the document.
pub fn parse(body: &[u8], min_magnitude: f64) -> Vec<Quake> {
    let document: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, len = body.len(), "feed body is not valid JSON");
            return Vec::new();
        }
    };

    let Some(features) = document.get("features").and_then(Value::as_array) else {
        tracing::debug!("feed document has no features array");
        return Vec::new();
    };

    features
        .iter()
        .map(quake_from_feature)
        .filter(|quake| quake.magnitude >= min_magnitude)
        .collect()
}

/// Order records by descending magnitude. The sort is stable, so records of
/// equal magnitude keep their relative order.
pub fn sort_by_magnitude(quakes: &mut [Quake]) {
    quakes.sort_by(|a, b| descending(a.magnitude, b.magnitude));
}

// Numeric comparison: `-0.0` and `0.0` are equal magnitudes and must tie.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn quake_from_feature(feature: &Value) -> Quake {
    let mut quake = Quake::default();

    if let Some(id) = feature.get("id").and_then(Value::as_str) {
        quake.id = id.to_string();
    }

    if let Some(props) = feature.get("properties") {
        if let Some(mag) = props.get("mag").and_then(Value::as_f64) {
            quake.magnitude = mag;
        }
        if let Some(place) = props.get("place").and_then(Value::as_str) {
            quake.place = place.to_string();
        }
        if let Some(time) = props.get("time").and_then(as_millis) {
            quake.time_ms = time;
        }
    }

    if let Some(coords) = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array)
    {
        // [lon, lat, depth]; shorter arrays leave all three at 0.0.
        if let [lon, lat, depth, ..] = coords.as_slice() {
            if let Some(v) = lon.as_f64() {
                quake.longitude = v;
            }
            if let Some(v) = lat.as_f64() {
                quake.latitude = v;
            }
            if let Some(v) = depth.as_f64() {
                quake.depth_km = v;
            }
        }
    }

    quake
}

fn as_millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

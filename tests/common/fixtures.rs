//! Static feed bodies used across harnesses.
//!
//! Shapes follow the USGS GeoJSON summary feed: a `FeatureCollection` whose
//! `features` carry `id`, `properties.{mag,place,time}` and
//! `geometry.coordinates = [lon, lat, depth]`.

/// Three well-formed events, deliberately not in magnitude order.
pub const FEED_THREE: &str = r#"{
  "type": "FeatureCollection",
  "metadata": { "generated": 1700000600000, "title": "USGS All Earthquakes, Past Day", "count": 3 },
  "features": [
    {
      "type": "Feature",
      "id": "nc75012345",
      "properties": { "mag": 1.42, "place": "7km NW of The Geysers, CA", "time": 1700000100000, "type": "earthquake" },
      "geometry": { "type": "Point", "coordinates": [-122.8215, 38.8201, 2.41] }
    },
    {
      "type": "Feature",
      "id": "us7000l9ab",
      "properties": { "mag": 5.6, "place": "south of the Fiji Islands", "time": 1700000200000, "type": "earthquake" },
      "geometry": { "type": "Point", "coordinates": [-178.1234, -25.4321, 560.0] }
    },
    {
      "type": "Feature",
      "id": "ak023abcde",
      "properties": { "mag": 2.9, "place": "42 km SW of Cantwell, Alaska", "time": 1700000300000, "type": "earthquake" },
      "geometry": { "type": "Point", "coordinates": [-149.5, 63.1, 95.3] }
    }
  ]
}"#;

/// A single event with a different id, used to detect snapshot replacement.
pub const FEED_ONE: &str = r#"{"features":[{"id":"hv73600000","properties":{"mag":3.1,"place":"5 km S of Volcano, Hawaii","time":1700000400000},"geometry":{"coordinates":[-155.23,19.38,1.2]}}]}"#;

/// Valid JSON with no `features` array.
pub const FEED_NO_FEATURES: &str = r#"{"type":"FeatureCollection","metadata":{"count":0}}"#;

/// Generate a feed with `n` events whose magnitudes cycle through 0.0–9.9.
pub fn feed_with(n: usize) -> String {
    let features: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("ev{i:05}"),
                "properties": {
                    "mag": (i % 100) as f64 / 10.0,
                    "place": format!("{i} km N of Somewhere"),
                    "time": 1_700_000_000_000i64 + i as i64,
                },
                "geometry": { "coordinates": [i as f64 / 100.0, -(i as f64) / 100.0, 10.0] }
            })
        })
        .collect();
    serde_json::json!({ "features": features }).to_string()
}

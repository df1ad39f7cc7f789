//! Lookups over the vehicle status document.
//!
//! The status endpoint returns `vehicleStatus` either as a flat list of
//! `{key, value}` pairs or, on newer vehicles, as an object holding
//! `coreStatus` and `evStatus` lists of the same shape.

use serde_json::Value;

const NESTED_GROUPS: [&str; 2] = ["coreStatus", "evStatus"];

/// Iterates over every `(key, value)` pair of a status document.
pub fn status_entries(status: &Value) -> impl Iterator<Item = (&str, &Value)> {
    let vehicle_status = status.get("vehicleStatus");

    let lists: Vec<&Vec<Value>> = match vehicle_status {
        Some(Value::Array(list)) => vec![list],
        Some(Value::Object(groups)) => NESTED_GROUPS
            .iter()
            .filter_map(|group| groups.get(*group).and_then(Value::as_array))
            .collect(),
        _ => Vec::new(),
    };

    lists.into_iter().flatten().filter_map(|entry| {
        let key = entry.get("key")?.as_str()?;
        let value = entry.get("value")?;
        Some((key, value))
    })
}

/// Returns the value reported for `key`, if present.
///
/// # Example
///
/// ```rust
/// use jlr_incontrol::vehicle::status_value;
/// use serde_json::json;
///
/// let status = json!({"vehicleStatus": {
///     "coreStatus": [{"key": "DOOR_IS_ALL_DOORS_LOCKED", "value": "TRUE"}],
///     "evStatus": [{"key": "EV_STATE_OF_CHARGE", "value": "80"}]
/// }});
///
/// assert_eq!(status_value(&status, "EV_STATE_OF_CHARGE"), Some(&json!("80")));
/// assert_eq!(status_value(&status, "MISSING"), None);
/// ```
#[must_use]
pub fn status_value<'a>(status: &'a Value, key: &str) -> Option<&'a Value> {
    status_entries(status).find(|(k, _)| *k == key).map(|(_, v)| v)
}

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Pretty JSON of a program, statement or expression.
///
/// Serializing what [`from_json`] returned gives back the same text.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Read a tree from JSON. The result is unbound.
pub fn from_json<T: DeserializeOwned>(json: &str) -> crate::Result<T> {
    Ok(serde_json::from_str(json)?)
}

//! Field-name fallbacks for backend payloads.
//!
//! Older bookings carry the same datum under different keys. Each list below is
//! evaluated in order and the first non-empty value wins. Dotted names walk into
//! nested objects (`user.name`).

use serde::de::{Deserialize, Deserializer, Error};
use serde_json::{Map, Value};

pub const TRAVELER_NAME: &[&str] = &["fullName", "full_name", "name"];

pub const TRAVELER_PHONE: &[&str] = &["phone", "phoneNumber", "mobile"];

pub const TRAVELER_EMERGENCY_CONTACT: &[&str] = &[
    "emergencyContact",
    "emergency_contact",
    "emergencyPhone",
    "phoneEmergency",
];

pub const CUSTOMER_NAME: &[&str] = &["customerName", "userName", "user.name", "contactName"];

pub const CUSTOMER_EMAIL: &[&str] = &["customerEmail", "email", "user.email", "contactEmail"];

/// Keys tried when an emergency contact is given as an object instead of a string.
const CONTACT_OBJECT_KEYS: &[&str] = &["phone", "name"];

/// Keys holding the id of a populated (embedded) referenced document.
pub const REFERENCE_ID: &[&str] = &["_id", "id"];

/// Returns the first non-empty textual value found under `fields`.
pub fn first_text(object: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| lookup(object, field))
        .find_map(text_of)
}

/// Id of a referenced document, sent either as the bare id or as the whole
/// populated document.
pub fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(inner) => first_text(inner, REFERENCE_ID),
        other => text_of(other),
    }
}

/// `deserialize_with` helper for required reference fields
pub fn deserialize_reference<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    reference_id(&value).ok_or_else(|| D::Error::custom(format!("expected an id, got {}", value)))
}

/// `deserialize_with` helper for optional reference fields; null and blank become `None`
pub fn deserialize_optional_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(reference_id))
}

fn lookup<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = object.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(inner) if !inner.is_empty() => first_text(inner, CONTACT_OBJECT_KEYS)
            .or_else(|| Some(Value::Object(inner.clone()).to_string())),
        _ => None,
    }
}

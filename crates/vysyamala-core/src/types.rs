//! Core data types shared across the dashboards

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role id of the privileged super-admin role
pub const PRIVILEGED_ROLE_ID: &str = "7";

/// Identity of the operator using the dashboards
///
/// Constructed once by the caller and handed to every controller, so no
/// dashboard reads identity from ambient storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    id: String,
    role_id: String,
}

impl CurrentUser {
    /// Create a new identity context
    #[must_use]
    pub fn new(id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            role_id: role_id.into().trim().to_string(),
        }
    }

    /// Operator id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Role id
    #[must_use]
    pub fn role_id(&self) -> &str {
        &self.role_id
    }

    /// Privileged operators may view any owner's records
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role_id == PRIVILEGED_ROLE_ID
    }

    /// Owner filter value a freshly reset dashboard starts with
    #[must_use]
    pub fn default_owner(&self) -> String {
        if self.is_privileged() {
            String::new()
        } else {
            self.id.clone()
        }
    }

    /// Owner id actually sent to the API
    ///
    /// Non-privileged operators are always scoped to their own records,
    /// whatever the owner field says.
    #[must_use]
    pub fn owner_scope<'a>(&'a self, selected: &'a str) -> &'a str {
        if self.is_privileged() { selected } else { &self.id }
    }
}

/// Aggregate count as reported by the API
///
/// Deserializes leniently: integers, floats, numeric strings and `null`
/// are all accepted, anything unparseable counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Count(pub u64);

impl Count {
    /// Raw value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = Count;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a count as number, numeric string or null")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Count, E> {
        Ok(Count(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Count, E> {
        Ok(Count(u64::try_from(v).unwrap_or(0)))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Count, E> {
        if v.is_finite() && v >= 0.0 {
            Ok(Count(v.trunc() as u64))
        } else {
            Ok(Count(0))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Count, E> {
        Ok(Count(v.trim().parse().unwrap_or(0)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Count, E> {
        Ok(Count(0))
    }

    fn visit_none<E: de::Error>(self) -> Result<Count, E> {
        Ok(Count(0))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Count, D::Error> {
        deserializer.deserialize_any(Self)
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CountVisitor)
    }
}

/// Deserialize an identifier that the API sends either as a string or a number
///
/// `null` and missing values become an empty string.
///
/// # Errors
///
/// Returns an error for values that are neither strings, numbers nor null.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Deserialize an optional free-text field that may also arrive as a number
///
/// # Errors
///
/// Returns an error for values that are neither strings, numbers nor null.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = string_or_number(deserializer)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "optional_text")]
        note: Option<String>,
        #[serde(default)]
        count: Count,
    }

    #[test]
    fn test_privileged_user_scopes() {
        let admin = CurrentUser::new("1", "7");
        assert!(admin.is_privileged());
        assert_eq!(admin.default_owner(), "");
        assert_eq!(admin.owner_scope("15"), "15");
        assert_eq!(admin.owner_scope(""), "");
    }

    #[test]
    fn test_staff_user_is_always_scoped_to_self() {
        let staff = CurrentUser::new(" 23 ", "3");
        assert!(!staff.is_privileged());
        assert_eq!(staff.id(), "23");
        assert_eq!(staff.default_owner(), "23");
        assert_eq!(staff.owner_scope("15"), "23");
        assert_eq!(staff.owner_scope(""), "23");
    }

    #[test]
    fn test_count_accepts_loose_numbers() {
        let cases = [
            (r#"{"count": 5}"#, 5),
            (r#"{"count": "12"}"#, 12),
            (r#"{"count": 3.9}"#, 3),
            (r#"{"count": null}"#, 0),
            (r#"{"count": -4}"#, 0),
            (r#"{"count": "n/a"}"#, 0),
            (r"{}", 0),
        ];
        for (json, expected) in cases {
            let probe: Probe = serde_json::from_str(json).unwrap();
            assert_eq!(probe.count.get(), expected, "input {json}");
        }
    }

    #[test]
    fn test_ids_accept_strings_and_numbers() {
        let probe: Probe = serde_json::from_str(r#"{"id": 10452, "note": 7}"#).unwrap();
        assert_eq!(probe.id, "10452");
        assert_eq!(probe.note.as_deref(), Some("7"));

        let probe: Probe = serde_json::from_str(r#"{"id": "VYS10452", "note": null}"#).unwrap();
        assert_eq!(probe.id, "VYS10452");
        assert!(probe.note.is_none());

        let probe: Probe = serde_json::from_str(r#"{"note": ""}"#).unwrap();
        assert_eq!(probe.id, "");
        assert!(probe.note.is_none());
    }

    #[test]
    fn test_count_display() {
        assert_eq!(Count(42).to_string(), "42");
        assert_eq!(Count::from(7).get(), 7);
    }
}

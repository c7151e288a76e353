//! Query-string construction from filter state
//!
//! Only fields that are actually set reach the wire: blank values are
//! dropped at insertion time, so the API never sees `name=` pairs.

use std::fmt;

/// Query parameter carrying the export flag
pub const EXPORT_PARAM: &str = "export";

/// Export format understood by the report endpoints
pub const EXPORT_FORMAT: &str = "excel";

/// Ordered set of query parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create an empty parameter set
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a parameter; blank values are skipped
    pub fn push(&mut self, name: &'static str, value: impl AsRef<str>) -> &mut Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.pairs.push((name, value.to_string()));
        }
        self
    }

    /// Builder-style [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
        self.push(name, value);
        self
    }

    /// Same parameters plus `export=excel`
    #[must_use]
    pub fn with_export(self) -> Self {
        self.with(EXPORT_PARAM, EXPORT_FORMAT)
    }

    /// Value of the first parameter with this name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a parameter with this name is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.pairs.iter().map(|(n, _)| *n)
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.pairs.iter().map(|(n, v)| (*n, v.as_str()))
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no parameter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `a=1&b=2` form, without a leading `?`
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_values_are_omitted() {
        let mut query = QueryParams::new();
        query
            .push("from_date", "2025-01-01")
            .push("to_date", "")
            .push("profile_id", "   ")
            .push("owner", "12");

        assert_eq!(query.len(), 2);
        assert_eq!(query.names().collect::<Vec<_>>(), vec!["from_date", "owner"]);
        assert!(!query.contains("to_date"));
        assert_eq!(query.to_query_string(), "from_date=2025-01-01&owner=12");
    }

    #[test]
    fn test_values_are_trimmed_and_encoded() {
        let query = QueryParams::new()
            .with("profile_id", " VYS 10/2 ")
            .with("countFilter", "premium_tn");
        assert_eq!(query.get("profile_id"), Some("VYS 10/2"));
        assert_eq!(
            query.to_query_string(),
            "profile_id=VYS%2010%2F2&countFilter=premium_tn"
        );
    }

    #[test]
    fn test_export_flag() {
        let query = QueryParams::new().with("owner", "3").with_export();
        assert_eq!(query.get(EXPORT_PARAM), Some("excel"));
        assert_eq!(query.to_string(), "owner=3&export=excel");
    }

    #[test]
    fn test_empty_query_string() {
        let query = QueryParams::new();
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }
}

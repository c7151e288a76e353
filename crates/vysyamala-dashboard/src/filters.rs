//! Filter state primitives shared by every dashboard
//!
//! Plain string fields follow one convention: an empty string means the
//! filter is not applied. The typed pieces here cover the few fields with
//! richer behaviour: the KPI category toggle, the sort order and gender.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Query parameter name carrying the selected KPI category
pub const COUNT_FILTER_PARAM: &str = "countFilter";

/// Key identifying one KPI category, e.g. `premium` or `premium_tn`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountKey(String);

impl CountKey {
    /// Create a key; surrounding whitespace is dropped
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Key as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty key selects "everything", i.e. clears the filter
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Derived key for one regional sub-count of this category
    #[must_use]
    pub fn regional(&self, region: Region) -> Self {
        Self(format!("{}{}", self.0, region.suffix()))
    }
}

impl fmt::Display for CountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Regional split used by the sub-values on a KPI card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Profiles from Tamil Nadu
    TamilNadu,
    /// Profiles from every other state
    Others,
}

impl Region {
    /// Suffix appended to the parent category key
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::TamilNadu => "_tn",
            Self::Others => "_tn_oth",
        }
    }
}

/// Currently selected KPI category, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountFilter(Option<CountKey>);

impl CountFilter {
    /// Filter with a category already selected
    #[must_use]
    pub fn selected(key: impl Into<CountKey>) -> Self {
        let key = key.into();
        if key.is_empty() { Self(None) } else { Self(Some(key)) }
    }

    /// Apply a card click
    ///
    /// Clicking the active key switches it off, clicking any other key
    /// replaces the selection, and an empty key always clears it.
    pub fn toggle(&mut self, key: &CountKey) {
        if key.is_empty() || self.0.as_ref() == Some(key) {
            self.0 = None;
        } else {
            self.0 = Some(key.clone());
        }
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Selected key, if any
    #[must_use]
    pub const fn get(&self) -> Option<&CountKey> {
        self.0.as_ref()
    }

    /// Whether `key` is the selected key
    #[must_use]
    pub fn is_active(&self, key: &CountKey) -> bool {
        self.0.as_ref() == Some(key)
    }

    /// Wire value; empty when nothing is selected
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref().map_or("", CountKey::as_str)
    }
}

/// Filters that carry a KPI category selection
pub trait CardFilters {
    /// Current category selection
    fn count_filter(&self) -> &CountFilter;

    /// Mutable category selection
    fn count_filter_mut(&mut self) -> &mut CountFilter;

    /// Extra resets a screen applies whenever a card is clicked
    fn on_card_selected(&mut self) {}
}

/// Sort order of the row list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    /// The other order
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DashboardError::invalid_request(format!(
                "unknown sort order '{other}'"
            ))),
        }
    }
}

/// Gender filter on the profile tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male profiles
    Male,
    /// Female profiles
    Female,
}

impl Gender {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(DashboardError::invalid_request(format!(
                "unknown gender '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toggle_same_key_twice_clears() {
        let mut filter = CountFilter::default();
        let premium = CountKey::new("premium");

        filter.toggle(&premium);
        assert_eq!(filter.as_str(), "premium");

        filter.toggle(&premium);
        assert_eq!(filter.get(), None);
        assert_eq!(filter.as_str(), "");
    }

    #[test]
    fn test_toggle_other_key_replaces() {
        let mut filter = CountFilter::selected("premium");
        filter.toggle(&CountKey::new("free"));
        assert_eq!(filter.as_str(), "free");
    }

    #[test]
    fn test_empty_key_clears() {
        let mut filter = CountFilter::selected("today_work");
        filter.toggle(&CountKey::new(""));
        assert_eq!(filter.get(), None);

        filter.toggle(&CountKey::new("  "));
        assert_eq!(filter.get(), None);
        assert_eq!(CountFilter::selected(""), CountFilter::default());
    }

    #[test]
    fn test_regional_keys_toggle_independently_of_parent() {
        let premium = CountKey::new("premium");
        let tn = premium.regional(Region::TamilNadu);
        let others = premium.regional(Region::Others);
        assert_eq!(tn.as_str(), "premium_tn");
        assert_eq!(others.as_str(), "premium_tn_oth");

        let mut filter = CountFilter::selected("premium");
        filter.toggle(&tn);
        assert!(filter.is_active(&tn));
        assert!(!filter.is_active(&premium));

        filter.toggle(&tn);
        assert_eq!(filter.get(), None);
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(Gender::Male.to_string(), "male");
        assert!("x".parse::<Gender>().is_err());
    }
}

//! KPI cards: read-only projections of the summary counts that double as
//! category filter toggles

use serde::{Deserialize, Serialize};
use vysyamala_core::Count;

use crate::filters::{CountFilter, CountKey, Region};

/// A count split into Tamil Nadu and other states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalCounts {
    /// Overall count
    #[serde(default)]
    pub total: Count,
    /// Tamil Nadu share
    #[serde(default)]
    pub tn: Count,
    /// Everyone else
    #[serde(default, rename = "non-tn", alias = "non_tn", alias = "oth")]
    pub non_tn: Count,
}

/// Regional sub-values shown inside a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionalBreakdown {
    /// Tamil Nadu sub-count
    pub tamil_nadu: Count,
    /// Other-states sub-count
    pub others: Count,
}

impl From<RegionalCounts> for RegionalBreakdown {
    fn from(counts: RegionalCounts) -> Self {
        Self {
            tamil_nadu: counts.tn,
            others: counts.non_tn,
        }
    }
}

/// One summary tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiCard {
    /// Caption
    pub label: &'static str,
    /// Displayed aggregate
    pub value: Count,
    /// Category selected when the card is clicked; `None` shows everything
    pub key: Option<CountKey>,
    /// Optional regional sub-values, each clickable on its own
    pub breakdown: Option<RegionalBreakdown>,
}

impl KpiCard {
    /// Card selecting `key` when clicked; an empty key clears the selection
    #[must_use]
    pub fn new(label: &'static str, value: Count, key: &str) -> Self {
        let key = CountKey::new(key);
        Self {
            label,
            value,
            key: (!key.is_empty()).then_some(key),
            breakdown: None,
        }
    }

    /// Card with regional sub-values taken from `counts`
    #[must_use]
    pub fn regional(label: &'static str, counts: RegionalCounts, key: &str) -> Self {
        Self {
            breakdown: Some(counts.into()),
            ..Self::new(label, counts.total, key)
        }
    }

    /// Key fed to the toggle rule when the card body is clicked
    #[must_use]
    pub fn click_key(&self) -> CountKey {
        self.key.clone().unwrap_or_else(|| CountKey::new(""))
    }

    /// Key for a click on one of the regional sub-values
    ///
    /// `None` when the card has no breakdown or no category of its own.
    #[must_use]
    pub fn region_key(&self, region: Region) -> Option<CountKey> {
        self.breakdown?;
        self.key.as_ref().map(|key| key.regional(region))
    }

    /// Whether the card or one of its sub-values is the active filter
    #[must_use]
    pub fn is_active(&self, filter: &CountFilter) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        filter.is_active(key)
            || (self.breakdown.is_some()
                && (filter.is_active(&key.regional(Region::TamilNadu))
                    || filter.is_active(&key.regional(Region::Others))))
    }

    /// Value as printed on the tile, e.g. `4 - 3/1` for a regional card
    #[must_use]
    pub fn display_value(&self) -> String {
        match self.breakdown {
            Some(b) => format!("{} - {}/{}", self.value, b.tamil_nadu, b.others),
            None => self.value.to_string(),
        }
    }
}

/// Titled group of cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiSection {
    /// Section heading
    pub title: &'static str,
    /// Cards in display order
    pub cards: Vec<KpiCard>,
}

impl KpiSection {
    /// Create a section
    #[must_use]
    pub const fn new(title: &'static str, cards: Vec<KpiCard>) -> Self {
        Self { title, cards }
    }
}

/// Find the card whose click key or regional key equals `key`
#[must_use]
pub fn find_card<'a>(sections: &'a [KpiSection], key: &CountKey) -> Option<&'a KpiCard> {
    sections
        .iter()
        .flat_map(|section| section.cards.iter())
        .find(|card| {
            card.key.as_ref() == Some(key)
                || card.region_key(Region::TamilNadu).as_ref() == Some(key)
                || card.region_key(Region::Others).as_ref() == Some(key)
        })
}

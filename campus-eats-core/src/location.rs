//! Dining locations and their static attributes.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a [`Location`].
pub type LocationId = u64;

/// Normalised free-form tags attached to a location.
///
/// Tags are trimmed, lower-cased and de-duplicated. A `BTreeSet` keeps
/// iteration order stable for callers that serialise or compare them.
pub type Tags = BTreeSet<String>;

/// Price tier of a location, from `1` (`$`) to `4` (`$$$$`).
///
/// # Examples
/// ```
/// use campus_eats_core::PriceTier;
///
/// let tier = PriceTier::new(2).expect("valid tier");
/// assert_eq!(tier.get(), 2);
/// assert_eq!(tier.to_string(), "$$");
/// assert!(PriceTier::new(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct PriceTier(u8);

/// Errors returned by [`PriceTier::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceTierError {
    /// The tier was outside `1..=4`.
    #[error("price tier {0} is outside 1..=4")]
    OutOfRange(i64),
}

impl PriceTier {
    /// Cheapest supported tier.
    pub const MIN: u8 = 1;
    /// Most expensive supported tier.
    pub const MAX: u8 = 4;

    /// Validate and construct a tier.
    pub fn new(tier: u8) -> Result<Self, PriceTierError> {
        if (Self::MIN..=Self::MAX).contains(&tier) {
            Ok(Self(tier))
        } else {
            Err(PriceTierError::OutOfRange(i64::from(tier)))
        }
    }

    /// Return the numeric tier.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PriceTier {
    type Error = PriceTierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for PriceTier {
    type Error = PriceTierError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| PriceTierError::OutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<PriceTier> for u8 {
    fn from(tier: PriceTier) -> Self {
        tier.0
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.0 {
            f.write_str("$")?;
        }
        Ok(())
    }
}

/// A campus dining option reviewable by users.
///
/// # Examples
/// ```
/// use campus_eats_core::Location;
///
/// let location = Location::new(1, "Raju Campus Hotel", "Cafe")
///     .with_tags_csv("tea, Chai ,paratha, tea");
///
/// assert_eq!(location.id, 1);
/// assert!(location.has_tag("chai"));
/// assert_eq!(location.tags.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Category or cuisine, e.g. "Cafe" or "Fast Food".
    pub category: String,
    /// Normalised tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
    /// Optional price tier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub price_tier: Option<PriceTier>,
    /// Free-text description written by the location's creator.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

impl Location {
    /// Construct a location without tags, price tier or description.
    pub fn new(id: LocationId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            tags: Tags::new(),
            price_tier: None,
            description: None,
        }
    }

    /// Replace the tags with those parsed from a comma-separated list.
    #[must_use]
    pub fn with_tags_csv(mut self, csv: &str) -> Self {
        self.tags = parse_tags(csv);
        self
    }

    /// Add a single tag, normalising it first. Blank tags are ignored.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        if let Some(normalised) = normalise_tag(tag) {
            self.tags.insert(normalised);
        }
        self
    }

    /// Set the price tier.
    #[must_use]
    pub const fn with_price_tier(mut self, tier: PriceTier) -> Self {
        self.price_tier = Some(tier);
        self
    }

    /// Set the description. Blank text clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let text = description.into();
        self.description = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Report whether the location carries `tag` (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        normalise_tag(tag).is_some_and(|t| self.tags.contains(&t))
    }

    /// Report whether the category matches `category`, ignoring case and
    /// surrounding whitespace.
    pub fn category_matches(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category.trim())
    }
}

/// Normalise a single tag: trim and lower-case. Returns `None` when blank.
pub fn normalise_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Parse a comma-separated tag list as stored by the review database.
///
/// # Examples
/// ```
/// use campus_eats_core::parse_tags;
///
/// let tags = parse_tags("juices, Shakes,, fries ");
/// assert_eq!(tags.into_iter().collect::<Vec<_>>(), ["fries", "juices", "shakes"]);
/// ```
pub fn parse_tags(csv: &str) -> Tags {
    csv.split(',').filter_map(normalise_tag).collect()
}

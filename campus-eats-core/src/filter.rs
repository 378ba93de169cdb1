//! Recommendation filters and the store-side location query.
//!
//! Filters are an explicit tagged structure rather than a loose map. Raw
//! input (query strings, CLI flags, JSON bodies) is parsed strictly: an
//! unrecognised key or a value of the wrong shape is rejected with
//! [`FilterError`] instead of being guessed at or silently dropped.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Location, PriceTier, Rating, Tags, normalise_tag, parse_tags};

/// Errors raised when filter input cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The key is not one of the recognised filter keys.
    #[error("unknown filter key '{0}'")]
    UnknownKey(String),
    /// The value could not be parsed as the type the key requires.
    #[error("filter '{key}' cannot interpret value '{value}'")]
    InvalidValue {
        /// Filter key.
        key: FilterKey,
        /// Raw value as supplied.
        value: String,
    },
    /// `min_rating` was not a finite value in the rating range.
    #[error("min_rating must be a finite value between 1 and 5")]
    MinRatingOutOfRange,
    /// `category` was empty or whitespace.
    #[error("category filter must not be blank")]
    BlankCategory,
    /// `limit` was zero.
    #[error("limit must be positive")]
    ZeroLimit,
    /// A structured payload was not valid filter JSON.
    #[error("malformed filter payload: {0}")]
    Malformed(String),
}

/// Keys recognised by [`RecommendationFilters::from_pairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    /// Case-insensitive category match.
    Category,
    /// Exact price tier.
    PriceTier,
    /// Minimum mean rating.
    MinRating,
    /// Any-of tag match.
    Tags,
    /// Drop locations the user already reviewed.
    ExcludeVisited,
    /// Maximum number of results.
    Limit,
}

impl FilterKey {
    /// Return the key as written in raw input.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::PriceTier => "price_tier",
            Self::MinRating => "min_rating",
            Self::Tags => "tags",
            Self::ExcludeVisited => "exclude_visited",
            Self::Limit => "limit",
        }
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "category" => Ok(Self::Category),
            "price_tier" => Ok(Self::PriceTier),
            "min_rating" => Ok(Self::MinRating),
            "tags" => Ok(Self::Tags),
            "exclude_visited" => Ok(Self::ExcludeVisited),
            "limit" => Ok(Self::Limit),
            other => Err(FilterError::UnknownKey(other.to_owned())),
        }
    }
}

/// Optional criteria narrowing a recommendation request.
///
/// The default value applies no filtering.
///
/// # Examples
/// ```
/// use campus_eats_core::{PriceTier, RecommendationFilters};
///
/// let filters = RecommendationFilters::new()
///     .with_category("Cafe")
///     .with_price_tier(PriceTier::new(1).expect("tier"))
///     .with_limit(3);
/// assert!(filters.validate().is_ok());
///
/// let parsed = RecommendationFilters::from_pairs([("category", "Cafe"), ("limit", "3")])
///     .expect("valid filters");
/// assert_eq!(parsed.category.as_deref(), Some("Cafe"));
/// assert_eq!(parsed.limit, Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RecommendationFilters {
    /// Keep locations whose category matches, ignoring case.
    pub category: Option<String>,
    /// Keep locations with exactly this price tier.
    pub price_tier: Option<PriceTier>,
    /// Keep locations whose mean rating is at least this value.
    pub min_rating: Option<f64>,
    /// Keep locations carrying at least one of these tags.
    pub tags: Tags,
    /// Drop locations the requesting user has already reviewed.
    pub exclude_visited: bool,
    /// Return at most this many results.
    pub limit: Option<usize>,
}

impl RecommendationFilters {
    /// Construct filters that accept every location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a price tier.
    #[must_use]
    pub const fn with_price_tier(mut self, tier: PriceTier) -> Self {
        self.price_tier = Some(tier);
        self
    }

    /// Require a minimum mean rating.
    #[must_use]
    pub const fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }

    /// Accept locations carrying `tag`; repeated calls widen the match.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        if let Some(normalised) = normalise_tag(tag) {
            self.tags.insert(normalised);
        }
        self
    }

    /// Drop locations the user already reviewed.
    #[must_use]
    pub const fn excluding_visited(mut self) -> Self {
        self.exclude_visited = true;
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse filters from raw key/value pairs such as a query string.
    ///
    /// Later pairs override earlier ones, except `tags`, which accumulate.
    ///
    /// # Errors
    /// Returns [`FilterError::UnknownKey`] for unrecognised keys and
    /// [`FilterError::InvalidValue`] when a value cannot be parsed. The result
    /// is also passed through [`RecommendationFilters::validate`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (raw_key, raw_value) in pairs {
            let key = FilterKey::from_str(raw_key.as_ref())?;
            filters.apply(key, raw_value.as_ref().trim())?;
        }
        filters.validate()?;
        Ok(filters)
    }

    /// Parse filters from a JSON object.
    ///
    /// # Errors
    /// Returns [`FilterError::Malformed`] when the payload has unknown keys or
    /// values of the wrong JSON type, and any error raised by
    /// [`RecommendationFilters::validate`].
    #[cfg(feature = "serde")]
    pub fn from_json(payload: &str) -> Result<Self, FilterError> {
        let mut filters: Self = serde_json::from_str(payload)
            .map_err(|source| FilterError::Malformed(source.to_string()))?;
        filters.tags = filters
            .tags
            .iter()
            .filter_map(|tag| normalise_tag(tag))
            .collect();
        filters.validate()?;
        Ok(filters)
    }

    fn apply(&mut self, key: FilterKey, value: &str) -> Result<(), FilterError> {
        let invalid = || FilterError::InvalidValue {
            key,
            value: value.to_owned(),
        };
        match key {
            FilterKey::Category => self.category = Some(value.to_owned()),
            FilterKey::PriceTier => {
                let tier = value.parse::<u8>().map_err(|_| invalid())?;
                self.price_tier = Some(PriceTier::new(tier).map_err(|_| invalid())?);
            }
            FilterKey::MinRating => {
                self.min_rating = Some(value.parse::<f64>().map_err(|_| invalid())?);
            }
            FilterKey::Tags => self.tags.extend(parse_tags(value)),
            FilterKey::ExcludeVisited => {
                self.exclude_visited = parse_flag(value).ok_or_else(invalid)?;
            }
            FilterKey::Limit => self.limit = Some(value.parse::<usize>().map_err(|_| invalid())?),
        }
        Ok(())
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    /// Returns the first [`FilterError`] found.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(category) = &self.category
            && category.trim().is_empty()
        {
            return Err(FilterError::BlankCategory);
        }
        if let Some(min_rating) = self.min_rating {
            let bounds = f64::from(Rating::MIN)..=f64::from(Rating::MAX);
            if !min_rating.is_finite() || !bounds.contains(&min_rating) {
                return Err(FilterError::MinRatingOutOfRange);
            }
        }
        if self.limit == Some(0) {
            return Err(FilterError::ZeroLimit);
        }
        Ok(())
    }

    /// Extract the part of the filters a store can evaluate on its own.
    pub fn location_query(&self) -> LocationQuery {
        LocationQuery {
            category: self.category.clone(),
            price_tier: self.price_tier,
        }
    }

    /// Report whether `location` satisfies the tag filter.
    ///
    /// An empty tag set accepts every location.
    pub fn matches_tags(&self, location: &Location) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| location.tags.contains(tag))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Static location criteria a [`ReviewStore`](crate::ReviewStore) evaluates.
///
/// Criteria that depend on review statistics stay with the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationQuery {
    /// Case-insensitive category match.
    pub category: Option<String>,
    /// Exact price tier.
    pub price_tier: Option<PriceTier>,
}

impl LocationQuery {
    /// Report whether `location` satisfies the query.
    pub fn matches(&self, location: &Location) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| location.category_matches(category));
        let tier_ok = self
            .price_tier
            .is_none_or(|tier| location.price_tier == Some(tier));
        category_ok && tier_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_pairs_accept_everything() {
        let filters =
            RecommendationFilters::from_pairs(Vec::<(&str, &str)>::new()).expect("no filters");
        assert_eq!(filters, RecommendationFilters::default());
    }

    #[rstest]
    fn parses_every_recognised_key() {
        let filters = RecommendationFilters::from_pairs([
            ("category", "Cafe"),
            ("price_tier", "2"),
            ("min_rating", "3.5"),
            ("tags", "Chai, breakfast"),
            ("tags", "late-night"),
            ("exclude_visited", "true"),
            ("limit", "4"),
        ])
        .expect("valid filters");

        assert_eq!(filters.category.as_deref(), Some("Cafe"));
        assert_eq!(filters.price_tier.map(PriceTier::get), Some(2));
        assert_eq!(filters.min_rating, Some(3.5));
        assert_eq!(filters.tags.len(), 3);
        assert!(filters.exclude_visited);
        assert_eq!(filters.limit, Some(4));
    }

    #[rstest]
    fn rejects_unknown_key() {
        let err = RecommendationFilters::from_pairs([("cuisine", "thai")])
            .expect_err("unknown key should fail");
        assert_eq!(err, FilterError::UnknownKey("cuisine".into()));
    }

    #[rstest]
    #[case("price_tier", "cheap", FilterKey::PriceTier)]
    #[case("price_tier", "9", FilterKey::PriceTier)]
    #[case("min_rating", "four", FilterKey::MinRating)]
    #[case("limit", "-1", FilterKey::Limit)]
    #[case("exclude_visited", "maybe", FilterKey::ExcludeVisited)]
    fn rejects_values_of_the_wrong_type(
        #[case] key: &str,
        #[case] value: &str,
        #[case] expected_key: FilterKey,
    ) {
        let err = RecommendationFilters::from_pairs([(key, value)])
            .expect_err("invalid value should fail");
        assert!(matches!(err, FilterError::InvalidValue { key, .. } if key == expected_key));
    }

    #[rstest]
    #[case(0.5)]
    #[case(5.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn validate_rejects_min_rating_outside_range(#[case] min_rating: f64) {
        let filters = RecommendationFilters::new().with_min_rating(min_rating);
        assert_eq!(filters.validate(), Err(FilterError::MinRatingOutOfRange));
    }

    #[rstest]
    fn validate_rejects_blank_category_and_zero_limit() {
        let blank = RecommendationFilters::new().with_category("  ");
        assert_eq!(blank.validate(), Err(FilterError::BlankCategory));
        let zero = RecommendationFilters::new().with_limit(0);
        assert_eq!(zero.validate(), Err(FilterError::ZeroLimit));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn json_rejects_unknown_fields_and_wrong_types() {
        assert!(matches!(
            RecommendationFilters::from_json(r#"{"cuisine": "thai"}"#),
            Err(FilterError::Malformed(_))
        ));
        assert!(matches!(
            RecommendationFilters::from_json(r#"{"price_tier": "two"}"#),
            Err(FilterError::Malformed(_))
        ));
        let parsed = RecommendationFilters::from_json(r#"{"category": "Cafe", "tags": [" Tea"]}"#)
            .expect("valid json filters");
        assert!(parsed.tags.contains("tea"));
    }

    #[rstest]
    fn location_query_matches_category_and_tier() {
        let tier = PriceTier::new(2).expect("tier");
        let cafe = Location::new(1, "Raju", "Cafe").with_price_tier(tier);
        let query = RecommendationFilters::new()
            .with_category("cafe")
            .with_price_tier(tier)
            .location_query();
        assert!(query.matches(&cafe));
        assert!(!query.matches(&Location::new(2, "Ayan Gardens", "Restaurant")));
        assert!(!query.matches(&Location::new(3, "Untiered", "Cafe")));
    }
}

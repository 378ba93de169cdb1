//! Content-based similarity between locations.
#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use campus_eats_core::{Location, LocationId, Review, UserId};

use crate::aggregate::RatingAccumulator;

/// Common English words carrying no signal about a location.
const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "but",
    "by", "can", "for", "from", "has", "have", "here", "in", "into", "is", "it", "its", "more",
    "most", "near", "no", "not", "of", "on", "or", "our", "so", "some", "than", "that", "the",
    "their", "there", "this", "to", "up", "very", "was", "we", "with", "you", "your",
];

/// Tags, the lower-cased category and the description's words.
pub(crate) fn features(location: &Location) -> BTreeSet<String> {
    let mut features: BTreeSet<String> = location.tags.clone();
    let category = location.category.trim().to_lowercase();
    if !category.is_empty() {
        features.insert(category);
    }
    if let Some(description) = &location.description {
        features.extend(description_terms(description));
    }
    features
}

/// Lower-cased alphanumeric words of two or more characters, minus stop
/// words.
fn description_terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
}

/// Jaccard index `|a ∩ b| / |a ∪ b|`; zero when both sets are empty.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "Jaccard index is a ratio of set sizes"
)]
pub(crate) fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Mean rating each user gave one location.
#[derive(Debug, Default)]
pub(crate) struct RatingVector<'a> {
    ratings: BTreeMap<&'a UserId, f64>,
}

impl RatingVector<'_> {
    /// Cosine similarity with `other` and the number of users in both.
    ///
    /// Users who rated only one location contribute to its norm but not to
    /// the dot product.
    #[expect(clippy::float_arithmetic, reason = "cosine of rating vectors")]
    pub(crate) fn cosine(&self, other: &Self) -> (f64, usize) {
        let mut dot = 0.0;
        let mut shared = 0;
        for (user, rating) in &self.ratings {
            if let Some(theirs) = other.ratings.get(user) {
                dot += rating * theirs;
                shared += 1;
            }
        }
        let norms = self.norm() * other.norm();
        if shared == 0 || norms <= 0.0 {
            return (0.0, shared);
        }
        (dot / norms, shared)
    }

    #[expect(clippy::float_arithmetic, reason = "Euclidean norm")]
    fn norm(&self) -> f64 {
        self.ratings
            .values()
            .map(|rating| rating * rating)
            .sum::<f64>()
            .sqrt()
    }
}

/// Group reviews into one rating vector per location.
///
/// A user who reviewed a location more than once contributes their mean
/// rating.
pub(crate) fn rating_vectors(reviews: &[Review]) -> HashMap<LocationId, RatingVector<'_>> {
    let mut sums: HashMap<LocationId, BTreeMap<&UserId, RatingAccumulator>> = HashMap::new();
    for review in reviews {
        sums.entry(review.location_id)
            .or_default()
            .entry(&review.user_id)
            .or_default()
            .push(review.rating.as_f64(), 1.0);
    }
    sums.into_iter()
        .map(|(location_id, per_user)| {
            let ratings = per_user
                .into_iter()
                .filter_map(|(user, tally)| tally.mean().map(|mean| (user, mean)))
                .collect();
            (location_id, RatingVector { ratings })
        })
        .collect()
}

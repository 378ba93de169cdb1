//! Request-time recommendation engine.
//!
//! [`Recommender`] reads locations and reviews from a
//! [`ReviewStore`](campus_eats_core::ReviewStore), applies the caller's
//! filters, and ranks the survivors by a confidence-weighted shrinkage score.
//! Each call performs one pass over the locations and one over the reviews
//! and keeps no state between calls.

#![forbid(unsafe_code)]

use std::{
    cmp::Ordering,
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use campus_eats_core::{
    LocationId, LocationQuery, RecommendationFilters, ReviewStore, UserId,
};
use log::debug;

use crate::{
    AlsoLikedLocation, ConfigError, LocationRecommendation, RecommendError, ScoringConfig,
    SimilarLocation, TrendingLocation,
    aggregate::{RatingAccumulator, ReviewStats},
    similarity::{features, jaccard, rating_vectors},
};

/// Ranks dining locations for a user from the reviews held in a store.
///
/// # Examples
///
/// ```
/// use campus_eats_core::{Location, RecommendationFilters, UserId, test_support::MemoryStore};
/// use campus_eats_scorer::{Recommender, ScoringConfig};
///
/// let store = MemoryStore::default()
///     .with_location(Location::new(1, "Hot N Spicy", "Fast Food"))
///     .with_location(Location::new(2, "Raju Campus Hotel", "Cafe"))
///     .with_rating(1, "sara", 5)
///     .with_rating(2, "omar", 3);
/// let recommender = Recommender::new(store, ScoringConfig::default()).expect("valid config");
///
/// let filters = RecommendationFilters::new().with_category("cafe");
/// let ranked = recommender
///     .recommend(&UserId::new("ali"), Some(&filters))
///     .expect("in-memory store never fails");
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].location_id, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Recommender<S> {
    store: S,
    config: ScoringConfig,
}

impl<S: ReviewStore> Recommender<S> {
    /// Build a recommender over `store`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails
    /// [`ScoringConfig::validate`].
    pub fn new(store: S, config: ScoringConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self { store, config })
    }

    /// Build a recommender with the default scoring configuration.
    #[must_use]
    pub fn with_default_config(store: S) -> Self {
        Self {
            store,
            config: ScoringConfig::default(),
        }
    }

    /// Scoring configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Rank locations for `user` as of the current system time.
    ///
    /// # Errors
    /// See [`Recommender::recommend_at`].
    pub fn recommend(
        &self,
        user: &UserId,
        filters: Option<&RecommendationFilters>,
    ) -> Result<Vec<LocationRecommendation>, RecommendError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        self.recommend_at(user, filters, now)
    }

    /// Rank locations for `user` as of `now` (Unix seconds).
    ///
    /// The user's own reviews are left out of every statistic and only mark
    /// locations as visited. Locations nobody else has reviewed receive the
    /// configured prior score. An unknown user or an empty match is not an
    /// error.
    ///
    /// # Errors
    /// Returns [`RecommendError::InvalidFilter`] when `filters` fail
    /// validation and [`RecommendError::Store`] when the store cannot be read.
    pub fn recommend_at(
        &self,
        user: &UserId,
        filters: Option<&RecommendationFilters>,
        now: u64,
    ) -> Result<Vec<LocationRecommendation>, RecommendError> {
        if let Some(filters) = filters {
            filters.validate()?;
        }
        let query = filters.map_or_else(LocationQuery::default, RecommendationFilters::location_query);
        let locations = self
            .store
            .list_locations(&query)
            .map_err(RecommendError::store)?;
        let reviews = self.store.list_reviews().map_err(RecommendError::store)?;
        let stats = ReviewStats::collect(&reviews, Some(user), &self.config, now);

        let candidate_count = locations.len();
        let mut ranked: Vec<LocationRecommendation> = locations
            .into_iter()
            .filter(|location| filters.is_none_or(|f| f.matches_tags(location)))
            .filter_map(|location| {
                let visited = stats.visited(location.id);
                if visited && filters.is_some_and(|f| f.exclude_visited) {
                    return None;
                }
                let aggregated = stats.score(location.id, &self.config);
                let min_rating = filters.and_then(|f| f.min_rating);
                if let Some(min) = min_rating
                    && aggregated.mean_rating.is_none_or(|mean| mean < min)
                {
                    return None;
                }
                Some(LocationRecommendation {
                    location_id: location.id,
                    name: location.name,
                    category: location.category,
                    score: aggregated.score,
                    review_count: aggregated.review_count,
                    mean_rating: aggregated.mean_rating,
                    visited,
                })
            })
            .collect();
        ranked.sort_by(compare_recommendations);
        if let Some(limit) = filters.and_then(|f| f.limit) {
            ranked.truncate(limit);
        }
        debug!(
            "ranked {} of {candidate_count} candidate locations from {} reviews for user {user}",
            ranked.len(),
            reviews.len(),
        );
        Ok(ranked)
    }

    /// Locations sharing the most features with `location_id`.
    ///
    /// Similarity is the Jaccard index over tags, the lower-cased category
    /// and the words of the description. The reference location and dissimilar locations are
    /// omitted; an unknown id yields no results.
    ///
    /// # Errors
    /// Returns [`RecommendError::Store`] when the store cannot be read.
    pub fn similar_locations(
        &self,
        location_id: LocationId,
        limit: usize,
    ) -> Result<Vec<SimilarLocation>, RecommendError> {
        let locations = self
            .store
            .list_locations(&LocationQuery::default())
            .map_err(RecommendError::store)?;
        let Some(reference) = locations.iter().find(|location| location.id == location_id) else {
            debug!("similar locations requested for unknown location {location_id}");
            return Ok(Vec::new());
        };
        let reference_features = features(reference);
        let mut similar: Vec<SimilarLocation> = locations
            .iter()
            .filter(|location| location.id != location_id)
            .filter_map(|location| {
                let similarity = jaccard(&reference_features, &features(location));
                (similarity > 0.0).then(|| SimilarLocation {
                    location_id: location.id,
                    name: location.name.clone(),
                    category: location.category.clone(),
                    similarity,
                })
            })
            .collect();
        similar.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.location_id.cmp(&b.location_id))
        });
        similar.truncate(limit);
        Ok(similar)
    }

    /// Locations rated alike by the people who reviewed `location_id`.
    ///
    /// Each location is a vector of per-user ratings; similarity is the
    /// cosine between the reference vector and each other location's.
    /// Locations sharing no reviewer are omitted, as is every result when the
    /// reference has no reviews or is unknown. Ties order by id.
    ///
    /// # Errors
    /// Returns [`RecommendError::Store`] when the store cannot be read.
    pub fn also_liked(
        &self,
        location_id: LocationId,
        limit: usize,
    ) -> Result<Vec<AlsoLikedLocation>, RecommendError> {
        let locations = self
            .store
            .list_locations(&LocationQuery::default())
            .map_err(RecommendError::store)?;
        let reviews = self.store.list_reviews().map_err(RecommendError::store)?;
        let vectors = rating_vectors(&reviews);
        let Some(reference) = vectors.get(&location_id) else {
            debug!("also-liked requested for location {location_id} without reviews");
            return Ok(Vec::new());
        };
        let mut liked: Vec<AlsoLikedLocation> = locations
            .into_iter()
            .filter(|location| location.id != location_id)
            .filter_map(|location| {
                let (similarity, co_reviewers) = reference.cosine(vectors.get(&location.id)?);
                (co_reviewers > 0).then(|| AlsoLikedLocation {
                    location_id: location.id,
                    name: location.name,
                    category: location.category,
                    similarity,
                    co_reviewers,
                })
            })
            .collect();
        liked.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.location_id.cmp(&b.location_id))
        });
        liked.truncate(limit);
        Ok(liked)
    }

    /// Most-reviewed locations, busiest first.
    ///
    /// Locations without reviews are omitted.
    ///
    /// # Errors
    /// Returns [`RecommendError::Store`] when the store cannot be read.
    pub fn trending(&self, limit: usize) -> Result<Vec<TrendingLocation>, RecommendError> {
        let locations = self
            .store
            .list_locations(&LocationQuery::default())
            .map_err(RecommendError::store)?;
        let reviews = self.store.list_reviews().map_err(RecommendError::store)?;
        let mut tallies: HashMap<LocationId, RatingAccumulator> = HashMap::new();
        for review in &reviews {
            tallies
                .entry(review.location_id)
                .or_default()
                .push(review.rating.as_f64(), 1.0);
        }
        let mut trending: Vec<TrendingLocation> = locations
            .into_iter()
            .filter_map(|location| {
                let tally = tallies.get(&location.id)?;
                let mean_rating = tally.mean()?;
                Some(TrendingLocation {
                    location_id: location.id,
                    name: location.name,
                    category: location.category,
                    review_count: tally.count(),
                    mean_rating,
                })
            })
            .collect();
        trending.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then_with(|| a.location_id.cmp(&b.location_id))
        });
        trending.truncate(limit);
        Ok(trending)
    }
}

/// Score descending, then review count descending, then id ascending.
fn compare_recommendations(a: &LocationRecommendation, b: &LocationRecommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.review_count.cmp(&a.review_count))
        .then_with(|| a.location_id.cmp(&b.location_id))
}

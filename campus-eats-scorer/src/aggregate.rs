//! Review aggregation shared by recommendation and trending queries.
#![forbid(unsafe_code)]

use std::collections::{BTreeSet, HashMap};

use campus_eats_core::{LocationId, Review, UserId};

use crate::{AggregatedScore, ScoringConfig};

/// Running sums over a set of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RatingAccumulator {
    count: usize,
    rating_sum: f64,
    weighted_sum: f64,
    weight_total: f64,
}

impl RatingAccumulator {
    #[expect(
        clippy::float_arithmetic,
        reason = "accumulating rating sums"
    )]
    pub(crate) fn push(&mut self, rating: f64, weight: f64) {
        self.count += 1;
        self.rating_sum += rating;
        self.weighted_sum += rating * weight;
        self.weight_total += weight;
    }

    pub(crate) const fn count(&self) -> usize {
        self.count
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean of accumulated ratings"
    )]
    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.rating_sum / self.count as f64)
    }

    /// Weighted mean, falling back to the plain mean when every weight has
    /// decayed to zero.
    #[expect(clippy::float_arithmetic, reason = "weighted mean of ratings")]
    pub(crate) fn weighted_mean(&self) -> Option<f64> {
        if self.weight_total > 0.0 {
            Some(self.weighted_sum / self.weight_total)
        } else {
            self.mean()
        }
    }
}

/// Review statistics seen from one user's point of view.
///
/// The user's own reviews are excluded from every sum and only mark the
/// locations they visited.
#[derive(Debug, Default)]
pub(crate) struct ReviewStats {
    global: RatingAccumulator,
    per_location: HashMap<LocationId, RatingAccumulator>,
    visited: BTreeSet<LocationId>,
}

impl ReviewStats {
    pub(crate) fn collect(
        reviews: &[Review],
        viewer: Option<&UserId>,
        config: &ScoringConfig,
        now: u64,
    ) -> Self {
        let mut stats = Self::default();
        for review in reviews {
            if viewer.is_some_and(|user| review.is_authored_by(user)) {
                stats.visited.insert(review.location_id);
                continue;
            }
            let rating = review.rating.as_f64();
            let weight = config.review_weight(review.created_at, now);
            stats.global.push(rating, weight);
            stats
                .per_location
                .entry(review.location_id)
                .or_default()
                .push(rating, weight);
        }
        stats
    }

    pub(crate) fn visited(&self, location_id: LocationId) -> bool {
        self.visited.contains(&location_id)
    }

    pub(crate) fn location(&self, location_id: LocationId) -> RatingAccumulator {
        self.per_location
            .get(&location_id)
            .copied()
            .unwrap_or_default()
    }

    /// Shrinkage score for a location.
    #[expect(clippy::float_arithmetic, reason = "blending two means")]
    pub(crate) fn score(&self, location_id: LocationId, config: &ScoringConfig) -> AggregatedScore {
        let ratings = self.location(location_id);
        let review_count = ratings.count();
        let mean_rating = ratings.mean();
        let weighted_mean = ratings.weighted_mean();
        let confidence = config.confidence(review_count);
        let score = match (weighted_mean, self.global.weighted_mean()) {
            (Some(local), Some(global)) => confidence * local + (1.0 - confidence) * global,
            _ => config.prior_score,
        };
        AggregatedScore {
            review_count,
            mean_rating,
            weighted_mean,
            confidence,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use campus_eats_core::{Rating, Review, UserId};
    use rstest::rstest;

    use super::{RatingAccumulator, ReviewStats};
    use crate::{RecencyDecay, ScoringConfig};

    fn review(id: u64, location_id: u64, user: &str, stars: u8, created_at: u64) -> Review {
        let rating = Rating::new(stars).unwrap_or_else(|err| panic!("{err}"));
        Review::new(id, location_id, UserId::new(user), rating, created_at)
    }

    #[rstest]
    fn empty_accumulator_has_no_mean() {
        let acc = RatingAccumulator::default();
        assert_eq!(acc.mean(), None);
        assert_eq!(acc.weighted_mean(), None);
    }

    #[rstest]
    fn own_reviews_only_mark_visits() {
        let reviews = [review(1, 7, "ali", 1, 0), review(2, 7, "sara", 5, 0)];
        let viewer = UserId::new("ali");
        let stats = ReviewStats::collect(&reviews, Some(&viewer), &ScoringConfig::default(), 0);
        assert!(stats.visited(7));
        assert_eq!(stats.location(7).count(), 1);
        assert_eq!(stats.location(7).mean(), Some(5.0));
    }

    #[rstest]
    fn unreviewed_location_gets_prior() {
        let reviews = [review(1, 1, "sara", 4, 0)];
        let config = ScoringConfig::default().with_prior_score(1.5);
        let stats = ReviewStats::collect(&reviews, None, &config, 0);
        let scored = stats.score(2, &config);
        assert_eq!(scored.review_count, 0);
        assert_eq!(scored.score, 1.5);
        assert_eq!(scored.mean_rating, None);
    }

    #[rstest]
    fn decayed_weights_fall_back_to_plain_mean() {
        let day = 86_400;
        let config = ScoringConfig::default().with_recency(RecencyDecay::from_days(0, 1));
        let reviews = [review(1, 1, "sara", 4, 0), review(2, 1, "omar", 2, 0)];
        let stats = ReviewStats::collect(&reviews, None, &config, day * 100_000);
        assert_eq!(stats.location(1).weighted_mean(), Some(3.0));
    }

    #[rstest]
    fn recent_reviews_dominate_weighted_mean() {
        let day = 86_400;
        let now = day * 100;
        let config = ScoringConfig::default().with_recency(RecencyDecay::from_days(7, 7));
        let reviews = [
            review(1, 1, "sara", 5, now - day),
            review(2, 1, "omar", 1, now - day * 70),
        ];
        let stats = ReviewStats::collect(&reviews, None, &config, now);
        let acc = stats.location(1);
        assert_eq!(acc.mean(), Some(3.0));
        let weighted = acc.weighted_mean().unwrap_or_default();
        assert!(weighted > 4.9, "expected recent five to dominate, got {weighted}");
    }
}

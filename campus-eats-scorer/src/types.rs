//! Public configuration and output types for recommendation scoring.
#![forbid(unsafe_code)]

use std::time::Duration;

use campus_eats_core::LocationId;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default pseudo-count controlling how quickly confidence saturates.
pub const DEFAULT_CONFIDENCE_K: f64 = 5.0;

/// Score assigned to locations without any counted review.
pub const DEFAULT_PRIOR_SCORE: f64 = 0.0;

const SECONDS_PER_DAY: u64 = 86_400;

/// Tunable parameters of the shrinkage score.
///
/// `score = c * weighted_mean + (1 - c) * global_mean` where
/// `c = n / (n + confidence_k)` and `n` is the number of counted reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Score for locations nobody else has reviewed yet.
    pub prior_score: f64,
    /// Pseudo-count `k` in `n / (n + k)`.
    pub confidence_k: f64,
    /// Optional down-weighting of old reviews.
    pub recency: Option<RecencyDecay>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            prior_score: DEFAULT_PRIOR_SCORE,
            confidence_k: DEFAULT_CONFIDENCE_K,
            recency: None,
        }
    }
}

impl ScoringConfig {
    /// Replace the prior score.
    #[must_use]
    pub const fn with_prior_score(mut self, prior_score: f64) -> Self {
        self.prior_score = prior_score;
        self
    }

    /// Replace the confidence constant.
    #[must_use]
    pub const fn with_confidence_k(mut self, confidence_k: f64) -> Self {
        self.confidence_k = confidence_k;
        self
    }

    /// Enable recency weighting.
    #[must_use]
    pub const fn with_recency(mut self, recency: RecencyDecay) -> Self {
        self.recency = Some(recency);
        self
    }

    /// Validate the configuration and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the prior is not finite, when
    /// `confidence_k` is not a finite positive value, or when recency decay
    /// has a zero half-life.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !self.prior_score.is_finite() {
            return Err(ConfigError::NonFinitePrior(self.prior_score));
        }
        if !self.confidence_k.is_finite() || self.confidence_k <= 0.0 {
            return Err(ConfigError::InvalidConfidenceK(self.confidence_k));
        }
        if let Some(recency) = self.recency
            && recency.half_life.is_zero()
        {
            return Err(ConfigError::ZeroHalfLife);
        }
        Ok(self)
    }

    /// Confidence in a mean observed over `review_count` reviews.
    ///
    /// Zero for no reviews, strictly increasing, and always below one.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "confidence is a ratio of review counts"
    )]
    pub fn confidence(&self, review_count: usize) -> f64 {
        let n = review_count as f64;
        n / (n + self.confidence_k)
    }

    /// Weight of a review created at `created_at` when scoring at `now`.
    #[must_use]
    pub fn review_weight(&self, created_at: u64, now: u64) -> f64 {
        self.recency
            .map_or(1.0, |recency| recency.weight(now.saturating_sub(created_at)))
    }
}

/// Exponential down-weighting of reviews older than a horizon.
///
/// Reviews no older than `horizon` weigh one. Past it, weight halves every
/// `half_life`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyDecay {
    /// Age up to which a review keeps full weight.
    pub horizon: Duration,
    /// Age interval over which weight halves past the horizon.
    pub half_life: Duration,
}

impl RecencyDecay {
    /// Build a decay from a horizon and a half-life.
    #[must_use]
    pub const fn new(horizon: Duration, half_life: Duration) -> Self {
        Self { horizon, half_life }
    }

    /// Build a decay from whole days.
    #[must_use]
    pub const fn from_days(horizon_days: u64, half_life_days: u64) -> Self {
        Self::new(
            Duration::from_secs(horizon_days.saturating_mul(SECONDS_PER_DAY)),
            Duration::from_secs(half_life_days.saturating_mul(SECONDS_PER_DAY)),
        )
    }

    /// Weight of a review `age_secs` seconds old, in `0.0..=1.0`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "exponential decay over review age"
    )]
    pub fn weight(&self, age_secs: u64) -> f64 {
        let horizon = self.horizon.as_secs();
        if age_secs <= horizon || self.half_life.is_zero() {
            return 1.0;
        }
        let exponent = (age_secs - horizon) as f64 / self.half_life.as_secs_f64();
        0.5_f64.powf(exponent)
    }
}

/// Per-location statistics behind a recommendation score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScore {
    /// Number of counted reviews.
    pub review_count: usize,
    /// Arithmetic mean of counted ratings.
    pub mean_rating: Option<f64>,
    /// Recency-weighted mean of counted ratings.
    pub weighted_mean: Option<f64>,
    /// `review_count / (review_count + k)`.
    pub confidence: f64,
    /// Final ranking score.
    pub score: f64,
}

/// A single ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecommendation {
    /// Identifier of the recommended location.
    pub location_id: LocationId,
    /// Display name.
    pub name: String,
    /// Category label as stored.
    pub category: String,
    /// Shrinkage score used for ranking.
    pub score: f64,
    /// Number of reviews counted towards the score.
    pub review_count: usize,
    /// Arithmetic mean of counted ratings, absent without reviews.
    pub mean_rating: Option<f64>,
    /// Whether the requesting user has reviewed this location.
    pub visited: bool,
}

/// A location resembling a reference location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarLocation {
    /// Identifier of the similar location.
    pub location_id: LocationId,
    /// Display name.
    pub name: String,
    /// Category label as stored.
    pub category: String,
    /// Jaccard index of the two feature sets, in `(0.0, 1.0]`.
    pub similarity: f64,
}

/// A location rated alike by the people who rated a reference location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlsoLikedLocation {
    /// Identifier of the location.
    pub location_id: LocationId,
    /// Display name.
    pub name: String,
    /// Category label as stored.
    pub category: String,
    /// Cosine similarity of the two locations' per-user ratings.
    pub similarity: f64,
    /// Number of users who reviewed both locations.
    pub co_reviewers: usize,
}

/// A location ranked by review volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingLocation {
    /// Identifier of the location.
    pub location_id: LocationId,
    /// Display name.
    pub name: String,
    /// Category label as stored.
    pub category: String,
    /// Number of reviews.
    pub review_count: usize,
    /// Arithmetic mean rating.
    pub mean_rating: f64,
}

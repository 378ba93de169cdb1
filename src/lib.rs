//! Facade crate for the campus dining recommendation engine.
//!
//! This crate re-exports the core domain types and the recommendation engine,
//! with the SQLite review store behind a feature flag.

#![forbid(unsafe_code)]

pub use campus_eats_core::{
    FilterError, Location, LocationId, LocationQuery, PriceTier, Rating, RecommendationFilters,
    Review, ReviewStore, UserId,
};
pub use campus_eats_scorer::{
    AggregatedScore, AlsoLikedLocation, ConfigError, LocationRecommendation, RecencyDecay, RecommendError,
    Recommender, ScoringConfig, SimilarLocation, TrendingLocation,
};

#[cfg(feature = "store-sqlite")]
pub use campus_eats_core::{SqliteReviewStore, SqliteReviewStoreError};

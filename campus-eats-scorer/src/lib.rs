//! Recommendation scoring for campus dining locations.
//!
//! The crate turns raw reviews into a ranked list of places to eat. Each
//! location's mean rating is shrunk towards the mean over every review in the
//! store, with a confidence of `n / (n + k)` for `n` reviews, so a single
//! glowing review cannot outrank a long record of good ones. Optional recency
//! decay lets older reviews fade. The requesting user's own reviews are left
//! out of the statistics and only mark locations as visited.
//!
//! Alongside personalised ranking, [`Recommender`] answers simpler queries:
//! [`Recommender::similar_locations`] for content-based neighbours,
//! [`Recommender::also_liked`] for places rated alike by the same people, and
//! [`Recommender::trending`] for the most-reviewed places.
//!
//! # Examples
//!
//! ```
//! use campus_eats_core::{Location, UserId, test_support::MemoryStore};
//! use campus_eats_scorer::Recommender;
//!
//! let store = MemoryStore::default()
//!     .with_location(Location::new(1, "Ayan Gardens", "Restaurant"))
//!     .with_location(Location::new(2, "Hot N Spicy", "Fast Food"))
//!     .with_rating(1, "sara", 5)
//!     .with_rating(1, "omar", 5)
//!     .with_rating(2, "bilal", 2);
//! let recommender = Recommender::with_default_config(store);
//! let ranked = recommender
//!     .recommend_at(&UserId::new("ali"), None, 0)
//!     .expect("in-memory store never fails");
//! let ids: Vec<_> = ranked.iter().map(|r| r.location_id).collect();
//! assert_eq!(ids, [1, 2]);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
mod error;
mod recommender;
mod similarity;
mod types;

pub use error::{ConfigError, RecommendError};
pub use recommender::Recommender;
pub use types::{
    AggregatedScore, AlsoLikedLocation, DEFAULT_CONFIDENCE_K, DEFAULT_PRIOR_SCORE, LocationRecommendation,
    RecencyDecay, ScoringConfig, SimilarLocation, TrendingLocation,
};

//! Core domain types for the campus dining recommendation engine.
//!
//! The crate models dining [`Location`]s and user [`Review`]s, the filters a
//! caller may apply to a recommendation request, and the read-only
//! [`ReviewStore`] interface the engine consumes. Constructors for bounded
//! values return `Result` so invalid input is caught at the edge.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod filter;
pub mod location;
pub mod review;
pub mod store;
pub mod test_support;

pub use filter::{FilterError, FilterKey, LocationQuery, RecommendationFilters};
pub use location::{
    Location, LocationId, PriceTier, PriceTierError, Tags, normalise_tag, parse_tags,
};
pub use review::{Rating, RatingError, Review, ReviewId, UserId};
pub use store::ReviewStore;
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteReviewStore, SqliteReviewStoreError};

//! Data access traits for locations and reviews.
//!
//! The `ReviewStore` trait defines the read-only interface the
//! recommendation engine consumes. The engine never writes through it.

use crate::{Location, LocationId, LocationQuery, Review};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteReviewStore, SqliteReviewStoreError};

/// Read-only access to persisted locations and reviews.
///
/// Implementations return locations ordered by id and reviews ordered by id
/// so callers observe a deterministic sequence for identical store contents.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use campus_eats_core::{Location, LocationQuery, Review, ReviewStore};
///
/// struct OneCafe;
///
/// impl ReviewStore for OneCafe {
///     type Error = Infallible;
///
///     fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, Infallible> {
///         let cafe = Location::new(1, "Raju Campus Hotel", "Cafe");
///         Ok(if query.matches(&cafe) { vec![cafe] } else { Vec::new() })
///     }
///
///     fn list_reviews(&self) -> Result<Vec<Review>, Infallible> {
///         Ok(Vec::new())
///     }
/// }
///
/// let all = OneCafe.list_locations(&LocationQuery::default()).unwrap();
/// assert_eq!(all.len(), 1);
/// ```
pub trait ReviewStore {
    /// Failure raised by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the locations satisfying `query`, ordered by id.
    fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, Self::Error>;

    /// Return every stored review, ordered by id.
    ///
    /// This is the bulk fetch the engine uses: the global mean rating spans
    /// all reviews, so a single pass is cheaper than per-location queries.
    fn list_reviews(&self) -> Result<Vec<Review>, Self::Error>;

    /// Return the reviews of a single location, ordered by id.
    fn list_reviews_for(&self, location_id: LocationId) -> Result<Vec<Review>, Self::Error> {
        let mut reviews = self.list_reviews()?;
        reviews.retain(|review| review.location_id == location_id);
        Ok(reviews)
    }
}

impl<S: ReviewStore + ?Sized> ReviewStore for &S {
    type Error = S::Error;

    fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, Self::Error> {
        (**self).list_locations(query)
    }

    fn list_reviews(&self) -> Result<Vec<Review>, Self::Error> {
        (**self).list_reviews()
    }

    fn list_reviews_for(&self, location_id: LocationId) -> Result<Vec<Review>, Self::Error> {
        (**self).list_reviews_for(location_id)
    }
}

#[cfg(test)]
mod tests {
    use super::ReviewStore;
    use crate::{Location, LocationQuery, PriceTier, test_support::MemoryStore};
    use rstest::rstest;

    #[rstest]
    fn returns_every_location_for_default_query() {
        let store = MemoryStore::default()
            .with_location(Location::new(2, "Ayan Gardens", "Restaurant"))
            .with_location(Location::new(1, "Hot N Spicy", "Fast Food"));
        let found = store
            .list_locations(&LocationQuery::default())
            .expect("memory store is infallible");
        let ids: Vec<_> = found.iter().map(|location| location.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[rstest]
    fn returns_empty_when_no_locations() {
        let store = MemoryStore::default();
        let found = store
            .list_locations(&LocationQuery::default())
            .expect("memory store is infallible");
        assert!(found.is_empty());
    }

    #[rstest]
    #[case(Some("fast food"), None, vec![1])]
    #[case(None, Some(2), vec![2])]
    #[case(Some("vegetarian"), None, vec![])]
    fn query_narrows_locations(
        #[case] category: Option<&str>,
        #[case] tier: Option<u8>,
        #[case] expected: Vec<u64>,
    ) {
        let store = MemoryStore::default()
            .with_location(Location::new(1, "Hot N Spicy", "Fast Food"))
            .with_location(
                Location::new(2, "Ayan Gardens", "Restaurant")
                    .with_price_tier(PriceTier::new(2).expect("tier")),
            );
        let query = LocationQuery {
            category: category.map(str::to_owned),
            price_tier: tier.map(|t| PriceTier::new(t).expect("tier")),
        };
        let ids: Vec<_> = store
            .list_locations(&query)
            .expect("memory store is infallible")
            .into_iter()
            .map(|location| location.id)
            .collect();
        assert_eq!(ids, expected);
    }

    #[rstest]
    fn reviews_for_location_are_filtered() {
        let store = MemoryStore::default()
            .with_location(Location::new(1, "Hot N Spicy", "Fast Food"))
            .with_location(Location::new(2, "Ayan Gardens", "Restaurant"))
            .with_rating(1, "ali", 5)
            .with_rating(2, "sara", 3)
            .with_rating(1, "omar", 4);
        let reviews = store.list_reviews_for(1).expect("infallible");
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|review| review.location_id == 1));
    }
}

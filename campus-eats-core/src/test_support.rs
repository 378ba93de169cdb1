//! In-memory `ReviewStore` implementation and SQLite fixture writers used by
//! unit, behaviour and property tests.

use std::convert::Infallible;

use crate::{Location, LocationQuery, Rating, Review, ReviewStore, UserId};

/// In-memory `ReviewStore` implementation used in tests.
///
/// The store performs linear scans and is intended only for small datasets.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    locations: Vec<Location>,
    reviews: Vec<Review>,
}

impl MemoryStore {
    /// Create a store from collections of locations and reviews.
    pub fn with_data<L, R>(locations: L, reviews: R) -> Self
    where
        L: IntoIterator<Item = Location>,
        R: IntoIterator<Item = Review>,
    {
        Self {
            locations: locations.into_iter().collect(),
            reviews: reviews.into_iter().collect(),
        }
    }

    /// Add a location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Add a review as-is.
    #[must_use]
    pub fn with_review(mut self, review: Review) -> Self {
        self.reviews.push(review);
        self
    }

    /// Add a review dated at the epoch with the next free review id.
    ///
    /// # Panics
    /// Panics when `stars` is not a valid [`Rating`].
    #[must_use]
    pub fn with_rating(self, location_id: u64, user: &str, stars: u8) -> Self {
        self.with_rating_at(location_id, user, stars, 0)
    }

    /// Add a review created at `created_at` with the next free review id.
    ///
    /// # Panics
    /// Panics when `stars` is not a valid [`Rating`].
    #[must_use]
    pub fn with_rating_at(mut self, location_id: u64, user: &str, stars: u8, created_at: u64) -> Self {
        let rating = Rating::new(stars).unwrap_or_else(|err| panic!("test rating: {err}"));
        let id = self.reviews.iter().map(|review| review.id).max().unwrap_or(0) + 1;
        self.reviews.push(Review::new(
            id,
            location_id,
            UserId::new(user),
            rating,
            created_at,
        ));
        self
    }

    /// Borrow the stored locations.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Borrow the stored reviews.
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }
}

impl ReviewStore for MemoryStore {
    type Error = Infallible;

    fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, Self::Error> {
        let mut found: Vec<Location> = self
            .locations
            .iter()
            .filter(|location| query.matches(location))
            .cloned()
            .collect();
        found.sort_unstable_by_key(|location| location.id);
        Ok(found)
    }

    fn list_reviews(&self) -> Result<Vec<Review>, Self::Error> {
        let mut reviews = self.reviews.clone();
        reviews.sort_unstable_by_key(|review| review.id);
        Ok(reviews)
    }
}

#[cfg(feature = "store-sqlite")]
pub use sqlite_fixtures::{create_schema, write_sqlite_database};

#[cfg(feature = "store-sqlite")]
mod sqlite_fixtures {
    use std::path::Path;

    use rusqlite::{Connection, params};

    use crate::{Location, Review};

    /// Create the `place` and `review` tables used by the dining application.
    pub fn create_schema(connection: &Connection) -> rusqlite::Result<()> {
        connection.execute_batch(
            "CREATE TABLE place (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT,
                tags TEXT,
                description TEXT,
                price_tier INTEGER
            );
            CREATE TABLE review (
                id INTEGER PRIMARY KEY,
                place_id INTEGER NOT NULL REFERENCES place(id),
                user_id TEXT NOT NULL,
                rating INTEGER NOT NULL,
                text TEXT,
                created_at INTEGER NOT NULL
            );",
        )
    }

    /// Write `locations` and `reviews` into a fresh SQLite database at `path`.
    ///
    /// Review timestamps are stored in milliseconds, as the dining
    /// application writes them.
    pub fn write_sqlite_database(
        path: &Path,
        locations: &[Location],
        reviews: &[Review],
    ) -> rusqlite::Result<()> {
        let mut connection = Connection::open(path)?;
        create_schema(&connection)?;
        let tx = connection.transaction()?;
        {
            let mut insert_place = tx.prepare(
                "INSERT INTO place (id, name, type, tags, description, price_tier)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for location in locations {
                let tags = location.tags.iter().cloned().collect::<Vec<_>>().join(", ");
                insert_place.execute(params![
                    location.id,
                    location.name,
                    location.category,
                    tags,
                    location.description,
                    location.price_tier.map(|tier| tier.get()),
                ])?;
            }
            let mut insert_review = tx.prepare(
                "INSERT INTO review (id, place_id, user_id, rating, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for review in reviews {
                insert_review.execute(params![
                    review.id,
                    review.location_id,
                    review.user_id.as_str(),
                    review.rating.get(),
                    review.comment,
                    review.created_at.saturating_mul(1_000),
                ])?;
            }
        }
        tx.commit()
    }
}

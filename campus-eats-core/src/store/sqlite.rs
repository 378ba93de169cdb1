//! SQLite-backed store reading the dining application's database.
//!
//! The database is opened read-only. Every query runs against the live
//! connection, so each request observes the current table contents.
//!
//! The application writes `review.created_at` in milliseconds since the Unix
//! epoch. Reviews leave this module with whole seconds.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::warn;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use thiserror::Error;

use crate::{
    Location, LocationQuery, PriceTier, PriceTierError, Rating, RatingError, Review, UserId,
    parse_tags,
};

use super::ReviewStore;

const SELECT_REVIEWS_SQL: &str = "SELECT id, place_id, user_id, rating, text, created_at
     FROM review ORDER BY id";
const MILLIS_PER_SECOND: u64 = 1_000;
const COUNT_DANGLING_REVIEWS_SQL: &str = "SELECT COUNT(*) FROM review
     LEFT JOIN place ON place.id = review.place_id
     WHERE place.id IS NULL";

/// Error raised when reading locations or reviews from SQLite.
#[derive(Debug, Error)]
pub enum SqliteReviewStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a query failed.
    #[error("failed to {operation}: {source}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A review row carried a rating outside the supported range.
    #[error("review {review_id} has an invalid rating: {source}")]
    InvalidRating {
        /// Identifier of the offending review.
        review_id: u64,
        /// Validation failure.
        #[source]
        source: RatingError,
    },
    /// A place row carried an unsupported price tier.
    #[error("location {location_id} has an invalid price tier: {source}")]
    InvalidPriceTier {
        /// Identifier of the offending location.
        location_id: u64,
        /// Validation failure.
        #[source]
        source: PriceTierError,
    },
    /// A review row carried a negative creation timestamp.
    #[error("review {review_id} has a negative timestamp {raw}")]
    InvalidTimestamp {
        /// Identifier of the offending review.
        review_id: u64,
        /// Raw value read from the database.
        raw: i64,
    },
    /// A previous panic while holding the connection poisoned its lock.
    #[error("SQLite connection lock was poisoned")]
    ConnectionPoisoned,
}

/// Read-only review store backed by the `place` and `review` tables.
pub struct SqliteReviewStore {
    connection: Mutex<Connection>,
    has_price_tier: bool,
    has_description: bool,
}

impl fmt::Debug for SqliteReviewStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteReviewStore")
            .field("has_price_tier", &self.has_price_tier)
            .field("has_description", &self.has_description)
            .finish_non_exhaustive()
    }
}

impl SqliteReviewStore {
    /// Open the database at `path` read-only.
    ///
    /// Databases written before the `price_tier` or `description` columns
    /// existed are accepted; their locations report neither.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteReviewStoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteReviewStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        let has_price_tier = has_column(&connection, "place", "price_tier")?;
        let has_description = has_column(&connection, "place", "description")?;
        Ok(Self {
            connection: Mutex::new(connection),
            has_price_tier,
            has_description,
        })
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteReviewStoreError>,
    ) -> Result<T, SqliteReviewStoreError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| SqliteReviewStoreError::ConnectionPoisoned)?;
        f(&connection)
    }
}

impl ReviewStore for SqliteReviewStore {
    type Error = SqliteReviewStoreError;

    fn list_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, Self::Error> {
        if query.price_tier.is_some() && !self.has_price_tier {
            return Ok(Vec::new());
        }
        let price_column = if self.has_price_tier {
            "price_tier"
        } else {
            "NULL"
        };
        let description_column = if self.has_description {
            "description"
        } else {
            "NULL"
        };
        let sql = format!(
            "SELECT id, name, type, tags, {price_column}, {description_column} FROM place
             WHERE (?1 IS NULL OR lower(trim(type)) = lower(trim(?1)))
               AND (?2 IS NULL OR {price_column} = ?2)
             ORDER BY id"
        );
        let category = query.category.as_deref();
        let tier = query.price_tier.map(PriceTier::get);

        self.with_connection(|connection| {
            let mut statement =
                connection
                    .prepare(&sql)
                    .map_err(|source| SqliteReviewStoreError::Query {
                        operation: "prepare location selection",
                        source,
                    })?;
            let mut rows = statement.query((category, tier)).map_err(|source| {
                SqliteReviewStoreError::Query {
                    operation: "query locations",
                    source,
                }
            })?;
            let mut locations = Vec::new();
            while let Some(row) = rows.next().map_err(|source| SqliteReviewStoreError::Query {
                operation: "read location row",
                source,
            })? {
                locations.push(location_from_row(row)?);
            }
            Ok(locations)
        })
    }

    fn list_reviews(&self) -> Result<Vec<Review>, Self::Error> {
        self.with_connection(|connection| {
            warn_on_dangling_reviews(connection)?;
            let mut statement = connection.prepare_cached(SELECT_REVIEWS_SQL).map_err(
                |source| SqliteReviewStoreError::Query {
                    operation: "prepare review selection",
                    source,
                },
            )?;
            let mut rows = statement
                .query([])
                .map_err(|source| SqliteReviewStoreError::Query {
                    operation: "query reviews",
                    source,
                })?;
            let mut reviews = Vec::new();
            while let Some(row) = rows.next().map_err(|source| SqliteReviewStoreError::Query {
                operation: "read review row",
                source,
            })? {
                reviews.push(review_from_row(row)?);
            }
            Ok(reviews)
        })
    }
}

fn read_error(source: rusqlite::Error) -> SqliteReviewStoreError {
    SqliteReviewStoreError::Query {
        operation: "decode column",
        source,
    }
}

fn location_from_row(row: &Row<'_>) -> Result<Location, SqliteReviewStoreError> {
    let id: u64 = row.get(0).map_err(read_error)?;
    let name: String = row.get(1).map_err(read_error)?;
    let category: Option<String> = row.get(2).map_err(read_error)?;
    let tags: Option<String> = row.get(3).map_err(read_error)?;
    let raw_tier: Option<i64> = row.get(4).map_err(read_error)?;
    let description: Option<String> = row.get(5).map_err(read_error)?;

    let mut location = Location::new(id, name, category.unwrap_or_default());
    location.tags = tags.as_deref().map(parse_tags).unwrap_or_default();
    location.description = description.filter(|text| !text.trim().is_empty());
    location.price_tier = raw_tier
        .map(PriceTier::try_from)
        .transpose()
        .map_err(|source| SqliteReviewStoreError::InvalidPriceTier {
            location_id: id,
            source,
        })?;
    Ok(location)
}

fn review_from_row(row: &Row<'_>) -> Result<Review, SqliteReviewStoreError> {
    let id: u64 = row.get(0).map_err(read_error)?;
    let location_id: u64 = row.get(1).map_err(read_error)?;
    let user_id: String = row.get(2).map_err(read_error)?;
    let raw_rating: i64 = row.get(3).map_err(read_error)?;
    let comment: Option<String> = row.get(4).map_err(read_error)?;
    let raw_created_at: Option<i64> = row.get(5).map_err(read_error)?;

    let rating = Rating::try_from(raw_rating)
        .map_err(|source| SqliteReviewStoreError::InvalidRating { review_id: id, source })?;
    let created_at = raw_created_at
        .map(|raw| {
            u64::try_from(raw)
                .map(|millis| millis / MILLIS_PER_SECOND)
                .map_err(|_| SqliteReviewStoreError::InvalidTimestamp {
                    review_id: id,
                    raw,
                })
        })
        .transpose()?
        .unwrap_or(0);

    let mut review = Review::new(id, location_id, UserId::new(user_id), rating, created_at);
    review.comment = comment.filter(|text| !text.trim().is_empty());
    Ok(review)
}

fn has_column(
    connection: &Connection,
    table: &str,
    column: &str,
) -> Result<bool, SqliteReviewStoreError> {
    connection
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2 LIMIT 1",
            (table, column),
            |_| Ok(true),
        )
        .optional()
        .map(|found| found.unwrap_or(false))
        .map_err(|source| SqliteReviewStoreError::Query {
            operation: "probe table columns",
            source,
        })
}

fn warn_on_dangling_reviews(connection: &Connection) -> Result<(), SqliteReviewStoreError> {
    let dangling: i64 = connection
        .query_row(COUNT_DANGLING_REVIEWS_SQL, [], |row| row.get(0))
        .map_err(|source| SqliteReviewStoreError::Query {
            operation: "count dangling reviews",
            source,
        })?;
    if dangling > 0 {
        warn!("{dangling} reviews reference locations missing from the place table");
    }
    Ok(())
}

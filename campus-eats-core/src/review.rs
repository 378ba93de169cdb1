//! User reviews of dining locations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LocationId;

/// Identifier of a [`Review`].
pub type ReviewId = u64;

/// Opaque, stable identifier of the user a request is made for.
///
/// The engine never interprets the value; unknown users simply receive
/// unpersonalised results.
///
/// # Examples
/// ```
/// use campus_eats_core::UserId;
///
/// let user = UserId::new("c0ffee");
/// assert_eq!(user.as_str(), "c0ffee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A star rating between [`Rating::MIN`] and [`Rating::MAX`] inclusive.
///
/// # Examples
/// ```
/// use campus_eats_core::Rating;
///
/// assert_eq!(Rating::new(4).map(Rating::get), Ok(4));
/// assert!(Rating::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Rating(u8);

/// Errors returned when constructing a [`Rating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingError {
    /// The value was outside the supported star range.
    #[error("rating {0} is outside 1..=5")]
    OutOfRange(i64),
}

impl Rating {
    /// Lowest rating a user can give.
    pub const MIN: u8 = 1;
    /// Highest rating a user can give.
    pub const MAX: u8 = 5;

    /// Validate and construct a rating.
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(i64::from(value)))
        }
    }

    /// Return the number of stars.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Return the rating as a float for averaging.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| RatingError::OutOfRange(value))
            .and_then(Self::new)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A user-submitted rating, with optional comment, for a location.
///
/// # Examples
/// ```
/// use campus_eats_core::{Rating, Review, UserId};
///
/// # fn main() -> Result<(), campus_eats_core::RatingError> {
/// let review = Review::new(7, 1, UserId::new("ali"), Rating::new(5)?, 1_700_000_000)
///     .with_comment("Best chai on campus");
/// assert_eq!(review.location_id, 1);
/// assert_eq!(review.comment.as_deref(), Some("Best chai on campus"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Review {
    /// Unique identifier.
    pub id: ReviewId,
    /// Reviewed location.
    pub location_id: LocationId,
    /// Author of the review.
    pub user_id: UserId,
    /// Star rating.
    pub rating: Rating,
    /// Optional free-text comment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
}

impl Review {
    /// Construct a review without a comment.
    pub const fn new(
        id: ReviewId,
        location_id: LocationId,
        user_id: UserId,
        rating: Rating,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            location_id,
            user_id,
            rating,
            comment: None,
            created_at,
        }
    }

    /// Attach a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Report whether `user` wrote this review.
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

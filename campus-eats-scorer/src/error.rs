//! Error types raised by the recommendation engine.
#![forbid(unsafe_code)]

use campus_eats_core::FilterError;
use thiserror::Error;

/// Errors raised while answering a recommendation request.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Caller-supplied filters failed validation.
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
    /// The backing review store failed to answer a read.
    #[error("review store read failed")]
    Store {
        /// Error raised by the store implementation.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl RecommendError {
    /// Wrap a store failure.
    pub(crate) fn store<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store {
            source: Box::new(source),
        }
    }
}

/// Errors raised when a [`ScoringConfig`](crate::ScoringConfig) is unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The prior score was NaN or infinite.
    #[error("prior score {0} must be finite")]
    NonFinitePrior(f64),
    /// The confidence constant was not a finite positive value.
    #[error("confidence constant {0} must be finite and greater than zero")]
    InvalidConfidenceK(f64),
    /// Recency decay was configured with a zero half-life.
    #[error("recency half-life must be greater than zero")]
    ZeroHalfLife,
}

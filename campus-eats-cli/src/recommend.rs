//! Recommend command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use campus_eats_core::{
    FilterError, FilterKey, PriceTier, RecommendationFilters, SqliteReviewStore, UserId,
    parse_tags,
};
use campus_eats_scorer::{RecencyDecay, Recommender, ScoringConfig};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DB, ARG_USER, CliError, DEFAULT_DB, ENV_RECOMMEND_USER, require_existing, write_json};

/// Half-life applied when only a recency horizon is given.
pub(crate) const DEFAULT_RECENCY_HALF_LIFE_DAYS: u64 = 90;

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank dining locations for a user. Each location's mean \
                 rating is shrunk towards the campus-wide mean according to \
                 how many reviews it has, and the user's own reviews are \
                 left out of the statistics.",
    about = "Rank dining locations for a user"
)]
#[ortho_config(prefix = "CAMPUS_EATS")]
pub(crate) struct RecommendArgs {
    /// Path to the review database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Identifier of the user asking for recommendations.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Only consider locations in this category (case-insensitive).
    #[arg(long, value_name = "name")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Only consider locations at this price tier (1-4).
    #[arg(long, value_name = "tier")]
    #[serde(default)]
    pub(crate) price_tier: Option<u8>,
    /// Minimum mean rating (1-5).
    #[arg(long, value_name = "stars")]
    #[serde(default)]
    pub(crate) min_rating: Option<f64>,
    /// Comma-separated tags; a location matching any of them is kept.
    #[arg(long, value_name = "list")]
    #[serde(default)]
    pub(crate) tags: Option<String>,
    /// Drop locations the user has already reviewed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "bool")]
    #[serde(default)]
    pub(crate) exclude_visited: Option<bool>,
    /// Maximum number of results.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Pseudo-count controlling how quickly confidence grows.
    #[arg(long, value_name = "k")]
    #[serde(default)]
    pub(crate) confidence_k: Option<f64>,
    /// Score for locations nobody else has reviewed.
    #[arg(long, value_name = "score")]
    #[serde(default)]
    pub(crate) prior_score: Option<f64>,
    /// Reviews younger than this many days keep full weight.
    #[arg(long, value_name = "days")]
    #[serde(default)]
    pub(crate) recency_horizon_days: Option<u64>,
    /// Past the horizon, review weight halves every this many days.
    #[arg(long, value_name = "days")]
    #[serde(default)]
    pub(crate) recency_half_life_days: Option<u64>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    /// Path to the review database.
    pub(crate) db: Utf8PathBuf,
    /// Requesting user.
    pub(crate) user: UserId,
    /// Validated filters.
    pub(crate) filters: RecommendationFilters,
    /// Validated scoring parameters.
    pub(crate) scoring: ScoringConfig,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let user = args.user.ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env: ENV_RECOMMEND_USER,
        })?;
        let db = args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB));

        let mut filters = RecommendationFilters::new();
        filters.category = args.category;
        filters.price_tier = args
            .price_tier
            .map(|tier| {
                PriceTier::new(tier).map_err(|_| FilterError::InvalidValue {
                    key: FilterKey::PriceTier,
                    value: tier.to_string(),
                })
            })
            .transpose()?;
        filters.min_rating = args.min_rating;
        filters.tags = args.tags.as_deref().map(parse_tags).unwrap_or_default();
        filters.exclude_visited = args.exclude_visited.unwrap_or(false);
        filters.limit = args.limit;
        filters.validate()?;

        let mut scoring = ScoringConfig::default();
        if let Some(prior_score) = args.prior_score {
            scoring = scoring.with_prior_score(prior_score);
        }
        if let Some(confidence_k) = args.confidence_k {
            scoring = scoring.with_confidence_k(confidence_k);
        }
        if args.recency_horizon_days.is_some() || args.recency_half_life_days.is_some() {
            let decay = RecencyDecay::from_days(
                args.recency_horizon_days.unwrap_or(0),
                args.recency_half_life_days
                    .unwrap_or(DEFAULT_RECENCY_HALF_LIFE_DAYS),
            );
            scoring = scoring.with_recency(decay);
        }
        let scoring = scoring.validate()?;

        Ok(Self {
            db,
            user: UserId::new(user),
            filters,
            scoring,
        })
    }
}

pub(crate) fn run_recommend(args: RecommendArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_recommend(&config, writer)
}

pub(crate) fn execute_recommend(
    config: &RecommendConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.db, ARG_DB)?;
    let store = SqliteReviewStore::open(config.db.as_std_path())?;
    let recommender = Recommender::new(store, config.scoring)?;
    let ranked = recommender.recommend(&config.user, Some(&config.filters))?;
    write_json(writer, &ranked)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendConfig::try_from(merged)
}

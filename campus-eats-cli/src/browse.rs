//! `similar`, `also-liked` and `trending` command implementations.

use std::io::Write;

use camino::Utf8PathBuf;
use campus_eats_core::{LocationId, SqliteReviewStore};
use campus_eats_scorer::Recommender;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DB, ARG_LOCATION_ID, CliError, DEFAULT_DB, DEFAULT_LIMIT, ENV_ALSO_LIKED_LOCATION_ID,
    ENV_SIMILAR_LOCATION_ID, require_existing, write_json,
};

/// CLI arguments for the `similar` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List locations sharing tags, category or description words \
                 with a reference location, most similar first.",
    about = "List locations resembling a given location"
)]
#[ortho_config(prefix = "CAMPUS_EATS")]
pub(crate) struct SimilarArgs {
    /// Identifier of the reference location.
    #[arg(value_name = "location-id")]
    #[serde(default)]
    pub(crate) location_id: Option<LocationId>,
    /// Path to the review database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// CLI arguments for the `also-liked` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List locations rated alike by the people who reviewed a \
                 reference location, most similar first.",
    about = "List locations reviewers of a given location also liked"
)]
#[ortho_config(prefix = "CAMPUS_EATS")]
pub(crate) struct AlsoLikedArgs {
    /// Identifier of the reference location.
    #[arg(value_name = "location-id")]
    #[serde(default)]
    pub(crate) location_id: Option<LocationId>,
    /// Path to the review database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// CLI arguments for the `trending` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the most-reviewed locations")]
#[ortho_config(prefix = "CAMPUS_EATS")]
pub(crate) struct TrendingArgs {
    /// Path to the review database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Maximum number of results.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

fn open_recommender(db: Option<Utf8PathBuf>) -> Result<Recommender<SqliteReviewStore>, CliError> {
    let db = db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB));
    require_existing(&db, ARG_DB)?;
    let store = SqliteReviewStore::open(db.as_std_path())?;
    Ok(Recommender::with_default_config(store))
}

pub(crate) fn run_similar(args: SimilarArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let location_id = merged.location_id.ok_or(CliError::MissingArgument {
        field: ARG_LOCATION_ID,
        env: ENV_SIMILAR_LOCATION_ID,
    })?;
    let recommender = open_recommender(merged.db)?;
    let similar =
        recommender.similar_locations(location_id, merged.limit.unwrap_or(DEFAULT_LIMIT))?;
    write_json(writer, &similar)
}

pub(crate) fn run_also_liked(args: AlsoLikedArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let location_id = merged.location_id.ok_or(CliError::MissingArgument {
        field: ARG_LOCATION_ID,
        env: ENV_ALSO_LIKED_LOCATION_ID,
    })?;
    let recommender = open_recommender(merged.db)?;
    let liked = recommender.also_liked(location_id, merged.limit.unwrap_or(DEFAULT_LIMIT))?;
    write_json(writer, &liked)
}

pub(crate) fn run_trending(args: TrendingArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let recommender = open_recommender(merged.db)?;
    let trending = recommender.trending(merged.limit.unwrap_or(DEFAULT_LIMIT))?;
    write_json(writer, &trending)
}

//! Command-line interface for the campus dining recommendation engine.
//!
//! Every subcommand reads a review database written by the dining
//! application and prints its answer as pretty JSON. Options are layered
//! with `ortho_config`: defaults, then configuration files, then
//! `CAMPUS_EATS_*` environment variables, then flags.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod browse;
mod error;
mod fs;
mod recommend;

pub use error::CliError;

use browse::{
    AlsoLikedArgs, SimilarArgs, TrendingArgs, run_also_liked, run_similar, run_trending,
};
use recommend::{RecommendArgs, run_recommend};

pub(crate) const ARG_DB: &str = "db";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_LOCATION_ID: &str = "location-id";
pub(crate) const ENV_RECOMMEND_USER: &str = "CAMPUS_EATS_CMDS_RECOMMEND_USER";
pub(crate) const ENV_SIMILAR_LOCATION_ID: &str = "CAMPUS_EATS_CMDS_SIMILAR_LOCATION_ID";
pub(crate) const ENV_ALSO_LIKED_LOCATION_ID: &str = "CAMPUS_EATS_CMDS_ALSO_LIKED_LOCATION_ID";
pub(crate) const DEFAULT_DB: &str = "campuseats.db";
pub(crate) const DEFAULT_LIMIT: usize = 10;

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// database cannot be read, or the output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Recommend(args) => run_recommend(args, writer),
        Command::Similar(args) => run_similar(args, writer),
        Command::AlsoLiked(args) => run_also_liked(args, writer),
        Command::Trending(args) => run_trending(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "campus-eats",
    about = "Recommend campus dining locations from user reviews",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank locations for a user.
    Recommend(RecommendArgs),
    /// List locations resembling a given location.
    Similar(SimilarArgs),
    /// List locations reviewers of a given location also liked.
    AlsoLiked(AlsoLikedArgs),
    /// List the most-reviewed locations.
    Trending(TrendingArgs),
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;

//! # Terminal Views
//!
//! Binds the query layer to plain-text output. Each command resolves one or
//! more queries, runs any client-side derivation, and renders the result.
//! No logic lives here beyond choosing what to show.

pub mod render;

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use log::info;

use crate::core::cache::QueryCache;
use crate::core::config::ResolvedConfig;
use crate::core::explore::{CONTINENTS, ContinentFilter, ExploreParams, SortKey, explore};
use crate::core::queries::CountryQueries;
use crate::data::{RestCountriesClient, UpstreamError};

const DETAIL_WIDTH: usize = 80;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List countries, optionally filtered and sorted
    Explore {
        /// Matches names and capitals (substring) or codes (exact)
        #[arg(short, long, default_value = "")]
        query: String,
        /// Continent name, or "All"
        #[arg(short, long, default_value = "All")]
        continent: String,
        #[arg(short, long, default_value_t, value_enum)]
        sort: SortKey,
    },
    /// Show the detail page for one country
    Show {
        /// 2- or 3-letter country code
        code: String,
    },
    /// List the featured countries
    Featured,
    /// List the continent filter choices
    Continents,
}

#[derive(Debug)]
pub enum CliError {
    NotFound(String),
    Upstream(UpstreamError),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound(code) => write!(f, "no country found for code '{code}'"),
            CliError::Upstream(e) => write!(f, "could not load country data: {e}"),
            CliError::Io(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<UpstreamError> for CliError {
    fn from(e: UpstreamError) -> Self {
        CliError::Upstream(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Builds the query layer from resolved config and runs `command` against stdout.
pub async fn run(command: Command, config: &ResolvedConfig) -> Result<(), CliError> {
    let source = Arc::new(RestCountriesClient::new(Some(config.base_url.clone())));
    let cache = Arc::new(QueryCache::new(config.stale_policy.clone()));
    let queries = CountryQueries::new(source, cache);

    let mut buffer = Vec::new();
    execute(command, &queries, &mut buffer).await?;
    std::io::stdout().write_all(&buffer)?;
    Ok(())
}

/// Runs one command, writing its view to `out`.
pub async fn execute<W: Write>(
    command: Command,
    queries: &CountryQueries,
    out: &mut W,
) -> Result<(), CliError> {
    info!("Running command: {:?}", command);
    match command {
        Command::Explore {
            query,
            continent,
            sort,
        } => {
            let countries = queries.all_countries().await?;
            let params = ExploreParams {
                query,
                continent: ContinentFilter::from(continent.as_str()),
                sort,
            };
            let shown = explore(&countries, &params);
            if shown.is_empty() {
                writeln!(out, "No countries found. Try adjusting your search or filters.")?;
            } else {
                write!(out, "{}", render::render_table(&shown))?;
                writeln!(out, "\n{} countries found", shown.len())?;
            }
        }
        Command::Show { code } => {
            let country = match queries.country(&code).await {
                Ok(Some(country)) => country,
                Ok(None) => return Err(CliError::NotFound(code)),
                Err(e) if e.is_not_found() => return Err(CliError::NotFound(code)),
                Err(e) => return Err(e.into()),
            };
            let borders = queries.border_countries(country.borders.as_slice()).await?;
            let borders = borders.as_deref().map(Vec::as_slice);
            let page = render::render_detail(&country, borders, DETAIL_WIDTH);
            write!(out, "{page}")?;
        }
        Command::Featured => {
            let featured = queries.featured_countries().await?;
            let refs: Vec<_> = featured.iter().collect();
            write!(out, "{}", render::render_table(&refs))?;
        }
        Command::Continents => {
            for continent in CONTINENTS {
                writeln!(out, "{continent}")?;
            }
        }
    }
    Ok(())
}

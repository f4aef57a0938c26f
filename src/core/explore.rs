//! # Explore Pipeline
//!
//! Derives the displayed list from the full country list and the current
//! view parameters. Pure and synchronous; rerun it on every parameter change.
//!
//! ```text
//! countries ─▶ continent filter ─▶ text filter ─▶ stable sort ─▶ Vec<&Country>
//! ```

use std::cmp::Ordering;
use std::fmt;

use clap::ValueEnum;

use crate::data::Country;

/// Continent filter choices, in display order. `"All"` is the pass-through.
pub const CONTINENTS: &[&str] = &[
    "All",
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "South America",
    "Oceania",
    "Antarctica",
];

const ALL_CONTINENTS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContinentFilter {
    #[default]
    All,
    /// Exact, case-sensitive continent name.
    Only(String),
}

impl From<&str> for ContinentFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CONTINENTS {
            ContinentFilter::All
        } else {
            ContinentFilter::Only(value.to_string())
        }
    }
}

impl fmt::Display for ContinentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinentFilter::All => f.write_str(ALL_CONTINENTS),
            ContinentFilter::Only(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Common name, alphabetical.
    #[default]
    Name,
    /// Largest population first.
    Population,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreParams {
    pub query: String,
    pub continent: ContinentFilter,
    pub sort: SortKey,
}

/// Filters and sorts `countries` for display. The input is left untouched.
pub fn explore<'a>(countries: &'a [Country], params: &ExploreParams) -> Vec<&'a Country> {
    // Whitespace alone disables the text filter; otherwise the query is
    // matched as typed, surrounding spaces included.
    let searching = !params.query.trim().is_empty();
    let query = params.query.to_lowercase();

    let mut result: Vec<&Country> = countries
        .iter()
        .filter(|c| in_continent(c, &params.continent))
        .filter(|c| !searching || matches_query(c, &query))
        .collect();

    // `sort_by` is stable: equal elements keep their input order.
    match params.sort {
        SortKey::Name => result.sort_by(|a, b| collate(&a.name.common, &b.name.common)),
        SortKey::Population => result.sort_by(|a, b| b.population.cmp(&a.population)),
    }

    result
}

fn in_continent(country: &Country, filter: &ContinentFilter) -> bool {
    match filter {
        ContinentFilter::All => true,
        ContinentFilter::Only(name) => country.continents.iter().any(|c| c == name),
    }
}

/// `query` must already be lower-cased.
fn matches_query(country: &Country, query: &str) -> bool {
    country.name.common.to_lowercase().contains(query)
        || country.name.official.to_lowercase().contains(query)
        || country
            .capital
            .iter()
            .any(|cap| cap.to_lowercase().contains(query))
        || country.cca2.to_lowercase() == query
        || country.cca3.to_lowercase() == query
}

/// Locale-style string ordering: accents and case are ignored first. Ties
/// are broken per character with lower case before upper case, then by code
/// point, so `cuba` sorts before `Cuba` and `Curacao` before `Curaçao`.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| {
        let tertiary = |c: char| (c.is_uppercase(), c);
        a.chars().map(tertiary).cmp(b.chars().map(tertiary))
    })
}

/// Lower-cases and strips diacritics from Latin letters.
fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => out.push('a'),
            'æ' => out.push_str("ae"),
            'ç' | 'ć' | 'č' => out.push('c'),
            'ď' | 'đ' => out.push('d'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => out.push('e'),
            'ğ' => out.push('g'),
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => out.push('i'),
            'ł' => out.push('l'),
            'ñ' | 'ń' | 'ň' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => out.push('o'),
            'œ' => out.push_str("oe"),
            'ř' => out.push('r'),
            'ś' | 'š' | 'ş' => out.push('s'),
            'ß' => out.push_str("ss"),
            'ť' | 'ţ' => out.push('t'),
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'ź' | 'ż' | 'ž' => out.push('z'),
            other => out.push(other),
        }
    }
    out
}

//! Plain-text rendering of country lists and detail pages.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::format::{format_area, format_population};
use crate::data::Country;

const NAME_COLUMN: usize = 32;
const CAPITAL_COLUMN: usize = 20;
const LABEL_COLUMN: usize = 14;
const NOT_AVAILABLE: &str = "N/A";

/// Truncates to `width` display columns (with an ellipsis) and pads the rest.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let padding = width - text.width();
        return format!("{text}{}", " ".repeat(padding));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) { "Yes" } else { "No" }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn or_na(values: Vec<String>) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join(", ")
    }
}

/// One line per country: name, cca3, capital, population, currencies.
pub fn render_table(countries: &[&Country]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {:<4} {} {:>8}  {}\n",
        fit("Name", NAME_COLUMN),
        "Code",
        fit("Capital", CAPITAL_COLUMN),
        "Pop.",
        "Currency"
    ));
    for country in countries {
        let capital = country
            .capital
            .first()
            .map(String::as_str)
            .unwrap_or(NOT_AVAILABLE);
        let currencies = country.currency_names();
        let currencies = if currencies.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            currencies.join(", ")
        };
        out.push_str(&format!(
            "{} {:<4} {} {:>8}  {}\n",
            fit(&country.name.common, NAME_COLUMN),
            country.cca3,
            fit(capital, CAPITAL_COLUMN),
            format_population(country.population),
            currencies
        ));
    }
    out
}

/// Labelled facts shown on a detail page, in display order.
pub fn detail_facts(country: &Country) -> Vec<(&'static str, String)> {
    let region = match &country.subregion {
        Some(sub) => format!("{} — {sub}", country.region),
        None => country.region.clone(),
    };
    let currencies = country
        .currencies
        .iter()
        .flat_map(|m| m.values())
        .map(|c| match &c.symbol {
            Some(symbol) => format!("{} ({symbol})", c.name),
            None => c.name.clone(),
        })
        .collect();

    vec![
        ("Capital", or_na(country.capital.clone())),
        ("Population", format_population(country.population)),
        ("Area", format_area(country.area)),
        ("Region", region),
        (
            "Languages",
            or_na(country.language_names().into_iter().map(String::from).collect()),
        ),
        ("Currencies", or_na(currencies)),
        ("Timezones", or_na(country.timezones.clone().unwrap_or_default())),
        ("Landlocked", yes_no(country.landlocked).to_string()),
        (
            "Drives on",
            country
                .car
                .as_ref()
                .and_then(|car| car.side.as_deref())
                .map(capitalize)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        (
            "Start of Week",
            country
                .start_of_week
                .as_deref()
                .map(capitalize)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        ("UN Member", yes_no(country.un_member).to_string()),
        ("Independent", yes_no(country.independent).to_string()),
    ]
}

/// Full detail page. `borders` is `None` when the country has no neighbours.
pub fn render_detail(country: &Country, borders: Option<&[Country]>, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", country.name.common, country.cca3));
    out.push_str(&format!("{}\n\n", country.name.official));

    let indent = " ".repeat(LABEL_COLUMN + 2);
    let value_width = width.max(LABEL_COLUMN + 20);
    for (label, value) in detail_facts(country) {
        let first = format!("{}  ", fit(label, LABEL_COLUMN));
        let options = textwrap::Options::new(value_width)
            .initial_indent(&first)
            .subsequent_indent(&indent);
        out.push_str(&textwrap::fill(&value, options));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "Flag: {}\n",
        country.flags.alt.as_deref().unwrap_or(&country.flags.svg)
    ));
    if let Some(svg) = country.coat_of_arms.as_ref().and_then(|c| c.svg.as_deref()) {
        out.push_str(&format!("Coat of arms: {svg}\n"));
    }
    if let Some(maps) = &country.maps {
        out.push_str(&format!("Google Maps: {}\n", maps.google_maps));
        out.push_str(&format!("OpenStreetMap: {}\n", maps.open_street_maps));
    }

    if let Some(borders) = borders
        && !borders.is_empty()
    {
        let names: Vec<String> = borders
            .iter()
            .map(|b| format!("{} ({})", b.name.common, b.cca3))
            .collect();
        out.push_str("\nNeighbouring countries:\n");
        let options = textwrap::Options::new(value_width)
            .initial_indent("  ")
            .subsequent_indent("  ");
        out.push_str(&textwrap::fill(&names.join(", "), options));
        out.push('\n');
    }
    out
}

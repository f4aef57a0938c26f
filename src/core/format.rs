//! Human-readable numbers for country views.

/// Compact population, e.g. `67.4M`, `1.4B`, `850`. Halves round up.
pub fn format_population(population: u64) -> String {
    if population >= 1_000_000_000 {
        compact(population, 1_000_000_000, 'B')
    } else if population >= 1_000_000 {
        compact(population, 1_000_000, 'M')
    } else if population >= 1_000 {
        compact(population, 1_000, 'K')
    } else {
        population.to_string()
    }
}

/// `value / unit` to one decimal place.
fn compact(value: u64, unit: u64, suffix: char) -> String {
    let tenth = unit / 10;
    let tenths = value.saturating_add(tenth / 2) / tenth;
    format!("{}.{}{suffix}", tenths / 10, tenths % 10)
}

/// Area with thousands separators and at most three decimals, e.g. `551,695 km²`.
pub fn format_area(area: f64) -> String {
    let fixed = format!("{:.3}", area.max(0.0));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = group_thousands(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out.push_str(" km²");
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

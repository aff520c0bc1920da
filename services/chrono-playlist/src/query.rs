//!
//! src/query.rs
//!
//! Splits free text such as "1776, Boston" or "New Amsterdam 1664"
//! into a year and a location
//!

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::PlaylistError;
use crate::types::Query;

// "<year>, <location>" or "<year> <location>"
static YEAR_FIRST: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^([0-9]{4}),?\s+(.+)$"));

// "<location>, <year>" or "<location> <year>"
static YEAR_LAST: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(.+?),?\s+([0-9]{4})$"));

fn pattern(lazy: &'static Lazy<Result<Regex, regex::Error>>) -> Result<&'static Regex, PlaylistError> {
    Lazy::force(lazy)
        .as_ref()
        .map_err(|e| PlaylistError::Config(format!("query pattern: {e}")))
}

pub fn parse_query(input: &str) -> Result<Query, PlaylistError> {
    let text = input.trim();
    let (year_first, year_last) = (pattern(&YEAR_FIRST)?, pattern(&YEAR_LAST)?);

    let parsed = year_first
        .captures(text)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .or_else(|| year_last
            .captures(text)
            .map(|c| (c[2].to_string(), c[1].to_string())));

    let Some((year, location)) = parsed else {
        return Err(rejected(input));
    };

    let location = location.trim().trim_matches(',').trim();
    if location.is_empty() {
        return Err(rejected(input));
    }

    // four ascii digits always fit
    let year = year.parse::<i32>().map_err(|_| rejected(input))?;

    Ok(Query::new(year, location))
}

fn rejected(input: &str) -> PlaylistError {
    tracing::debug!(input, "query.rejected");
    PlaylistError::Parse(format!(
        "could not read a year and location from \"{}\"; try \"1776, Boston\"",
        input.trim()
    ))
}

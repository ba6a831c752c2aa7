//! The two crossword filename conventions.
//!
//! Older uploads are named `YYYY-MM-DD_<Weekday>_<Kind>.pdf`; everything
//! produced today is named `MM-DD-YY-<DOW3> <Kind>.pdf`. Both the downloader
//! and the reconciler go through this module so the grammars live in one
//! place.

mod types;

pub use types::{
    day_token, ArtifactKind, CurrentName, DaySelector, FilenameFormat, WeekdayError,
};

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Legacy patterns, one per artifact kind.
static LEGACY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ArtifactKind::ALL
        .iter()
        .map(|kind| {
            Regex::new(&format!(r"^\d{{4}}-\d{{2}}-\d{{2}}_[A-Za-z]+_{kind}\.pdf$"))
                .expect("legacy filename pattern should compile")
        })
        .collect()
});

/// Current patterns, one per artifact kind.
static CURRENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ArtifactKind::ALL
        .iter()
        .map(|kind| {
            Regex::new(&format!(r"^\d{{2}}-\d{{2}}-\d{{2}}-[A-Z]{{3}}\s{kind}\.pdf$"))
                .expect("current filename pattern should compile")
        })
        .collect()
});

static CURRENT_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}-\d{2}-\d{2})-([A-Z]{3})\s(Puzzle|Solution)\.pdf$")
        .expect("current filename parts pattern should compile")
});

/// Classify a filename by convention. Never fails.
pub fn classify(filename: &str) -> FilenameFormat {
    if LEGACY_PATTERNS.iter().any(|re| re.is_match(filename)) {
        return FilenameFormat::Legacy;
    }

    if CURRENT_PATTERNS.iter().any(|re| re.is_match(filename)) {
        return FilenameFormat::Current;
    }

    FilenameFormat::Unrecognized
}

/// Convert a legacy name to the current convention.
///
/// Returns the input unchanged when it does not split into exactly three
/// `_`-separated parts or when the date is not a real calendar date.
pub fn legacy_to_current(filename: &str) -> String {
    let parts: Vec<&str> = filename.split('_').collect();
    let [long_date, weekday, content] = parts.as_slice() else {
        warn!(filename = %filename, "Filename does not match the legacy layout");
        return filename.to_string();
    };

    let date = match NaiveDate::parse_from_str(long_date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            warn!(filename = %filename, error = %e, "Invalid date in legacy filename");
            return filename.to_string();
        }
    };

    let day: String = weekday.chars().take(3).collect::<String>().to_uppercase();
    format!("{}-{} {}", date.format("%m-%d-%y"), day, content)
}

/// Parse a current-format name into its parts.
pub fn parse_current(filename: &str) -> Option<CurrentName> {
    let caps = CURRENT_PARTS.captures(filename)?;
    Some(CurrentName {
        date: caps[1].to_string(),
        day: caps[2].to_string(),
        kind: ArtifactKind::from_label(&caps[3])?,
    })
}

/// Current-format name for an artifact published on `date`.
pub fn current_name(date: NaiveDate, kind: ArtifactKind) -> String {
    CurrentName {
        date: date.format("%m-%d-%y").to_string(),
        day: day_token(date.weekday()).to_string(),
        kind,
    }
    .to_string()
}

//! Types shared by the two filename conventions.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error types for weekday selection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WeekdayError {
    #[error("Invalid weekday: {0} (expected a name like 'sun' or an index 0-6, Monday = 0)")]
    Invalid(String),
}

/// The two documents published for each date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Puzzle,
    Solution,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Puzzle, ArtifactKind::Solution];

    /// The literal used in filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Puzzle => "Puzzle",
            ArtifactKind::Solution => "Solution",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Puzzle" => Some(ArtifactKind::Puzzle),
            "Solution" => Some(ArtifactKind::Solution),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which naming convention a filename follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilenameFormat {
    /// `YYYY-MM-DD_<Weekday>_<Kind>.pdf`
    Legacy,
    /// `MM-DD-YY-<DOW3> <Kind>.pdf`
    Current,
    Unrecognized,
}

/// A parsed current-format filename.
///
/// The date is kept as the literal `MM-DD-YY` text from the name so that
/// rebuilding a name never reformats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentName {
    pub date: String,
    pub day: String,
    pub kind: ArtifactKind,
}

impl CurrentName {
    /// Name used in the local mirror: the current name without its day token.
    pub fn local_name(&self) -> String {
        format!("{} {}.pdf", self.date, self.kind)
    }
}

impl fmt::Display for CurrentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}.pdf", self.date, self.day, self.kind)
    }
}

/// Weekday selector for the weekly mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySelector(pub Weekday);

impl DaySelector {
    /// Three-letter upper-case token as it appears in current-format names.
    pub fn token(&self) -> &'static str {
        day_token(self.0)
    }
}

impl Default for DaySelector {
    fn default() -> Self {
        Self(Weekday::Sun)
    }
}

impl fmt::Display for DaySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DaySelector {
    type Err = WeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            let weekday = match index {
                0 => Weekday::Mon,
                1 => Weekday::Tue,
                2 => Weekday::Wed,
                3 => Weekday::Thu,
                4 => Weekday::Fri,
                5 => Weekday::Sat,
                6 => Weekday::Sun,
                _ => return Err(WeekdayError::Invalid(s.to_string())),
            };
            return Ok(Self(weekday));
        }

        trimmed
            .parse::<Weekday>()
            .map(Self)
            .map_err(|_| WeekdayError::Invalid(s.to_string()))
    }
}

/// Three-letter upper-case token for a weekday.
pub fn day_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_selector_from_index() {
        assert_eq!("0".parse::<DaySelector>().unwrap().0, Weekday::Mon);
        assert_eq!("6".parse::<DaySelector>().unwrap().0, Weekday::Sun);
        assert!("7".parse::<DaySelector>().is_err());
    }

    #[test]
    fn test_day_selector_from_name() {
        assert_eq!("sun".parse::<DaySelector>().unwrap().0, Weekday::Sun);
        assert_eq!("Sunday".parse::<DaySelector>().unwrap().0, Weekday::Sun);
        assert_eq!("WED".parse::<DaySelector>().unwrap().0, Weekday::Wed);
        assert!("someday".parse::<DaySelector>().is_err());
    }

    #[test]
    fn test_default_selector_is_sunday() {
        assert_eq!(DaySelector::default().token(), "SUN");
    }

    #[test]
    fn test_local_name_drops_day_token() {
        let name = CurrentName {
            date: "02-09-25".to_string(),
            day: "SUN".to_string(),
            kind: ArtifactKind::Solution,
        };
        assert_eq!(name.to_string(), "02-09-25-SUN Solution.pdf");
        assert_eq!(name.local_name(), "02-09-25 Solution.pdf");
    }
}

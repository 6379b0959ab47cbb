//! Ordered date matching.
//!
//! Input patterns are tried in configured priority order and the first
//! pattern that yields a date inside the accepted year window wins. The
//! window is what lets `3/17/24` fall through `%m/%d/%Y` (year 24) to
//! `%m/%d/%y` (year 2024).

use std::fmt;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use reclaim_model::{ConfigError, FieldValue, IssueCode, NormalizationConfig};
use regex::Regex;
use tracing::debug;

use crate::normalized::Normalized;

const ISO_FORMAT: &str = "%Y-%m-%d";

static ORDINAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex")
});

static EAST_ASIAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})\s*(?:年|년)\s*(\d{1,2})\s*(?:月|월)\s*(\d{1,2})\s*(?:日|일)?$")
        .expect("valid regex")
});

/// Layouts tried after the ordinal suffix is removed.
const ORDINAL_LAYOUTS: &[&str] = &["%d %B %Y", "%B %d %Y", "%B %d, %Y", "%d %B, %Y"];

/// One date parser strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePattern {
    /// Canonical `YYYY-MM-DD`, optionally followed by a time part.
    Iso8601,
    /// A chrono strftime layout such as `%m/%d/%Y`.
    Format(String),
    /// Day with an ordinal suffix: `17th March 2024`, `March 17th, 2024`.
    Ordinal,
    /// `2024年3月17日` and `2024년 3월 17일`.
    EastAsian,
}

impl DatePattern {
    /// Parse a configured pattern name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim() {
            "iso8601" => Ok(Self::Iso8601),
            "ordinal" => Ok(Self::Ordinal),
            "east_asian" => Ok(Self::EastAsian),
            layout if is_date_layout(layout) => Ok(Self::Format(layout.to_string())),
            other => Err(ConfigError::UnknownDatePattern {
                pattern: other.to_string(),
            }),
        }
    }

    pub fn try_parse(&self, input: &str) -> Option<NaiveDate> {
        match self {
            Self::Iso8601 => {
                let date_part = match input.get(10..11) {
                    Some("T" | " ") => &input[..10],
                    _ => input,
                };
                NaiveDate::parse_from_str(date_part, ISO_FORMAT).ok()
            }
            Self::Format(layout) => NaiveDate::parse_from_str(input, layout).ok(),
            Self::Ordinal => {
                if !ORDINAL_SUFFIX.is_match(input) {
                    return None;
                }
                let stripped = ORDINAL_SUFFIX.replace_all(input, "$1");
                let stripped = stripped.replace(" of ", " ");
                ORDINAL_LAYOUTS
                    .iter()
                    .find_map(|layout| NaiveDate::parse_from_str(&stripped, layout).ok())
            }
            Self::EastAsian => {
                let caps = EAST_ASIAN.captures(input)?;
                let year = caps[1].parse().ok()?;
                let month = caps[2].parse().ok()?;
                let day = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            }
        }
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso8601 => f.write_str("iso8601"),
            Self::Format(layout) => f.write_str(layout),
            Self::Ordinal => f.write_str("ordinal"),
            Self::EastAsian => f.write_str("east_asian"),
        }
    }
}

/// A layout must contain a specifier and no malformed ones.
fn is_date_layout(layout: &str) -> bool {
    layout.contains('%') && !StrftimeItems::new(layout).any(|item| matches!(item, Item::Error))
}

/// Deterministic, ordered list of date parser strategies.
#[derive(Debug, Clone)]
pub struct DateMatcher {
    patterns: Vec<DatePattern>,
    min_year: i32,
    max_year: i32,
}

impl DateMatcher {
    /// Build the matcher from configuration.
    ///
    /// The canonical ISO form is always accepted: when `iso8601` is not
    /// listed it is tried first.
    pub fn new(config: &NormalizationConfig) -> Result<Self, ConfigError> {
        let mut patterns = config
            .date_formats
            .iter()
            .map(|name| DatePattern::parse(name))
            .collect::<Result<Vec<_>, _>>()?;
        if !patterns.contains(&DatePattern::Iso8601) {
            debug!("iso8601 not listed in date formats, trying it first");
            patterns.insert(0, DatePattern::Iso8601);
        }
        Ok(Self {
            patterns,
            min_year: config.min_year,
            max_year: config.max_year,
        })
    }

    pub fn patterns(&self) -> &[DatePattern] {
        &self.patterns
    }

    /// First pattern match inside the year window, with the pattern that produced it.
    pub fn parse(&self, raw: &str) -> Option<(NaiveDate, &DatePattern)> {
        let input = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        self.patterns.iter().find_map(|pattern| {
            pattern
                .try_parse(&input)
                .filter(|date| (self.min_year..=self.max_year).contains(&date.year()))
                .map(|date| (date, pattern))
        })
    }

    pub fn normalize(&self, raw: &str) -> Normalized {
        match self.parse(raw) {
            Some((date, _)) => Normalized::ok(FieldValue::Date(date)),
            None => Normalized::failed(IssueCode::InvalidFormat, "unrecognized date format"),
        }
    }
}

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde_json::Value;
use tracing::{trace, warn};

use crate::models::Weekday;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Normalisation tables ──────────────────────────────────────────────────────

/// Culture-specific meridiem glyphs and their ASCII replacements.
const MERIDIEM_GLYPHS: &[(char, &str)] = &[('ص', "AM"), ('م', "PM")];

/// Naive date-time layouts accepted by the generic parser.
///
/// Every layout carries year, month, day, hour and minute; date-only input is
/// handled separately by [`DATE_FORMATS`].
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Full calendar dates without a time component, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

fn reordered_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(\d{1,2}:\d{2}:\d{2})\s*(AM|PM)\s*(\d{4}-\d{1,2}-\d{1,2})\s*$")
            .expect("regex is valid")
    })
}

/// Replace culture meridiem glyphs with `AM`/`PM` and `/` with `-`.
pub fn normalize_timestamp(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch == '/' {
            out.push('-');
        } else if let Some((_, ascii)) = MERIDIEM_GLYPHS.iter().find(|(g, _)| *g == ch) {
            out.push_str(ascii);
        } else {
            out.push(ch);
        }
    }
    out
}

// ── Strategy chain ────────────────────────────────────────────────────────────

/// A single parsing attempt: input string in, instant out.
type Strategy = fn(&DateTimeParser, &str) -> Option<DateTime<Utc>>;

/// Strategies in the order they are tried; the first success wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("normalized", DateTimeParser::parse_normalized),
    ("reordered", DateTimeParser::parse_reordered),
    ("raw", DateTimeParser::parse_raw),
];

// ── DateTimeParser ────────────────────────────────────────────────────────────

/// Parses booking timestamps from the assorted layouts found in exports.
///
/// Values without an explicit offset are interpreted in the parser's default
/// timezone, which is also the timezone weekdays are computed in.
#[derive(Debug, Clone)]
pub struct DateTimeParser {
    default_tz: Tz,
}

impl Default for DateTimeParser {
    fn default() -> Self {
        Self { default_tz: Tz::UTC }
    }
}

impl DateTimeParser {
    /// Create a parser with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "DateTimeParser: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }

    /// Parse a record field value.
    ///
    /// Absent fields and non-string JSON values never parse.
    pub fn parse_value(&self, value: Option<&Value>) -> Option<DateTime<Utc>> {
        match value {
            Some(Value::String(s)) => self.parse(s),
            _ => None,
        }
    }

    /// Run the strategy chain over `s`.
    pub fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        if s.trim().is_empty() {
            return None;
        }
        for (name, strategy) in STRATEGIES {
            if let Some(dt) = strategy(self, s) {
                trace!(strategy = name, input = s, "timestamp parsed");
                return Some(dt);
            }
        }
        trace!(input = s, "timestamp unparseable");
        None
    }

    /// Weekday of `dt` as observed in the default timezone.
    pub fn weekday(&self, dt: &DateTime<Utc>) -> Weekday {
        Weekday::of(&dt.with_timezone(&self.default_tz))
    }

    /// Parse `value` and return its weekday in one step.
    pub fn weekday_of(&self, value: Option<&Value>) -> Option<Weekday> {
        self.parse_value(value).map(|dt| self.weekday(&dt))
    }

    // ── Strategies ────────────────────────────────────────────────────────

    fn parse_normalized(&self, s: &str) -> Option<DateTime<Utc>> {
        self.parse_generic(&normalize_timestamp(s))
    }

    /// Handles exports that put `time meridiem` ahead of the date,
    /// e.g. `"03:15:00 PM 2024-05-01"`.
    fn parse_reordered(&self, s: &str) -> Option<DateTime<Utc>> {
        let normalized = normalize_timestamp(s);
        let caps = reordered_pattern().captures(&normalized)?;
        let rebuilt = format!("{} {} {}", &caps[3], &caps[1], &caps[2].to_uppercase());
        self.parse_generic(&rebuilt)
    }

    fn parse_raw(&self, s: &str) -> Option<DateTime<Utc>> {
        self.parse_generic(s)
    }

    // ── Generic parser ────────────────────────────────────────────────────

    /// Offset-aware RFC 3339 first, then the naive layouts in the default
    /// timezone. Partial dates never match.
    fn parse_generic(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let rfc = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&rfc) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return self.localize(&naive);
            }
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return self.localize(&date.and_hms_opt(0, 0, 0)?);
            }
        }

        None
    }

    /// Attach the default timezone to a wall-clock value.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant;
    /// non-existent ones (DST spring-forward gap) do not parse.
    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        self.default_tz
            .from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

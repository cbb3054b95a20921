use clap::builder::TypedValueParser as _;
use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, StatsError};
use crate::models::{FieldNames, Locale};
use crate::time_utils::{get_system_timezone, DateTimeParser};

/// Default number of rows in the group ranking.
pub const DEFAULT_TOP_N: usize = 5;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summary statistics for meeting-booking exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "booking-stats",
    about = "Summary statistics for meeting-booking exports",
    version
)]
pub struct Settings {
    /// Input file or directory of .json/.jsonl files ("-" reads stdin)
    #[arg(long, short, default_value = "-")]
    pub input: PathBuf,

    /// Label set used for weekday names
    #[arg(long, default_value = "en", value_parser = ["en", "ar"])]
    pub locale: String,

    /// Timezone for timestamps without an offset (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Number of groups kept in the ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N, value_parser = clap::value_parser!(u16).range(1..=100).map(usize::from))]
    pub top: usize,

    /// Record field holding "internal" / "external"
    #[arg(long, default_value = "category", env = "BOOKING_CATEGORY_FIELD")]
    pub category_field: String,

    /// Record field holding the department label
    #[arg(long, default_value = "department", env = "BOOKING_GROUP_FIELD")]
    pub group_field: String,

    /// Record field holding the start timestamp
    #[arg(long, default_value = "start", env = "BOOKING_START_FIELD")]
    pub start_field: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print single-line JSON instead of pretty-printed output
    #[arg(long)]
    pub compact: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments, resolve `"auto"` values and validate.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let settings = Settings::parse_from(args);
        let settings = Self::resolve_auto_values(settings);
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = get_system_timezone();
        }

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// Reject values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if !DateTimeParser::validate_timezone(&self.timezone) {
            return Err(StatsError::Config(format!(
                "unknown timezone {}",
                self.timezone
            )));
        }
        for (flag, value) in [
            ("category-field", &self.category_field),
            ("group-field", &self.group_field),
            ("start-field", &self.start_field),
        ] {
            if value.trim().is_empty() {
                return Err(StatsError::Config(format!("--{} must not be empty", flag)));
            }
        }
        Ok(())
    }

    /// Field names the aggregator reads.
    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            category: self.category_field.clone(),
            group: self.group_field.clone(),
            start: self.start_field.clone(),
        }
    }

    pub fn locale(&self) -> Locale {
        Locale::parse(&self.locale).unwrap_or_default()
    }

    /// Timestamp parser bound to the configured timezone.
    pub fn parser(&self) -> DateTimeParser {
        DateTimeParser::new(&self.timezone)
    }

    /// `true` when input should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

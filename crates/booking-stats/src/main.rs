mod bootstrap;

use anyhow::{Context, Result};
use booking_core::models::Record;
use booking_core::settings::Settings;
use booking_data::aggregator::{StatsAggregator, StatsSnapshot};

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("booking-stats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Locale: {}, Timezone: {}, Top: {}",
        settings.locale,
        settings.timezone,
        settings.top
    );

    let records = bootstrap::load_input(&settings)?;
    let snapshot = compute(&settings, &records);
    let output = render(&snapshot, settings.compact)?;

    println!("{}", output);
    Ok(())
}

/// Build the aggregator described by `settings` and run it over `records`.
fn compute(settings: &Settings, records: &[Record]) -> StatsSnapshot {
    StatsAggregator::new(settings.parser())
        .with_fields(settings.field_names())
        .with_locale(settings.locale())
        .with_top_n(settings.top)
        .aggregate(records)
}

fn render(snapshot: &StatsSnapshot, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(snapshot)
    } else {
        serde_json::to_string_pretty(snapshot)
    };
    json.context("failed to serialise statistics snapshot")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings(args: &[&str]) -> Settings {
        let mut full = vec!["booking-stats", "--timezone", "UTC"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("category", "internal")
                .with("department", "A")
                .with("start", "2024-05-05 09:00:00"),
            Record::new()
                .with("category", "external")
                .with("department", "A")
                .with("start", "03:15:00 م 2024-05-05"),
            Record::new()
                .with("category", "internal")
                .with("department", "B")
                .with("start", "2024/05/06 10:00:00"),
        ]
    }

    #[test]
    fn test_compute_uses_settings() {
        let snap = compute(&settings(&["--locale", "ar", "--top", "1"]), &records());

        assert_eq!(snap.total(), 3);
        assert_eq!(snap.internal(), 2);
        assert_eq!(snap.busiest_day_label, "الأحد");
        assert_eq!(snap.top_groups.len(), 1);
        assert_eq!(snap.top_groups[0].label, "A");
    }

    #[test]
    fn test_compute_custom_group_field() {
        let snap = compute(&settings(&["--group-field", "category"]), &records());
        assert_eq!(snap.top_groups[0].label, "internal");
        assert_eq!(snap.top_groups[0].count, 2);
    }

    #[test]
    fn test_render_compact_is_single_line() {
        let snap = compute(&settings(&[]), &records());
        let compact = render(&snap, true).expect("render");
        let pretty = render(&snap, false).expect("render");

        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&compact).expect("valid json");
        assert_eq!(value["total"], 3);
        assert_eq!(value["busiest_day_label"], "Sunday");
    }
}

//! Booking statistics: category counts, busiest weekday and top groups.
//!
//! Every snapshot is a pure function of the record slice. Unparseable
//! timestamps, unknown categories and blank group labels only exclude a
//! record from the metric they affect; aggregation never fails.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use booking_core::models::{Category, FieldNames, Locale, RankedGroup, Record, Weekday};
use booking_core::settings::DEFAULT_TOP_N;
use booking_core::time_utils::DateTimeParser;

// ── CategoryCounts ────────────────────────────────────────────────────────────

/// Record totals by booking category.
///
/// `internal + external <= total`: records with a missing or unknown category
/// only count toward `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub total: u64,
    pub internal: u64,
    pub external: u64,
}

impl CategoryCounts {
    /// Count one record with the given (possibly unknown) category.
    pub fn add(&mut self, category: Option<Category>) {
        self.total += 1;
        match category {
            Some(Category::Internal) => self.internal += 1,
            Some(Category::External) => self.external += 1,
            None => {}
        }
    }

    /// Records that matched neither known category.
    pub fn uncategorized(&self) -> u64 {
        self.total - self.internal - self.external
    }
}

// ── WeekdayHistogram ──────────────────────────────────────────────────────────

/// Occurrences per weekday, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdayHistogram {
    counts: IndexMap<Weekday, u64>,
}

impl WeekdayHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, day: Weekday) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    pub fn get(&self, day: Weekday) -> u64 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u64)> + '_ {
        self.counts.iter().map(|(day, count)| (*day, *count))
    }

    /// The weekday with the highest count.
    ///
    /// A later bucket only wins with a strictly greater count, so ties go to
    /// the bucket inserted first. `None` when the histogram is empty.
    pub fn mode(&self) -> Option<Weekday> {
        let mut best: Option<(Weekday, u64)> = None;
        for (day, count) in self.iter() {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((day, count)),
            }
        }
        best.map(|(day, _)| day)
    }

    /// Label of [`mode`](Self::mode), or the locale's "no data" sentinel.
    pub fn mode_label(&self, locale: Locale) -> &'static str {
        match self.mode() {
            Some(day) => day.label(locale),
            None => locale.no_data_label(),
        }
    }
}

impl FromIterator<(Weekday, u64)> for WeekdayHistogram {
    fn from_iter<I: IntoIterator<Item = (Weekday, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

// ── GroupCounter ──────────────────────────────────────────────────────────────

/// Per-label counter that remembers first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GroupCounter {
    counts: IndexMap<String, u64>,
}

impl GroupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        if let Some(count) = self.counts.get_mut(label) {
            *count += 1;
        } else {
            self.counts.insert(label.to_string(), 1);
        }
    }

    /// Number of distinct labels seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Highest counts first, at most `n` rows.
    ///
    /// The sort is stable, so equal counts keep first-seen order.
    pub fn top_n(self, n: usize) -> Vec<RankedGroup> {
        let mut entries: Vec<(String, u64)> = self.counts.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .take(n)
            .map(|(label, count)| RankedGroup { label, count })
            .collect()
    }
}

// ── StatsSnapshot ─────────────────────────────────────────────────────────────

/// Everything the display layer needs from one record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub counts: CategoryCounts,
    /// Records whose start timestamp parsed.
    pub parsed_count: u64,
    pub weekday_histogram: WeekdayHistogram,
    /// Most frequent weekday, `None` when no timestamp parsed.
    pub busiest_day: Option<Weekday>,
    /// Localised weekday label or the "no data" sentinel.
    pub busiest_day_label: String,
    pub top_groups: Vec<RankedGroup>,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.counts.total
    }

    pub fn internal(&self) -> u64 {
        self.counts.internal
    }

    pub fn external(&self) -> u64 {
        self.counts.external
    }
}

// ── StatsAggregator ───────────────────────────────────────────────────────────

/// Folds a record set into a [`StatsSnapshot`].
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    parser: DateTimeParser,
    fields: FieldNames,
    locale: Locale,
    top_n: usize,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DateTimeParser::default())
    }
}

impl StatsAggregator {
    /// Aggregator with default field names, English labels and a top-5 ranking.
    pub fn new(parser: DateTimeParser) -> Self {
        Self {
            parser,
            fields: FieldNames::default(),
            locale: Locale::default(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Compute the full snapshot for `records`.
    pub fn aggregate(&self, records: &[Record]) -> StatsSnapshot {
        let counts = self.category_counts(records);
        let weekday_histogram = self.weekday_histogram(records);
        let top_groups = self.top_groups(records);

        let busiest_day = weekday_histogram.mode();
        let busiest_day_label = weekday_histogram.mode_label(self.locale).to_string();
        let parsed_count = weekday_histogram.total();

        debug!(
            total = counts.total,
            internal = counts.internal,
            external = counts.external,
            parsed = parsed_count,
            groups = top_groups.len(),
            busiest = %busiest_day_label,
            "booking stats aggregated"
        );

        StatsSnapshot {
            counts,
            parsed_count,
            weekday_histogram,
            busiest_day,
            busiest_day_label,
            top_groups,
        }
    }

    /// Single pass over the records, exact category match.
    pub fn category_counts(&self, records: &[Record]) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for record in records {
            counts.add(record.category(&self.fields));
        }
        counts
    }

    /// Weekday buckets for every record whose start timestamp parses.
    pub fn weekday_histogram(&self, records: &[Record]) -> WeekdayHistogram {
        let mut histogram = WeekdayHistogram::new();
        for (idx, record) in records.iter().enumerate() {
            match self.parser.weekday_of(record.start(&self.fields)) {
                Some(day) => histogram.increment(day),
                None => trace!(record = idx, "start timestamp missing or unparseable"),
            }
        }
        histogram
    }

    /// Top groups by record count, skipping absent and blank labels.
    pub fn top_groups(&self, records: &[Record]) -> Vec<RankedGroup> {
        let mut counter = GroupCounter::new();
        for record in records {
            if let Some(label) = record.group(&self.fields) {
                counter.add(label);
            }
        }
        counter.top_n(self.top_n)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

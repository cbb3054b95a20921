use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Record ────────────────────────────────────────────────────────────────────

/// One booking entry: an opaque mapping of field name to JSON value.
///
/// Only string values are meaningful to the statistics engine. A field whose
/// value is `null`, a number, or any other non-string JSON type is treated
/// exactly like a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style setter for a string field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), Value::String(value.into()));
        self
    }

    /// Builder-style setter for an arbitrary JSON value.
    pub fn with_value(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// Raw value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of `field` when it is present and a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Booking category, when the category field holds an exact known value.
    pub fn category(&self, fields: &FieldNames) -> Option<Category> {
        self.get_str(&fields.category).and_then(Category::from_field)
    }

    /// Group (department) label with surrounding whitespace removed;
    /// absent and blank values yield `None`.
    pub fn group(&self, fields: &FieldNames) -> Option<&str> {
        self.get_str(&fields.group)
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Raw start-timestamp value, left for the parser to interpret.
    pub fn start(&self, fields: &FieldNames) -> Option<&Value> {
        self.get(&fields.start)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

// ── FieldNames ────────────────────────────────────────────────────────────────

/// Names of the record fields the statistics engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    /// Field holding `"internal"` / `"external"`.
    pub category: String,
    /// Field holding the department or group label.
    pub group: String,
    /// Field holding the meeting start timestamp.
    pub start: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            category: "category".to_string(),
            group: "department".to_string(),
            start: "start".to_string(),
        }
    }
}

// ── Category ──────────────────────────────────────────────────────────────────

/// Whether a meeting was booked by an internal or an external party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Internal,
    External,
}

impl Category {
    /// Exact, case-sensitive match against the known field values.
    pub fn from_field(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

// ── Weekday ───────────────────────────────────────────────────────────────────

/// Day of the week, ordered with Sunday as the first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All days in week order, Sunday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Position within the week (Sunday = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_sunday() as usize]
    }

    /// Weekday of any chrono date-like value.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from_chrono(date.weekday())
    }

    pub fn label(self, locale: Locale) -> &'static str {
        locale.weekday_labels()[self.index()]
    }
}

// ── Locale ────────────────────────────────────────────────────────────────────

/// Fixed display label sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

const EN_WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const AR_WEEKDAYS: [&str; 7] = [
    "الأحد",
    "الاثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
    "السبت",
];

impl Locale {
    /// Weekday labels, index 0 is the first day of the week.
    pub fn weekday_labels(self) -> &'static [&'static str; 7] {
        match self {
            Self::En => &EN_WEEKDAYS,
            Self::Ar => &AR_WEEKDAYS,
        }
    }

    /// Label shown in place of a weekday when nothing could be bucketed.
    pub fn no_data_label(self) -> &'static str {
        match self {
            Self::En => "No data",
            Self::Ar => "لا توجد بيانات",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" => Some(Self::En),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }
}

// ── RankedGroup ───────────────────────────────────────────────────────────────

/// One row of the top-N group ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGroup {
    pub label: String,
    pub count: u64,
}

impl RankedGroup {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fields() -> FieldNames {
        FieldNames::default()
    }

    #[test]
    fn test_record_get_str_ignores_non_strings() {
        let record = Record::new()
            .with("department", "Sales")
            .with_value("start", json!(1714576500))
            .with_value("category", Value::Null);

        assert_eq!(record.get_str("department"), Some("Sales"));
        assert_eq!(record.get_str("start"), None);
        assert_eq!(record.get_str("category"), None);
        assert_eq!(record.get_str("missing"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_record_category_exact_match() {
        let f = fields();
        let internal = Record::new().with("category", "internal");
        let external = Record::new().with("category", "external");
        let shouty = Record::new().with("category", "INTERNAL");
        let padded = Record::new().with("category", " external");

        assert_eq!(internal.category(&f), Some(Category::Internal));
        assert_eq!(external.category(&f), Some(Category::External));
        assert_eq!(shouty.category(&f), None);
        assert_eq!(padded.category(&f), None);
        assert_eq!(Record::new().category(&f), None);
    }

    #[test]
    fn test_record_group_skips_blank() {
        let f = fields();
        assert_eq!(Record::new().with("department", "HR").group(&f), Some("HR"));
        assert_eq!(Record::new().with("department", "  HR ").group(&f), Some("HR"));
        assert_eq!(Record::new().with("department", "").group(&f), None);
        assert_eq!(Record::new().with("department", "   ").group(&f), None);
        assert_eq!(Record::new().group(&f), None);
    }

    #[test]
    fn test_record_from_iter_and_serde_roundtrip() {
        let record: Record = [("category", "internal"), ("department", "IT")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.get_str("department"), Some("IT"));
    }

    #[test]
    fn test_custom_field_names() {
        let f = FieldNames {
            category: "type".to_string(),
            group: "dept".to_string(),
            start: "starts_at".to_string(),
        };
        let record = Record::new()
            .with("type", "external")
            .with("dept", "Legal")
            .with("starts_at", "2024-05-01 10:00:00");

        assert_eq!(record.category(&f), Some(Category::External));
        assert_eq!(record.group(&f), Some("Legal"));
        assert_eq!(
            record.start(&f).and_then(Value::as_str),
            Some("2024-05-01 10:00:00")
        );
    }

    #[test]
    fn test_weekday_from_date_sunday_first() {
        // 5 May 2024 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        assert_eq!(Weekday::of(&sunday), Weekday::Sunday);
        assert_eq!(Weekday::Sunday.index(), 0);
        assert_eq!(Weekday::Saturday.index(), 6);

        let wednesday = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(Weekday::of(&wednesday), Weekday::Wednesday);
    }

    #[test]
    fn test_locale_labels() {
        assert_eq!(Weekday::Sunday.label(Locale::En), "Sunday");
        assert_eq!(Weekday::Friday.label(Locale::Ar), "الجمعة");
        assert_eq!(Locale::En.no_data_label(), "No data");
        assert_eq!(Locale::parse("AR"), Some(Locale::Ar));
        assert_eq!(Locale::parse("fr"), None);
    }

    #[test]
    fn test_weekday_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Weekday::Monday).unwrap(), "\"monday\"");
        assert_eq!(
            serde_json::to_string(&Category::External).unwrap(),
            "\"external\""
        );
    }
}

//! Booking record discovery and loading.
//!
//! Accepts `.json` files holding an array of record objects (or a single
//! object), `.jsonl` files with one object per line, and directories
//! containing any mix of the two.

use std::io::Read;
use std::path::{Path, PathBuf};

use booking_core::error::{Result, StatsError};
use booking_core::models::Record;
use serde_json::Value;
use tracing::{debug, warn};

const RECORD_EXTENSIONS: &[&str] = &["json", "jsonl"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `path` to the list of record files it names.
///
/// A file path yields itself. A directory is walked recursively for `.json`
/// and `.jsonl` files, sorted by path.
pub fn find_record_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(StatsError::DataPathNotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_record_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Load every record reachable from `path`, in file then line order.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let files = find_record_files(path)?;
    if files.is_empty() {
        warn!("No record files found in {}", path.display());
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(load_file(file)?);
    }

    debug!(
        "Loaded {} records from {} files",
        records.len(),
        files.len()
    );
    Ok(records)
}

/// Load a single record file, choosing the layout from its extension.
pub fn load_file(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let is_jsonl = path
        .extension()
        .map(|ext| ext == "jsonl")
        .unwrap_or(false);

    if is_jsonl {
        Ok(parse_jsonl(&content, &path.display().to_string()))
    } else {
        parse_json_document(&content)
    }
}

/// Read records from an arbitrary stream such as stdin.
///
/// The layout is sniffed: a JSON array or a single pretty-printed object is
/// read as a document, anything else as JSONL.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Record>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_records_str(&content)
}

/// Parse records from in-memory text with the same sniffing as [`read_records`].
pub fn parse_records_str(content: &str) -> Result<Vec<Record>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return parse_json_document(content);
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
        return Ok(vec![Record::from(map)]);
    }
    Ok(parse_jsonl(content, "<stream>"))
}

/// Parse a whole JSON document: an array of objects or one object.
///
/// Array items that are not objects are skipped with a warning.
pub fn parse_json_document(content: &str) -> Result<Vec<Record>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match item {
                Value::Object(map) => Some(Record::from(map)),
                other => {
                    warn!(
                        "Skipping array item {}: expected object, found {}",
                        idx,
                        json_type_name(&other)
                    );
                    None
                }
            })
            .collect()),
        Value::Object(map) => Ok(vec![Record::from(map)]),
        other => Err(StatsError::InvalidRecord(format!(
            "expected array or object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Parse one record object per line; blank, malformed and non-object lines
/// are skipped.
pub fn parse_jsonl(content: &str, source: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut skipped = 0u64;

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => records.push(Record::from(map)),
            Ok(other) => {
                skipped += 1;
                warn!(
                    "{}:{}: expected object, found {}",
                    source,
                    line_no + 1,
                    json_type_name(&other)
                );
            }
            Err(e) => {
                skipped += 1;
                warn!("{}:{}: failed to parse JSON line: {}", source, line_no + 1, e);
            }
        }
    }

    debug!(
        "{}: {} records parsed, {} lines skipped",
        source,
        records.len(),
        skipped
    );
    records
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RECORD_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Full-state JSON and daily-log CSV exchange files.

use crate::legacy::{self, MissingChapters};
use crate::model::{new_id, AppState, DailyLog};
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const EXPORTS_DIR: &str = "exports";
pub const STATE_EXPORT_FILE: &str = "jee_backup.json";
pub const LOGS_EXPORT_FILE: &str = "study_logs.csv";
pub const LOGS_CSV_HEADER: [&str; 6] = [
    "Date",
    "Physics",
    "Chemistry",
    "Mathematics",
    "StudyTime",
    "Remarks",
];

pub fn state_to_json(state: &AppState) -> anyhow::Result<String> {
    serde_json::to_string_pretty(state).context("failed to serialize app state")
}

/// Parses an uploaded full-state document. The caller keeps its current
/// state when this fails.
pub fn state_from_json(text: &str) -> anyhow::Result<legacy::Migrated> {
    let raw: serde_json::Value =
        serde_json::from_str(text).context("Failed to parse file.")?;
    legacy::migrate_value(raw, MissingChapters::Reject)
}

pub fn logs_to_csv(logs: &[DailyLog]) -> anyhow::Result<String> {
    let mut w = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(LOGS_CSV_HEADER)?;
    for l in logs {
        w.write_record([
            l.date.clone(),
            l.physics_q.to_string(),
            l.chemistry_q.to_string(),
            l.math_q.to_string(),
            l.study_time.to_string(),
            l.remarks.clone().unwrap_or_default(),
        ])?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv writer: {}", e.error()))?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

/// Leading integer part, read the way a spreadsheet export would be: an
/// optional sign then digits, stopping at the first other character.
/// Negatives and anything without leading digits are 0.
fn parse_count(raw: &str) -> u32 {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Header row is skipped; rows with fewer than five fields or no date are
/// dropped. Unquoted commas past the fifth field stay part of the remarks.
pub fn logs_from_csv(text: &str) -> anyhow::Result<Vec<DailyLog>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.context("malformed csv row")?;
        if record.len() < 5 {
            continue;
        }
        let date = record.get(0).unwrap_or("").trim();
        if date.is_empty() {
            continue;
        }
        let remarks = record.iter().skip(5).collect::<Vec<_>>().join(",");
        out.push(DailyLog {
            id: new_id(),
            date: date.to_string(),
            physics_q: parse_count(record.get(1).unwrap_or("")),
            chemistry_q: parse_count(record.get(2).unwrap_or("")),
            math_q: parse_count(record.get(3).unwrap_or("")),
            study_time: parse_count(record.get(4).unwrap_or("")),
            remarks: Some(remarks),
        });
    }
    Ok(out)
}

/// `<workspace>/exports/<file_name>` unless the caller picked a path.
pub fn export_path(workspace: &Path, file_name: &str, out_path: Option<&Path>) -> PathBuf {
    match out_path {
        Some(p) => p.to_path_buf(),
        None => workspace.join(EXPORTS_DIR).join(file_name),
    }
}

pub fn write_export(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))
}

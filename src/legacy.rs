//! Forward migration of older persisted state shapes.
//!
//! Older builds stored tests with a single free-text `score`, logs without
//! ids, and could omit whole collections. Everything is mapped forward once
//! on load; only the current shape is ever written back.

use crate::model::{new_id, AppState, TestType};
use crate::seed;
use anyhow::{anyhow, bail, Context};
use serde_json::{json, Map, Value as JsonValue};

pub const MISSING_CHAPTERS_MESSAGE: &str = "Invalid file format: Missing chapters.";

/// What to do with a document that has no `chapters` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingChapters {
    /// Stored workspace state: fall back to the built-in syllabus.
    Seed,
    /// User-supplied import: refuse the file.
    Reject,
}

#[derive(Debug, Clone)]
pub struct Migrated {
    pub state: AppState,
    pub notes: Vec<String>,
}

fn ensure_array(obj: &mut Map<String, JsonValue>, key: &str) {
    if !obj.get(key).map(JsonValue::is_array).unwrap_or(false) {
        obj.insert(key.to_string(), JsonValue::Array(Vec::new()));
    }
}

fn is_legacy_test_shape(tests: &[JsonValue]) -> bool {
    tests
        .first()
        .and_then(|t| t.get("score"))
        .map(JsonValue::is_string)
        .unwrap_or(false)
}

fn migrate_legacy_test(old: &JsonValue) -> JsonValue {
    let score = old.get("score").and_then(|v| v.as_str()).unwrap_or("");
    let zero = json!({ "correct": 0, "incorrect": 0, "unattempted": 0 });
    json!({
        "id": old.get("id").and_then(|v| v.as_str()).map(str::to_string).unwrap_or_else(new_id),
        "name": old.get("name").and_then(|v| v.as_str()).unwrap_or("Test"),
        "date": old.get("date").and_then(|v| v.as_str()).unwrap_or(""),
        "type": TestType::FullSyllabus.label(),
        "notes": format!("Migrated from old format. Original score: {score}"),
        "scores": { "physics": zero, "chemistry": zero, "maths": zero },
    })
}

/// Rounds a numeric field and clamps it into `0..=max`. Older builds stored
/// whatever the model or a slider produced.
fn clamp_count(obj: &mut Map<String, JsonValue>, key: &str, max: u32) -> bool {
    let Some(n) = obj.get(key).and_then(JsonValue::as_f64) else {
        return false;
    };
    let fixed = if n.is_finite() {
        n.round().clamp(0.0, f64::from(max)) as u32
    } else {
        0
    };
    let changed = n != f64::from(fixed);
    obj.insert(key.to_string(), JsonValue::from(fixed));
    changed
}

fn clamp_each(items: Option<&mut JsonValue>, keys: &[&str], max: u32) -> usize {
    let Some(JsonValue::Array(items)) = items else {
        return 0;
    };
    let mut fixed = 0;
    for item in items.iter_mut().filter_map(JsonValue::as_object_mut) {
        for key in keys {
            if clamp_count(item, key, max) {
                fixed += 1;
            }
        }
    }
    fixed
}

fn normalize_numbers(obj: &mut Map<String, JsonValue>) -> usize {
    const COUNT_MAX: u32 = u32::MAX;
    let mut fixed = clamp_each(obj.get_mut("chapters"), &["confidence"], 100);
    if let Some(JsonValue::Array(chapters)) = obj.get_mut("chapters") {
        for chapter in chapters.iter_mut() {
            fixed += clamp_each(chapter.get_mut("pyqs"), &["done", "total"], COUNT_MAX);
        }
    }
    fixed += clamp_each(obj.get_mut("revisionTiles"), &["targetQ", "attemptedQ"], COUNT_MAX);
    fixed += clamp_each(
        obj.get_mut("logs"),
        &["physicsQ", "chemistryQ", "mathQ", "studyTime"],
        COUNT_MAX,
    );
    if let Some(JsonValue::Array(tests)) = obj.get_mut("tests") {
        for scores in tests.iter_mut().filter_map(|t| t.get_mut("scores")) {
            for subject in ["physics", "chemistry", "maths"] {
                if let Some(JsonValue::Object(score)) = scores.get_mut(subject) {
                    for key in ["correct", "incorrect", "unattempted"] {
                        if clamp_count(score, key, COUNT_MAX) {
                            fixed += 1;
                        }
                    }
                }
            }
        }
    }
    fixed
}

pub fn migrate_value(raw: JsonValue, missing: MissingChapters) -> anyhow::Result<Migrated> {
    let JsonValue::Object(mut obj) = raw else {
        bail!("state document is not a JSON object");
    };
    let mut notes = Vec::new();

    let seeded = !obj.get("chapters").map(JsonValue::is_array).unwrap_or(false);
    if seeded {
        match missing {
            MissingChapters::Reject => return Err(anyhow!(MISSING_CHAPTERS_MESSAGE)),
            MissingChapters::Seed => {
                obj.insert(
                    "chapters".to_string(),
                    serde_json::to_value(seed::default_chapters())
                        .context("failed to serialize default syllabus")?,
                );
                notes.push("chapters missing; loaded the default syllabus".to_string());
            }
        }
    }
    for key in ["revisionTiles", "tests", "logs", "plannerTasks"] {
        ensure_array(&mut obj, key);
    }

    if let Some(JsonValue::Array(logs)) = obj.get_mut("logs") {
        let mut assigned = 0usize;
        for entry in logs.iter_mut() {
            let Some(entry) = entry.as_object_mut() else {
                continue;
            };
            let has_id = entry
                .get("id")
                .and_then(|v| v.as_str())
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if !has_id {
                entry.insert("id".to_string(), JsonValue::String(new_id()));
                assigned += 1;
            }
        }
        if assigned > 0 {
            notes.push(format!("assigned ids to {assigned} daily logs"));
        }
    }

    if let Some(JsonValue::Array(tests)) = obj.get_mut("tests") {
        if is_legacy_test_shape(tests) {
            *tests = tests.iter().map(migrate_legacy_test).collect();
            notes.push(format!("migrated {} tests from the single-score format", tests.len()));
        }
    }

    let theme_ok = matches!(obj.get("theme").and_then(|v| v.as_str()), Some("dark" | "light"));
    if !theme_ok {
        obj.insert("theme".to_string(), json!("dark"));
    }

    let fixed = normalize_numbers(&mut obj);
    if fixed > 0 {
        notes.push(format!("clamped {fixed} out-of-range numbers"));
    }

    let state: AppState =
        serde_json::from_value(JsonValue::Object(obj)).context("state document has an invalid shape")?;
    Ok(Migrated { state, notes })
}

/// Parses stored text. Never fails: unreadable input yields the built-in
/// default state plus a note saying why.
pub fn load_or_default(text: Option<&str>) -> Migrated {
    let Some(text) = text else {
        return Migrated {
            state: seed::default_state(),
            notes: Vec::new(),
        };
    };
    let parsed = serde_json::from_str::<JsonValue>(text)
        .context("stored state is not valid JSON")
        .and_then(|v| migrate_value(v, MissingChapters::Seed));
    match parsed {
        Ok(m) => m,
        Err(e) => Migrated {
            state: seed::default_state(),
            notes: vec![format!("failed to load stored state, using defaults: {e:#}")],
        },
    }
}

use crate::assistant::DEFAULT_TIMEOUT;
use crate::calc::{self, parse_date};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{Request, SidecarState};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_EXAM_DATE: &str = "2026-01-21";

#[derive(Clone, Copy)]
enum SetupSection {
    Exam,
    Assistant,
    Analytics,
}

impl SetupSection {
    const ALL: [SetupSection; 3] = [Self::Exam, Self::Assistant, Self::Analytics];

    fn parse(s: &str) -> Option<Self> {
        match s {
            "exam" => Some(Self::Exam),
            "assistant" => Some(Self::Assistant),
            "analytics" => Some(Self::Analytics),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Assistant => "assistant",
            Self::Analytics => "analytics",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Exam => "setup.exam",
            Self::Assistant => "setup.assistant",
            Self::Analytics => "setup.analytics",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Exam => json!({
            "examDate": DEFAULT_EXAM_DATE
        }),
        SetupSection::Assistant => json!({
            "timeoutSeconds": DEFAULT_TIMEOUT.as_secs(),
            "historyLimit": 0
        }),
        SetupSection::Analytics => json!({
            "smoothingWindow": calc::DEFAULT_SMOOTHING_WINDOW
        }),
    }
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_date_value(v: &Value, key: &str) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let date = parse_date(s.trim()).ok_or_else(|| format!("{} must be YYYY-MM-DD", key))?;
    Ok(calc::iso_date(date))
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = current
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())?;
    for (k, v) in patch {
        match section {
            SetupSection::Exam => match k.as_str() {
                "examDate" => {
                    obj.insert(k.clone(), Value::String(parse_date_value(v, k)?));
                }
                _ => return Err(format!("unknown exam field: {}", k)),
            },
            SetupSection::Assistant => match k.as_str() {
                "timeoutSeconds" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 1, 600)?));
                }
                "historyLimit" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 500)?));
                }
                _ => return Err(format!("unknown assistant field: {}", k)),
            },
            SetupSection::Analytics => match k.as_str() {
                "smoothingWindow" => {
                    obj.insert(k.clone(), Value::from(parse_i64_range(v, k, 0, 30)?));
                }
                _ => return Err(format!("unknown analytics field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Malformed stored values fall back to defaults field by field.
            for (k, v) in saved_obj {
                let one: Map<String, Value> = [(k.clone(), v.clone())].into_iter().collect();
                let _ = merge_section_patch(section, &mut current, &one);
            }
        }
    }
    Ok(current)
}

fn load_section_or_default(conn: &Connection, section: SetupSection) -> Map<String, Value> {
    load_section(conn, section)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default()
}

pub fn load_exam_date(conn: &Connection) -> NaiveDate {
    let obj = load_section_or_default(conn, SetupSection::Exam);
    obj.get("examDate")
        .and_then(|v| v.as_str())
        .and_then(parse_date)
        .or_else(|| parse_date(DEFAULT_EXAM_DATE))
        .unwrap_or_else(calc::today)
}

#[derive(Clone, Copy, Debug)]
pub struct AssistantSetup {
    pub timeout: Duration,
    pub history_limit: usize,
}

pub fn load_assistant_setup(conn: &Connection) -> AssistantSetup {
    let obj = load_section_or_default(conn, SetupSection::Assistant);
    let timeout = obj
        .get("timeoutSeconds")
        .and_then(|v| v.as_u64())
        .filter(|v| *v > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let history_limit = obj
        .get("historyLimit")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as usize;
    AssistantSetup {
        timeout,
        history_limit,
    }
}

pub fn load_smoothing_window(conn: &Connection) -> usize {
    load_section_or_default(conn, SetupSection::Analytics)
        .get("smoothingWindow")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(calc::DEFAULT_SMOOTHING_WINDOW)
}

fn handle_setup_get(state: &mut SidecarState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let mut out = Map::new();
    for section in SetupSection::ALL {
        match load_section(conn, section) {
            Ok(v) => {
                out.insert(section.name().to_string(), v);
            }
            Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
        }
    }
    ok(&req.id, Value::Object(out))
}

fn handle_setup_update(state: &mut SidecarState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }
    if let SetupSection::Assistant = section {
        let a = load_assistant_setup(conn);
        state.assistant.configure(a.timeout, a.history_limit);
    }
    ok(&req.id, json!({ "section": section.name(), "value": current }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}

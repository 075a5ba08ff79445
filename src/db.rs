use crate::legacy;
use crate::model::AppState;
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use std::path::Path;

pub const DB_FILE: &str = "jeetrack.sqlite3";
pub const STATE_KEY: &str = "app.state";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<JsonValue>> {
    let Some(text) = settings_get_text(conn, key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&text)
        .with_context(|| format!("settings value for {key} is not valid JSON"))?;
    Ok(Some(value))
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &JsonValue) -> anyhow::Result<()> {
    let text = serde_json::to_string(value).context("failed to serialize settings value")?;
    settings_set_text(conn, key, &text)
}

fn settings_get_text(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let text = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("failed to read setting {key}"))?;
    Ok(text)
}

fn settings_set_text(conn: &Connection, key: &str, text: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        params![key, text],
    )
    .with_context(|| format!("failed to write setting {key}"))?;
    Ok(())
}

/// Loaded state plus diagnostics from migration or fallback.
pub struct LoadedState {
    pub state: AppState,
    pub notes: Vec<String>,
}

/// Raw text is read directly so that a corrupt document degrades to the
/// defaults instead of failing the workspace open.
pub fn load_state(conn: &Connection) -> anyhow::Result<LoadedState> {
    let text = settings_get_text(conn, STATE_KEY)?;
    let migrated = legacy::load_or_default(text.as_deref());
    Ok(LoadedState {
        state: migrated.state,
        notes: migrated.notes,
    })
}

pub fn save_state(conn: &Connection, state: &AppState) -> anyhow::Result<()> {
    let text = serde_json::to_string(state).context("failed to serialize app state")?;
    settings_set_text(conn, STATE_KEY, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ))
    }

    #[test]
    fn fresh_workspace_loads_seed_state() {
        let ws = temp_workspace("jeetrack-db-fresh");
        let conn = open_db(&ws).expect("open");
        let loaded = load_state(&conn).expect("load");
        assert!(!loaded.state.chapters.is_empty());
        assert!(loaded.notes.is_empty());
        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn state_and_settings_persist() {
        let ws = temp_workspace("jeetrack-db-persist");
        let conn = open_db(&ws).expect("open");
        let mut state = load_state(&conn).expect("load").state;
        state.theme = Theme::Light;
        state.chapters.truncate(2);
        save_state(&conn, &state).expect("save");
        settings_set_json(&conn, "setup.exam", &json!({ "examDate": "2026-04-02" }))
            .expect("set");
        drop(conn);

        let conn = open_db(&ws).expect("reopen");
        let loaded = load_state(&conn).expect("load");
        assert_eq!(loaded.state, state);
        let exam = settings_get_json(&conn, "setup.exam").expect("get");
        assert_eq!(exam, Some(json!({ "examDate": "2026-04-02" })));
        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn corrupt_state_falls_back_with_note() {
        let ws = temp_workspace("jeetrack-db-corrupt");
        let conn = open_db(&ws).expect("open");
        settings_set_text(&conn, STATE_KEY, "[1,2").expect("write garbage");
        let loaded = load_state(&conn).expect("load");
        assert_eq!(loaded.notes.len(), 1);
        assert!(!loaded.state.chapters.is_empty());
        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }
}

use crate::db;
use crate::exchange;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{Request, SidecarState};
use crate::model::AppState;
use crate::tools::ExportRequest;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

pub fn respond(req: &Request, result: Result<Value, HandlerErr>) -> Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn no_workspace() -> HandlerErr {
    HandlerErr::new("no_workspace", "select a workspace first")
}

pub fn require_db(state: &SidecarState) -> Result<&Connection, HandlerErr> {
    state.db.as_ref().ok_or_else(no_workspace)
}

pub fn require_workspace(state: &SidecarState) -> Result<PathBuf, HandlerErr> {
    match (&state.workspace, &state.db) {
        (Some(p), Some(_)) => Ok(p.clone()),
        _ => Err(no_workspace()),
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing params.{key}")))
}

pub fn get_opt_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Deserializes `params[key]` into a typed record.
pub fn parse_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, HandlerErr> {
    let Some(raw) = params.get(key) else {
        return Err(HandlerErr::new("bad_params", format!("missing params.{key}")));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid params.{key}: {e}")))
}

pub fn state_json(app: &AppState) -> Value {
    serde_json::to_value(app).unwrap_or(Value::Null)
}

/// Stores `next` and makes it current. On failure the current state stays.
pub fn commit(state: &mut SidecarState, next: AppState) -> Result<(), HandlerErr> {
    let conn = require_db(state)?;
    db::save_state(conn, &next)
        .map_err(|e| HandlerErr::new("db_write_failed", format!("{e:#}")))?;
    state.app = next;
    Ok(())
}

/// Writes the files a tool batch asked for. Runs only after the state the
/// files describe has been committed; failures are reported, not raised.
pub fn perform_exports(workspace: &Path, app: &AppState, requests: &[ExportRequest]) -> Vec<Value> {
    requests
        .iter()
        .map(|request| {
            let (file_name, contents) = match request {
                ExportRequest::Data => (exchange::STATE_EXPORT_FILE, exchange::state_to_json(app)),
                ExportRequest::Logs => (exchange::LOGS_EXPORT_FILE, exchange::logs_to_csv(&app.logs)),
            };
            let path = exchange::export_path(workspace, file_name, None);
            match contents.and_then(|text| exchange::write_export(&path, &text)) {
                Ok(()) => {
                    info!(path = %path.display(), "export written");
                    json!({ "kind": request, "path": path.to_string_lossy() })
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %format!("{e:#}"), "export failed");
                    json!({ "kind": request, "error": format!("{e:#}") })
                }
            }
        })
        .collect()
}

/// Like `parse_param` for records whose id the caller may leave out; a
/// missing id is filled in by the mutation.
pub fn parse_record<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, HandlerErr> {
    let Some(raw) = params.get(key) else {
        return Err(HandlerErr::new("bad_params", format!("missing params.{key}")));
    };
    let mut raw = raw.clone();
    if let Some(obj) = raw.as_object_mut() {
        obj.entry("id").or_insert_with(|| Value::String(String::new()));
    }
    serde_json::from_value(raw)
        .map_err(|e| HandlerErr::new("bad_params", format!("invalid params.{key}: {e}")))
}

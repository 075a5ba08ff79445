use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup;
use crate::ipc::helpers::{commit, require_db, respond, state_json, HandlerErr};
use crate::ipc::types::{Request, SidecarState};
use crate::mutations;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut SidecarState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut SidecarState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:#}"), None),
    };
    let loaded = match db::load_state(&conn) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:#}"), None),
    };
    for note in &loaded.notes {
        warn!(workspace = %path.display(), %note, "state load note");
    }

    let assistant = setup::load_assistant_setup(&conn);
    state.assistant.reset();
    state.assistant.configure(assistant.timeout, assistant.history_limit);
    state.app = loaded.state;
    state.db = Some(conn);
    state.workspace = Some(path.clone());
    info!(
        workspace = %path.display(),
        chapters = state.app.chapters.len(),
        "workspace opened"
    );
    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "loadNotes": loaded.notes,
        }),
    )
}

fn state_get(state: &SidecarState) -> Result<serde_json::Value, HandlerErr> {
    require_db(state)?;
    Ok(json!({ "state": state_json(&state.app) }))
}

fn theme_toggle(state: &mut SidecarState) -> Result<serde_json::Value, HandlerErr> {
    require_db(state)?;
    let next = mutations::toggle_theme(state.app.clone());
    commit(state, next)?;
    Ok(json!({ "theme": state.app.theme }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "state.get" => Some(respond(req, state_get(state))),
        "state.theme.toggle" => Some(respond(req, theme_toggle(state))),
        _ => None,
    }
}

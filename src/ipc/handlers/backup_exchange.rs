use crate::backup;
use crate::exchange;
use crate::ipc::helpers::{
    commit, get_opt_str, get_required_str, require_workspace, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use crate::mutations;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

fn out_path(workspace: &Path, params: &Value, file_name: &str) -> PathBuf {
    let custom = get_opt_str(params, "outPath").map(PathBuf::from);
    exchange::export_path(workspace, file_name, custom.as_deref())
}

fn existing_input(params: &Value) -> Result<PathBuf, HandlerErr> {
    let in_path = get_required_str(params, "inPath")?;
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr::new("not_found", "input file not found")
            .with_details(json!({ "path": in_path })));
    }
    Ok(src)
}

fn read_input(src: &Path) -> Result<String, HandlerErr> {
    std::fs::read_to_string(src).map_err(|e| {
        HandlerErr::new("import_failed", e.to_string())
            .with_details(json!({ "path": src.to_string_lossy() }))
    })
}

fn export_failed(path: &Path, e: anyhow::Error) -> HandlerErr {
    HandlerErr::new("export_failed", format!("{e:#}"))
        .with_details(json!({ "path": path.to_string_lossy() }))
}

fn export_json(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let path = out_path(&workspace, &req.params, exchange::STATE_EXPORT_FILE);
    exchange::state_to_json(&state.app)
        .and_then(|text| exchange::write_export(&path, &text))
        .map_err(|e| export_failed(&path, e))?;
    Ok(json!({ "path": path.to_string_lossy() }))
}

fn import_json(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_workspace(state)?;
    let src = existing_input(&req.params)?;
    let text = read_input(&src)?;
    let migrated = exchange::state_from_json(&text)
        .map_err(|e| HandlerErr::new("import_failed", format!("{e:#}")))?;
    commit(state, migrated.state)?;
    info!(path = %src.display(), chapters = state.app.chapters.len(), "state imported");
    Ok(json!({
        "chapters": state.app.chapters.len(),
        "tests": state.app.tests.len(),
        "logs": state.app.logs.len(),
        "notes": migrated.notes,
    }))
}

fn export_logs_csv(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let path = out_path(&workspace, &req.params, exchange::LOGS_EXPORT_FILE);
    exchange::logs_to_csv(&state.app.logs)
        .and_then(|text| exchange::write_export(&path, &text))
        .map_err(|e| export_failed(&path, e))?;
    Ok(json!({ "path": path.to_string_lossy(), "rows": state.app.logs.len() }))
}

fn import_logs_csv(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_workspace(state)?;
    let src = existing_input(&req.params)?;
    let text = read_input(&src)?;
    let rows = exchange::logs_from_csv(&text)
        .map_err(|e| HandlerErr::new("import_failed", format!("{e:#}")))?;
    if rows.is_empty() {
        return Ok(json!({ "imported": 0, "logs": state.app.logs.len() }));
    }
    let (next, imported) = mutations::merge_logs(state.app.clone(), rows);
    commit(state, next)?;
    Ok(json!({ "imported": imported, "logs": state.app.logs.len() }))
}

fn backup_export(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_workspace(state)?;
    let out = PathBuf::from(get_required_str(&req.params, "outPath")?);
    let summary = exchange::state_to_json(&state.app)
        .and_then(|text| backup::export_state_bundle(&text, &out))
        .map_err(|e| export_failed(&out, e))?;
    Ok(json!({
        "path": out.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count,
        "sha256": summary.state_sha256,
    }))
}

fn backup_import(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_workspace(state)?;
    let src = existing_input(&req.params)?;
    let import = backup::import_state_bundle(&src).map_err(|e| {
        HandlerErr::new("import_failed", format!("{e:#}"))
            .with_details(json!({ "path": src.to_string_lossy() }))
    })?;
    let migrated = exchange::state_from_json(&import.state_json)
        .map_err(|e| HandlerErr::new("import_failed", format!("{e:#}")))?;
    commit(state, migrated.state)?;
    Ok(json!({
        "bundleFormatDetected": import.bundle_format_detected,
        "chapters": state.app.chapters.len(),
        "notes": migrated.notes,
    }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.json" => Some(respond(req, export_json(state, req))),
        "import.json" => Some(respond(req, import_json(state, req))),
        "export.logsCsv" => Some(respond(req, export_logs_csv(state, req))),
        "import.logsCsv" => Some(respond(req, import_logs_csv(state, req))),
        "backup.export" => Some(respond(req, backup_export(state, req))),
        "backup.import" => Some(respond(req, backup_import(state, req))),
        _ => None,
    }
}

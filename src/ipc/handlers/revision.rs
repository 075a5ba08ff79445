use crate::calc::parse_date;
use crate::ipc::helpers::{
    commit, get_opt_str, get_required_str, parse_param, require_db, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use crate::model::RevisionTile;
use crate::mutations::{self, NewRevisionTile};
use serde_json::{json, Value};

const DEFAULT_TARGET_Q: u32 = 50;

fn required_date(params: &Value, key: &str) -> Result<String, HandlerErr> {
    let raw = get_required_str(params, key)?;
    if parse_date(&raw).is_none() {
        return Err(HandlerErr::new("bad_params", format!("{key} must be YYYY-MM-DD")));
    }
    Ok(raw)
}

fn revision_add(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let chapter_id = get_required_str(&req.params, "chapterId")?;
    let start_date = required_date(&req.params, "startDate")?;
    let end_date = required_date(&req.params, "endDate")?;
    if parse_date(&end_date) < parse_date(&start_date) {
        return Err(HandlerErr::new("bad_params", "endDate is before startDate"));
    }
    let target_q = req
        .params
        .get("targetQ")
        .and_then(|v| v.as_u64())
        .filter(|v| *v > 0)
        .map(|v| v.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(DEFAULT_TARGET_Q);

    let input = NewRevisionTile {
        chapter_id: chapter_id.clone(),
        start_date,
        end_date,
        target_q,
        notes: get_opt_str(&req.params, "notes"),
    };
    let Some((next, id)) = mutations::add_revision_tile(state.app.clone(), input) else {
        return Err(HandlerErr::new("not_found", "chapter not found")
            .with_details(json!({ "chapterId": chapter_id })));
    };
    commit(state, next)?;
    let tile = state.app.revision_tiles.iter().find(|t| t.id == id);
    Ok(json!({ "tile": tile }))
}

fn revision_update(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let tile: RevisionTile = parse_param(&req.params, "tile")?;
    if !state.app.revision_tiles.iter().any(|t| t.id == tile.id) {
        return Err(HandlerErr::new("not_found", "revision tile not found")
            .with_details(json!({ "id": tile.id })));
    }
    let id = tile.id.clone();
    let next = mutations::update_revision_tile(state.app.clone(), tile);
    commit(state, next)?;
    let tile = state.app.revision_tiles.iter().find(|t| t.id == id);
    Ok(json!({ "tile": tile }))
}

fn revision_delete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    if !state.app.revision_tiles.iter().any(|t| t.id == id) {
        return Err(HandlerErr::new("not_found", "revision tile not found")
            .with_details(json!({ "id": id })));
    }
    let next = mutations::delete_revision_tile(state.app.clone(), &id);
    commit(state, next)?;
    Ok(json!({ "id": id }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "revision.add" => Some(respond(req, revision_add(state, req))),
        "revision.update" => Some(respond(req, revision_update(state, req))),
        "revision.delete" => Some(respond(req, revision_delete(state, req))),
        _ => None,
    }
}

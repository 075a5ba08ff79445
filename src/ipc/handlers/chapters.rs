use crate::ipc::helpers::{commit, get_required_str, parse_param, require_db, respond, HandlerErr};
use crate::ipc::types::{Request, SidecarState};
use crate::model::{new_id, Chapter, Priority, Subject};
use crate::mutations;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewChapter {
    name: String,
    subject: Subject,
    #[serde(default)]
    unit: String,
    #[serde(default = "default_priority")]
    priority: Priority,
    #[serde(default)]
    confidence: u8,
    #[serde(default)]
    remarks: Option<String>,
    #[serde(default)]
    study_links: Option<String>,
}

fn default_priority() -> Priority {
    Priority::C
}

fn chapters_add(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let input: NewChapter = parse_param(&req.params, "chapter")?;
    if input.name.trim().is_empty() {
        return Err(HandlerErr::new("bad_params", "chapter.name must not be empty"));
    }
    let chapter = Chapter {
        id: new_id(),
        name: input.name.trim().to_string(),
        subject: input.subject,
        unit: input.unit.trim().to_string(),
        priority: input.priority,
        confidence: input.confidence,
        rev1: false,
        rev2: false,
        pyqs: Vec::new(),
        remarks: input.remarks,
        study_links: input.study_links,
    };
    let id = chapter.id.clone();
    let next = mutations::add_chapter(state.app.clone(), chapter);
    commit(state, next)?;
    Ok(json!({ "chapter": state.app.chapter(&id) }))
}

fn chapters_update(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let chapter: Chapter = parse_param(&req.params, "chapter")?;
    if state.app.chapter(&chapter.id).is_none() {
        return Err(HandlerErr::new("not_found", "chapter not found")
            .with_details(json!({ "id": chapter.id })));
    }
    let id = chapter.id.clone();
    let next = mutations::update_chapter(state.app.clone(), chapter);
    commit(state, next)?;
    Ok(json!({ "chapter": state.app.chapter(&id) }))
}

fn chapters_delete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    if state.app.chapter(&id).is_none() {
        return Err(HandlerErr::new("not_found", "chapter not found").with_details(json!({ "id": id })));
    }
    let tiles_before = state.app.revision_tiles.len();
    let next = mutations::delete_chapter(state.app.clone(), &id);
    let tiles_removed = tiles_before - next.revision_tiles.len();
    commit(state, next)?;
    Ok(json!({ "id": id, "revisionTilesRemoved": tiles_removed }))
}

fn chapters_reorder(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let ids: Vec<String> = parse_param(&req.params, "ids")?;
    let next = mutations::reorder_chapters(state.app.clone(), &ids);
    commit(state, next)?;
    let order: Vec<&str> = state.app.chapters.iter().map(|c| c.id.as_str()).collect();
    Ok(json!({ "ids": order }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "chapters.add" => Some(respond(req, chapters_add(state, req))),
        "chapters.update" => Some(respond(req, chapters_update(state, req))),
        "chapters.delete" => Some(respond(req, chapters_delete(state, req))),
        "chapters.reorder" => Some(respond(req, chapters_reorder(state, req))),
        _ => None,
    }
}

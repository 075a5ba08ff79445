use crate::calc::{self, iso_date, parse_date};
use crate::ipc::helpers::{
    commit, get_opt_str, get_required_str, parse_record, require_db, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use crate::model::{new_id, PlannerTask};
use crate::mutations;
use chrono::Duration as ChronoDuration;
use serde_json::{json, Value};

fn require_task<'a>(state: &'a SidecarState, id: &str) -> Result<&'a PlannerTask, HandlerErr> {
    state
        .app
        .planner_tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| {
            HandlerErr::new("not_found", "planner task not found").with_details(json!({ "id": id }))
        })
}

fn planner_save(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let mut task: PlannerTask = parse_record(&req.params, "task")?;
    if parse_date(&task.date).is_none() {
        return Err(HandlerErr::new("bad_params", "task.date must be YYYY-MM-DD"));
    }
    if state.app.chapter(&task.chapter_id).is_none() {
        return Err(HandlerErr::new("not_found", "chapter not found")
            .with_details(json!({ "chapterId": task.chapter_id })));
    }
    if task.id.trim().is_empty() {
        task.id = new_id();
    }
    let id = task.id.clone();
    let next = mutations::save_planner_task(state.app.clone(), task);
    commit(state, next)?;
    Ok(json!({ "task": require_task(state, &id)? }))
}

fn planner_toggle(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    require_task(state, &id)?;
    let next = mutations::toggle_planner_task(state.app.clone(), &id);
    commit(state, next)?;
    Ok(json!({ "task": require_task(state, &id)? }))
}

fn planner_delete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    require_task(state, &id)?;
    let next = mutations::delete_planner_task(state.app.clone(), &id);
    commit(state, next)?;
    Ok(json!({ "id": id }))
}

fn planner_week(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let today = calc::today();
    let anchor = match get_opt_str(&req.params, "anchor") {
        Some(raw) => parse_date(&raw)
            .ok_or_else(|| HandlerErr::new("bad_params", "anchor must be YYYY-MM-DD"))?,
        None => today,
    };
    let start = calc::week_start(anchor);
    let days = calc::planner_week(&state.app, anchor, today);
    Ok(json!({
        "weekStart": iso_date(start),
        "weekEnd": iso_date(start + ChronoDuration::days(6)),
        "days": days,
    }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "planner.save" => Some(respond(req, planner_save(state, req))),
        "planner.toggle" => Some(respond(req, planner_toggle(state, req))),
        "planner.delete" => Some(respond(req, planner_delete(state, req))),
        "planner.week" => Some(respond(req, planner_week(state, req))),
        _ => None,
    }
}

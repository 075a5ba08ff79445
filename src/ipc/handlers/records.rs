//! Test records and daily logs.

use crate::calc::{self, parse_date, TestQuery};
use crate::ipc::helpers::{
    commit, get_required_str, parse_record, require_db, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use crate::model::{new_id, DailyLog, TestRecord};
use crate::mutations;
use serde_json::{json, Value};

fn require_date(date: &str, what: &str) -> Result<(), HandlerErr> {
    if parse_date(date).is_none() {
        return Err(HandlerErr::new("bad_params", format!("{what} must be YYYY-MM-DD")));
    }
    Ok(())
}

fn tests_save(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let mut test: TestRecord = parse_record(&req.params, "test")?;
    require_date(&test.date, "test.date")?;
    if test.id.trim().is_empty() {
        test.id = new_id();
    }
    let id = test.id.clone();
    let next = mutations::save_test(state.app.clone(), test);
    commit(state, next)?;
    let saved = state.app.tests.iter().find(|t| t.id == id);
    Ok(json!({ "test": saved }))
}

fn tests_delete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    if !state.app.tests.iter().any(|t| t.id == id) {
        return Err(HandlerErr::new("not_found", "test not found").with_details(json!({ "id": id })));
    }
    let next = mutations::delete_test(state.app.clone(), &id);
    commit(state, next)?;
    Ok(json!({ "id": id }))
}

pub fn parse_query(params: &Value) -> Result<TestQuery, HandlerErr> {
    match params.get("query") {
        None | Some(Value::Null) => Ok(TestQuery::default()),
        Some(raw) => serde_json::from_value(raw.clone())
            .map_err(|e| HandlerErr::new("bad_params", format!("invalid params.query: {e}"))),
    }
}

fn tests_query(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let query = parse_query(&req.params)?;
    let rows = calc::query_tests(&state.app, &query);
    let kpis = calc::test_kpis(&rows);
    let tests: Vec<Value> = rows
        .iter()
        .map(|t| {
            let overall = calc::overall_stats(&t.scores);
            json!({
                "test": t,
                "totalMarks": overall.total_marks,
                "accuracy": overall.overall_accuracy,
                "physics": calc::subject_stats(&t.scores.physics),
                "chemistry": calc::subject_stats(&t.scores.chemistry),
                "maths": calc::subject_stats(&t.scores.maths),
            })
        })
        .collect();
    Ok(json!({ "tests": tests, "kpis": kpis }))
}

fn logs_save(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let entry: DailyLog = parse_record(&req.params, "log")?;
    require_date(&entry.date, "log.date")?;
    let date = entry.date.clone();
    let next = mutations::save_log(state.app.clone(), entry);
    commit(state, next)?;
    let saved = state.app.logs.iter().find(|l| l.date == date);
    Ok(json!({ "log": saved }))
}

fn logs_delete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let id = get_required_str(&req.params, "id")?;
    if !state.app.logs.iter().any(|l| l.id == id) {
        return Err(HandlerErr::new("not_found", "log not found").with_details(json!({ "id": id })));
    }
    let next = mutations::delete_log(state.app.clone(), &id);
    commit(state, next)?;
    Ok(json!({ "id": id }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tests.save" => Some(respond(req, tests_save(state, req))),
        "tests.delete" => Some(respond(req, tests_delete(state, req))),
        "tests.query" => Some(respond(req, tests_query(state, req))),
        "logs.save" => Some(respond(req, logs_save(state, req))),
        "logs.delete" => Some(respond(req, logs_delete(state, req))),
        _ => None,
    }
}

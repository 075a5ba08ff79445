use crate::calc::{self, iso_date};
use crate::ipc::handlers::records::parse_query;
use crate::ipc::handlers::setup;
use crate::ipc::helpers::{require_db, respond, HandlerErr};
use crate::ipc::types::{Request, SidecarState};
use crate::model::{Subject, TestRecord};
use serde_json::{json, Value};

fn analytics_dashboard(state: &mut SidecarState, _req: &Request) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    let exam_date = setup::load_exam_date(conn);
    let today = calc::today();
    let app = &state.app;

    let subjects: Vec<calc::SubjectProgress> = Subject::ALL
        .into_iter()
        .map(|s| calc::subject_progress(&app.chapters, s))
        .collect();
    let tests: Vec<&TestRecord> = app.tests.iter().collect();
    let focus: Vec<Value> = calc::focus_chapters(&app.chapters)
        .into_iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "subject": c.subject,
                "priority": c.priority,
                "confidence": c.confidence,
            })
        })
        .collect();
    let today_key = iso_date(today);
    let today_log = app.logs.iter().find(|l| l.date == today_key);

    Ok(json!({
        "today": today_key,
        "examDate": iso_date(exam_date),
        "daysRemaining": calc::days_until(today, exam_date),
        "subjects": subjects,
        "testKpis": calc::test_kpis(&tests),
        "focusChapters": focus,
        "todayLog": today_log,
        "totalLogs": app.logs.len(),
    }))
}

fn analytics_trend(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    let conn = require_db(state)?;
    let query = parse_query(&req.params)?;
    let window = match req.params.get("smoothingWindow") {
        None | Some(Value::Null) => setup::load_smoothing_window(conn),
        Some(v) => v
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| HandlerErr::new("bad_params", "smoothingWindow must be a non-negative integer"))?,
    };
    let rows = calc::query_tests(&state.app, &query);
    let points = calc::score_trend(&rows, Some(window));
    Ok(json!({ "smoothingWindow": window, "points": points }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.dashboard" => Some(respond(req, analytics_dashboard(state, req))),
        "analytics.trend" => Some(respond(req, analytics_trend(state, req))),
        _ => None,
    }
}

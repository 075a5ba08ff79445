//! Two-phase assistant turns. The host performs the model call between
//! `assistant.begin` and `assistant.complete`.

use crate::assistant::{AssistantReply, BeginError, CompleteError};
use crate::ipc::handlers::tools::exec_context;
use crate::ipc::helpers::{
    commit, get_required_str, perform_exports, require_db, require_workspace, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use serde_json::{json, Value};
use std::time::Instant;

fn assistant_begin(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    require_db(state)?;
    let message = req
        .params
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let ctx = exec_context(&req.params)?;
    let start = state
        .assistant
        .begin_turn(message, &state.app, ctx.today, Instant::now())
        .map_err(|e| match e {
            BeginError::EmptyMessage => HandlerErr::new("bad_params", "message must not be empty"),
            BeginError::Busy => HandlerErr::new("busy", "an assistant turn is already in flight"),
        })?;
    Ok(json!({
        "turnId": start.turn_id,
        "request": start.request,
        "supersededTurnId": start.superseded,
        "timeoutSeconds": state.assistant.timeout().as_secs(),
    }))
}

fn assistant_complete(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let turn_id = get_required_str(&req.params, "turnId")?;
    let ctx = exec_context(&req.params)?;
    let result = match req.params.get("error").and_then(|v| v.as_str()) {
        Some(reason) => Err(reason.to_string()),
        None => {
            let reply = match req.params.get("reply") {
                None | Some(Value::Null) => AssistantReply::default(),
                Some(raw) => serde_json::from_value::<AssistantReply>(raw.clone()).map_err(|e| {
                    HandlerErr::new("bad_params", format!("invalid params.reply: {e}"))
                })?,
            };
            Ok(reply)
        }
    };

    let outcome = state
        .assistant
        .complete_turn(&turn_id, result, &ctx, Instant::now())
        .map_err(|e| match e {
            CompleteError::UnknownTurn => HandlerErr::new("not_found", "no such assistant turn")
                .with_details(json!({ "turnId": turn_id })),
        })?;

    let state_changed = match outcome.state {
        Some(next) if next != state.app => {
            if let Err(e) = commit(state, next) {
                state.assistant.retract_reply();
                return Err(e);
            }
            true
        }
        _ => false,
    };
    let exports = perform_exports(&workspace, &state.app, &outcome.exports);
    Ok(json!({
        "reply": outcome.reply,
        "log": outcome.log,
        "exports": exports,
        "timedOut": outcome.timed_out,
        "stateChanged": state_changed,
    }))
}

fn assistant_history(state: &mut SidecarState, _req: &Request) -> Result<Value, HandlerErr> {
    Ok(json!({
        "messages": state.assistant.transcript(),
        "pendingTurnId": state.assistant.pending_turn(),
        "busy": state.assistant.is_busy(Instant::now()),
    }))
}

fn assistant_reset(state: &mut SidecarState, _req: &Request) -> Result<Value, HandlerErr> {
    state.assistant.reset();
    Ok(json!({ "messages": [] }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assistant.begin" => Some(respond(req, assistant_begin(state, req))),
        "assistant.complete" => Some(respond(req, assistant_complete(state, req))),
        "assistant.history" => Some(respond(req, assistant_history(state, req))),
        "assistant.reset" => Some(respond(req, assistant_reset(state, req))),
        _ => None,
    }
}

use crate::calc::parse_date;
use crate::ipc::helpers::{
    commit, get_opt_str, parse_param, perform_exports, require_workspace, respond, HandlerErr,
};
use crate::ipc::types::{Request, SidecarState};
use crate::tools::{self, ExecContext, ToolCall};
use serde_json::{json, Value};

/// `params.today` pins the date used for absent date arguments.
pub fn exec_context(params: &Value) -> Result<ExecContext, HandlerErr> {
    match get_opt_str(params, "today") {
        Some(raw) => parse_date(&raw)
            .map(|today| ExecContext { today })
            .ok_or_else(|| HandlerErr::new("bad_params", "today must be YYYY-MM-DD")),
        None => Ok(ExecContext::now()),
    }
}

fn tools_execute(state: &mut SidecarState, req: &Request) -> Result<Value, HandlerErr> {
    let workspace = require_workspace(state)?;
    let calls: Vec<ToolCall> = parse_param(&req.params, "calls")?;
    let ctx = exec_context(&req.params)?;

    let outcome = tools::execute(&state.app, &calls, &ctx);
    let changed = outcome.state != state.app;
    if changed {
        commit(state, outcome.state)?;
    }
    let exports = perform_exports(&workspace, &state.app, &outcome.exports);
    Ok(json!({
        "log": outcome.log,
        "exports": exports,
        "stateChanged": changed,
    }))
}

pub fn try_handle(state: &mut SidecarState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tools.execute" => Some(respond(req, tools_execute(state, req))),
        _ => None,
    }
}

use super::handlers;
use super::types::{Request, SidecarState};
use crate::ipc::error::err;
use tracing::debug;

type Handler = fn(&mut SidecarState, &Request) -> Option<serde_json::Value>;

const HANDLERS: [Handler; 10] = [
    handlers::core::try_handle,
    handlers::setup::try_handle,
    handlers::chapters::try_handle,
    handlers::revision::try_handle,
    handlers::records::try_handle,
    handlers::planner::try_handle,
    handlers::analytics::try_handle,
    handlers::tools::try_handle,
    handlers::assistant::try_handle,
    handlers::backup_exchange::try_handle,
];

pub fn handle_request(state: &mut SidecarState, req: Request) -> serde_json::Value {
    debug!(id = %req.id, method = %req.method, "request");
    for handler in HANDLERS {
        if let Some(resp) = handler(state, &req) {
            return resp;
        }
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

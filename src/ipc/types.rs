use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::assistant::AssistantSession;
use crate::model::AppState;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon holds between requests.
pub struct SidecarState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Last persisted state of the open workspace.
    pub app: AppState,
    pub assistant: AssistantSession,
}

impl SidecarState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            app: AppState::default(),
            assistant: AssistantSession::default(),
        }
    }
}

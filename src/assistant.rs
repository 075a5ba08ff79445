//! One conversational turn at a time against an external model.
//!
//! A turn snapshots the state when it begins. Tool calls in the reply are
//! applied to that snapshot, not to whatever the state became while the
//! model was thinking. Every turn ends with exactly one model message in the
//! transcript, including failures and timeouts.

use crate::model::AppState;
use crate::tools::{self, ExecContext, ExportRequest, ToolCall};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const FALLBACK_REPLY: &str = "Assistant connection failed. Please retry.";
pub const TOOL_ONLY_REPLY: &str = "Executing command...";
pub const EMPTY_REPLY: &str = "I've processed your request.";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Already-decoded model output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub summary: String,
}

/// Transport to the model. Prompt construction and the network call live
/// behind this seam. The daemon itself never holds one: its host makes the
/// call between `assistant.begin` and `assistant.complete`.
#[allow(dead_code)]
pub trait AssistantBackend {
    fn respond(
        &self,
        request: AssistantRequest,
    ) -> impl Future<Output = anyhow::Result<AssistantReply>> + Send;
}

/// Chapters with subject, priority and confidence; test names with type;
/// the log count and today's date.
pub fn state_summary(state: &AppState, today: NaiveDate) -> String {
    let chapters = state
        .chapters
        .iter()
        .map(|c| {
            format!(
                "{} ({}, Prio:{}, Conf:{}%)",
                c.name,
                c.subject.label(),
                c.priority.label(),
                c.confidence
            )
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let tests = state
        .tests
        .iter()
        .map(|t| format!("{} ({})", t.name, t.test_type.label()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Chapters: {}\nTests: {}\nLogs: {} entries recorded.\nToday: {}",
        chapters,
        tests,
        state.logs.len(),
        today.format("%Y-%m-%d")
    )
}

/// Model text (or a stand-in when empty) followed by the action log.
pub fn compose_reply_text(text: Option<&str>, had_tool_calls: bool, log: &[String]) -> String {
    let mut out = match text.filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None if had_tool_calls => TOOL_ONLY_REPLY.to_string(),
        None => EMPTY_REPLY.to_string(),
    };
    if !log.is_empty() {
        out.push_str("\n\n**Actions Performed:**\n");
        let lines: Vec<String> = log.iter().map(|l| format!("• {l}")).collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginError {
    EmptyMessage,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteError {
    UnknownTurn,
}

#[derive(Debug, Clone)]
pub struct TurnStart {
    pub turn_id: String,
    pub request: AssistantRequest,
    /// Set when an expired turn was closed to make room for this one.
    pub superseded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: ChatMessage,
    /// Replacement state, present only when tool calls were applied.
    pub state: Option<AppState>,
    pub log: Vec<String>,
    pub exports: Vec<ExportRequest>,
    pub timed_out: bool,
}

impl TurnOutcome {
    fn fallback(timed_out: bool) -> Self {
        Self {
            reply: ChatMessage::model(FALLBACK_REPLY),
            state: None,
            log: Vec::new(),
            exports: Vec::new(),
            timed_out,
        }
    }
}

#[derive(Debug)]
struct PendingTurn {
    id: String,
    started: Instant,
    snapshot: AppState,
}

#[derive(Debug)]
pub struct AssistantSession {
    transcript: Vec<ChatMessage>,
    pending: Option<PendingTurn>,
    timeout: Duration,
    history_limit: usize,
    turns_started: u64,
}

impl Default for AssistantSession {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, 0)
    }
}

impl AssistantSession {
    /// `history_limit` of 0 sends the whole transcript.
    pub fn new(timeout: Duration, history_limit: usize) -> Self {
        Self {
            transcript: Vec::new(),
            pending: None,
            timeout,
            history_limit,
            turns_started: 0,
        }
    }

    pub fn configure(&mut self, timeout: Duration, history_limit: usize) {
        self.timeout = timeout;
        self.history_limit = history_limit;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn pending_turn(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.id.as_str())
    }

    fn expired(&self, pending: &PendingTurn, now: Instant) -> bool {
        now.saturating_duration_since(pending.started) >= self.timeout
    }

    pub fn is_busy(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .map(|p| !self.expired(p, now))
            .unwrap_or(false)
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.pending = None;
    }

    fn history(&self) -> Vec<ChatMessage> {
        let skip = match self.history_limit {
            0 => 0,
            n => self.transcript.len().saturating_sub(n),
        };
        self.transcript[skip..].to_vec()
    }

    pub fn begin_turn(
        &mut self,
        message: &str,
        state: &AppState,
        today: NaiveDate,
        now: Instant,
    ) -> Result<TurnStart, BeginError> {
        if message.trim().is_empty() {
            return Err(BeginError::EmptyMessage);
        }
        if self.is_busy(now) {
            return Err(BeginError::Busy);
        }
        let superseded = self.pending.take().map(|p| {
            warn!(turn = %p.id, "assistant turn expired before completion");
            self.transcript.push(ChatMessage::model(FALLBACK_REPLY));
            p.id
        });

        let request = AssistantRequest {
            message: message.to_string(),
            history: self.history(),
            summary: state_summary(state, today),
        };
        self.transcript.push(ChatMessage::user(message));
        self.turns_started += 1;
        let turn_id = format!("turn-{}", self.turns_started);
        self.pending = Some(PendingTurn {
            id: turn_id.clone(),
            started: now,
            snapshot: state.clone(),
        });
        info!(turn = %turn_id, "assistant turn started");
        Ok(TurnStart {
            turn_id,
            request,
            superseded,
        })
    }

    /// `Err(reason)` records the fallback reply and leaves the state alone.
    pub fn complete_turn(
        &mut self,
        turn_id: &str,
        result: Result<AssistantReply, String>,
        ctx: &ExecContext,
        now: Instant,
    ) -> Result<TurnOutcome, CompleteError> {
        if self.pending.as_ref().map(|p| p.id.as_str()) != Some(turn_id) {
            return Err(CompleteError::UnknownTurn);
        }
        let Some(pending) = self.pending.take() else {
            return Err(CompleteError::UnknownTurn);
        };

        let outcome = if self.expired(&pending, now) {
            warn!(turn = %turn_id, "assistant reply arrived after the turn expired");
            TurnOutcome::fallback(true)
        } else {
            match result {
                Err(reason) => {
                    warn!(turn = %turn_id, %reason, "assistant call failed");
                    TurnOutcome::fallback(false)
                }
                Ok(reply) => Self::apply_reply(&pending.snapshot, reply, ctx),
            }
        };
        self.transcript.push(outcome.reply.clone());
        info!(
            turn = %turn_id,
            actions = outcome.log.len(),
            timed_out = outcome.timed_out,
            "assistant turn finished"
        );
        Ok(outcome)
    }

    /// Replaces the reply of the turn just completed with the fallback, for
    /// when its state could not be stored.
    pub fn retract_reply(&mut self) -> ChatMessage {
        let fallback = ChatMessage::model(FALLBACK_REPLY);
        match self.transcript.last_mut() {
            Some(last) if last.role == Role::Model => *last = fallback.clone(),
            _ => self.transcript.push(fallback.clone()),
        }
        fallback
    }

    fn apply_reply(snapshot: &AppState, reply: AssistantReply, ctx: &ExecContext) -> TurnOutcome {
        let had_tool_calls = !reply.tool_calls.is_empty();
        let (state, log, exports) = if had_tool_calls {
            let out = tools::execute(snapshot, &reply.tool_calls, ctx);
            (Some(out.state), out.log, out.exports)
        } else {
            (None, Vec::new(), Vec::new())
        };
        let text = compose_reply_text(reply.text.as_deref(), had_tool_calls, &log);
        TurnOutcome {
            reply: ChatMessage::model(text),
            state,
            log,
            exports,
            timed_out: false,
        }
    }

    /// Begins a turn, awaits `backend` under the session timeout, and
    /// completes the turn with whatever came back. In-process counterpart of
    /// the two-phase IPC turn.
    #[allow(dead_code)]
    pub async fn run_turn<B: AssistantBackend>(
        &mut self,
        backend: &B,
        message: &str,
        state: &AppState,
        ctx: &ExecContext,
    ) -> Result<TurnOutcome, BeginError> {
        let start = self.begin_turn(message, state, ctx.today, Instant::now())?;
        let result = match tokio::time::timeout(self.timeout, backend.respond(start.request)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        };
        let timed_out = matches!(&result, Err(r) if r.starts_with("timed out"));
        match self.complete_turn(&start.turn_id, result, ctx, Instant::now()) {
            Ok(mut outcome) => {
                outcome.timed_out |= timed_out;
                Ok(outcome)
            }
            Err(CompleteError::UnknownTurn) => Ok(TurnOutcome::fallback(timed_out)),
        }
    }
}

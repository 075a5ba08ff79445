//! Tool calls emitted by the study assistant, decoded into a closed set of
//! operations and applied to the app state.

pub mod args;
mod executor;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use args::{opt_bool, opt_count, opt_f64, opt_i64, opt_str, opt_text, Args};

pub use executor::{execute, ExecContext, ExecOutcome, ExportRequest};

/// A named operation with an untyped argument bag, as produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

#[cfg(test)]
impl ToolCall {
    pub fn new(name: impl Into<String>, args: JsonValue) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddChapterArgs {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub unit: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateChapterArgs {
    pub chapter_name: Option<String>,
    pub unit: Option<String>,
    pub priority: Option<String>,
    pub confidence: Option<f64>,
    pub rev1: Option<bool>,
    pub rev2: Option<bool>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkUpdateArgs {
    pub filter_unit: Option<String>,
    pub update_unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePyqArgs {
    pub chapter_name: Option<String>,
    pub year: Option<i64>,
    pub completed: Option<bool>,
    pub done: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreArgs {
    pub correct: Option<u32>,
    pub incorrect: Option<u32>,
    pub unattempted: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddTestArgs {
    pub name: Option<String>,
    pub date: Option<String>,
    pub test_type: Option<String>,
    pub subject: Option<String>,
    pub time_taken: Option<String>,
    pub notes: Option<String>,
    pub physics: ScoreArgs,
    pub chemistry: ScoreArgs,
    pub maths: ScoreArgs,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddRevisionArgs {
    pub chapter_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub target_q: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogDailyArgs {
    pub date: Option<String>,
    pub physics_q: Option<u32>,
    pub chemistry_q: Option<u32>,
    pub math_q: Option<u32>,
    pub study_time: Option<u32>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Chapter,
    Test,
    Revision,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteArgs {
    pub target: Option<DeleteTarget>,
    pub identifier: Option<String>,
}

/// Every operation the executor understands. Fields stay optional; defaults
/// are substituted when the operation is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOp {
    AddChapter(AddChapterArgs),
    UpdateChapter(UpdateChapterArgs),
    BulkUpdateChapters(BulkUpdateArgs),
    UpdatePyq(UpdatePyqArgs),
    AddTest(AddTestArgs),
    AddRevisionPlan(AddRevisionArgs),
    LogDailyProgress(LogDailyArgs),
    DeleteItem(DeleteArgs),
    ExportData,
    ExportLogs,
}

fn score_args(args: &Args, prefix: &str) -> ScoreArgs {
    ScoreArgs {
        correct: opt_count(args, &format!("{prefix}_correct")),
        incorrect: opt_count(args, &format!("{prefix}_incorrect")),
        unattempted: opt_count(args, &format!("{prefix}_unattempted")),
    }
}

fn delete_target(raw: Option<String>) -> Option<DeleteTarget> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "chapter" => Some(DeleteTarget::Chapter),
        "test" => Some(DeleteTarget::Test),
        "revision" => Some(DeleteTarget::Revision),
        _ => None,
    }
}

impl ToolOp {
    /// `None` for names outside the known set.
    pub fn decode(call: &ToolCall) -> Option<ToolOp> {
        let empty = Args::new();
        let a = call.args.as_object().unwrap_or(&empty);
        let op = match call.name.as_str() {
            "addChapter" => ToolOp::AddChapter(AddChapterArgs {
                name: opt_text(a, "name"),
                subject: opt_str(a, "subject"),
                unit: opt_text(a, "unit"),
                priority: opt_str(a, "priority"),
            }),
            "updateChapter" => ToolOp::UpdateChapter(UpdateChapterArgs {
                chapter_name: opt_str(a, "chapterName"),
                unit: opt_str(a, "unit").map(|s| s.trim().to_string()),
                priority: opt_text(a, "priority"),
                confidence: opt_f64(a, "confidence"),
                rev1: opt_bool(a, "rev1"),
                rev2: opt_bool(a, "rev2"),
                remarks: opt_str(a, "remarks"),
            }),
            "bulkUpdateChapters" => ToolOp::BulkUpdateChapters(BulkUpdateArgs {
                filter_unit: opt_text(a, "filterUnit"),
                update_unit: opt_str(a, "updateUnit").map(|s| s.trim().to_string()),
            }),
            "updatePYQ" => ToolOp::UpdatePyq(UpdatePyqArgs {
                chapter_name: opt_str(a, "chapterName"),
                year: opt_i64(a, "year"),
                completed: opt_bool(a, "completed"),
                done: opt_count(a, "done"),
            }),
            "addTest" => ToolOp::AddTest(AddTestArgs {
                name: opt_text(a, "name"),
                date: opt_text(a, "date"),
                test_type: opt_str(a, "type"),
                subject: opt_text(a, "subject"),
                time_taken: opt_text(a, "timeTaken"),
                notes: opt_str(a, "notes"),
                physics: score_args(a, "physics"),
                chemistry: score_args(a, "chemistry"),
                maths: score_args(a, "maths"),
            }),
            "addRevisionPlan" => ToolOp::AddRevisionPlan(AddRevisionArgs {
                chapter_name: opt_str(a, "chapterName"),
                start_date: opt_text(a, "startDate"),
                end_date: opt_text(a, "endDate"),
                target_q: opt_count(a, "targetQ"),
                notes: opt_str(a, "notes"),
            }),
            "logDailyProgress" => ToolOp::LogDailyProgress(LogDailyArgs {
                date: opt_text(a, "date"),
                physics_q: opt_count(a, "physicsQ"),
                chemistry_q: opt_count(a, "chemistryQ"),
                math_q: opt_count(a, "mathQ"),
                study_time: opt_count(a, "studyTime"),
                remarks: opt_str(a, "remarks"),
            }),
            "deleteItem" => ToolOp::DeleteItem(DeleteArgs {
                target: delete_target(opt_str(a, "type")),
                identifier: opt_str(a, "identifier"),
            }),
            "exportData" => ToolOp::ExportData,
            "exportLogs" => ToolOp::ExportLogs,
            _ => return None,
        };
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_names_do_not_decode() {
        assert_eq!(ToolOp::decode(&ToolCall::new("launchRocket", json!({}))), None);
        assert_eq!(ToolOp::decode(&ToolCall::new("AddChapter", json!({}))), None);
    }

    #[test]
    fn non_object_args_decode_as_empty() {
        let op = ToolOp::decode(&ToolCall::new("addChapter", json!("Waves")));
        assert_eq!(op, Some(ToolOp::AddChapter(AddChapterArgs::default())));
    }

    #[test]
    fn add_test_reads_per_subject_fields() {
        let op = ToolOp::decode(&ToolCall::new(
            "addTest",
            json!({ "name": "Mock 5", "physics_correct": 20, "maths_incorrect": "3" }),
        ));
        let Some(ToolOp::AddTest(a)) = op else {
            panic!("expected addTest");
        };
        assert_eq!(a.physics.correct, Some(20));
        assert_eq!(a.maths.incorrect, Some(3));
        assert_eq!(a.chemistry, ScoreArgs::default());
    }

    #[test]
    fn delete_target_is_case_insensitive() {
        let op = ToolOp::decode(&ToolCall::new(
            "deleteItem",
            json!({ "type": "Chapter", "identifier": "wave" }),
        ));
        assert_eq!(
            op,
            Some(ToolOp::DeleteItem(DeleteArgs {
                target: Some(DeleteTarget::Chapter),
                identifier: Some("wave".into()),
            }))
        );
    }
}

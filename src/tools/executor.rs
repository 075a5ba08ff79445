use super::{
    AddChapterArgs, AddRevisionArgs, AddTestArgs, BulkUpdateArgs, DeleteArgs, DeleteTarget,
    LogDailyArgs, ScoreArgs, ToolCall, ToolOp, UpdateChapterArgs, UpdatePyqArgs,
};
use crate::calc::{iso_date, parse_date, today};
use crate::model::{
    default_pyqs, new_id, AppState, Chapter, DailyLog, RevisionTile, Scores, SubjectScore,
    TestRecord,
};
use crate::tools::args::{normalize_priority, normalize_subject, normalize_test_type};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

const DEFAULT_CHAPTER_NAME: &str = "New Chapter";
const DEFAULT_CHAPTER_UNIT: &str = "General";
const DEFAULT_TEST_NAME: &str = "Test";
const DEFAULT_REVISION_TARGET: u32 = 50;

#[derive(Debug, Clone, Copy)]
pub struct ExecContext {
    /// Stands in for every absent date argument.
    pub today: NaiveDate,
}

impl ExecContext {
    pub fn now() -> Self {
        Self { today: today() }
    }
}

/// File exports requested by a batch. The caller performs them once the
/// resulting state has been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportRequest {
    Data,
    Logs,
}

#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub state: AppState,
    pub log: Vec<String>,
    pub exports: Vec<ExportRequest>,
}

#[derive(Debug, Default)]
struct Step {
    log: Vec<String>,
    export: Option<ExportRequest>,
}

impl Step {
    fn none() -> Self {
        Self::default()
    }

    fn logged(line: impl Into<String>) -> Self {
        Self {
            log: vec![line.into()],
            export: None,
        }
    }
}

/// Applies `calls` in order. Each call sees the effect of the ones before
/// it. `state` is left untouched; unknown names and unmatched lookups are
/// skipped without a log line.
pub fn execute(state: &AppState, calls: &[ToolCall], ctx: &ExecContext) -> ExecOutcome {
    let mut next = state.clone();
    let mut log = Vec::new();
    let mut exports = Vec::new();

    for call in calls {
        let Some(op) = ToolOp::decode(call) else {
            debug!(name = %call.name, "ignoring unknown tool call");
            continue;
        };
        let (state, step) = apply(next, op, ctx);
        next = state;
        if step.log.is_empty() {
            debug!(name = %call.name, "tool call had no effect");
        }
        log.extend(step.log);
        exports.extend(step.export);
    }

    info!(
        calls = calls.len(),
        actions = log.len(),
        exports = exports.len(),
        "tool batch applied"
    );
    ExecOutcome {
        state: next,
        log,
        exports,
    }
}

fn apply(state: AppState, op: ToolOp, ctx: &ExecContext) -> (AppState, Step) {
    match op {
        ToolOp::AddChapter(a) => add_chapter(state, a),
        ToolOp::UpdateChapter(a) => update_chapter(state, a),
        ToolOp::BulkUpdateChapters(a) => bulk_update_chapters(state, a),
        ToolOp::UpdatePyq(a) => update_pyq(state, a),
        ToolOp::AddTest(a) => add_test(state, a, ctx),
        ToolOp::AddRevisionPlan(a) => add_revision_plan(state, a, ctx),
        ToolOp::LogDailyProgress(a) => log_daily_progress(state, a, ctx),
        ToolOp::DeleteItem(a) => delete_item(state, a),
        ToolOp::ExportData => (
            state,
            Step {
                log: vec!["Triggered data export.".to_string()],
                export: Some(ExportRequest::Data),
            },
        ),
        ToolOp::ExportLogs => (
            state,
            Step {
                log: vec!["Triggered logs export.".to_string()],
                export: Some(ExportRequest::Logs),
            },
        ),
    }
}

fn contains_fragment(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.to_lowercase())
}

/// First chapter, in collection order, whose name contains `fragment`.
/// An absent fragment reads as empty and so matches the first chapter.
fn find_chapter(chapters: &[Chapter], fragment: Option<&str>) -> Option<usize> {
    let fragment = fragment.unwrap_or("");
    chapters
        .iter()
        .position(|c| contains_fragment(&c.name, fragment))
}

fn date_or_today(raw: Option<&str>, ctx: &ExecContext) -> String {
    let date = raw.and_then(parse_date).unwrap_or(ctx.today);
    iso_date(date)
}

fn add_chapter(mut state: AppState, a: AddChapterArgs) -> (AppState, Step) {
    let chapter = Chapter {
        id: new_id(),
        name: a.name.unwrap_or_else(|| DEFAULT_CHAPTER_NAME.to_string()),
        subject: normalize_subject(a.subject.as_deref()),
        unit: a.unit.unwrap_or_else(|| DEFAULT_CHAPTER_UNIT.to_string()),
        priority: normalize_priority(a.priority.as_deref()),
        confidence: 0,
        rev1: false,
        rev2: false,
        pyqs: default_pyqs(""),
        remarks: Some(String::new()),
        study_links: Some(String::new()),
    };
    let line = format!("Added chapter: {}", chapter.name);
    state.chapters.push(chapter);
    (state, Step::logged(line))
}

fn update_chapter(mut state: AppState, a: UpdateChapterArgs) -> (AppState, Step) {
    let Some(idx) = find_chapter(&state.chapters, a.chapter_name.as_deref()) else {
        return (state, Step::none());
    };
    let prev = &state.chapters[idx];
    let updated = Chapter {
        unit: a.unit.unwrap_or_else(|| prev.unit.clone()),
        priority: a
            .priority
            .as_deref()
            .map(|p| normalize_priority(Some(p)))
            .unwrap_or(prev.priority),
        confidence: a
            .confidence
            .map(|c| c.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(prev.confidence),
        rev1: a.rev1.unwrap_or(prev.rev1),
        rev2: a.rev2.unwrap_or(prev.rev2),
        remarks: a.remarks.or_else(|| prev.remarks.clone()),
        ..prev.clone()
    };
    let line = format!("Updated chapter: {}", updated.name);
    state.chapters[idx] = updated;
    (state, Step::logged(line))
}

fn bulk_update_chapters(mut state: AppState, a: BulkUpdateArgs) -> (AppState, Step) {
    let new_unit = a.update_unit.unwrap_or_default();
    let filter = a.filter_unit.unwrap_or_default();
    let mut updated = 0usize;
    if !filter.is_empty() {
        let wanted = filter.to_lowercase();
        for chapter in state.chapters.iter_mut() {
            if !chapter.unit.is_empty() && chapter.unit.to_lowercase() == wanted {
                chapter.unit = new_unit.clone();
                updated += 1;
            }
        }
    }
    let line = if new_unit.is_empty() {
        format!("Removed tag \"{filter}\" from {updated} chapters.")
    } else {
        format!("Updated tag to \"{new_unit}\" for {updated} chapters.")
    };
    (state, Step::logged(line))
}

fn update_pyq(mut state: AppState, a: UpdatePyqArgs) -> (AppState, Step) {
    let Some(idx) = find_chapter(&state.chapters, a.chapter_name.as_deref()) else {
        return (state, Step::none());
    };
    let Some(year) = a.year else {
        return (state, Step::none());
    };
    let Some(pos) = state.chapters[idx]
        .pyqs
        .iter()
        .position(|p| i64::from(p.year) == year)
    else {
        return (state, Step::none());
    };
    let chapter = &mut state.chapters[idx];
    let entry = &mut chapter.pyqs[pos];
    if let Some(completed) = a.completed {
        entry.completed = completed;
    }
    if let Some(done) = a.done {
        entry.done = done;
    }
    let line = format!("Updated PYQ {year} for {}", chapter.name);
    (state, Step::logged(line))
}

fn score_from(a: ScoreArgs) -> SubjectScore {
    SubjectScore {
        correct: a.correct.unwrap_or(0),
        incorrect: a.incorrect.unwrap_or(0),
        unattempted: a.unattempted.unwrap_or(0),
    }
}

fn add_test(mut state: AppState, a: AddTestArgs, ctx: &ExecContext) -> (AppState, Step) {
    let test_type = normalize_test_type(a.test_type.as_deref());
    let test = TestRecord {
        id: new_id(),
        name: a.name.unwrap_or_else(|| DEFAULT_TEST_NAME.to_string()),
        date: date_or_today(a.date.as_deref(), ctx),
        test_type,
        subject: test_type
            .is_single_subject()
            .then(|| normalize_subject(a.subject.as_deref())),
        linked_chapters: None,
        time_taken: a.time_taken,
        notes: Some(a.notes.unwrap_or_default()),
        scores: Scores {
            physics: score_from(a.physics),
            chemistry: score_from(a.chemistry),
            maths: score_from(a.maths),
        },
    };
    let line = format!("Added test: {}", test.name);
    state.tests.push(test);
    (state, Step::logged(line))
}

fn add_revision_plan(
    mut state: AppState,
    a: AddRevisionArgs,
    ctx: &ExecContext,
) -> (AppState, Step) {
    let Some(idx) = find_chapter(&state.chapters, a.chapter_name.as_deref()) else {
        return (state, Step::none());
    };
    let chapter = &state.chapters[idx];
    let tile = RevisionTile {
        id: new_id(),
        chapter_id: chapter.id.clone(),
        subject: chapter.subject,
        start_date: date_or_today(a.start_date.as_deref(), ctx),
        end_date: date_or_today(a.end_date.as_deref(), ctx),
        target_q: a
            .target_q
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_REVISION_TARGET),
        attempted_q: 0,
        notes: Some(a.notes.unwrap_or_default()),
    };
    let line = format!("Planned revision for {}", chapter.name);
    state.revision_tiles.push(tile);
    (state, Step::logged(line))
}

fn log_daily_progress(
    mut state: AppState,
    a: LogDailyArgs,
    ctx: &ExecContext,
) -> (AppState, Step) {
    let date = date_or_today(a.date.as_deref(), ctx);
    let existing = state.logs.iter().position(|l| l.date == date);
    let prev = existing.map(|i| state.logs[i].clone());

    let entry = DailyLog {
        id: prev.as_ref().map(|p| p.id.clone()).unwrap_or_else(new_id),
        date: date.clone(),
        physics_q: a
            .physics_q
            .or(prev.as_ref().map(|p| p.physics_q))
            .unwrap_or(0),
        chemistry_q: a
            .chemistry_q
            .or(prev.as_ref().map(|p| p.chemistry_q))
            .unwrap_or(0),
        math_q: a.math_q.or(prev.as_ref().map(|p| p.math_q)).unwrap_or(0),
        study_time: a
            .study_time
            .or(prev.as_ref().map(|p| p.study_time))
            .unwrap_or(0),
        remarks: a
            .remarks
            .or_else(|| prev.as_ref().and_then(|p| p.remarks.clone()))
            .or_else(|| Some(String::new())),
    };

    match existing {
        Some(i) => state.logs[i] = entry,
        None => state.logs.push(entry),
    }
    (state, Step::logged(format!("Logged progress for {date}")))
}

fn delete_item(mut state: AppState, a: DeleteArgs) -> (AppState, Step) {
    let Some(target) = a.target else {
        return (state, Step::none());
    };
    // An empty identifier is contained in every name.
    let fragment = a.identifier.unwrap_or_default();
    match target {
        DeleteTarget::Chapter => {
            let removed: HashSet<String> = state
                .chapters
                .iter()
                .filter(|c| contains_fragment(&c.name, &fragment))
                .map(|c| c.id.clone())
                .collect();
            if removed.is_empty() {
                return (state, Step::none());
            }
            let names: Vec<String> = state
                .chapters
                .iter()
                .filter(|c| removed.contains(&c.id))
                .map(|c| c.name.clone())
                .collect();
            state.chapters.retain(|c| !removed.contains(&c.id));
            // Planner tasks keep their chapter reference.
            state
                .revision_tiles
                .retain(|t| !removed.contains(&t.chapter_id));
            let line = format!(
                "Deleted chapter matching '{}': {}",
                fragment.to_lowercase(),
                names.join(", ")
            );
            (state, Step::logged(line))
        }
        DeleteTarget::Test => {
            let before = state.tests.len();
            state.tests.retain(|t| !contains_fragment(&t.name, &fragment));
            let removed = before - state.tests.len();
            if removed == 0 {
                return (state, Step::none());
            }
            let line = format!(
                "Deleted {removed} test(s) matching '{}'",
                fragment.to_lowercase()
            );
            (state, Step::logged(line))
        }
        DeleteTarget::Revision => {
            let Some(idx) = find_chapter(&state.chapters, Some(&fragment)) else {
                return (state, Step::none());
            };
            let chapter_id = state.chapters[idx].id.clone();
            let before = state.revision_tiles.len();
            state.revision_tiles.retain(|t| t.chapter_id != chapter_id);
            if state.revision_tiles.len() == before {
                return (state, Step::none());
            }
            let line = format!("Deleted revision plans for {}", state.chapters[idx].name);
            (state, Step::logged(line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlannerTask, Priority, Subject, TestType};
    use serde_json::json;

    fn ctx() -> ExecContext {
        ExecContext {
            today: NaiveDate::from_ymd_opt(2025, 11, 3).expect("date"),
        }
    }

    fn run(state: &AppState, calls: Vec<(&str, serde_json::Value)>) -> ExecOutcome {
        let calls: Vec<ToolCall> = calls
            .into_iter()
            .map(|(name, args)| ToolCall::new(name, args))
            .collect();
        execute(state, &calls, &ctx())
    }

    fn with_chapters(specs: &[(&str, &str)]) -> AppState {
        let calls = specs
            .iter()
            .map(|(name, unit)| ("addChapter", json!({ "name": name, "unit": unit })))
            .collect();
        run(&AppState::default(), calls).state
    }

    #[test]
    fn add_chapter_builds_defaults() {
        let out = run(
            &AppState::default(),
            vec![("addChapter", json!({ "name": "Waves", "subject": "physics" }))],
        );
        assert_eq!(out.state.chapters.len(), 1);
        let c = &out.state.chapters[0];
        assert_eq!(c.name, "Waves");
        assert_eq!(c.subject, Subject::Physics);
        assert_eq!(c.priority, Priority::C);
        assert_eq!(c.confidence, 0);
        assert!(!c.rev1 && !c.rev2);
        assert_eq!(c.pyqs.len(), 5);
        assert!(c
            .pyqs
            .iter()
            .all(|p| p.done == 0 && p.total == 30 && !p.completed && p.link.is_empty()));
        assert_eq!(out.log, vec!["Added chapter: Waves".to_string()]);
    }

    #[test]
    fn add_chapter_without_name_uses_placeholder() {
        let out = run(&AppState::default(), vec![("addChapter", json!({ "subject": "bio" }))]);
        let c = &out.state.chapters[0];
        assert_eq!(c.name, DEFAULT_CHAPTER_NAME);
        assert_eq!(c.subject, Subject::Physics);
        assert_eq!(c.unit, DEFAULT_CHAPTER_UNIT);
    }

    #[test]
    fn generated_ids_are_unique() {
        let state = with_chapters(&[("A", ""), ("B", ""), ("C", "")]);
        let ids: HashSet<&str> = state.chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn input_state_is_not_mutated() {
        let state = with_chapters(&[("Waves", "")]);
        let snapshot = state.clone();
        let _ = run(
            &state,
            vec![
                ("updateChapter", json!({ "chapterName": "wave", "confidence": 80 })),
                ("deleteItem", json!({ "type": "chapter", "identifier": "wave" })),
            ],
        );
        assert_eq!(state, snapshot);
    }

    #[test]
    fn later_calls_see_earlier_effects() {
        let out = run(
            &AppState::default(),
            vec![
                ("addChapter", json!({ "name": "Rotational Motion", "subject": "physics" })),
                ("updateChapter", json!({ "chapterName": "rotational", "priority": "Priority A" })),
            ],
        );
        assert_eq!(out.state.chapters[0].priority, Priority::A);
        assert_eq!(out.log.len(), 2);
    }

    #[test]
    fn update_chapter_only_touches_present_fields() {
        let state = with_chapters(&[("Electrostatics", "Electricity")]);
        let out = run(
            &state,
            vec![("updateChapter", json!({ "chapterName": "ELECTRO", "rev1": true, "confidence": 140 }))],
        );
        let c = &out.state.chapters[0];
        assert!(c.rev1);
        assert!(!c.rev2);
        assert_eq!(c.confidence, 100);
        assert_eq!(c.priority, state.chapters[0].priority);
        assert_eq!(c.unit, "Electricity");
        assert_eq!(out.log, vec!["Updated chapter: Electrostatics".to_string()]);
    }

    #[test]
    fn update_chapter_first_match_wins() {
        let state = with_chapters(&[("Wave Optics", ""), ("Waves & Sound", "")]);
        let out = run(
            &state,
            vec![("updateChapter", json!({ "chapterName": "wave", "confidence": 40 }))],
        );
        assert_eq!(out.state.chapters[0].confidence, 40);
        assert_eq!(out.state.chapters[1].confidence, 0);
    }

    #[test]
    fn update_without_match_is_silent() {
        let state = with_chapters(&[("Waves", "")]);
        let out = run(
            &state,
            vec![
                ("updateChapter", json!({ "chapterName": "thermo", "confidence": 10 })),
            ],
        );
        assert_eq!(out.state, state);
        assert!(out.log.is_empty());
    }

    #[test]
    fn missing_or_empty_fragment_matches_every_name() {
        let state = with_chapters(&[("Waves", ""), ("Optics", "")]);
        let out = run(&state, vec![("updateChapter", json!({ "confidence": 40 }))]);
        assert_eq!(out.state.chapters[0].confidence, 40);
        assert_eq!(out.state.chapters[1].confidence, 0);
        assert_eq!(out.log, vec!["Updated chapter: Waves".to_string()]);

        let out = run(
            &state,
            vec![("deleteItem", json!({ "type": "chapter", "identifier": "" }))],
        );
        assert!(out.state.chapters.is_empty());
        assert_eq!(out.log.len(), 1);
    }

    #[test]
    fn bulk_update_clears_matching_units() {
        let state = with_chapters(&[
            ("Laws of Motion", "Mechanics"),
            ("Gravitation", "mechanics"),
            ("Ray Optics", "Optics"),
        ]);
        let out = run(
            &state,
            vec![("bulkUpdateChapters", json!({ "filterUnit": "Mechanics", "updateUnit": "" }))],
        );
        let units: Vec<&str> = out.state.chapters.iter().map(|c| c.unit.as_str()).collect();
        assert_eq!(units, vec!["", "", "Optics"]);
        assert_eq!(out.log.len(), 1);
        assert!(out.log[0].contains("Removed tag"));
        assert!(out.log[0].contains('2'));
    }

    #[test]
    fn bulk_update_renames_and_reports_count() {
        let state = with_chapters(&[("Ray Optics", "Optics"), ("Wave Optics", "Optics")]);
        let out = run(
            &state,
            vec![("bulkUpdateChapters", json!({ "filterUnit": "optics", "updateUnit": "Light" }))],
        );
        assert!(out.state.chapters.iter().all(|c| c.unit == "Light"));
        assert_eq!(out.log, vec!["Updated tag to \"Light\" for 2 chapters.".to_string()]);
    }

    #[test]
    fn bulk_update_without_filter_matches_nothing() {
        let state = with_chapters(&[("Ray Optics", "Optics")]);
        let out = run(&state, vec![("bulkUpdateChapters", json!({ "updateUnit": "X" }))]);
        assert_eq!(out.state, state);
        assert!(out.log[0].contains("for 0 chapters"));
    }

    #[test]
    fn update_pyq_matches_exact_year() {
        let state = with_chapters(&[("Definite Integration", "")]);
        let out = run(
            &state,
            vec![
                ("updatePYQ", json!({ "chapterName": "integration", "year": 2023, "completed": true, "done": 18 })),
                ("updatePYQ", json!({ "chapterName": "integration", "year": 2019, "completed": true })),
            ],
        );
        let pyqs = &out.state.chapters[0].pyqs;
        let y2023 = pyqs.iter().find(|p| p.year == 2023).expect("2023");
        assert!(y2023.completed);
        assert_eq!(y2023.done, 18);
        assert_eq!(pyqs.iter().filter(|p| p.completed).count(), 1);
        assert_eq!(out.log, vec!["Updated PYQ 2023 for Definite Integration".to_string()]);
    }

    #[test]
    fn add_test_defaults_scores_and_date() {
        let out = run(
            &AppState::default(),
            vec![(
                "addTest",
                json!({ "name": "Mock 7", "type": "part test", "physics_correct": 20, "physics_incorrect": 4 }),
            )],
        );
        let t = &out.state.tests[0];
        assert_eq!(t.date, "2025-11-03");
        assert_eq!(t.test_type, TestType::PartTest);
        assert_eq!(t.scores.physics.correct, 20);
        assert_eq!(t.scores.physics.incorrect, 4);
        assert_eq!(t.scores.chemistry, SubjectScore::default());
        assert_eq!(t.scores.maths, SubjectScore::default());
    }

    #[test]
    fn test_subject_is_kept_only_for_single_subject_types() {
        let out = run(
            &AppState::default(),
            vec![
                ("addTest", json!({ "name": "Full Mock", "subject": "none" })),
                ("addTest", json!({ "name": "PYQ 2024", "type": "pyq mock", "subject": "maths" })),
                ("addTest", json!({ "name": "Organic CW", "type": "Chapter Wise", "subject": "chem" })),
                ("addTest", json!({ "name": "Part 2", "type": "part test" })),
            ],
        );
        let subjects: Vec<Option<Subject>> = out.state.tests.iter().map(|t| t.subject).collect();
        assert_eq!(
            subjects,
            vec![None, None, Some(Subject::Chemistry), Some(Subject::Physics)]
        );
    }

    #[test]
    fn unknown_call_is_dropped_from_batch() {
        let out = run(
            &AppState::default(),
            vec![
                ("rescheduleExam", json!({ "date": "2026-04-01" })),
                ("addTest", json!({ "name": "Mock 1", "date": "2025-10-01" })),
            ],
        );
        assert_eq!(out.state.tests.len(), 1);
        assert_eq!(out.log.len(), 1);
    }

    #[test]
    fn revision_plan_copies_chapter_subject() {
        let state = run(
            &AppState::default(),
            vec![("addChapter", json!({ "name": "Amines", "subject": "chemistry" }))],
        )
        .state;
        let out = run(
            &state,
            vec![(
                "addRevisionPlan",
                json!({ "chapterName": "amine", "subject": "maths", "startDate": "2025-11-10" }),
            )],
        );
        let tile = &out.state.revision_tiles[0];
        assert_eq!(tile.subject, Subject::Chemistry);
        assert_eq!(tile.chapter_id, state.chapters[0].id);
        assert_eq!(tile.start_date, "2025-11-10");
        assert_eq!(tile.end_date, "2025-11-03");
        assert_eq!(tile.target_q, 50);
        assert_eq!(tile.attempted_q, 0);
    }

    #[test]
    fn revision_plan_without_chapter_is_skipped() {
        let out = run(
            &AppState::default(),
            vec![("addRevisionPlan", json!({ "chapterName": "amine" }))],
        );
        assert!(out.state.revision_tiles.is_empty());
        assert!(out.log.is_empty());
    }

    #[test]
    fn daily_log_upserts_by_date() {
        let first = run(
            &AppState::default(),
            vec![(
                "logDailyProgress",
                json!({ "date": "2025-11-01", "physicsQ": 40, "studyTime": 120, "remarks": "solid" }),
            )],
        );
        let id = first.state.logs[0].id.clone();
        let second = run(
            &first.state,
            vec![("logDailyProgress", json!({ "date": "2025-11-01", "mathQ": 25, "physicsQ": 50 }))],
        );
        assert_eq!(second.state.logs.len(), 1);
        let l = &second.state.logs[0];
        assert_eq!(l.id, id);
        assert_eq!(l.physics_q, 50);
        assert_eq!(l.math_q, 25);
        assert_eq!(l.chemistry_q, 0);
        assert_eq!(l.study_time, 120);
        assert_eq!(l.remarks.as_deref(), Some("solid"));
    }

    #[test]
    fn daily_log_defaults_to_today() {
        let out = run(&AppState::default(), vec![("logDailyProgress", json!({ "chemistryQ": 12 }))]);
        assert_eq!(out.state.logs[0].date, "2025-11-03");
        assert_eq!(out.log, vec!["Logged progress for 2025-11-03".to_string()]);
    }

    #[test]
    fn delete_chapter_cascades_to_tiles_but_not_planner() {
        let added = run(
            &AppState::default(),
            vec![
                ("addChapter", json!({ "name": "Waves", "subject": "physics" })),
                ("addChapter", json!({ "name": "Limits", "subject": "maths" })),
                ("addRevisionPlan", json!({ "chapterName": "waves" })),
                ("addRevisionPlan", json!({ "chapterName": "limits" })),
            ],
        )
        .state;
        let waves_id = added.chapters[0].id.clone();
        let mut state = added;
        state.planner_tasks.push(PlannerTask {
            id: "task-1".into(),
            date: "2025-11-04".into(),
            chapter_id: waves_id.clone(),
            remark: "revise".into(),
            completed: false,
        });

        let out = run(
            &state,
            vec![("deleteItem", json!({ "type": "chapter", "identifier": "wave" }))],
        );
        assert_eq!(out.state.chapters.len(), 1);
        assert_eq!(out.state.chapters[0].name, "Limits");
        assert_eq!(out.state.revision_tiles.len(), 1);
        assert!(out.state.revision_tiles.iter().all(|t| t.chapter_id != waves_id));
        assert_eq!(out.state.planner_tasks.len(), 1);
        assert_eq!(out.log.len(), 1);
    }

    #[test]
    fn delete_chapter_removes_every_substring_match() {
        let state = with_chapters(&[("Wave Optics", ""), ("Waves & Sound", ""), ("Limits", "")]);
        let out = run(
            &state,
            vec![("deleteItem", json!({ "type": "chapter", "identifier": "WAVE" }))],
        );
        assert_eq!(out.state.chapters.len(), 1);
    }

    #[test]
    fn delete_with_no_match_is_silent() {
        let state = with_chapters(&[("Limits", "")]);
        let out = run(
            &state,
            vec![
                ("deleteItem", json!({ "type": "chapter", "identifier": "optics" })),
                ("deleteItem", json!({ "type": "test", "identifier": "mock" })),
                ("deleteItem", json!({ "type": "revision", "identifier": "limits" })),
                ("deleteItem", json!({ "type": "lesson", "identifier": "limits" })),
            ],
        );
        assert_eq!(out.state, state);
        assert!(out.log.is_empty());
    }

    #[test]
    fn delete_revision_removes_tiles_of_first_matching_chapter() {
        let state = run(
            &AppState::default(),
            vec![
                ("addChapter", json!({ "name": "Circle" })),
                ("addRevisionPlan", json!({ "chapterName": "circle" })),
                ("addRevisionPlan", json!({ "chapterName": "circle", "targetQ": 80 })),
            ],
        )
        .state;
        let out = run(
            &state,
            vec![("deleteItem", json!({ "type": "revision", "identifier": "circ" }))],
        );
        assert!(out.state.revision_tiles.is_empty());
        assert_eq!(out.state.chapters.len(), 1);
    }

    #[test]
    fn delete_test_by_name_fragment() {
        let state = run(
            &AppState::default(),
            vec![
                ("addTest", json!({ "name": "Full Mock 1" })),
                ("addTest", json!({ "name": "Full Mock 2" })),
                ("addTest", json!({ "name": "Optics Part Test" })),
            ],
        )
        .state;
        let out = run(&state, vec![("deleteItem", json!({ "type": "test", "identifier": "mock" }))]);
        assert_eq!(out.state.tests.len(), 1);
        assert_eq!(out.log, vec!["Deleted 2 test(s) matching 'mock'".to_string()]);
    }

    #[test]
    fn exports_are_deferred_effects() {
        let state = with_chapters(&[("Limits", "")]);
        let out = run(&state, vec![("exportLogs", json!({})), ("exportData", json!(null))]);
        assert_eq!(out.state, state);
        assert_eq!(out.exports, vec![ExportRequest::Logs, ExportRequest::Data]);
        assert_eq!(out.log.len(), 2);
    }
}

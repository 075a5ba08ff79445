//! Whole-state replacements behind the direct-manipulation views.
//!
//! Each helper consumes the current state and returns the next one. Lookups
//! here are by exact id; fuzzy name matching belongs to the tool executor.

use crate::calc::parse_date;
use crate::model::{
    default_pyqs, new_id, AppState, Chapter, DailyLog, PlannerTask, RevisionTile, TestRecord,
};
use std::collections::HashSet;

fn ensure_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = new_id();
    }
}

fn sanitize_chapter(mut chapter: Chapter) -> Chapter {
    ensure_id(&mut chapter.id);
    chapter.confidence = chapter.confidence.min(100);
    if chapter.pyqs.is_empty() {
        chapter.pyqs = default_pyqs("");
    }
    chapter
}

pub fn add_chapter(mut state: AppState, chapter: Chapter) -> AppState {
    state.chapters.push(sanitize_chapter(chapter));
    state
}

/// Full-record replacement by id. Unknown ids leave the state as it was.
pub fn update_chapter(mut state: AppState, chapter: Chapter) -> AppState {
    let chapter = sanitize_chapter(chapter);
    if let Some(slot) = state.chapters.iter_mut().find(|c| c.id == chapter.id) {
        *slot = chapter;
    }
    state
}

/// Removes the chapter and every revision tile scheduled for it.
pub fn delete_chapter(mut state: AppState, id: &str) -> AppState {
    state.chapters.retain(|c| c.id != id);
    state.revision_tiles.retain(|t| t.chapter_id != id);
    state
}

/// Chapters listed in `order` come first in that order; the rest keep
/// their relative position after them.
pub fn reorder_chapters(mut state: AppState, order: &[String]) -> AppState {
    let mut remaining = std::mem::take(&mut state.chapters);
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(remaining.len());
    for id in order {
        if !seen.insert(id.as_str()) {
            continue;
        }
        if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
            out.push(remaining.remove(pos));
        }
    }
    out.append(&mut remaining);
    state.chapters = out;
    state
}

pub struct NewRevisionTile {
    pub chapter_id: String,
    pub start_date: String,
    pub end_date: String,
    pub target_q: u32,
    pub notes: Option<String>,
}

/// `None` when the chapter does not exist.
pub fn add_revision_tile(mut state: AppState, input: NewRevisionTile) -> Option<(AppState, String)> {
    let subject = state.chapter(&input.chapter_id)?.subject;
    let id = new_id();
    state.revision_tiles.push(RevisionTile {
        id: id.clone(),
        chapter_id: input.chapter_id,
        subject,
        start_date: input.start_date,
        end_date: input.end_date,
        target_q: input.target_q,
        attempted_q: 0,
        notes: input.notes,
    });
    Some((state, id))
}

/// The stored subject is kept; it is only taken from the chapter at creation.
pub fn update_revision_tile(mut state: AppState, tile: RevisionTile) -> AppState {
    if let Some(slot) = state.revision_tiles.iter_mut().find(|t| t.id == tile.id) {
        *slot = RevisionTile {
            subject: slot.subject,
            ..tile
        };
    }
    state
}

pub fn delete_revision_tile(mut state: AppState, id: &str) -> AppState {
    state.revision_tiles.retain(|t| t.id != id);
    state
}

pub fn save_test(mut state: AppState, mut test: TestRecord) -> AppState {
    ensure_id(&mut test.id);
    match state.tests.iter_mut().find(|t| t.id == test.id) {
        Some(slot) => *slot = test,
        None => state.tests.push(test),
    }
    state
}

pub fn delete_test(mut state: AppState, id: &str) -> AppState {
    state.tests.retain(|t| t.id != id);
    state
}

fn upsert_log_by_date(logs: &mut Vec<DailyLog>, mut entry: DailyLog) {
    match logs.iter_mut().find(|l| l.date == entry.date) {
        Some(slot) => {
            entry.id = slot.id.clone();
            *slot = entry;
        }
        None => {
            if entry.id.trim().is_empty() || logs.iter().any(|l| l.id == entry.id) {
                entry.id = new_id();
            }
            logs.push(entry);
        }
    }
}

fn sort_logs_newest_first(logs: &mut [DailyLog]) {
    logs.sort_by(|a, b| parse_date(&b.date).cmp(&parse_date(&a.date)));
}

/// One log per date. A known id is an edit of that entry and may move it to
/// another date, absorbing whatever log held that date. Otherwise an
/// existing entry for the date keeps its id.
pub fn save_log(mut state: AppState, entry: DailyLog) -> AppState {
    let known = !entry.id.trim().is_empty() && state.logs.iter().any(|l| l.id == entry.id);
    if known {
        state
            .logs
            .retain(|l| l.id == entry.id || l.date != entry.date);
        if let Some(slot) = state.logs.iter_mut().find(|l| l.id == entry.id) {
            *slot = entry;
        }
    } else {
        upsert_log_by_date(&mut state.logs, entry);
    }
    sort_logs_newest_first(&mut state.logs);
    state
}

pub fn delete_log(mut state: AppState, id: &str) -> AppState {
    state.logs.retain(|l| l.id != id);
    state
}

/// Merges imported rows by date; returns how many rows were applied.
pub fn merge_logs(mut state: AppState, entries: Vec<DailyLog>) -> (AppState, usize) {
    let n = entries.len();
    for entry in entries {
        upsert_log_by_date(&mut state.logs, entry);
    }
    (state, n)
}

pub fn save_planner_task(mut state: AppState, mut task: PlannerTask) -> AppState {
    ensure_id(&mut task.id);
    match state.planner_tasks.iter_mut().find(|t| t.id == task.id) {
        Some(slot) => *slot = task,
        None => state.planner_tasks.push(task),
    }
    state
}

pub fn toggle_planner_task(mut state: AppState, id: &str) -> AppState {
    if let Some(task) = state.planner_tasks.iter_mut().find(|t| t.id == id) {
        task.completed = !task.completed;
    }
    state
}

pub fn delete_planner_task(mut state: AppState, id: &str) -> AppState {
    state.planner_tasks.retain(|t| t.id != id);
    state
}

pub fn toggle_theme(mut state: AppState) -> AppState {
    state.theme = state.theme.toggled();
    state
}

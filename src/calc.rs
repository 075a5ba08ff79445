use crate::model::{AppState, Chapter, PlannerTask, Priority, Scores, Subject, SubjectScore, TestRecord, TestType};
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;
pub const RECENT_TEST_COUNT: usize = 5;
pub const FOCUS_CHAPTER_LIMIT: usize = 6;

/// Half-up rounding as the dashboard has always displayed it:
/// `floor(x + 0.5)`, so -2.5 rounds to -2.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub marks: i64,
    pub accuracy: u32,
}

/// +4 per correct, -1 per incorrect, 0 for unattempted. Not clamped.
pub fn marks(correct: u32, incorrect: u32) -> i64 {
    i64::from(correct) * 4 - i64::from(incorrect)
}

pub fn accuracy(correct: u32, incorrect: u32) -> u32 {
    let attempted = u64::from(correct) + u64::from(incorrect);
    if attempted == 0 {
        return 0;
    }
    round_half_up(correct as f64 / attempted as f64 * 100.0) as u32
}

pub fn subject_stats(score: &SubjectScore) -> SubjectStats {
    SubjectStats {
        marks: marks(score.correct, score.incorrect),
        accuracy: accuracy(score.correct, score.incorrect),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_marks: i64,
    pub overall_accuracy: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub total_unattempted: u32,
}

pub fn overall_stats(scores: &Scores) -> OverallStats {
    let all = [scores.physics, scores.chemistry, scores.maths];
    let total_correct: u32 = all.iter().map(|s| s.correct).sum();
    let total_incorrect: u32 = all.iter().map(|s| s.incorrect).sum();
    let total_unattempted: u32 = all.iter().map(|s| s.unattempted).sum();
    OverallStats {
        total_marks: marks(total_correct, total_incorrect),
        overall_accuracy: accuracy(total_correct, total_incorrect),
        total_correct,
        total_incorrect,
        total_unattempted,
    }
}

/// Centered moving average over `[i - w/2, i + ceil(w/2))`, clipped to the
/// series. Windows at the edges average only the samples they contain.
/// A window below 2, or longer than the series, leaves the series as-is.
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || values.len() < window {
        return values.to_vec();
    }
    let back = window / 2;
    let ahead = window.div_ceil(2);
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(back);
            let end = (i + ahead).min(values.len());
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestKpis {
    pub count: usize,
    pub avg_score: i64,
    pub best_score: i64,
    pub last5_avg: i64,
}

fn date_desc(a: &TestRecord, b: &TestRecord) -> Ordering {
    parse_date(&b.date).cmp(&parse_date(&a.date))
}

pub fn test_kpis(tests: &[&TestRecord]) -> TestKpis {
    if tests.is_empty() {
        return TestKpis::default();
    }
    let totals: Vec<i64> = tests
        .iter()
        .map(|t| overall_stats(&t.scores).total_marks)
        .collect();
    let sum: i64 = totals.iter().sum();
    // Best starts from 0, a run of negative mocks reports 0.
    let best = totals.iter().copied().fold(0, i64::max);

    let mut recent: Vec<&TestRecord> = tests.to_vec();
    recent.sort_by(|a, b| date_desc(a, b));
    recent.truncate(RECENT_TEST_COUNT);
    let recent_sum: i64 = recent
        .iter()
        .map(|t| overall_stats(&t.scores).total_marks)
        .sum();

    TestKpis {
        count: tests.len(),
        avg_score: round_half_up(sum as f64 / tests.len() as f64) as i64,
        best_score: best,
        last5_avg: round_half_up(recent_sum as f64 / recent.len() as f64) as i64,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    pub name: Subject,
    pub avg_completion: u32,
    pub avg_confidence: u32,
    pub total_chapters: usize,
}

pub fn subject_progress(chapters: &[Chapter], subject: Subject) -> SubjectProgress {
    let scoped: Vec<&Chapter> = chapters.iter().filter(|c| c.subject == subject).collect();
    if scoped.is_empty() {
        return SubjectProgress {
            name: subject,
            avg_completion: 0,
            avg_confidence: 0,
            total_chapters: 0,
        };
    }
    let n = scoped.len() as f64;
    let completion: f64 = scoped
        .iter()
        .map(|c| c.completed_pyq_years() as f64 / crate::model::PYQ_YEARS.len() as f64 * 100.0)
        .sum();
    let confidence: f64 = scoped.iter().map(|c| f64::from(c.confidence)).sum();
    SubjectProgress {
        name: subject,
        avg_completion: round_half_up(completion / n) as u32,
        avg_confidence: round_half_up(confidence / n) as u32,
        total_chapters: scoped.len(),
    }
}

/// High-priority chapters that still lack confidence, weakest first.
pub fn focus_chapters(chapters: &[Chapter]) -> Vec<&Chapter> {
    let mut out: Vec<&Chapter> = chapters
        .iter()
        .filter(|c| {
            (c.priority == Priority::A && c.confidence < 60)
                || (c.priority == Priority::B && c.confidence < 50)
        })
        .collect();
    out.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.confidence.cmp(&b.confidence))
    });
    out.truncate(FOCUS_CHAPTER_LIMIT);
    out
}

pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestQuery {
    pub types: Vec<TestType>,
    pub subjects: Vec<Subject>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub search: Option<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
}

fn test_matches(state: &AppState, test: &TestRecord, q: &TestQuery) -> bool {
    let test_date = parse_date(&test.date);
    if let (Some(start), Some(d)) = (q.start.as_deref().and_then(parse_date), test_date) {
        if d < start {
            return false;
        }
    }
    if let (Some(end), Some(d)) = (q.end.as_deref().and_then(parse_date), test_date) {
        if d > end {
            return false;
        }
    }
    if !q.types.is_empty() && !q.types.contains(&test.test_type) {
        return false;
    }
    if !q.subjects.is_empty() {
        match test.subject {
            Some(s) if q.subjects.contains(&s) => {}
            _ => return false,
        }
    }
    if let Some(term) = q.search.as_deref().map(str::to_lowercase).filter(|s| !s.is_empty()) {
        let chapter_names = test
            .linked_chapters
            .iter()
            .flatten()
            .map(|id| state.chapter(id).map(|c| c.name.as_str()).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        return test.name.to_lowercase().contains(&term)
            || test.notes.as_deref().unwrap_or("").to_lowercase().contains(&term)
            || chapter_names.contains(&term);
    }
    true
}

pub fn query_tests<'a>(state: &'a AppState, q: &TestQuery) -> Vec<&'a TestRecord> {
    let mut out: Vec<&TestRecord> = state
        .tests
        .iter()
        .filter(|t| test_matches(state, t, q))
        .collect();
    out.sort_by(|a, b| {
        let ord = match q.sort_key {
            SortKey::Score => overall_stats(&a.scores)
                .total_marks
                .cmp(&overall_stats(&b.scores).total_marks),
            SortKey::Date => parse_date(&a.date).cmp(&parse_date(&b.date)),
        };
        match q.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub name: String,
    pub overall: i64,
    pub physics: i64,
    pub chemistry: i64,
    pub mathematics: i64,
}

/// Chronological marks per test; `window` smooths each line independently.
pub fn score_trend(tests: &[&TestRecord], window: Option<usize>) -> Vec<TrendPoint> {
    let mut ordered: Vec<&TestRecord> = tests.to_vec();
    ordered.sort_by(|a, b| date_desc(b, a));

    let line = |f: &dyn Fn(&TestRecord) -> i64| -> Vec<i64> {
        let raw: Vec<f64> = ordered.iter().map(|t| f(t) as f64).collect();
        let values = match window {
            Some(w) => smooth(&raw, w),
            None => raw,
        };
        values.into_iter().map(|v| round_half_up(v) as i64).collect()
    };
    let overall = line(&|t| overall_stats(&t.scores).total_marks);
    let physics = line(&|t| subject_stats(&t.scores.physics).marks);
    let chemistry = line(&|t| subject_stats(&t.scores.chemistry).marks);
    let mathematics = line(&|t| subject_stats(&t.scores.maths).marks);

    ordered
        .iter()
        .enumerate()
        .map(|(i, t)| TrendPoint {
            date: t.date.clone(),
            name: t.name.clone(),
            overall: overall[i],
            physics: physics[i],
            chemistry: chemistry[i],
            mathematics: mathematics[i],
        })
        .collect()
}

/// Weeks start on Sunday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - ChronoDuration::days(i64::from(date.weekday().num_days_from_sunday()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerEntry {
    #[serde(flatten)]
    pub task: PlannerTask,
    pub chapter_name: Option<String>,
    pub subject: Option<Subject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerDay {
    pub date: String,
    pub is_today: bool,
    pub tasks: Vec<PlannerEntry>,
}

pub fn planner_week(state: &AppState, anchor: NaiveDate, today: NaiveDate) -> Vec<PlannerDay> {
    let start = week_start(anchor);
    (0..7)
        .map(|offset| {
            let day = start + ChronoDuration::days(offset);
            let key = iso_date(day);
            let tasks = state
                .planner_tasks
                .iter()
                .filter(|t| t.date == key)
                .map(|t| {
                    let chapter = state.chapter(&t.chapter_id);
                    PlannerEntry {
                        task: t.clone(),
                        chapter_name: chapter.map(|c| c.name.clone()),
                        subject: chapter.map(|c| c.subject),
                    }
                })
                .collect();
            PlannerDay {
                date: key,
                is_today: day == today,
                tasks,
            }
        })
        .collect()
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Years tracked per chapter, most recent first.
pub const PYQ_YEARS: [i32; 5] = [2025, 2024, 2023, 2022, 2021];
pub const DEFAULT_PYQ_TOTAL: u32 = 30;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Mathematics,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Mathematics];

    pub fn label(self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Mathematics => "Mathematics",
        }
    }
}

/// Ordered A (highest) to D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    A,
    B,
    C,
    D,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::A => "A",
            Priority::B => "B",
            Priority::C => "C",
            Priority::D => "D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "Full Syllabus")]
    FullSyllabus,
    #[serde(rename = "Part Test")]
    PartTest,
    #[serde(rename = "Chapter Wise")]
    ChapterWise,
    #[serde(rename = "PYQ Mock")]
    PyqMock,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::FullSyllabus,
        TestType::PartTest,
        TestType::ChapterWise,
        TestType::PyqMock,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TestType::FullSyllabus => "Full Syllabus",
            TestType::PartTest => "Part Test",
            TestType::ChapterWise => "Chapter Wise",
            TestType::PyqMock => "PYQ Mock",
        }
    }

    /// Part tests and chapter-wise tests cover one subject.
    pub fn is_single_subject(self) -> bool {
        matches!(self, TestType::PartTest | TestType::ChapterWise)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PyqYearData {
    pub year: i32,
    pub done: u32,
    pub total: u32,
    #[serde(default)]
    pub link: String,
    pub completed: bool,
}

/// One entry per tracked year, 0 done out of 30.
pub fn default_pyqs(link: &str) -> Vec<PyqYearData> {
    PYQ_YEARS
        .iter()
        .map(|&year| PyqYearData {
            year,
            done: 0,
            total: DEFAULT_PYQ_TOTAL,
            link: link.to_string(),
            completed: false,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub name: String,
    pub subject: Subject,
    #[serde(default)]
    pub unit: String,
    pub priority: Priority,
    pub confidence: u8,
    pub rev1: bool,
    pub rev2: bool,
    #[serde(default)]
    pub pyqs: Vec<PyqYearData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_links: Option<String>,
}

impl Chapter {
    pub fn completed_pyq_years(&self) -> usize {
        self.pyqs.iter().filter(|p| p.completed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionTile {
    pub id: String,
    pub chapter_id: String,
    pub subject: Subject,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "targetQ")]
    pub target_q: u32,
    #[serde(rename = "attemptedQ")]
    pub attempted_q: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectScore {
    pub correct: u32,
    pub incorrect: u32,
    pub unattempted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default)]
    pub physics: SubjectScore,
    #[serde(default)]
    pub chemistry: SubjectScore,
    #[serde(default)]
    pub maths: SubjectScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_chapters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub scores: Scores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    pub date: String,
    #[serde(rename = "physicsQ")]
    pub physics_q: u32,
    #[serde(rename = "chemistryQ")]
    pub chemistry_q: u32,
    #[serde(rename = "mathQ")]
    pub math_q: u32,
    /// Minutes.
    pub study_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTask {
    pub id: String,
    pub date: String,
    pub chapter_id: String,
    #[serde(default)]
    pub remark: String,
    pub completed: bool,
}

/// Aggregate root: the single unit of persistence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub revision_tiles: Vec<RevisionTile>,
    #[serde(default)]
    pub tests: Vec<TestRecord>,
    #[serde(default)]
    pub logs: Vec<DailyLog>,
    #[serde(default)]
    pub planner_tasks: Vec<PlannerTask>,
    #[serde(default)]
    pub theme: Theme,
}

impl AppState {
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }
}

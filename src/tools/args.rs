//! Lenient readers over the untyped argument bag a model hands back.
//!
//! Every reader answers `None` for an absent key, a JSON null, or a value it
//! cannot make sense of. Callers pick the default.

use crate::model::{Priority, Subject, TestType};
use serde_json::{Map, Value as JsonValue};

pub type Args = Map<String, JsonValue>;

pub fn opt_str(args: &Args, key: &str) -> Option<String> {
    match args.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like `opt_str` but trimmed, and empty counts as absent.
pub fn opt_text(args: &Args, key: &str) -> Option<String> {
    opt_str(args, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn opt_f64(args: &Args, key: &str) -> Option<f64> {
    match args.get(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Non-negative whole count; negatives clamp to 0, fractions round.
pub fn opt_count(args: &Args, key: &str) -> Option<u32> {
    opt_f64(args, key).map(|v| v.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

pub fn opt_i64(args: &Args, key: &str) -> Option<i64> {
    opt_f64(args, key).map(|v| v.round() as i64)
}

pub fn opt_bool(args: &Args, key: &str) -> Option<bool> {
    match args.get(key)? {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        JsonValue::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

/// "a", " b ", "Priority A" all resolve; anything else is C.
pub fn normalize_priority(raw: Option<&str>) -> Priority {
    let upper = raw.unwrap_or("").to_uppercase().replace("PRIORITY", "");
    match upper.trim() {
        "A" => Priority::A,
        "B" => Priority::B,
        "C" => Priority::C,
        "D" => Priority::D,
        _ => Priority::C,
    }
}

/// Substring match in physics, chemistry, math order; anything else is Physics.
pub fn normalize_subject(raw: Option<&str>) -> Subject {
    let lower = raw.unwrap_or("").to_lowercase();
    if lower.contains("phys") {
        Subject::Physics
    } else if lower.contains("chem") {
        Subject::Chemistry
    } else if lower.contains("math") {
        Subject::Mathematics
    } else {
        Subject::Physics
    }
}

/// Case-insensitive exact label match; anything else is Full Syllabus.
pub fn normalize_test_type(raw: Option<&str>) -> TestType {
    let lower = raw.unwrap_or("").trim().to_lowercase();
    TestType::ALL
        .into_iter()
        .find(|t| t.label().to_lowercase() == lower)
        .unwrap_or(TestType::FullSyllabus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(v: JsonValue) -> Args {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn priority_normalizer_accepts_loose_spellings() {
        assert_eq!(normalize_priority(Some("a")), Priority::A);
        assert_eq!(normalize_priority(Some("A")), Priority::A);
        assert_eq!(normalize_priority(Some("Priority A")), Priority::A);
        assert_eq!(normalize_priority(Some(" b ")), Priority::B);
        assert_eq!(normalize_priority(Some("priority d")), Priority::D);
        assert_eq!(normalize_priority(Some("z")), Priority::C);
        assert_eq!(normalize_priority(Some("")), Priority::C);
        assert_eq!(normalize_priority(None), Priority::C);
    }

    #[test]
    fn subject_normalizer_matches_fragments_in_any_case() {
        assert_eq!(normalize_subject(Some("PHYSICS")), Subject::Physics);
        assert_eq!(normalize_subject(Some("phys")), Subject::Physics);
        assert_eq!(normalize_subject(Some("Organic Chem")), Subject::Chemistry);
        assert_eq!(normalize_subject(Some("Maths")), Subject::Mathematics);
        assert_eq!(normalize_subject(Some("mathematics")), Subject::Mathematics);
        assert_eq!(normalize_subject(Some("biology")), Subject::Physics);
        assert_eq!(normalize_subject(None), Subject::Physics);
    }

    #[test]
    fn test_type_normalizer_is_exact_but_case_insensitive() {
        assert_eq!(normalize_test_type(Some("part test")), TestType::PartTest);
        assert_eq!(normalize_test_type(Some("PYQ MOCK")), TestType::PyqMock);
        assert_eq!(normalize_test_type(Some("Chapter Wise")), TestType::ChapterWise);
        assert_eq!(normalize_test_type(Some("part")), TestType::FullSyllabus);
        assert_eq!(normalize_test_type(None), TestType::FullSyllabus);
    }

    #[test]
    fn readers_tolerate_wrong_types() {
        let a = bag(json!({
            "n": "12",
            "neg": -4,
            "frac": 7.6,
            "flag": "yes",
            "obj": { "x": 1 },
            "nul": null,
            "blank": "   ",
        }));
        assert_eq!(opt_count(&a, "n"), Some(12));
        assert_eq!(opt_count(&a, "neg"), Some(0));
        assert_eq!(opt_count(&a, "frac"), Some(8));
        assert_eq!(opt_bool(&a, "flag"), Some(true));
        assert_eq!(opt_f64(&a, "obj"), None);
        assert_eq!(opt_str(&a, "nul"), None);
        assert_eq!(opt_text(&a, "blank"), None);
        assert_eq!(opt_str(&a, "blank").as_deref(), Some("   "));
        assert_eq!(opt_i64(&a, "missing"), None);
    }
}

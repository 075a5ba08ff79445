//! Built-in syllabus used when a workspace has no stored state yet.

use crate::model::{default_pyqs, AppState, Chapter, Priority, Subject, Theme};
use Priority::{A, B, C, D};
use Subject::{Chemistry, Mathematics, Physics};

const PYQ_LINK_BASE: &str = "https://web.getmarks.app/cpyqbV3/exam/615f0e999476412f48314daf/chapters/";

/// (id, name, subject, unit, priority, question-bank chapter key)
const SYLLABUS: &[(&str, &str, Subject, &str, Priority, &str)] = &[
    ("p0", "Current Electricity", Physics, "Current Electricity", A, "615f0e999476412f48314e30"),
    ("p1", "Electrostatics", Physics, "Electrostatics", A, "615f0e999476412f48314e2d"),
    ("p2", "Magnetic Effects of Current", Physics, "Magnetic Effects of Current & Magnetism", A, "615f0e999476412f48314e33"),
    ("p3", "Laws of Motion", Physics, "Mechanics", A, "615f0e999476412f48314e18"),
    ("p4", "Gravitation", Physics, "Mechanics", A, "615f0e999476412f48314e21"),
    ("p5", "Atomic Physics", Physics, "Modern Physics", A, "615f0e999476412f48314e42"),
    ("p6", "Dual Nature of Matter", Physics, "Modern Physics", A, "615f0e999476412f48314e41"),
    ("p7", "Mathematics in Physics", Physics, "General Physics", B, "615f0e999476412f48314e12"),
    ("p8", "Units & Dimensions", Physics, "General Physics", B, "615f0e999476412f48314e13"),
    ("p9", "Semiconductors", Physics, "Modern Physics", B, "615f0e999476412f48314e45"),
    ("p10", "Motion in One Dimension", Physics, "Mechanics", B, "615f0e999476412f48314e16"),
    ("p11", "Wave Optics", Physics, "Optics", B, "615f0e999476412f48314e3f"),
    ("p12", "Ray Optics", Physics, "Optics", B, "615f0e999476412f48314e3c"),
    ("p13", "Alternating Current", Physics, "Electromagnetic Induction & AC", B, "615f0e999476412f48314e37"),
    ("p14", "Thermodynamics", Physics, "Thermal Physics", B, "615f0e999476412f48314e2a"),
    ("p15", "Mechanical Properties of Fluids", Physics, "Properties of Matter", B, "615f0e999476412f48314e25"),
    ("p16", "Work, Power & Energy", Physics, "Mechanics", C, "615f0e999476412f48314e1a"),
    ("p17", "Capacitance", Physics, "Electrostatics", C, "615f0e999476412f48314e2e"),
    ("p18", "Nuclear Physics", Physics, "Modern Physics", C, "615f0e999476412f48314e43"),
    ("p19", "Kinetic Theory of Gases", Physics, "Thermal Physics", C, "615f0e999476412f48314e29"),
    ("p20", "Electromagnetic Waves", Physics, "Electromagnetic Waves", C, "615f0e999476412f48314e3a"),
    ("p21", "Waves & Sound", Physics, "Waves & SHM", C, "615f0e999476412f48314e39"),
    ("p22", "Rotational Motion", Physics, "Mechanics", C, "615f0e999476412f48314e1f"),
    ("p23", "Motion in Two Dimensions", Physics, "Mechanics", D, "615f0e999476412f48314e17"),
    ("p24", "Electromagnetic Induction", Physics, "Electromagnetic Induction & AC", D, "615f0e999476412f48314e36"),
    ("p25", "Oscillations", Physics, "Waves & SHM", D, "615f0e999476412f48314e2b"),
    ("p26", "Communication Systems", Physics, "Communication Systems", D, "615f0e999476412f48314e46"),
    ("p27", "Mechanical Properties of Solids", Physics, "Properties of Matter", D, "615f0e999476412f48314e24"),
    ("p28", "Centre of Mass, Momentum & Collision", Physics, "Mechanics", D, "615f0e999476412f48314e1c"),
    ("p29", "Thermal Properties of Matter", Physics, "Thermal Physics", D, "615f0e999476412f48314e28"),
    ("p30", "Experimental Physics", Physics, "General Physics", D, "615f0e999476412f48314e14"),
    ("p31", "Magnetic Properties of Matter", Physics, "Magnetic Effects of Current & Magnetism", D, "615f0e999476412f48314e34"),
    ("c0", "General Organic Chemistry", Chemistry, "Organic Chemistry", A, "615f0e999476412f48314e7a"),
    ("c1", "Hydrocarbons", Chemistry, "Organic Chemistry", A, "615f0e999476412f48314e7b"),
    ("c2", "Chemical Bonding & Molecular Structure", Chemistry, "Inorganic Chemistry", A, "615f0e999476412f48314e55"),
    ("c3", "Coordination Compounds", Chemistry, "Inorganic Chemistry", A, "615f0e999476412f48314e76"),
    ("c4", "d & f Block Elements", Chemistry, "Inorganic Chemistry", A, "615f0e999476412f48314e75"),
    ("c5", "Structure of Atom", Chemistry, "Physical Chemistry", A, "615f0e999476412f48314e52"),
    ("c6", "Solutions", Chemistry, "Physical Chemistry", A, "615f0e999476412f48314e67"),
    ("c7", "Thermodynamics (Chemistry)", Chemistry, "Physical Chemistry", B, "615f0e999476412f48314e5b"),
    ("c8", "Electrochemistry", Chemistry, "Physical Chemistry", B, "615f0e999476412f48314e69"),
    ("c9", "Alcohols, Phenols & Ethers", Chemistry, "Organic Chemistry", B, "615f0e999476412f48314e7e"),
    ("c10", "Aldehydes & Ketones", Chemistry, "Organic Chemistry", B, "615f0e999476412f48314e7f"),
    ("c11", "Amines", Chemistry, "Organic Chemistry", B, "615f0e999476412f48314e81"),
    ("c12", "Biomolecules", Chemistry, "Organic Chemistry", B, "615f0e999476412f48314e82"),
    ("c13", "Classification of Elements & Periodicity", Chemistry, "Inorganic Chemistry", C, "615f0e999476412f48314e53"),
    ("c14", "Some Basic Concepts of Chemistry", Chemistry, "Physical Chemistry", C, "615f0e999476412f48314e51"),
    ("c15", "Redox Reactions", Chemistry, "Physical Chemistry", C, "615f0e999476412f48314e5d"),
    ("c16", "Chemical Kinetics", Chemistry, "Physical Chemistry", C, "615f0e999476412f48314e6b"),
    ("c17", "Haloalkanes & Haloarenes", Chemistry, "Organic Chemistry", C, "615f0e999476412f48314e7d"),
    ("c18", "Chemical Equilibrium", Chemistry, "Physical Chemistry", D, "615f0e999476412f48314e5f"),
    ("c19", "Ionic Equilibrium", Chemistry, "Physical Chemistry", D, "615f0e999476412f48314e60"),
    ("c20", "p-Block Elements", Chemistry, "Inorganic Chemistry", D, "615f0e999476412f48314e74"),
    ("c21", "Carboxylic Acid Derivatives", Chemistry, "Organic Chemistry", D, "615f0e999476412f48314e80"),
    ("c22", "Practical Chemistry", Chemistry, "Practical Chemistry", D, "615f0e999476412f48314e86"),
    ("c23", "Solid State", Chemistry, "Physical Chemistry", D, "615f0e999476412f48314e65"),
    ("c24", "Hydrogen", Chemistry, "Inorganic Chemistry", D, "615f0e999476412f48314e71"),
    ("c25", "s-Block Elements", Chemistry, "Inorganic Chemistry", D, "615f0e999476412f48314e72"),
    ("c26", "General Principles & Processes of Isolation of Metals", Chemistry, "Inorganic Chemistry", D, "615f0e999476412f48314e73"),
    ("c27", "Surface Chemistry", Chemistry, "Physical Chemistry", D, "615f0e999476412f48314e6d"),
    ("c28", "Environmental Chemistry", Chemistry, "Applied Chemistry", D, "615f0e999476412f48314e7c"),
    ("c29", "Polymers", Chemistry, "Applied Chemistry", D, "615f0e999476412f48314e84"),
    ("c30", "Chemistry in Everyday Life", Chemistry, "Applied Chemistry", D, "615f0e999476412f48314e85"),
    ("m0", "Vector Algebra", Mathematics, "Vectors & 3D Geometry", A, "615f0e999476412f48314eb2"),
    ("m1", "Three Dimensional Geometry", Mathematics, "Vectors & 3D Geometry", A, "615f0e999476412f48314eb3"),
    ("m2", "Sequences & Series", Mathematics, "Algebra", A, "615f0e999476412f48314ea3"),
    ("m3", "Binomial Theorem", Mathematics, "Algebra", A, "615f0e999476412f48314ea2"),
    ("m4", "Functions", Mathematics, "Calculus", A, "615f0e999476412f48314ea8"),
    ("m5", "Definite Integration", Mathematics, "Calculus", A, "615f0e999476412f48314eac"),
    ("m6", "Differential Equations", Mathematics, "Calculus", A, "615f0e999476412f48314eae"),
    ("m7", "Matrices", Mathematics, "Algebra", B, "615f0e999476412f48314ea5"),
    ("m8", "Determinants", Mathematics, "Algebra", B, "615f0e999476412f48314ea6"),
    ("m9", "Application of Derivatives", Mathematics, "Calculus", B, "615f0e999476412f48314eab"),
    ("m10", "Statistics", Mathematics, "Algebra", B, "615f0e999476412f48314eb1"),
    ("m11", "Straight Lines", Mathematics, "Coordinate Geometry", B, "615f0e999476412f48314ea0"),
    ("m12", "Permutations & Combinations", Mathematics, "Algebra", B, "615f0e999476412f48314ea1"),
    ("m13", "Probability", Mathematics, "Algebra", B, "615f0e999476412f48314eb0"),
    ("m14", "Complex Numbers", Mathematics, "Algebra", B, "615f0e999476412f48314e9e"),
    ("m15", "Quadratic Equations", Mathematics, "Algebra", C, "615f0e999476412f48314e9f"),
    ("m16", "Circle", Mathematics, "Coordinate Geometry", C, "615f0e999476412f48314eb4"),
    ("m17", "Limits", Mathematics, "Calculus", C, "615f0e999476412f48314ea9"),
    ("m18", "Area Under Curves", Mathematics, "Calculus", C, "615f0e999476412f48314ead"),
    ("m19", "Sets & Relations", Mathematics, "Algebra", C, "615f0e999476412f48314ea7"),
    ("m20", "Differentiation basics", Mathematics, "Calculus", C, "615f0e999476412f48314eaa"),
    ("m21", "Continuity & Differentiability", Mathematics, "Calculus", C, "615f0e999476412f48314eaa"),
    ("m22", "Parabola", Mathematics, "Coordinate Geometry", D, "615f0e999476412f48314eb5"),
    ("m23", "Ellipse", Mathematics, "Coordinate Geometry", D, "615f0e999476412f48314eb6"),
    ("m24", "Hyperbola", Mathematics, "Coordinate Geometry", D, "615f0e999476412f48314eb7"),
    ("m25", "Inverse Trig Functions", Mathematics, "Trigonometry", D, "615f0e999476412f48314eaf"),
];

pub fn default_chapters() -> Vec<Chapter> {
    SYLLABUS
        .iter()
        .map(|&(id, name, subject, unit, priority, key)| Chapter {
            id: id.to_string(),
            name: name.to_string(),
            subject,
            unit: unit.to_string(),
            priority,
            confidence: 0,
            rev1: false,
            rev2: false,
            pyqs: default_pyqs(&format!("{PYQ_LINK_BASE}{key}")),
            remarks: Some(String::new()),
            study_links: Some(String::new()),
        })
        .collect()
}

pub fn default_state() -> AppState {
    AppState {
        chapters: default_chapters(),
        theme: Theme::Dark,
        ..AppState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique_and_cover_all_subjects() {
        let chapters = default_chapters();
        let ids: HashSet<&str> = chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), chapters.len());
        for subject in Subject::ALL {
            assert!(chapters.iter().any(|c| c.subject == subject));
        }
        assert!(chapters.iter().all(|c| c.pyqs.len() == 5 && c.pyqs[0].link.starts_with(PYQ_LINK_BASE)));
    }
}

//! Academic structures: class → subject → chapter.
//!
//! Chapters carry a progress percentage and three activity counters
//! (lectures, daily-practice papers, tests). Goals reference chapters only
//! by id — a loose reference with no ownership, so academic CRUD never
//! touches the goal graph.

use rand::Rng;
use serde::{Deserialize, Serialize};

fn random_hex_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    let mut hex = String::with_capacity(32);
    for b in bytes {
        hex.push_str(&format!("{b:02x}"));
    }
    hex
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(random_hex_id())
            }

            /// The underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }
    };
}

string_id!(
    /// Unique string identifier for a class.
    ClassId
);
string_id!(
    /// Unique string identifier for a subject.
    SubjectId
);
string_id!(
    /// Unique string identifier for a chapter.
    ChapterId
);

/// Which chapter activity counter an increment/decrement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Lectures,
    Dpps,
    Tests,
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lectures => f.write_str("lectures"),
            Self::Dpps => f.write_str("dpps"),
            Self::Tests => f.write_str("tests"),
        }
    }
}

impl std::str::FromStr for CounterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lectures" => Ok(Self::Lectures),
            "dpps" => Ok(Self::Dpps),
            "tests" => Ok(Self::Tests),
            other => Err(format!(
                "unknown counter \"{other}\" (expected lectures, dpps, or tests)"
            )),
        }
    }
}

/// A chapter within a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    /// Completion percentage, 0..=100.
    pub progress: u8,
    #[serde(default)]
    pub lectures_count: u32,
    #[serde(default)]
    pub dpps_count: u32,
    #[serde(default)]
    pub tests_count: u32,
}

impl Chapter {
    /// Read the counter for `kind`.
    pub fn counter(&self, kind: CounterKind) -> u32 {
        match kind {
            CounterKind::Lectures => self.lectures_count,
            CounterKind::Dpps => self.dpps_count,
            CounterKind::Tests => self.tests_count,
        }
    }

    /// Adjust the counter for `kind` by `delta`, saturating at zero.
    pub fn adjust_counter(&mut self, kind: CounterKind, delta: i32) {
        let slot = match kind {
            CounterKind::Lectures => &mut self.lectures_count,
            CounterKind::Dpps => &mut self.dpps_count,
            CounterKind::Tests => &mut self.tests_count,
        };
        *slot = slot.saturating_add_signed(delta);
    }
}

/// Caller-supplied fields for chapter creation; id and progress are assigned.
#[derive(Debug, Clone, Default)]
pub struct ChapterDraft {
    pub title: String,
    pub lectures_count: u32,
    pub dpps_count: u32,
    pub tests_count: u32,
}

/// A subject within a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// A class: the top of the academic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub title: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> Chapter {
        Chapter {
            id: ChapterId::new("ch1"),
            title: "Kinematics".into(),
            progress: 0,
            lectures_count: 0,
            dpps_count: 0,
            tests_count: 0,
        }
    }

    #[test]
    fn counters_saturate_at_zero() {
        let mut ch = chapter();
        ch.adjust_counter(CounterKind::Lectures, -5);
        assert_eq!(ch.lectures_count, 0);
        ch.adjust_counter(CounterKind::Lectures, 3);
        ch.adjust_counter(CounterKind::Lectures, -1);
        assert_eq!(ch.lectures_count, 2);
    }

    #[test]
    fn counters_are_independent() {
        let mut ch = chapter();
        ch.adjust_counter(CounterKind::Dpps, 2);
        ch.adjust_counter(CounterKind::Tests, 1);
        assert_eq!(ch.counter(CounterKind::Lectures), 0);
        assert_eq!(ch.counter(CounterKind::Dpps), 2);
        assert_eq!(ch.counter(CounterKind::Tests), 1);
    }

    #[test]
    fn chapter_counter_fields_default_when_absent() {
        let json = r#"{"id": "c1", "title": "Optics", "progress": 40}"#;
        let ch: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(ch.lectures_count, 0);
        assert_eq!(ch.dpps_count, 0);
        assert_eq!(ch.tests_count, 0);
    }

    #[test]
    fn chapter_serializes_camel_case_counters() {
        let mut ch = chapter();
        ch.lectures_count = 4;
        let json = serde_json::to_value(&ch).unwrap();
        assert_eq!(json["lecturesCount"], 4);
        assert!(json.get("lectures_count").is_none());
    }

    #[test]
    fn counter_kind_parse_roundtrip() {
        for kind in [CounterKind::Lectures, CounterKind::Dpps, CounterKind::Tests] {
            assert_eq!(kind.to_string().parse::<CounterKind>().unwrap(), kind);
        }
        assert!("homework".parse::<CounterKind>().is_err());
    }
}

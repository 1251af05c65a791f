//! Persisted records and derived statistics.
//!
//! Field names serialize in camelCase and timestamps as epoch milliseconds,
//! which is the layout of the persisted JSON blobs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Subject {
    fn seed(id: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Subjects a fresh store starts with.
    pub fn defaults() -> Vec<Subject> {
        vec![
            Subject::seed("physics", "Physics", "study-physics"),
            Subject::seed("chemistry", "Chemistry", "study-chemistry"),
            Subject::seed("biology", "Biology", "study-biology"),
            Subject::seed("math", "Math", "study-math"),
        ]
    }
}

/// A target amount of study time for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub id: String,
    pub subject_id: String,
    pub target_hours: f64,
    #[serde(default)]
    pub weekly_target: bool,
    #[serde(default)]
    pub completed_minutes: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl StudyGoal {
    pub fn target_minutes(&self) -> f64 {
        self.target_hours * 60.0
    }

    /// 0.0 .. 100.0
    pub fn progress_pct(&self) -> f64 {
        crate::format::progress_pct(self.completed_minutes as f64, self.target_minutes())
    }

    pub fn is_complete(&self) -> bool {
        self.completed_minutes as f64 >= self.target_minutes()
    }
}

/// One immutable record of time spent studying a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub subject_id: String,
    pub duration_minutes: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_minutes: u64,
    pub sessions_count: u64,
}

/// Scalar aggregates as currently persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    pub total_study_minutes: u64,
    pub streak: u32,
    pub last_study_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTotal {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTotal {
    pub subject_id: String,
    pub name: String,
    pub minutes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target_hours: f64, completed_minutes: u64) -> StudyGoal {
        StudyGoal {
            id: "g1".into(),
            subject_id: "math".into(),
            target_hours,
            weekly_target: false,
            completed_minutes,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn goal_completion_threshold() {
        assert!(!goal(2.0, 119).is_complete());
        assert!(goal(2.0, 120).is_complete());
        assert!(goal(0.5, 45).is_complete());
    }

    #[test]
    fn goal_progress_is_capped() {
        assert_eq!(goal(1.0, 30).progress_pct(), 50.0);
        assert_eq!(goal(1.0, 600).progress_pct(), 100.0);
    }

    #[test]
    fn session_serializes_in_persisted_layout() {
        let session = StudySession {
            id: "s1".into(),
            subject_id: "physics".into(),
            duration_minutes: 25,
            date: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["subjectId"], "physics");
        assert_eq!(json["durationMinutes"], 25);
        assert_eq!(json["date"], 1_700_000_000_000_i64);
    }

    #[test]
    fn goal_decodes_persisted_layout() {
        let raw = r#"{"id":"1","subjectId":"math","targetHours":3,"weeklyTarget":true,
                      "completedMinutes":40,"createdAt":1700000000000}"#;
        let goal: StudyGoal = serde_json::from_str(raw).unwrap();
        assert_eq!(goal.subject_id, "math");
        assert_eq!(goal.target_hours, 3.0);
        assert!(goal.weekly_target);
        assert_eq!(goal.completed_minutes, 40);
    }

    #[test]
    fn default_subjects_have_unique_ids() {
        let subjects = Subject::defaults();
        let names: Vec<_> = subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Physics", "Chemistry", "Biology", "Math"]);
        let mut ids: Vec<_> = subjects.iter().map(|s| s.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}

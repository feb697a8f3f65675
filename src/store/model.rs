//! Exercise record types
//!
//! Wire and storage representations of an exercise log entry. All JSON
//! field names are camelCase and every field has a default, so clients
//! may send any subset of fields on insert.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single set: repetitions performed at a weight, with optional notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SetDetail {
    #[serde(default)]
    pub repetitions: i64,

    #[serde(default)]
    pub weight: f64,

    #[serde(default)]
    pub notes: String,
}

/// One series within an exercise: the main set plus optional dropsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    /// The main set of this series
    #[serde(default)]
    pub subseries: SetDetail,

    /// Whether this series ends in dropsets
    #[serde(default)]
    pub dropset: bool,

    /// How many dropsets follow the main set
    #[serde(default)]
    pub dropset_amount: i64,

    /// The dropsets themselves
    #[serde(default)]
    pub dropsets: Vec<SetDetail>,
}

/// A stored exercise record.
///
/// The `id` is assigned by the store on insert and never changes.
/// `date` is an opaque client-supplied string, compared only for equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub id: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub exercise: String,

    #[serde(default)]
    pub muscle_group: String,

    #[serde(default)]
    pub series: Vec<SeriesEntry>,
}

impl ExerciseRecord {
    /// Replace the fields a patch carries. The id is immutable.
    pub fn apply_patch(&mut self, patch: ExercisePatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(exercise) = patch.exercise {
            self.exercise = exercise;
        }
        if let Some(muscle_group) = patch.muscle_group {
            self.muscle_group = muscle_group;
        }
        if let Some(series) = patch.series {
            self.series = series;
        }
    }
}

/// Insert payload: a record without an id. Any subset of fields is accepted;
/// missing fields take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub exercise: String,

    #[serde(default)]
    pub muscle_group: String,

    #[serde(default)]
    pub series: Vec<SeriesEntry>,
}

impl ExerciseDraft {
    /// Materialize the draft into a record with a fresh id.
    pub fn into_record(self) -> ExerciseRecord {
        ExerciseRecord {
            id: Uuid::new_v4().to_string(),
            date: self.date,
            exercise: self.exercise,
            muscle_group: self.muscle_group,
            series: self.series,
        }
    }
}

/// Update-by-id payload: only the fields present are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePatch {
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub exercise: Option<String>,

    #[serde(default)]
    pub muscle_group: Option<String>,

    #[serde(default)]
    pub series: Option<Vec<SeriesEntry>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_accepts_partial_json() {
        let draft: ExerciseDraft =
            serde_json::from_str(r#"{"exercise": "Squat"}"#).unwrap();
        assert_eq!(draft.exercise, "Squat");
        assert_eq!(draft.date, "");
        assert!(draft.series.is_empty());
    }

    #[test]
    fn test_record_uses_camel_case() {
        let record = ExerciseDraft {
            date: "2024-05-01".to_string(),
            exercise: "Bench Press".to_string(),
            muscle_group: "Chest".to_string(),
            series: vec![SeriesEntry {
                subseries: SetDetail {
                    repetitions: 8,
                    weight: 80.0,
                    notes: String::new(),
                },
                dropset: true,
                dropset_amount: 2,
                dropsets: vec![SetDetail::default()],
            }],
        }
        .into_record();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["muscleGroup"], "Chest");
        assert_eq!(json["series"][0]["dropsetAmount"], 2);
        assert_eq!(json["series"][0]["subseries"]["repetitions"], 8);
    }

    #[test]
    fn test_insert_assigns_unique_ids() {
        let a = ExerciseDraft::default().into_record();
        let b = ExerciseDraft::default().into_record();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_patch_replaces_only_present_fields() {
        let mut record = ExerciseDraft {
            date: "2024-05-01".to_string(),
            exercise: "Squat".to_string(),
            muscle_group: "Legs".to_string(),
            series: vec![],
        }
        .into_record();
        let id = record.id.clone();

        record.apply_patch(ExercisePatch {
            muscle_group: Some("Quads".to_string()),
            ..Default::default()
        });

        assert_eq!(record.id, id);
        assert_eq!(record.date, "2024-05-01");
        assert_eq!(record.exercise, "Squat");
        assert_eq!(record.muscle_group, "Quads");
    }

    #[test]
    fn test_patch_may_replace_date_and_exercise() {
        let mut record = ExerciseDraft::default().into_record();
        record.apply_patch(ExercisePatch {
            date: Some("2024-06-01".to_string()),
            exercise: Some("Deadlift".to_string()),
            ..Default::default()
        });
        assert_eq!(record.date, "2024-06-01");
        assert_eq!(record.exercise, "Deadlift");
    }
}

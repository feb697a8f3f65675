//! Store durability tests
//!
//! A file-backed store must rebuild the same collection after reopen,
//! and must refuse to open over a corrupted or truncated journal.

use std::fs;

use tempfile::TempDir;

use liftlog::store::{
    ExerciseDraft, ExercisePatch, ExerciseStore, JournalOp, JournalReader, StoreError,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn draft(date: &str, exercise: &str, muscle_group: &str) -> ExerciseDraft {
    ExerciseDraft {
        date: date.to_string(),
        exercise: exercise.to_string(),
        muscle_group: muscle_group.to_string(),
        series: vec![],
    }
}

fn journal_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("data").join("exercises.journal")
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
        store.insert(draft("2024-05-02", "Bench", "Chest")).unwrap();
    }

    let store = ExerciseStore::open(temp_dir.path()).unwrap();
    let records = store.find_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].exercise, "Squat");
    assert_eq!(records[1].exercise, "Bench");
}

#[test]
fn test_updates_and_deletes_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let kept_id = {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        let kept = store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
        let gone = store.insert(draft("2024-05-02", "Bench", "Chest")).unwrap();

        store
            .update_by_id(
                &kept.id,
                ExercisePatch {
                    muscle_group: Some("Quads".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        store.delete_by_id(&gone.id).unwrap();

        kept.id
    };

    let store = ExerciseStore::open(temp_dir.path()).unwrap();
    let records = store.find_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, kept_id);
    assert_eq!(records[0].muscle_group, "Quads");
}

#[test]
fn test_delete_all_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
        store.insert(draft("2024-05-02", "Bench", "Chest")).unwrap();
        assert_eq!(store.delete_all().unwrap(), 2);
    }

    let store = ExerciseStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_insert_after_reopen_continues_the_journal() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
    }
    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-02", "Bench", "Chest")).unwrap();
    }

    let store = ExerciseStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.count().unwrap(), 2);
}

// =============================================================================
// Journal-first writes
// =============================================================================

#[test]
fn test_mutations_are_journaled_before_acknowledgement() {
    let temp_dir = TempDir::new().unwrap();

    let store = ExerciseStore::open(temp_dir.path()).unwrap();
    let record = store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
    store.delete_by_id(&record.id).unwrap();

    // The journal already holds both entries while the store is still open
    let mut reader = JournalReader::open(&journal_path(&temp_dir)).unwrap();
    let entries = reader.read_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].op, JournalOp::Put);
    assert_eq!(entries[0].record_id, record.id);
    assert_eq!(entries[1].op, JournalOp::Delete);
    assert_eq!(entries[1].record_id, record.id);
}

// =============================================================================
// Corruption
// =============================================================================

#[test]
fn test_corrupted_journal_aborts_open() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
    }

    // Flip a byte in the middle of the journal
    let path = journal_path(&temp_dir);
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = ExerciseStore::open(temp_dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Corruption { .. }));
}

#[test]
fn test_truncated_journal_aborts_open() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = ExerciseStore::open(temp_dir.path()).unwrap();
        store.insert(draft("2024-05-01", "Squat", "Legs")).unwrap();
    }

    // Drop the last few bytes of the final entry
    let path = journal_path(&temp_dir);
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 5]).unwrap();

    let err = ExerciseStore::open(temp_dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Corruption { .. }));
}

//! Exercise record collection
//!
//! `ExerciseStore` holds the full record collection in memory behind a
//! `RwLock` and persists every mutation through the journal before the
//! in-memory state changes. A mutation is never acknowledged unless its
//! journal entry is durable.
//!
//! Opening a store replays the journal from the start; replay is
//! idempotent, so re-applying the same entries always yields the same
//! collection.

use std::path::Path;
use std::sync::{RwLock, RwLockWriteGuard};

use super::errors::{StoreError, StoreResult};
use super::journal::{JournalEntry, JournalOp, JournalReader, JournalWriter};
use super::model::{ExerciseDraft, ExercisePatch, ExerciseRecord, SeriesEntry};

/// Journal-backed exercise record store.
///
/// In-memory ordered collection with an optional journal. File-backed
/// stores journal every mutation; in-memory stores skip the journal and
/// lose their contents on drop.
#[derive(Debug)]
pub struct ExerciseStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Records in insertion order
    records: Vec<ExerciseRecord>,
    /// Journal writer, `None` for in-memory stores
    journal: Option<JournalWriter>,
}

impl ExerciseStore {
    /// Opens a file-backed store, replaying the journal at `<data_dir>/data/`.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let journal = JournalWriter::open(data_dir)?;

        let mut records = Vec::new();
        if journal.current_offset() > 0 {
            let mut reader = JournalReader::open_from_data_dir(data_dir)?;
            while let Some(entry) = reader.read_next()? {
                apply_entry(&mut records, &entry)?;
            }
        }

        Ok(Self {
            inner: RwLock::new(StoreInner {
                records,
                journal: Some(journal),
            }),
        })
    }

    /// Creates an in-memory store with no journal.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: Vec::new(),
                journal: None,
            }),
        }
    }

    /// Inserts a new record with a freshly assigned id.
    pub fn insert(&self, draft: ExerciseDraft) -> StoreResult<ExerciseRecord> {
        let record = draft.into_record();

        let mut inner = self.write_guard()?;
        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::put(&record)?)?;
        }
        inner.records.push(record.clone());

        Ok(record)
    }

    /// Returns all records in insertion order.
    pub fn find_all(&self) -> StoreResult<Vec<ExerciseRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.records.clone())
    }

    /// Returns records whose muscle group equals `muscle_group` exactly.
    pub fn find_by_muscle_group(&self, muscle_group: &str) -> StoreResult<Vec<ExerciseRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.muscle_group == muscle_group)
            .cloned()
            .collect())
    }

    /// Replaces the fields present in `patch` on the record with `id`.
    ///
    /// Returns the updated record, or `None` if no record has that id.
    pub fn update_by_id(
        &self,
        id: &str,
        patch: ExercisePatch,
    ) -> StoreResult<Option<ExerciseRecord>> {
        let mut inner = self.write_guard()?;
        let inner = &mut *inner;

        let Some(position) = inner.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let mut updated = inner.records[position].clone();
        updated.apply_patch(patch);

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::put(&updated)?)?;
        }
        inner.records[position] = updated.clone();

        Ok(Some(updated))
    }

    /// Replaces muscle group and series on the first record matching the
    /// natural key `(date, exercise)`.
    ///
    /// Returns the number of matched records (0 or 1). A matched record
    /// counts even when the replacement values equal the old ones.
    pub fn update_by_natural_key(
        &self,
        date: &str,
        exercise: &str,
        muscle_group: String,
        series: Vec<SeriesEntry>,
    ) -> StoreResult<u64> {
        let mut inner = self.write_guard()?;
        let inner = &mut *inner;

        let Some(position) = inner
            .records
            .iter()
            .position(|r| r.date == date && r.exercise == exercise)
        else {
            return Ok(0);
        };

        let mut updated = inner.records[position].clone();
        updated.muscle_group = muscle_group;
        updated.series = series;

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::put(&updated)?)?;
        }
        inner.records[position] = updated;

        Ok(1)
    }

    /// Removes the first record matching the natural key `(date, exercise)`.
    ///
    /// Returns the number of removed records (0 or 1).
    pub fn delete_by_natural_key(&self, date: &str, exercise: &str) -> StoreResult<u64> {
        let mut inner = self.write_guard()?;
        let inner = &mut *inner;

        let Some(position) = inner
            .records
            .iter()
            .position(|r| r.date == date && r.exercise == exercise)
        else {
            return Ok(0);
        };

        let id = inner.records[position].id.clone();
        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::delete(id))?;
        }
        inner.records.remove(position);

        Ok(1)
    }

    /// Removes the record with `id` if it exists.
    ///
    /// Idempotent: deleting an unknown id is not an error. Returns whether
    /// a record was removed.
    pub fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut inner = self.write_guard()?;
        let inner = &mut *inner;

        let Some(position) = inner.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::delete(id))?;
        }
        inner.records.remove(position);

        Ok(true)
    }

    /// Removes every record. Returns the number removed.
    pub fn delete_all(&self) -> StoreResult<u64> {
        let mut inner = self.write_guard()?;
        let inner = &mut *inner;

        let removed = inner.records.len() as u64;
        if let Some(journal) = inner.journal.as_mut() {
            journal.append(&JournalEntry::clear())?;
        }
        inner.records.clear();

        Ok(removed)
    }

    /// Returns the number of records currently in the collection.
    pub fn count(&self) -> StoreResult<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.records.len())
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, StoreInner>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Applies one journal entry to the collection during replay.
fn apply_entry(records: &mut Vec<ExerciseRecord>, entry: &JournalEntry) -> StoreResult<()> {
    match entry.op {
        JournalOp::Put => {
            let record = entry.record()?;
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }
        JournalOp::Delete => {
            records.retain(|r| r.id != entry.record_id);
        }
        JournalOp::Clear => {
            records.clear();
        }
    }
    Ok(())
}

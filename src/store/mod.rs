//! Embedded exercise record store
//!
//! The store keeps every exercise record in memory and persists mutations
//! through an append-only, checksummed journal file. On open, the journal
//! is replayed to rebuild the in-memory collection.
//!
//! Components:
//! - `model`: record and payload types
//! - `journal`: on-disk entry format, writer, and reader
//! - `collection`: the `ExerciseStore` operations
//! - `checksum`: CRC32 helpers shared by the journal
//! - `errors`: store error types

mod checksum;
mod collection;
mod errors;
mod journal;
mod model;

pub use collection::ExerciseStore;
pub use errors::{StoreError, StoreResult};
pub use journal::{JournalEntry, JournalOp, JournalReader, JournalWriter};
pub use model::{ExerciseDraft, ExercisePatch, ExerciseRecord, SeriesEntry, SetDetail};

//! Append-only journal for the exercise store
//!
//! The journal entry format is:
//!
//! ```text
//! +------------------+
//! | Entry Length     | (u32 LE, total length including this field)
//! +------------------+
//! | Op Tag           | (u8: 0 = put, 1 = delete, 2 = clear)
//! +------------------+
//! | Record ID        | (length-prefixed string, empty for clear)
//! +------------------+
//! | Payload          | (length-prefixed bytes, JSON record body for put)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself. The writer
//! fsyncs after every append; an operation is never acknowledged before
//! its entry is durable. Every read validates the checksum, and any
//! corruption found during replay aborts the open.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StoreError, StoreResult};
use super::model::ExerciseRecord;

/// Journal file name under `<data_dir>/data/`
const JOURNAL_FILE: &str = "exercises.journal";

/// len + op tag + id length + payload length + checksum
const MIN_ENTRY_SIZE: usize = 4 + 1 + 4 + 4 + 4;

/// Journal operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalOp {
    /// Insert or replace the record identified by `record_id`
    Put,
    /// Remove the record identified by `record_id`
    Delete,
    /// Remove every record
    Clear,
}

impl JournalOp {
    fn tag(self) -> u8 {
        match self {
            JournalOp::Put => 0,
            JournalOp::Delete => 1,
            JournalOp::Clear => 2,
        }
    }

    fn from_tag(tag: u8) -> io::Result<Self> {
        match tag {
            0 => Ok(JournalOp::Put),
            1 => Ok(JournalOp::Delete),
            2 => Ok(JournalOp::Clear),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unknown journal op tag: {}", other),
            )),
        }
    }
}

/// A single journal entry as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Operation kind
    pub op: JournalOp,
    /// Record id this entry applies to (empty for `Clear`)
    pub record_id: String,
    /// JSON record body for `Put`, empty otherwise
    pub payload: Vec<u8>,
}

impl JournalEntry {
    /// Build a put entry carrying the full record body.
    pub fn put(record: &ExerciseRecord) -> StoreResult<Self> {
        let payload = serde_json::to_vec(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            op: JournalOp::Put,
            record_id: record.id.clone(),
            payload,
        })
    }

    /// Build a delete entry for a record id.
    pub fn delete(record_id: impl Into<String>) -> Self {
        Self {
            op: JournalOp::Delete,
            record_id: record_id.into(),
            payload: Vec::new(),
        }
    }

    /// Build a clear entry.
    pub fn clear() -> Self {
        Self {
            op: JournalOp::Clear,
            record_id: String::new(),
            payload: Vec::new(),
        }
    }

    /// Decode the record body of a put entry.
    pub fn record(&self) -> StoreResult<ExerciseRecord> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Serialize the entry body (everything except length prefix and checksum).
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.push(self.op.tag());

        buf.extend_from_slice(&(self.record_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.record_id.as_bytes());

        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.payload);

        buf
    }

    /// Serialize the complete entry to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();

        // Entry length = 4 (length) + body.len() + 4 (checksum)
        let entry_length = (4 + body.len() + 4) as u32;

        // Checksum covers: length + body
        let mut checksum_data = Vec::with_capacity(4 + body.len());
        checksum_data.extend_from_slice(&entry_length.to_le_bytes());
        checksum_data.extend_from_slice(&body);
        let checksum = compute_checksum(&checksum_data);

        let mut entry = Vec::with_capacity(entry_length as usize);
        entry.extend_from_slice(&entry_length.to_le_bytes());
        entry.extend_from_slice(&body);
        entry.extend_from_slice(&checksum.to_le_bytes());

        entry
    }

    /// Deserialize an entry from bytes, verifying checksum.
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_ENTRY_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Entry too short",
            ));
        }

        let entry_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if entry_length < MIN_ENTRY_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid entry length: {}", entry_length),
            ));
        }

        if data.len() < entry_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Entry truncated: expected {} bytes, got {}",
                    entry_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = entry_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        if !verify_checksum(&data[0..checksum_offset], stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    compute_checksum(&data[0..checksum_offset]),
                    stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let mut tag_buf = [0u8; 1];
        cursor.read_exact(&mut tag_buf)?;
        let op = JournalOp::from_tag(tag_buf[0])?;

        let record_id = read_string(&mut cursor)?;
        let payload = read_bytes(&mut cursor)?;

        Ok((
            Self {
                op,
                record_id,
                payload,
            },
            entry_length,
        ))
    }
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let buf = read_bytes(reader)?;
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    Ok(buf)
}

/// Append-only journal writer with fsync after every write.
#[derive(Debug)]
pub struct JournalWriter {
    /// Path to the journal file
    journal_path: PathBuf,
    /// Underlying file handle
    file: File,
    /// Current file offset
    current_offset: u64,
}

impl JournalWriter {
    /// Opens or creates the journal at the specified data directory.
    ///
    /// Creates `<data_dir>/data/exercises.journal` if it does not exist.
    /// Creates parent directories if needed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let data_subdir = data_dir.join("data");
        let journal_path = data_subdir.join(JOURNAL_FILE);

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&journal_path)
            .map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to open journal file: {}", journal_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StoreError::write_failed("Failed to read journal metadata", e))?
            .len();

        Ok(Self {
            journal_path,
            file,
            current_offset,
        })
    }

    /// Returns the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.journal_path
    }

    /// Returns the current file offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends an entry with fsync enforcement.
    ///
    /// Returns the byte offset where the entry was written.
    pub fn append(&mut self, entry: &JournalEntry) -> StoreResult<u64> {
        let serialized = entry.serialize();
        let offset = self.current_offset;

        self.file.write_all(&serialized).map_err(|e| {
            StoreError::write_failed(
                format!("Failed to write journal entry for: {}", entry.record_id),
                e,
            )
        })?;

        // fsync - mandatory for durability
        self.file.sync_all().map_err(|e| {
            StoreError::write_failed(
                format!("fsync failed after journal entry for: {}", entry.record_id),
                e,
            )
        })?;

        self.current_offset += serialized.len() as u64;

        Ok(offset)
    }
}

/// Journal reader for sequential replay.
///
/// Validates checksums on every read. Any corruption is fatal.
pub struct JournalReader {
    /// Path to the journal file
    journal_path: PathBuf,
    /// Buffered reader
    reader: BufReader<File>,
    /// Current byte offset
    current_offset: u64,
    /// Total file size
    file_size: u64,
}

impl JournalReader {
    /// Opens the journal file for reading.
    pub fn open(journal_path: &Path) -> StoreResult<Self> {
        let file = File::open(journal_path).map_err(|e| {
            StoreError::read_failed(
                format!("Failed to open journal file: {}", journal_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StoreError::read_failed("Failed to read journal metadata", e))?
            .len();

        Ok(Self {
            journal_path: journal_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Opens the journal from a data directory.
    pub fn open_from_data_dir(data_dir: &Path) -> StoreResult<Self> {
        let journal_path = data_dir.join("data").join(JOURNAL_FILE);
        Self::open(&journal_path)
    }

    /// Returns the journal file path.
    pub fn path(&self) -> &Path {
        &self.journal_path
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns whether there are more entries to read.
    pub fn has_more(&self) -> bool {
        self.current_offset < self.file_size
    }

    /// Reads the next entry from the journal.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` if an entry was read
    /// - `Ok(None)` if end of file
    /// - `Err(StoreError::Corruption)` if validation fails
    pub fn read_next(&mut self) -> StoreResult<Option<JournalEntry>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;

        if remaining < MIN_ENTRY_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated journal: {} bytes remaining, minimum entry size is {}",
                    remaining, MIN_ENTRY_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read entry length: {}", e),
            )
        })?;
        let entry_length = u32::from_le_bytes(len_buf) as u64;

        if entry_length < MIN_ENTRY_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!("Invalid entry length: {}", entry_length),
            ));
        }

        if entry_length > remaining {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Entry length {} exceeds remaining file size {}",
                    entry_length, remaining
                ),
            ));
        }

        let mut entry_buf = vec![0u8; entry_length as usize];
        entry_buf[0..4].copy_from_slice(&len_buf);

        self.reader.read_exact(&mut entry_buf[4..]).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read entry body: {}", e),
            )
        })?;

        // Parse and validate (includes checksum verification)
        let (entry, bytes_consumed) = JournalEntry::deserialize(&entry_buf)
            .map_err(|e| StoreError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += bytes_consumed as u64;

        Ok(Some(entry))
    }

    /// Reads all remaining entries.
    pub fn read_all(&mut self) -> StoreResult<Vec<JournalEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read_next()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

//! File-backed JSONL journal with a SHA-256 hash chain.
//!
//! The file format is line-delimited JSON (`.jsonl`):
//! - Line 1: header with `format_version`, `build_id`, `content_hash`, `seed`, `roster`.
//! - Lines 2+: one record per journaled payload, each carrying a SHA-256 hash chain
//!   (`prev_sha256_hex`, `sha256_hex`) for corruption detection.
//!
//! Writing flushes each record immediately so the file survives crashes.
//! Loading validates every line's JSON shape and SHA-256 chain, stopping
//! at the first invalid or incomplete line.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{InputJournal, InputPayload, InputRecord};
use crate::party::RosterEntry;

/// First line of the JSONL journal file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    content_hash: u64,
    seed: u64,
    roster: Vec<RosterEntry>,
}

/// Fields hashed for a record, serialized to JSON and followed by `prev_sha256_hex`.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    tick: u64,
    payload: &'a InputPayload,
}

/// Full record line written to the JSONL file.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    tick: u64,
    payload: InputPayload,
    prev_sha256_hex: String,
    sha256_hex: String,
}

/// Previous-hash of the first record in a chain.
const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// `hex(SHA-256(body_json || prev_sha256_hex))`.
fn compute_record_sha256(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    let result = hasher.finalize();
    format!("{result:064x}")
}

/// Appends journal payloads to a JSONL file with a SHA-256 hash chain.
pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates the file and writes the header taken from `journal`; its records are not
    /// written.
    pub fn create(path: &Path, journal: &InputJournal) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = FileHeader {
            format_version: journal.format_version,
            build_id: journal.build_id.clone(),
            content_hash: journal.content_hash,
            seed: journal.seed,
            roster: journal.roster.clone(),
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Resumes appending to an existing journal after loading it.
    /// `last_sha256_hex` and `next_seq` come from `LoadedJournal`.
    pub fn resume(path: &Path, last_sha256_hex: String, next_seq: u64) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer, last_sha256_hex, next_seq })
    }

    /// Appends one payload and flushes immediately.
    pub fn append(&mut self, tick: u64, payload: &InputPayload) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, tick, payload };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let sha256_hex = compute_record_sha256(&body_json, &self.last_sha256_hex);

        let record = FileRecord {
            seq: self.next_seq,
            tick,
            payload: payload.clone(),
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };

        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;

        Ok(())
    }
}

/// Writes a complete journal, header and every record, to `path`.
pub fn write_journal_to_file(path: &Path, journal: &InputJournal) -> io::Result<()> {
    let mut writer = JournalWriter::create(path, journal)?;
    for record in &journal.inputs {
        writer.append(record.tick, &record.payload)?;
    }
    Ok(())
}

/// Successfully loaded journal with metadata needed for resuming appends.
#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// SHA-256 hex of the last valid record (or the initial hash if empty).
    pub last_sha256_hex: String,
    /// Sequence number for the next record to be appended.
    pub next_seq: u64,
}

/// Why a journal file could not be fully loaded.
#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file ended without a trailing newline.
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    /// A prev-hash does not link up or a recomputed hash does not match.
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

/// Loads and validates a JSONL journal file.
///
/// Stops at the first invalid, incomplete, or hash-broken line and returns
/// an error describing the problem.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    if content.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    let has_trailing_newline = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let Some(header_line) = lines.first() else {
        return Err(JournalLoadError::EmptyFile);
    };
    if !has_trailing_newline {
        return Err(JournalLoadError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(header_line)
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;

    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        content_hash: header.content_hash,
        seed: header.seed,
        roster: header.roster,
        inputs: Vec::new(),
    };

    let mut prev_sha256_hex = INITIAL_HASH.to_string();
    let mut next_seq: u64 = 0;

    for (line_index, line) in lines.iter().skip(1).enumerate() {
        let line_number = line_index + 2;

        if line.is_empty() {
            return Err(JournalLoadError::InvalidRecord {
                line: line_number,
                message: "empty line".to_string(),
            });
        }

        let record: FileRecord = serde_json::from_str(line).map_err(|e| {
            JournalLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;

        if record.seq != next_seq {
            return Err(JournalLoadError::InvalidRecord {
                line: line_number,
                message: format!("expected seq {next_seq}, found {}", record.seq),
            });
        }
        if let Some(previous) = journal.inputs.last()
            && record.tick < previous.tick
        {
            return Err(JournalLoadError::InvalidRecord {
                line: line_number,
                message: format!("tick {} goes back from {}", record.tick, previous.tick),
            });
        }

        if record.prev_sha256_hex != prev_sha256_hex {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        let body = RecordBody { seq: record.seq, tick: record.tick, payload: &record.payload };
        let body_json = serde_json::to_string(&body).map_err(|e| {
            JournalLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;
        let expected_sha256 = compute_record_sha256(&body_json, &prev_sha256_hex);

        if record.sha256_hex != expected_sha256 {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        journal.inputs.push(InputRecord { seq: record.seq, tick: record.tick, payload: record.payload });

        prev_sha256_hex = record.sha256_hex;
        next_seq += 1;
    }

    Ok(LoadedJournal { journal, last_sha256_hex: prev_sha256_hex, next_seq })
}

#[cfg(test)]
mod tests;

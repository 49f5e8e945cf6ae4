use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::events::InputEvent;
use crate::journal::InputPayload;
use crate::types::{CharacterClass, SimMode};

fn make_test_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn header(seed: u64) -> InputJournal {
    let roster = vec![
        RosterEntry { name: "Aldric".into(), class: CharacterClass::Knight },
        RosterEntry { name: "Hale".into(), class: CharacterClass::Cleric },
    ];
    InputJournal::new(seed, 99, roster)
}

fn input(event: InputEvent) -> InputPayload {
    InputPayload::Input { input: event }
}

#[test]
fn schema_roundtrip_header_and_records() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "roundtrip.jsonl");

    let mut writer = JournalWriter::create(&path, &header(42)).unwrap();
    writer.append(0, &InputPayload::SetMode { mode: SimMode::TurnBased }).unwrap();
    writer.append(0, &input(InputEvent::Move { dx: 1.0, dy: 0.0 })).unwrap();
    writer.append(10, &InputPayload::Halt).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.format_version, 1);
    assert_eq!(loaded.journal.build_id, "dev");
    assert_eq!(loaded.journal.content_hash, 99);
    assert_eq!(loaded.journal.seed, 42);
    assert_eq!(loaded.journal.roster.len(), 2);
    assert_eq!(loaded.journal.inputs.len(), 3);

    assert!(matches!(loaded.journal.inputs[0].payload, InputPayload::SetMode { .. }));
    assert!(matches!(loaded.journal.inputs[1].payload, InputPayload::Input { .. }));
    assert_eq!(loaded.journal.inputs[2].payload, InputPayload::Halt);
    assert_eq!(loaded.journal.inputs[2].tick, 10);

    let seqs: Vec<u64> = loaded.journal.inputs.iter().map(|record| record.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);

    assert_eq!(loaded.next_seq, 3);
    assert_ne!(loaded.last_sha256_hex, INITIAL_HASH);
}

#[test]
fn whole_journal_write_reads_back_equal() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "whole.jsonl");
    let mut journal = header(7);
    journal.append_input(0, InputEvent::Rest);
    journal.append_input(4, InputEvent::ClaimQuest { quest: "goblin_hunt".into() });
    journal.append_halt(9);

    write_journal_to_file(&path, &journal).unwrap();
    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal, journal);
}

#[test]
fn hash_chain_detects_tampered_record() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "tampered.jsonl");

    let mut writer = JournalWriter::create(&path, &header(1)).unwrap();
    writer.append(0, &input(InputEvent::Rest)).unwrap();
    writer.append(5, &input(InputEvent::PickUp)).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    assert!(lines.len() >= 3, "expected header + 2 records");

    lines[2] = lines[2].replace("pick_up", "rest");
    fs::write(&path, lines.join("\n") + "\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 3 })),
        "expected hash chain broken at line 3, got: {result:?}"
    );
}

#[test]
fn hash_chain_detects_deleted_record() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "deleted.jsonl");

    let mut writer = JournalWriter::create(&path, &header(1)).unwrap();
    for i in 0..3 {
        writer.append(i * 5, &input(InputEvent::Turn { facing: 0.5 })).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    let tampered = format!("{}\n{}\n{}\n", lines[0], lines[1], lines[3]);
    fs::write(&path, tampered).unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(
            result,
            Err(JournalLoadError::HashChainBroken { .. })
                | Err(JournalLoadError::InvalidRecord { .. })
        ),
        "expected chain corruption error, got: {result:?}"
    );
}

#[test]
fn truncated_last_line_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "truncated.jsonl");

    let mut writer = JournalWriter::create(&path, &header(1)).unwrap();
    writer.append(0, &input(InputEvent::Rest)).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{{\"seq\":1,\"tick").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::IncompleteLine { line: 3 })),
        "expected incomplete line at line 3, got: {result:?}"
    );
}

#[test]
fn empty_file_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "empty.jsonl");
    fs::write(&path, "").unwrap();

    let result = load_journal_from_file(&path);
    assert!(matches!(result, Err(JournalLoadError::EmptyFile)), "got: {result:?}");
}

#[test]
fn header_only_file_loads_empty_journal() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "header_only.jsonl");

    let _writer = JournalWriter::create(&path, &header(555)).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.seed, 555);
    assert!(loaded.journal.inputs.is_empty());
    assert_eq!(loaded.next_seq, 0);
    assert_eq!(loaded.last_sha256_hex, INITIAL_HASH);
}

#[test]
fn resume_appends_continue_hash_chain() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "resume.jsonl");

    let mut writer = JournalWriter::create(&path, &header(1)).unwrap();
    writer.append(0, &input(InputEvent::Rest)).unwrap();
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.inputs.len(), 1);

    let mut writer = JournalWriter::resume(&path, loaded.last_sha256_hex, loaded.next_seq).unwrap();
    writer.append(5, &InputPayload::Halt).unwrap();
    drop(writer);

    let reloaded = load_journal_from_file(&path).unwrap();
    assert_eq!(reloaded.journal.inputs.len(), 2);
    assert_eq!(reloaded.journal.inputs[1].seq, 1);
    assert_eq!(reloaded.journal.halt_tick(), Some(5));
    assert_eq!(reloaded.next_seq, 2);
}

#[test]
fn ticks_going_backwards_are_rejected() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "backwards.jsonl");

    let mut writer = JournalWriter::create(&path, &header(1)).unwrap();
    writer.append(8, &input(InputEvent::Rest)).unwrap();
    writer.append(3, &input(InputEvent::Rest)).unwrap();

    let result = load_journal_from_file(&path);
    assert!(matches!(result, Err(JournalLoadError::InvalidRecord { line: 3, .. })), "got: {result:?}");
}

#[test]
fn invalid_header_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "bad_header.jsonl");
    fs::write(&path, "not valid json\n").unwrap();

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::InvalidHeader { line: 1, .. })),
        "expected invalid header error, got: {result:?}"
    );
}

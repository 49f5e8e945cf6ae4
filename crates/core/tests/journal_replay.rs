mod common;

use std::sync::Arc;

use tempfile::tempdir;
use wyrmvale_core::journal_file::{
    JournalWriter, load_journal_from_file, write_journal_to_file,
};
use wyrmvale_core::{InputEvent, InputPayload, Recorder, SimMode, replay_to_end};

use common::{load_content, load_sample_map, roster};

fn record(seed: u64, ticks: u64) -> (u64, wyrmvale_core::InputJournal) {
    let content = load_content();
    let map = load_sample_map(&content, "dragon_pass.map");
    let mut recorder = Recorder::new(seed, content, &map, roster()).expect("recorder");
    for tick in 0..ticks {
        let mut inputs = vec![
            InputEvent::Turn { facing: tick as f64 * 0.01 },
            InputEvent::Move { dx: 1.0, dy: if tick % 50 < 25 { 0.3 } else { -0.3 } },
        ];
        if tick % 30 == 0 {
            inputs.push(InputEvent::MeleeAttack { member: 1 });
        }
        let mode = if tick % 200 < 150 { SimMode::RealTime } else { SimMode::TurnBased };
        recorder.step(&inputs, mode);
    }
    let (world, journal) = recorder.finish();
    (world.snapshot_hash(), journal)
}

#[test]
fn journal_written_to_disk_replays_to_the_recorded_hash() {
    let (hash, journal) = record(2024, 900);
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.jsonl");
    write_journal_to_file(&path, &journal).unwrap();

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal, journal);

    let content = load_content();
    let map = load_sample_map(&content, "dragon_pass.map");
    let result = replay_to_end(Arc::clone(&content), &map, &loaded.journal).unwrap();
    assert_eq!(result.final_tick, 900);
    assert_eq!(result.final_snapshot_hash, hash);
}

#[test]
fn streaming_writer_matches_the_in_memory_journal() {
    let (_, journal) = record(7, 300);
    let dir = tempdir().unwrap();
    let path = dir.path().join("streamed.jsonl");

    let mut writer = JournalWriter::create(&path, &journal).unwrap();
    for record in &journal.inputs {
        writer.append(record.tick, &record.payload).unwrap();
    }
    drop(writer);

    let loaded = load_journal_from_file(&path).unwrap();
    assert_eq!(loaded.journal.inputs, journal.inputs);
    assert_eq!(loaded.journal.halt_tick(), Some(300));
    assert!(loaded.journal.inputs.iter().any(|record| matches!(record.payload, InputPayload::SetMode { .. })));
}

#[test]
fn truncating_the_journal_changes_the_outcome() {
    let (hash, mut journal) = record(99, 400);
    journal.inputs.retain(|record| record.tick < 200 || record.payload == InputPayload::Halt);

    let content = load_content();
    let map = load_sample_map(&content, "dragon_pass.map");
    let result = replay_to_end(Arc::clone(&content), &map, &journal).unwrap();
    assert_eq!(result.final_tick, 400);
    assert_ne!(result.final_snapshot_hash, hash);
}

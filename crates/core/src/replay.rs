//! Recording a session into an `InputJournal` and re-running one deterministically.
//! This module exists so hosts and tests share one definition of "the same session".
//! It does not own file persistence; see `journal_file`.

use std::sync::Arc;

use thiserror::Error;

use crate::content::ContentBundle;
use crate::error::LoadError;
use crate::events::{InputEvent, TickReport};
use crate::game::World;
use crate::journal::{InputJournal, InputPayload};
use crate::mapfile::ParsedMap;
use crate::party::{Party, RosterEntry};
use crate::types::SimMode;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("journal was recorded against content {expected:#x}, loaded content is {found:#x}")]
    ContentMismatch { expected: u64, found: u64 },
    #[error("journal roster could not be built")]
    Roster(#[from] LoadError),
    #[error("record {seq} is out of tick order")]
    OutOfOrder { seq: u64 },
    #[error("journal has no halt record")]
    MissingHalt,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_tick: u64,
    pub final_snapshot_hash: u64,
}

/// A world whose every step is journaled. The world is only reachable read-only, so
/// nothing can change it behind the journal's back.
pub struct Recorder {
    world: World,
    journal: InputJournal,
    mode: SimMode,
}

impl Recorder {
    pub fn new(
        seed: u64,
        content: Arc<ContentBundle>,
        map: &ParsedMap,
        roster: Vec<RosterEntry>,
    ) -> Result<Self, LoadError> {
        let party = Party::from_roster(&roster, &content)?;
        let journal = InputJournal::new(seed, content.fingerprint(), roster);
        let world = World::new(seed, content, map, party);
        Ok(Self { world, journal, mode: SimMode::RealTime })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn journal(&self) -> &InputJournal {
        &self.journal
    }

    pub fn step(&mut self, inputs: &[InputEvent], mode: SimMode) -> TickReport {
        let boundary = self.world.current_tick();
        if mode != self.mode {
            self.journal.append_mode(boundary, mode);
            self.mode = mode;
        }
        for input in inputs {
            self.journal.append_input(boundary, input.clone());
        }
        self.world.step(inputs, mode)
    }

    /// Closes the journal at the current tick.
    pub fn finish(mut self) -> (World, InputJournal) {
        self.journal.append_halt(self.world.current_tick());
        (self.world, self.journal)
    }
}

/// Rebuilds the world from `journal` and steps it up to the halt boundary.
pub fn replay_to_end(
    content: Arc<ContentBundle>,
    map: &ParsedMap,
    journal: &InputJournal,
) -> Result<ReplayResult, ReplayError> {
    let found = content.fingerprint();
    if journal.content_hash != found {
        return Err(ReplayError::ContentMismatch { expected: journal.content_hash, found });
    }
    let halt = journal.halt_tick().ok_or(ReplayError::MissingHalt)?;
    let party = Party::from_roster(&journal.roster, &content)?;
    let mut world = World::new(journal.seed, content, map, party);

    let mut records = journal.inputs.iter().peekable();
    let mut mode = SimMode::RealTime;
    for boundary in 0..halt {
        let mut inputs = Vec::new();
        while let Some(record) = records.next_if(|record| record.tick <= boundary) {
            if record.tick < boundary {
                return Err(ReplayError::OutOfOrder { seq: record.seq });
            }
            match &record.payload {
                InputPayload::Input { input } => inputs.push(input.clone()),
                InputPayload::SetMode { mode: next } => mode = *next,
                InputPayload::Halt => return Err(ReplayError::OutOfOrder { seq: record.seq }),
            }
        }
        world.step(&inputs, mode);
    }

    Ok(ReplayResult { final_tick: world.current_tick(), final_snapshot_hash: world.snapshot_hash() })
}

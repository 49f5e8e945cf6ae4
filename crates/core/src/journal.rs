//! The in-memory input journal: everything needed to re-run a session from scratch.
//! Records are kept in the order they were applied; `tick` is the boundary they were
//! applied at (the world tick before the step that consumed them).

use serde::{Deserialize, Serialize};

use crate::events::InputEvent;
use crate::party::RosterEntry;
use crate::types::SimMode;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    /// Fingerprint of the content bundle the session ran against.
    pub content_hash: u64,
    pub seed: u64,
    pub roster: Vec<RosterEntry>,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub tick: u64,
    pub payload: InputPayload,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPayload {
    /// Applied at the start of the step leaving `tick`.
    Input { input: InputEvent },
    /// Mode used from this boundary on.
    SetMode { mode: SimMode },
    /// The session ended at this boundary.
    Halt,
}

impl InputJournal {
    pub fn new(seed: u64, content_hash: u64, roster: Vec<RosterEntry>) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            content_hash,
            seed,
            roster,
            inputs: Vec::new(),
        }
    }

    fn next_seq(&self) -> u64 {
        self.inputs.last().map_or(0, |record| record.seq + 1)
    }

    pub fn append(&mut self, tick: u64, payload: InputPayload) {
        let seq = self.next_seq();
        self.inputs.push(InputRecord { seq, tick, payload });
    }

    pub fn append_input(&mut self, tick: u64, input: InputEvent) {
        self.append(tick, InputPayload::Input { input });
    }

    pub fn append_mode(&mut self, tick: u64, mode: SimMode) {
        self.append(tick, InputPayload::SetMode { mode });
    }

    pub fn append_halt(&mut self, tick: u64) {
        self.append(tick, InputPayload::Halt);
    }

    /// Boundary of the `Halt` record, if the session was closed.
    pub fn halt_tick(&self) -> Option<u64> {
        self.inputs.iter().find(|record| record.payload == InputPayload::Halt).map(|record| record.tick)
    }
}

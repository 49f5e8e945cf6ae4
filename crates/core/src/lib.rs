pub mod character;
pub mod collision;
pub mod content;
pub mod error;
pub mod events;
pub mod game;
pub mod grid;
pub mod item;
pub mod journal;
pub mod journal_file;
pub mod mapfile;
pub mod monster;
pub mod npc;
pub mod party;
pub mod projectile;
pub mod quest;
pub mod replay;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use content::{ContentBundle, ContentPaths, ContentSources};
pub use error::{ActionError, LoadError};
pub use events::{InputEvent, TickReport, WorldEvent};
pub use game::World;
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use mapfile::{ParsedMap, load_map, parse_map};
pub use party::{Party, RosterEntry};
pub use replay::*;
pub use snapshot::WorldSnapshot;
pub use types::*;

//! Placed NPCs. Services, dialogue and offers stay in the content bundle; an instance only
//! tracks where it stands and what it has used up.

use serde::{Deserialize, Serialize};

use crate::content::schema::NpcDef;
use crate::types::{NpcKind, NpcService, Vec2};

/// Party members must be at most this many pixels from an NPC to talk to it.
pub const INTERACT_DISTANCE: f64 = 128.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub key: String,
    pub name: String,
    pub kind: NpcKind,
    pub position: Vec2,
    pub visited: bool,
    /// Remaining count per merchant stock entry, in offer order.
    pub stock: Vec<u32>,
    pub encounter_started: bool,
}

impl Npc {
    pub fn from_def(key: &str, def: &NpcDef, position: Vec2) -> Self {
        let stock = def
            .merchant
            .as_ref()
            .map(|merchant| merchant.stock.iter().map(|entry| entry.stock).collect())
            .unwrap_or_default();
        Self {
            key: key.to_string(),
            name: def.name.clone(),
            kind: def.kind,
            position,
            visited: false,
            stock,
            encounter_started: false,
        }
    }

    pub fn in_reach(&self, point: Vec2) -> bool {
        self.position.distance(point) <= INTERACT_DISTANCE
    }

    /// Quest id under which this NPC's encounter is tracked.
    pub fn encounter_quest_id(&self) -> String {
        format!("encounter_{}", self.key)
    }
}

pub fn offers(def: &NpcDef, service: NpcService) -> bool {
    def.services.contains(&service)
}

//! The world: one seeded simulation owning the grid, the party, every entity store and the
//! quest log, advanced one tick per `step` call.
//!
//! A tick runs its phases in a fixed order: inputs, party upkeep, monster AI, projectiles,
//! hit resolution, deaths and loot, quest notifications, encounters. Monster AI and
//! projectiles only run in real time.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::character::ConditionChange;
use crate::collision::{CollisionOracle, Mobility};
use crate::content::ContentBundle;
use crate::content::schema::StatusEffectSpec;
use crate::content::tuning::Tuning;
use crate::error::{ActionError, Resource};
use crate::events::{InputEvent, TickReport, WorldEvent};
use crate::grid::TileGrid;
use crate::item::ItemKind;
use crate::mapfile::ParsedMap;
use crate::monster::{DamageOutcome, EncounterTag, Monster};
use crate::npc::Npc;
use crate::party::Party;
use crate::projectile::{Ballistics, Projectile, ProjectileOwner, ProjectileSource};
use crate::quest::QuestManager;
use crate::rng::Dice;
use crate::state::{WorldItem, WorldState};
use crate::types::*;

mod advance;
mod ai;
mod bootstrap;
mod combat;
mod encounters;
mod hash;
mod input;
mod invariants;
mod items;
mod loot;
mod pathfinding;
mod projectiles;
mod services;

pub use loot::roll_loot;
pub use pathfinding::{PathOutcome, find_path};

/// Who a queued hit lands on.
#[derive(Clone, Copy, Debug, PartialEq)]
enum HitTarget {
    Monster(MonsterId),
    Member(usize),
}

/// Damage waiting for the hit phase; melee swings wait out their weapon's hit delay.
#[derive(Clone, Debug, PartialEq)]
struct PendingHit {
    target: HitTarget,
    damage: i32,
    damage_type: DamageType,
    status: Option<StatusEffectSpec>,
    delay_ticks: u32,
}

pub struct World {
    seed: u64,
    tick: u64,
    mode: SimMode,
    dice: Dice,
    content: Arc<ContentBundle>,
    state: WorldState,
    log: Vec<WorldEvent>,
    pending_hits: Vec<PendingHit>,
}

impl World {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Mode of the most recent `step`.
    pub fn mode(&self) -> SimMode {
        self.mode
    }

    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn grid(&self) -> &TileGrid {
        &self.state.grid
    }

    pub fn party(&self) -> &Party {
        &self.state.party
    }

    pub fn party_mut(&mut self) -> &mut Party {
        &mut self.state.party
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.state.monsters.get(id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.state.monsters.get_mut(id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = (MonsterId, &Monster)> {
        self.state.monsters.iter()
    }

    pub fn npcs(&self) -> impl Iterator<Item = (NpcId, &Npc)> {
        self.state.npcs.iter()
    }

    pub fn npc_by_key(&self, key: &str) -> Option<NpcId> {
        self.state.npcs.iter().find(|(_, npc)| npc.key == key).map(|(id, _)| id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = (ProjectileId, &Projectile)> {
        self.state.projectiles.iter()
    }

    pub fn world_items(&self) -> impl Iterator<Item = (WorldItemId, &WorldItem)> {
        self.state.world_items.iter()
    }

    pub fn quests(&self) -> &QuestManager {
        &self.state.quests
    }

    pub fn quests_mut(&mut self) -> &mut QuestManager {
        &mut self.state.quests
    }

    /// Every event since the world was created, oldest first.
    pub fn log(&self) -> &[WorldEvent] {
        &self.log
    }

    /// Puts the party at `position` without any collision check. Hosts use this when the
    /// map has no spawn marker.
    pub fn place_party(&mut self, position: Vec2) {
        self.state.party.position = position;
    }

    /// Spawns a monster from content at the centre of `tile`.
    pub fn spawn_monster(&mut self, key: &str, tile: TilePos) -> Result<MonsterId, ActionError> {
        let def = self.content.monster(key).ok_or_else(|| ActionError::missing("monsters", key))?;
        let monster = Monster::from_def(key, def, tile.center());
        Ok(self.state.monsters.insert(monster))
    }

    fn record_condition_changes(
        &self,
        changes: Vec<(usize, ConditionChange)>,
        events: &mut Vec<WorldEvent>,
    ) {
        events.extend(changes.into_iter().map(|(member, change)| match change {
            ConditionChange::Gained(condition) => WorldEvent::ConditionGained { member, condition },
            ConditionChange::Cleared(condition) => WorldEvent::ConditionCleared { member, condition },
        }));
    }

    /// Gives every living member their share of `amount` and reports level-ups.
    fn award_experience(&mut self, amount: u32, events: &mut Vec<WorldEvent>) {
        let share = self.state.party.experience_share(amount);
        if share == 0 {
            return;
        }
        for member in self.state.party.live_member_indices() {
            events.push(WorldEvent::ExperienceAwarded { member, amount: share });
        }
        let levelled = self.state.party.award_experience(amount, &self.content);
        for (member, _) in levelled {
            let level = self.state.party.members[member].level;
            info!(member, level, "character levelled up");
            events.push(WorldEvent::LeveledUp { member, level });
        }
    }

    fn award_gold(&mut self, amount: u32, events: &mut Vec<WorldEvent>) {
        if amount == 0 {
            return;
        }
        self.state.party.gold = self.state.party.gold.saturating_add(amount);
        events.push(WorldEvent::GoldGained { amount });
    }
}

//! Host-facing inputs consumed by `World::step` and the events a tick reports back.

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::projectile::ProjectileOwner;
use crate::types::{
    AiState, Attribute, Condition, DamageType, EquipSlot, MonsterId, NpcId, ProjectileId,
    RewardBundle, WorldItemId,
};

/// One host action applied at the start of a tick.
/// `member` indexes the party roster; `slot` on inventory actions indexes the shared inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    Move { dx: f64, dy: f64 },
    Turn { facing: f64 },
    MeleeAttack { member: usize },
    CastSpell { member: usize, spell: Option<String>, target: Option<usize> },
    UseItem { member: usize, slot: usize },
    Equip { member: usize, slot: usize },
    Unequip { member: usize, slot: EquipSlot },
    PickUp,
    Interact { npc: NpcId },
    Buy { npc: NpcId, offer: usize },
    Sell { npc: NpcId, slot: usize },
    LearnSpell { npc: NpcId, member: usize, spell: String },
    ClaimQuest { quest: String },
    AllocateStat { member: usize, attribute: Attribute },
    ChooseLevelUp { member: usize, choice: String },
    Rest,
}

impl InputEvent {
    /// Whether this input counts as the party taking its turn.
    pub fn is_party_action(&self) -> bool {
        !matches!(self, InputEvent::Turn { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    MonsterStateChanged { monster: MonsterId, from: AiState, to: AiState },
    MonsterUnstuck { monster: MonsterId },
    MonsterDodged { monster: MonsterId },
    MonsterDamaged { monster: MonsterId, damage: i32, damage_type: DamageType },
    MonsterKilled { monster: MonsterId, key: String },
    MonsterAttacked { monster: MonsterId, member: usize },
    CharacterDamaged { member: usize, damage: i32, damage_type: DamageType },
    ConditionGained { member: usize, condition: Condition },
    ConditionCleared { member: usize, condition: Condition },
    ProjectileSpawned { projectile: ProjectileId, owner: ProjectileOwner },
    ProjectileExpired { projectile: ProjectileId },
    SpellCast { member: usize, spell: String },
    ExperienceAwarded { member: usize, amount: u32 },
    LeveledUp { member: usize, level: u32 },
    GoldGained { amount: u32 },
    LootDropped { item: String },
    ItemPickedUp { item: WorldItemId, key: String },
    WorldItemRespawned { item: WorldItemId },
    ItemConsumed { member: usize, key: String },
    MapRevealed,
    QuestActivated { quest: String },
    QuestCompleted { quest: String },
    QuestRewardsClaimed { quest: String, rewards: RewardBundle },
    NpcVisited { npc: NpcId },
    PartyHealed { npc: NpcId, cost: u32 },
    EncounterStarted { npc: NpcId, quest: String },
    EncounterCleared { quest: String, rewards: RewardBundle },
}

/// What one call to `World::step` did.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<WorldEvent>,
    /// Inputs that were refused, by their index in the input slice.
    pub action_errors: Vec<(usize, ActionError)>,
}

impl TickReport {
    pub fn killed_monsters(&self) -> impl Iterator<Item = MonsterId> + '_ {
        self.events.iter().filter_map(|event| match event {
            WorldEvent::MonsterKilled { monster, .. } => Some(*monster),
            _ => None,
        })
    }
}

//! Serde shapes of the nine content documents.
//! Each document is a top-level mapping from string key to one of these records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    Attribute, CharacterClass, Condition, DamageType, EquipSlot, MagicSchool, NpcKind,
    NpcService, QuestType, SkillType, TilePos, WeaponCategory,
};

fn yes() -> bool {
    true
}

fn one() -> f64 {
    1.0
}

fn one_u32() -> u32 {
    1
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TileDef {
    pub name: String,
    #[serde(default)]
    pub letter: Option<char>,
    /// Biome-specific letters; take precedence over `letter` inside that biome.
    #[serde(default)]
    pub letters: BTreeMap<String, char>,
    #[serde(default)]
    pub solid: bool,
    #[serde(default = "yes")]
    pub transparent: bool,
    #[serde(default = "yes")]
    pub walkable: bool,
    #[serde(default = "one")]
    pub height_multiplier: f64,
    #[serde(default)]
    pub sprite: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub biomes: BTreeSet<String>,
    #[serde(default)]
    pub floor_color: [u8; 3],
    #[serde(default)]
    pub wall_color: [u8; 3],
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_category() -> String {
    "floor".to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct MeleeSpec {
    #[serde(default = "default_arc")]
    pub arc_degrees: f64,
    #[serde(default)]
    pub hit_delay_ticks: u32,
}

fn default_arc() -> f64 {
    90.0
}

impl Default for MeleeSpec {
    fn default() -> Self {
        Self { arc_degrees: default_arc(), hit_delay_ticks: 0 }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WeaponDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: WeaponCategory,
    pub damage: i32,
    #[serde(default = "one")]
    pub range_tiles: f64,
    pub primary_stat: Attribute,
    #[serde(default)]
    pub secondary_stat: Option<Attribute>,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default = "one_u32")]
    pub max_projectiles: u32,
    #[serde(default = "default_arrow_speed")]
    pub projectile_speed_tiles: f64,
    #[serde(default)]
    pub melee: MeleeSpec,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub attributes: BTreeMap<String, i32>,
}

fn default_arrow_speed() -> f64 {
    8.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Armor,
    Accessory,
    Consumable,
    Quest,
    BattleSpell,
    UtilitySpell,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ItemDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    /// Spell granted by spell-kind items.
    #[serde(default)]
    pub spell: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, i32>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ProjectileSpec {
    pub speed_tiles: f64,
    pub range_tiles: f64,
    #[serde(default)]
    pub collision_size_tiles: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct UtilityEffect {
    #[serde(default)]
    pub heal_amount: i32,
    #[serde(default)]
    pub vision_bonus: i32,
    #[serde(default)]
    pub stat_bonus: i32,
    #[serde(default)]
    pub water_walking: bool,
    #[serde(default)]
    pub water_breathing: bool,
    #[serde(default)]
    pub awaken: bool,
    #[serde(default)]
    pub duration_seconds: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusEffectSpec {
    pub condition: Condition,
    pub duration_seconds: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpellDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub school: MagicSchool,
    #[serde(default = "one_u32")]
    pub level: u32,
    pub spell_points_cost: i32,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
    #[serde(default)]
    pub utility: Option<UtilityEffect>,
    #[serde(default)]
    pub status: Option<StatusEffectSpec>,
}

impl SpellDef {
    pub fn is_utility(&self) -> bool {
        self.utility.is_some()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MonsterDef {
    pub name: String,
    #[serde(default)]
    pub letter: Option<char>,
    #[serde(default = "one_u32")]
    pub level: u32,
    pub hit_points: i32,
    #[serde(default)]
    pub armor_class: i32,
    #[serde(default)]
    pub perfect_dodge: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub gold_min: u32,
    #[serde(default)]
    pub gold_max: u32,
    pub damage_min: i32,
    pub damage_max: i32,
    #[serde(default)]
    pub damage_type: DamageType,
    /// Zero selects the engine default detection radius.
    #[serde(default)]
    pub alert_radius: f64,
    #[serde(default = "default_attack_radius")]
    pub attack_radius: f64,
    pub speed: f64,
    #[serde(default)]
    pub tether_radius: f64,
    #[serde(default = "default_attack_cooldown")]
    pub attack_cooldown: u32,
    #[serde(default)]
    pub flying: bool,
    /// Tile categories this monster treats as walkable.
    #[serde(default)]
    pub habitat: BTreeSet<String>,
    #[serde(default)]
    pub resistances: BTreeMap<DamageType, i32>,
    #[serde(default)]
    pub projectile_spell: Option<String>,
    #[serde(default)]
    pub projectile_weapon: Option<String>,
    #[serde(default)]
    pub on_hit: Option<StatusEffectSpec>,
}

fn default_attack_radius() -> f64 {
    64.0
}

fn default_attack_cooldown() -> u32 {
    60
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LootEntry {
    pub item: String,
    pub chance: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Dialogue {
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StockEntry {
    pub item: String,
    pub cost: u32,
    pub stock: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MerchantDef {
    #[serde(default)]
    pub stock: Vec<StockEntry>,
    #[serde(default)]
    pub sells_enabled: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpellOffer {
    pub spell: String,
    pub cost: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncounterMember {
    pub monster: String,
    #[serde(default = "one_u32")]
    pub count: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncounterDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub monsters: Vec<EncounterMember>,
    #[serde(default)]
    pub reward_gold: u32,
    #[serde(default)]
    pub reward_experience: u32,
    #[serde(default)]
    pub first_visit_only: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NpcDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NpcKind,
    #[serde(default)]
    pub dialogue: Dialogue,
    #[serde(default)]
    pub services: BTreeSet<NpcService>,
    #[serde(default)]
    pub merchant: Option<MerchantDef>,
    #[serde(default)]
    pub spells: Vec<SpellOffer>,
    #[serde(default)]
    pub encounter: Option<EncounterDef>,
    /// Quests a quest giver activates on interaction.
    #[serde(default)]
    pub quests: Vec<String>,
    #[serde(default)]
    pub healing_cost: u32,
    #[serde(default)]
    pub sprite: String,
    #[serde(default = "one")]
    pub render_scale: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QuestDef {
    #[serde(rename = "type")]
    pub kind: QuestType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_monster: Option<String>,
    #[serde(default)]
    pub target_count: u32,
    #[serde(default)]
    pub encounter_id: Option<String>,
    #[serde(default)]
    pub reward_gold: u32,
    #[serde(default)]
    pub reward_experience: u32,
    #[serde(default)]
    pub is_starting_quest: bool,
    #[serde(default)]
    pub marker: Option<TilePos>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelUpEffect {
    Stat { attribute: Attribute, amount: i32 },
    Skill { skill: SkillType, levels: u32 },
    School { school: MagicSchool, levels: u32 },
    Spell { spell: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LevelUpChoice {
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub effect: LevelUpEffect,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LevelUpTable {
    /// Cumulative experience needed for level 2, 3, ...
    #[serde(default)]
    pub experience_thresholds: Vec<u64>,
    #[serde(default)]
    pub choices: BTreeMap<CharacterClass, Vec<LevelUpChoice>>,
}

impl LevelUpTable {
    /// Experience required to advance from `level` to `level + 1`, if the table goes that far.
    pub fn threshold_for_next(&self, level: u32) -> Option<u64> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.experience_thresholds.get(index).copied()
    }

    pub fn choice(&self, class: CharacterClass, key: &str) -> Option<&LevelUpChoice> {
        self.choices.get(&class)?.iter().find(|choice| choice.key == key)
    }
}

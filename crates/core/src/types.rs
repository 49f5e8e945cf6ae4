use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Edge length of one grid cell in world pixels.
pub const TILE_SIZE: f64 = 64.0;
/// Edge length of the axis-aligned box every moving entity occupies.
pub const ENTITY_BOX_SIZE: f64 = 48.0;
pub const MAX_PARTY_SIZE: usize = 4;

new_key_type! {
    pub struct MonsterId;
    pub struct NpcId;
    pub struct ProjectileId;
    pub struct WorldItemId;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_angle(angle: f64) -> Self {
        Self { x: angle.cos(), y: angle.sin() }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        (len > f64::EPSILON).then(|| Vec2 { x: self.x / len, y: self.y / len })
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2 { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Grid cell coordinates. Ordered row-major (`y` first) so sorted sets iterate the way the
/// map file reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub y: i32,
    pub x: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn containing(point: Vec2) -> Self {
        Self { y: (point.y / TILE_SIZE).floor() as i32, x: (point.x / TILE_SIZE).floor() as i32 }
    }

    pub fn center(self) -> Vec2 {
        Vec2 {
            x: f64::from(self.x) * TILE_SIZE + TILE_SIZE / 2.0,
            y: f64::from(self.y) * TILE_SIZE + TILE_SIZE / 2.0,
        }
    }

    pub fn manhattan(self, other: TilePos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn neighbors(self) -> [TilePos; 4] {
        [
            TilePos { y: self.y - 1, x: self.x },
            TilePos { y: self.y, x: self.x + 1 },
            TilePos { y: self.y + 1, x: self.x },
            TilePos { y: self.y, x: self.x - 1 },
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SimMode {
    #[default]
    RealTime,
    TurnBased,
}

/// Which entity a collision query is asked on behalf of, so it can ignore its own box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Party,
    Monster(MonsterId),
    Npc(NpcId),
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Might,
    Intellect,
    Personality,
    Endurance,
    Accuracy,
    Speed,
    Luck,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Might,
        Attribute::Intellect,
        Attribute::Personality,
        Attribute::Endurance,
        Attribute::Accuracy,
        Attribute::Speed,
        Attribute::Luck,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Attribute::Might => "might",
            Attribute::Intellect => "intellect",
            Attribute::Personality => "personality",
            Attribute::Endurance => "endurance",
            Attribute::Accuracy => "accuracy",
            Attribute::Speed => "speed",
            Attribute::Luck => "luck",
        }
    }

    pub fn parse(name: &str) -> Option<Attribute> {
        Attribute::ALL.into_iter().find(|attribute| attribute.as_str() == name)
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Air,
    Water,
    Earth,
    Body,
    Mind,
    Spirit,
    Light,
    Dark,
    Poison,
    Magic,
}

impl DamageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Fire => "fire",
            DamageType::Air => "air",
            DamageType::Water => "water",
            DamageType::Earth => "earth",
            DamageType::Body => "body",
            DamageType::Mind => "mind",
            DamageType::Spirit => "spirit",
            DamageType::Light => "light",
            DamageType::Dark => "dark",
            DamageType::Poison => "poison",
            DamageType::Magic => "magic",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Normal,
    Poisoned,
    Diseased,
    Cursed,
    Asleep,
    Fear,
    Paralyzed,
    Unconscious,
    Dead,
    Stone,
    Eradicated,
}

impl Condition {
    /// Conditions that stop a character from attacking or casting.
    pub const fn prevents_action(self) -> bool {
        matches!(
            self,
            Condition::Asleep
                | Condition::Paralyzed
                | Condition::Unconscious
                | Condition::Dead
                | Condition::Stone
                | Condition::Eradicated
        )
    }

    /// Conditions driven by a countdown rather than by hit points.
    pub const fn is_timed(self) -> bool {
        matches!(self, Condition::Asleep | Condition::Fear | Condition::Paralyzed)
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mastery {
    #[default]
    Novice,
    Expert,
    Master,
    Grandmaster,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Knight,
    Paladin,
    Archer,
    Cleric,
    Sorcerer,
    Druid,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 6] = [
        CharacterClass::Knight,
        CharacterClass::Paladin,
        CharacterClass::Archer,
        CharacterClass::Cleric,
        CharacterClass::Sorcerer,
        CharacterClass::Druid,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CharacterClass::Knight => "knight",
            CharacterClass::Paladin => "paladin",
            CharacterClass::Archer => "archer",
            CharacterClass::Cleric => "cleric",
            CharacterClass::Sorcerer => "sorcerer",
            CharacterClass::Druid => "druid",
        }
    }

    pub fn can_wield(self, category: WeaponCategory) -> bool {
        use WeaponCategory::*;
        match self {
            CharacterClass::Knight => matches!(category, Sword | Axe | Mace | Spear),
            CharacterClass::Paladin => matches!(category, Sword | Mace | Spear),
            CharacterClass::Archer => matches!(category, Bow | Dagger),
            CharacterClass::Cleric => matches!(category, Mace | Staff),
            CharacterClass::Sorcerer => matches!(category, Staff | Dagger),
            CharacterClass::Druid => matches!(category, Staff | Spear | Dagger),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    Sword,
    Axe,
    Mace,
    Spear,
    Bow,
    Dagger,
    Staff,
}

impl WeaponCategory {
    pub const fn skill(self) -> SkillType {
        match self {
            WeaponCategory::Sword => SkillType::Sword,
            WeaponCategory::Axe => SkillType::Axe,
            WeaponCategory::Mace => SkillType::Mace,
            WeaponCategory::Spear => SkillType::Spear,
            WeaponCategory::Bow => SkillType::Bow,
            WeaponCategory::Dagger => SkillType::Dagger,
            WeaponCategory::Staff => SkillType::Staff,
        }
    }

    pub const fn is_ranged(self) -> bool {
        matches!(self, WeaponCategory::Bow)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    Sword,
    Axe,
    Mace,
    Spear,
    Bow,
    Dagger,
    Staff,
    Shield,
    LeatherArmor,
    ChainArmor,
    PlateArmor,
    Bodybuilding,
    Meditation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagicSchool {
    Fire,
    Air,
    Water,
    Earth,
    Body,
    Mind,
    Spirit,
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    MainHand,
    OffHand,
    Armor,
    Helmet,
    Boots,
    Cloak,
    Gauntlets,
    Belt,
    Amulet,
    Ring1,
    Ring2,
    Spell,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 12] = [
        EquipSlot::MainHand,
        EquipSlot::OffHand,
        EquipSlot::Armor,
        EquipSlot::Helmet,
        EquipSlot::Boots,
        EquipSlot::Cloak,
        EquipSlot::Gauntlets,
        EquipSlot::Belt,
        EquipSlot::Amulet,
        EquipSlot::Ring1,
        EquipSlot::Ring2,
        EquipSlot::Spell,
    ];

    /// Slots whose items contribute to armor class.
    pub const ARMOR_CLASS: [EquipSlot; 6] = [
        EquipSlot::Armor,
        EquipSlot::Helmet,
        EquipSlot::Boots,
        EquipSlot::Cloak,
        EquipSlot::Gauntlets,
        EquipSlot::Belt,
    ];

    /// Integer code stored in an item's `equip_slot` attribute.
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<EquipSlot> {
        EquipSlot::ALL.into_iter().find(|slot| slot.code() == code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Patrolling,
    Pursuing,
    Alert,
    Attacking,
    Fleeing,
}

impl AiState {
    pub const fn is_engaged(self) -> bool {
        matches!(self, AiState::Alert | AiState::Pursuing | AiState::Attacking)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKind {
    Merchant,
    SpellTrader,
    QuestGiver,
    Encounter,
    Generic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcService {
    Training,
    Healing,
    Repair,
    Identify,
    SpellTrading,
    Trading,
    Quests,
    Encounter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Kill,
    Encounter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    pub gold: u32,
    pub experience: u32,
}

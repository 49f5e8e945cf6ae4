//! Item instances carried by the party, equipped by characters, or lying in the world.
//! Every kind shares name, description and an integer attribute map; weapons and spell
//! items carry their extra data in the variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::schema::{ItemDef, ItemType, MeleeSpec, SpellDef, WeaponDef};
use crate::types::{Attribute, DamageType, EquipSlot, WeaponCategory};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub category: WeaponCategory,
    pub damage: i32,
    pub range_tiles: f64,
    pub primary_stat: Attribute,
    pub secondary_stat: Option<Attribute>,
    pub damage_type: DamageType,
    pub max_projectiles: u32,
    pub projectile_speed_tiles: f64,
    pub melee: MeleeSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(WeaponStats),
    Armor,
    Accessory,
    Consumable,
    Quest,
    BattleSpell { spell: String },
    UtilitySpell { spell: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
    pub attributes: BTreeMap<String, i32>,
}

impl Item {
    pub fn from_weapon(key: &str, def: &WeaponDef) -> Self {
        let mut attributes = def.attributes.clone();
        attributes.insert("value".to_string(), def.value);
        attributes.insert("equip_slot".to_string(), EquipSlot::MainHand.code());
        Self {
            key: key.to_string(),
            name: def.name.clone(),
            description: def.description.clone(),
            kind: ItemKind::Weapon(WeaponStats {
                category: def.category,
                damage: def.damage,
                range_tiles: def.range_tiles,
                primary_stat: def.primary_stat,
                secondary_stat: def.secondary_stat,
                damage_type: def.damage_type,
                max_projectiles: def.max_projectiles,
                projectile_speed_tiles: def.projectile_speed_tiles,
                melee: def.melee,
            }),
            attributes,
        }
    }

    /// Spell items whose `spell` is absent are rejected by validation before this runs.
    pub fn from_def(key: &str, def: &ItemDef) -> Self {
        let mut attributes = def.attributes.clone();
        if let Some(slot) = def.equip_slot {
            attributes.insert("equip_slot".to_string(), slot.code());
        }
        let spell = def.spell.clone().unwrap_or_default();
        let kind = match def.kind {
            ItemType::Armor => ItemKind::Armor,
            ItemType::Accessory => ItemKind::Accessory,
            ItemType::Consumable => ItemKind::Consumable,
            ItemType::Quest => ItemKind::Quest,
            ItemType::BattleSpell => ItemKind::BattleSpell { spell },
            ItemType::UtilitySpell => ItemKind::UtilitySpell { spell },
        };
        Self {
            key: key.to_string(),
            name: def.name.clone(),
            description: def.description.clone(),
            kind,
            attributes,
        }
    }

    /// Spell-slot item for a spell that has no scroll entry in the item table.
    pub fn from_spell(key: &str, def: &SpellDef) -> Self {
        let spell = key.to_string();
        Self {
            key: key.to_string(),
            name: def.name.clone(),
            description: def.description.clone(),
            kind: if def.is_utility() {
                ItemKind::UtilitySpell { spell }
            } else {
                ItemKind::BattleSpell { spell }
            },
            attributes: BTreeMap::from([("equip_slot".to_string(), EquipSlot::Spell.code())]),
        }
    }

    pub fn attr(&self, name: &str) -> i32 {
        self.attributes.get(name).copied().unwrap_or(0)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.attr(name) != 0
    }

    pub fn weapon(&self) -> Option<&WeaponStats> {
        match &self.kind {
            ItemKind::Weapon(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn spell(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::BattleSpell { spell } | ItemKind::UtilitySpell { spell } => Some(spell),
            _ => None,
        }
    }

    pub fn value(&self) -> i32 {
        self.attr("value")
    }

    /// Slot this item goes into, or `None` for items that cannot be equipped.
    pub fn target_slot(&self) -> Option<EquipSlot> {
        let explicit = self.attributes.get("equip_slot").and_then(|code| EquipSlot::from_code(*code));
        match self.kind {
            ItemKind::Weapon(_) => Some(EquipSlot::MainHand),
            ItemKind::Armor => Some(explicit.unwrap_or(EquipSlot::Armor)),
            ItemKind::Accessory => Some(explicit.unwrap_or(EquipSlot::Ring1)),
            ItemKind::BattleSpell { .. } | ItemKind::UtilitySpell { .. } => Some(EquipSlot::Spell),
            ItemKind::Consumable | ItemKind::Quest => None,
        }
    }

    /// What this item adds to `attribute` for a wearer whose base value is `base`:
    /// `base / <stat>_scaling_divisor` (floored) plus the flat `bonus_<stat>`.
    pub fn attribute_contribution(&self, attribute: Attribute, base: i32) -> i32 {
        let name = attribute.as_str();
        let divisor = self.attr(&format!("{name}_scaling_divisor"));
        let scaled = if divisor > 0 { base.div_euclid(divisor) } else { 0 };
        scaled + self.attr(&format!("bonus_{name}"))
    }

    pub fn resistance(&self, damage_type: DamageType) -> i32 {
        self.attr(&format!("resist_{damage_type}"))
    }
}

//! Cross-table reference and schema checks run once when a bundle is built.

use std::collections::BTreeMap;

use super::schema::{ItemType, LevelUpEffect, TileDef};
use super::ContentBundle;
use crate::error::LoadError;
use crate::types::{QuestType, WeaponCategory};

pub(super) fn validate_bundle(bundle: &ContentBundle) -> Result<(), LoadError> {
    validate_tiles(bundle)?;
    validate_weapons(bundle)?;
    validate_items(bundle)?;
    validate_spells(bundle)?;
    validate_monsters(bundle)?;
    validate_loot(bundle)?;
    validate_npcs(bundle)?;
    validate_quests(bundle)?;
    validate_level_up(bundle)?;
    Ok(())
}

/// Spawn marker, entity placeholder and the comment marker.
const RESERVED_LETTERS: [char; 3] = ['+', '@', '#'];

fn validate_tiles(bundle: &ContentBundle) -> Result<(), LoadError> {
    let mut plain_letters: BTreeMap<char, Vec<&str>> = BTreeMap::new();
    for tile in &bundle.tiles {
        let def = &tile.def;
        if def.solid && def.walkable {
            return Err(LoadError::invalid("tiles", &tile.key, "solid tiles cannot be walkable"));
        }
        if !(def.height_multiplier.is_finite() && def.height_multiplier >= 0.0) {
            return Err(LoadError::invalid("tiles", &tile.key, "height_multiplier must be >= 0"));
        }
        if def.letters.values().chain(def.letter.iter()).any(|letter| RESERVED_LETTERS.contains(letter)) {
            return Err(LoadError::invalid("tiles", &tile.key, "letter is reserved"));
        }
        if let Some(letter) = def.letter {
            plain_letters.entry(letter).or_default().push(tile.key.as_str());
        }
    }
    // Two tiles may share a plain letter only when their biome sets are disjoint and non-empty.
    for (letter, keys) in &plain_letters {
        for (index, left) in keys.iter().enumerate() {
            for right in &keys[index + 1..] {
                let (Some(a), Some(b)) = (tile_def(bundle, left), tile_def(bundle, right)) else {
                    continue;
                };
                let overlapping = a.biomes.is_empty()
                    || b.biomes.is_empty()
                    || a.biomes.intersection(&b.biomes).next().is_some();
                if overlapping {
                    return Err(LoadError::invalid(
                        "tiles",
                        *right,
                        format!("letter `{letter}` already used by `{left}`"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn tile_def<'a>(bundle: &'a ContentBundle, key: &str) -> Option<&'a TileDef> {
    bundle.tile_codes.get(key).and_then(|code| bundle.tile(*code)).map(|tile| &tile.def)
}

fn validate_weapons(bundle: &ContentBundle) -> Result<(), LoadError> {
    for (key, weapon) in &bundle.weapons {
        if weapon.damage < 0 {
            return Err(LoadError::invalid("weapons", key, "damage must be >= 0"));
        }
        if weapon.range_tiles <= 0.0 {
            return Err(LoadError::invalid("weapons", key, "range_tiles must be positive"));
        }
        if weapon.category == WeaponCategory::Bow
            && (weapon.max_projectiles == 0 || weapon.projectile_speed_tiles <= 0.0)
        {
            return Err(LoadError::invalid(
                "weapons",
                key,
                "bows need max_projectiles >= 1 and a positive projectile speed",
            ));
        }
        if bundle.items.contains_key(key) {
            return Err(LoadError::invalid("weapons", key, "key is also used in the item table"));
        }
    }
    Ok(())
}

fn validate_items(bundle: &ContentBundle) -> Result<(), LoadError> {
    for (key, item) in &bundle.items {
        let attr = |name: &str| item.attributes.get(name).copied().unwrap_or(0);
        match item.kind {
            ItemType::Consumable => {
                if attr("heal_base") > 0 && attr("heal_endurance_divisor") <= 0 {
                    return Err(LoadError::invalid(
                        "items",
                        key,
                        "heal_base requires a positive heal_endurance_divisor",
                    ));
                }
            }
            ItemType::BattleSpell | ItemType::UtilitySpell => {
                let Some(spell_key) = &item.spell else {
                    return Err(LoadError::invalid("items", key, "spell items must name a spell"));
                };
                let spell =
                    bundle.spells.get(spell_key).ok_or_else(|| LoadError::missing("spells", spell_key))?;
                let utility_item = item.kind == ItemType::UtilitySpell;
                if spell.is_utility() != utility_item {
                    return Err(LoadError::invalid("items", key, "spell kind does not match item kind"));
                }
            }
            ItemType::Armor | ItemType::Accessory | ItemType::Quest => {}
        }
        for (name, value) in &item.attributes {
            if name.ends_with("_scaling_divisor") && *value < 0 {
                return Err(LoadError::invalid("items", key, format!("{name} must be >= 0")));
            }
        }
    }
    Ok(())
}

fn validate_spells(bundle: &ContentBundle) -> Result<(), LoadError> {
    for (key, spell) in &bundle.spells {
        if spell.spell_points_cost < 0 {
            return Err(LoadError::invalid("spells", key, "spell_points_cost must be >= 0"));
        }
        if spell.is_utility() {
            continue;
        }
        let Some(projectile) = spell.projectile else {
            return Err(LoadError::invalid("spells", key, "battle spells need a projectile"));
        };
        if projectile.speed_tiles <= 0.0 || projectile.range_tiles <= 0.0 {
            return Err(LoadError::invalid("spells", key, "projectile speed and range must be positive"));
        }
    }
    Ok(())
}

fn validate_monsters(bundle: &ContentBundle) -> Result<(), LoadError> {
    let mut letters: BTreeMap<char, &str> = BTreeMap::new();
    for (key, monster) in &bundle.monsters {
        if monster.hit_points <= 0 {
            return Err(LoadError::invalid("monsters", key, "hit_points must be positive"));
        }
        if monster.damage_min > monster.damage_max || monster.damage_min < 0 {
            return Err(LoadError::invalid("monsters", key, "need 0 <= damage_min <= damage_max"));
        }
        if monster.gold_min > monster.gold_max {
            return Err(LoadError::invalid("monsters", key, "gold_min exceeds gold_max"));
        }
        if monster.perfect_dodge > 100 {
            return Err(LoadError::invalid("monsters", key, "perfect_dodge is a percentage"));
        }
        if monster.speed < 0.0 || monster.alert_radius < 0.0 || monster.tether_radius < 0.0 {
            return Err(LoadError::invalid("monsters", key, "speeds and radii must be >= 0"));
        }
        if let Some(letter) = monster.letter {
            if !letter.is_ascii_lowercase() {
                return Err(LoadError::invalid("monsters", key, "map letters are lowercase a..z"));
            }
            if let Some(previous) = letters.insert(letter, key) {
                return Err(LoadError::invalid(
                    "monsters",
                    key,
                    format!("letter `{letter}` already used by `{previous}`"),
                ));
            }
        }
        if let Some(spell) = &monster.projectile_spell {
            let def = bundle.spells.get(spell).ok_or_else(|| LoadError::missing("spells", spell))?;
            if def.projectile.is_none() {
                return Err(LoadError::invalid("monsters", key, "projectile_spell has no projectile"));
            }
        }
        if let Some(weapon) = &monster.projectile_weapon
            && !bundle.weapons.contains_key(weapon)
        {
            return Err(LoadError::missing("weapons", weapon));
        }
    }
    Ok(())
}

fn validate_loot(bundle: &ContentBundle) -> Result<(), LoadError> {
    for (monster, entries) in &bundle.loot {
        if !bundle.monsters.contains_key(monster) {
            return Err(LoadError::missing("monsters", monster));
        }
        for entry in entries {
            if !bundle.has_item_key(&entry.item) {
                return Err(LoadError::missing("items", &entry.item));
            }
            if !(0.0..=1.0).contains(&entry.chance) {
                return Err(LoadError::invalid("loot", monster, "chance must be within [0, 1]"));
            }
        }
    }
    Ok(())
}

fn validate_npcs(bundle: &ContentBundle) -> Result<(), LoadError> {
    for npc in bundle.npcs.values() {
        if let Some(merchant) = &npc.merchant {
            for entry in &merchant.stock {
                if !bundle.has_item_key(&entry.item) {
                    return Err(LoadError::missing("items", &entry.item));
                }
            }
        }
        for offer in &npc.spells {
            if !bundle.spells.contains_key(&offer.spell) {
                return Err(LoadError::missing("spells", &offer.spell));
            }
        }
        if let Some(encounter) = &npc.encounter {
            for member in &encounter.monsters {
                if !bundle.monsters.contains_key(&member.monster) {
                    return Err(LoadError::missing("monsters", &member.monster));
                }
            }
        }
        for quest in &npc.quests {
            if !bundle.quests.contains_key(quest) {
                return Err(LoadError::missing("quests", quest));
            }
        }
    }
    Ok(())
}

fn validate_quests(bundle: &ContentBundle) -> Result<(), LoadError> {
    for (key, quest) in &bundle.quests {
        if quest.kind != QuestType::Kill {
            continue;
        }
        let Some(target) = &quest.target_monster else {
            return Err(LoadError::invalid("quests", key, "kill quests need target_monster"));
        };
        if !bundle.monsters.contains_key(target) {
            return Err(LoadError::missing("monsters", target));
        }
        if quest.target_count == 0 {
            return Err(LoadError::invalid("quests", key, "target_count must be positive"));
        }
    }
    Ok(())
}

fn validate_level_up(bundle: &ContentBundle) -> Result<(), LoadError> {
    let thresholds = &bundle.level_up.experience_thresholds;
    if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(LoadError::invalid(
            "level_up",
            "experience_thresholds",
            "thresholds must be strictly increasing",
        ));
    }
    for choices in bundle.level_up.choices.values() {
        for choice in choices {
            if let LevelUpEffect::Spell { spell } = &choice.effect
                && !bundle.spells.contains_key(spell)
            {
                return Err(LoadError::missing("spells", spell));
            }
        }
    }
    Ok(())
}

//! The adventuring party: up to four characters, shared purse and pack, position, and
//! party-wide timed effects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::character::{Character, ConditionChange};
use crate::content::ContentBundle;
use crate::content::schema::UtilityEffect;
use crate::content::tuning::Tuning;
use crate::error::{ActionError, LoadError, Resource};
use crate::item::Item;
use crate::types::{CharacterClass, EquipSlot, MAX_PARTY_SIZE, SimMode, Vec2};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub class: CharacterClass,
}

/// Remaining ticks and magnitudes of party-wide utility effects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBuffs {
    pub stat_bonus: i32,
    pub stat_ticks: u32,
    pub vision_bonus: i32,
    pub vision_ticks: u32,
    pub water_walking_ticks: u32,
    pub water_breathing_ticks: u32,
}

impl PartyBuffs {
    fn tick(&mut self) {
        self.stat_ticks = self.stat_ticks.saturating_sub(1);
        if self.stat_ticks == 0 {
            self.stat_bonus = 0;
        }
        self.vision_ticks = self.vision_ticks.saturating_sub(1);
        if self.vision_ticks == 0 {
            self.vision_bonus = 0;
        }
        self.water_walking_ticks = self.water_walking_ticks.saturating_sub(1);
        self.water_breathing_ticks = self.water_breathing_ticks.saturating_sub(1);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub members: Vec<Character>,
    pub gold: u32,
    pub food: u32,
    pub inventory: Vec<Item>,
    pub position: Vec2,
    /// Radians; 0 faces +x.
    pub facing: f64,
    pub buffs: PartyBuffs,
}

impl Default for Party {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            gold: 0,
            food: 0,
            inventory: Vec::new(),
            position: Vec2::default(),
            facing: 0.0,
            buffs: PartyBuffs::default(),
        }
    }
}

impl Party {
    pub fn from_roster(roster: &[RosterEntry], content: &ContentBundle) -> Result<Self, LoadError> {
        let mut party = Party::default();
        for entry in roster {
            party.add_member(Character::new(&entry.name, entry.class, content)?);
        }
        Ok(party)
    }

    /// Adds `member` unless the party is already full.
    pub fn add_member(&mut self, member: Character) -> bool {
        if self.members.len() >= MAX_PARTY_SIZE {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn member(&self, index: usize) -> Result<&Character, ActionError> {
        self.members.get(index).ok_or(ActionError::UnknownEntity)
    }

    pub fn member_mut(&mut self, index: usize) -> Result<&mut Character, ActionError> {
        self.members.get_mut(index).ok_or(ActionError::UnknownEntity)
    }

    pub fn live_member_indices(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, member)| !member.is_dead())
            .map(|(index, _)| index)
            .collect()
    }

    /// Members that can still take hits: alive and above zero hit points.
    pub fn standing_member_indices(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, member)| !member.is_dead() && member.hp > 0)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_wiped_out(&self) -> bool {
        self.standing_member_indices().is_empty()
    }

    pub fn has_room(&self, tuning: &Tuning) -> bool {
        self.inventory.len() < tuning.inventory_capacity
    }

    pub fn add_item(&mut self, item: Item, tuning: &Tuning) -> Result<(), ActionError> {
        if !self.has_room(tuning) {
            return Err(ActionError::InsufficientResources(Resource::InventorySpace));
        }
        self.inventory.push(item);
        Ok(())
    }

    pub fn spend_gold(&mut self, amount: u32) -> Result<(), ActionError> {
        if self.gold < amount {
            return Err(ActionError::InsufficientResources(Resource::Gold));
        }
        self.gold -= amount;
        Ok(())
    }

    /// Splits `amount` by party size and gives each living member their share.
    /// Returns `(member, levels gained)` for everyone who levelled.
    pub fn award_experience(&mut self, amount: u32, content: &ContentBundle) -> Vec<(usize, u32)> {
        let Ok(size) = u32::try_from(self.members.len()) else {
            return Vec::new();
        };
        if size == 0 {
            return Vec::new();
        }
        let share = amount / size;
        let mut levelled = Vec::new();
        for (index, member) in self.members.iter_mut().enumerate() {
            if member.is_dead() {
                continue;
            }
            let gained = member.gain_experience(share, content.level_up(), content.tuning());
            if gained > 0 {
                levelled.push((index, gained));
            }
        }
        levelled
    }

    pub fn experience_share(&self, amount: u32) -> u32 {
        u32::try_from(self.members.len()).ok().filter(|size| *size > 0).map_or(0, |size| amount / size)
    }

    /// Per-tick member bookkeeping plus buff countdowns (real time only).
    pub fn update(
        &mut self,
        mode: SimMode,
        party_acted: bool,
        tuning: &Tuning,
    ) -> Vec<(usize, ConditionChange)> {
        if mode == SimMode::RealTime {
            self.buffs.tick();
        }
        let stat_bonus = self.buffs.stat_bonus;
        let mut changes = Vec::new();
        for (index, member) in self.members.iter_mut().enumerate() {
            member.stat_buff = stat_bonus;
            changes.extend(member.update(mode, party_acted, tuning).into_iter().map(|change| (index, change)));
        }
        changes
    }

    pub fn apply_utility_buffs(&mut self, effect: &UtilityEffect, tuning: &Tuning) {
        let ticks = tuning.seconds_to_ticks(effect.duration_seconds);
        if effect.stat_bonus != 0 {
            self.buffs.stat_bonus = self.buffs.stat_bonus.max(effect.stat_bonus);
            self.buffs.stat_ticks = self.buffs.stat_ticks.max(ticks);
            for member in &mut self.members {
                member.stat_buff = self.buffs.stat_bonus;
            }
        }
        if effect.vision_bonus != 0 {
            self.buffs.vision_bonus = self.buffs.vision_bonus.max(effect.vision_bonus);
            self.buffs.vision_ticks = self.buffs.vision_ticks.max(ticks);
        }
        if effect.water_walking {
            self.buffs.water_walking_ticks = self.buffs.water_walking_ticks.max(ticks);
        }
        if effect.water_breathing {
            self.buffs.water_breathing_ticks = self.buffs.water_breathing_ticks.max(ticks);
        }
    }

    /// Tile categories the party may currently walk on beyond ordinary ground.
    pub fn habitat(&self) -> BTreeSet<String> {
        let mut habitat = BTreeSet::new();
        if self.buffs.water_walking_ticks > 0 {
            habitat.insert("water".to_string());
        }
        habitat
    }

    /// Moves inventory item `slot` onto `member`, putting any displaced item back in the
    /// same inventory position.
    pub fn equip(&mut self, member: usize, slot: usize, tuning: &Tuning) -> Result<(), ActionError> {
        let item = self.inventory.get(slot).ok_or(ActionError::UnknownEntity)?;
        let character = self.members.get(member).ok_or(ActionError::UnknownEntity)?;
        let target = character.equip_slot_for(item)?;

        let item = self.inventory.remove(slot);
        let character = self.member_mut(member)?;
        if let Some(previous) = character.equip_into(target, item, tuning) {
            self.inventory.insert(slot, previous);
        }
        Ok(())
    }

    pub fn unequip(&mut self, member: usize, slot: EquipSlot, tuning: &Tuning) -> Result<(), ActionError> {
        if !self.has_room(tuning) {
            return Err(ActionError::InsufficientResources(Resource::InventorySpace));
        }
        let character = self.member_mut(member)?;
        let item = character
            .unequip(slot, tuning)
            .ok_or_else(|| ActionError::not_allowed(format!("{slot:?} is empty")))?;
        self.inventory.push(item);
        Ok(())
    }

    /// Restores every living member to full health; true when anyone needed it.
    pub fn heal_all(&mut self) -> bool {
        let mut healed = false;
        for member in &mut self.members {
            if member.is_dead() {
                continue;
            }
            healed |= member.heal(member.max_hp) > 0;
        }
        healed
    }

    pub fn is_hurt(&self) -> bool {
        self.members.iter().any(|member| !member.is_dead() && member.hp < member.max_hp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_content, sample_party};
    use crate::types::{Attribute, Condition};

    #[test]
    fn fifth_member_is_ignored() {
        let content = sample_content();
        let mut party = sample_party(&content);
        assert_eq!(party.members.len(), 4);
        let extra = Character::new("Extra", CharacterClass::Druid, &content).expect("druid");
        assert!(!party.add_member(extra));
        assert_eq!(party.members.len(), 4);
    }

    #[test]
    fn experience_is_split_by_party_size_and_skips_the_dead() {
        let content = sample_content();
        let mut party = sample_party(&content);
        party.members[3].add_condition(Condition::Dead);
        party.award_experience(100, &content);
        assert_eq!(party.members[0].experience, 25);
        assert_eq!(party.members[2].experience, 25);
        assert_eq!(party.members[3].experience, 0);
    }

    #[test]
    fn equip_swaps_the_displaced_item_into_the_same_inventory_slot() {
        let content = sample_content();
        let tuning = content.tuning();
        let mut party = sample_party(&content);
        party.inventory.push(content.instantiate("healing_potion").expect("potion"));
        party.inventory.push(content.instantiate("battle_axe").expect("axe"));
        let before = party.members[0].clone();

        party.equip(0, 1, tuning).expect("knight wields an axe");
        assert_eq!(party.members[0].weapon().map(|item| item.key.as_str()), Some("battle_axe"));
        assert_eq!(party.inventory[1].key, "iron_sword");

        party.equip(0, 1, tuning).expect("and back to the sword");
        assert_eq!(party.members[0], before);
        assert_eq!(party.inventory[1].key, "battle_axe");
    }

    #[test]
    fn failed_equip_leaves_inventory_untouched() {
        let content = sample_content();
        let tuning = content.tuning();
        let mut party = sample_party(&content);
        party.inventory.push(content.instantiate("healing_potion").expect("potion"));
        assert!(party.equip(0, 0, tuning).is_err());
        assert!(party.equip(0, 5, tuning).is_err());
        assert_eq!(party.inventory.len(), 1);
    }

    #[test]
    fn buffs_expire_only_in_real_time() {
        let content = sample_content();
        let tuning = content.tuning();
        let mut party = sample_party(&content);
        let effect = UtilityEffect { stat_bonus: 5, duration_seconds: 1, ..UtilityEffect::default() };
        party.apply_utility_buffs(&effect, tuning);
        let might = party.members[0].effective(Attribute::Might);
        for _ in 0..tuning.tick_rate {
            party.update(SimMode::TurnBased, true, tuning);
        }
        assert_eq!(party.buffs.stat_bonus, 5);
        for _ in 0..tuning.tick_rate {
            party.update(SimMode::RealTime, false, tuning);
        }
        assert_eq!(party.buffs.stat_bonus, 0);
        assert_eq!(party.members[0].effective(Attribute::Might), might - 5);
    }
}

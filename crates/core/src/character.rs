//! One adventurer: attributes, skills, magic, equipment, conditions and the per-tick
//! bookkeeping (poison, timed conditions, spell-point regeneration).
//! This module exists so every stat rule lives next to the data it derives from.
//! It does not own party-wide state such as gold, inventory or buffs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::content::ContentBundle;
use crate::content::classes::class_template;
use crate::content::schema::{LevelUpChoice, LevelUpEffect, LevelUpTable};
use crate::content::tuning::Tuning;
use crate::error::{ActionError, LoadError, Resource};
use crate::item::Item;
use crate::types::{
    Attribute, CharacterClass, Condition, DamageType, EquipSlot, MagicSchool, Mastery, SimMode,
    SkillType,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub level: u32,
    pub mastery: Mastery,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolProgress {
    pub level: u32,
    pub mastery: Mastery,
    pub known_spells: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionChange {
    Gained(Condition),
    Cleared(Condition),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u64,
    pub hp: i32,
    pub max_hp: i32,
    pub sp: i32,
    pub max_sp: i32,
    pub attributes: BTreeMap<Attribute, i32>,
    pub skills: BTreeMap<SkillType, SkillLevel>,
    pub schools: BTreeMap<MagicSchool, SchoolProgress>,
    pub equipment: BTreeMap<EquipSlot, Item>,
    pub conditions: BTreeSet<Condition>,
    /// Remaining ticks for Asleep, Fear and Paralyzed.
    pub condition_timers: BTreeMap<Condition, u32>,
    pub poison_ticks: u32,
    pub free_stat_points: u32,
    pub pending_level_ups: u32,
    /// Party-wide stat buff currently applied to every attribute.
    pub stat_buff: i32,
    poison_clock: u32,
    regen_clock: u32,
}

impl Character {
    pub fn new(name: &str, class: CharacterClass, content: &ContentBundle) -> Result<Self, LoadError> {
        let template = class_template(class);
        let attributes =
            Attribute::ALL.iter().map(|attribute| (*attribute, template.attribute(*attribute))).collect();
        let skills = template
            .skills
            .iter()
            .map(|(skill, level)| (*skill, SkillLevel { level: *level, mastery: Mastery::Novice }))
            .collect();

        let mut schools = BTreeMap::new();
        for (school, spells) in template.schools {
            let mut known_spells = BTreeSet::new();
            for spell in *spells {
                content.spell(spell).ok_or_else(|| LoadError::missing("spells", *spell))?;
                known_spells.insert((*spell).to_string());
            }
            schools.insert(*school, SchoolProgress { level: 1, mastery: Mastery::Novice, known_spells });
        }

        let mut equipment = BTreeMap::new();
        let weapon = content
            .instantiate(template.weapon)
            .ok_or_else(|| LoadError::missing("weapons", template.weapon))?;
        equipment.insert(EquipSlot::MainHand, weapon);
        if let Some(armor_key) = template.armor {
            let armor =
                content.instantiate(armor_key).ok_or_else(|| LoadError::missing("items", armor_key))?;
            let slot = armor.target_slot().unwrap_or(EquipSlot::Armor);
            equipment.insert(slot, armor);
        }
        if let Some(spell_key) = template.ready_spell {
            let def = content.spell(spell_key).ok_or_else(|| LoadError::missing("spells", spell_key))?;
            equipment.insert(EquipSlot::Spell, Item::from_spell(spell_key, def));
        }

        let mut character = Self {
            name: name.to_string(),
            class,
            level: 1,
            experience: 0,
            hp: 0,
            max_hp: 0,
            sp: 0,
            max_sp: 0,
            attributes,
            skills,
            schools,
            equipment,
            conditions: BTreeSet::new(),
            condition_timers: BTreeMap::new(),
            poison_ticks: 0,
            free_stat_points: 0,
            pending_level_ups: 0,
            stat_buff: 0,
            poison_clock: 0,
            regen_clock: 0,
        };
        let tuning = content.tuning();
        character.max_hp = character.compute_max_hp(tuning);
        character.hp = character.max_hp;
        character.max_sp = character.compute_max_sp(tuning);
        character.sp = character.max_sp;
        Ok(character)
    }

    pub fn base(&self, attribute: Attribute) -> i32 {
        self.attributes.get(&attribute).copied().unwrap_or(0)
    }

    fn equipment_contribution(&self, attribute: Attribute) -> i32 {
        let base = self.base(attribute);
        self.equipment.values().map(|item| item.attribute_contribution(attribute, base)).sum()
    }

    /// Base value plus buff plus every equipped item's scaling and flat bonus.
    pub fn effective(&self, attribute: Attribute) -> i32 {
        self.base(attribute) + self.stat_buff + self.equipment_contribution(attribute)
    }

    pub fn compute_max_hp(&self, tuning: &Tuning) -> i32 {
        let level = i32::try_from(self.level).unwrap_or(i32::MAX);
        (self.base(Attribute::Endurance) * tuning.endurance_hp_multiplier
            + level.saturating_mul(tuning.hp_level_multiplier))
        .max(1)
    }

    pub fn compute_max_sp(&self, tuning: &Tuning) -> i32 {
        let level = i32::try_from(self.level).unwrap_or(i32::MAX);
        (self.base(Attribute::Intellect)
            + self.base(Attribute::Personality)
            + self.equipment_contribution(Attribute::Personality)
            + level.saturating_mul(tuning.sp_level_multiplier))
        .max(0)
    }

    /// A raised maximum lifts the current value by the same amount; a lowered one clamps it.
    fn rebase_max_sp(&mut self, tuning: &Tuning) {
        let new_max = self.compute_max_sp(tuning);
        if new_max > self.max_sp {
            self.sp += new_max - self.max_sp;
        }
        self.max_sp = new_max;
        self.sp = self.sp.clamp(0, new_max);
    }

    fn rebase_max_hp(&mut self, tuning: &Tuning) {
        let new_max = self.compute_max_hp(tuning);
        if new_max > self.max_hp && !self.is_dead() {
            self.hp += new_max - self.max_hp;
        }
        self.max_hp = new_max;
        self.hp = self.hp.clamp(0, new_max);
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn add_condition(&mut self, condition: Condition) -> bool {
        self.conditions.insert(condition)
    }

    pub fn remove_condition(&mut self, condition: Condition) -> bool {
        self.condition_timers.remove(&condition);
        if condition == Condition::Poisoned {
            self.poison_ticks = 0;
            self.poison_clock = 0;
        }
        self.conditions.remove(&condition)
    }

    pub fn is_dead(&self) -> bool {
        self.has_condition(Condition::Dead) || self.has_condition(Condition::Eradicated)
    }

    pub fn can_act(&self) -> bool {
        !self.conditions.iter().any(|condition| condition.prevents_action())
    }

    pub fn armor_class(&self) -> i32 {
        let endurance = self.effective(Attribute::Endurance);
        EquipSlot::ARMOR_CLASS
            .iter()
            .filter_map(|slot| self.equipment.get(slot))
            .map(|item| {
                let divisor = item.attr("endurance_scaling_divisor");
                let scaled = if divisor > 0 { endurance.div_euclid(divisor) } else { 0 };
                item.attr("armor_class_base") + scaled
            })
            .sum()
    }

    pub fn resistance(&self, damage_type: DamageType) -> i32 {
        self.equipment.values().map(|item| item.resistance(damage_type)).sum::<i32>().clamp(0, 100)
    }

    /// Applies resistance, then armor (never below 1 unless resistance absorbed the hit).
    /// Returns the damage actually dealt.
    pub fn take_damage(&mut self, incoming: i32, damage_type: DamageType) -> i32 {
        if incoming <= 0 || self.is_dead() {
            return 0;
        }
        let resisted = incoming * (100 - self.resistance(damage_type)) / 100;
        if resisted <= 0 {
            return 0;
        }
        let dealt = (resisted - self.armor_class() / 2).max(1);
        self.hp = (self.hp - dealt).max(0);
        if self.hp == 0 {
            self.add_condition(Condition::Unconscious);
        }
        dealt
    }

    /// Restores up to `amount` hit points; a conscious-again character loses Unconscious.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.is_dead() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        if self.hp > 0 {
            self.remove_condition(Condition::Unconscious);
        }
        self.hp - before
    }

    /// Keeps the longer of the running and the new poison.
    pub fn apply_poison(&mut self, ticks: u32) {
        self.poison_ticks = self.poison_ticks.max(ticks);
        self.add_condition(Condition::Poisoned);
    }

    pub fn apply_status(&mut self, condition: Condition, ticks: u32) {
        if self.is_dead() {
            return;
        }
        if condition == Condition::Poisoned {
            self.apply_poison(ticks);
            return;
        }
        if condition.is_timed() {
            let timer = self.condition_timers.entry(condition).or_insert(0);
            *timer = (*timer).max(ticks);
        }
        self.add_condition(condition);
    }

    fn tick_poison(&mut self, tick_rate: u32, changes: &mut Vec<ConditionChange>) {
        if !self.has_condition(Condition::Poisoned) {
            return;
        }
        if self.poison_ticks == 0 {
            self.remove_condition(Condition::Poisoned);
            changes.push(ConditionChange::Cleared(Condition::Poisoned));
            return;
        }
        self.poison_ticks -= 1;
        self.poison_clock += 1;
        if self.poison_clock >= tick_rate {
            self.poison_clock = 0;
            if self.hp > 0 {
                self.hp -= 1;
                if self.hp == 0 && self.add_condition(Condition::Unconscious) {
                    changes.push(ConditionChange::Gained(Condition::Unconscious));
                }
            }
        }
        if self.poison_ticks == 0 {
            self.remove_condition(Condition::Poisoned);
            changes.push(ConditionChange::Cleared(Condition::Poisoned));
        }
    }

    fn tick_condition_timers(&mut self, changes: &mut Vec<ConditionChange>) {
        let mut expired = Vec::new();
        for (condition, remaining) in &mut self.condition_timers {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(*condition);
            }
        }
        for condition in expired {
            self.remove_condition(condition);
            changes.push(ConditionChange::Cleared(condition));
        }
    }

    /// Per-tick bookkeeping. Status timers run every real-time tick and on turn-based ticks in
    /// which the party acted; spell points only regenerate in real time.
    pub fn update(&mut self, mode: SimMode, party_acted: bool, tuning: &Tuning) -> Vec<ConditionChange> {
        let mut changes = Vec::new();
        if mode == SimMode::RealTime || party_acted {
            self.tick_poison(tuning.tick_rate, &mut changes);
            self.tick_condition_timers(&mut changes);
        }
        if mode == SimMode::TurnBased
            || self.is_dead()
            || self.has_condition(Condition::Unconscious)
        {
            return changes;
        }
        self.regen_clock += 1;
        if self.regen_clock >= tuning.sp_regen_interval_ticks {
            self.regen_clock = 0;
            if self.sp < self.max_sp {
                let gain = (1 + self.effective(Attribute::Personality) / 10).max(1);
                self.sp = (self.sp + gain).min(self.max_sp);
            }
        }
        changes
    }

    pub fn weapon(&self) -> Option<&Item> {
        self.equipment.get(&EquipSlot::MainHand).filter(|item| item.weapon().is_some())
    }

    pub fn skill_level(&self, skill: SkillType) -> Option<u32> {
        self.skills.get(&skill).map(|skill| skill.level)
    }

    pub fn knows_spell(&self, spell: &str) -> bool {
        self.schools.values().any(|school| school.known_spells.contains(spell))
    }

    pub fn ready_spell(&self) -> Option<&str> {
        self.equipment.get(&EquipSlot::Spell).and_then(Item::spell)
    }

    /// Slot `item` would occupy, after checking class restrictions.
    pub fn equip_slot_for(&self, item: &Item) -> Result<EquipSlot, ActionError> {
        let slot = item
            .target_slot()
            .ok_or_else(|| ActionError::not_allowed(format!("{} cannot be equipped", item.name)))?;
        if let Some(weapon) = item.weapon()
            && !self.class.can_wield(weapon.category)
        {
            return Err(ActionError::not_allowed(format!(
                "{} cannot wield {:?}",
                self.class.as_str(),
                weapon.category
            )));
        }
        Ok(slot)
    }

    /// Places `item` in `slot` and returns the displaced item, if any.
    pub fn equip_into(&mut self, slot: EquipSlot, item: Item, tuning: &Tuning) -> Option<Item> {
        let previous = self.equipment.insert(slot, item);
        self.rebase_max_sp(tuning);
        previous
    }

    pub fn unequip(&mut self, slot: EquipSlot, tuning: &Tuning) -> Option<Item> {
        let removed = self.equipment.remove(&slot);
        if removed.is_some() {
            self.rebase_max_sp(tuning);
        }
        removed
    }

    /// Adds experience and returns how many levels were gained.
    pub fn gain_experience(&mut self, amount: u32, table: &LevelUpTable, tuning: &Tuning) -> u32 {
        if self.is_dead() {
            return 0;
        }
        self.experience += u64::from(amount);
        let mut gained = 0;
        while let Some(threshold) = table.threshold_for_next(self.level)
            && self.experience >= threshold
        {
            self.level += 1;
            self.free_stat_points += tuning.stat_points_per_level;
            self.pending_level_ups += 1;
            gained += 1;
        }
        if gained > 0 {
            self.rebase_max_hp(tuning);
            self.rebase_max_sp(tuning);
        }
        gained
    }

    pub fn allocate_stat(&mut self, attribute: Attribute, tuning: &Tuning) -> Result<(), ActionError> {
        if self.free_stat_points == 0 {
            return Err(ActionError::InsufficientResources(Resource::StatPoints));
        }
        self.free_stat_points -= 1;
        *self.attributes.entry(attribute).or_insert(0) += 1;
        self.after_attribute_change(attribute, tuning);
        Ok(())
    }

    fn after_attribute_change(&mut self, attribute: Attribute, tuning: &Tuning) {
        match attribute {
            Attribute::Endurance => self.rebase_max_hp(tuning),
            Attribute::Intellect | Attribute::Personality => self.rebase_max_sp(tuning),
            _ => {}
        }
    }

    pub fn apply_level_choice(
        &mut self,
        choice: &LevelUpChoice,
        content: &ContentBundle,
    ) -> Result<(), ActionError> {
        if self.pending_level_ups == 0 {
            return Err(ActionError::not_allowed("no level-up choice pending"));
        }
        match &choice.effect {
            LevelUpEffect::Stat { attribute, amount } => {
                *self.attributes.entry(*attribute).or_insert(0) += amount;
                self.after_attribute_change(*attribute, content.tuning());
            }
            LevelUpEffect::Skill { skill, levels } => {
                let entry = self
                    .skills
                    .entry(*skill)
                    .or_insert(SkillLevel { level: 0, mastery: Mastery::Novice });
                entry.level += levels;
            }
            LevelUpEffect::School { school, levels } => {
                self.schools.entry(*school).or_default().level += levels;
            }
            LevelUpEffect::Spell { spell } => {
                let def = content.spell(spell).ok_or_else(|| ActionError::missing("spells", spell))?;
                self.learn_spell(spell, def.school)?;
            }
        }
        self.pending_level_ups -= 1;
        Ok(())
    }

    pub fn learn_spell(&mut self, spell: &str, school: MagicSchool) -> Result<(), ActionError> {
        if self.knows_spell(spell) {
            return Err(ActionError::not_allowed(format!("{spell} is already known")));
        }
        let progress = self.schools.get_mut(&school).ok_or_else(|| {
            ActionError::not_allowed(format!("{} has no {school:?} magic", self.class.as_str()))
        })?;
        progress.known_spells.insert(spell.to_string());
        Ok(())
    }
}

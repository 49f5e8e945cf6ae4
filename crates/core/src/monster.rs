//! Monster instances: combat stats copied from content, AI bookkeeping, and damage intake.
//! The decision logic that drives these fields lives in the world's AI phase.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::content::schema::{MonsterDef, StatusEffectSpec};
use crate::rng::Dice;
use crate::types::{AiState, DamageType, RewardBundle, TILE_SIZE, TilePos, Vec2};

pub const DEFAULT_DETECTION_RADIUS: f64 = 4.0 * TILE_SIZE;
pub const DEFAULT_TETHER_RADIUS: f64 = 4.0 * TILE_SIZE;
/// Attacks in one engagement before a monster considers running away.
pub const FLEE_AFTER_ATTACKS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangedAttack {
    Spell(String),
    Weapon(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTag {
    pub quest: String,
    pub rewards: RewardBundle,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterPath {
    pub tiles: Vec<TilePos>,
    pub index: usize,
    /// Goal tile the path was planned for.
    pub target: Option<TilePos>,
    /// Set when a step was refused; the next plan waits for the replan cooldown.
    #[serde(default)]
    pub blocked: bool,
}

impl MonsterPath {
    pub fn next(&self) -> Option<TilePos> {
        self.tiles.get(self.index).copied()
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.tiles.len()
    }

    pub fn clear(&mut self) {
        *self = MonsterPath::default();
    }

    /// Drops the route after a refused step.
    pub fn abandon(&mut self) {
        *self = MonsterPath { blocked: true, ..MonsterPath::default() };
    }
}

/// Navigation goal together with the state that chose it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub tile: TilePos,
    pub state: AiState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    Dodged,
    Hit { dealt: i32, killed: bool, alerted: Option<(AiState, AiState)> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub key: String,
    pub name: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub armor_class: i32,
    pub perfect_dodge: u32,
    pub experience: u32,
    pub gold_min: u32,
    pub gold_max: u32,
    pub damage_min: i32,
    pub damage_max: i32,
    pub damage_type: DamageType,
    pub state: AiState,
    pub alert_radius: f64,
    pub attack_radius: f64,
    pub speed: f64,
    pub position: Vec2,
    pub facing: f64,
    /// Ticks since the last state change.
    pub state_timer: u32,
    pub attack_count: u32,
    pub stuck_counter: u32,
    pub direction_hint: Option<f64>,
    pub path: MonsterPath,
    pub path_cooldown: u32,
    pub move_target: Option<MoveTarget>,
    pub spawn: Vec2,
    pub tether_radius: f64,
    pub attack_cooldown: u32,
    pub engaging: bool,
    pub was_attacked: bool,
    pub flying: bool,
    pub habitat: BTreeSet<String>,
    pub ranged: Option<RangedAttack>,
    pub encounter: Option<EncounterTag>,
    pub resistances: BTreeMap<DamageType, i32>,
    pub on_hit: Option<StatusEffectSpec>,
    /// Set once rewards for this death have been handed out.
    pub death_processed: bool,
}

impl Monster {
    pub fn from_def(key: &str, def: &MonsterDef, position: Vec2) -> Self {
        let ranged = def
            .projectile_spell
            .clone()
            .map(RangedAttack::Spell)
            .or_else(|| def.projectile_weapon.clone().map(RangedAttack::Weapon));
        Self {
            key: key.to_string(),
            name: def.name.clone(),
            level: def.level,
            hp: def.hit_points,
            max_hp: def.hit_points,
            armor_class: def.armor_class,
            perfect_dodge: def.perfect_dodge,
            experience: def.experience,
            gold_min: def.gold_min,
            gold_max: def.gold_max,
            damage_min: def.damage_min,
            damage_max: def.damage_max,
            damage_type: def.damage_type,
            state: AiState::Patrolling,
            alert_radius: def.alert_radius,
            attack_radius: def.attack_radius,
            speed: def.speed,
            position,
            facing: 0.0,
            state_timer: 0,
            attack_count: 0,
            stuck_counter: 0,
            direction_hint: None,
            path: MonsterPath::default(),
            path_cooldown: 0,
            move_target: None,
            spawn: position,
            tether_radius: if def.tether_radius > 0.0 { def.tether_radius } else { DEFAULT_TETHER_RADIUS },
            attack_cooldown: def.attack_cooldown,
            engaging: false,
            was_attacked: false,
            flying: def.flying,
            habitat: def.habitat.clone(),
            ranged,
            encounter: None,
            resistances: def.resistances.clone(),
            on_hit: def.on_hit,
            death_processed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn tile(&self) -> TilePos {
        TilePos::containing(self.position)
    }

    pub fn spawn_tile(&self) -> TilePos {
        TilePos::containing(self.spawn)
    }

    /// Configured alert radius, or four tiles when unset.
    pub fn detection_radius(&self) -> f64 {
        if self.alert_radius > 0.0 { self.alert_radius } else { DEFAULT_DETECTION_RADIUS }
    }

    pub fn outside_tether(&self) -> bool {
        self.position.distance(self.spawn) > self.tether_radius
    }

    /// Changes state, restarts the state timer and keeps `engaging` in step with the
    /// engaged states. Returns the transition when the state actually changed.
    pub fn set_state(&mut self, state: AiState) -> Option<(AiState, AiState)> {
        if self.state == state {
            return None;
        }
        let from = self.state;
        self.state = state;
        self.state_timer = 0;
        self.engaging = state.is_engaged();
        Some((from, state))
    }

    /// Percent of incoming damage shrugged off; negative values are vulnerabilities.
    pub fn resistance(&self, damage_type: DamageType) -> i32 {
        self.resistances.get(&damage_type).copied().unwrap_or(0).min(100)
    }

    /// Dodge roll, then resistance, then hit points. A hit on a monster that is not
    /// fleeing marks it as attacked and alerts it unless it is already engaged.
    pub fn take_damage(&mut self, amount: i32, damage_type: DamageType, dice: &mut Dice) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Hit { dealt: 0, killed: false, alerted: None };
        }
        if dice.percent() < f64::from(self.perfect_dodge) {
            return DamageOutcome::Dodged;
        }
        let dealt = (amount.max(0) * (100 - self.resistance(damage_type)) / 100).max(0);
        self.hp = (self.hp - dealt).max(0);
        let killed = self.hp == 0;
        let mut alerted = None;
        if !killed && self.state != AiState::Fleeing {
            self.was_attacked = true;
            if !self.engaging {
                alerted = self.set_state(AiState::Alert);
                self.engaging = true;
            }
        }
        if killed {
            self.path.clear();
            self.move_target = None;
        }
        DamageOutcome::Hit { dealt, killed, alerted }
    }

    pub fn roll_damage(&self, dice: &mut Dice) -> i32 {
        dice.range_inclusive(self.damage_min, self.damage_max)
    }

    pub fn roll_gold(&self, dice: &mut Dice) -> u32 {
        let low = i32::try_from(self.gold_min).unwrap_or(i32::MAX);
        let high = i32::try_from(self.gold_max).unwrap_or(i32::MAX);
        u32::try_from(dice.range_inclusive(low, high)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;

    fn goblin() -> Monster {
        let content = sample_content();
        let def = content.monster("goblin").expect("goblin");
        Monster::from_def("goblin", def, TilePos::new(2, 2).center())
    }

    #[test]
    fn spawns_patrolling_with_default_radii() {
        let goblin = goblin();
        assert_eq!(goblin.state, AiState::Patrolling);
        assert!(!goblin.engaging);
        assert!(goblin.tether_radius > 0.0);
        assert!(goblin.detection_radius() > 0.0);
        assert_eq!(goblin.spawn_tile(), TilePos::new(2, 2));
    }

    #[test]
    fn damage_alerts_and_marks_attacked() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 0;
        let mut dice = Dice::new(7);
        let outcome = goblin.take_damage(1, DamageType::Physical, &mut dice);
        assert!(matches!(
            outcome,
            DamageOutcome::Hit { dealt: 1, killed: false, alerted: Some((AiState::Patrolling, AiState::Alert)) }
        ));
        assert!(goblin.was_attacked && goblin.engaging);
    }

    #[test]
    fn fleeing_monsters_are_not_re_alerted() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 0;
        goblin.set_state(AiState::Fleeing);
        let mut dice = Dice::new(7);
        goblin.take_damage(1, DamageType::Physical, &mut dice);
        assert_eq!(goblin.state, AiState::Fleeing);
        assert!(!goblin.engaging);
    }

    #[test]
    fn full_resistance_absorbs_the_hit() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 0;
        goblin.resistances.insert(DamageType::Poison, 100);
        let hp = goblin.hp;
        let mut dice = Dice::new(3);
        goblin.take_damage(50, DamageType::Poison, &mut dice);
        assert_eq!(goblin.hp, hp);
    }

    #[test]
    fn negative_resistance_amplifies_the_hit() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 0;
        goblin.max_hp = 100;
        goblin.hp = 100;
        goblin.resistances.insert(DamageType::Fire, -50);
        let mut dice = Dice::new(3);
        let outcome = goblin.take_damage(10, DamageType::Fire, &mut dice);
        assert_eq!(
            outcome,
            DamageOutcome::Hit { dealt: 15, killed: false, alerted: Some((AiState::Patrolling, AiState::Alert)) }
        );
        assert_eq!(goblin.hp, 85);
    }

    #[test]
    fn lethal_damage_clamps_to_zero() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 0;
        let mut dice = Dice::new(3);
        let outcome = goblin.take_damage(10_000, DamageType::Fire, &mut dice);
        assert!(matches!(outcome, DamageOutcome::Hit { killed: true, .. }));
        assert_eq!(goblin.hp, 0);
        assert!(!goblin.is_alive());
    }

    #[test]
    fn perfect_dodge_always_misses() {
        let mut goblin = goblin();
        goblin.perfect_dodge = 100;
        let mut dice = Dice::new(3);
        for _ in 0..20 {
            assert_eq!(goblin.take_damage(5, DamageType::Physical, &mut dice), DamageOutcome::Dodged);
        }
        assert_eq!(goblin.hp, goblin.max_hp);
    }
}

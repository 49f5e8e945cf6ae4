//! Party offence and the hit phase.
//! This module exists so every source of damage funnels through one resolution step.
//! It does not own monster decision making or projectile flight.

use std::f64::consts::{PI, TAU};
use std::mem;

use super::*;

/// Melee reach past the weapon's nominal range, about half a monster box.
const MELEE_REACH_SLACK: f64 = 24.0;
const ARROW_SIZE_TILES: f64 = 0.5;

/// Absolute difference between two headings, folded into [0, PI].
fn heading_gap(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

fn scaled(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl World {
    /// Swings the member's weapon along the party's facing; bows loose an arrow instead.
    /// A swing that finds nothing in its arc still succeeds.
    pub(super) fn melee_attack(
        &mut self,
        member: usize,
        mode: SimMode,
        events: &mut Vec<WorldEvent>,
    ) -> Result<(), ActionError> {
        let character = self.state.party.member(member)?;
        if !character.can_act() {
            return Err(ActionError::not_allowed(format!("{} cannot act", character.name)));
        }
        let (weapon_key, weapon) = character
            .weapon()
            .and_then(|item| item.weapon().map(|stats| (item.key.clone(), stats.clone())))
            .ok_or_else(|| ActionError::not_allowed(format!("{} has no weapon", character.name)))?;
        let skill = character.skill_level(weapon.category.skill()).ok_or_else(|| {
            ActionError::not_allowed(format!("{} lacks the {:?} skill", character.name, weapon.category))
        })?;
        let damage = weapon.damage + character.effective(weapon.primary_stat) / 3 + scaled(skill);
        let origin = self.state.party.position;
        let facing = self.state.party.facing;

        if weapon.category.is_ranged() {
            let in_flight = self
                .state
                .projectiles
                .values()
                .filter(|projectile| {
                    projectile.active
                        && projectile.owner == ProjectileOwner::Party { member }
                        && projectile.source == ProjectileSource::Weapon(weapon_key.clone())
                })
                .count();
            if in_flight >= usize::try_from(weapon.max_projectiles).unwrap_or(usize::MAX) {
                return Err(ActionError::not_allowed("too many arrows in flight"));
            }
            let ballistics = Ballistics {
                speed_tiles: weapon.projectile_speed_tiles,
                range_tiles: weapon.range_tiles,
                size_tiles: ARROW_SIZE_TILES,
            };
            let arrow = Projectile::launch(
                ProjectileOwner::Party { member },
                ProjectileSource::Weapon(weapon_key),
                origin,
                facing,
                ballistics,
                damage,
                weapon.damage_type,
                self.content.tuning().tick_rate,
            );
            self.spawn_projectile(arrow, events);
            return Ok(());
        }

        let reach = weapon.range_tiles * TILE_SIZE + MELEE_REACH_SLACK;
        let half_arc = weapon.melee.arc_degrees.to_radians() / 2.0;
        let mut target: Option<(MonsterId, f64)> = None;
        for (id, monster) in &self.state.monsters {
            if !monster.is_alive() {
                continue;
            }
            let offset = monster.position - origin;
            let distance = offset.length();
            if distance > reach {
                continue;
            }
            if distance > f64::EPSILON && heading_gap(offset.angle(), facing) > half_arc {
                continue;
            }
            if target.is_none_or(|(_, best)| distance < best) {
                target = Some((id, distance));
            }
        }
        if let Some((id, _)) = target {
            let delay_ticks = if mode == SimMode::RealTime { weapon.melee.hit_delay_ticks } else { 0 };
            self.pending_hits.push(PendingHit {
                target: HitTarget::Monster(id),
                damage,
                damage_type: weapon.damage_type,
                status: None,
                delay_ticks,
            });
        }
        Ok(())
    }

    /// Casts `spell`, or the member's readied spell, paying its spell points up front.
    pub(super) fn cast_spell(
        &mut self,
        member: usize,
        spell: Option<&str>,
        target: Option<usize>,
        events: &mut Vec<WorldEvent>,
    ) -> Result<(), ActionError> {
        let content = Arc::clone(&self.content);
        let caster = self.state.party.member(member)?;
        let key = match spell {
            Some(key) => key.to_string(),
            None => caster
                .ready_spell()
                .map(str::to_string)
                .ok_or_else(|| ActionError::not_allowed(format!("{} has no spell ready", caster.name)))?,
        };
        let def = content.spell(&key).ok_or_else(|| ActionError::missing("spells", &key))?;
        if !caster.knows_spell(&key) && caster.ready_spell() != Some(key.as_str()) {
            return Err(ActionError::not_allowed(format!("{} does not know {key}", caster.name)));
        }
        if !caster.can_act() {
            return Err(ActionError::not_allowed(format!("{} cannot act", caster.name)));
        }
        if caster.sp < def.spell_points_cost {
            return Err(ActionError::InsufficientResources(Resource::SpellPoints));
        }
        let intellect = caster.effective(Attribute::Intellect);
        let personality = caster.effective(Attribute::Personality);

        if let Some(effect) = def.utility {
            let target = target.unwrap_or(member);
            let recipient = self.state.party.member(target)?;
            if (effect.heal_amount > 0 || effect.awaken) && recipient.is_dead() {
                return Err(ActionError::not_allowed(format!("{} is beyond healing", recipient.name)));
            }
            self.state.party.members[member].sp -= def.spell_points_cost;
            let recipient = &mut self.state.party.members[target];
            if effect.heal_amount > 0 {
                let had_unconscious = recipient.has_condition(Condition::Unconscious);
                recipient.heal(effect.heal_amount + personality / 2);
                if had_unconscious && !recipient.has_condition(Condition::Unconscious) {
                    events.push(WorldEvent::ConditionCleared { member: target, condition: Condition::Unconscious });
                }
            }
            if effect.awaken {
                for condition in [Condition::Asleep, Condition::Paralyzed] {
                    if recipient.remove_condition(condition) {
                        events.push(WorldEvent::ConditionCleared { member: target, condition });
                    }
                }
            }
            self.state.party.apply_utility_buffs(&effect, content.tuning());
        } else if let Some(spec) = def.projectile {
            self.state.party.members[member].sp -= def.spell_points_cost;
            let ballistics = Ballistics {
                speed_tiles: spec.speed_tiles,
                range_tiles: spec.range_tiles,
                size_tiles: spec.collision_size_tiles,
            };
            let bolt = Projectile::launch(
                ProjectileOwner::Party { member },
                ProjectileSource::Spell(key.clone()),
                self.state.party.position,
                self.state.party.facing,
                ballistics,
                def.spell_points_cost * 3 + intellect / 2,
                def.damage_type,
                content.tuning().tick_rate,
            )
            .with_status(def.status);
            self.spawn_projectile(bolt, events);
        } else {
            return Err(ActionError::not_allowed(format!("{key} has no castable effect")));
        }

        events.push(WorldEvent::SpellCast { member, spell: key });
        Ok(())
    }

    /// Lands every queued hit whose delay has run out. Turn-based ticks land everything.
    pub(super) fn resolve_hits(&mut self, mode: SimMode, events: &mut Vec<WorldEvent>) {
        let mut due = Vec::new();
        for mut hit in mem::take(&mut self.pending_hits) {
            if mode == SimMode::TurnBased {
                hit.delay_ticks = 0;
            }
            if hit.delay_ticks == 0 {
                due.push(hit);
            } else {
                hit.delay_ticks -= 1;
                self.pending_hits.push(hit);
            }
        }
        for hit in due {
            match hit.target {
                HitTarget::Monster(id) => self.hit_monster(id, &hit, events),
                HitTarget::Member(member) => self.hit_member(member, &hit, events),
            }
        }
    }

    fn hit_monster(&mut self, id: MonsterId, hit: &PendingHit, events: &mut Vec<WorldEvent>) {
        let Some(monster) = self.state.monsters.get_mut(id) else {
            return;
        };
        if !monster.is_alive() {
            return;
        }
        match monster.take_damage(hit.damage, hit.damage_type, &mut self.dice) {
            DamageOutcome::Dodged => events.push(WorldEvent::MonsterDodged { monster: id }),
            DamageOutcome::Hit { dealt, killed, alerted } => {
                events.push(WorldEvent::MonsterDamaged {
                    monster: id,
                    damage: dealt,
                    damage_type: hit.damage_type,
                });
                if let Some((from, to)) = alerted {
                    debug!(monster = ?id, ?from, ?to, "monster provoked");
                    events.push(WorldEvent::MonsterStateChanged { monster: id, from, to });
                }
                if killed {
                    events.push(WorldEvent::MonsterKilled { monster: id, key: monster.key.clone() });
                }
            }
        }
    }

    fn hit_member(&mut self, member: usize, hit: &PendingHit, events: &mut Vec<WorldEvent>) {
        let ticks = hit.status.map(|status| self.content.tuning().seconds_to_ticks(status.duration_seconds));
        let Some(character) = self.state.party.members.get_mut(member) else {
            return;
        };
        if character.is_dead() {
            return;
        }
        let was_unconscious = character.has_condition(Condition::Unconscious);
        let dealt = character.take_damage(hit.damage, hit.damage_type);
        events.push(WorldEvent::CharacterDamaged { member, damage: dealt, damage_type: hit.damage_type });
        if !was_unconscious && character.has_condition(Condition::Unconscious) {
            events.push(WorldEvent::ConditionGained { member, condition: Condition::Unconscious });
        }
        if let (Some(status), Some(ticks)) = (hit.status, ticks) {
            let had = character.has_condition(status.condition);
            character.apply_status(status.condition, ticks);
            if !had && character.has_condition(status.condition) {
                events.push(WorldEvent::ConditionGained { member, condition: status.condition });
            }
        }
    }
}

//! Monster decision making: the engagement state machine, tethering, and attack timing.
//! This module exists so each monster's tick reads as one function over its own fields.
//! It does not own damage application; attacks leave as intents for the world to resolve.

use crate::monster::{FLEE_AFTER_ATTACKS, MoveTarget, RangedAttack};

use super::*;

mod goals;
mod movement;

use goals::{flee_goal, patrol_goal, pursuit_goals};
use movement::{navigate, unstuck};

/// Read-only view of the world a monster decides against.
pub(super) struct AiContext<'a, 'g> {
    pub id: MonsterId,
    pub oracle: &'a CollisionOracle<'g>,
    pub party_position: Vec2,
    /// False once no member can be hit; monsters then lose interest.
    pub party_targetable: bool,
    pub tuning: &'a Tuning,
}

impl AiContext<'_, '_> {
    /// Whether `monster`'s box fits at `point`, honouring its habitat and flight.
    pub fn can_stand(&self, monster: &Monster, point: Vec2) -> bool {
        self.oracle.can_move_to_with_habitat(
            EntityRef::Monster(self.id),
            point,
            Mobility { habitat: Some(&monster.habitat), flying: monster.flying },
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum AttackIntent {
    Melee,
    Ranged { heading: f64 },
}

#[derive(Debug, Default)]
pub(super) struct AiOutcome {
    pub transitions: Vec<(AiState, AiState)>,
    pub attack: Option<AttackIntent>,
    pub unstuck: bool,
}

fn transition(monster: &mut Monster, to: AiState, outcome: &mut AiOutcome) {
    if let Some(change) = monster.set_state(to) {
        outcome.transitions.push(change);
    }
}

fn forget_route(monster: &mut Monster) {
    monster.path.clear();
    monster.move_target = None;
}

/// Detection radius after the tether and line-of-sight adjustments.
fn effective_detection(monster: &Monster, ctx: &AiContext<'_, '_>) -> f64 {
    let base = monster.detection_radius();
    if monster.outside_tether() {
        base * 2.0
    } else if !ctx.oracle.line_of_sight(monster.position, ctx.party_position) {
        base / 2.0
    } else {
        base
    }
}

/// Search window padding in tiles.
fn search_padding(monster: &Monster) -> i32 {
    ((monster.detection_radius() / TILE_SIZE).ceil() as i32).max(4)
}

/// Advances one living monster by one tick.
pub(super) fn update_monster(
    monster: &mut Monster,
    ctx: &AiContext<'_, '_>,
    dice: &mut Dice,
) -> AiOutcome {
    let mut outcome = AiOutcome::default();
    monster.state_timer = monster.state_timer.saturating_add(1);
    monster.path_cooldown = monster.path_cooldown.saturating_sub(1);

    if !ctx.can_stand(monster, monster.position) {
        unstuck(monster, ctx);
        outcome.unstuck = true;
    }

    let distance = monster.position.distance(ctx.party_position);
    let base = monster.detection_radius();
    if monster.state.is_engaged()
        && !monster.was_attacked
        && (distance > 2.0 * base || !ctx.party_targetable)
    {
        transition(monster, AiState::Idle, &mut outcome);
        monster.attack_count = 0;
        forget_route(monster);
    }

    let detected = ctx.party_targetable && distance <= effective_detection(monster, ctx);
    match monster.state {
        AiState::Idle => {
            if detected {
                transition(monster, AiState::Alert, &mut outcome);
                resolve_alert(monster, ctx, &mut outcome);
            } else if monster.outside_tether()
                || monster.state_timer >= ctx.tuning.ai.idle_patrol_delay_ticks
            {
                transition(monster, AiState::Patrolling, &mut outcome);
            }
        }
        AiState::Patrolling => {
            if detected {
                transition(monster, AiState::Alert, &mut outcome);
                resolve_alert(monster, ctx, &mut outcome);
            } else {
                patrol(monster, ctx, dice, &mut outcome);
            }
        }
        AiState::Alert => resolve_alert(monster, ctx, &mut outcome),
        AiState::Pursuing => {
            if in_striking_position(monster, ctx) {
                transition(monster, AiState::Attacking, &mut outcome);
                face_party(monster, ctx);
            } else {
                pursue(monster, ctx, &mut outcome);
            }
        }
        AiState::Attacking => attack(monster, ctx, dice, &mut outcome),
        AiState::Fleeing => {
            if monster.state_timer >= ctx.tuning.ai.flee_duration_ticks {
                transition(monster, AiState::Idle, &mut outcome);
                monster.was_attacked = false;
                forget_route(monster);
            } else {
                flee(monster, ctx, &mut outcome);
            }
        }
    }

    enforce_tether(monster, &mut outcome);
    outcome
}

/// Alert never lasts a full tick: the monster either closes in or starts attacking.
fn resolve_alert(monster: &mut Monster, ctx: &AiContext<'_, '_>, outcome: &mut AiOutcome) {
    if in_striking_position(monster, ctx) {
        transition(monster, AiState::Attacking, outcome);
        face_party(monster, ctx);
    } else {
        transition(monster, AiState::Pursuing, outcome);
        pursue(monster, ctx, outcome);
    }
}

/// In attack range, and for ranged attackers also in clear sight of the party.
fn in_striking_position(monster: &Monster, ctx: &AiContext<'_, '_>) -> bool {
    monster.position.distance(ctx.party_position) <= monster.attack_radius
        && (monster.ranged.is_none() || ctx.oracle.line_of_sight(monster.position, ctx.party_position))
}

fn face_party(monster: &mut Monster, ctx: &AiContext<'_, '_>) {
    let toward = ctx.party_position - monster.position;
    if toward.length() > f64::EPSILON {
        monster.facing = toward.angle();
    }
}

fn pursue(monster: &mut Monster, ctx: &AiContext<'_, '_>, outcome: &mut AiOutcome) {
    let primary = TilePos::containing(ctx.party_position);
    let goals = pursuit_goals(monster, ctx);
    let speed = ctx.tuning.per_tick_speed(monster.speed);
    let padding = search_padding(monster) * 2;
    monster.move_target = Some(MoveTarget { tile: primary, state: AiState::Pursuing });
    navigate(monster, ctx, &goals, primary, speed, padding, outcome);
}

fn patrol(monster: &mut Monster, ctx: &AiContext<'_, '_>, dice: &mut Dice, outcome: &mut AiOutcome) {
    let arrived = monster
        .move_target
        .is_some_and(|target| target.state == AiState::Patrolling && monster.tile() == target.tile && monster.path.is_done());
    if arrived {
        forget_route(monster);
        transition(monster, AiState::Idle, outcome);
        return;
    }
    let needs_goal = monster.move_target.is_none_or(|target| target.state != AiState::Patrolling);
    if needs_goal {
        let tile = if monster.outside_tether() { monster.spawn_tile() } else { patrol_goal(monster, ctx, dice) };
        monster.move_target = Some(MoveTarget { tile, state: AiState::Patrolling });
        monster.path.clear();
    }
    let Some(target) = monster.move_target else {
        return;
    };
    let speed = ctx.tuning.per_tick_speed(monster.speed) * ctx.tuning.ai.normal_speed_multiplier;
    let goals = BTreeSet::from([target.tile]);
    navigate(monster, ctx, &goals, target.tile, speed, search_padding(monster), outcome);
}

fn flee(monster: &mut Monster, ctx: &AiContext<'_, '_>, outcome: &mut AiOutcome) {
    if monster.move_target.is_none_or(|target| target.state != AiState::Fleeing) {
        let tile = flee_goal(monster, ctx);
        monster.move_target = Some(MoveTarget { tile, state: AiState::Fleeing });
        monster.path.clear();
    }
    let Some(target) = monster.move_target else {
        return;
    };
    if monster.tile() == target.tile && monster.path.is_done() {
        return;
    }
    let speed = ctx.tuning.per_tick_speed(monster.speed) * ctx.tuning.ai.flee_speed_multiplier;
    let goals = BTreeSet::from([target.tile]);
    navigate(monster, ctx, &goals, target.tile, speed, search_padding(monster), outcome);
}

/// Waits out the cooldown, strikes, then either re-engages or, after enough blows, may run.
fn attack(monster: &mut Monster, ctx: &AiContext<'_, '_>, dice: &mut Dice, outcome: &mut AiOutcome) {
    face_party(monster, ctx);
    if monster.state_timer < monster.attack_cooldown.max(1) {
        return;
    }
    if ctx.party_targetable && in_striking_position(monster, ctx) {
        outcome.attack = Some(match monster.ranged {
            Some(_) => AttackIntent::Ranged { heading: monster.facing },
            None => AttackIntent::Melee,
        });
        monster.attack_count += 1;
    }
    if monster.attack_count >= FLEE_AFTER_ATTACKS && dice.coin() {
        transition(monster, AiState::Fleeing, outcome);
        monster.attack_count = 0;
        forget_route(monster);
    } else {
        transition(monster, AiState::Alert, outcome);
        resolve_alert(monster, ctx, outcome);
    }
}

/// Idle or patrolling monsters outside their tether always head for the spawn tile.
fn enforce_tether(monster: &mut Monster, outcome: &mut AiOutcome) {
    if !matches!(monster.state, AiState::Idle | AiState::Patrolling) || !monster.outside_tether() {
        return;
    }
    transition(monster, AiState::Patrolling, outcome);
    let home = monster.spawn_tile();
    if monster.move_target.map(|target| target.tile) != Some(home) {
        monster.move_target = Some(MoveTarget { tile: home, state: AiState::Patrolling });
        monster.path.clear();
    }
}

impl World {
    pub(super) fn run_monster_ai(&mut self, events: &mut Vec<WorldEvent>) {
        let ids: Vec<MonsterId> = self.state.monsters.keys().collect();
        let mut oracle = CollisionOracle::new(&self.state.grid, self.state.solid_boxes());
        let party_position = self.state.party.position;
        let party_targetable = !self.state.party.is_wiped_out();
        let tuning = self.content.tuning();
        let mut attacks = Vec::new();

        for id in ids {
            let Some(monster) = self.state.monsters.get_mut(id) else {
                continue;
            };
            if !monster.is_alive() {
                continue;
            }
            let ctx = AiContext { id, oracle: &oracle, party_position, party_targetable, tuning };
            let outcome = update_monster(monster, &ctx, &mut self.dice);
            oracle.move_box(EntityRef::Monster(id), monster.position);

            for (from, to) in outcome.transitions {
                debug!(monster = ?id, key = %monster.key, ?from, ?to, "ai transition");
                events.push(WorldEvent::MonsterStateChanged { monster: id, from, to });
            }
            if outcome.unstuck {
                events.push(WorldEvent::MonsterUnstuck { monster: id });
            }
            if let Some(intent) = outcome.attack {
                attacks.push((id, intent));
            }
        }

        for (id, intent) in attacks {
            self.execute_monster_attack(id, intent, events);
        }
    }

    fn execute_monster_attack(&mut self, id: MonsterId, intent: AttackIntent, events: &mut Vec<WorldEvent>) {
        let Some(monster) = self.state.monsters.get(id) else {
            return;
        };
        match intent {
            AttackIntent::Melee => {
                let standing = self.state.party.standing_member_indices();
                let Some(member) = self.dice.pick_index(standing.len()).map(|index| standing[index]) else {
                    return;
                };
                let damage = monster.roll_damage(&mut self.dice);
                self.pending_hits.push(PendingHit {
                    target: HitTarget::Member(member),
                    damage,
                    damage_type: monster.damage_type,
                    status: monster.on_hit,
                    delay_ticks: 0,
                });
                events.push(WorldEvent::MonsterAttacked { monster: id, member });
            }
            AttackIntent::Ranged { heading } => {
                let Some(projectile) =
                    monster_projectile(&self.content, &mut self.dice, id, monster, heading)
                else {
                    return;
                };
                self.spawn_projectile(projectile, events);
            }
        }
    }
}

/// Missile for a ranged monster's attack; `None` when its spell or weapon is missing.
fn monster_projectile(
    content: &ContentBundle,
    dice: &mut Dice,
    id: MonsterId,
    monster: &Monster,
    heading: f64,
) -> Option<Projectile> {
    let tick_rate = content.tuning().tick_rate;
    let owner = ProjectileOwner::Monster(id);
    match monster.ranged.as_ref()? {
        RangedAttack::Spell(key) => {
            let Some(spell) = content.spell(key) else {
                warn!(monster = %monster.key, spell = %key, "ranged spell missing from content");
                return None;
            };
            let spec = spell.projectile?;
            let damage = monster.roll_damage(dice);
            let ballistics = Ballistics {
                speed_tiles: spec.speed_tiles,
                range_tiles: spec.range_tiles,
                size_tiles: spec.collision_size_tiles,
            };
            Some(
                Projectile::launch(
                    owner,
                    ProjectileSource::Spell(key.clone()),
                    monster.position,
                    heading,
                    ballistics,
                    damage,
                    spell.damage_type,
                    tick_rate,
                )
                .with_status(spell.status.or(monster.on_hit)),
            )
        }
        RangedAttack::Weapon(key) => {
            let Some(weapon) = content.weapon(key) else {
                warn!(monster = %monster.key, weapon = %key, "ranged weapon missing from content");
                return None;
            };
            let damage = monster.roll_damage(dice);
            let ballistics = Ballistics {
                speed_tiles: weapon.projectile_speed_tiles,
                range_tiles: weapon.range_tiles,
                size_tiles: 0.5,
            };
            Some(
                Projectile::launch(
                    owner,
                    ProjectileSource::Weapon(key.clone()),
                    monster.position,
                    heading,
                    ballistics,
                    damage,
                    weapon.damage_type,
                    tick_rate,
                )
                .with_status(monster.on_hit),
            )
        }
    }
}

#[cfg(test)]
mod tests;

//! Path following, replanning and recovery when a monster ends up wedged.

use std::f64::consts::TAU;

use super::*;
use crate::game::pathfinding::{PathOutcome, find_path};

/// Radii in pixels searched, ring by ring, for a free spot when a monster is stuck.
const UNSTUCK_RINGS: [f64; 11] = [8.0, 16.0, 24.0, 32.0, 40.0, 48.0, 56.0, 64.0, 80.0, 96.0, 128.0];
const UNSTUCK_ANGLES: u32 = 16;

/// Walks one tick toward the nearest of `goals`, replanning when there is no path or the
/// primary target moved and the replan cooldown has run out.
pub(super) fn navigate(
    monster: &mut Monster,
    ctx: &AiContext<'_, '_>,
    goals: &BTreeSet<TilePos>,
    primary: TilePos,
    speed: f64,
    padding: i32,
    outcome: &mut AiOutcome,
) {
    let target_moved = monster.path.target != Some(primary);
    if monster.path.blocked && monster.path_cooldown > 0 {
        return;
    }
    if monster.path.is_done() || (target_moved && monster.path_cooldown == 0) {
        let start = monster.tile();
        let plan = find_path(start, goals, padding, |tile| ctx.can_stand(monster, tile.center()));
        match plan {
            PathOutcome::Found(tiles) => {
                monster.path.tiles = tiles;
                monster.path.index = 0;
                monster.path.target = Some(primary);
                monster.path.blocked = false;
                monster.path_cooldown = ctx.tuning.ai.path_check_frequency;
            }
            failed => {
                debug!(key = %monster.key, ?start, ?primary, outcome = ?failed, "no path this tick");
                monster.path.clear();
                return;
            }
        }
    }
    step_along_path(monster, ctx, speed, outcome);
}

fn step_along_path(monster: &mut Monster, ctx: &AiContext<'_, '_>, speed: f64, outcome: &mut AiOutcome) {
    let Some(next) = monster.path.next() else {
        return;
    };
    let waypoint = next.center();
    let delta = waypoint - monster.position;
    let remaining = delta.length();
    if remaining <= f64::EPSILON {
        monster.path.index += 1;
        return;
    }
    let arrives = remaining <= speed;
    let destination = if arrives { waypoint } else { monster.position + delta * (speed / remaining) };
    if ctx.can_stand(monster, destination) {
        monster.facing = delta.angle();
        monster.position = destination;
        monster.stuck_counter = 0;
        if arrives {
            monster.path.index += 1;
        }
    } else {
        monster.path.abandon();
        monster.path_cooldown = ctx.tuning.ai.path_check_frequency;
        monster.stuck_counter += 1;
        if monster.stuck_counter >= ctx.tuning.ai.stuck_limit {
            unstuck(monster, ctx);
            outcome.unstuck = true;
        }
    }
}

/// Moves the monster to the first free point on growing rings around it, or home to its
/// spawn point when every ring is blocked.
pub(super) fn unstuck(monster: &mut Monster, ctx: &AiContext<'_, '_>) {
    let origin = monster.position;
    let free = UNSTUCK_RINGS.iter().find_map(|radius| {
        (0..UNSTUCK_ANGLES).find_map(|step| {
            let angle = f64::from(step) * TAU / f64::from(UNSTUCK_ANGLES);
            let candidate = origin + Vec2::from_angle(angle) * *radius;
            ctx.can_stand(monster, candidate).then_some(candidate)
        })
    });
    monster.position = free.unwrap_or(monster.spawn);
    monster.path.clear();
    monster.stuck_counter = 0;
}

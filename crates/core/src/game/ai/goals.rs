//! Where a monster wants to go: pursuit rings, patrol points and escape routes.

use std::f64::consts::PI;

use super::*;

const PATROL_SAMPLES: usize = 20;
/// Escape headings tried in order, in degrees off "straight away from the party".
const FLEE_OFFSETS_DEGREES: [f64; 12] =
    [0.0, 15.0, -15.0, 30.0, -30.0, 45.0, -45.0, 60.0, -60.0, 75.0, -75.0, 90.0];

/// Standable tiles whose centres are within attack range of the party, or the party's own
/// tile when none are. Ranged attackers also need a clear line to the party.
pub(super) fn pursuit_goals(monster: &Monster, ctx: &AiContext<'_, '_>) -> BTreeSet<TilePos> {
    let party_tile = TilePos::containing(ctx.party_position);
    let reach = (monster.attack_radius / TILE_SIZE).ceil() as i32;
    let mut goals = BTreeSet::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let tile = TilePos::new(party_tile.x + dx, party_tile.y + dy);
            if tile.center().distance(ctx.party_position) <= monster.attack_radius
                && ctx.can_stand(monster, tile.center())
                && (monster.ranged.is_none() || ctx.oracle.line_of_sight(tile.center(), ctx.party_position))
            {
                goals.insert(tile);
            }
        }
    }
    if goals.is_empty() {
        goals.insert(party_tile);
    }
    goals
}

/// A random standable tile inside the tether, falling back to the spawn tile.
pub(super) fn patrol_goal(monster: &Monster, ctx: &AiContext<'_, '_>, dice: &mut Dice) -> TilePos {
    let spawn_tile = monster.spawn_tile();
    let reach = (monster.tether_radius / TILE_SIZE).ceil() as i32;
    for _ in 0..PATROL_SAMPLES {
        let tile = TilePos::new(
            spawn_tile.x + dice.range_inclusive(-reach, reach),
            spawn_tile.y + dice.range_inclusive(-reach, reach),
        );
        if tile != monster.tile()
            && tile.center().distance(monster.spawn) <= monster.tether_radius
            && ctx.can_stand(monster, tile.center())
        {
            return tile;
        }
    }
    spawn_tile
}

/// First standable tile along a fan of headings pointing away from the party.
pub(super) fn flee_goal(monster: &mut Monster, ctx: &AiContext<'_, '_>) -> TilePos {
    let away = monster.position - ctx.party_position;
    let base = if away.length() > f64::EPSILON { away.angle() } else { monster.facing + PI };
    let distance = ctx.tuning.ai.flee_vision_distance;
    for offset in FLEE_OFFSETS_DEGREES {
        let heading = base + offset.to_radians();
        let tile = TilePos::containing(monster.position + Vec2::from_angle(heading) * distance);
        if ctx.oracle.grid().in_bounds(tile) && ctx.can_stand(monster, tile.center()) {
            monster.direction_hint = Some(heading);
            return tile;
        }
    }
    monster.direction_hint = None;
    monster.spawn_tile()
}

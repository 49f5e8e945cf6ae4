//! Arrows, bolts and monster missiles in flight.
//! A projectile only knows how to move and whether a point is inside its hit radius;
//! target selection and damage live in the world's projectile phase.

use serde::{Deserialize, Serialize};

use crate::content::schema::StatusEffectSpec;
use crate::grid::TileGrid;
use crate::types::{DamageType, MonsterId, TILE_SIZE, TilePos, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Party { member: usize },
    Monster(MonsterId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSource {
    Spell(String),
    Weapon(String),
}

/// Flight parameters in content units (tiles, tiles per second).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ballistics {
    pub speed_tiles: f64,
    pub range_tiles: f64,
    pub size_tiles: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: ProjectileOwner,
    pub source: ProjectileSource,
    pub position: Vec2,
    /// Pixels per tick.
    pub velocity: Vec2,
    pub remaining_ticks: i64,
    pub radius: f64,
    pub damage: i32,
    pub damage_type: DamageType,
    pub status: Option<StatusEffectSpec>,
    pub active: bool,
}

impl Projectile {
    /// Speed is `speed_tiles * 64 / tick_rate` px per tick; lifetime is
    /// `range / speed` seconds rounded to whole ticks; radius is at least half a tile.
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        owner: ProjectileOwner,
        source: ProjectileSource,
        origin: Vec2,
        heading: f64,
        ballistics: Ballistics,
        damage: i32,
        damage_type: DamageType,
        tick_rate: u32,
    ) -> Self {
        let tps = f64::from(tick_rate.max(1));
        let speed = ballistics.speed_tiles * TILE_SIZE / tps;
        let lifetime = if ballistics.speed_tiles > 0.0 {
            (ballistics.range_tiles / ballistics.speed_tiles * tps).round() as i64
        } else {
            0
        };
        Self {
            owner,
            source,
            position: origin,
            velocity: Vec2::from_angle(heading) * speed,
            remaining_ticks: lifetime,
            radius: ballistics.size_tiles.max(0.5) * TILE_SIZE,
            damage,
            damage_type,
            status: None,
            active: lifetime > 0,
        }
    }

    pub fn with_status(mut self, status: Option<StatusEffectSpec>) -> Self {
        self.status = status;
        self
    }

    /// Moves one tick, burns one tick of lifetime, and stops on solid tiles.
    pub fn advance(&mut self, grid: &TileGrid) {
        if !self.active {
            return;
        }
        self.position = self.position + self.velocity;
        self.remaining_ticks -= 1;
        if self.remaining_ticks <= 0 || grid.is_solid(TilePos::containing(self.position)) {
            self.active = false;
        }
    }

    pub fn hits(&self, point: Vec2) -> bool {
        self.active && self.position.distance(point) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{grid_from_rows, sample_content};

    fn bolt(origin: Vec2, ballistics: Ballistics) -> Projectile {
        Projectile::launch(
            ProjectileOwner::Party { member: 0 },
            ProjectileSource::Spell("fire_bolt".into()),
            origin,
            0.0,
            ballistics,
            10,
            DamageType::Fire,
            120,
        )
    }

    #[test]
    fn two_tiles_per_second_over_ten_tiles_lives_six_hundred_ticks() {
        let content = sample_content();
        let grid = grid_from_rows(&content, &[&".".repeat(14)]);
        let origin = TilePos::new(0, 0).center();
        let mut projectile =
            bolt(origin, Ballistics { speed_tiles: 2.0, range_tiles: 10.0, size_tiles: 0.0 });
        assert_eq!(projectile.remaining_ticks, 600);
        assert!((projectile.radius - 32.0).abs() < 1e-9);

        let mut ticks = 0;
        while projectile.active {
            projectile.advance(&grid);
            ticks += 1;
        }
        assert_eq!(ticks, 600);
        assert!((projectile.position.x - origin.x - 10.0 * TILE_SIZE).abs() < 1e-6);
    }

    #[test]
    fn walls_stop_projectiles() {
        let content = sample_content();
        let grid = grid_from_rows(&content, &["..W..."]);
        let mut projectile = bolt(
            TilePos::new(0, 0).center(),
            Ballistics { speed_tiles: 8.0, range_tiles: 10.0, size_tiles: 0.5 },
        );
        while projectile.active {
            projectile.advance(&grid);
        }
        assert_eq!(TilePos::containing(projectile.position), TilePos::new(2, 0));
        assert!(!projectile.hits(projectile.position));
    }
}

//! Movement and sight queries over the grid and the solid entity boxes.
//! This module exists so the AI, the party and projectiles share one notion of "blocked".
//! It does not own entity positions; callers snapshot the boxes they care about.

use std::collections::BTreeSet;

use crate::grid::TileGrid;
use crate::types::{ENTITY_BOX_SIZE, EntityRef, TILE_SIZE, TilePos, Vec2};

#[derive(Clone, Copy, Debug)]
pub struct SolidBox {
    pub owner: EntityRef,
    pub center: Vec2,
}

/// How an entity is allowed to treat tiles that are globally unwalkable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mobility<'a> {
    /// Tile categories this entity walks on regardless of the tile's walkable flag.
    pub habitat: Option<&'a BTreeSet<String>>,
    /// Flyers pass over low obstacles (height multiplier below 1).
    pub flying: bool,
}

pub struct CollisionOracle<'a> {
    grid: &'a TileGrid,
    boxes: Vec<SolidBox>,
}

impl<'a> CollisionOracle<'a> {
    pub fn new(grid: &'a TileGrid, boxes: Vec<SolidBox>) -> Self {
        Self { grid, boxes }
    }

    pub fn grid(&self) -> &TileGrid {
        self.grid
    }

    pub fn move_box(&mut self, owner: EntityRef, center: Vec2) {
        if let Some(solid) = self.boxes.iter_mut().find(|solid| solid.owner == owner) {
            solid.center = center;
        }
    }

    pub fn add_box(&mut self, solid: SolidBox) {
        self.boxes.push(solid);
    }

    pub fn remove_box(&mut self, owner: EntityRef) {
        self.boxes.retain(|solid| solid.owner != owner);
    }

    pub fn can_move_to(&self, entity: EntityRef, point: Vec2) -> bool {
        self.can_move_to_with_habitat(entity, point, Mobility::default())
    }

    /// True when a 48x48 box centred on `point` has every corner on a tile this entity may
    /// stand on and overlaps no other solid box.
    pub fn can_move_to_with_habitat(
        &self,
        entity: EntityRef,
        point: Vec2,
        mobility: Mobility<'_>,
    ) -> bool {
        let half = ENTITY_BOX_SIZE / 2.0;
        let corners = [
            Vec2::new(point.x - half, point.y - half),
            Vec2::new(point.x + half, point.y - half),
            Vec2::new(point.x - half, point.y + half),
            Vec2::new(point.x + half, point.y + half),
        ];
        if !corners.iter().all(|corner| self.tile_passable(TilePos::containing(*corner), mobility)) {
            return false;
        }
        !self.boxes.iter().any(|solid| {
            solid.owner != entity
                && (solid.center.x - point.x).abs() < ENTITY_BOX_SIZE
                && (solid.center.y - point.y).abs() < ENTITY_BOX_SIZE
        })
    }

    fn tile_passable(&self, pos: TilePos, mobility: Mobility<'_>) -> bool {
        let grid = self.grid;
        if !grid.in_bounds(pos) {
            return false;
        }
        if grid.is_walkable(pos) {
            return true;
        }
        if let Some(habitat) = mobility.habitat
            && grid.category(pos).is_some_and(|category| habitat.contains(category))
        {
            return true;
        }
        mobility.flying && grid.height_multiplier(pos) < 1.0
    }

    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        line_of_sight(self.grid, from, to)
    }
}

/// Grid traversal of the segment `from -> to`; false as soon as an opaque tile is crossed.
pub fn line_of_sight(grid: &TileGrid, from: Vec2, to: Vec2) -> bool {
    let mut cell = TilePos::containing(from);
    let end = TilePos::containing(to);
    let delta = to - from;
    let step_x = if delta.x > 0.0 { 1 } else { -1 };
    let step_y = if delta.y > 0.0 { 1 } else { -1 };

    let boundary = |origin: f64, step: i32, index: i32| {
        let next = if step > 0 { index + 1 } else { index };
        f64::from(next) * TILE_SIZE - origin
    };
    let (mut t_max_x, t_delta_x) = if delta.x.abs() < f64::EPSILON {
        (f64::INFINITY, f64::INFINITY)
    } else {
        (boundary(from.x, step_x, cell.x) / delta.x, TILE_SIZE / delta.x.abs())
    };
    let (mut t_max_y, t_delta_y) = if delta.y.abs() < f64::EPSILON {
        (f64::INFINITY, f64::INFINITY)
    } else {
        (boundary(from.y, step_y, cell.y) / delta.y, TILE_SIZE / delta.y.abs())
    };

    let limit = cell.manhattan(end) + 2;
    for _ in 0..=limit {
        if !grid.is_transparent(cell) {
            return false;
        }
        if cell == end {
            return true;
        }
        if t_max_x < t_max_y {
            cell.x += step_x;
            t_max_x += t_delta_x;
        } else {
            cell.y += step_y;
            t_max_y += t_delta_y;
        }
    }
    true
}

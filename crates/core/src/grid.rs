//! The tile grid of the active map plus its special-tile and spawn overlays.
//! Tile codes are fixed once the grid is built; every query outside the grid treats the cell
//! as solid, opaque and unwalkable.

use std::collections::BTreeMap;

use crate::content::{ContentBundle, TileCode};
use crate::types::{TILE_SIZE, TilePos, Vec2};

/// Per-type properties copied out of the bundle so grid queries stay cheap.
#[derive(Clone, Debug, PartialEq)]
struct TileProps {
    solid: bool,
    transparent: bool,
    walkable: bool,
    height_multiplier: f64,
    category: String,
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    codes: Vec<TileCode>,
    palette: Vec<TileProps>,
    keys: Vec<String>,
    specials: BTreeMap<TilePos, String>,
    start: Option<TilePos>,
}

impl TileGrid {
    /// A `width` x `height` grid filled with `fill`.
    pub fn new(content: &ContentBundle, width: i32, height: i32, fill: TileCode) -> Self {
        let palette = content
            .tiles()
            .iter()
            .map(|tile| TileProps {
                solid: tile.def.solid,
                transparent: tile.def.transparent,
                walkable: tile.def.walkable,
                height_multiplier: tile.def.height_multiplier,
                category: tile.def.category.clone(),
            })
            .collect();
        let keys = content.tiles().iter().map(|tile| tile.key.clone()).collect();
        let width = width.max(0);
        let height = height.max(0);
        let cells = usize::try_from(width * height).unwrap_or(0);
        Self {
            width,
            height,
            codes: vec![fill; cells],
            palette,
            keys,
            specials: BTreeMap::new(),
            start: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        usize::try_from(pos.y * self.width + pos.x).ok()
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<TileCode> {
        self.index(pos).and_then(|index| self.codes.get(index).copied())
    }

    pub fn tile_key(&self, pos: TilePos) -> Option<&str> {
        let code = self.tile_at(pos)?;
        self.keys.get(usize::from(code.0)).map(String::as_str)
    }

    /// Only the map loader and test fixtures reshape the grid.
    pub(crate) fn set_tile(&mut self, pos: TilePos, code: TileCode) {
        if let Some(index) = self.index(pos)
            && let Some(cell) = self.codes.get_mut(index)
        {
            *cell = code;
        }
    }

    pub(crate) fn mark_special(&mut self, pos: TilePos, key: &str) {
        self.specials.insert(pos, key.to_string());
    }

    pub(crate) fn set_start(&mut self, pos: Option<TilePos>) {
        self.start = pos;
    }

    fn props(&self, pos: TilePos) -> Option<&TileProps> {
        let code = self.tile_at(pos)?;
        self.palette.get(usize::from(code.0))
    }

    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.props(pos).is_some_and(|props| props.walkable && !props.solid)
    }

    pub fn is_transparent(&self, pos: TilePos) -> bool {
        self.props(pos).is_some_and(|props| props.transparent)
    }

    pub fn is_solid(&self, pos: TilePos) -> bool {
        self.props(pos).is_none_or(|props| props.solid)
    }

    pub fn height_multiplier(&self, pos: TilePos) -> f64 {
        self.props(pos).map_or(1.0, |props| props.height_multiplier)
    }

    pub fn category(&self, pos: TilePos) -> Option<&str> {
        self.props(pos).map(|props| props.category.as_str())
    }

    pub fn is_walkable_point(&self, point: Vec2) -> bool {
        self.is_walkable(TilePos::containing(point))
    }

    pub fn specials(&self) -> &BTreeMap<TilePos, String> {
        &self.specials
    }

    pub fn special_at(&self, pos: TilePos) -> Option<&str> {
        self.specials.get(&pos).map(String::as_str)
    }

    pub fn start(&self) -> Option<TilePos> {
        self.start
    }

    /// The spawn tile as `(x, y)`, or `(-1, -1)` when the map has none.
    pub fn start_tile(&self) -> (i32, i32) {
        self.start.map_or((-1, -1), |pos| (pos.x, pos.y))
    }

    /// World-pixel extent of the grid.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(f64::from(self.width) * TILE_SIZE, f64::from(self.height) * TILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{grid_from_rows, sample_content};

    #[test]
    fn out_of_bounds_is_solid_and_unwalkable() {
        let content = sample_content();
        let grid = grid_from_rows(&content, &["..", ".."]);
        let outside = TilePos::new(-1, 0);
        assert!(grid.is_solid(outside));
        assert!(!grid.is_walkable(outside));
        assert!(!grid.is_transparent(outside));
        assert!(grid.is_walkable(TilePos::new(1, 1)));
        assert!(!grid.is_walkable(TilePos::new(2, 1)));
    }

    #[test]
    fn glass_is_solid_but_transparent() {
        let content = sample_content();
        let grid = grid_from_rows(&content, &[".GW"]);
        let glass = TilePos::new(1, 0);
        assert!(grid.is_solid(glass));
        assert!(grid.is_transparent(glass));
        assert!(!grid.is_transparent(TilePos::new(2, 0)));
    }

    #[test]
    fn start_tile_defaults_to_minus_one() {
        let content = sample_content();
        let mut grid = grid_from_rows(&content, &["..."]);
        assert_eq!(grid.start_tile(), (-1, -1));
        grid.set_start(Some(TilePos::new(2, 0)));
        assert_eq!(grid.start_tile(), (2, 0));
    }
}

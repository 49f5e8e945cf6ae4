//! Shared fixtures for the unit test suites: the sample content bundle from `assets/`,
//! small grids built from rows of map letters, and a four-member party.

use std::sync::{Arc, OnceLock};

use crate::content::{ContentBundle, ContentSources};
use crate::grid::TileGrid;
use crate::party::{Party, RosterEntry};
use crate::types::{CharacterClass, TilePos};

pub(crate) const SAMPLE_BIOME: &str = "forest";

pub(crate) fn sample_sources() -> ContentSources<'static> {
    ContentSources {
        tiles: include_str!("../../../assets/tiles.yaml"),
        weapons: include_str!("../../../assets/weapons.yaml"),
        items: include_str!("../../../assets/items.yaml"),
        spells: include_str!("../../../assets/spells.yaml"),
        monsters: include_str!("../../../assets/monsters.yaml"),
        npcs: include_str!("../../../assets/npcs.yaml"),
        loot: include_str!("../../../assets/loot.yaml"),
        quests: include_str!("../../../assets/quests.yaml"),
        level_up: include_str!("../../../assets/level_up.yaml"),
        tuning: include_str!("../../../assets/tuning.toml"),
    }
}

/// The sample bundle, parsed once per test binary.
pub(crate) fn sample_content() -> Arc<ContentBundle> {
    static CONTENT: OnceLock<Arc<ContentBundle>> = OnceLock::new();
    let content = CONTENT.get_or_init(|| {
        Arc::new(ContentBundle::from_sources(sample_sources()).expect("sample content loads"))
    });
    Arc::clone(content)
}

/// A grid from rows of tile letters; every row must be the same width.
pub(crate) fn grid_from_rows(content: &ContentBundle, rows: &[&str]) -> TileGrid {
    let height = i32::try_from(rows.len()).expect("small grid");
    let width = rows.first().map_or(0, |row| i32::try_from(row.chars().count()).expect("small grid"));
    let mut grid = TileGrid::new(content, width, height, content.empty_tile());
    for (y, row) in (0..).zip(rows) {
        assert_eq!(i32::try_from(row.chars().count()).ok(), Some(width), "ragged fixture row {y}");
        for (x, letter) in (0..).zip(row.chars()) {
            let code = content
                .decode_tile_letter(letter, SAMPLE_BIOME)
                .unwrap_or_else(|| panic!("no tile for letter `{letter}`"));
            grid.set_tile(TilePos::new(x, y), code);
        }
    }
    grid
}

pub(crate) fn sample_roster() -> Vec<RosterEntry> {
    [
        ("Aldric", CharacterClass::Knight),
        ("Wren", CharacterClass::Archer),
        ("Mira", CharacterClass::Sorcerer),
        ("Hale", CharacterClass::Cleric),
    ]
    .into_iter()
    .map(|(name, class)| RosterEntry { name: name.to_string(), class })
    .collect()
}

/// Knight, archer, sorcerer and cleric, in that order.
pub(crate) fn sample_party(content: &ContentBundle) -> Party {
    Party::from_roster(&sample_roster(), content).expect("sample party")
}

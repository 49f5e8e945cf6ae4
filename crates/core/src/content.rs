//! The immutable content bundle: every data table the simulation reads, validated once at
//! load and shared read-only (usually behind an `Arc`) for the lifetime of a world.
//! This module exists so gameplay numbers come from data files rather than code.
//! It does not own map parsing or any runtime state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::LoadError;
use crate::item::Item;

pub mod classes;
pub mod schema;
pub mod tuning;
mod validate;

use schema::{
    ItemDef, LevelUpTable, LootEntry, MonsterDef, NpcDef, QuestDef, SpellDef, TileDef, WeaponDef,
};
pub use tuning::{AiTuning, Tuning};

/// Key of the tile type used for spawn markers, placeholders and monster cells.
pub const EMPTY_TILE: &str = "empty";

/// Dense numeric code of a tile type, assigned in key order at load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCode(pub u16);

#[derive(Clone, Debug)]
pub struct TileType {
    pub code: TileCode,
    pub key: String,
    pub def: TileDef,
}

/// In-memory text of the ten content documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentSources<'a> {
    pub tiles: &'a str,
    pub weapons: &'a str,
    pub items: &'a str,
    pub spells: &'a str,
    pub monsters: &'a str,
    pub npcs: &'a str,
    pub loot: &'a str,
    pub quests: &'a str,
    pub level_up: &'a str,
    pub tuning: &'a str,
}

/// Host-provided locations of the content documents.
#[derive(Clone, Debug)]
pub struct ContentPaths {
    pub tiles: PathBuf,
    pub weapons: PathBuf,
    pub items: PathBuf,
    pub spells: PathBuf,
    pub monsters: PathBuf,
    pub npcs: PathBuf,
    pub loot: PathBuf,
    pub quests: PathBuf,
    pub level_up: PathBuf,
    pub tuning: PathBuf,
}

impl ContentPaths {
    /// Conventional file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tiles: dir.join("tiles.yaml"),
            weapons: dir.join("weapons.yaml"),
            items: dir.join("items.yaml"),
            spells: dir.join("spells.yaml"),
            monsters: dir.join("monsters.yaml"),
            npcs: dir.join("npcs.yaml"),
            loot: dir.join("loot.yaml"),
            quests: dir.join("quests.yaml"),
            level_up: dir.join("level_up.yaml"),
            tuning: dir.join("tuning.toml"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContentBundle {
    tiles: Vec<TileType>,
    tile_codes: BTreeMap<String, TileCode>,
    empty_tile: TileCode,
    weapons: BTreeMap<String, WeaponDef>,
    items: BTreeMap<String, ItemDef>,
    spells: BTreeMap<String, SpellDef>,
    monsters: BTreeMap<String, MonsterDef>,
    monster_letters: BTreeMap<char, String>,
    npcs: BTreeMap<String, NpcDef>,
    loot: BTreeMap<String, Vec<LootEntry>>,
    quests: BTreeMap<String, QuestDef>,
    level_up: LevelUpTable,
    tuning: Tuning,
    fingerprint: u64,
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

fn parse_document<T: DeserializeOwned + Default>(
    document: &'static str,
    source: &str,
) -> Result<T, LoadError> {
    if source.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(source).map_err(|source| LoadError::Yaml { document, source })
}

impl ContentBundle {
    pub fn load(paths: &ContentPaths) -> Result<Self, LoadError> {
        let tiles = read(&paths.tiles)?;
        let weapons = read(&paths.weapons)?;
        let items = read(&paths.items)?;
        let spells = read(&paths.spells)?;
        let monsters = read(&paths.monsters)?;
        let npcs = read(&paths.npcs)?;
        let loot = read(&paths.loot)?;
        let quests = read(&paths.quests)?;
        let level_up = read(&paths.level_up)?;
        let tuning = read(&paths.tuning)?;
        Self::from_sources(ContentSources {
            tiles: &tiles,
            weapons: &weapons,
            items: &items,
            spells: &spells,
            monsters: &monsters,
            npcs: &npcs,
            loot: &loot,
            quests: &quests,
            level_up: &level_up,
            tuning: &tuning,
        })
    }

    pub fn from_sources(sources: ContentSources<'_>) -> Result<Self, LoadError> {
        let tile_defs: BTreeMap<String, TileDef> = parse_document("tiles", sources.tiles)?;
        let weapons: BTreeMap<String, WeaponDef> = parse_document("weapons", sources.weapons)?;
        let items: BTreeMap<String, ItemDef> = parse_document("items", sources.items)?;
        let spells: BTreeMap<String, SpellDef> = parse_document("spells", sources.spells)?;
        let monsters: BTreeMap<String, MonsterDef> =
            parse_document("monsters", sources.monsters)?;
        let npcs: BTreeMap<String, NpcDef> = parse_document("npcs", sources.npcs)?;
        let loot: BTreeMap<String, Vec<LootEntry>> = parse_document("loot", sources.loot)?;
        let quests: BTreeMap<String, QuestDef> = parse_document("quests", sources.quests)?;
        let level_up: LevelUpTable = parse_document("level_up", sources.level_up)?;
        let tuning = Tuning::from_toml(sources.tuning)?;

        if tile_defs.len() > usize::from(u16::MAX) {
            return Err(LoadError::invalid("tiles", "*", "too many tile types"));
        }
        let mut tiles = Vec::with_capacity(tile_defs.len());
        let mut tile_codes = BTreeMap::new();
        for (index, (key, def)) in tile_defs.into_iter().enumerate() {
            let code = TileCode(u16::try_from(index).unwrap_or(u16::MAX));
            tile_codes.insert(key.clone(), code);
            tiles.push(TileType { code, key, def });
        }
        let empty_tile =
            *tile_codes.get(EMPTY_TILE).ok_or_else(|| LoadError::missing("tiles", EMPTY_TILE))?;

        let monster_letters = monsters
            .iter()
            .filter_map(|(key, def)| def.letter.map(|letter| (letter, key.clone())))
            .collect();

        let mut fingerprint_input = String::new();
        for source in [
            sources.tiles,
            sources.weapons,
            sources.items,
            sources.spells,
            sources.monsters,
            sources.npcs,
            sources.loot,
            sources.quests,
            sources.level_up,
            sources.tuning,
        ] {
            fingerprint_input.push_str(source);
            fingerprint_input.push('\u{0}');
        }

        let bundle = Self {
            tiles,
            tile_codes,
            empty_tile,
            weapons,
            items,
            spells,
            monsters,
            monster_letters,
            npcs,
            loot,
            quests,
            level_up,
            tuning,
            fingerprint: xxh3_64(fingerprint_input.as_bytes()),
        };
        validate::validate_bundle(&bundle)?;
        Ok(bundle)
    }

    /// Hash of the raw documents; journals record it to detect content drift.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn tile(&self, code: TileCode) -> Option<&TileType> {
        self.tiles.get(usize::from(code.0))
    }

    pub fn tile_code(&self, key: &str) -> Option<TileCode> {
        self.tile_codes.get(key).copied()
    }

    pub fn empty_tile(&self) -> TileCode {
        self.empty_tile
    }

    /// Resolves a map character to a tile type for `biome`. A biome-specific letter wins over
    /// a plain letter; a plain letter only applies when the tile allows the biome.
    pub fn decode_tile_letter(&self, letter: char, biome: &str) -> Option<TileCode> {
        let biome_specific = self
            .tiles
            .iter()
            .find(|tile| tile.def.letters.get(biome) == Some(&letter))
            .map(|tile| tile.code);
        biome_specific.or_else(|| {
            self.tiles
                .iter()
                .find(|tile| {
                    tile.def.letter == Some(letter)
                        && (tile.def.biomes.is_empty() || tile.def.biomes.contains(biome))
                })
                .map(|tile| tile.code)
        })
    }

    pub fn weapon(&self, key: &str) -> Option<&WeaponDef> {
        self.weapons.get(key)
    }

    pub fn item(&self, key: &str) -> Option<&ItemDef> {
        self.items.get(key)
    }

    pub fn spell(&self, key: &str) -> Option<&SpellDef> {
        self.spells.get(key)
    }

    pub fn monster(&self, key: &str) -> Option<&MonsterDef> {
        self.monsters.get(key)
    }

    pub fn monster_for_letter(&self, letter: char) -> Option<&str> {
        self.monster_letters.get(&letter).map(String::as_str)
    }

    pub fn npc(&self, key: &str) -> Option<&NpcDef> {
        self.npcs.get(key)
    }

    /// Loot entries for a monster key; monsters without a table drop nothing.
    pub fn loot_table(&self, monster_key: &str) -> &[LootEntry] {
        self.loot.get(monster_key).map_or(&[], Vec::as_slice)
    }

    pub fn quest(&self, key: &str) -> Option<&QuestDef> {
        self.quests.get(key)
    }

    pub fn quests(&self) -> &BTreeMap<String, QuestDef> {
        &self.quests
    }

    pub fn level_up(&self) -> &LevelUpTable {
        &self.level_up
    }

    /// Builds an item instance from either the weapon table or the item table.
    pub fn instantiate(&self, key: &str) -> Option<Item> {
        if let Some(def) = self.weapons.get(key) {
            return Some(Item::from_weapon(key, def));
        }
        self.items.get(key).map(|def| Item::from_def(key, def))
    }

    pub fn has_item_key(&self, key: &str) -> bool {
        self.weapons.contains_key(key) || self.items.contains_key(key)
    }
}

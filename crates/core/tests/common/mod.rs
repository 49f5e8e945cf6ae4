#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wyrmvale_core::{
    CharacterClass, ContentBundle, ContentPaths, ParsedMap, RosterEntry, load_map, parse_map,
};

pub const BIOME: &str = "forest";

pub fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

pub fn load_content() -> Arc<ContentBundle> {
    let paths = ContentPaths::in_dir(&assets_dir());
    Arc::new(ContentBundle::load(&paths).expect("sample content bundle loads"))
}

pub fn load_sample_map(content: &ContentBundle, name: &str) -> ParsedMap {
    let path = assets_dir().join("maps").join(name);
    load_map(&path, content, BIOME).unwrap_or_else(|err| panic!("{name}: {err}"))
}

/// An open field with the spawn marker in the bottom-left corner.
pub fn open_field(content: &ContentBundle, width: usize, height: usize) -> ParsedMap {
    let mut source = String::new();
    for y in 0..height {
        let mut row = ".".repeat(width);
        if y + 1 == height {
            row.replace_range(0..1, "+");
        }
        source.push_str(&row);
        source.push('\n');
    }
    parse_map(&source, content, BIOME).expect("open field parses")
}

pub fn roster() -> Vec<RosterEntry> {
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

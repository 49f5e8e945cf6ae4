//! Text map loader.
//!
//! One row per non-comment line; trailing `  >[npc:key]` / `  >[stile:key]` annotations bind,
//! in order, to the `@` placeholders on the same row. Monster letters are looked up before
//! tile letters so a lowercase tile letter never shadows a monster.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::content::ContentBundle;
use crate::error::LoadError;
use crate::grid::TileGrid;
use crate::types::TilePos;

const ANNOTATION_START: &str = "  >[";
const COMMENT_MARKER: char = '#';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterSpawn {
    pub tile: TilePos,
    pub monster: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NpcSpawn {
    pub tile: TilePos,
    pub npc: String,
}

#[derive(Clone, Debug)]
pub struct ParsedMap {
    pub grid: TileGrid,
    pub biome: String,
    pub monster_spawns: Vec<MonsterSpawn>,
    pub npc_spawns: Vec<NpcSpawn>,
}

impl ParsedMap {
    pub fn start_tile(&self) -> (i32, i32) {
        self.grid.start_tile()
    }
}

struct Row<'a> {
    line: usize,
    cells: Vec<char>,
    annotations: Vec<(&'a str, &'a str)>,
}

pub fn load_map(path: &Path, content: &ContentBundle, biome: &str) -> Result<ParsedMap, LoadError> {
    let source = fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    parse_map(&source, content, biome)
}

pub fn parse_map(source: &str, content: &ContentBundle, biome: &str) -> Result<ParsedMap, LoadError> {
    let annotation = Regex::new(r">\[(npc|stile):([A-Za-z0-9_\-]+)\]")
        .map_err(|err| LoadError::malformed(0, err.to_string()))?;

    let mut rows = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        if raw.trim().is_empty() || raw.starts_with(COMMENT_MARKER) {
            continue;
        }
        let (cells, trailer) = match raw.find(ANNOTATION_START) {
            Some(split) => (&raw[..split], &raw[split..]),
            None => (raw, ""),
        };
        let annotations = annotation
            .captures_iter(trailer)
            .filter_map(|caps| {
                let kind = caps.get(1)?.as_str();
                let key = caps.get(2)?.as_str();
                Some((kind, key))
            })
            .collect();
        rows.push(Row { line: index + 1, cells: cells.trim_end().chars().collect(), annotations });
    }

    let Some(first) = rows.first() else {
        return Err(LoadError::malformed(0, "map has no rows"));
    };
    let width = first.cells.len();
    if width == 0 {
        return Err(LoadError::malformed(first.line, "map row is empty"));
    }
    for row in &rows {
        if row.cells.len() != width {
            return Err(LoadError::malformed(
                row.line,
                format!("row width {} differs from {width}", row.cells.len()),
            ));
        }
    }

    let to_i32 = |value: usize, line: usize| {
        i32::try_from(value).map_err(|_| LoadError::malformed(line, "map is too large"))
    };
    let empty = content.empty_tile();
    let mut grid = TileGrid::new(content, to_i32(width, first.line)?, to_i32(rows.len(), first.line)?, empty);
    let mut start = None;
    let mut monster_spawns = Vec::new();
    let mut npc_spawns = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let y = to_i32(y, row.line)?;
        let mut placeholders = row.annotations.iter();
        for (x, cell) in row.cells.iter().copied().enumerate() {
            let pos = TilePos::new(to_i32(x, row.line)?, y);
            match cell {
                '+' => {
                    if start.is_some() {
                        return Err(LoadError::malformed(row.line, "more than one spawn marker"));
                    }
                    start = Some(pos);
                    grid.set_tile(pos, empty);
                }
                '@' => {
                    let Some((kind, key)) = placeholders.next() else {
                        return Err(LoadError::malformed(
                            row.line,
                            "placeholder `@` without a matching annotation",
                        ));
                    };
                    grid.set_tile(pos, empty);
                    if *kind == "npc" {
                        content.npc(key).ok_or_else(|| LoadError::missing("npcs", *key))?;
                        npc_spawns.push(NpcSpawn { tile: pos, npc: (*key).to_string() });
                    } else {
                        content.tile_code(key).ok_or_else(|| LoadError::missing("tiles", *key))?;
                        grid.mark_special(pos, key);
                    }
                }
                letter => {
                    if letter.is_ascii_lowercase()
                        && let Some(monster) = content.monster_for_letter(letter)
                    {
                        monster_spawns.push(MonsterSpawn { tile: pos, monster: monster.to_string() });
                        grid.set_tile(pos, empty);
                        continue;
                    }
                    let code = content
                        .decode_tile_letter(letter, biome)
                        .ok_or_else(|| LoadError::missing("tiles", letter.to_string()))?;
                    grid.set_tile(pos, code);
                }
            }
        }
    }
    grid.set_start(start);

    Ok(ParsedMap { grid, biome: biome.to_string(), monster_spawns, npc_spawns })
}

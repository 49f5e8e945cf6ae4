//! World construction from a loaded bundle, a parsed map and a party.
//! This module exists to isolate initialization details from runtime simulation flow.
//! It does not own tick advancement.

use slotmap::SlotMap;

use super::*;

impl World {
    pub fn new(seed: u64, content: Arc<ContentBundle>, map: &ParsedMap, mut party: Party) -> Self {
        match map.grid.start() {
            Some(tile) => party.position = tile.center(),
            None => {
                warn!("map has no spawn marker; the host must place the party");
                party.position = TilePos::new(-1, -1).center();
            }
        }

        let mut monsters = SlotMap::with_key();
        for spawn in &map.monster_spawns {
            match content.monster(&spawn.monster) {
                Some(def) => {
                    monsters.insert(Monster::from_def(&spawn.monster, def, spawn.tile.center()));
                }
                None => warn!(monster = %spawn.monster, "skipping spawn of unknown monster"),
            }
        }

        let mut npcs = SlotMap::with_key();
        for spawn in &map.npc_spawns {
            match content.npc(&spawn.npc) {
                Some(def) => {
                    npcs.insert(Npc::from_def(&spawn.npc, def, spawn.tile.center()));
                }
                None => warn!(npc = %spawn.npc, "skipping placement of unknown npc"),
            }
        }

        let mut world_items = SlotMap::with_key();
        for (tile, key) in map.grid.specials() {
            if let Some(item) = special_tile_item(&content, *tile, key) {
                world_items.insert(item);
            }
        }

        let mut quests = QuestManager::new(content.quests().clone());
        let log = quests
            .initialize_starting_quests()
            .into_iter()
            .map(|quest| WorldEvent::QuestActivated { quest })
            .collect();

        Self {
            seed,
            tick: 0,
            mode: SimMode::RealTime,
            dice: Dice::new(seed),
            content,
            state: WorldState {
                grid: map.grid.clone(),
                biome: map.biome.clone(),
                party,
                monsters,
                npcs,
                projectiles: SlotMap::with_key(),
                world_items,
                quests,
            },
            log,
            pending_hits: Vec::new(),
        }
    }
}

/// World item for a special tile whose properties name an `item`, if any.
fn special_tile_item(content: &ContentBundle, tile: TilePos, key: &str) -> Option<WorldItem> {
    let tile_type = content.tile_code(key).and_then(|code| content.tile(code))?;
    let item_key = tile_type.def.properties.get("item")?;
    let Some(item) = content.instantiate(item_key) else {
        warn!(tile = key, item = %item_key, "special tile names an unknown item");
        return None;
    };
    let respawn_ticks = tile_type
        .def
        .properties
        .get("respawn_seconds")
        .and_then(|seconds| seconds.parse::<u32>().ok())
        .map(|seconds| content.tuning().seconds_to_ticks(seconds));
    Some(WorldItem {
        item,
        tile,
        position: tile.center(),
        respawn_ticks,
        respawn_timer: 0,
        active: true,
    })
}

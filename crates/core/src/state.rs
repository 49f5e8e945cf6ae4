use slotmap::SlotMap;

use crate::collision::SolidBox;
use crate::grid::TileGrid;
use crate::item::Item;
use crate::monster::Monster;
use crate::npc::Npc;
use crate::party::Party;
use crate::projectile::Projectile;
use crate::quest::QuestManager;
use crate::types::{EntityRef, MonsterId, NpcId, ProjectileId, TilePos, Vec2, WorldItemId};

#[derive(Clone, Debug)]
pub struct WorldItem {
    pub item: Item,
    pub tile: TilePos,
    pub position: Vec2,
    /// Ticks until the item reappears after pickup; `None` means it is gone for good.
    pub respawn_ticks: Option<u32>,
    pub respawn_timer: u32,
    pub active: bool,
}

pub struct WorldState {
    pub grid: TileGrid,
    pub biome: String,
    pub party: Party,
    pub monsters: SlotMap<MonsterId, Monster>,
    pub npcs: SlotMap<NpcId, Npc>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub world_items: SlotMap<WorldItemId, WorldItem>,
    pub quests: QuestManager,
}

impl WorldState {
    /// Boxes of every living monster and every NPC, in id order.
    pub fn solid_boxes(&self) -> Vec<SolidBox> {
        let monsters = self
            .monsters
            .iter()
            .filter(|(_, monster)| monster.is_alive())
            .map(|(id, monster)| SolidBox { owner: EntityRef::Monster(id), center: monster.position });
        let npcs = self
            .npcs
            .iter()
            .map(|(id, npc)| SolidBox { owner: EntityRef::Npc(id), center: npc.position });
        monsters.chain(npcs).collect()
    }
}

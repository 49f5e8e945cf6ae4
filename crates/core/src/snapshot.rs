//! Serializable views of a running world, for saves, host UIs and debugging dumps.
//! This module exists so persistence reads a stable shape instead of internal stores.
//! It does not own journaling or replay.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::ActionError;
use crate::game::World;
use crate::types::{
    AiState, MonsterId, QuestStatus, QuestType, RewardBundle, SimMode, TilePos, Vec2, WorldItemId,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartyView {
    pub members: Vec<Character>,
    pub gold: u32,
    pub food: u32,
    pub inventory: Vec<String>,
    pub position: Vec2,
    pub facing: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterView {
    pub id: MonsterId,
    pub key: String,
    pub position: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub state: AiState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestView {
    pub id: String,
    pub kind: QuestType,
    pub name: String,
    pub status: QuestStatus,
    pub progress: u32,
    pub rewards_claimed: bool,
    pub rewards: RewardBundle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldItemView {
    pub id: WorldItemId,
    pub key: String,
    pub tile: TilePos,
    pub active: bool,
    pub respawn_timer: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u64,
    pub tick: u64,
    pub mode: SimMode,
    pub party: PartyView,
    pub monsters: Vec<MonsterView>,
    pub quests: Vec<QuestView>,
    pub world_items: Vec<WorldItemView>,
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        let party = self.party();
        WorldSnapshot {
            seed: self.seed(),
            tick: self.current_tick(),
            mode: self.mode(),
            party: PartyView {
                members: party.members.clone(),
                gold: party.gold,
                food: party.food,
                inventory: party.inventory.iter().map(|item| item.key.clone()).collect(),
                position: party.position,
                facing: party.facing,
            },
            monsters: self
                .monsters()
                .map(|(id, monster)| MonsterView {
                    id,
                    key: monster.key.clone(),
                    position: monster.position,
                    hp: monster.hp,
                    max_hp: monster.max_hp,
                    state: monster.state,
                })
                .collect(),
            quests: self
                .quests()
                .quests()
                .map(|quest| QuestView {
                    id: quest.id.clone(),
                    kind: quest.def.kind,
                    name: quest.def.name.clone(),
                    status: quest.status,
                    progress: quest.progress,
                    rewards_claimed: quest.rewards_claimed,
                    rewards: quest.rewards(),
                })
                .collect(),
            world_items: self
                .world_items()
                .map(|(id, world_item)| WorldItemView {
                    id,
                    key: world_item.item.key.clone(),
                    tile: world_item.tile,
                    active: world_item.active,
                    respawn_timer: world_item.respawn_timer,
                })
                .collect(),
        }
    }

    /// Replaces the quest log with `views`. Encounter quests are recreated from the view
    /// since they have no content entry. Nothing changes unless every view resolves.
    pub fn restore_quests(&mut self, views: &[QuestView]) -> Result<(), ActionError> {
        for view in views {
            let known = self.content().quest(&view.id).is_some() || view.kind == QuestType::Encounter;
            if !known {
                return Err(ActionError::missing("quests", &view.id));
            }
        }
        let quests = self.quests_mut();
        quests.reset();
        for view in views {
            if view.kind == QuestType::Encounter {
                quests.create_encounter_quest(&view.id, &view.name, "", view.rewards);
            }
            quests.restore(&view.id, view.status, view.progress, view.rewards_claimed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapfile::ParsedMap;
    use crate::test_support::{grid_from_rows, sample_content, sample_party};

    fn yard() -> World {
        let content = sample_content();
        let mut grid = grid_from_rows(&content, &["........", "........", "........"]);
        grid.set_start(Some(TilePos::new(1, 1)));
        let map = ParsedMap {
            grid,
            biome: "forest".into(),
            monster_spawns: Vec::new(),
            npc_spawns: Vec::new(),
        };
        let party = sample_party(&content);
        World::new(5, content, &map, party)
    }

    #[test]
    fn snapshot_lists_party_and_starting_quests() {
        let mut world = yard();
        world.spawn_monster("goblin", TilePos::new(6, 1)).expect("goblin");
        let snapshot = world.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.party.members.len(), 4);
        assert_eq!(snapshot.party.position, TilePos::new(1, 1).center());
        assert_eq!(snapshot.monsters.len(), 1);
        assert_eq!(snapshot.monsters[0].key, "goblin");
        assert!(snapshot.quests.iter().any(|quest| quest.id == "goblin_hunt"));

        let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
        let back: WorldSnapshot = serde_json::from_str(&json).expect("snapshot deserializes");
        assert_eq!(back, snapshot);
    }

    #[test]
    fn restore_recreates_encounter_quests_and_progress() {
        let mut world = yard();
        let views = vec![
            QuestView {
                id: "goblin_hunt".into(),
                kind: QuestType::Kill,
                name: "Goblin Hunt".into(),
                status: QuestStatus::Active,
                progress: 3,
                rewards_claimed: false,
                rewards: RewardBundle { gold: 50, experience: 100 },
            },
            QuestView {
                id: "encounter_hermit".into(),
                kind: QuestType::Encounter,
                name: "Hermit's Ambush".into(),
                status: QuestStatus::Completed,
                progress: 0,
                rewards_claimed: true,
                rewards: RewardBundle { gold: 30, experience: 60 },
            },
        ];
        world.restore_quests(&views).expect("restore");
        assert_eq!(world.quests().get("goblin_hunt").map(|quest| quest.progress), Some(3));
        let ambush = world.quests().get("encounter_hermit").expect("encounter quest");
        assert!(ambush.rewards_claimed);
        assert_eq!(ambush.rewards(), RewardBundle { gold: 30, experience: 60 });
    }

    #[test]
    fn unknown_quest_view_leaves_the_log_alone() {
        let mut world = yard();
        let before = world.snapshot().quests;
        let views = vec![QuestView {
            id: "lost_quest".into(),
            kind: QuestType::Kill,
            name: "Lost".into(),
            status: QuestStatus::Active,
            progress: 1,
            rewards_claimed: false,
            rewards: RewardBundle::default(),
        }];
        assert!(matches!(world.restore_quests(&views), Err(ActionError::ConfigMissing { .. })));
        assert_eq!(world.snapshot().quests, before);
    }
}

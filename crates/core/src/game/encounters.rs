//! NPC-triggered encounters: spawning the group and paying out once it is wiped out.

use crate::collision::SolidBox;
use crate::content::schema::EncounterDef;

use super::*;

/// Rings searched around the NPC for spawn tiles.
const SPAWN_SEARCH_RINGS: i32 = 8;

impl World {
    pub(super) fn start_encounter(&mut self, npc: NpcId, encounter: &EncounterDef, events: &mut Vec<WorldEvent>) {
        let Some(instance) = self.state.npcs.get_mut(npc) else {
            return;
        };
        instance.encounter_started = true;
        let quest = instance.encounter_quest_id();
        let origin = TilePos::containing(instance.position);
        let rewards = RewardBundle { gold: encounter.reward_gold, experience: encounter.reward_experience };

        let wanted = encounter.monsters.iter().map(|member| member.count as usize).sum();
        let mut tiles = self.free_tiles_around(origin, wanted).into_iter();
        let mut spawned = 0;
        'members: for member in &encounter.monsters {
            let Some(def) = self.content.monster(&member.monster) else {
                warn!(encounter = %encounter.name, monster = %member.monster, "encounter names an unknown monster");
                continue;
            };
            for _ in 0..member.count {
                let Some(tile) = tiles.next() else {
                    warn!(encounter = %encounter.name, spawned, "no room left around the npc");
                    break 'members;
                };
                let mut monster = Monster::from_def(&member.monster, def, tile.center());
                monster.encounter = Some(EncounterTag { quest: quest.clone(), rewards });
                self.state.monsters.insert(monster);
                spawned += 1;
            }
        }

        if self.state.quests.create_encounter_quest(&quest, &encounter.name, &encounter.description, rewards) {
            events.push(WorldEvent::QuestActivated { quest: quest.clone() });
        }
        info!(encounter = %encounter.name, quest = %quest, spawned, "encounter started");
        events.push(WorldEvent::EncounterStarted { npc, quest });
    }

    /// Up to `count` standable tiles on growing square rings around `origin`, clear of
    /// other entities and the party.
    fn free_tiles_around(&self, origin: TilePos, count: usize) -> Vec<TilePos> {
        let mut boxes = self.state.solid_boxes();
        boxes.push(SolidBox { owner: EntityRef::Party, center: self.state.party.position });
        let oracle = CollisionOracle::new(&self.state.grid, boxes);
        let placeholder = EntityRef::Monster(MonsterId::default());

        let mut tiles = Vec::with_capacity(count);
        for ring in 1..=SPAWN_SEARCH_RINGS {
            for dy in -ring..=ring {
                for dx in -ring..=ring {
                    if tiles.len() == count {
                        return tiles;
                    }
                    if dx.abs() != ring && dy.abs() != ring {
                        continue;
                    }
                    let tile = TilePos::new(origin.x + dx, origin.y + dy);
                    if oracle.can_move_to(placeholder, tile.center()) {
                        tiles.push(tile);
                    }
                }
            }
        }
        tiles
    }

    /// Completes every active encounter whose monsters are all dead.
    pub(super) fn update_encounters(&mut self, events: &mut Vec<WorldEvent>) {
        for quest in self.state.quests.active_encounter_ids() {
            let mut members = self
                .state
                .monsters
                .values()
                .filter(|monster| monster.encounter.as_ref().is_some_and(|tag| tag.quest == quest))
                .peekable();
            if members.peek().is_none() {
                continue;
            }
            if members.any(Monster::is_alive) {
                continue;
            }
            match self.state.quests.complete_encounter_quest(&quest) {
                Ok(rewards) => {
                    self.award_gold(rewards.gold, events);
                    self.award_experience(rewards.experience, events);
                    events.push(WorldEvent::QuestCompleted { quest: quest.clone() });
                    events.push(WorldEvent::EncounterCleared { quest, rewards });
                }
                Err(err) => warn!(quest = %quest, %err, "encounter could not be completed"),
            }
        }
    }
}

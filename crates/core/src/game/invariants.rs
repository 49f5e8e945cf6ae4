//! Whole-world consistency checks used by fuzzers and long-running tests.

use super::*;

impl World {
    /// Every universal invariant that currently fails, as a readable line each. Empty when
    /// the world is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (index, member) in self.state.party.members.iter().enumerate() {
            if member.hp < 0 || member.hp > member.max_hp {
                violations.push(format!("member {index} hp {} outside 0..={}", member.hp, member.max_hp));
            }
            if member.sp < 0 || member.sp > member.max_sp {
                violations.push(format!("member {index} sp {} outside 0..={}", member.sp, member.max_sp));
            }
        }

        for (id, monster) in &self.state.monsters {
            if monster.hp < 0 || monster.hp > monster.max_hp {
                violations.push(format!("monster {id:?} hp {} outside 0..={}", monster.hp, monster.max_hp));
            }
            if !monster.is_alive() && (!monster.path.is_done() || monster.move_target.is_some()) {
                violations.push(format!("monster {id:?} is dead but still has a route"));
            }
            if !monster.is_alive() || !matches!(monster.state, AiState::Idle | AiState::Patrolling) {
                continue;
            }
            let heading_home = monster.move_target.is_some_and(|target| target.tile == monster.spawn_tile());
            if monster.outside_tether() && !heading_home {
                violations.push(format!("monster {id:?} strayed past its tether"));
            }
        }

        for quest in self.state.quests.quests() {
            if quest.rewards_claimed && !quest.completed {
                violations.push(format!("quest {} claimed before completion", quest.id));
            }
            if quest.completed
                && quest.def.kind != QuestType::Encounter
                && quest.progress < quest.def.target_count
            {
                violations.push(format!("quest {} completed at {}/{}", quest.id, quest.progress, quest.def.target_count));
            }
        }

        violations
    }
}

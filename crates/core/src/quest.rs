//! Quest bookkeeping: kill counting, encounter quests, and exactly-once reward claiming.
//! This module exists so quest rules can be exercised without a world.
//! It does not own reward payout; callers hand the returned bundle to the party.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::content::schema::QuestDef;
use crate::error::ActionError;
use crate::types::{QuestStatus, QuestType, RewardBundle};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub def: QuestDef,
    pub status: QuestStatus,
    pub progress: u32,
    pub completed: bool,
    pub rewards_claimed: bool,
}

impl Quest {
    fn new(id: &str, def: QuestDef) -> Self {
        Self {
            id: id.to_string(),
            def,
            status: QuestStatus::Active,
            progress: 0,
            completed: false,
            rewards_claimed: false,
        }
    }

    pub fn rewards(&self) -> RewardBundle {
        RewardBundle { gold: self.def.reward_gold, experience: self.def.reward_experience }
    }

    fn complete(&mut self) {
        self.status = QuestStatus::Completed;
        self.completed = true;
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuestManager {
    definitions: BTreeMap<String, QuestDef>,
    quests: BTreeMap<String, Quest>,
}

impl QuestManager {
    pub fn new(definitions: BTreeMap<String, QuestDef>) -> Self {
        Self { definitions, quests: BTreeMap::new() }
    }

    /// Activates every quest flagged as a starting quest; returns the ids activated.
    pub fn initialize_starting_quests(&mut self) -> Vec<String> {
        let mut activated = Vec::new();
        for (id, def) in &self.definitions {
            if def.is_starting_quest && !self.quests.contains_key(id) {
                self.quests.insert(id.clone(), Quest::new(id, def.clone()));
                activated.push(id.clone());
            }
        }
        activated
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.get(id)
    }

    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn active_encounter_ids(&self) -> Vec<String> {
        self.quests
            .values()
            .filter(|quest| quest.def.kind == QuestType::Encounter && quest.status == QuestStatus::Active)
            .map(|quest| quest.id.clone())
            .collect()
    }

    /// Counts a kill toward every active kill quest for `monster_key`; returns the quests
    /// this kill completed.
    pub fn on_monster_killed(&mut self, monster_key: &str) -> Vec<String> {
        let mut completed = Vec::new();
        for quest in self.quests.values_mut() {
            if quest.status != QuestStatus::Active
                || quest.def.kind != QuestType::Kill
                || quest.def.target_monster.as_deref() != Some(monster_key)
            {
                continue;
            }
            quest.progress = quest.progress.saturating_add(1);
            if quest.progress >= quest.def.target_count {
                quest.complete();
                info!(quest = %quest.id, "quest completed");
                completed.push(quest.id.clone());
            }
        }
        completed
    }

    /// Starts `id` from zero progress. A failed quest may be taken again; an active one may
    /// not, and a completed one stays completed so its rewards cannot be earned twice.
    pub fn activate(&mut self, id: &str) -> Result<(), ActionError> {
        let def = self.definitions.get(id).ok_or_else(|| ActionError::missing("quests", id))?;
        match self.quests.get(id).map(|quest| quest.status) {
            Some(QuestStatus::Active) => {
                return Err(ActionError::not_allowed(format!("quest {id} is already active")));
            }
            Some(QuestStatus::Completed) => {
                return Err(ActionError::not_allowed(format!("quest {id} is already completed")));
            }
            Some(QuestStatus::Failed) | None => {}
        }
        self.quests.insert(id.to_string(), Quest::new(id, def.clone()));
        Ok(())
    }

    /// Adds an active encounter quest; returns false when `id` already exists.
    pub fn create_encounter_quest(
        &mut self,
        id: &str,
        name: &str,
        description: &str,
        rewards: RewardBundle,
    ) -> bool {
        if self.quests.contains_key(id) {
            return false;
        }
        let def = QuestDef {
            kind: QuestType::Encounter,
            name: name.to_string(),
            description: description.to_string(),
            target_monster: None,
            target_count: 0,
            encounter_id: Some(id.to_string()),
            reward_gold: rewards.gold,
            reward_experience: rewards.experience,
            is_starting_quest: false,
            marker: None,
        };
        self.quests.insert(id.to_string(), Quest::new(id, def));
        true
    }

    /// Completes an encounter quest and claims its rewards in one step.
    pub fn complete_encounter_quest(&mut self, id: &str) -> Result<RewardBundle, ActionError> {
        let quest = self.quests.get_mut(id).ok_or(ActionError::UnknownEntity)?;
        if quest.def.kind != QuestType::Encounter {
            return Err(ActionError::not_allowed(format!("{id} is not an encounter")));
        }
        if quest.completed {
            return Err(ActionError::not_allowed(format!("{id} is already complete")));
        }
        quest.complete();
        quest.rewards_claimed = true;
        info!(quest = %id, "encounter cleared");
        Ok(quest.rewards())
    }

    pub fn claim_rewards(&mut self, id: &str) -> Result<RewardBundle, ActionError> {
        let quest = self.quests.get_mut(id).ok_or(ActionError::UnknownEntity)?;
        if !quest.completed {
            return Err(ActionError::not_allowed(format!("{id} is not complete")));
        }
        if quest.rewards_claimed {
            return Err(ActionError::not_allowed(format!("{id} rewards already claimed")));
        }
        quest.rewards_claimed = true;
        Ok(quest.rewards())
    }

    pub fn remove(&mut self, id: &str) -> Option<Quest> {
        self.quests.remove(id)
    }

    pub fn reset(&mut self) {
        self.quests.clear();
    }

    /// Re-applies a persisted quest record. Claimed is only honoured on completed quests.
    pub fn restore(
        &mut self,
        id: &str,
        status: QuestStatus,
        progress: u32,
        claimed: bool,
    ) -> Result<(), ActionError> {
        let def = match self.quests.get(id) {
            Some(quest) => quest.def.clone(),
            None => self.definitions.get(id).cloned().ok_or_else(|| ActionError::missing("quests", id))?,
        };
        let mut quest = Quest::new(id, def);
        quest.status = status;
        quest.progress = progress;
        quest.completed = status == QuestStatus::Completed;
        quest.rewards_claimed = claimed && quest.completed;
        self.quests.insert(id.to_string(), quest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;

    fn manager() -> QuestManager {
        let content = sample_content();
        QuestManager::new(content.quests().clone())
    }

    #[test]
    fn goblin_hunt_completes_on_the_fifth_kill() {
        let mut quests = manager();
        assert!(quests.initialize_starting_quests().contains(&"goblin_hunt".to_string()));
        for _ in 0..4 {
            assert!(quests.on_monster_killed("goblin").is_empty());
        }
        let hunt = quests.get("goblin_hunt").expect("hunt");
        assert_eq!((hunt.progress, hunt.status), (4, QuestStatus::Active));

        assert_eq!(quests.on_monster_killed("goblin"), vec!["goblin_hunt".to_string()]);
        assert_eq!(quests.get("goblin_hunt").map(|quest| quest.status), Some(QuestStatus::Completed));
        assert_eq!(
            quests.claim_rewards("goblin_hunt"),
            Ok(RewardBundle { gold: 50, experience: 100 })
        );
        assert!(matches!(quests.claim_rewards("goblin_hunt"), Err(ActionError::NotAllowed(_))));
    }

    #[test]
    fn non_starting_quests_wait_for_activation() {
        let mut quests = manager();
        quests.initialize_starting_quests();
        assert!(quests.get("dragon_slayer").is_none());
        quests.activate("dragon_slayer").expect("activate");
        assert!(matches!(quests.activate("dragon_slayer"), Err(ActionError::NotAllowed(_))));
        assert!(matches!(quests.activate("nope"), Err(ActionError::ConfigMissing { .. })));
    }

    #[test]
    fn failed_quests_can_be_taken_again_but_completed_ones_cannot() {
        let mut quests = manager();
        quests.restore("dragon_slayer", QuestStatus::Failed, 0, false).expect("restore failed");
        quests.activate("dragon_slayer").expect("retry a failed quest");
        assert_eq!(quests.get("dragon_slayer").map(|quest| quest.status), Some(QuestStatus::Active));

        quests.restore("goblin_hunt", QuestStatus::Completed, 5, false).expect("restore completed");
        assert!(matches!(quests.activate("goblin_hunt"), Err(ActionError::NotAllowed(_))));
        assert_eq!(quests.get("goblin_hunt").map(|quest| quest.progress), Some(5));
    }

    #[test]
    fn encounter_quests_auto_claim_once() {
        let mut quests = manager();
        let rewards = RewardBundle { gold: 30, experience: 60 };
        assert!(quests.create_encounter_quest("encounter_hermit", "Ambush", "", rewards));
        assert!(!quests.create_encounter_quest("encounter_hermit", "Ambush", "", rewards));
        assert_eq!(quests.complete_encounter_quest("encounter_hermit"), Ok(rewards));
        assert!(quests.complete_encounter_quest("encounter_hermit").is_err());
        assert!(quests.claim_rewards("encounter_hermit").is_err());
    }

    #[test]
    fn kill_quests_ignore_encounter_completion() {
        let mut quests = manager();
        quests.initialize_starting_quests();
        assert!(quests.complete_encounter_quest("goblin_hunt").is_err());
        assert_eq!(quests.get("goblin_hunt").map(|quest| quest.completed), Some(false));
    }

    #[test]
    fn restore_never_claims_an_incomplete_quest() {
        let mut quests = manager();
        quests.restore("goblin_hunt", QuestStatus::Active, 3, true).expect("restore");
        let hunt = quests.get("goblin_hunt").expect("hunt");
        assert_eq!(hunt.progress, 3);
        assert!(!hunt.rewards_claimed);
        quests.reset();
        assert!(quests.get("goblin_hunt").is_none());
    }
}

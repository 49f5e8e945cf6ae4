//! Death rewards: experience, gold and loot table rolls.

use crate::content::schema::LootEntry;

use super::*;

/// Rolls every entry of `table` independently, in table order, and returns the item keys
/// that dropped.
pub fn roll_loot(table: &[LootEntry], dice: &mut Dice) -> Vec<String> {
    let mut drops = Vec::new();
    for entry in table {
        if dice.unit() < entry.chance {
            drops.push(entry.item.clone());
        }
    }
    drops
}

impl World {
    /// Pays out each monster that died since the last pass, exactly once, and returns the
    /// content keys of the monsters killed.
    pub(super) fn process_deaths(&mut self, events: &mut Vec<WorldEvent>) -> Vec<String> {
        let content = Arc::clone(&self.content);
        let fallen: Vec<MonsterId> = self
            .state
            .monsters
            .iter()
            .filter(|(_, monster)| !monster.is_alive() && !monster.death_processed)
            .map(|(id, _)| id)
            .collect();

        let mut killed = Vec::with_capacity(fallen.len());
        for id in fallen {
            let Some(monster) = self.state.monsters.get_mut(id) else {
                continue;
            };
            monster.death_processed = true;
            let key = monster.key.clone();
            let experience = monster.experience;
            let gold = monster.roll_gold(&mut self.dice);

            self.award_experience(experience, events);
            self.award_gold(gold, events);
            for item_key in roll_loot(content.loot_table(&key), &mut self.dice) {
                let Some(item) = content.instantiate(&item_key) else {
                    warn!(monster = %key, item = %item_key, "loot table names an unknown item");
                    continue;
                };
                match self.state.party.add_item(item, content.tuning()) {
                    Ok(()) => events.push(WorldEvent::LootDropped { item: item_key }),
                    Err(err) => warn!(monster = %key, item = %item_key, %err, "loot left behind"),
                }
            }
            killed.push(key);
        }
        killed
    }
}

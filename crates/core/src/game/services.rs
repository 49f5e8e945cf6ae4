//! NPC interaction: visits, quest hand-outs, healing, trading and spell teaching.
//! This module exists so every service validates in full before it touches state.
//! It does not own encounter spawning.

use crate::content::schema::NpcDef;
use crate::npc::offers;

use super::*;

impl World {
    /// The NPC and its definition, provided the party is close enough to talk.
    fn npc_in_reach<'c>(&self, content: &'c ContentBundle, npc: NpcId) -> Result<(&Npc, &'c NpcDef), ActionError> {
        let instance = self.state.npcs.get(npc).ok_or(ActionError::UnknownEntity)?;
        if !instance.in_reach(self.state.party.position) {
            return Err(ActionError::not_allowed(format!("{} is out of reach", instance.name)));
        }
        let def = content.npc(&instance.key).ok_or_else(|| ActionError::missing("npcs", &instance.key))?;
        Ok((instance, def))
    }

    pub(super) fn interact(&mut self, npc: NpcId, events: &mut Vec<WorldEvent>) -> Result<(), ActionError> {
        let content = Arc::clone(&self.content);
        let (instance, def) = self.npc_in_reach(&content, npc)?;
        let first_visit = !instance.visited;
        let encounter_blocked = instance.encounter_started;
        let heals = offers(def, NpcService::Healing) && self.state.party.is_hurt();
        if heals && self.state.party.gold < def.healing_cost {
            return Err(ActionError::InsufficientResources(Resource::Gold));
        }

        if let Some(instance) = self.state.npcs.get_mut(npc) {
            instance.visited = true;
        }
        events.push(WorldEvent::NpcVisited { npc });

        for quest in &def.quests {
            if self.state.quests.activate(quest).is_ok() {
                info!(npc = %def.name, quest = %quest, "quest accepted");
                events.push(WorldEvent::QuestActivated { quest: quest.clone() });
            }
        }

        if heals {
            self.state.party.spend_gold(def.healing_cost)?;
            self.state.party.heal_all();
            events.push(WorldEvent::PartyHealed { npc, cost: def.healing_cost });
        }

        if let Some(encounter) = &def.encounter
            && !encounter_blocked
            && (first_visit || !encounter.first_visit_only)
        {
            self.start_encounter(npc, encounter, events);
        }
        Ok(())
    }

    pub(super) fn buy(&mut self, npc: NpcId, offer: usize) -> Result<(), ActionError> {
        let content = Arc::clone(&self.content);
        let (instance, def) = self.npc_in_reach(&content, npc)?;
        let merchant = def
            .merchant
            .as_ref()
            .ok_or_else(|| ActionError::not_allowed(format!("{} does not trade", def.name)))?;
        let entry = merchant.stock.get(offer).ok_or(ActionError::UnknownEntity)?;
        if instance.stock.get(offer).copied().unwrap_or(0) == 0 {
            return Err(ActionError::InsufficientResources(Resource::Stock));
        }
        if self.state.party.gold < entry.cost {
            return Err(ActionError::InsufficientResources(Resource::Gold));
        }
        if !self.state.party.has_room(content.tuning()) {
            return Err(ActionError::InsufficientResources(Resource::InventorySpace));
        }
        let item = content.instantiate(&entry.item).ok_or_else(|| ActionError::missing("items", &entry.item))?;

        self.state.party.spend_gold(entry.cost)?;
        if let Some(remaining) = self.state.npcs.get_mut(npc).and_then(|instance| instance.stock.get_mut(offer)) {
            *remaining -= 1;
        }
        debug!(npc = %def.name, item = %entry.item, cost = entry.cost, "bought");
        self.state.party.add_item(item, content.tuning())
    }

    /// Sells inventory `slot` for half its value.
    pub(super) fn sell(&mut self, npc: NpcId, slot: usize, events: &mut Vec<WorldEvent>) -> Result<(), ActionError> {
        let content = Arc::clone(&self.content);
        let (_, def) = self.npc_in_reach(&content, npc)?;
        if !def.merchant.as_ref().is_some_and(|merchant| merchant.sells_enabled) {
            return Err(ActionError::not_allowed(format!("{} does not buy", def.name)));
        }
        let item = self.state.party.inventory.get(slot).ok_or(ActionError::UnknownEntity)?;
        if item.kind == ItemKind::Quest {
            return Err(ActionError::not_allowed(format!("{} cannot be sold", item.name)));
        }
        let price = u32::try_from(item.value().max(0)).unwrap_or(0) / 2;

        let item = self.state.party.inventory.remove(slot);
        debug!(npc = %def.name, item = %item.key, price, "sold");
        self.award_gold(price, events);
        Ok(())
    }

    pub(super) fn teach_spell(
        &mut self,
        npc: NpcId,
        member: usize,
        spell: &str,
    ) -> Result<(), ActionError> {
        let content = Arc::clone(&self.content);
        let (_, def) = self.npc_in_reach(&content, npc)?;
        let offer = def
            .spells
            .iter()
            .find(|offer| offer.spell == spell)
            .ok_or_else(|| ActionError::not_allowed(format!("{} does not teach {spell}", def.name)))?;
        let spell_def = content.spell(spell).ok_or_else(|| ActionError::missing("spells", spell))?;
        let character = self.state.party.member(member)?;
        if !character.schools.contains_key(&spell_def.school) {
            return Err(ActionError::not_allowed(format!(
                "{} cannot study {:?} magic",
                character.name, spell_def.school
            )));
        }
        if character.knows_spell(spell) {
            return Err(ActionError::not_allowed(format!("{} already knows {spell}", character.name)));
        }
        if self.state.party.gold < offer.cost {
            return Err(ActionError::InsufficientResources(Resource::Gold));
        }

        self.state.party.spend_gold(offer.cost)?;
        info!(member, spell, cost = offer.cost, "spell learned");
        self.state.party.members[member].learn_spell(spell, spell_def.school)
    }
}

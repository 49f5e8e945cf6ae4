//! Consumables, pickups and world item respawn.
//! This module exists to keep inventory-facing actions out of the combat code.
//! It does not own equipment rules; those belong to `Party` and `Character`.

use super::*;

impl World {
    /// Uses the consumable in inventory `slot` on `member`; the item is spent on success.
    pub(super) fn use_item(
        &mut self,
        member: usize,
        slot: usize,
        events: &mut Vec<WorldEvent>,
    ) -> Result<(), ActionError> {
        let item = self.state.party.inventory.get(slot).ok_or(ActionError::UnknownEntity)?;
        if item.kind != ItemKind::Consumable {
            return Err(ActionError::not_allowed(format!("{} cannot be used", item.name)));
        }
        let revive = item.flag("revive");
        let full_heal = item.flag("full_heal");
        let opens_map = item.flag("opens_map");
        let heal_base = item.attr("heal_base");
        let divisor = item.attr("heal_endurance_divisor");
        if !revive && !full_heal && !opens_map && heal_base <= 0 {
            return Err(ActionError::not_allowed(format!("{} does nothing", item.name)));
        }
        let character = self.state.party.member(member)?;
        if character.is_dead() && !revive {
            return Err(ActionError::not_allowed(format!("{} is dead", character.name)));
        }

        let item = self.state.party.inventory.remove(slot);
        let character = &mut self.state.party.members[member];
        if revive {
            for condition in [Condition::Dead, Condition::Unconscious] {
                if character.remove_condition(condition) {
                    events.push(WorldEvent::ConditionCleared { member, condition });
                }
            }
            character.hp = character.hp.max(1);
        }
        if full_heal {
            character.heal(character.max_hp);
        } else if heal_base > 0 {
            let bonus = if divisor > 0 { character.effective(Attribute::Endurance) / divisor } else { 0 };
            let was_unconscious = character.has_condition(Condition::Unconscious);
            character.heal(heal_base + bonus);
            if was_unconscious && !character.has_condition(Condition::Unconscious) {
                events.push(WorldEvent::ConditionCleared { member, condition: Condition::Unconscious });
            }
        }
        if opens_map {
            events.push(WorldEvent::MapRevealed);
        }
        events.push(WorldEvent::ItemConsumed { member, key: item.key });
        Ok(())
    }

    /// Takes every active world item within one tile of the party, or nothing at all when
    /// they would not all fit.
    pub(super) fn pick_up(&mut self, events: &mut Vec<WorldEvent>) -> Result<(), ActionError> {
        let position = self.state.party.position;
        let in_reach: Vec<WorldItemId> = self
            .state
            .world_items
            .iter()
            .filter(|(_, world_item)| world_item.active && world_item.position.distance(position) <= TILE_SIZE)
            .map(|(id, _)| id)
            .collect();
        if in_reach.is_empty() {
            return Err(ActionError::not_allowed("nothing to pick up"));
        }
        let capacity = self.content.tuning().inventory_capacity;
        if self.state.party.inventory.len() + in_reach.len() > capacity {
            return Err(ActionError::InsufficientResources(Resource::InventorySpace));
        }

        for id in in_reach {
            let Some(world_item) = self.state.world_items.get_mut(id) else {
                continue;
            };
            let item = world_item.item.clone();
            match world_item.respawn_ticks {
                Some(ticks) => {
                    world_item.active = false;
                    world_item.respawn_timer = ticks;
                }
                None => {
                    self.state.world_items.remove(id);
                }
            }
            events.push(WorldEvent::ItemPickedUp { item: id, key: item.key.clone() });
            self.state.party.inventory.push(item);
        }
        Ok(())
    }

    pub(super) fn tick_world_items(&mut self, events: &mut Vec<WorldEvent>) {
        for (id, world_item) in &mut self.state.world_items {
            if world_item.active {
                continue;
            }
            world_item.respawn_timer = world_item.respawn_timer.saturating_sub(1);
            if world_item.respawn_timer == 0 {
                world_item.active = true;
                events.push(WorldEvent::WorldItemRespawned { item: id });
            }
        }
    }
}

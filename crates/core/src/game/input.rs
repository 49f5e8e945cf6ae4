//! Routes host inputs to the world operations they name.

use super::*;

impl World {
    pub(super) fn apply_input(
        &mut self,
        input: &InputEvent,
        mode: SimMode,
        events: &mut Vec<WorldEvent>,
    ) -> Result<(), ActionError> {
        match input {
            InputEvent::Move { dx, dy } => self.move_party(*dx, *dy),
            InputEvent::Turn { facing } => {
                self.state.party.facing = *facing;
                Ok(())
            }
            InputEvent::MeleeAttack { member } => self.melee_attack(*member, mode, events),
            InputEvent::CastSpell { member, spell, target } => {
                self.cast_spell(*member, spell.as_deref(), *target, events)
            }
            InputEvent::UseItem { member, slot } => self.use_item(*member, *slot, events),
            InputEvent::Equip { member, slot } => {
                self.state.party.equip(*member, *slot, self.content.tuning())
            }
            InputEvent::Unequip { member, slot } => {
                self.state.party.unequip(*member, *slot, self.content.tuning())
            }
            InputEvent::PickUp => self.pick_up(events),
            InputEvent::Interact { npc } => self.interact(*npc, events),
            InputEvent::Buy { npc, offer } => self.buy(*npc, *offer),
            InputEvent::Sell { npc, slot } => self.sell(*npc, *slot, events),
            InputEvent::LearnSpell { npc, member, spell } => self.teach_spell(*npc, *member, spell),
            InputEvent::ClaimQuest { quest } => {
                let rewards = self.state.quests.claim_rewards(quest)?;
                self.award_gold(rewards.gold, events);
                self.award_experience(rewards.experience, events);
                events.push(WorldEvent::QuestRewardsClaimed { quest: quest.clone(), rewards });
                Ok(())
            }
            InputEvent::AllocateStat { member, attribute } => {
                self.state.party.member_mut(*member)?.allocate_stat(*attribute, self.content.tuning())
            }
            InputEvent::ChooseLevelUp { member, choice } => {
                let content = Arc::clone(&self.content);
                let character = self.state.party.member_mut(*member)?;
                let picked = content
                    .level_up()
                    .choice(character.class, choice)
                    .ok_or_else(|| ActionError::missing("level_up", choice))?;
                character.apply_level_choice(picked, &content)
            }
            InputEvent::Rest => Ok(()),
        }
    }

    /// Steps the party one `party_step` along (dx, dy). A zero vector is a no-op.
    fn move_party(&mut self, dx: f64, dy: f64) -> Result<(), ActionError> {
        let Some(direction) = Vec2::new(dx, dy).normalized() else {
            return Ok(());
        };
        if self.state.party.is_wiped_out() {
            return Err(ActionError::not_allowed("nobody is left standing"));
        }
        let destination = self.state.party.position + direction * self.content.tuning().party_step;
        let habitat = self.state.party.habitat();
        let oracle = CollisionOracle::new(&self.state.grid, self.state.solid_boxes());
        let mobility = Mobility { habitat: Some(&habitat), flying: false };
        if !oracle.can_move_to_with_habitat(EntityRef::Party, destination, mobility) {
            return Err(ActionError::not_allowed("the way is blocked"));
        }
        self.state.party.position = destination;
        Ok(())
    }
}

//! The per-tick phase sequence.

use super::*;

impl World {
    /// Applies `inputs` and advances the world by exactly one tick.
    /// Refused inputs are reported in the returned report; the tick itself never fails.
    pub fn step(&mut self, inputs: &[InputEvent], mode: SimMode) -> TickReport {
        self.mode = mode;
        self.tick += 1;
        let mut events = Vec::new();
        let mut action_errors = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            if let Err(err) = self.apply_input(input, mode, &mut events) {
                debug!(tick = self.tick, index, %err, "input refused");
                action_errors.push((index, err));
            }
        }
        let party_acted = inputs.iter().any(InputEvent::is_party_action);

        let tuning = self.content.tuning();
        let changes = self.state.party.update(mode, party_acted, tuning);
        self.record_condition_changes(changes, &mut events);

        if mode == SimMode::RealTime {
            self.tick_world_items(&mut events);
            self.run_monster_ai(&mut events);
            self.advance_projectiles(&mut events);
        }

        self.resolve_hits(mode, &mut events);
        let killed = self.process_deaths(&mut events);
        self.notify_quests(&killed, &mut events);
        self.update_encounters(&mut events);

        self.log.extend(events.iter().cloned());
        TickReport { tick: self.tick, events, action_errors }
    }

    fn notify_quests(&mut self, killed: &[String], events: &mut Vec<WorldEvent>) {
        for key in killed {
            for quest in self.state.quests.on_monster_killed(key) {
                events.push(WorldEvent::QuestCompleted { quest });
            }
        }
    }
}

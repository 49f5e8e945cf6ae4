//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay execution or journal persistence policies.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::*;

fn write_str(hasher: &mut Xxh3, value: &str) {
    hasher.write_usize(value.len());
    hasher.write(value.as_bytes());
}

fn write_vec2(hasher: &mut Xxh3, value: Vec2) {
    hasher.write_u64(value.x.to_bits());
    hasher.write_u64(value.y.to_bits());
}

impl World {
    /// Hash over everything a replay must reproduce: clock, party, monsters, missiles,
    /// quests and world items, all visited in id order.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_u8(self.mode as u8);

        let party = &self.state.party;
        write_vec2(&mut hasher, party.position);
        hasher.write_u64(party.facing.to_bits());
        hasher.write_u32(party.gold);
        hasher.write_u32(party.food);
        for item in &party.inventory {
            write_str(&mut hasher, &item.key);
        }
        for member in &party.members {
            hasher.write_i32(member.hp);
            hasher.write_i32(member.sp);
            hasher.write_u32(member.level);
            hasher.write_u64(member.experience);
            for condition in &member.conditions {
                hasher.write_u8(*condition as u8);
            }
            for (slot, item) in &member.equipment {
                hasher.write_i32(slot.code());
                write_str(&mut hasher, &item.key);
            }
        }

        for (id, monster) in &self.state.monsters {
            hasher.write_u64(id.data().as_ffi());
            write_vec2(&mut hasher, monster.position);
            hasher.write_i32(monster.hp);
            hasher.write_u8(monster.state as u8);
            hasher.write_u32(monster.attack_count);
        }

        for (id, projectile) in &self.state.projectiles {
            hasher.write_u64(id.data().as_ffi());
            write_vec2(&mut hasher, projectile.position);
            hasher.write_i64(projectile.remaining_ticks);
            hasher.write_u8(u8::from(projectile.active));
        }

        for quest in self.state.quests.quests() {
            write_str(&mut hasher, &quest.id);
            hasher.write_u8(quest.status as u8);
            hasher.write_u32(quest.progress);
            hasher.write_u8(u8::from(quest.rewards_claimed));
        }

        for (id, world_item) in &self.state.world_items {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_u8(u8::from(world_item.active));
            hasher.write_u32(world_item.respawn_timer);
        }
        hasher.finish()
    }
}

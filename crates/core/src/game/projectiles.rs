//! Projectile flight and impact detection.

use super::*;

impl World {
    pub(super) fn spawn_projectile(&mut self, projectile: Projectile, events: &mut Vec<WorldEvent>) -> ProjectileId {
        let owner = projectile.owner;
        let id = self.state.projectiles.insert(projectile);
        events.push(WorldEvent::ProjectileSpawned { projectile: id, owner });
        id
    }

    /// Drops last tick's spent projectiles, then moves the rest. Party missiles strike the
    /// first living monster in range (by id); monster missiles strike a random standing
    /// member once they reach the party.
    pub(super) fn advance_projectiles(&mut self, events: &mut Vec<WorldEvent>) {
        self.state.projectiles.retain(|_, projectile| projectile.active);
        let ids: Vec<ProjectileId> = self.state.projectiles.keys().collect();
        for id in ids {
            let Some(projectile) = self.state.projectiles.get_mut(id) else {
                continue;
            };
            projectile.advance(&self.state.grid);
            if !projectile.active {
                events.push(WorldEvent::ProjectileExpired { projectile: id });
                continue;
            }

            let target = match projectile.owner {
                ProjectileOwner::Party { .. } => self
                    .state
                    .monsters
                    .iter()
                    .find(|(_, monster)| monster.is_alive() && projectile.hits(monster.position))
                    .map(|(monster, _)| HitTarget::Monster(monster)),
                ProjectileOwner::Monster(_) => {
                    if projectile.hits(self.state.party.position) {
                        let standing = self.state.party.standing_member_indices();
                        self.dice.pick_index(standing.len()).map(|index| HitTarget::Member(standing[index]))
                    } else {
                        None
                    }
                }
            };
            let Some(target) = target else {
                continue;
            };
            projectile.active = false;
            self.pending_hits.push(PendingHit {
                target,
                damage: projectile.damage,
                damage_type: projectile.damage_type,
                status: projectile.status,
                delay_ticks: 0,
            });
            events.push(WorldEvent::ProjectileExpired { projectile: id });
        }
    }
}

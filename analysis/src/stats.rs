use std::collections::HashMap;

use common::demo_analysis::UnnecessaryStats;

use crate::events::UserId;

/// Running per-player tallies for one replay.
///
/// Every operation only adds to the counters, nothing is ever reset.
#[derive(Debug, Default)]
pub struct StatAccumulator {
    players: HashMap<UserId, UnnecessaryStats>,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counters for the player, creating zeroed ones on first access.
    pub fn get(&mut self, player: UserId) -> &mut UnnecessaryStats {
        self.players.entry(player).or_default()
    }

    pub fn peek(&self, player: UserId) -> Option<&UnnecessaryStats> {
        self.players.get(&player)
    }

    pub fn take(&mut self, player: UserId) -> Option<UnnecessaryStats> {
        self.players.remove(&player)
    }

    pub fn jump(&mut self, player: UserId) {
        self.get(player).jumps += 1;
    }

    pub fn fall_damage(&mut self, player: UserId, damage: u32) {
        let stats = self.get(player);
        stats.fall_damage = stats.fall_damage.saturating_add(damage);
    }

    pub fn weapon_fire(&mut self, player: UserId, weapon: &str) {
        *self.get(player).weapon_fire.entry(weapon.to_owned()).or_default() += 1;
    }

    pub fn damage_taken(&mut self, player: UserId, weapon: &str, damage: u32) {
        let taken = self.get(player).damage_taken.entry(weapon.to_owned()).or_default();
        *taken = taken.saturating_add(damage);
    }

    pub fn blinded(&mut self, player: UserId, duration: f32) {
        let stats = self.get(player);
        stats.blinded += 1;
        stats.blind_duration += duration.max(0.0);
    }

    pub fn item_pickup(&mut self, player: UserId, item: &str, silent: bool) {
        let pickups = self.get(player).item_pickups.entry(item.to_owned()).or_default();
        pickups.count += 1;
        if silent {
            pickups.silent += 1;
        }
    }

    pub fn reload(&mut self, player: UserId) {
        self.get(player).reloads += 1;
    }

    pub fn footstep(&mut self, player: UserId) {
        self.get(player).footsteps += 1;
    }

    pub fn bomb_planted(&mut self, player: UserId) {
        self.get(player).bomb_plants += 1;
    }
}

/// Adds all counters of `other` onto `target`.
///
/// Used when a player showed up under more than one in-replay id.
pub fn absorb(target: &mut UnnecessaryStats, other: UnnecessaryStats) {
    target.jumps += other.jumps;
    target.fall_damage = target.fall_damage.saturating_add(other.fall_damage);
    target.blinded += other.blinded;
    target.blind_duration += other.blind_duration;
    target.reloads += other.reloads;
    target.footsteps += other.footsteps;
    target.bomb_plants += other.bomb_plants;

    for (weapon, count) in other.weapon_fire {
        *target.weapon_fire.entry(weapon).or_default() += count;
    }
    for (weapon, damage) in other.damage_taken {
        let taken = target.damage_taken.entry(weapon).or_default();
        *taken = taken.saturating_add(damage);
    }
    for (item, pickups) in other.item_pickups {
        let entry = target.item_pickups.entry(item).or_default();
        entry.count += pickups.count;
        entry.silent += pickups.silent;
    }

    target.heatmap.extend(other.heatmap);
}

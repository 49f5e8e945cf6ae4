//! Scalar tuning knobs read from `tuning.toml`. Every field has a default so a partial or
//! empty file is valid.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Tuning {
    pub tick_rate: u32,
    pub endurance_hp_multiplier: i32,
    pub hp_level_multiplier: i32,
    pub sp_level_multiplier: i32,
    pub sp_regen_interval_ticks: u32,
    pub inventory_capacity: usize,
    pub stat_points_per_level: u32,
    /// Party displacement per `Move` input, in pixels.
    pub party_step: f64,
    pub ai: AiTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_rate: 120,
            endurance_hp_multiplier: 3,
            hp_level_multiplier: 5,
            sp_level_multiplier: 3,
            sp_regen_interval_ticks: 600,
            inventory_capacity: 40,
            stat_points_per_level: 5,
            party_step: 8.0,
            ai: AiTuning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AiTuning {
    /// Ticks between replans while a path is still usable.
    pub path_check_frequency: u32,
    pub flee_duration_ticks: u32,
    pub flee_vision_distance: f64,
    pub normal_speed_multiplier: f64,
    pub flee_speed_multiplier: f64,
    pub idle_patrol_delay_ticks: u32,
    /// Consecutive blocked steps before a monster runs the unstuck search.
    pub stuck_limit: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            path_check_frequency: 30,
            flee_duration_ticks: 300,
            flee_vision_distance: 384.0,
            normal_speed_multiplier: 0.5,
            flee_speed_multiplier: 1.5,
            idle_patrol_delay_ticks: 120,
            stuck_limit: 30,
        }
    }
}

impl Tuning {
    pub fn from_toml(source: &str) -> Result<Self, LoadError> {
        let tuning: Tuning = toml::from_str(source).map_err(|source| LoadError::Tuning { source })?;
        tuning.validate()?;
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.tick_rate == 0 {
            return Err(LoadError::invalid("tuning", "tick_rate", "must be positive"));
        }
        if self.sp_regen_interval_ticks == 0 {
            return Err(LoadError::invalid("tuning", "sp_regen_interval_ticks", "must be positive"));
        }
        if self.party_step <= 0.0 {
            return Err(LoadError::invalid("tuning", "party_step", "must be positive"));
        }
        Ok(())
    }

    /// Converts a base per-frame speed authored at 60 fps to this tick rate.
    pub fn per_tick_speed(&self, base_speed: f64) -> f64 {
        base_speed * 60.0 / f64::from(self.tick_rate)
    }

    pub fn seconds_to_ticks(&self, seconds: u32) -> u32 {
        seconds.saturating_mul(self.tick_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let tuning = Tuning::from_toml("").expect("empty tuning parses");
        assert_eq!(tuning, Tuning::default());
        assert_eq!(tuning.sp_regen_interval_ticks, 600);
    }

    #[test]
    fn partial_ai_table_keeps_other_defaults() {
        let tuning = Tuning::from_toml("tick_rate = 60\n[ai]\nstuck_limit = 5\n")
            .expect("partial tuning parses");
        assert_eq!(tuning.tick_rate, 60);
        assert_eq!(tuning.ai.stuck_limit, 5);
        assert_eq!(tuning.ai.path_check_frequency, 30);
        assert!((tuning.per_tick_speed(1.8) - 1.8).abs() < 1e-9);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let err = Tuning::from_toml("tick_rate = 0").expect_err("zero tick rate");
        assert!(matches!(err, LoadError::ConfigInvalid { key, .. } if key == "tick_rate"));
    }
}

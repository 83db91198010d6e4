//! Balance parameters for a run.
//!
//! Everything here is plain data so deployments can ship alternate balance
//! as JSON. Values are validated once at the configuration boundary; the sim
//! itself trusts whatever [`Tuning`] it is handed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("enemy shot cooldown range is empty ({min_ms}..{max_ms})")]
    EmptyCooldownRange { min_ms: f64, max_ms: f64 },
    #[error("spawn interval floor {floor_ms}ms exceeds the starting interval {start_ms}ms")]
    FloorAboveStart { floor_ms: f64, start_ms: f64 },
    #[error("malformed tuning json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gameplay balance knobs. [`Tuning::default`] is the shipped balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Movement (world units per second) ===
    pub player_speed: f32,
    pub bullet_speed: f32,
    pub enemy_base_speed: f32,
    /// Fractional speed gain per level: descent = base * (1 + scale * level).
    pub enemy_speed_level_scale: f32,

    // === Fire cadence (ms) ===
    pub player_fire_cooldown_ms: f64,
    pub enemy_shot_cooldown_min_ms: f64,
    pub enemy_shot_cooldown_max_ms: f64,

    // === Spawn cadence (ms) ===
    pub spawn_interval_start_ms: f64,
    pub spawn_interval_step_ms: f64,
    pub spawn_interval_floor_ms: f64,

    // === Combat ===
    pub ram_damage: i32,
    pub bullet_damage: i32,
    /// Kill score is this value times the current level.
    pub score_per_kill: u32,

    // === Collision radii (world units) ===
    pub player_radius: f32,
    pub enemy_radius: f32,
    pub bullet_radius: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 9.0,
            bullet_speed: 18.0,
            enemy_base_speed: 3.0,
            enemy_speed_level_scale: 0.1,

            player_fire_cooldown_ms: 200.0,
            enemy_shot_cooldown_min_ms: 2000.0,
            enemy_shot_cooldown_max_ms: 3000.0,

            spawn_interval_start_ms: 1000.0,
            spawn_interval_step_ms: 50.0,
            spawn_interval_floor_ms: 300.0,

            ram_damage: 20,
            bullet_damage: 10,
            score_per_kill: 10,

            player_radius: 0.3,
            enemy_radius: 0.3,
            bullet_radius: 0.2,
        }
    }
}

impl Tuning {
    /// Parses and validates tuning from JSON. Unknown fields are ignored and
    /// missing ones fall back to the default balance.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Rejects parameter sets the sim cannot run sensibly: non-positive
    /// speeds, radii or intervals, negative cooldowns or damage, an empty
    /// enemy cooldown range, or a spawn floor above the starting interval.
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive_f32 = [
            ("player_speed", self.player_speed),
            ("bullet_speed", self.bullet_speed),
            ("enemy_base_speed", self.enemy_base_speed),
            ("player_radius", self.player_radius),
            ("enemy_radius", self.enemy_radius),
            ("bullet_radius", self.bullet_radius),
        ];
        for (field, value) in positive_f32 {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::NotPositive {
                    field,
                    value: f64::from(value),
                });
            }
        }

        let positive_ms = [
            ("spawn_interval_start_ms", self.spawn_interval_start_ms),
            ("spawn_interval_step_ms", self.spawn_interval_step_ms),
            ("spawn_interval_floor_ms", self.spawn_interval_floor_ms),
        ];
        for (field, value) in positive_ms {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("player_fire_cooldown_ms", self.player_fire_cooldown_ms),
            ("enemy_shot_cooldown_min_ms", self.enemy_shot_cooldown_min_ms),
            ("enemy_speed_level_scale", f64::from(self.enemy_speed_level_scale)),
            ("ram_damage", f64::from(self.ram_damage)),
            ("bullet_damage", f64::from(self.bullet_damage)),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }

        if self.enemy_shot_cooldown_max_ms <= self.enemy_shot_cooldown_min_ms {
            return Err(TuningError::EmptyCooldownRange {
                min_ms: self.enemy_shot_cooldown_min_ms,
                max_ms: self.enemy_shot_cooldown_max_ms,
            });
        }
        if self.spawn_interval_floor_ms > self.spawn_interval_start_ms {
            return Err(TuningError::FloorAboveStart {
                floor_ms: self.spawn_interval_floor_ms,
                start_ms: self.spawn_interval_start_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_balance_validates() {
        Tuning::default().validate().expect("default tuning");
    }

    #[test]
    fn negative_cooldown_is_rejected() {
        let tuning = Tuning {
            player_fire_cooldown_ms: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Negative {
                field: "player_fire_cooldown_ms",
                ..
            })
        ));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let tuning = Tuning {
            bullet_speed: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                field: "bullet_speed",
                ..
            })
        ));
    }

    #[test]
    fn nan_speed_is_rejected() {
        let tuning = Tuning {
            player_speed: f32::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn inverted_cooldown_range_is_rejected() {
        let tuning = Tuning {
            enemy_shot_cooldown_min_ms: 3000.0,
            enemy_shot_cooldown_max_ms: 2000.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::EmptyCooldownRange { .. })
        ));
    }

    #[test]
    fn floor_above_start_is_rejected() {
        let tuning = Tuning {
            spawn_interval_start_ms: 200.0,
            spawn_interval_floor_ms: 300.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::FloorAboveStart { .. })
        ));
    }

    #[test]
    fn json_round_trips() {
        let tuning = Tuning {
            player_speed: 12.0,
            score_per_kill: 25,
            ..Default::default()
        };
        let json = serde_json::to_string(&tuning).unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back, tuning);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let tuning = Tuning::from_json(r#"{"player_speed": 4.5}"#).unwrap();
        assert_eq!(tuning.player_speed, 4.5);
        assert_eq!(tuning.bullet_speed, 18.0);
    }

    #[test]
    fn invalid_json_and_invalid_values_both_fail() {
        assert!(matches!(
            Tuning::from_json("{nope"),
            Err(TuningError::Json(_))
        ));
        assert!(Tuning::from_json(r#"{"enemy_radius": -0.3}"#).is_err());
    }
}

//! Tunable combat constants.
//!
//! Loaded from RON by hosts; every field has a default so a partial file
//! (or an empty `()`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};
use crate::weapons::{ENERGY_MAX_RANGE, TORPEDO_MAX_RANGE};

fn default_energy_hit_chance() -> f64 {
    0.85
}

fn default_torpedo_hit_chance() -> f64 {
    0.75
}

fn default_tactical_hit_weight() -> f64 {
    0.3
}

fn default_tactical_damage_weight() -> f64 {
    0.5
}

fn default_max_engagement_range() -> u32 {
    13
}

fn default_energy_range_cap() -> u32 {
    ENERGY_MAX_RANGE
}

fn default_torpedo_range_cap() -> u32 {
    TORPEDO_MAX_RANGE
}

fn default_priority_multipliers() -> [f64; 3] {
    [1.0, 0.75, 0.5]
}

fn default_field_repair_amount() -> f64 {
    10.0
}

fn default_ai_search_depth() -> u32 {
    4
}

/// Combat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Base chance for an energy weapon to hit.
    #[serde(default = "default_energy_hit_chance")]
    pub energy_hit_chance: f64,
    /// Base chance for a torpedo to hit.
    #[serde(default = "default_torpedo_hit_chance")]
    pub torpedo_hit_chance: f64,
    /// Hit chance gained per point of tactical officer bonus.
    #[serde(default = "default_tactical_hit_weight")]
    pub tactical_hit_weight: f64,
    /// Damage gained per point of tactical officer bonus.
    #[serde(default = "default_tactical_damage_weight")]
    pub tactical_damage_weight: f64,
    /// Targets beyond this many hexes cannot be engaged at all.
    #[serde(default = "default_max_engagement_range")]
    pub max_engagement_range: u32,
    /// Hard range cap for energy weapons.
    #[serde(default = "default_energy_range_cap")]
    pub energy_range_cap: u32,
    /// Hard range cap for torpedoes.
    #[serde(default = "default_torpedo_range_cap")]
    pub torpedo_range_cap: u32,
    /// Accuracy multiplier for primary, secondary and tertiary targets.
    #[serde(default = "default_priority_multipliers")]
    pub priority_multipliers: [f64; 3],
    /// Health restored by one Repair-phase action before efficiency.
    #[serde(default = "default_field_repair_amount")]
    pub field_repair_amount: f64,
    /// Longest maneuver sequence the AI considers in one activation.
    #[serde(default = "default_ai_search_depth")]
    pub ai_search_depth: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            energy_hit_chance: default_energy_hit_chance(),
            torpedo_hit_chance: default_torpedo_hit_chance(),
            tactical_hit_weight: default_tactical_hit_weight(),
            tactical_damage_weight: default_tactical_damage_weight(),
            max_engagement_range: default_max_engagement_range(),
            energy_range_cap: default_energy_range_cap(),
            torpedo_range_cap: default_torpedo_range_cap(),
            priority_multipliers: default_priority_multipliers(),
            field_repair_amount: default_field_repair_amount(),
            ai_search_depth: default_ai_search_depth(),
        }
    }
}

impl CombatConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| CombatError::DataParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Check the configuration for out-of-range values.
    ///
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("energy_hit_chance", self.energy_hit_chance),
            ("torpedo_hit_chance", self.torpedo_hit_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{name} must be within 0..=1, got {value}"));
            }
        }
        if self.tactical_hit_weight < 0.0 || self.tactical_damage_weight < 0.0 {
            errors.push("tactical weights must be non-negative".to_string());
        }
        if self.max_engagement_range == 0 {
            errors.push("max_engagement_range must be positive".to_string());
        }
        if self.energy_range_cap > self.max_engagement_range
            && self.torpedo_range_cap > self.max_engagement_range
        {
            errors.push(format!(
                "both range caps exceed max_engagement_range {}",
                self.max_engagement_range
            ));
        }
        for (i, m) in self.priority_multipliers.iter().enumerate() {
            if !(0.0..=1.0).contains(m) {
                errors.push(format!("priority_multipliers[{i}] must be within 0..=1, got {m}"));
            }
        }
        if self.priority_multipliers.windows(2).any(|w| w[1] > w[0]) {
            errors.push("priority_multipliers must not increase with priority".to_string());
        }
        if self.field_repair_amount < 0.0 {
            errors.push("field_repair_amount must be non-negative".to_string());
        }
        if self.ai_search_depth == 0 {
            errors.push("ai_search_depth must be at least 1".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CombatConfig::default().validate().is_empty());
    }

    #[test]
    fn test_empty_ron_uses_defaults() {
        let config = CombatConfig::from_ron_str("empty", "()").unwrap();
        assert_eq!(config, CombatConfig::default());
    }

    #[test]
    fn test_partial_ron() {
        let config =
            CombatConfig::from_ron_str("partial", "(energy_hit_chance: 1.0, ai_search_depth: 2)")
                .unwrap();
        assert_eq!(config.energy_hit_chance, 1.0);
        assert_eq!(config.ai_search_depth, 2);
        assert_eq!(config.torpedo_hit_chance, 0.75);
    }

    #[test]
    fn test_parse_error_reports_source() {
        let err = CombatConfig::from_ron_str("broken.ron", "(energy_hit_chance: )").unwrap_err();
        assert!(matches!(err, CombatError::DataParse { ref source_name, .. } if source_name == "broken.ron"));
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let config = CombatConfig {
            energy_hit_chance: 1.5,
            priority_multipliers: [0.5, 0.75, 1.0],
            ai_search_depth: 0,
            ..CombatConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
    }
}

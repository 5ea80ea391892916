//! Warp core power allocation and the graduated bonuses it buys.
//!
//! Each channel runs from 0 to [`CHANNEL_CAP`]. At or below the
//! [`BALANCED_POWER`] baseline a channel gives no bonus; between the
//! baseline and the cap its bonus grows linearly.

use serde::{Deserialize, Serialize};

use crate::error::PowerRejection;

/// Maximum allocation for any one channel.
pub const CHANNEL_CAP: u32 = 200;
/// Allocation at which bonuses start.
pub const BALANCED_POWER: u32 = 100;

/// A power consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerChannel {
    /// Impulse engines: extra movement points.
    Engines,
    /// Shield generators: capacity and regeneration.
    Shields,
    /// Energy weapons: array damage.
    Weapons,
}

/// Power split across the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerDistribution {
    /// Engine allocation.
    pub engines: u32,
    /// Shield allocation.
    pub shields: u32,
    /// Weapon allocation.
    pub weapons: u32,
}

impl PowerDistribution {
    /// Create a distribution. No validation is done here; see [`Self::check`].
    #[must_use]
    pub const fn new(engines: u32, shields: u32, weapons: u32) -> Self {
        Self {
            engines,
            shields,
            weapons,
        }
    }

    /// Sum of all three channels.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.engines
            .saturating_add(self.shields)
            .saturating_add(self.weapons)
    }

    /// Allocation for one channel.
    #[must_use]
    pub const fn get(&self, channel: PowerChannel) -> u32 {
        match channel {
            PowerChannel::Engines => self.engines,
            PowerChannel::Shields => self.shields,
            PowerChannel::Weapons => self.weapons,
        }
    }

    /// Verify the per-channel caps and the total against `available`.
    pub fn check(&self, available: u32) -> Result<(), PowerRejection> {
        for channel in [PowerChannel::Engines, PowerChannel::Shields, PowerChannel::Weapons] {
            let requested = self.get(channel);
            if requested > CHANNEL_CAP {
                return Err(PowerRejection::ChannelCap {
                    channel,
                    requested,
                    cap: CHANNEL_CAP,
                });
            }
        }
        let requested = self.total();
        if requested > available {
            return Err(PowerRejection::TotalExceeded {
                requested,
                available,
            });
        }
        Ok(())
    }
}

impl Default for PowerDistribution {
    fn default() -> Self {
        Self::new(BALANCED_POWER, BALANCED_POWER, BALANCED_POWER)
    }
}

/// Fraction of the way from baseline to cap, in `[0, 1]`.
fn above_baseline(power: u32) -> f64 {
    if power <= BALANCED_POWER {
        return 0.0;
    }
    let over = power.min(CHANNEL_CAP) - BALANCED_POWER;
    f64::from(over) / f64::from(CHANNEL_CAP - BALANCED_POWER)
}

/// Extra movement points from engine power, up to `max_bonus`.
#[must_use]
pub fn engine_bonus(engine_power: u32, max_bonus: f64) -> f64 {
    max_bonus * above_baseline(engine_power)
}

/// Shield capacity and regeneration multiplier, 1.0 to 1.5.
#[must_use]
pub fn shield_bonus(shield_power: u32) -> f64 {
    1.0 + 0.5 * above_baseline(shield_power)
}

/// Energy weapon damage multiplier, 1.0 to 1.5. Torpedoes never get this.
#[must_use]
pub fn weapon_bonus(weapon_power: u32) -> f64 {
    1.0 + 0.5 * above_baseline(weapon_power)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_curves() {
        assert_eq!(shield_bonus(0), 1.0);
        assert_eq!(shield_bonus(100), 1.0);
        assert_eq!(shield_bonus(150), 1.25);
        assert_eq!(shield_bonus(200), 1.5);
        assert_eq!(weapon_bonus(200), 1.5);
        assert_eq!(engine_bonus(150, 3.0), 1.5);
        assert_eq!(engine_bonus(200, 2.0), 2.0);
        assert_eq!(engine_bonus(80, 3.0), 0.0);
    }

    #[test]
    fn test_check_caps() {
        let ok = PowerDistribution::new(100, 100, 100);
        assert!(ok.check(300).is_ok());

        let over_cap = PowerDistribution::new(201, 0, 0);
        assert!(matches!(
            over_cap.check(1000),
            Err(PowerRejection::ChannelCap {
                channel: PowerChannel::Engines,
                ..
            })
        ));

        let over_total = PowerDistribution::new(150, 150, 100);
        assert_eq!(
            over_total.check(300),
            Err(PowerRejection::TotalExceeded {
                requested: 400,
                available: 300
            })
        );
    }
}

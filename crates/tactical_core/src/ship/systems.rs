//! Named subsystems and their health.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Full health of any subsystem.
pub const FULL_HEALTH: f64 = 100.0;

/// Efficiency multiplier ceiling for systems and penalties.
pub const EFFICIENCY_CAP: f64 = 2.0;

/// One of the nine ship subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SystemKind {
    /// Power source for every other system. Reaching 0 means breach.
    WarpCore,
    /// Keeps the crew alive; feeds weapons, sensors and engineering.
    LifeSupport,
    /// Faster-than-light drive.
    WarpEngines,
    /// Sub-light drive used for hex movement.
    ImpulseEngines,
    /// Fire control for arrays and torpedo bays.
    Weapons,
    /// Detection and targeting.
    Sensors,
    /// Shield generators.
    Shields,
    /// Damage control; drives repair rate.
    Engineering,
    /// Medical bay; mitigates casualties.
    SickBay,
}

impl SystemKind {
    /// All subsystems in their fixed iteration order.
    pub const ALL: [SystemKind; 9] = [
        SystemKind::WarpCore,
        SystemKind::LifeSupport,
        SystemKind::WarpEngines,
        SystemKind::ImpulseEngines,
        SystemKind::Weapons,
        SystemKind::Sensors,
        SystemKind::Shields,
        SystemKind::Engineering,
        SystemKind::SickBay,
    ];

    const fn slot(self) -> usize {
        self as usize
    }

    /// Snake-case name used in logs and data files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SystemKind::WarpCore => "warp_core",
            SystemKind::LifeSupport => "life_support",
            SystemKind::WarpEngines => "warp_engines",
            SystemKind::ImpulseEngines => "impulse_engines",
            SystemKind::Weapons => "weapons",
            SystemKind::Sensors => "sensors",
            SystemKind::Shields => "shields",
            SystemKind::Engineering => "engineering",
            SystemKind::SickBay => "sick_bay",
        }
    }

    /// Relative likelihood of taking collateral damage from a hull hit.
    ///
    /// Shields and sensors sit on the outer hull; the warp core and life
    /// support are buried deep inside.
    #[must_use]
    pub const fn vulnerability(self) -> f64 {
        match self {
            SystemKind::WarpCore => 0.4,
            SystemKind::LifeSupport => 0.5,
            SystemKind::WarpEngines => 0.6,
            SystemKind::ImpulseEngines => 0.8,
            SystemKind::Weapons => 1.0,
            SystemKind::Sensors => 1.1,
            SystemKind::Shields => 1.2,
            SystemKind::Engineering => 0.7,
            SystemKind::SickBay => 0.9,
        }
    }

    /// Whether life support health also throttles this system.
    #[must_use]
    pub const fn depends_on_life_support(self) -> bool {
        matches!(
            self,
            SystemKind::Weapons | SystemKind::Sensors | SystemKind::Engineering
        )
    }

    /// What losing this system means for the ship.
    #[must_use]
    pub const fn destruction_message(self) -> &'static str {
        match self {
            SystemKind::WarpCore => "WARP CORE BREACH IMMINENT",
            SystemKind::LifeSupport => "life support offline, crew efficiency reduced",
            SystemKind::WarpEngines => "warp drive offline, cannot go to warp",
            SystemKind::ImpulseEngines => "impulse engines offline, mobility compromised",
            SystemKind::Weapons => "weapons offline, cannot fire",
            SystemKind::Sensors => "sensors offline, targeting degraded",
            SystemKind::Shields => "shield generators offline, no regeneration",
            SystemKind::Engineering => "engineering offline, repairs impossible",
            SystemKind::SickBay => "sick bay offline, casualties unmitigated",
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Health of every subsystem, each kept within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    health: [f64; 9],
}

impl SystemHealth {
    /// All systems at full health.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            health: [FULL_HEALTH; 9],
        }
    }

    /// Health of one system.
    #[must_use]
    pub fn get(&self, kind: SystemKind) -> f64 {
        self.health[kind.slot()]
    }

    /// Set a system's health, clamped to `[0, 100]`.
    pub fn set(&mut self, kind: SystemKind, value: f64) {
        self.health[kind.slot()] = value.clamp(0.0, FULL_HEALTH);
    }

    /// Health as a fraction of full.
    #[must_use]
    pub fn ratio(&self, kind: SystemKind) -> f64 {
        self.get(kind) / FULL_HEALTH
    }

    /// Whether a system has been knocked out.
    #[must_use]
    pub fn is_destroyed(&self, kind: SystemKind) -> bool {
        self.get(kind) <= 0.0
    }

    /// Iterate `(kind, health)` in [`SystemKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SystemKind, f64)> + '_ {
        SystemKind::ALL.iter().map(|k| (*k, self.get(*k)))
    }
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self::full()
    }
}

impl Index<SystemKind> for SystemHealth {
    type Output = f64;

    fn index(&self, kind: SystemKind) -> &f64 {
        &self.health[kind.slot()]
    }
}

impl IndexMut<SystemKind> for SystemHealth {
    fn index_mut(&mut self, kind: SystemKind) -> &mut f64 {
        &mut self.health[kind.slot()]
    }
}

/// Performance multipliers derived from subsystem health and crew skill.
///
/// `1.0` is nominal. Every value is capped at [`EFFICIENCY_CAP`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemPenalties {
    /// Energy weapon output.
    pub weapons_damage: f64,
    /// Fire control accuracy; weapons and sensors each floor their part at 0.8.
    pub weapons_accuracy: f64,
    /// Warp speed.
    pub warp_speed: f64,
    /// Impulse speed.
    pub impulse_speed: f64,
    /// Shield regeneration.
    pub shield_recharge: f64,
    /// Sensor reach.
    pub sensor_range: f64,
    /// Evasive capability, floored at 0.5 before the crew bonus.
    pub evasion: f64,
}

impl SystemPenalties {
    /// Derive penalties from raw system health and a crew bonus fraction.
    ///
    /// The two accuracy factors compound, so a ship with both weapons and
    /// sensors wrecked sits at 0.64 before the crew bonus.
    #[must_use]
    pub fn from_health(systems: &SystemHealth, crew_bonus: f64) -> Self {
        let weapons = systems.ratio(SystemKind::Weapons);
        let sensors = systems.ratio(SystemKind::Sensors);
        let impulse = systems.ratio(SystemKind::ImpulseEngines);
        let scale = 1.0 + crew_bonus;
        let cap = |v: f64| (v * scale).min(EFFICIENCY_CAP);

        Self {
            weapons_damage: cap(weapons),
            weapons_accuracy: cap((0.8 + weapons * 0.2) * (0.8 + sensors * 0.2)),
            warp_speed: cap(systems.ratio(SystemKind::WarpEngines)),
            impulse_speed: cap(impulse),
            shield_recharge: cap(systems.ratio(SystemKind::Shields)),
            sensor_range: cap(sensors),
            evasion: cap(0.5 + impulse * 0.5),
        }
    }
}

//! Energy weapon arrays and torpedo bays.
//!
//! Each weapon is a two-state machine: `Ready` when its cooldown is zero,
//! `Cooling` otherwise. Torpedo bays are additionally `Empty` once their
//! magazine runs dry.
//!
//! Damage grows linearly with mark:
//!
//! | Family  | Base (Mk I)                                   | Per mark |
//! |---------|-----------------------------------------------|----------|
//! | Energy  | phaser 15, disruptor 18, plasma 20, polaron 16, tetryon 14 | +5 |
//! | Torpedo | photon 80, quantum 100, plasma 90, tricobalt 120 | +10 |

use serde::{Deserialize, Serialize};

use crate::ship::Arc;

/// Lowest equipment mark.
pub const MIN_MARK: u8 = 1;
/// Highest equipment mark.
pub const MAX_MARK: u8 = 15;
/// Hard range cap for energy weapons, in hexes.
pub const ENERGY_MAX_RANGE: u32 = 12;
/// Hard range cap for torpedoes, in hexes.
pub const TORPEDO_MAX_RANGE: u32 = 15;

/// Firing readiness of a single weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponState {
    /// Can fire this phase.
    Ready,
    /// Turns left before it can fire again.
    Cooling(u32),
    /// Torpedo bay with an empty magazine.
    Empty,
}

/// Energy weapon families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnergyWeaponType {
    /// Standard Federation beam.
    #[default]
    Phaser,
    /// Klingon/Romulan beam.
    Disruptor,
    /// Plasma lance.
    Plasma,
    /// Dominion beam.
    Polaron,
    /// Tetryon beam.
    Tetryon,
}

impl EnergyWeaponType {
    /// Damage at Mk I.
    #[must_use]
    pub const fn base_damage(self) -> u32 {
        match self {
            EnergyWeaponType::Phaser => 15,
            EnergyWeaponType::Disruptor => 18,
            EnergyWeaponType::Plasma => 20,
            EnergyWeaponType::Polaron => 16,
            EnergyWeaponType::Tetryon => 14,
        }
    }
}

/// Torpedo families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TorpedoType {
    /// Standard antimatter torpedo.
    #[default]
    Photon,
    /// Zero-point torpedo.
    Quantum,
    /// Plasma torpedo.
    Plasma,
    /// Subspace-yield device.
    Tricobalt,
}

impl TorpedoType {
    /// Damage at Mk I.
    #[must_use]
    pub const fn base_damage(self) -> u32 {
        match self {
            TorpedoType::Photon => 80,
            TorpedoType::Quantum => 100,
            TorpedoType::Plasma => 90,
            TorpedoType::Tricobalt => 120,
        }
    }

    /// Reload time in turns before mark and crew reductions.
    #[must_use]
    pub const fn base_cooldown(self) -> u32 {
        match self {
            TorpedoType::Photon | TorpedoType::Plasma => 3,
            TorpedoType::Quantum => 4,
            TorpedoType::Tricobalt => 5,
        }
    }
}

/// Behaviour shared by every mounted weapon.
pub trait Weapon {
    /// Equipment mark.
    fn mark(&self) -> u8;

    /// Arcs this weapon can engage.
    fn firing_arcs(&self) -> &[Arc];

    /// Current readiness.
    fn state(&self) -> WeaponState;

    /// Damage before any ship or range modifiers.
    fn damage(&self) -> u32;

    /// Hard range cap in hexes.
    fn max_range(&self) -> u32;

    /// Tick the cooldown down by one turn, floored at zero.
    fn advance_cooldown(&mut self);

    /// Whether the weapon can fire now.
    fn is_ready(&self) -> bool {
        self.state() == WeaponState::Ready
    }

    /// Whether `arc` is covered by this weapon.
    fn covers(&self, arc: Arc) -> bool {
        self.firing_arcs().contains(&arc)
    }
}

fn clamp_mark(mark: u8) -> u8 {
    mark.clamp(MIN_MARK, MAX_MARK)
}

/// An energy weapon array. Fires every phase it is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponArray {
    /// Weapon family.
    pub weapon_type: EnergyWeaponType,
    mark: u8,
    /// Arcs the array can engage.
    pub firing_arcs: Vec<Arc>,
    /// Turns until the array may fire again.
    #[serde(default)]
    pub cooldown_remaining: u32,
}

impl WeaponArray {
    /// Mount a new array. Marks are clamped to `1..=15`.
    #[must_use]
    pub fn new(weapon_type: EnergyWeaponType, mark: u8, firing_arcs: Vec<Arc>) -> Self {
        Self {
            weapon_type,
            mark: clamp_mark(mark),
            firing_arcs,
            cooldown_remaining: 0,
        }
    }

    /// Fire the array, returning its raw damage, or 0 if it is not ready.
    ///
    /// Energy arrays recharge within the phase, so the cooldown stays at 0.
    pub fn fire(&mut self) -> u32 {
        if !self.is_ready() {
            return 0;
        }
        self.cooldown_remaining = 0;
        self.damage()
    }
}

impl Weapon for WeaponArray {
    fn mark(&self) -> u8 {
        self.mark
    }

    fn firing_arcs(&self) -> &[Arc] {
        &self.firing_arcs
    }

    fn state(&self) -> WeaponState {
        if self.cooldown_remaining == 0 {
            WeaponState::Ready
        } else {
            WeaponState::Cooling(self.cooldown_remaining)
        }
    }

    fn damage(&self) -> u32 {
        self.weapon_type.base_damage() + (u32::from(self.mark) - 1) * 5
    }

    fn max_range(&self) -> u32 {
        ENERGY_MAX_RANGE
    }

    fn advance_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

/// A torpedo launcher with its own magazine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorpedoBay {
    /// Torpedo family.
    pub torpedo_type: TorpedoType,
    mark: u8,
    /// Arcs the bay can engage.
    pub firing_arcs: Vec<Arc>,
    /// Turns until the bay may fire again.
    #[serde(default)]
    pub cooldown_remaining: u32,
    torpedoes: u32,
    max_torpedoes: u32,
}

impl TorpedoBay {
    /// Mount a new bay with a full magazine. Marks are clamped to `1..=15`.
    #[must_use]
    pub fn new(torpedo_type: TorpedoType, mark: u8, firing_arcs: Vec<Arc>, max_torpedoes: u32) -> Self {
        Self {
            torpedo_type,
            mark: clamp_mark(mark),
            firing_arcs,
            cooldown_remaining: 0,
            torpedoes: max_torpedoes,
            max_torpedoes,
        }
    }

    /// Torpedoes left in the magazine.
    #[must_use]
    pub const fn torpedoes(&self) -> u32 {
        self.torpedoes
    }

    /// Magazine capacity.
    #[must_use]
    pub const fn max_torpedoes(&self) -> u32 {
        self.max_torpedoes
    }

    /// Reload time after mark reduction: one turn off from Mk V, never below 2.
    #[must_use]
    pub fn base_cooldown(&self) -> u32 {
        let reduction = u32::from(self.mark / 5).min(1);
        self.torpedo_type.base_cooldown().saturating_sub(reduction).max(2)
    }

    /// Reload time after the crew's skill shaves off its fraction, never below 1.
    #[must_use]
    pub fn cooldown_with_crew(&self, crew_bonus: f64) -> u32 {
        let modified = f64::from(self.base_cooldown()) * (1.0 - crew_bonus);
        (modified.round() as u32).max(1)
    }

    /// Launch one torpedo, returning its raw damage, or 0 if not ready.
    pub fn fire(&mut self, crew_bonus: f64) -> u32 {
        if !self.is_ready() {
            return 0;
        }
        self.torpedoes -= 1;
        self.cooldown_remaining = self.cooldown_with_crew(crew_bonus);
        self.damage()
    }

    /// Add `count` torpedoes, or refill completely with `None`.
    pub fn reload(&mut self, count: Option<u32>) {
        self.torpedoes = match count {
            Some(n) => self.torpedoes.saturating_add(n).min(self.max_torpedoes),
            None => self.max_torpedoes,
        };
    }

    /// Set the magazine level, clamped to capacity.
    pub fn set_torpedoes(&mut self, count: u32) {
        self.torpedoes = count.min(self.max_torpedoes);
    }
}

impl Weapon for TorpedoBay {
    fn mark(&self) -> u8 {
        self.mark
    }

    fn firing_arcs(&self) -> &[Arc] {
        &self.firing_arcs
    }

    fn state(&self) -> WeaponState {
        if self.cooldown_remaining > 0 {
            WeaponState::Cooling(self.cooldown_remaining)
        } else if self.torpedoes == 0 {
            WeaponState::Empty
        } else {
            WeaponState::Ready
        }
    }

    fn damage(&self) -> u32 {
        self.torpedo_type.base_damage() + (u32::from(self.mark) - 1) * 10
    }

    fn max_range(&self) -> u32 {
        TORPEDO_MAX_RANGE
    }

    fn advance_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

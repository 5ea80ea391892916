//! Injected randomness.
//!
//! The resolver never touches an ambient generator. Every roll goes through a
//! [`CombatRng`] handed in by the host, so a whole encounter is reproducible
//! from its seed plus the sequence of decisions made.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of every random outcome in an encounter.
pub trait CombatRng {
    /// Weapon hit roll: `true` with probability `p` (clamped to `[0, 1]`).
    fn roll_hit(&mut self, p: f64) -> bool;

    /// Uniform integer in `min..=max`. Returns `min` when `max <= min`.
    fn roll_damage(&mut self, min: i32, max: i32) -> i32;

    /// Critical/event roll: `true` with probability `p` (clamped to `[0, 1]`).
    fn roll_critical(&mut self, p: f64) -> bool;

    /// Initiative roll: one d20 plus `bonus`.
    fn roll_initiative(&mut self, bonus: i32) -> i32 {
        self.roll_damage(1, 20) + bonus
    }

    /// Uniform index in `0..len`, used for tie-breaking. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let max = i32::try_from(len - 1).unwrap_or(i32::MAX);
        self.roll_damage(0, max) as usize
    }
}

/// ChaCha8-backed generator seeded once per encounter.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl CombatRng for SeededRng {
    fn roll_hit(&mut self, p: f64) -> bool {
        self.rng.gen_bool(probability(p))
    }

    fn roll_damage(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn roll_critical(&mut self, p: f64) -> bool {
        self.rng.gen_bool(probability(p))
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// How [`FixedRng`] resolves damage ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePick {
    /// Always the low end.
    #[default]
    Min,
    /// Always the high end.
    Max,
}

/// Generator with pinned outcomes, for scripted encounters and tests.
///
/// Probability rolls succeed only when `p` reaches the configured threshold,
/// so `FixedRng::always_hit()` hits every shot with `p > 0` and never lands a
/// critical below certainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRng {
    /// Hit rolls succeed when `p >= hit_threshold`.
    pub hit_threshold: f64,
    /// Critical rolls succeed when `p >= critical_threshold`.
    pub critical_threshold: f64,
    /// Damage range resolution.
    pub pick: RangePick,
}

impl FixedRng {
    /// Every shot with non-zero chance hits; criticals need certainty.
    #[must_use]
    pub const fn always_hit() -> Self {
        Self {
            hit_threshold: f64::MIN_POSITIVE,
            critical_threshold: 1.0,
            pick: RangePick::Min,
        }
    }

    /// Every roll with non-zero chance succeeds and ranges resolve high.
    #[must_use]
    pub const fn always_critical() -> Self {
        Self {
            hit_threshold: f64::MIN_POSITIVE,
            critical_threshold: f64::MIN_POSITIVE,
            pick: RangePick::Max,
        }
    }

    /// Nothing probabilistic ever succeeds.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            hit_threshold: f64::INFINITY,
            critical_threshold: f64::INFINITY,
            pick: RangePick::Min,
        }
    }
}

impl Default for FixedRng {
    fn default() -> Self {
        Self::always_hit()
    }
}

impl CombatRng for FixedRng {
    fn roll_hit(&mut self, p: f64) -> bool {
        p >= self.hit_threshold
    }

    fn roll_damage(&mut self, min: i32, max: i32) -> i32 {
        match self.pick {
            RangePick::Min => min,
            RangePick::Max => max.max(min),
        }
    }

    fn roll_critical(&mut self, p: f64) -> bool {
        p >= self.critical_threshold
    }
}

impl<R: CombatRng + ?Sized> CombatRng for &mut R {
    fn roll_hit(&mut self, p: f64) -> bool {
        (**self).roll_hit(p)
    }

    fn roll_damage(&mut self, min: i32, max: i32) -> i32 {
        (**self).roll_damage(min, max)
    }

    fn roll_critical(&mut self, p: f64) -> bool {
        (**self).roll_critical(p)
    }

    fn roll_initiative(&mut self, bonus: i32) -> i32 {
        (**self).roll_initiative(bonus)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

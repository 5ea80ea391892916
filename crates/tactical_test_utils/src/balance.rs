//! Balance testing utilities for headless skirmishes.
//!
//! This module runs many seeded AI-vs-AI duels between catalogue classes
//! and summarizes who wins and how quickly.

use tactical_core::ai::Personality;
use tactical_core::engine::CombatOutcome;
use tactical_core::error::Result;
use tactical_core::ship::{FactionId, ShipId};

use crate::fixtures::{duel, Skirmish};

/// Result of a single skirmish.
#[derive(Debug, Clone, PartialEq)]
pub struct SkirmishResult {
    /// Winning faction (None on mutual destruction or timeout).
    pub winner: Option<FactionId>,
    /// Turns started before the encounter ended.
    pub turns: u32,
    /// Side A hull fraction at the end.
    pub hull_a: f64,
    /// Side B hull fraction at the end.
    pub hull_b: f64,
}

/// Statistics for a set of skirmishes.
#[derive(Debug, Clone, Default)]
pub struct SkirmishStats {
    /// Total skirmishes run.
    pub total: u32,
    /// Wins for side A.
    pub wins_a: u32,
    /// Wins for side B.
    pub wins_b: u32,
    /// Mutual destruction or timeout.
    pub draws: u32,
    /// Average turns to resolution.
    pub avg_turns: f64,
}

impl SkirmishStats {
    /// Win rate for side A (0.0 to 1.0).
    pub fn win_rate_a(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_a) / f64::from(self.total)
    }

    /// Win rate for side B (0.0 to 1.0).
    pub fn win_rate_b(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_b) / f64::from(self.total)
    }

    /// Check if the matchup is balanced (side A win rate within range).
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_a();
        rate >= min_rate && rate <= max_rate
    }

    fn record(&mut self, result: &SkirmishResult) {
        let previous = self.avg_turns * f64::from(self.total);
        self.total += 1;
        match result.winner {
            Some(FactionId(0)) => self.wins_a += 1,
            Some(_) => self.wins_b += 1,
            None => self.draws += 1,
        }
        self.avg_turns = (previous + f64::from(result.turns)) / f64::from(self.total);
    }
}

/// One side of a matchup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contender {
    /// Catalogue class.
    pub class: String,
    /// Controller personality.
    pub personality: Personality,
}

impl Contender {
    /// Create a contender.
    pub fn new(class: impl Into<String>, personality: Personality) -> Self {
        Self {
            class: class.into(),
            personality,
        }
    }
}

/// Run one seeded duel.
///
/// # Errors
///
/// Fails if either class is unknown.
pub fn run_duel(
    a: &Contender,
    b: &Contender,
    distance: i32,
    seed: u64,
    max_turns: u32,
) -> Result<SkirmishResult> {
    let ships = duel(&a.class, &b.class, distance)?;
    let mut skirmish = Skirmish::new(ships, seed, a.personality, b.personality)?;
    let outcome = skirmish.run(max_turns);

    let hull = |id| {
        skirmish
            .engine
            .ship(id)
            .map_or(0.0, tactical_core::ship::Ship::hull_fraction)
    };
    Ok(SkirmishResult {
        winner: match outcome {
            CombatOutcome::Victory(faction) => Some(faction),
            _ => None,
        },
        turns: skirmish.engine.turn_number(),
        hull_a: hull(ShipId(1)),
        hull_b: hull(ShipId(2)),
    })
}

/// Run `seeds` duels and aggregate the results.
///
/// # Errors
///
/// Fails if either class is unknown.
pub fn run_matchup(
    a: &Contender,
    b: &Contender,
    distance: i32,
    seeds: std::ops::Range<u64>,
    max_turns: u32,
) -> Result<SkirmishStats> {
    let mut stats = SkirmishStats::default();
    for seed in seeds {
        let result = run_duel(a, b, distance, seed, max_turns)?;
        tracing::debug!(seed, winner = ?result.winner, turns = result.turns, "duel finished");
        stats.record(&result);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rates() {
        let stats = SkirmishStats {
            total: 10,
            wins_a: 6,
            wins_b: 3,
            draws: 1,
            avg_turns: 4.0,
        };
        assert!((stats.win_rate_a() - 0.6).abs() < 1e-9);
        assert!((stats.win_rate_b() - 0.3).abs() < 1e-9);
        assert!(stats.is_balanced(0.4, 0.7));
        assert!(!stats.is_balanced(0.1, 0.5));
        assert_eq!(SkirmishStats::default().win_rate_a(), 0.5);
    }

    #[test]
    fn test_record_running_average() {
        let mut stats = SkirmishStats::default();
        for (winner, turns) in [(Some(FactionId(0)), 2), (Some(FactionId(1)), 4), (None, 6)] {
            stats.record(&SkirmishResult {
                winner,
                turns,
                hull_a: 1.0,
                hull_b: 1.0,
            });
        }
        assert_eq!((stats.total, stats.wins_a, stats.wins_b, stats.draws), (3, 1, 1, 1));
        assert!((stats.avg_turns - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_matchup_runs() {
        let a = Contender::new("Galaxy", Personality::Aggressive);
        let b = Contender::new("Oberth", Personality::Defensive);
        let stats = run_matchup(&a, &b, 6, 0..3, 3).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.wins_b, 0);
    }

    #[test]
    fn test_unknown_class_fails() {
        let a = Contender::new("Warbird", Personality::Balanced);
        let b = Contender::new("Miranda", Personality::Balanced);
        assert!(run_duel(&a, &b, 6, 0, 1).is_err());
    }
}

//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the combat engine produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! An encounter must replay exactly from its seed and its action list.
//! Sources of non-determinism include:
//!
//! - **Ambient randomness**: every roll goes through an injected
//!   [`tactical_core::rng::CombatRng`]; nothing calls `thread_rng()`.
//!
//! - **Map iteration order**: engine bookkeeping lives in `BTreeMap`s and
//!   ships are stored sorted by id.
//!
//! - **Controller dice**: the AI draws from its own stream, so a replay
//!   that skips the controllers still sees the same engine rolls.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (movement, damage, targeting)
//! 2. **Property tests**: random inputs still produce deterministic outputs
//! 3. **Integration tests**: whole AI-vs-AI encounters are reproducible
//! 4. **Record tests**: encounter records replay to the same hash

use tactical_core::engine::{CombatEngine, CombatOutcome};
use tactical_core::record::EncounterRecord;
use tactical_core::rng::SeededRng;
use tactical_core::ship::Ship;

use crate::fixtures::Skirmish;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Encounter is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Run the same AI-vs-AI skirmish `runs` times and compare final hashes.
///
/// `setup` must build an identical skirmish each time.
pub fn verify_skirmish_determinism<F>(setup: F, runs: usize, max_turns: u32) -> DeterminismResult
where
    F: Fn() -> Skirmish,
{
    verify_determinism(
        runs,
        1,
        &setup,
        |skirmish| {
            skirmish.run(max_turns);
        },
        |skirmish| skirmish.engine.state_hash(),
    )
}

/// Play two identical skirmishes one turn at a time and report the first
/// turn after which their hashes differ.
///
/// # Returns
///
/// `None` if they never diverge, `Some(turn)` otherwise (0 for the
/// opening state).
pub fn find_first_divergence<F>(setup: F, max_turns: u32) -> Option<u32>
where
    F: Fn() -> Skirmish,
{
    let mut a = setup();
    let mut b = setup();

    if a.engine.state_hash() != b.engine.state_hash() {
        return Some(0);
    }

    for turn in 1..=max_turns {
        a.run(turn);
        b.run(turn);
        if a.engine.state_hash() != b.engine.state_hash() {
            return Some(turn);
        }
        if a.engine.combat_outcome() != CombatOutcome::Ongoing {
            break;
        }
    }

    None
}

/// Record a finished skirmish and check that its record survives a bincode
/// round trip and replays to the same final hash without the controllers.
pub fn verify_record_replay(seed: u64, initial_ships: &[Ship], engine: &CombatEngine<SeededRng>) -> bool {
    let Ok(record) = EncounterRecord::capture(seed, initial_ships, engine) else {
        return false;
    };
    let Ok(bytes) = record.to_bytes() else {
        return false;
    };
    let Ok(restored) = EncounterRecord::from_bytes(&bytes) else {
        return false;
    };
    restored
        .replay()
        .is_ok_and(|replayed| replayed.state_hash() == engine.state_hash())
}

/// Proptest strategies for combat testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use proptest::prelude::*;
    use tactical_core::ai::Personality;
    use tactical_core::hex::{Facing, HexCoord};
    use tactical_core::ship::{Arc, SystemKind};

    /// Generate a hex within `radius` of the origin's bounding box.
    pub fn arb_hex(radius: i32) -> impl Strategy<Value = HexCoord> {
        (-radius..=radius, -radius..=radius).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Generate a facing.
    pub fn arb_facing() -> impl Strategy<Value = Facing> {
        (0u8..6).prop_map(Facing::new)
    }

    /// Generate a shield arc.
    pub fn arb_arc() -> impl Strategy<Value = Arc> {
        prop_oneof![
            Just(Arc::Fore),
            Just(Arc::Starboard),
            Just(Arc::Aft),
            Just(Arc::Port),
        ]
    }

    /// Generate a subsystem.
    pub fn arb_system() -> impl Strategy<Value = SystemKind> {
        (0usize..SystemKind::ALL.len()).prop_map(|i| SystemKind::ALL[i])
    }

    /// Generate a personality.
    pub fn arb_personality() -> impl Strategy<Value = Personality> {
        (0usize..Personality::ALL.len()).prop_map(|i| Personality::ALL[i])
    }

    /// Generate a weapon mark (1-15).
    pub fn arb_mark() -> impl Strategy<Value = u8> {
        1u8..=15
    }

    /// Generate incoming damage (0-5000).
    pub fn arb_damage() -> impl Strategy<Value = f64> {
        (0u32..5000).prop_map(f64::from)
    }

    /// Generate a power request, sometimes over the caps.
    pub fn arb_power_request() -> impl Strategy<Value = (u32, u32, u32)> {
        (0u32..260, 0u32..260, 0u32..260)
    }

    /// Generate an encounter seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::duel;
    use tactical_core::ai::Personality;

    fn skirmish(seed: u64) -> Skirmish {
        Skirmish::new(
            duel("Miranda", "Saladin", 8).unwrap(),
            seed,
            Personality::Aggressive,
            Personality::Balanced,
        )
        .unwrap()
    }

    #[test]
    fn test_counter_is_deterministic() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        result.assert_deterministic();
        assert_eq!(result.hashes, vec![10, 10, 10]);
    }

    #[test]
    fn test_unique_hashes() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![3, 1, 3, 2],
            steps: 1,
        };
        assert_eq!(result.unique_hashes(), vec![1, 2, 3]);
    }

    #[test]
    fn test_skirmish_is_deterministic() {
        verify_skirmish_determinism(|| skirmish(1234), 3, 5).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(|| skirmish(99), 5), None);
    }

    #[test]
    fn test_different_seeds_usually_differ() {
        let hashes: Vec<u64> = (0..4)
            .map(|seed| {
                let mut s = skirmish(seed);
                s.run(3);
                s.engine.state_hash()
            })
            .collect();
        let mut unique = hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        assert!(unique.len() > 1, "{hashes:?}");
    }

    #[test]
    fn test_skirmish_record_replays() {
        let ships = duel("Constitution", "Miranda", 6).unwrap();
        let mut s = Skirmish::new(ships.clone(), 77, Personality::Sniper, Personality::Defensive).unwrap();
        s.run(4);
        assert!(verify_record_replay(77, &ships, &s.engine));
    }
}

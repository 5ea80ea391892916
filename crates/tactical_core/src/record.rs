//! Encounter records for replay and verification.
//!
//! A record stores the seed, the configuration, the starting ships and
//! every accepted action. Feeding the actions back into a freshly seeded
//! engine must land on the recorded final hash. Controller decisions are
//! not stored; only the actions they produced.
//!
//! Records are bincode bytes. Reading and writing files is left to the host.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::engine::{Action, CombatEngine};
use crate::error::{CombatError, Result};
use crate::rng::{CombatRng, SeededRng};
use crate::ship::Ship;

/// Record format version.
pub const RECORD_VERSION: u32 = 1;

/// A complete, replayable encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    /// Record format version.
    pub version: u32,
    /// Engine RNG seed.
    pub seed: u64,
    /// Rules in force.
    pub config: CombatConfig,
    /// Bincode-encoded starting ships.
    pub initial_ships: Vec<u8>,
    /// Accepted actions in order.
    pub actions: Vec<Action>,
    /// State hash after the last action.
    pub final_hash: u64,
}

impl EncounterRecord {
    /// Start a record from an encounter's opening state.
    pub fn new(seed: u64, config: CombatConfig, ships: &[Ship]) -> Result<Self> {
        let initial_ships =
            bincode::serialize(ships).map_err(|e| CombatError::Serialization(e.to_string()))?;
        Ok(Self {
            version: RECORD_VERSION,
            seed,
            config,
            initial_ships,
            actions: Vec::new(),
            final_hash: 0,
        })
    }

    /// Capture a finished engine whose dice came from `SeededRng::new(seed)`.
    pub fn capture<R: CombatRng>(
        seed: u64,
        initial_ships: &[Ship],
        engine: &CombatEngine<R>,
    ) -> Result<Self> {
        let mut record = Self::new(seed, engine.config().clone(), initial_ships)?;
        record.actions = engine.history().to_vec();
        record.final_hash = engine.state_hash();
        Ok(record)
    }

    /// Append an accepted action.
    pub fn record_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Store the final state hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = final_hash;
    }

    /// Decode the starting ships.
    pub fn initial_ships(&self) -> Result<Vec<Ship>> {
        bincode::deserialize(&self.initial_ships)
            .map_err(|e| CombatError::Serialization(e.to_string()))
    }

    /// Fresh engine in the recorded opening state.
    pub fn start_engine(&self) -> Result<CombatEngine<SeededRng>> {
        CombatEngine::new(
            self.initial_ships()?,
            self.config.clone(),
            SeededRng::new(self.seed),
        )
    }

    /// Re-run every action and check the final hash.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if a recorded action is refused, or
    /// [`CombatError::ReplayDiverged`] if the final state differs.
    pub fn replay(&self) -> Result<CombatEngine<SeededRng>> {
        let mut engine = self.start_engine()?;
        for action in &self.actions {
            engine.step(*action)?;
        }
        let actual = engine.state_hash();
        if actual != self.final_hash {
            return Err(CombatError::ReplayDiverged {
                expected: self.final_hash,
                actual,
            });
        }
        tracing::debug!(actions = self.actions.len(), hash = actual, "replay verified");
        Ok(engine)
    }

    /// Encode as bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CombatError::Serialization(e.to_string()))
    }

    /// Decode from bincode, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: Self =
            bincode::deserialize(bytes).map_err(|e| CombatError::Serialization(e.to_string()))?;
        if record.version != RECORD_VERSION {
            return Err(CombatError::RecordVersion {
                expected: RECORD_VERSION,
                found: record.version,
            });
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Facing, HexCoord};
    use crate::ship::{Arc, FactionId, ShipId, SizeClass};
    use crate::weapons::{EnergyWeaponType, WeaponArray};

    fn duel() -> Vec<Ship> {
        let phaser = || WeaponArray::new(EnergyWeaponType::Phaser, 6, vec![Arc::Fore]);
        vec![
            Ship::new(ShipId(1), "Reliant", "Miranda", SizeClass::Medium, FactionId(0))
                .with_position(HexCoord::new(0, 0), Facing::new(0))
                .with_weapon(phaser()),
            Ship::new(ShipId(2), "Kobayashi", "Miranda", SizeClass::Medium, FactionId(1))
                .with_position(HexCoord::new(4, 0), Facing::new(3))
                .with_weapon(phaser()),
        ]
    }

    fn play_turn(engine: &mut CombatEngine<SeededRng>) {
        while engine.turn_number() == 1 {
            let action = match engine.current_acting_ship() {
                Some(ship) => match engine.phase() {
                    crate::engine::CombatPhase::Targeting => {
                        let target = if ship == ShipId(1) { ShipId(2) } else { ShipId(1) };
                        let _ = engine.step(Action::SelectTarget {
                            target,
                            priority: crate::targeting::TargetPriority::Primary,
                        });
                        Action::Pass
                    }
                    crate::engine::CombatPhase::Firing => Action::Fire,
                    _ => Action::Pass,
                },
                None => Action::Advance,
            };
            engine.step(action).unwrap();
        }
    }

    #[test]
    fn test_capture_and_replay() {
        let ships = duel();
        let mut engine =
            CombatEngine::new(ships.clone(), CombatConfig::default(), SeededRng::new(42)).unwrap();
        play_turn(&mut engine);

        let record = EncounterRecord::capture(42, &ships, &engine).unwrap();
        let bytes = record.to_bytes().unwrap();
        let restored = EncounterRecord::from_bytes(&bytes).unwrap();
        assert_eq!(restored, record);

        let replayed = restored.replay().unwrap();
        assert_eq!(replayed.state_hash(), engine.state_hash());
        assert_eq!(replayed.history(), engine.history());
    }

    #[test]
    fn test_tampered_record_diverges() {
        let ships = duel();
        let mut engine =
            CombatEngine::new(ships.clone(), CombatConfig::default(), SeededRng::new(7)).unwrap();
        play_turn(&mut engine);

        let mut record = EncounterRecord::capture(7, &ships, &engine).unwrap();
        record.final_hash ^= 1;
        assert!(matches!(record.replay(), Err(CombatError::ReplayDiverged { .. })));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut record = EncounterRecord::new(1, CombatConfig::default(), &duel()).unwrap();
        record.version = RECORD_VERSION + 1;
        let bytes = bincode::serialize(&record).unwrap();
        assert_eq!(
            EncounterRecord::from_bytes(&bytes),
            Err(CombatError::RecordVersion {
                expected: RECORD_VERSION,
                found: RECORD_VERSION + 1,
            })
        );
    }
}

//! Seeded AI-vs-AI skirmishes and encounter record files.

use std::path::Path;

use serde::Serialize;
use tactical_core::ai::{controller_rng, run_encounter, Personality, ShipAi};
use tactical_core::config::CombatConfig;
use tactical_core::data::ShipCatalogue;
use tactical_core::engine::{CombatEngine, CombatOutcome};
use tactical_core::events::CombatEvent;
use tactical_core::hex::{Facing, HexCoord};
use tactical_core::record::EncounterRecord;
use tactical_core::rng::SeededRng;
use tactical_core::ship::{FactionId, ShipId, ShipStatus};

use crate::error::{ToolError, ToolResult};

/// A one-on-one matchup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkirmishSpec {
    /// Class for side A (faction 0, at the origin facing 0).
    pub class_a: String,
    /// Class for side B (faction 1, `distance` hexes away facing back).
    pub class_b: String,
    /// Side A controller.
    pub personality_a: Personality,
    /// Side B controller.
    pub personality_b: Personality,
    /// Starting separation in hexes.
    pub distance: i32,
    /// Engine seed. The controllers use a stream derived from it.
    pub seed: u64,
    /// Turn limit.
    pub max_turns: u32,
}

/// Summary of one skirmish.
#[derive(Debug, Clone, Serialize)]
pub struct SkirmishReport {
    /// Engine seed.
    pub seed: u64,
    /// How it ended.
    pub outcome: CombatOutcome,
    /// Turn the engine stopped on.
    pub turns: u32,
    /// Accepted actions.
    pub actions: usize,
    /// Shots fired by both sides.
    pub shots: usize,
    /// Shots that hit.
    pub hits: usize,
    /// Final state hash.
    pub final_hash: u64,
    /// Final ship snapshots.
    pub ships: Vec<ShipStatus>,
}

/// Aggregate of many skirmishes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Skirmishes run.
    pub runs: u32,
    /// Side A victories.
    pub wins_a: u32,
    /// Side B victories.
    pub wins_b: u32,
    /// Mutual destruction or turn limit.
    pub draws: u32,
    /// Average final turn.
    pub avg_turns: f64,
}

/// Run one skirmish and capture its encounter record.
///
/// # Errors
///
/// Returns an error if either class is unknown.
pub fn run_skirmish(
    catalogue: &ShipCatalogue,
    config: &CombatConfig,
    spec: &SkirmishSpec,
) -> ToolResult<(SkirmishReport, EncounterRecord)> {
    let ships = vec![
        catalogue
            .build(&spec.class_a, ShipId(1), "Alpha", "NCC-1", FactionId(0))?
            .with_position(HexCoord::ORIGIN, Facing::new(0)),
        catalogue
            .build(&spec.class_b, ShipId(2), "Bravo", "NCC-2", FactionId(1))?
            .with_position(HexCoord::new(spec.distance, 0), Facing::new(3)),
    ];
    let mut controllers = vec![
        ShipAi::new(ShipId(1), spec.personality_a),
        ShipAi::new(ShipId(2), spec.personality_b),
    ];

    let mut engine = CombatEngine::new(ships.clone(), config.clone(), SeededRng::new(spec.seed))?;
    let mut ai_rng = controller_rng(spec.seed);
    let outcome = run_encounter(&mut engine, &mut controllers, &mut ai_rng, spec.max_turns);

    let mut shots = 0;
    let mut hits = 0;
    for event in engine.drain_events() {
        if let CombatEvent::WeaponFired { hit, .. } = event {
            shots += 1;
            hits += usize::from(hit);
        }
    }

    let record = EncounterRecord::capture(spec.seed, &ships, &engine)?;
    let report = SkirmishReport {
        seed: spec.seed,
        outcome,
        turns: engine.turn_number(),
        actions: engine.history().len(),
        shots,
        hits,
        final_hash: engine.state_hash(),
        ships: engine.ships().iter().map(|s| s.ship_status()).collect(),
    };
    tracing::info!(seed = spec.seed, ?outcome, turns = report.turns, "skirmish finished");
    Ok((report, record))
}

/// Run `runs` skirmishes with consecutive seeds starting at `spec.seed`.
///
/// # Errors
///
/// Returns an error if either class is unknown.
pub fn run_batch(
    catalogue: &ShipCatalogue,
    config: &CombatConfig,
    spec: &SkirmishSpec,
    runs: u32,
) -> ToolResult<BatchReport> {
    let mut batch = BatchReport::default();
    let mut total_turns = 0u64;
    for offset in 0..runs {
        let spec = SkirmishSpec {
            seed: spec.seed.wrapping_add(u64::from(offset)),
            ..spec.clone()
        };
        let (report, _) = run_skirmish(catalogue, config, &spec)?;
        batch.runs += 1;
        total_turns += u64::from(report.turns);
        match report.outcome {
            CombatOutcome::Victory(FactionId(0)) => batch.wins_a += 1,
            CombatOutcome::Victory(_) => batch.wins_b += 1,
            _ => batch.draws += 1,
        }
    }
    if batch.runs > 0 {
        batch.avg_turns = total_turns as f64 / f64::from(batch.runs);
    }
    Ok(batch)
}

/// Write an encounter record to `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_record(record: &EncounterRecord, path: &Path) -> ToolResult<()> {
    let bytes = record.to_bytes()?;
    std::fs::write(path, bytes).map_err(|e| ToolError::io(path, e))
}

/// Read an encounter record from `path`.
///
/// # Errors
///
/// Returns an error if reading or decoding fails, or the version differs.
pub fn read_record(path: &Path) -> ToolResult<EncounterRecord> {
    let bytes = std::fs::read(path).map_err(|e| ToolError::io(path, e))?;
    Ok(EncounterRecord::from_bytes(&bytes)?)
}

/// Replay the record at `path`, returning its verified final hash.
///
/// # Errors
///
/// Returns an error if the record cannot be read or the replay diverges.
pub fn verify_record_file(path: &Path) -> ToolResult<u64> {
    let record = read_record(path)?;
    let engine = record.replay()?;
    Ok(engine.state_hash())
}

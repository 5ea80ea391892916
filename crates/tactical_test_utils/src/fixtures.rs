//! Test fixtures and helpers.
//!
//! Pre-built ships and encounters for consistent testing.

use tactical_core::ai::{controller_rng, Personality, ShipAi};
use tactical_core::config::CombatConfig;
use tactical_core::data::ShipCatalogue;
use tactical_core::engine::CombatEngine;
use tactical_core::error::Result;
use tactical_core::hex::{Facing, HexCoord};
use tactical_core::rng::SeededRng;
use tactical_core::ship::{Arc, ArcMap, CrewSkill, FactionId, Ship, ShipId, SizeClass};
use tactical_core::weapons::{EnergyWeaponType, TorpedoBay, TorpedoType, WeaponArray};

/// A bare ship at `(q, r)` with stock defaults and Cadet crew, so no crew
/// bonus leaks into damage or hit numbers.
#[must_use]
pub fn plain_ship(id: u32, faction: u16, q: i32, r: i32, facing: u8) -> Ship {
    Ship::new(
        ShipId(id),
        format!("Test {id}"),
        "Test",
        SizeClass::Medium,
        FactionId(faction),
    )
    .with_position(HexCoord::new(q, r), Facing::new(facing))
    .with_crew(200, CrewSkill::Cadet)
}

/// A plain ship with one fore phaser of the given mark.
#[must_use]
pub fn phaser_ship(id: u32, faction: u16, q: i32, r: i32, facing: u8, mark: u8) -> Ship {
    plain_ship(id, faction, q, r, facing).with_weapon(WeaponArray::new(
        EnergyWeaponType::Phaser,
        mark,
        vec![Arc::Fore],
    ))
}

/// A plain ship with one fore photon bay of the given mark.
#[must_use]
pub fn torpedo_ship(id: u32, faction: u16, q: i32, r: i32, facing: u8, mark: u8) -> Ship {
    plain_ship(id, faction, q, r, facing).with_torpedo_bay(TorpedoBay::new(
        TorpedoType::Photon,
        mark,
        vec![Arc::Fore],
        10,
    ))
}

/// A plain target with the given shield capacity on every arc and armor.
#[must_use]
pub fn target_ship(id: u32, faction: u16, q: i32, r: i32, facing: u8, shields: f64, armor: f64) -> Ship {
    plain_ship(id, faction, q, r, facing)
        .with_shields(ArcMap::uniform(shields))
        .with_armor(armor)
}

/// Two catalogue ships facing each other across `distance` hexes on the q axis.
///
/// # Errors
///
/// Fails if either class is not in the built-in catalogue.
pub fn duel(class_a: &str, class_b: &str, distance: i32) -> Result<Vec<Ship>> {
    let catalogue = ShipCatalogue::with_builtin_classes();
    let a = catalogue
        .build(class_a, ShipId(1), "Alpha", "NCC-1", FactionId(0))?
        .with_position(HexCoord::ORIGIN, Facing::new(0));
    let b = catalogue
        .build(class_b, ShipId(2), "Bravo", "NCC-2", FactionId(1))?
        .with_position(HexCoord::new(distance, 0), Facing::new(3));
    Ok(vec![a, b])
}

/// A ready-to-run AI-vs-AI encounter.
#[derive(Debug, Clone)]
pub struct Skirmish {
    /// The engine.
    pub engine: CombatEngine<SeededRng>,
    /// Controllers, one per ship.
    pub controllers: Vec<ShipAi>,
    /// Controller RNG stream.
    pub ai_rng: SeededRng,
}

impl Skirmish {
    /// Set up `ships` under AI control, all ships in faction 0 using
    /// `personality_a` and everyone else `personality_b`.
    ///
    /// # Errors
    ///
    /// Fails if two ships share an id.
    pub fn new(
        ships: Vec<Ship>,
        seed: u64,
        personality_a: Personality,
        personality_b: Personality,
    ) -> Result<Self> {
        let controllers = ships
            .iter()
            .map(|s| {
                let personality = if s.faction == FactionId(0) {
                    personality_a
                } else {
                    personality_b
                };
                ShipAi::new(s.id, personality)
            })
            .collect();
        let engine = CombatEngine::new(ships, CombatConfig::default(), SeededRng::new(seed))?;
        Ok(Self {
            engine,
            controllers,
            ai_rng: controller_rng(seed),
        })
    }

    /// Run to an outcome or `max_turns`.
    pub fn run(&mut self, max_turns: u32) -> tactical_core::engine::CombatOutcome {
        tactical_core::ai::run_encounter(
            &mut self.engine,
            &mut self.controllers,
            &mut self.ai_rng,
            max_turns,
        )
    }
}

//! # Tactical Core
//!
//! Deterministic hex-grid starship combat resolver.
//!
//! This crate contains **only** combat logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every roll goes through an injected [`rng::CombatRng`])
//!
//! This separation enables:
//! - Headless AI-vs-AI batch runs
//! - Encounter records that replay exactly
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial hex coordinates, facings and bearings
//! - [`ship`] - Ship state: hull, shields, systems, power and crew
//! - [`weapons`] - Energy arrays and torpedo bays
//! - [`damage`] - Damage resolution against a ship
//! - [`targeting`] - Arcs, range bands and target validation
//! - [`engine`] - The eight-phase turn engine
//! - [`ai`] - Heuristic ship controllers
//! - [`data`] - Ship class templates and the catalogue
//! - [`record`] - Replayable encounter records

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod config;
pub mod damage;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod hex;
pub mod record;
pub mod rng;
pub mod ship;
pub mod targeting;
pub mod weapons;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{controller_rng, run_encounter, Intent, Personality, ShipAi};
    pub use crate::config::CombatConfig;
    pub use crate::damage::{DamageResult, DamageType};
    pub use crate::data::{ShipCatalogue, ShipTemplate};
    pub use crate::engine::{
        Action, CombatEngine, CombatOutcome, CombatPhase, MovementState, StateTransition,
    };
    pub use crate::error::{CombatError, IllegalAction, PowerRejection, Result, TargetRejection};
    pub use crate::events::CombatEvent;
    pub use crate::hex::{Facing, HexCoord};
    pub use crate::record::EncounterRecord;
    pub use crate::rng::{CombatRng, FixedRng, SeededRng};
    pub use crate::ship::{
        Arc, ArcMap, CrewSkill, FactionId, Officer, PowerDistribution, Ship, ShipId, SizeClass,
        Station, SystemKind,
    };
    pub use crate::targeting::TargetPriority;
    pub use crate::weapons::{EnergyWeaponType, TorpedoBay, TorpedoType, Weapon, WeaponArray};
}

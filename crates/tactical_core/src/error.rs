//! Error types for the combat resolver.
//!
//! Every error here is recoverable: a rejected action leaves the encounter
//! untouched and the caller may retry something else or pass. Hull failure
//! and warp core breach are *not* errors; they are reported through
//! [`DamageResult`](crate::damage::DamageResult).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::CombatPhase;
use crate::ship::{PowerChannel, ShipId};

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Top-level error type for all combat resolver errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// An action was attempted out of turn, out of phase, or against the movement rules.
    #[error("Illegal action: {0}")]
    IllegalAction(IllegalAction),

    /// A targeting request named a ship that cannot be engaged.
    #[error("Invalid target: {0}")]
    InvalidTarget(TargetRejection),

    /// A power allocation request exceeded a cap. Nothing was changed.
    #[error("Power request rejected: {0}")]
    ResourceExceeded(PowerRejection),

    /// No ship with this identifier exists in the encounter.
    #[error("Ship not found: {0}")]
    UnknownShip(ShipId),

    /// Two ships in one encounter share an identifier.
    #[error("Duplicate ship id: {0}")]
    DuplicateShip(ShipId),

    /// The ship catalogue has no template with this class name.
    #[error("Unknown ship class: {0}")]
    UnknownShipClass(String),

    /// Data text failed to parse.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParse {
        /// Name of the source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Binary encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// An encounter record was written by an incompatible format version.
    #[error("Encounter record version mismatch: expected {expected}, found {found}")]
    RecordVersion {
        /// Version this build understands.
        expected: u32,
        /// Version stored in the record.
        found: u32,
    },

    /// Replaying an encounter record produced a different final state.
    #[error("Replay diverged: expected hash {expected}, got {actual}")]
    ReplayDiverged {
        /// Hash stored in the record.
        expected: u64,
        /// Hash produced by the replay.
        actual: u64,
    },
}

impl From<IllegalAction> for CombatError {
    fn from(value: IllegalAction) -> Self {
        Self::IllegalAction(value)
    }
}

impl From<TargetRejection> for CombatError {
    fn from(value: TargetRejection) -> Self {
        Self::InvalidTarget(value)
    }
}

impl From<PowerRejection> for CombatError {
    fn from(value: PowerRejection) -> Self {
        Self::ResourceExceeded(value)
    }
}

/// Why an engine action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum IllegalAction {
    /// The action belongs to a different phase.
    #[error("not allowed during {actual:?} (needs {expected:?})")]
    WrongPhase {
        /// Phase the action requires.
        expected: CombatPhase,
        /// Phase the engine is in.
        actual: CombatPhase,
    },

    /// Another ship holds the current activation.
    #[error("ship {ship} is not acting (acting ship: {acting:?})")]
    NotActingShip {
        /// Ship that attempted to act.
        ship: ShipId,
        /// Ship whose activation it is, if any.
        acting: Option<ShipId>,
    },

    /// No movement points remain for this activation.
    #[error("no movement points remaining")]
    NoMovementPoints,

    /// Turning requires at least one hex of movement first.
    #[error("must move before turning")]
    MustMoveBeforeTurning,

    /// Only one turn is allowed per hex moved.
    #[error("already turned since the last move")]
    AlreadyTurned,

    /// The destination overlaps another ship.
    #[error("move blocked by ship {blocker}")]
    Collision {
        /// Ship occupying the destination.
        blocker: ShipId,
    },

    /// Every ship has already acted this phase.
    #[error("every ship has acted in {0:?}")]
    AllShipsActed(CombatPhase),

    /// The phase still has ships waiting to act.
    #[error("{0:?} phase is not complete")]
    PhaseIncomplete(CombatPhase),

    /// The ship is disabled or destroyed and cannot act.
    #[error("ship {0} cannot act")]
    ShipInoperable(ShipId),

    /// The encounter already has an outcome.
    #[error("combat is over")]
    CombatOver,
}

/// Why a target assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum TargetRejection {
    /// The target has been destroyed.
    #[error("target destroyed")]
    Destroyed,
    /// The target flies under the same colours.
    #[error("target is friendly")]
    SameFaction,
    /// The target is beyond maximum engagement range.
    #[error("target out of range at {distance} hexes")]
    OutOfRange {
        /// Hex distance to the target.
        distance: u32,
    },
    /// A ship cannot target itself.
    #[error("cannot target self")]
    SelfTarget,
}

/// Why a power redistribution request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum PowerRejection {
    /// A single channel exceeded its cap.
    #[error("{channel:?} request {requested} exceeds cap {cap}")]
    ChannelCap {
        /// Offending channel.
        channel: PowerChannel,
        /// Requested allocation.
        requested: u32,
        /// Per-channel cap.
        cap: u32,
    },
    /// The three channels together exceed available power.
    #[error("total {requested} exceeds available power {available}")]
    TotalExceeded {
        /// Sum of the requested allocations.
        requested: u32,
        /// Power the warp core can currently supply.
        available: u32,
    },
}

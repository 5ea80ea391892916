//! Structured combat notifications.
//!
//! The engine buffers these as it resolves actions. Hosts drain them for
//! display or persistence; ignoring them has no effect on the encounter.

use serde::{Deserialize, Serialize};

use crate::damage::DamageType;
use crate::engine::{CombatOutcome, CombatPhase};
use crate::error::CombatError;
use crate::hex::{Facing, HexCoord};
use crate::ship::{Arc, PowerDistribution, ShipId, SystemKind};
use crate::targeting::TargetPriority;

/// Something observable that happened during an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A new turn began.
    TurnStarted {
        /// Turn number, starting at 1.
        turn: u32,
    },
    /// The engine entered a phase.
    PhaseChanged {
        /// Turn number.
        turn: u32,
        /// Phase entered.
        phase: CombatPhase,
    },
    /// Initiative was rolled for the turn.
    InitiativeRolled {
        /// Acting order, first to last.
        order: Vec<ShipId>,
    },
    /// A ship changed hex.
    ShipMoved {
        /// Moving ship.
        ship: ShipId,
        /// Previous hex.
        from: HexCoord,
        /// New hex.
        to: HexCoord,
        /// Movement points left.
        points_remaining: u32,
    },
    /// A ship changed heading.
    ShipTurned {
        /// Turning ship.
        ship: ShipId,
        /// New heading.
        facing: Facing,
        /// Movement points left.
        points_remaining: u32,
    },
    /// A target slot was assigned.
    TargetSelected {
        /// Attacking ship.
        attacker: ShipId,
        /// Assigned target.
        target: ShipId,
        /// Slot used.
        priority: TargetPriority,
    },
    /// A weapon fired.
    WeaponFired {
        /// Firing ship.
        attacker: ShipId,
        /// Ship fired upon.
        target: ShipId,
        /// Weapon family.
        kind: DamageType,
        /// Defender's shield arc facing the shot.
        shield_arc: Arc,
        /// Whether the shot connected.
        hit: bool,
        /// Damage delivered, 0 on a miss.
        damage: f64,
    },
    /// A subsystem lost health.
    SystemDamaged {
        /// Damaged ship.
        ship: ShipId,
        /// Damaged subsystem.
        system: SystemKind,
        /// Health remaining.
        health: f64,
    },
    /// A subsystem reached zero.
    SystemDestroyed {
        /// Damaged ship.
        ship: ShipId,
        /// Lost subsystem.
        system: SystemKind,
        /// Consequence text for the subsystem.
        message: String,
    },
    /// Hull integrity failed; the ship drifts disabled.
    HullFailure {
        /// Disabled ship.
        ship: ShipId,
        /// Crew killed in the failure.
        casualties: u32,
    },
    /// The warp core breached.
    WarpCoreBreach {
        /// Lost ship.
        ship: ShipId,
        /// Whether the crew evacuated in time.
        crew_evacuated: bool,
    },
    /// A ship left the fight permanently.
    ShipDestroyed {
        /// Lost ship.
        ship: ShipId,
    },
    /// Power was reallocated.
    PowerRedistributed {
        /// Ship reallocating.
        ship: ShipId,
        /// New allocation.
        distribution: PowerDistribution,
    },
    /// A subsystem was patched up.
    SystemRepaired {
        /// Repairing ship.
        ship: ShipId,
        /// Repaired subsystem.
        system: SystemKind,
        /// Health after repair.
        health: f64,
    },
    /// An action was refused; nothing changed.
    ActionRejected {
        /// Ship that attempted the action, when known.
        ship: Option<ShipId>,
        /// Why it was refused.
        reason: String,
    },
    /// The encounter reached an outcome.
    CombatEnded {
        /// Final outcome.
        outcome: CombatOutcome,
    },
}

impl CombatEvent {
    pub(crate) fn rejected(ship: Option<ShipId>, error: &CombatError) -> Self {
        CombatEvent::ActionRejected {
            ship,
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IllegalAction;

    #[test]
    fn test_rejection_carries_reason() {
        let event = CombatEvent::rejected(Some(ShipId(3)), &IllegalAction::NoMovementPoints.into());
        assert_eq!(
            event,
            CombatEvent::ActionRejected {
                ship: Some(ShipId(3)),
                reason: "Illegal action: no movement points remaining".to_string(),
            }
        );
    }

    #[test]
    fn test_events_encode_as_json() {
        let event = CombatEvent::WeaponFired {
            attacker: ShipId(1),
            target: ShipId(2),
            kind: DamageType::Energy,
            shield_arc: Arc::Fore,
            hit: true,
            damage: 45.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("WeaponFired"));
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

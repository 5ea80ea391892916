//! Movement phase rules.
//!
//! Moving or turning costs one point. A ship must move before it may turn
//! and may turn at most once per hex moved.

use serde::{Deserialize, Serialize};

use super::CombatEngine;
use crate::error::{IllegalAction, Result};
use crate::events::CombatEvent;
use crate::hex::HexCoord;
use crate::rng::CombatRng;
use crate::ship::ShipId;

/// A ship's movement budget for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MovementState {
    /// Points left to spend.
    pub points_remaining: u32,
    /// Whether the ship has moved at least one hex this activation.
    pub has_moved: bool,
    /// Turns made since the last hex moved.
    pub turns_since_move: u32,
}

impl MovementState {
    /// Fresh budget.
    #[must_use]
    pub const fn new(points: u32) -> Self {
        Self {
            points_remaining: points,
            has_moved: false,
            turns_since_move: 0,
        }
    }

    /// Whether a turn is legal right now.
    pub fn check_turn(&self) -> std::result::Result<(), IllegalAction> {
        if !self.has_moved {
            return Err(IllegalAction::MustMoveBeforeTurning);
        }
        if self.turns_since_move >= 1 {
            return Err(IllegalAction::AlreadyTurned);
        }
        if self.points_remaining == 0 {
            return Err(IllegalAction::NoMovementPoints);
        }
        Ok(())
    }
}

impl<R: CombatRng> CombatEngine<R> {
    pub(super) fn reset_movement(&mut self) {
        self.movement = self
            .ships
            .iter()
            .filter(|s| s.is_operational())
            .map(|s| (s.id, MovementState::new(s.movement_points())))
            .collect();
    }

    /// First ship that `ship` would overlap if centered at `center`.
    ///
    /// Multi-hex hulls check all seven hexes. Destroyed ships are gone;
    /// disabled hulls still block.
    #[must_use]
    pub fn would_collide_at(&self, ship: ShipId, center: HexCoord) -> Option<ShipId> {
        let mover = self.ship(ship)?;
        let footprint = mover.footprint_at(center);
        self.ships
            .iter()
            .filter(|other| other.id != ship && !other.is_destroyed())
            .find(|other| {
                other
                    .occupied_hexes()
                    .iter()
                    .any(|hex| footprint.contains(hex))
            })
            .map(|other| other.id)
    }

    pub(super) fn move_ship(&mut self, ship: ShipId, forward: bool) -> Result<()> {
        let idx = self.index_of(ship)?;
        let mut state = self.movement.get(&ship).copied().unwrap_or_default();
        if state.points_remaining == 0 {
            return Err(IllegalAction::NoMovementPoints.into());
        }

        let from = self.ships[idx].position;
        let facing = self.ships[idx].facing;
        let to = if forward { from.ahead(facing) } else { from.behind(facing) };
        if let Some(blocker) = self.would_collide_at(ship, to) {
            return Err(IllegalAction::Collision { blocker }.into());
        }

        self.ships[idx].position = to;
        state.points_remaining -= 1;
        state.has_moved = true;
        state.turns_since_move = 0;
        self.movement.insert(ship, state);

        tracing::debug!(ship = %ship, %from, %to, points = state.points_remaining, "ship moved");
        self.events.push(CombatEvent::ShipMoved {
            ship,
            from,
            to,
            points_remaining: state.points_remaining,
        });
        Ok(())
    }

    pub(super) fn turn_ship(&mut self, ship: ShipId, starboard: bool) -> Result<()> {
        let idx = self.index_of(ship)?;
        let mut state = self.movement.get(&ship).copied().unwrap_or_default();
        state.check_turn()?;

        let ship_ref = &mut self.ships[idx];
        ship_ref.facing = if starboard {
            ship_ref.facing.turned_right()
        } else {
            ship_ref.facing.turned_left()
        };
        let facing = ship_ref.facing;
        state.points_remaining -= 1;
        state.turns_since_move += 1;
        self.movement.insert(ship, state);

        tracing::debug!(ship = %ship, facing = facing.index(), points = state.points_remaining, "ship turned");
        self.events.push(CombatEvent::ShipTurned {
            ship,
            facing,
            points_remaining: state.points_remaining,
        });
        Ok(())
    }
}

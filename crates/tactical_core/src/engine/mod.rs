//! The turn engine.
//!
//! A [`CombatEngine`] owns every ship in an encounter and walks them
//! through an eight-phase turn:
//!
//! | Phase        | Driven by | What happens |
//! |--------------|-----------|--------------|
//! | Initiative   | engine    | Living ships roll d20 + captain bonus; order is fixed for the turn |
//! | Movement     | ships     | Each ship spends movement points moving and turning |
//! | Targeting    | ships     | Each ship assigns up to three targets |
//! | Firing       | ships     | Each ship fires every ready weapon that bears on a target |
//! | Damage       | engine    | Pass-through; hits were applied during Firing |
//! | Power        | ships     | Each ship may reallocate power |
//! | Repair       | ships     | Each ship may patch one subsystem |
//! | Housekeeping | engine    | Weapon cooldowns advance; the next turn begins |
//!
//! In ship-driven phases ships act one at a time in initiative order. An
//! activation ends when the ship passes, fires, reallocates power or
//! repairs. [`Action::Advance`] moves on once every ship has acted;
//! engine-driven phases resolve on the way through.
//!
//! Everything goes through [`CombatEngine::step`]. The named methods
//! ([`CombatEngine::move_forward`], [`CombatEngine::fire_weapons`], ...) are
//! thin wrappers that first check the caller is the acting ship.

mod firing;
mod movement;

pub use movement::MovementState;

use std::cmp::Reverse;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::error::{CombatError, IllegalAction, Result};
use crate::events::CombatEvent;
use crate::rng::CombatRng;
use crate::ship::{Arc, FactionId, PowerDistribution, Ship, ShipId, Station, SystemKind};
use crate::targeting::{TargetAssignment, TargetPriority};
use crate::weapons::Weapon;

/// One step of the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CombatPhase {
    /// Roll acting order.
    Initiative,
    /// Move and turn.
    Movement,
    /// Assign targets.
    Targeting,
    /// Fire weapons.
    Firing,
    /// Batched damage effects.
    Damage,
    /// Reallocate power.
    Power,
    /// Field repairs.
    Repair,
    /// End-of-turn upkeep.
    Housekeeping,
}

impl CombatPhase {
    /// All phases in turn order.
    pub const ALL: [CombatPhase; 8] = [
        CombatPhase::Initiative,
        CombatPhase::Movement,
        CombatPhase::Targeting,
        CombatPhase::Firing,
        CombatPhase::Damage,
        CombatPhase::Power,
        CombatPhase::Repair,
        CombatPhase::Housekeeping,
    ];

    /// Phase that follows this one. Housekeeping wraps to Initiative.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            CombatPhase::Initiative => CombatPhase::Movement,
            CombatPhase::Movement => CombatPhase::Targeting,
            CombatPhase::Targeting => CombatPhase::Firing,
            CombatPhase::Firing => CombatPhase::Damage,
            CombatPhase::Damage => CombatPhase::Power,
            CombatPhase::Power => CombatPhase::Repair,
            CombatPhase::Repair => CombatPhase::Housekeeping,
            CombatPhase::Housekeeping => CombatPhase::Initiative,
        }
    }

    /// Whether ships act individually in this phase.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            CombatPhase::Movement
                | CombatPhase::Targeting
                | CombatPhase::Firing
                | CombatPhase::Power
                | CombatPhase::Repair
        )
    }
}

/// Input to [`CombatEngine::step`]. Ship actions apply to the acting ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move one hex ahead.
    MoveForward,
    /// Move one hex astern.
    MoveBackward,
    /// Turn 60 degrees to port.
    TurnLeft,
    /// Turn 60 degrees to starboard.
    TurnRight,
    /// Assign a target slot.
    SelectTarget {
        /// Ship to engage.
        target: ShipId,
        /// Slot to fill.
        priority: TargetPriority,
    },
    /// Fire every ready weapon that bears on an assigned target.
    Fire,
    /// Reallocate power.
    RedistributePower {
        /// Engine allocation.
        engines: u32,
        /// Shield allocation.
        shields: u32,
        /// Weapon allocation.
        weapons: u32,
    },
    /// Field-repair one subsystem.
    Repair(SystemKind),
    /// End the acting ship's activation without doing anything more.
    Pass,
    /// Leave the current phase once every ship has acted.
    Advance,
}

impl Action {
    /// Phase this action belongs to, or `None` for phase-independent inputs.
    #[must_use]
    pub const fn phase(self) -> Option<CombatPhase> {
        match self {
            Action::MoveForward | Action::MoveBackward | Action::TurnLeft | Action::TurnRight => {
                Some(CombatPhase::Movement)
            }
            Action::SelectTarget { .. } => Some(CombatPhase::Targeting),
            Action::Fire => Some(CombatPhase::Firing),
            Action::RedistributePower { .. } => Some(CombatPhase::Power),
            Action::Repair(_) => Some(CombatPhase::Repair),
            Action::Pass | Action::Advance => None,
        }
    }
}

/// State of the encounter as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// At least two factions still field an operational ship.
    Ongoing,
    /// Only this faction has operational ships left.
    Victory(FactionId),
    /// Nobody has an operational ship left.
    MutualDestruction,
}

/// Where the engine stands after a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Current turn.
    pub turn: u32,
    /// Current phase.
    pub phase: CombatPhase,
    /// Ship whose activation it is, if any.
    pub acting_ship: Option<ShipId>,
    /// Encounter outcome so far.
    pub outcome: CombatOutcome,
}

/// Turn engine for one encounter.
#[derive(Debug, Clone)]
pub struct CombatEngine<R: CombatRng> {
    ships: Vec<Ship>,
    config: CombatConfig,
    rng: R,
    turn_number: u32,
    phase: CombatPhase,
    initiative_order: Vec<ShipId>,
    current_ship_index: usize,
    movement: BTreeMap<ShipId, MovementState>,
    targets: BTreeMap<ShipId, TargetAssignment>,
    outcome: CombatOutcome,
    events: Vec<CombatEvent>,
    history: Vec<Action>,
}

impl<R: CombatRng> CombatEngine<R> {
    /// Start an encounter.
    ///
    /// Ships are stored in id order. Turn 1 initiative is rolled
    /// immediately, leaving the engine in the Movement phase.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::DuplicateShip`] if two ships share an id.
    pub fn new(mut ships: Vec<Ship>, config: CombatConfig, rng: R) -> Result<Self> {
        ships.sort_by_key(|s| s.id);
        if let Some(pair) = ships.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(CombatError::DuplicateShip(pair[0].id));
        }

        let mut engine = Self {
            ships,
            config,
            rng,
            turn_number: 0,
            phase: CombatPhase::Housekeeping,
            initiative_order: Vec::new(),
            current_ship_index: 0,
            movement: BTreeMap::new(),
            targets: BTreeMap::new(),
            outcome: CombatOutcome::Ongoing,
            events: Vec::new(),
            history: Vec::new(),
        };
        engine.check_outcome();
        engine.enter_phase(CombatPhase::Initiative);
        Ok(engine)
    }

    // ── Driver ──────────────────────────────────────────────────────────

    /// Apply one input.
    ///
    /// On success the action is appended to the history. On error nothing
    /// changes except an `ActionRejected` event.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::IllegalAction`] for out-of-turn, out-of-phase
    /// or rule-breaking actions, [`CombatError::InvalidTarget`] for refused
    /// target assignments and [`CombatError::ResourceExceeded`] for refused
    /// power requests.
    pub fn step(&mut self, action: Action) -> Result<StateTransition> {
        let acting = self.current_acting_ship();
        match self.apply(action) {
            Ok(()) => {
                self.history.push(action);
                Ok(self.transition())
            }
            Err(e) => {
                tracing::debug!(
                    turn = self.turn_number,
                    phase = ?self.phase,
                    ship = ?acting,
                    action = ?action,
                    error = %e,
                    "action rejected"
                );
                self.events.push(CombatEvent::rejected(acting, &e));
                Err(e)
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        if self.outcome != CombatOutcome::Ongoing {
            return Err(IllegalAction::CombatOver.into());
        }
        if action == Action::Advance {
            return self.try_advance();
        }
        if let Some(expected) = action.phase() {
            self.require_phase(expected)?;
        }
        let ship = self
            .current_acting_ship()
            .ok_or(IllegalAction::AllShipsActed(self.phase))?;

        match action {
            Action::MoveForward => self.move_ship(ship, true),
            Action::MoveBackward => self.move_ship(ship, false),
            Action::TurnLeft => self.turn_ship(ship, false),
            Action::TurnRight => self.turn_ship(ship, true),
            Action::SelectTarget { target, priority } => self.assign_target(ship, target, priority),
            Action::Fire => {
                self.resolve_fire(ship)?;
                self.end_activation();
                self.check_outcome();
                Ok(())
            }
            Action::RedistributePower {
                engines,
                shields,
                weapons,
            } => {
                self.reallocate(ship, engines, shields, weapons)?;
                self.end_activation();
                Ok(())
            }
            Action::Repair(system) => {
                self.field_repair(ship, system)?;
                self.end_activation();
                Ok(())
            }
            Action::Pass => {
                self.end_activation();
                Ok(())
            }
            Action::Advance => Ok(()),
        }
    }

    fn transition(&self) -> StateTransition {
        StateTransition {
            turn: self.turn_number,
            phase: self.phase,
            acting_ship: self.current_acting_ship(),
            outcome: self.outcome,
        }
    }

    fn require_phase(&self, expected: CombatPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(IllegalAction::WrongPhase {
                expected,
                actual: self.phase,
            }
            .into())
        }
    }

    fn require_acting(&self, ship: ShipId) -> Result<()> {
        self.index_of(ship)?;
        let acting = self.current_acting_ship();
        if acting == Some(ship) {
            Ok(())
        } else {
            Err(IllegalAction::NotActingShip { ship, acting }.into())
        }
    }

    // ── Named operations ────────────────────────────────────────────────

    /// Leave the current phase, resolving any engine-driven phases on the way.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction::PhaseIncomplete`] while ships are still
    /// waiting to act.
    pub fn advance_phase(&mut self) -> Result<StateTransition> {
        self.step(Action::Advance)
    }

    /// End the acting ship's activation.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction::NotActingShip`] if `ship` is not acting.
    pub fn pass(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::Pass)
    }

    /// Move `ship` one hex forward.
    ///
    /// # Errors
    ///
    /// Fails out of turn, out of phase, without movement points or on collision.
    pub fn move_forward(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::MoveForward)
    }

    /// Move `ship` one hex backward.
    ///
    /// # Errors
    ///
    /// Fails out of turn, out of phase, without movement points or on collision.
    pub fn move_backward(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::MoveBackward)
    }

    /// Turn `ship` to port.
    ///
    /// # Errors
    ///
    /// Fails out of turn, out of phase, before moving, on a second turn for
    /// the same hex, or without movement points.
    pub fn turn_left(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::TurnLeft)
    }

    /// Turn `ship` to starboard.
    ///
    /// # Errors
    ///
    /// Same as [`Self::turn_left`].
    pub fn turn_right(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::TurnRight)
    }

    /// Assign `target` to one of `attacker`'s slots.
    ///
    /// # Errors
    ///
    /// Fails out of turn or out of phase, and with
    /// [`CombatError::InvalidTarget`] for self, friendly, destroyed or
    /// out-of-range targets.
    pub fn select_target(
        &mut self,
        attacker: ShipId,
        target: ShipId,
        priority: TargetPriority,
    ) -> Result<StateTransition> {
        self.acting_step(attacker, Action::SelectTarget { target, priority })
    }

    /// Fire all of `ship`'s ready weapons that bear on its targets.
    ///
    /// # Errors
    ///
    /// Fails out of turn or out of phase.
    pub fn fire_weapons(&mut self, ship: ShipId) -> Result<StateTransition> {
        self.acting_step(ship, Action::Fire)
    }

    /// Reallocate `ship`'s power during the Power phase.
    ///
    /// # Errors
    ///
    /// Fails out of turn or out of phase, and with
    /// [`CombatError::ResourceExceeded`] if the request breaks a cap.
    pub fn redistribute_power(
        &mut self,
        ship: ShipId,
        distribution: PowerDistribution,
    ) -> Result<StateTransition> {
        self.acting_step(
            ship,
            Action::RedistributePower {
                engines: distribution.engines,
                shields: distribution.shields,
                weapons: distribution.weapons,
            },
        )
    }

    /// Field-repair one of `ship`'s subsystems during the Repair phase.
    ///
    /// # Errors
    ///
    /// Fails out of turn or out of phase.
    pub fn repair(&mut self, ship: ShipId, system: SystemKind) -> Result<StateTransition> {
        self.acting_step(ship, Action::Repair(system))
    }

    fn acting_step(&mut self, ship: ShipId, action: Action) -> Result<StateTransition> {
        if let Err(e) = self.require_acting(ship) {
            self.events.push(CombatEvent::rejected(Some(ship), &e));
            return Err(e);
        }
        self.step(action)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Ship whose activation it is, if the phase is ship-driven and not complete.
    #[must_use]
    pub fn current_acting_ship(&self) -> Option<ShipId> {
        if !self.phase.is_interactive() {
            return None;
        }
        self.initiative_order.get(self.current_ship_index).copied()
    }

    /// Whether every ship has acted in the current phase.
    #[must_use]
    pub fn is_phase_complete(&self) -> bool {
        self.current_ship_index >= self.initiative_order.len()
    }

    /// Current turn, starting at 1.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Acting order for this turn.
    #[must_use]
    pub fn initiative_order(&self) -> &[ShipId] {
        &self.initiative_order
    }

    /// Position in the initiative order.
    #[must_use]
    pub const fn current_ship_index(&self) -> usize {
        self.current_ship_index
    }

    /// All ships, in id order.
    #[must_use]
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Look up a ship.
    #[must_use]
    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// Mutable access to a ship, for host-side setup and upkeep.
    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    /// Movement budget for a ship this turn.
    #[must_use]
    pub fn movement_state(&self, id: ShipId) -> Option<MovementState> {
        self.movement.get(&id).copied()
    }

    /// A ship's target assignments.
    #[must_use]
    pub fn targets(&self, id: ShipId) -> TargetAssignment {
        self.targets.get(&id).copied().unwrap_or_default()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Accepted actions so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// Take all buffered events.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current outcome.
    #[must_use]
    pub const fn combat_outcome(&self) -> CombatOutcome {
        self.outcome
    }

    /// Deterministic hash over turn, phase and every ship's mutable state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn_number.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.current_ship_index.hash(&mut hasher);
        self.initiative_order.hash(&mut hasher);
        self.ships.len().hash(&mut hasher);

        for ship in &self.ships {
            ship.id.hash(&mut hasher);
            ship.position.hash(&mut hasher);
            ship.facing.hash(&mut hasher);
            ship.hull().to_bits().hash(&mut hasher);
            for (_, shield) in ship.shields().iter() {
                shield.to_bits().hash(&mut hasher);
            }
            for (_, health) in ship.systems().iter() {
                health.to_bits().hash(&mut hasher);
            }
            ship.power().hash(&mut hasher);
            ship.crew_count().hash(&mut hasher);
            ship.crew_skill().hash(&mut hasher);
            ship.is_destroyed().hash(&mut hasher);
            for weapon in &ship.weapon_arrays {
                weapon.cooldown_remaining.hash(&mut hasher);
            }
            for bay in &ship.torpedo_bays {
                bay.cooldown_remaining.hash(&mut hasher);
                bay.torpedoes().hash(&mut hasher);
            }
            self.targets(ship.id).hash(&mut hasher);
        }

        hasher.finish()
    }

    // ── Phase machinery ─────────────────────────────────────────────────

    fn try_advance(&mut self) -> Result<()> {
        if self.phase.is_interactive() && !self.is_phase_complete() {
            return Err(IllegalAction::PhaseIncomplete(self.phase).into());
        }
        self.enter_phase(self.phase.next());
        Ok(())
    }

    /// Enter `phase`, running engine-driven phases through to the next
    /// ship-driven one.
    fn enter_phase(&mut self, phase: CombatPhase) {
        let mut phase = phase;
        loop {
            if phase == CombatPhase::Initiative {
                self.turn_number += 1;
                self.events.push(CombatEvent::TurnStarted {
                    turn: self.turn_number,
                });
                tracing::info!(turn = self.turn_number, "turn started");
            }
            self.phase = phase;
            self.current_ship_index = 0;
            self.events.push(CombatEvent::PhaseChanged {
                turn: self.turn_number,
                phase,
            });
            tracing::debug!(turn = self.turn_number, phase = ?phase, "phase changed");

            match phase {
                CombatPhase::Initiative => self.roll_initiative(),
                CombatPhase::Movement => self.reset_movement(),
                CombatPhase::Housekeeping => self.housekeeping(),
                _ => {}
            }

            if phase.is_interactive() {
                self.skip_inoperable();
                return;
            }
            if self.outcome != CombatOutcome::Ongoing {
                return;
            }
            phase = phase.next();
        }
    }

    fn roll_initiative(&mut self) {
        let mut rolls: Vec<(i32, ShipId)> = Vec::new();
        for ship in self.ships.iter().filter(|s| s.is_operational()) {
            let bonus = (ship.command_crew.bonus(Station::Captain) * 20.0).round() as i32;
            rolls.push((self.rng.roll_initiative(bonus), ship.id));
        }
        rolls.sort_by_key(|(roll, id)| (Reverse(*roll), *id));
        self.initiative_order = rolls.into_iter().map(|(_, id)| id).collect();
        tracing::debug!(turn = self.turn_number, order = ?self.initiative_order, "initiative rolled");
        self.events.push(CombatEvent::InitiativeRolled {
            order: self.initiative_order.clone(),
        });
    }

    fn housekeeping(&mut self) {
        for ship in self.ships.iter_mut().filter(|s| !s.is_destroyed()) {
            ship.advance_cooldowns();
        }
        self.check_outcome();
    }

    fn end_activation(&mut self) {
        self.current_ship_index += 1;
        self.skip_inoperable();
    }

    /// Step past ships that were disabled or destroyed since initiative.
    fn skip_inoperable(&mut self) {
        while let Some(id) = self.initiative_order.get(self.current_ship_index) {
            if self.ship(*id).is_some_and(Ship::is_operational) {
                break;
            }
            self.current_ship_index += 1;
        }
    }

    fn check_outcome(&mut self) {
        if self.outcome != CombatOutcome::Ongoing {
            return;
        }
        let factions: BTreeSet<FactionId> = self
            .ships
            .iter()
            .filter(|s| s.is_operational())
            .map(|s| s.faction)
            .collect();
        let outcome = match factions.len() {
            0 => CombatOutcome::MutualDestruction,
            1 => factions
                .iter()
                .next()
                .map_or(CombatOutcome::MutualDestruction, |f| CombatOutcome::Victory(*f)),
            _ => CombatOutcome::Ongoing,
        };
        if outcome != CombatOutcome::Ongoing {
            tracing::info!(turn = self.turn_number, outcome = ?outcome, "combat ended");
            self.outcome = outcome;
            self.events.push(CombatEvent::CombatEnded { outcome });
        }
    }

    // ── Power & repair ──────────────────────────────────────────────────

    fn reallocate(&mut self, ship: ShipId, engines: u32, shields: u32, weapons: u32) -> Result<()> {
        let idx = self.index_of(ship)?;
        self.ships[idx].redistribute_power(engines, shields, weapons)?;
        let distribution = self.ships[idx].power();
        tracing::debug!(ship = %ship, ?distribution, "power redistributed");
        self.events.push(CombatEvent::PowerRedistributed { ship, distribution });
        Ok(())
    }

    fn field_repair(&mut self, ship: ShipId, system: SystemKind) -> Result<()> {
        let idx = self.index_of(ship)?;
        let amount = self.config.field_repair_amount;
        let health = self.ships[idx].repair_system(system, amount);
        tracing::debug!(ship = %ship, system = %system, health, "system repaired");
        self.events.push(CombatEvent::SystemRepaired {
            ship,
            system,
            health,
        });
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn index_of(&self, id: ShipId) -> Result<usize> {
        self.ships
            .binary_search_by_key(&id, |s| s.id)
            .map_err(|_| CombatError::UnknownShip(id))
    }

    /// Whether any weapon on `ship` could bear on `arc` once ready.
    #[must_use]
    pub fn can_bear(&self, ship: ShipId, arc: Arc) -> bool {
        self.ship(ship).is_some_and(|s| {
            s.weapon_arrays.iter().any(|w| w.covers(arc))
                || s.torpedo_bays
                    .iter()
                    .any(|t| t.covers(arc) && t.torpedoes() > 0)
        })
    }
}

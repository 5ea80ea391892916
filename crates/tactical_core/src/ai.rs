//! Heuristic ship controller.
//!
//! Decisions are built from pure scoring functions so each piece can be
//! tested without running a turn:
//!
//! - [`score_target`] / [`rank_targets`] pick who to shoot.
//! - [`choose_intent`] decides what the ship is trying to do this turn.
//! - [`candidate_plans`] enumerates legal maneuver sequences and
//!   [`score_move`] / [`rank_moves`] grade where each one ends up.
//!
//! Randomness is confined to breaking ties between equally scored plans and
//! to the evasion coin. [`ShipAi::act`] glues the pieces to a
//! [`CombatEngine`].

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::engine::{Action, CombatEngine, CombatOutcome, CombatPhase, MovementState};
use crate::error::{CombatError, IllegalAction, Result};
use crate::hex::{Facing, HexCoord};
use crate::rng::{CombatRng, SeededRng};
use crate::ship::{Arc, Ship, ShipId, SystemKind};
use crate::targeting::{arc_toward, validate_target, TargetPriority};
use crate::weapons::Weapon;

/// Hull fraction above the retreat threshold at which a retreating ship rejoins.
pub const RETREAT_HYSTERESIS: f64 = 0.2;

/// Offset between an encounter seed and its controller stream.
pub const CONTROLLER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Controller RNG for an encounter seeded with `seed`.
///
/// Kept apart from the engine stream, so a recorded action list replays
/// without the controllers.
#[must_use]
pub fn controller_rng(seed: u64) -> SeededRng {
    SeededRng::new(seed.wrapping_add(CONTROLLER_STREAM))
}

/// Behavioral profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Personality {
    /// Closes to knife range and stays there.
    Aggressive,
    /// Hangs back, turns its best shields to the enemy.
    Defensive,
    /// Middle of the road.
    #[default]
    Balanced,
    /// Fights from the edge of energy weapon range.
    Sniper,
}

impl Personality {
    /// All personalities.
    pub const ALL: [Personality; 4] = [
        Personality::Aggressive,
        Personality::Defensive,
        Personality::Balanced,
        Personality::Sniper,
    ];

    /// Distance the ship tries to hold from its target.
    #[must_use]
    pub const fn preferred_range(self) -> u32 {
        match self {
            Personality::Aggressive => 4,
            Personality::Defensive => 8,
            Personality::Balanced => 6,
            Personality::Sniper => 10,
        }
    }

    /// Whether the ship closes as soon as it is beyond preferred range.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(self, Personality::Aggressive | Personality::Balanced)
    }

    /// Hull fraction below which the ship disengages.
    #[must_use]
    pub const fn retreat_threshold(self) -> f64 {
        match self {
            Personality::Aggressive => 0.2,
            Personality::Defensive => 0.5,
            Personality::Balanced => 0.3,
            Personality::Sniper => 0.4,
        }
    }

    /// Chance per activation at optimal range of rotating shields or evading.
    #[must_use]
    pub const fn evasion_priority(self) -> f64 {
        match self {
            Personality::Aggressive => 0.3,
            Personality::Defensive => 0.8,
            Personality::Balanced => 0.5,
            Personality::Sniper => 0.6,
        }
    }
}

/// What a ship is trying to achieve with its movement this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Open the range and keep guns on the threat if possible.
    Retreat,
    /// Rotate until some weapon bears.
    BringArcToBear,
    /// Reduce range toward the preferred distance.
    Close,
    /// Increase range toward the preferred distance.
    Open,
    /// Present a fresher shield arc to the threat.
    RotateShields,
    /// Shift position while holding range.
    Evade,
    /// Stay put.
    Hold,
}

/// One movement input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Maneuver {
    /// One hex ahead.
    Forward,
    /// One hex astern.
    Backward,
    /// Turn to port.
    Left,
    /// Turn to starboard.
    Right,
}

impl Maneuver {
    const ALL: [Maneuver; 4] = [
        Maneuver::Forward,
        Maneuver::Backward,
        Maneuver::Left,
        Maneuver::Right,
    ];

    /// Engine action for this maneuver.
    #[must_use]
    pub const fn action(self) -> Action {
        match self {
            Maneuver::Forward => Action::MoveForward,
            Maneuver::Backward => Action::MoveBackward,
            Maneuver::Left => Action::TurnLeft,
            Maneuver::Right => Action::TurnRight,
        }
    }

    /// Pose after this maneuver.
    #[must_use]
    pub fn apply(self, position: HexCoord, facing: Facing) -> (HexCoord, Facing) {
        match self {
            Maneuver::Forward => (position.ahead(facing), facing),
            Maneuver::Backward => (position.behind(facing), facing),
            Maneuver::Left => (position, facing.turned_left()),
            Maneuver::Right => (position, facing.turned_right()),
        }
    }

    const fn is_turn(self) -> bool {
        matches!(self, Maneuver::Left | Maneuver::Right)
    }
}

/// A maneuver sequence and where it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    /// Maneuvers in order.
    pub maneuvers: Vec<Maneuver>,
    /// Final hex.
    pub position: HexCoord,
    /// Final heading.
    pub facing: Facing,
}

/// Desirability of `candidate` as a target for `attacker`.
///
/// Nearer is better, wounded targets are worth finishing and heavily armed
/// ones are worth silencing. Sticking with the current target earns a bonus
/// so the ship does not dither.
#[must_use]
pub fn score_target(attacker: &Ship, candidate: &Ship, current: Option<ShipId>) -> f64 {
    let distance = f64::from(attacker.position.distance(candidate.position));
    let damage_potential = (1.0 - candidate.hull_fraction()) * 50.0;
    let threat = candidate.weapon_count() as f64 * 10.0;
    let loyalty = if current == Some(candidate.id) { 25.0 } else { 0.0 };
    -distance + damage_potential + threat + loyalty
}

/// Every legal, operational target for `attacker`, best first. Ties go to
/// the lower id.
#[must_use]
pub fn rank_targets(
    attacker: &Ship,
    ships: &[Ship],
    config: &CombatConfig,
    current: Option<ShipId>,
) -> Vec<(ShipId, f64)> {
    let mut ranked: Vec<(ShipId, f64)> = ships
        .iter()
        .filter(|s| s.is_operational() && validate_target(attacker, s, config).is_ok())
        .map(|s| (s.id, score_target(attacker, s, current)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Whether some weapon on `ship` would bear on `target` from this pose.
#[must_use]
pub fn bears_on(ship: &Ship, position: HexCoord, facing: Facing, target: HexCoord) -> bool {
    let arc = arc_toward(position, facing, target);
    ship.weapon_arrays.iter().any(|w| w.covers(arc))
        || ship
            .torpedo_bays
            .iter()
            .any(|t| t.covers(arc) && t.torpedoes() > 0)
}

/// Strongest shield arc by charge fraction; ties go to fore, starboard, aft, port.
fn freshest_arc(ship: &Ship) -> Arc {
    Arc::ALL
        .iter()
        .copied()
        .fold(Arc::Fore, |best, arc| {
            if ship.shield_fraction(arc) > ship.shield_fraction(best) {
                arc
            } else {
                best
            }
        })
}

/// Decide this activation's movement intent.
///
/// `retreating` is the latch held by [`ShipAi`]; `coin` is the result of the
/// evasion roll for this activation.
#[must_use]
pub fn choose_intent(
    personality: Personality,
    retreating: bool,
    ship: &Ship,
    target: Option<&Ship>,
    coin: bool,
) -> Intent {
    if retreating {
        return Intent::Retreat;
    }
    let Some(target) = target else {
        return Intent::Hold;
    };
    if !bears_on(ship, ship.position, ship.facing, target.position) {
        return Intent::BringArcToBear;
    }

    let distance = ship.position.distance(target.position);
    let preferred = personality.preferred_range();
    let tolerance = if personality.is_aggressive() { 0 } else { 1 };
    if distance > preferred + tolerance {
        return Intent::Close;
    }
    if distance + 1 < preferred {
        return Intent::Open;
    }

    if coin {
        let facing_arc = arc_toward(ship.position, ship.facing, target.position);
        let best = freshest_arc(ship);
        if ship.shield_fraction(best) > ship.shield_fraction(facing_arc) {
            Intent::RotateShields
        } else {
            Intent::Evade
        }
    } else {
        Intent::Hold
    }
}

/// All maneuver sequences of up to `depth` steps that are legal under the
/// movement rules from `state`, starting at `(position, facing)`.
///
/// `blocked` reports hexes the ship cannot enter. The empty plan is always
/// included first.
#[must_use]
pub fn candidate_plans(
    state: MovementState,
    depth: u32,
    position: HexCoord,
    facing: Facing,
    blocked: &dyn Fn(HexCoord) -> bool,
) -> Vec<MovePlan> {
    let mut plans = Vec::new();
    let mut prefix = Vec::new();
    extend_plans(
        state,
        depth.min(state.points_remaining),
        position,
        facing,
        blocked,
        &mut prefix,
        &mut plans,
    );
    plans
}

fn extend_plans(
    state: MovementState,
    depth: u32,
    position: HexCoord,
    facing: Facing,
    blocked: &dyn Fn(HexCoord) -> bool,
    prefix: &mut Vec<Maneuver>,
    plans: &mut Vec<MovePlan>,
) {
    plans.push(MovePlan {
        maneuvers: prefix.clone(),
        position,
        facing,
    });
    if depth == 0 {
        return;
    }

    for maneuver in Maneuver::ALL {
        let mut next = state;
        if maneuver.is_turn() {
            if next.check_turn().is_err() {
                continue;
            }
            next.turns_since_move += 1;
        } else {
            next.has_moved = true;
            next.turns_since_move = 0;
        }
        next.points_remaining -= 1;

        let (pos, face) = maneuver.apply(position, facing);
        if !maneuver.is_turn() && blocked(pos) {
            continue;
        }
        prefix.push(maneuver);
        extend_plans(next, depth - 1, pos, face, blocked, prefix, plans);
        prefix.pop();
    }
}

/// Grade where a plan leaves the ship for a given intent. Higher is better.
#[must_use]
pub fn score_move(
    intent: Intent,
    personality: Personality,
    ship: &Ship,
    plan: &MovePlan,
    target: &Ship,
) -> f64 {
    let distance = f64::from(plan.position.distance(target.position));
    let preferred = f64::from(personality.preferred_range());
    let off_range = (distance - preferred).abs();
    let bears = bears_on(ship, plan.position, plan.facing, target.position);
    let bear_bonus = if bears { 1.0 } else { 0.0 };
    let shield_toward = ship.shield_fraction(arc_toward(plan.position, plan.facing, target.position));
    let cost = plan.maneuvers.len() as f64 * 0.1;

    let score = match intent {
        Intent::Retreat => distance * 10.0 + bear_bonus * 5.0 + shield_toward * 5.0,
        Intent::BringArcToBear => bear_bonus * 100.0 - off_range * 2.0,
        Intent::Close | Intent::Open => bear_bonus * 20.0 - off_range * 10.0,
        Intent::RotateShields => shield_toward * 50.0 + bear_bonus * 20.0 - off_range * 5.0,
        Intent::Evade => {
            let displaced = if plan.position == ship.position { 0.0 } else { 10.0 };
            displaced + bear_bonus * 20.0 - off_range * 5.0
        }
        Intent::Hold => bear_bonus * 20.0 - off_range * 5.0,
    };
    score - cost
}

/// Score every plan, best first. Equal scores keep enumeration order, so
/// shorter plans win ties.
#[must_use]
pub fn rank_moves(
    intent: Intent,
    personality: Personality,
    ship: &Ship,
    plans: Vec<MovePlan>,
    target: &Ship,
) -> Vec<(MovePlan, f64)> {
    let mut ranked: Vec<(MovePlan, f64)> = plans
        .into_iter()
        .map(|p| {
            let score = score_move(intent, personality, ship, &p, target);
            (p, score)
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then(a.0.maneuvers.len().cmp(&b.0.maneuvers.len()))
    });
    ranked
}

/// Controller for one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipAi {
    /// Controlled ship.
    pub ship: ShipId,
    /// Behavioral profile.
    pub personality: Personality,
    target: Option<ShipId>,
    retreating: bool,
}

impl ShipAi {
    /// Controller with no target yet.
    #[must_use]
    pub const fn new(ship: ShipId, personality: Personality) -> Self {
        Self {
            ship,
            personality,
            target: None,
            retreating: false,
        }
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<ShipId> {
        self.target
    }

    /// Whether the ship is disengaging.
    #[must_use]
    pub const fn is_retreating(&self) -> bool {
        self.retreating
    }

    /// Update the retreat latch from hull integrity.
    pub fn update_retreat(&mut self, ship: &Ship) {
        let hull = ship.hull_fraction();
        let threshold = self.personality.retreat_threshold();
        if !self.retreating && hull < threshold {
            tracing::debug!(ship = %self.ship, hull, "disengaging");
            self.retreating = true;
        } else if self.retreating && hull > threshold + RETREAT_HYSTERESIS {
            tracing::debug!(ship = %self.ship, hull, "rejoining");
            self.retreating = false;
        }
    }

    /// Drop the target if it can no longer be engaged, then pick the best
    /// available one if none is held.
    pub fn update_target(&mut self, me: &Ship, ships: &[Ship], config: &CombatConfig) {
        if let Some(current) = self.target {
            let still_valid = ships.iter().find(|s| s.id == current).is_some_and(|t| {
                t.is_operational() && validate_target(me, t, config).is_ok()
            });
            if !still_valid {
                self.target = None;
            }
        }
        if self.target.is_none() {
            self.target = rank_targets(me, ships, config, None)
                .first()
                .map(|(id, _)| *id);
        }
    }

    /// Perform this ship's activation in the engine's current phase.
    ///
    /// `rng` is the controller's own stream so that AI choices never
    /// perturb the engine's dice.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction::NotActingShip`] if it is not this ship's
    /// activation, or any error the engine raises for a chosen action.
    pub fn act<E: CombatRng, R: CombatRng + ?Sized>(
        &mut self,
        engine: &mut CombatEngine<E>,
        rng: &mut R,
    ) -> Result<()> {
        let acting = engine.current_acting_ship();
        if acting != Some(self.ship) {
            return Err(IllegalAction::NotActingShip {
                ship: self.ship,
                acting,
            }
            .into());
        }
        let me = engine
            .ship(self.ship)
            .cloned()
            .ok_or(CombatError::UnknownShip(self.ship))?;
        self.update_retreat(&me);
        self.update_target(&me, engine.ships(), engine.config());

        match engine.phase() {
            CombatPhase::Movement => self.act_movement(engine, &me, rng),
            CombatPhase::Targeting => self.act_targeting(engine, &me),
            CombatPhase::Firing => engine.step(Action::Fire).map(|_| ()),
            CombatPhase::Power => self.act_power(engine, &me),
            CombatPhase::Repair => self.act_repair(engine, &me),
            _ => Ok(()),
        }
    }

    fn act_movement<E: CombatRng, R: CombatRng + ?Sized>(
        &mut self,
        engine: &mut CombatEngine<E>,
        me: &Ship,
        rng: &mut R,
    ) -> Result<()> {
        let target = self.target.and_then(|id| engine.ship(id)).cloned();
        let coin = rng.roll_critical(self.personality.evasion_priority());
        let intent = choose_intent(self.personality, self.retreating, me, target.as_ref(), coin);

        let plan = match (&target, intent) {
            (Some(target), intent) if intent != Intent::Hold => {
                let state = engine.movement_state(self.ship).unwrap_or_default();
                let depth = engine.config().ai_search_depth;
                let blocked = |hex: HexCoord| engine.would_collide_at(self.ship, hex).is_some();
                let plans = candidate_plans(state, depth, me.position, me.facing, &blocked);
                let ranked = rank_moves(intent, self.personality, me, plans, target);
                pick_best(ranked, rng)
            }
            _ => None,
        };

        tracing::debug!(ship = %self.ship, ?intent, plan = ?plan.as_ref().map(|p| &p.maneuvers), "movement decided");
        if let Some(plan) = plan {
            for maneuver in plan.maneuvers {
                engine.step(maneuver.action())?;
            }
        }
        engine.step(Action::Pass).map(|_| ())
    }

    fn act_targeting<E: CombatRng>(&mut self, engine: &mut CombatEngine<E>, me: &Ship) -> Result<()> {
        let ranked = rank_targets(me, engine.ships(), engine.config(), self.target);
        if let Some((primary, _)) = ranked.first() {
            self.target = Some(*primary);
            engine.step(Action::SelectTarget {
                target: *primary,
                priority: TargetPriority::Primary,
            })?;

            let mut others: Vec<(u32, ShipId)> = ranked[1..]
                .iter()
                .filter_map(|(id, _)| engine.ship(*id))
                .map(|s| (me.position.distance(s.position), s.id))
                .collect();
            others.sort_unstable();
            for ((_, id), priority) in others
                .into_iter()
                .zip([TargetPriority::Secondary, TargetPriority::Tertiary])
            {
                engine.step(Action::SelectTarget { target: id, priority })?;
            }
        }
        engine.step(Action::Pass).map(|_| ())
    }

    fn act_power<E: CombatRng>(&mut self, engine: &mut CombatEngine<E>, me: &Ship) -> Result<()> {
        let available = me.available_power();
        let wanted = if self.retreating {
            let engines = (available / 2).min(200);
            let shields = (available - engines).min(200);
            let weapons = (available - engines - shields).min(200);
            (engines, shields, weapons)
        } else {
            let share = (available / 3).min(200);
            (share, share, share)
        };
        let current = me.power();
        if (current.engines, current.shields, current.weapons) == wanted {
            return engine.step(Action::Pass).map(|_| ());
        }
        let (engines, shields, weapons) = wanted;
        match engine.step(Action::RedistributePower {
            engines,
            shields,
            weapons,
        }) {
            Ok(_) => Ok(()),
            Err(CombatError::ResourceExceeded(_)) => engine.step(Action::Pass).map(|_| ()),
            Err(e) => Err(e),
        }
    }

    fn act_repair<E: CombatRng>(&mut self, engine: &mut CombatEngine<E>, me: &Ship) -> Result<()> {
        let worst = SystemKind::ALL
            .iter()
            .copied()
            .filter(|k| me.system_health(*k) < 100.0)
            .min_by(|a, b| me.system_health(*a).total_cmp(&me.system_health(*b)));
        match worst {
            Some(system) => engine.step(Action::Repair(system)).map(|_| ()),
            None => engine.step(Action::Pass).map(|_| ()),
        }
    }
}

/// Pick among the top-scoring plans, breaking exact ties with `rng`.
fn pick_best<R: CombatRng + ?Sized>(ranked: Vec<(MovePlan, f64)>, rng: &mut R) -> Option<MovePlan> {
    let best = ranked.first()?.1;
    let mut tied: Vec<MovePlan> = ranked
        .into_iter()
        .take_while(|(_, s)| (*s - best).abs() < 1e-9)
        .map(|(p, _)| p)
        .collect();
    let index = rng.pick_index(tied.len());
    Some(tied.swap_remove(index))
}

/// Drive an AI-vs-AI encounter until it ends or `max_turns` turns have run.
///
/// Ships without a controller pass every activation.
pub fn run_encounter<E: CombatRng, R: CombatRng + ?Sized>(
    engine: &mut CombatEngine<E>,
    controllers: &mut [ShipAi],
    rng: &mut R,
    max_turns: u32,
) -> CombatOutcome {
    while engine.combat_outcome() == CombatOutcome::Ongoing && engine.turn_number() <= max_turns {
        let progressed = match engine.current_acting_ship() {
            Some(acting) => {
                let acted = controllers
                    .iter_mut()
                    .find(|c| c.ship == acting)
                    .map(|c| c.act(engine, rng));
                match acted {
                    Some(Ok(())) => true,
                    Some(Err(e)) => {
                        tracing::warn!(ship = %acting, error = %e, "controller failed, passing");
                        engine.current_acting_ship() != Some(acting)
                            || engine.step(Action::Pass).is_ok()
                    }
                    None => engine.step(Action::Pass).is_ok(),
                }
            }
            None => engine.advance_phase().is_ok(),
        };
        if !progressed {
            break;
        }
    }
    engine.combat_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{ArcMap, CrewSkill, FactionId, SizeClass};
    use crate::weapons::{EnergyWeaponType, WeaponArray};

    fn armed(id: u32, faction: u16, q: i32, r: i32, facing: u8) -> Ship {
        Ship::new(ShipId(id), format!("Ship {id}"), "Test", SizeClass::Medium, FactionId(faction))
            .with_position(HexCoord::new(q, r), Facing::new(facing))
            .with_crew(100, CrewSkill::Regular)
            .with_weapon(WeaponArray::new(EnergyWeaponType::Phaser, 4, vec![Arc::Fore]))
    }

    #[test]
    fn test_score_target_prefers_wounded_and_close() {
        let me = armed(1, 0, 0, 0, 0);
        let near = armed(2, 1, 2, 0, 0);
        let far = armed(3, 1, 8, 0, 0);
        assert!(score_target(&me, &near, None) > score_target(&me, &far, None));

        let mut wounded = armed(4, 1, 8, 0, 0);
        wounded.set_hull(100.0);
        assert!(score_target(&me, &wounded, None) > score_target(&me, &near, None));
        assert!(score_target(&me, &far, Some(ShipId(3))) > score_target(&me, &far, None));
    }

    #[test]
    fn test_rank_targets_filters_friendlies_and_range() {
        let config = CombatConfig::default();
        let me = armed(1, 0, 0, 0, 0);
        let ships = vec![
            me.clone(),
            armed(2, 0, 1, 0, 0),
            armed(3, 1, 5, 0, 0),
            armed(4, 1, 20, 0, 0),
        ];
        let ranked = rank_targets(&me, &ships, &config, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, ShipId(3));
    }

    #[test]
    fn test_intent_selection() {
        let me = armed(1, 0, 0, 0, 0);
        let ahead_far = armed(2, 1, 10, 0, 0);
        let ahead_near = armed(3, 1, 2, 0, 0);
        let behind = armed(4, 1, -5, 0, 0);
        let p = Personality::Balanced;

        assert_eq!(choose_intent(p, true, &me, Some(&ahead_far), false), Intent::Retreat);
        assert_eq!(choose_intent(p, false, &me, None, false), Intent::Hold);
        assert_eq!(choose_intent(p, false, &me, Some(&behind), false), Intent::BringArcToBear);
        assert_eq!(choose_intent(p, false, &me, Some(&ahead_far), false), Intent::Close);
        assert_eq!(choose_intent(p, false, &me, Some(&ahead_near), false), Intent::Open);

        let at_range = armed(5, 1, 6, 0, 0);
        assert_eq!(choose_intent(p, false, &me, Some(&at_range), false), Intent::Hold);
        assert_eq!(choose_intent(p, false, &me, Some(&at_range), true), Intent::Evade);

        let mut scorched = me.clone();
        scorched.set_shield(Arc::Fore, 10.0);
        assert_eq!(
            choose_intent(p, false, &scorched, Some(&at_range), true),
            Intent::RotateShields
        );
    }

    #[test]
    fn test_candidate_plans_obey_turn_rules() {
        let plans = candidate_plans(
            MovementState::new(2),
            4,
            HexCoord::ORIGIN,
            Facing::new(0),
            &|_| false,
        );
        assert!(plans.iter().any(|p| p.maneuvers.is_empty()));
        assert!(plans.iter().all(|p| p.maneuvers.len() <= 2));
        assert!(plans
            .iter()
            .all(|p| p.maneuvers.first().map_or(true, |m| !m.is_turn())));
        assert!(plans
            .iter()
            .any(|p| p.maneuvers == vec![Maneuver::Forward, Maneuver::Right]));
        assert_eq!(plans.len(), 1 + 2 + 2 * 4);
    }

    #[test]
    fn test_candidate_plans_respect_blocking() {
        let blocker = HexCoord::new(1, 0);
        let plans = candidate_plans(
            MovementState::new(1),
            4,
            HexCoord::ORIGIN,
            Facing::new(0),
            &|hex| hex == blocker,
        );
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.position != blocker));
    }

    #[test]
    fn test_rank_moves_closes_distance() {
        let me = armed(1, 0, 0, 0, 0);
        let target = armed(2, 1, 10, 0, 3);
        let plans = candidate_plans(MovementState::new(3), 4, me.position, me.facing, &|_| false);
        let ranked = rank_moves(Intent::Close, Personality::Balanced, &me, plans, &target);
        let best = &ranked[0].0;
        assert_eq!(best.maneuvers, vec![Maneuver::Forward; 3]);
        assert_eq!(best.position, HexCoord::new(3, 0));
    }

    #[test]
    fn test_bring_arc_to_bear_turns_toward_target() {
        let me = armed(1, 0, 0, 0, 0);
        let target = armed(2, 1, 0, 6, 0);
        assert!(!bears_on(&me, me.position, me.facing, target.position));
        let plans = candidate_plans(MovementState::new(4), 4, me.position, me.facing, &|_| false);
        let ranked = rank_moves(Intent::BringArcToBear, Personality::Balanced, &me, plans, &target);
        let best = &ranked[0].0;
        assert!(bears_on(&me, best.position, best.facing, target.position));
    }

    #[test]
    fn test_retreat_hysteresis() {
        let mut ai = ShipAi::new(ShipId(1), Personality::Balanced);
        let mut ship = armed(1, 0, 0, 0, 0);
        ship.set_hull(250.0);
        ai.update_retreat(&ship);
        assert!(ai.is_retreating());
        ship.set_hull(450.0);
        ai.update_retreat(&ship);
        assert!(ai.is_retreating());
        ship.set_hull(600.0);
        ai.update_retreat(&ship);
        assert!(!ai.is_retreating());
    }

    #[test]
    fn test_update_target_drops_invalid() {
        let config = CombatConfig::default();
        let me = armed(1, 0, 0, 0, 0);
        let ships = vec![me.clone(), armed(2, 1, 4, 0, 0), armed(3, 0, 2, 0, 0)];
        let mut ai = ShipAi::new(ShipId(1), Personality::Aggressive);
        ai.target = Some(ShipId(3));
        ai.update_target(&me, &ships, &config);
        assert_eq!(ai.target(), Some(ShipId(2)));
    }

    #[test]
    fn test_shield_arcs_reported_by_fraction() {
        let mut ship = armed(1, 0, 0, 0, 0).with_shields(ArcMap::new(100.0, 100.0, 100.0, 100.0));
        ship.set_shield(Arc::Fore, 10.0);
        ship.set_shield(Arc::Port, 20.0);
        ship.set_shield(Arc::Aft, 50.0);
        assert_eq!(freshest_arc(&ship), Arc::Starboard);
    }
}

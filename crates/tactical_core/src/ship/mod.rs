//! The starship entity: defenses, subsystems, power, crew and armament.
//!
//! A [`Ship`] owns all of its state. Fields with invariants (hull, shields,
//! system health, crew) are private and only move through methods that
//! clamp them; everything else is plain data.
//!
//! Incoming fire is applied by [`Ship::take_damage`], implemented in
//! [`crate::damage`].

mod arcs;
mod crew;
mod power;
mod systems;

pub use arcs::{Arc, ArcMap};
pub use crew::{degradation_steps, CommandCrew, CrewSkill, Officer, Station};
pub use power::{
    engine_bonus, shield_bonus, weapon_bonus, PowerChannel, PowerDistribution, BALANCED_POWER,
    CHANNEL_CAP,
};
pub use systems::{SystemHealth, SystemKind, SystemPenalties, EFFICIENCY_CAP, FULL_HEALTH};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PowerRejection;
use crate::hex::{Facing, HexCoord};
use crate::rng::CombatRng;
use crate::weapons::{TorpedoBay, Weapon, WeaponArray};

/// Unique identifier for a ship within an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ShipId(pub u32);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side a ship fights for. Ships of the same faction never target each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct FactionId(pub u16);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction {}", self.0)
    }
}

/// Hull size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SizeClass {
    /// Scouts and science vessels.
    Small,
    /// Frigates and light cruisers.
    #[default]
    Medium,
    /// Heavy cruisers.
    Large,
    /// Explorers. Occupies seven hexes.
    VeryLarge,
    /// Dreadnoughts. Occupies seven hexes.
    Huge,
}

impl SizeClass {
    /// Whether the hull spans its center hex plus all six neighbors.
    #[must_use]
    pub const fn is_multi_hex(self) -> bool {
        matches!(self, SizeClass::VeryLarge | SizeClass::Huge)
    }

    /// Most movement points full engine power can add.
    #[must_use]
    pub const fn max_engine_bonus(self) -> f64 {
        if self.is_multi_hex() {
            2.0
        } else {
            3.0
        }
    }
}

/// Coarse combat condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipCondition {
    /// Hull intact; can act.
    Operational,
    /// Hull at zero but the core held. Drifts, occupies space, can be salvaged.
    Disabled,
    /// Lost to a warp core breach.
    Destroyed,
}

/// A single vessel in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    /// Encounter-unique identifier.
    pub id: ShipId,
    /// Ship name.
    pub name: String,
    /// Registry number.
    pub registry: String,
    /// Class name from the catalogue.
    pub ship_class: String,
    /// Hull size.
    pub size: SizeClass,
    /// Allegiance.
    pub faction: FactionId,
    /// Center hex.
    pub position: HexCoord,
    /// Heading.
    pub facing: Facing,
    hull: f64,
    max_hull: f64,
    armor: f64,
    shields: ArcMap<f64>,
    max_shields: ArcMap<f64>,
    systems: SystemHealth,
    power: PowerDistribution,
    warp_core_max_power: u32,
    crew_count: u32,
    max_crew: u32,
    crew_skill: CrewSkill,
    trained_skill: CrewSkill,
    /// Base movement points per turn.
    pub impulse_speed: u32,
    /// Base sensor range in hexes.
    pub sensor_range: u32,
    /// Energy weapon arrays, in mounting order.
    pub weapon_arrays: Vec<WeaponArray>,
    /// Torpedo launchers, in mounting order.
    pub torpedo_bays: Vec<TorpedoBay>,
    /// Bridge officers.
    pub command_crew: CommandCrew,
    destroyed: bool,
}

impl Ship {
    /// Create a ship with stock defaults: 1000 hull, 50 armor, 500 shields
    /// per arc, a 300-power core split evenly, 200 Regular crew, impulse 5
    /// and sensor range 5. No weapons.
    #[must_use]
    pub fn new(
        id: ShipId,
        name: impl Into<String>,
        ship_class: impl Into<String>,
        size: SizeClass,
        faction: FactionId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            registry: String::new(),
            ship_class: ship_class.into(),
            size,
            faction,
            position: HexCoord::ORIGIN,
            facing: Facing::default(),
            hull: 1000.0,
            max_hull: 1000.0,
            armor: 50.0,
            shields: ArcMap::uniform(500.0),
            max_shields: ArcMap::uniform(500.0),
            systems: SystemHealth::full(),
            power: PowerDistribution::default(),
            warp_core_max_power: 300,
            crew_count: 200,
            max_crew: 200,
            crew_skill: CrewSkill::Regular,
            trained_skill: CrewSkill::Regular,
            impulse_speed: 5,
            sensor_range: 5,
            weapon_arrays: Vec::new(),
            torpedo_bays: Vec::new(),
            command_crew: CommandCrew::default(),
            destroyed: false,
        }
    }

    /// Set the registry number.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Place the ship.
    #[must_use]
    pub fn with_position(mut self, position: HexCoord, facing: Facing) -> Self {
        self.position = position;
        self.facing = facing;
        self
    }

    /// Set hull capacity and fill it.
    #[must_use]
    pub fn with_hull(mut self, max_hull: f64) -> Self {
        self.max_hull = max_hull.max(1.0);
        self.hull = self.max_hull;
        self
    }

    /// Set armor percentage, clamped to `[0, 100]`.
    #[must_use]
    pub fn with_armor(mut self, armor: f64) -> Self {
        self.armor = armor.clamp(0.0, 100.0);
        self
    }

    /// Set base shield capacity per arc and charge to the resulting maximum.
    #[must_use]
    pub fn with_shields(mut self, max_shields: ArcMap<f64>) -> Self {
        self.max_shields = max_shields.map(|_, v| v.max(0.0));
        self.shields = self.max_shields.map(|arc, _| self.max_shield_for_arc(arc));
        self
    }

    /// Set core output and allocation. Allocations over the caps are kept
    /// as given; templates are validated before they get here.
    #[must_use]
    pub fn with_power(mut self, warp_core_max_power: u32, distribution: PowerDistribution) -> Self {
        self.warp_core_max_power = warp_core_max_power;
        self.power = distribution;
        self.shields = self
            .shields
            .map(|arc, v| v.min(self.max_shield_for_arc(arc)));
        self
    }

    /// Set crew complement (fully manned) and skill.
    #[must_use]
    pub fn with_crew(mut self, max_crew: u32, skill: CrewSkill) -> Self {
        self.max_crew = max_crew.max(1);
        self.crew_count = self.max_crew;
        self.crew_skill = skill;
        self.trained_skill = skill;
        self
    }

    /// Set base movement and sensor range.
    #[must_use]
    pub fn with_performance(mut self, impulse_speed: u32, sensor_range: u32) -> Self {
        self.impulse_speed = impulse_speed;
        self.sensor_range = sensor_range;
        self
    }

    /// Mount an energy weapon array.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponArray) -> Self {
        self.weapon_arrays.push(weapon);
        self
    }

    /// Mount a torpedo bay.
    #[must_use]
    pub fn with_torpedo_bay(mut self, bay: TorpedoBay) -> Self {
        self.torpedo_bays.push(bay);
        self
    }

    /// Post a bridge officer.
    #[must_use]
    pub fn with_officer(mut self, station: Station, officer: Officer) -> Self {
        self.command_crew.assign(station, officer);
        self
    }

    // ── Defense ─────────────────────────────────────────────────────────

    /// Current hull points.
    #[must_use]
    pub const fn hull(&self) -> f64 {
        self.hull
    }

    /// Hull capacity.
    #[must_use]
    pub const fn max_hull(&self) -> f64 {
        self.max_hull
    }

    /// Hull as a fraction of capacity.
    #[must_use]
    pub fn hull_fraction(&self) -> f64 {
        self.hull / self.max_hull
    }

    /// Set hull points, clamped to `[0, max_hull]`.
    pub fn set_hull(&mut self, hull: f64) {
        self.hull = hull.clamp(0.0, self.max_hull);
    }

    /// Armor percentage; incoming hull damage is reduced by this much.
    #[must_use]
    pub const fn armor(&self) -> f64 {
        self.armor
    }

    /// Current shield strength on one arc.
    #[must_use]
    pub fn shield(&self, arc: Arc) -> f64 {
        self.shields[arc]
    }

    /// Current shield strength on every arc.
    #[must_use]
    pub const fn shields(&self) -> &ArcMap<f64> {
        &self.shields
    }

    /// Shield capacity before power bonus.
    #[must_use]
    pub const fn base_max_shields(&self) -> &ArcMap<f64> {
        &self.max_shields
    }

    /// Effective shield capacity for an arc: base capacity times shield
    /// power bonus, rounded up.
    #[must_use]
    pub fn max_shield_for_arc(&self, arc: Arc) -> f64 {
        (self.max_shields[arc] * self.shield_bonus()).ceil()
    }

    /// Set one arc's shields, clamped to `[0, max_shield_for_arc]`.
    pub fn set_shield(&mut self, arc: Arc, value: f64) {
        self.shields[arc] = value.clamp(0.0, self.max_shield_for_arc(arc));
    }

    /// Shield strength on an arc as a fraction of its capacity.
    #[must_use]
    pub fn shield_fraction(&self, arc: Arc) -> f64 {
        let max = self.max_shield_for_arc(arc);
        if max <= 0.0 {
            0.0
        } else {
            self.shields[arc] / max
        }
    }

    // ── Condition ───────────────────────────────────────────────────────

    /// Whether the ship was lost to a warp core breach.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the hull has failed without a breach.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        !self.destroyed && self.hull <= 0.0
    }

    /// Whether the ship can still act.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !self.destroyed && self.hull > 0.0
    }

    /// Coarse condition.
    #[must_use]
    pub fn condition(&self) -> ShipCondition {
        if self.destroyed {
            ShipCondition::Destroyed
        } else if self.hull <= 0.0 {
            ShipCondition::Disabled
        } else {
            ShipCondition::Operational
        }
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    // ── Systems ─────────────────────────────────────────────────────────

    /// All subsystem health values.
    #[must_use]
    pub const fn systems(&self) -> &SystemHealth {
        &self.systems
    }

    /// Health of one subsystem.
    #[must_use]
    pub fn system_health(&self, kind: SystemKind) -> f64 {
        self.systems.get(kind)
    }

    /// Set one subsystem's health, clamped to `[0, 100]`.
    pub fn set_system_health(&mut self, kind: SystemKind, value: f64) {
        self.systems.set(kind, value);
    }

    /// Effective efficiency of a subsystem, capped at 2.0.
    ///
    /// Health fraction, times warp core health for everything but the core
    /// itself, times life support health for weapons, sensors and
    /// engineering, times `1 + crew bonus`.
    #[must_use]
    pub fn system_efficiency(&self, kind: SystemKind) -> f64 {
        let mut efficiency = self.systems.ratio(kind);
        if kind != SystemKind::WarpCore {
            efficiency *= self.systems.ratio(SystemKind::WarpCore);
        }
        if kind.depends_on_life_support() {
            efficiency *= self.systems.ratio(SystemKind::LifeSupport);
        }
        (efficiency * (1.0 + self.crew_bonus())).min(EFFICIENCY_CAP)
    }

    /// Named performance multipliers from subsystem damage.
    #[must_use]
    pub fn system_penalties(&self) -> SystemPenalties {
        SystemPenalties::from_health(&self.systems, self.crew_bonus())
    }

    /// Repair a subsystem in the field.
    ///
    /// Systems below 25 can only be patched up to 25, below 50 up to 50;
    /// anything beyond needs a starbase. The amount is scaled by
    /// engineering efficiency and the chief engineer's bonus. Returns the
    /// new health.
    pub fn repair_system(&mut self, kind: SystemKind, amount: f64) -> f64 {
        let current = self.systems.get(kind);
        let limit = if current < 25.0 {
            25.0
        } else if current < 50.0 {
            50.0
        } else {
            FULL_HEALTH
        };
        let repaired = amount.max(0.0)
            * self.system_efficiency(SystemKind::Engineering)
            * (1.0 + self.command_crew.bonus(Station::Engineer));
        let new_health = limit.min(current + repaired).max(current);
        self.systems.set(kind, new_health);
        self.systems.get(kind)
    }

    /// Restore a subsystem to full health.
    pub fn starbase_repair(&mut self, kind: SystemKind) -> f64 {
        self.systems.set(kind, FULL_HEALTH);
        FULL_HEALTH
    }

    // ── Power ───────────────────────────────────────────────────────────

    /// Current allocation.
    #[must_use]
    pub const fn power(&self) -> PowerDistribution {
        self.power
    }

    /// Core output at full health.
    #[must_use]
    pub const fn warp_core_max_power(&self) -> u32 {
        self.warp_core_max_power
    }

    /// Power the core can supply right now: max output times core health, floored.
    #[must_use]
    pub fn available_power(&self) -> u32 {
        (f64::from(self.warp_core_max_power) * self.systems.ratio(SystemKind::WarpCore)).floor()
            as u32
    }

    /// Reallocate power. All-or-nothing: on rejection nothing changes.
    ///
    /// When the shield bonus changes, current shields scale by the ratio of
    /// new to old bonus (rounded up) and are then clamped to the new
    /// per-arc maximum, so power cannot be used to bank shield points.
    pub fn redistribute_power(
        &mut self,
        engines: u32,
        shields: u32,
        weapons: u32,
    ) -> Result<(), PowerRejection> {
        let requested = PowerDistribution::new(engines, shields, weapons);
        requested.check(self.available_power())?;

        let old_bonus = self.shield_bonus();
        self.power = requested;
        let new_bonus = self.shield_bonus();

        if old_bonus > 0.0 && (new_bonus - old_bonus).abs() > f64::EPSILON {
            let ratio = new_bonus / old_bonus;
            for arc in Arc::ALL {
                let scaled = (self.shields[arc] * ratio).ceil();
                self.shields[arc] = scaled.min(self.max_shield_for_arc(arc)).max(0.0);
            }
        }
        Ok(())
    }

    /// Replace the allocation without validation, clamping shields to the
    /// resulting maximum.
    pub(crate) fn force_power(&mut self, distribution: PowerDistribution) {
        self.power = distribution;
        for arc in Arc::ALL {
            let max = self.max_shield_for_arc(arc);
            if self.shields[arc] > max {
                self.shields[arc] = max;
            }
        }
    }

    /// Extra movement points bought with engine power.
    #[must_use]
    pub fn engine_bonus(&self) -> f64 {
        engine_bonus(self.power.engines, self.size.max_engine_bonus())
    }

    /// Shield capacity/regeneration multiplier from shield power.
    #[must_use]
    pub fn shield_bonus(&self) -> f64 {
        shield_bonus(self.power.shields)
    }

    /// Energy weapon damage multiplier from weapon power.
    #[must_use]
    pub fn weapon_bonus(&self) -> f64 {
        weapon_bonus(self.power.weapons)
    }

    /// Movement points for this turn: impulse speed plus engine bonus, rounded up.
    #[must_use]
    pub fn movement_points(&self) -> u32 {
        (f64::from(self.impulse_speed) + self.engine_bonus()).ceil() as u32
    }

    /// Add `amount` to every arc, scaled by shield efficiency and shield
    /// bonus, rounded up and capped at each arc's maximum.
    pub fn regenerate_shields(&mut self, amount: f64) {
        let rate = amount.max(0.0) * self.system_efficiency(SystemKind::Shields) * self.shield_bonus();
        for arc in Arc::ALL {
            let max = self.max_shield_for_arc(arc);
            self.shields[arc] = max.min((self.shields[arc] + rate).ceil());
        }
    }

    // ── Crew ────────────────────────────────────────────────────────────

    /// Crew aboard.
    #[must_use]
    pub const fn crew_count(&self) -> u32 {
        self.crew_count
    }

    /// Crew complement.
    #[must_use]
    pub const fn max_crew(&self) -> u32 {
        self.max_crew
    }

    /// Surviving crew as a fraction of complement.
    #[must_use]
    pub fn crew_fraction(&self) -> f64 {
        f64::from(self.crew_count) / f64::from(self.max_crew)
    }

    /// Set crew aboard, clamped to the complement.
    pub fn set_crew_count(&mut self, count: u32) {
        self.crew_count = count.min(self.max_crew);
    }

    /// Current crew proficiency.
    #[must_use]
    pub const fn crew_skill(&self) -> CrewSkill {
        self.crew_skill
    }

    /// Crew skill bonus fraction.
    #[must_use]
    pub const fn crew_bonus(&self) -> f64 {
        self.crew_skill.bonus()
    }

    /// Train the crew one level. Legendary is earned, never trained.
    ///
    /// Returns `false` when already at Elite or above.
    pub fn train_crew(&mut self) -> bool {
        match self.crew_skill.trained() {
            Some(next) => {
                self.crew_skill = next;
                self.trained_skill = next;
                true
            }
            None => false,
        }
    }

    /// Drop crew skill according to losses.
    ///
    /// Below 75/50/25 percent of complement the crew loses one/two/three
    /// levels relative to the skill it was trained to. Skill never rises
    /// here, and repeated checks at the same crew level do not compound.
    pub fn check_crew_skill_degradation(&mut self) {
        let steps = degradation_steps(self.crew_fraction());
        if steps == 0 {
            return;
        }
        let degraded = self.trained_skill.demoted(steps);
        if degraded < self.crew_skill {
            tracing::debug!(
                ship = %self.name,
                from = %self.crew_skill,
                to = %degraded,
                "crew skill degraded"
            );
            self.crew_skill = degraded;
        }
    }

    /// Remove up to `count` crew. Returns how many were lost.
    pub(crate) fn lose_crew(&mut self, count: u32) -> u32 {
        let lost = count.min(self.crew_count);
        self.crew_count -= lost;
        lost
    }

    /// Ongoing crew loss from failing life support.
    ///
    /// At 75 or above nothing happens. Otherwise a chance roll (5/20/50
    /// percent for 50-74 / 25-49 / below 25) kills 1 up to 1/3/5 crew, never
    /// the last one aboard. Returns casualties.
    pub fn process_life_support_damage<R: CombatRng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        let life_support = self.systems.get(SystemKind::LifeSupport);
        if life_support >= 75.0 {
            return 0;
        }
        let (chance, max_casualties) = if life_support < 25.0 {
            (0.5, 5)
        } else if life_support < 50.0 {
            (0.2, 3)
        } else {
            (0.05, 1)
        };
        if !rng.roll_critical(chance) {
            return 0;
        }
        let rolled = rng.roll_damage(1, max_casualties).max(0) as u32;
        let casualties = rolled.min(self.crew_count.saturating_sub(1));
        self.crew_count -= casualties;
        self.check_crew_skill_degradation();
        casualties
    }

    /// Recover crew over `periods` of downtime: one per period at full sick
    /// bay health. Returns crew recovered.
    pub fn regenerate_crew(&mut self, periods: u32) -> u32 {
        if self.crew_count >= self.max_crew {
            return 0;
        }
        let rate = self.systems.ratio(SystemKind::SickBay);
        let recovered = ((f64::from(periods) * rate).floor() as u32).min(self.max_crew - self.crew_count);
        self.crew_count += recovered;
        recovered
    }

    // ── Sensors & footprint ─────────────────────────────────────────────

    /// Sensor range after sensor efficiency, at least 1 hex.
    #[must_use]
    pub fn effective_sensor_range(&self) -> u32 {
        let range = f64::from(self.sensor_range) * self.system_efficiency(SystemKind::Sensors);
        (range.floor() as u32).max(1)
    }

    /// Hexes the ship would cover if centered at `center`.
    #[must_use]
    pub fn footprint_at(&self, center: HexCoord) -> Vec<HexCoord> {
        if self.size.is_multi_hex() {
            let mut hexes = Vec::with_capacity(7);
            hexes.push(center);
            hexes.extend(center.neighbors());
            hexes
        } else {
            vec![center]
        }
    }

    /// Hexes the ship currently covers.
    #[must_use]
    pub fn occupied_hexes(&self) -> Vec<HexCoord> {
        self.footprint_at(self.position)
    }

    /// Whether any mounted weapon covers `arc`.
    #[must_use]
    pub fn has_weapon_covering(&self, arc: Arc) -> bool {
        self.weapon_arrays.iter().any(|w| w.covers(arc))
            || self.torpedo_bays.iter().any(|t| t.covers(arc))
    }

    /// Total number of mounted weapons.
    #[must_use]
    pub fn weapon_count(&self) -> usize {
        self.weapon_arrays.len() + self.torpedo_bays.len()
    }

    /// Advance every weapon's cooldown by one turn.
    pub fn advance_cooldowns(&mut self) {
        for weapon in &mut self.weapon_arrays {
            weapon.advance_cooldown();
        }
        for bay in &mut self.torpedo_bays {
            bay.advance_cooldown();
        }
    }

    /// Read-only status snapshot.
    #[must_use]
    pub fn ship_status(&self) -> ShipStatus {
        ShipStatus {
            id: self.id,
            name: self.name.clone(),
            registry: self.registry.clone(),
            ship_class: self.ship_class.clone(),
            condition: self.condition(),
            position: self.position,
            facing: self.facing,
            hull: self.hull,
            max_hull: self.max_hull,
            hull_percent: self.hull_fraction() * 100.0,
            shields: self.shields,
            max_shields: Arc::ALL
                .iter()
                .fold(self.max_shields, |mut acc, arc| {
                    acc[*arc] = self.max_shield_for_arc(*arc);
                    acc
                }),
            crew_count: self.crew_count,
            max_crew: self.max_crew,
            crew_skill: self.crew_skill,
            systems: self.systems,
            power: self.power,
            available_power: self.available_power(),
        }
    }
}

/// Point-in-time view of a ship for display or logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipStatus {
    /// Ship identifier.
    pub id: ShipId,
    /// Ship name.
    pub name: String,
    /// Registry number.
    pub registry: String,
    /// Class name.
    pub ship_class: String,
    /// Coarse condition.
    pub condition: ShipCondition,
    /// Center hex.
    pub position: HexCoord,
    /// Heading.
    pub facing: Facing,
    /// Hull points.
    pub hull: f64,
    /// Hull capacity.
    pub max_hull: f64,
    /// Hull as a percentage.
    pub hull_percent: f64,
    /// Shield strength per arc.
    pub shields: ArcMap<f64>,
    /// Effective shield capacity per arc.
    pub max_shields: ArcMap<f64>,
    /// Crew aboard.
    pub crew_count: u32,
    /// Crew complement.
    pub max_crew: u32,
    /// Crew proficiency.
    pub crew_skill: CrewSkill,
    /// Subsystem health.
    pub systems: SystemHealth,
    /// Power allocation.
    pub power: PowerDistribution,
    /// Power the core can currently supply.
    pub available_power: u32,
}

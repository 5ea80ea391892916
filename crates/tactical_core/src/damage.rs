//! Damage resolution: shields, armor, hull, casualties and cascading
//! subsystem failures.
//!
//! Hull failure and warp core breach are terminal state transitions, not
//! errors. They are reported through [`DamageResult`].

use serde::{Deserialize, Serialize};

use crate::rng::CombatRng;
use crate::ship::{Arc, PowerDistribution, Ship, Station, SystemKind};

/// Share of a torpedo that reaches the hull through raised shields.
pub const TORPEDO_BYPASS: f64 = 0.10;
/// Shield points a torpedo strips, as a share of its damage.
pub const TORPEDO_SHIELD_COST: f64 = 0.20;

/// How an incoming hit interacts with shields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Beam weapons. Shields soak everything they can.
    Energy,
    /// Torpedoes. Mostly blocked by raised shields, devastating once they fall.
    Torpedo,
}

/// Damage dealt to one subsystem by a single hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDamage {
    /// Affected subsystem.
    pub system: SystemKind,
    /// Health removed.
    pub damage: f64,
    /// Health before the hit.
    pub old_health: f64,
    /// Health after the hit.
    pub new_health: f64,
    /// Whether the subsystem reached zero.
    pub destroyed: bool,
}

/// Everything a single hit did to a ship.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageResult {
    /// Shield points removed from the struck arc.
    pub shield_damage: f64,
    /// Hull points removed after armor.
    pub hull_damage: f64,
    /// Crew killed by this hit, including hull failure and breach losses.
    pub casualties: u32,
    /// Subsystems damaged by this hit.
    pub system_damage: Vec<SystemDamage>,
    /// This hit took the hull from intact to zero.
    pub hull_failure: bool,
    /// Hull is at zero while the warp core holds.
    pub disabled: bool,
    /// The ship was lost.
    pub destroyed: bool,
    /// The warp core breached.
    pub warp_core_breach: bool,
    /// The crew made it off before the breach.
    pub breach_survived: bool,
}

/// Casualty mitigation from life support, sick bay and the medical officer.
///
/// Each weight is the most that system can shave off at full efficiency.
fn casualty_mitigation(ship: &Ship, life_support_weight: f64) -> f64 {
    let life_support = ship.system_efficiency(SystemKind::LifeSupport).min(1.0);
    let sick_bay = ship.system_efficiency(SystemKind::SickBay).min(1.0);
    let medical = ship.command_crew.bonus(Station::Medical);
    (1.0 - life_support * life_support_weight) * (1.0 - sick_bay * 0.3) * (1.0 - medical * 0.2)
}

/// Hull-integrity tier: subsystem damage chance per unit of hull damage
/// ratio, and severity band as fractions of current health.
fn damage_tier(hull_ratio: f64) -> (f64, (f64, f64)) {
    if hull_ratio > 0.75 {
        (0.15, (0.05, 0.10))
    } else if hull_ratio > 0.5 {
        (0.30, (0.08, 0.15))
    } else if hull_ratio > 0.25 {
        (0.50, (0.12, 0.25))
    } else {
        (0.75, (0.20, 0.40))
    }
}

impl Ship {
    /// Apply one hit striking `arc`.
    ///
    /// Shields on the struck arc absorb first according to `kind`, armor
    /// reduces what gets through, and any hull damage then kills crew and
    /// may damage subsystems. Hull failure disables the ship; a warp core
    /// at zero destroys it.
    pub fn take_damage<R: CombatRng + ?Sized>(
        &mut self,
        amount: f64,
        arc: Arc,
        kind: DamageType,
        rng: &mut R,
    ) -> DamageResult {
        let mut result = DamageResult::default();
        if self.is_destroyed() {
            return result;
        }
        let amount = amount.max(0.0);
        let was_intact = self.hull() > 0.0;
        let armor_factor = 1.0 - self.armor() / 100.0;
        let shield = self.shield(arc);

        let hull_damage = match kind {
            DamageType::Energy => {
                let absorbed = amount.min(shield);
                result.shield_damage = absorbed;
                self.set_shield(arc, shield - absorbed);
                (amount - absorbed) * armor_factor
            }
            DamageType::Torpedo if shield > 0.0 => {
                let cost = (amount * TORPEDO_SHIELD_COST).min(shield);
                result.shield_damage = cost;
                self.set_shield(arc, shield - cost);
                amount * TORPEDO_BYPASS * armor_factor
            }
            DamageType::Torpedo => amount * armor_factor,
        }
        .max(0.0);

        if hull_damage > 0.0 {
            result.hull_damage = hull_damage;
            self.set_hull(self.hull() - hull_damage);
            result.casualties += self.apply_casualties(hull_damage);
            self.check_crew_skill_degradation();
            result.system_damage = self.apply_system_damage(hull_damage, rng);
        }

        if was_intact && self.hull() <= 0.0 {
            result.casualties += self.resolve_hull_failure();
            result.hull_failure = true;
        }
        result.disabled = self.hull() <= 0.0;

        if self.system_health(SystemKind::WarpCore) <= 0.0 {
            let (survived, lost) = self.check_warp_core_breach(rng);
            result.warp_core_breach = true;
            result.breach_survived = survived;
            result.casualties += lost;
            result.destroyed = true;
            result.disabled = false;
        }

        self.rebalance_power();

        tracing::debug!(
            ship = %self.name,
            arc = %arc,
            amount,
            shield_damage = result.shield_damage,
            hull_damage = result.hull_damage,
            casualties = result.casualties,
            "damage applied"
        );
        result
    }

    /// Crew lost to a hull hit. Returns casualties.
    pub fn calculate_casualties(&self, hull_damage: f64) -> u32 {
        let rate = hull_damage / self.max_hull() * 0.1 * casualty_mitigation(self, 0.5);
        (f64::from(self.max_crew()) * rate).floor().max(0.0) as u32
    }

    fn apply_casualties(&mut self, hull_damage: f64) -> u32 {
        let casualties = self.calculate_casualties(hull_damage);
        self.lose_crew(casualties)
    }

    /// Crew lost when the hull gives out: half the crew before mitigation,
    /// rounded up, capped at those aboard.
    pub fn calculate_hull_failure_casualties(&self) -> u32 {
        let rate = 0.5 * casualty_mitigation(self, 0.4);
        let casualties = (f64::from(self.crew_count()) * rate).ceil().max(0.0) as u32;
        casualties.min(self.crew_count())
    }

    fn resolve_hull_failure(&mut self) -> u32 {
        let casualties = self.calculate_hull_failure_casualties();
        let lost = self.lose_crew(casualties);
        self.check_crew_skill_degradation();
        tracing::info!(ship = %self.name, casualties = lost, "hull failure");
        lost
    }

    /// Roll subsystem damage for `hull_damage` taken at the current hull
    /// integrity. The chance grows with the share of the hull the hit took.
    pub fn apply_system_damage<R: CombatRng + ?Sized>(
        &mut self,
        hull_damage: f64,
        rng: &mut R,
    ) -> Vec<SystemDamage> {
        let (tier_factor, (low, high)) = damage_tier(self.hull_fraction());
        let chance = (hull_damage / self.max_hull()).max(0.0) * tier_factor;
        let mut damaged = Vec::new();

        for kind in SystemKind::ALL {
            let old_health = self.system_health(kind);
            if old_health <= 0.0 {
                continue;
            }
            if !rng.roll_critical(chance * kind.vulnerability()) {
                continue;
            }
            let min = ((old_health * low) as i32).max(1);
            let max = ((old_health * high) as i32).max(1);
            let damage = f64::from(rng.roll_damage(min, max).max(0));
            self.set_system_health(kind, old_health - damage);
            let new_health = self.system_health(kind);
            let destroyed = new_health <= 0.0;
            if destroyed {
                tracing::info!(
                    ship = %self.name,
                    system = %kind,
                    "{}",
                    kind.destruction_message()
                );
            }
            damaged.push(SystemDamage {
                system: kind,
                damage: old_health - new_health,
                old_health,
                new_health,
                destroyed,
            });
        }
        damaged
    }

    /// Resolve a breach: the ship is lost, and the crew either evacuates
    /// or goes down with it. Survival is 10 percent plus up to 20 more from
    /// the chief engineer. Returns `(crew_survived, crew_lost)`.
    pub fn check_warp_core_breach<R: CombatRng + ?Sized>(&mut self, rng: &mut R) -> (bool, u32) {
        let survival = (0.10 + self.command_crew.bonus(Station::Engineer) * 0.20).clamp(0.10, 0.30);
        self.set_hull(0.0);
        self.mark_destroyed();
        let survived = rng.roll_critical(survival);
        let lost = if survived {
            0
        } else {
            let aboard = self.crew_count();
            self.lose_crew(aboard)
        };
        tracing::warn!(ship = %self.name, survived, crew_lost = lost, "warp core breach");
        (survived, lost)
    }

    /// Scale the allocation down when core damage leaves it unaffordable.
    fn rebalance_power(&mut self) {
        let available = self.available_power();
        let current = self.power();
        let total = current.total();
        if total <= available {
            return;
        }
        let scale = f64::from(available) / f64::from(total);
        let shrink = |v: u32| (f64::from(v) * scale).floor() as u32;
        let reduced = PowerDistribution::new(
            shrink(current.engines),
            shrink(current.shields),
            shrink(current.weapons),
        );
        self.force_power(reduced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRng;
    use crate::ship::{ArcMap, CrewSkill, FactionId, Officer, ShipCondition, ShipId, SizeClass};

    fn target(shields: f64, armor: f64) -> Ship {
        Ship::new(ShipId(1), "Target", "Test", SizeClass::Medium, FactionId(1))
            .with_shields(ArcMap::uniform(shields))
            .with_armor(armor)
            .with_crew(100, CrewSkill::Cadet)
    }

    #[test]
    fn test_energy_fully_absorbed() {
        let mut ship = target(100.0, 0.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(45.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert_eq!(result.hull_damage, 0.0);
        assert_eq!(ship.shield(Arc::Fore), 55.0);
        assert_eq!(ship.shield(Arc::Aft), 100.0);
        assert_eq!(result.casualties, 0);
    }

    #[test]
    fn test_energy_overflow_mitigated_by_armor() {
        let mut ship = target(10.0, 50.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(30.0, Arc::Port, DamageType::Energy, &mut rng);
        assert_eq!(result.shield_damage, 10.0);
        assert_eq!(result.hull_damage, 10.0);
        assert_eq!(ship.hull(), 990.0);
    }

    #[test]
    fn test_torpedo_against_raised_shields() {
        let mut ship = target(100.0, 0.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(80.0, Arc::Fore, DamageType::Torpedo, &mut rng);
        assert_eq!(ship.shield(Arc::Fore), 84.0);
        assert_eq!(result.hull_damage, 8.0);
    }

    #[test]
    fn test_torpedo_against_down_shields() {
        let mut ship = target(0.0, 25.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(80.0, Arc::Aft, DamageType::Torpedo, &mut rng);
        assert_eq!(result.shield_damage, 0.0);
        assert_eq!(result.hull_damage, 60.0);
    }

    #[test]
    fn test_casualties_scale_with_hull_damage() {
        let ship = target(0.0, 0.0);
        assert_eq!(ship.calculate_casualties(0.0), 0);
        assert!(ship.calculate_casualties(500.0) > ship.calculate_casualties(100.0));

        let mut lone = ship.clone();
        lone.set_system_health(SystemKind::LifeSupport, 0.0);
        lone.set_system_health(SystemKind::SickBay, 0.0);
        assert_eq!(lone.calculate_casualties(1000.0), 10);
    }

    #[test]
    fn test_hull_failure_disables() {
        let mut ship = target(0.0, 0.0);
        ship.set_hull(1.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(1000.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert!(result.disabled);
        assert!(result.hull_failure);
        assert!(!result.destroyed);
        assert_eq!(ship.hull(), 0.0);
        assert_eq!(ship.condition(), ShipCondition::Disabled);
        assert!(result.casualties > 0);
    }

    #[test]
    fn test_breach_always_destroys() {
        let mut ship = target(0.0, 0.0);
        ship.set_system_health(SystemKind::WarpCore, 0.0);
        let mut rng = FixedRng::never();
        let result = ship.take_damage(10.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert!(result.destroyed);
        assert!(result.warp_core_breach);
        assert!(!result.breach_survived);
        assert!(!result.disabled);
        assert_eq!(ship.crew_count(), 0);
        assert!(ship.is_destroyed());
    }

    #[test]
    fn test_breach_evacuation_survives() {
        let mut ship = target(0.0, 0.0).with_officer(
            Station::Engineer,
            Officer::new("Torres", CrewSkill::Legendary),
        );
        let mut rng = FixedRng::always_critical();
        let (survived, lost) = ship.check_warp_core_breach(&mut rng);
        assert!(survived);
        assert_eq!(lost, 0);
        assert!(ship.is_destroyed());
    }

    #[test]
    fn test_destroyed_ship_ignores_damage() {
        let mut ship = target(0.0, 0.0);
        let mut rng = FixedRng::never();
        ship.check_warp_core_breach(&mut rng);
        let result = ship.take_damage(100.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert_eq!(result, DamageResult::default());
    }

    #[test]
    fn test_system_damage_rolls_every_system() {
        let mut ship = target(0.0, 0.0);
        let mut rng = FixedRng::always_critical();
        let damaged = ship.apply_system_damage(100.0, &mut rng);
        assert_eq!(damaged.len(), SystemKind::ALL.len());
        for hit in &damaged {
            assert_eq!(hit.old_health, 100.0);
            assert_eq!(hit.damage, 10.0);
            assert_eq!(hit.new_health, 90.0);
            assert!(!hit.destroyed);
        }
    }

    #[test]
    fn test_system_damage_scales_with_hit_size() {
        let mut rng = FixedRng {
            critical_threshold: 0.25,
            ..FixedRng::always_hit()
        };

        let mut scratched = target(0.0, 0.0);
        scratched.set_hull(600.0);
        let result = scratched.take_damage(1.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert_eq!(result.hull_damage, 1.0);
        assert!(result.system_damage.is_empty());
        for system in SystemKind::ALL {
            assert_eq!(scratched.system_health(system), 100.0);
        }

        let mut gutted = target(0.0, 0.0);
        gutted.set_hull(600.0);
        let result = gutted.take_damage(500.0, Arc::Fore, DamageType::Energy, &mut rng);
        assert_eq!(gutted.hull(), 100.0);
        // 0.5 of the hull at critical integrity: 0.375 before vulnerability.
        let damaged: Vec<SystemKind> = result.system_damage.iter().map(|d| d.system).collect();
        assert_eq!(
            damaged,
            vec![
                SystemKind::ImpulseEngines,
                SystemKind::Weapons,
                SystemKind::Sensors,
                SystemKind::Shields,
                SystemKind::Engineering,
                SystemKind::SickBay,
            ]
        );
        assert_eq!(gutted.system_health(SystemKind::WarpCore), 100.0);
        assert!(!result.destroyed);
    }

    #[test]
    fn test_no_hull_damage_no_system_rolls() {
        let mut ship = target(0.0, 0.0);
        let mut rng = FixedRng::always_critical();
        assert!(ship.apply_system_damage(0.0, &mut rng).is_empty());
    }

    #[test]
    fn test_damaged_core_shrinks_allocation() {
        let mut ship = target(0.0, 0.0);
        ship.set_system_health(SystemKind::WarpCore, 50.0);
        ship.rebalance_power();
        assert!(ship.power().total() <= ship.available_power());
        assert_eq!(ship.power(), PowerDistribution::new(50, 50, 50));
    }
}

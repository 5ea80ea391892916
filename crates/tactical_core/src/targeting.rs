//! Arcs, range bands and target assignment.
//!
//! Arc math works in each ship's own frame: the bearing to the other ship
//! minus the ship's heading, bucketed into fore/starboard/aft/port.

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::damage::DamageType;
use crate::error::TargetRejection;
use crate::hex::{bearing_degrees, Facing, HexCoord};
use crate::ship::{Arc, Ship, ShipId, Station, SystemKind};

/// Target slot. Lower priorities fire with reduced accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetPriority {
    /// Main target, full accuracy.
    Primary,
    /// Second target.
    Secondary,
    /// Third target.
    Tertiary,
}

impl TargetPriority {
    /// All slots, primary first.
    pub const ALL: [TargetPriority; 3] = [
        TargetPriority::Primary,
        TargetPriority::Secondary,
        TargetPriority::Tertiary,
    ];

    /// Position in the priority list, primary = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Accuracy multiplier for this slot under `config`.
    #[must_use]
    pub fn accuracy_multiplier(self, config: &CombatConfig) -> f64 {
        config.priority_multipliers[self.index()]
    }
}

/// Up to three targets held by one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TargetAssignment {
    slots: [Option<ShipId>; 3],
}

impl TargetAssignment {
    /// Target in a slot.
    #[must_use]
    pub const fn get(&self, priority: TargetPriority) -> Option<ShipId> {
        self.slots[priority.index()]
    }

    /// Assign a slot. A ship already held in another slot moves to this one.
    pub fn set(&mut self, priority: TargetPriority, target: ShipId) {
        for slot in &mut self.slots {
            if *slot == Some(target) {
                *slot = None;
            }
        }
        self.slots[priority.index()] = Some(target);
    }

    /// Drop a ship from every slot.
    pub fn remove(&mut self, target: ShipId) {
        for slot in &mut self.slots {
            if *slot == Some(target) {
                *slot = None;
            }
        }
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots = [None; 3];
    }

    /// Whether no slot is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Assigned `(priority, target)` pairs, primary first.
    pub fn iter(&self) -> impl Iterator<Item = (TargetPriority, ShipId)> + '_ {
        TargetPriority::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|id| (*p, id)))
    }
}

/// Arc of an observer at `from` facing `facing` in which `to` lies.
#[must_use]
pub fn arc_toward(from: HexCoord, facing: Facing, to: HexCoord) -> Arc {
    let relative = bearing_degrees(from, to) - facing.degrees();
    Arc::from_relative_bearing(relative)
}

/// Attacker's arc containing the target; picks which weapons can bear.
#[must_use]
pub fn target_arc(attacker: &Ship, target: &Ship) -> Arc {
    arc_toward(attacker.position, attacker.facing, target.position)
}

/// Defender's shield arc facing the attacker; picks which shield absorbs a hit.
#[must_use]
pub fn shield_facing_hit(defender: &Ship, attacker: &Ship) -> Arc {
    arc_toward(defender.position, defender.facing, attacker.position)
}

/// Accuracy multiplier by range band, or `None` beyond 13 hexes.
#[must_use]
pub const fn targeting_accuracy(distance: u32) -> Option<f64> {
    match distance {
        0..=3 => Some(1.50),
        4..=5 => Some(1.25),
        6..=8 => Some(1.00),
        9..=11 => Some(0.75),
        12..=13 => Some(0.60),
        _ => None,
    }
}

/// Whether anything can engage at this range.
#[must_use]
pub const fn can_target(distance: u32) -> bool {
    targeting_accuracy(distance).is_some()
}

/// Human-readable range band.
#[must_use]
pub const fn range_description(distance: u32) -> &'static str {
    match distance {
        0..=3 => "POINT BLANK",
        4..=5 => "CLOSE",
        6..=8 => "MEDIUM",
        9..=11 => "LONG",
        12..=13 => "EXTREME",
        _ => "OUT OF RANGE",
    }
}

/// Check whether `attacker` may assign `target` at all.
pub fn validate_target(
    attacker: &Ship,
    target: &Ship,
    config: &CombatConfig,
) -> Result<(), TargetRejection> {
    if attacker.id == target.id {
        return Err(TargetRejection::SelfTarget);
    }
    if target.is_destroyed() {
        return Err(TargetRejection::Destroyed);
    }
    if attacker.faction == target.faction {
        return Err(TargetRejection::SameFaction);
    }
    let distance = attacker.position.distance(target.position);
    if distance > config.max_engagement_range || !can_target(distance) {
        return Err(TargetRejection::OutOfRange { distance });
    }
    Ok(())
}

/// Chance for one shot from `attacker` to connect, before range and priority.
///
/// Base chance by weapon family, scaled by sensors efficiency and the
/// tactical officer's bonus.
#[must_use]
pub fn hit_chance(attacker: &Ship, kind: DamageType, config: &CombatConfig) -> f64 {
    let base = match kind {
        DamageType::Energy => config.energy_hit_chance,
        DamageType::Torpedo => config.torpedo_hit_chance,
    };
    let tactical = attacker.command_crew.bonus(Station::Tactical);
    base * attacker.system_efficiency(SystemKind::Sensors) * (1.0 + tactical * config.tactical_hit_weight)
}

/// Damage for one shot before range and priority scaling, rounded up.
///
/// Energy weapons get the weapon-power bonus; torpedoes never do.
#[must_use]
pub fn shot_damage(attacker: &Ship, raw: u32, kind: DamageType, config: &CombatConfig) -> f64 {
    let tactical = attacker.command_crew.bonus(Station::Tactical);
    let power = match kind {
        DamageType::Energy => attacker.weapon_bonus(),
        DamageType::Torpedo => 1.0,
    };
    (f64::from(raw)
        * attacker.system_efficiency(SystemKind::Weapons)
        * power
        * (1.0 + tactical * config.tactical_damage_weight))
        .ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{CrewSkill, FactionId, Officer, SizeClass};

    fn ship_at(id: u32, faction: u16, q: i32, r: i32, facing: u8) -> Ship {
        Ship::new(ShipId(id), format!("Ship {id}"), "Test", SizeClass::Medium, FactionId(faction))
            .with_position(HexCoord::new(q, r), Facing::new(facing))
            .with_crew(100, CrewSkill::Cadet)
    }

    #[test]
    fn test_arc_for_each_side() {
        let me = ship_at(1, 0, 0, 0, 0);
        assert_eq!(target_arc(&me, &ship_at(2, 1, 3, 0, 0)), Arc::Fore);
        assert_eq!(target_arc(&me, &ship_at(2, 1, -3, 0, 0)), Arc::Aft);
        assert_eq!(target_arc(&me, &ship_at(2, 1, 0, 3, 0)), Arc::Starboard);
        assert_eq!(target_arc(&me, &ship_at(2, 1, 0, -3, 0)), Arc::Port);
    }

    #[test]
    fn test_arc_rotates_with_facing() {
        let me = ship_at(1, 0, 0, 0, 3);
        assert_eq!(target_arc(&me, &ship_at(2, 1, -3, 0, 0)), Arc::Fore);
        assert_eq!(target_arc(&me, &ship_at(2, 1, 3, 0, 0)), Arc::Aft);
    }

    #[test]
    fn test_shield_facing_uses_defender_frame() {
        let attacker = ship_at(1, 0, 0, 0, 0);
        let head_on = ship_at(2, 1, 4, 0, 3);
        assert_eq!(shield_facing_hit(&head_on, &attacker), Arc::Fore);
        let fleeing = ship_at(2, 1, 4, 0, 0);
        assert_eq!(shield_facing_hit(&fleeing, &attacker), Arc::Aft);
    }

    #[test]
    fn test_accuracy_bands() {
        assert_eq!(targeting_accuracy(0), Some(1.5));
        assert_eq!(targeting_accuracy(3), Some(1.5));
        assert_eq!(targeting_accuracy(5), Some(1.25));
        assert_eq!(targeting_accuracy(8), Some(1.0));
        assert_eq!(targeting_accuracy(11), Some(0.75));
        assert_eq!(targeting_accuracy(13), Some(0.6));
        assert_eq!(targeting_accuracy(14), None);
        assert_eq!(range_description(7), "MEDIUM");
        assert_eq!(range_description(20), "OUT OF RANGE");
        assert!(!can_target(14));
    }

    #[test]
    fn test_validate_target_rejections() {
        let config = CombatConfig::default();
        let me = ship_at(1, 0, 0, 0, 0);
        assert_eq!(validate_target(&me, &me, &config), Err(TargetRejection::SelfTarget));
        assert_eq!(
            validate_target(&me, &ship_at(2, 0, 2, 0, 0), &config),
            Err(TargetRejection::SameFaction)
        );
        assert_eq!(
            validate_target(&me, &ship_at(3, 1, 14, 0, 0), &config),
            Err(TargetRejection::OutOfRange { distance: 14 })
        );
        assert!(validate_target(&me, &ship_at(4, 1, 13, 0, 0), &config).is_ok());
    }

    #[test]
    fn test_assignment_moves_ship_between_slots() {
        let mut a = TargetAssignment::default();
        a.set(TargetPriority::Primary, ShipId(5));
        a.set(TargetPriority::Secondary, ShipId(6));
        a.set(TargetPriority::Tertiary, ShipId(5));
        assert_eq!(a.get(TargetPriority::Primary), None);
        assert_eq!(a.get(TargetPriority::Tertiary), Some(ShipId(5)));
        assert_eq!(a.iter().count(), 2);
        a.remove(ShipId(6));
        a.remove(ShipId(5));
        assert!(a.is_empty());
    }

    #[test]
    fn test_shot_damage_and_hit_chance() {
        let config = CombatConfig::default();
        let mut me = ship_at(1, 0, 0, 0, 0);
        assert_eq!(shot_damage(&me, 30, DamageType::Energy, &config), 30.0);
        assert!((hit_chance(&me, DamageType::Energy, &config) - 0.85).abs() < 1e-12);

        me.redistribute_power(50, 50, 200).unwrap();
        assert_eq!(shot_damage(&me, 30, DamageType::Energy, &config), 45.0);
        assert_eq!(shot_damage(&me, 80, DamageType::Torpedo, &config), 80.0);

        me.command_crew.assign(Station::Tactical, Officer::new("Worf", CrewSkill::Legendary));
        assert_eq!(shot_damage(&me, 80, DamageType::Torpedo, &config), 90.0);
    }
}

//! Ship class templates.

use serde::{Deserialize, Serialize};

use crate::ship::{
    Arc, ArcMap, CrewSkill, FactionId, Officer, PowerDistribution, Ship, ShipId, SizeClass,
    Station,
};
use crate::weapons::{EnergyWeaponType, TorpedoBay, TorpedoType, WeaponArray, MAX_MARK, MIN_MARK};

/// An energy weapon array as mounted on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponMount {
    /// Weapon family.
    #[serde(default)]
    pub weapon_type: EnergyWeaponType,
    /// Mark, 1 to 15.
    pub mark: u8,
    /// Arcs it can engage.
    pub arcs: Vec<Arc>,
}

impl WeaponMount {
    /// Phaser array of the given mark.
    #[must_use]
    pub fn phaser(mark: u8, arcs: &[Arc]) -> Self {
        Self {
            weapon_type: EnergyWeaponType::Phaser,
            mark,
            arcs: arcs.to_vec(),
        }
    }
}

/// A torpedo bay as mounted on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorpedoMount {
    /// Torpedo family.
    #[serde(default)]
    pub torpedo_type: TorpedoType,
    /// Mark, 1 to 15.
    pub mark: u8,
    /// Arcs it can engage.
    pub arcs: Vec<Arc>,
    /// Magazine size.
    pub capacity: u32,
}

impl TorpedoMount {
    /// Photon torpedo bay of the given mark.
    #[must_use]
    pub fn photon(mark: u8, arcs: &[Arc], capacity: u32) -> Self {
        Self {
            torpedo_type: TorpedoType::Photon,
            mark,
            arcs: arcs.to_vec(),
            capacity,
        }
    }
}

/// An officer posted to a station when the class is commissioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerPost {
    /// Station held.
    pub station: Station,
    /// The officer.
    pub officer: Officer,
}

/// Data-driven ship class definition.
///
/// Every field except `class` has a default, so a template only needs to
/// state what sets the class apart.
///
/// # Example RON
///
/// ```ron
/// ShipTemplate(
///     class: "Miranda",
///     role: "Frigate",
///     size: Medium,
///     impulse_speed: 6,
///     sensor_range: 6,
///     hull: 800.0,
///     armor: 40.0,
///     shields: (fore: 400.0, aft: 300.0, port: 350.0, starboard: 350.0),
///     weapons: [
///         (mark: 4, arcs: [Fore, Port]),
///         (mark: 4, arcs: [Fore, Starboard]),
///     ],
///     torpedo_bays: [
///         (mark: 4, arcs: [Fore], capacity: 50),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipTemplate {
    /// Unique class name, used as the catalogue key.
    pub class: String,

    /// Free-form role description.
    #[serde(default)]
    pub role: String,

    /// Hull size.
    #[serde(default)]
    pub size: SizeClass,

    /// Base movement points per turn.
    #[serde(default = "default_impulse_speed")]
    pub impulse_speed: u32,

    /// Base sensor range in hexes.
    #[serde(default = "default_sensor_range")]
    pub sensor_range: u32,

    /// Hull capacity.
    #[serde(default = "default_hull")]
    pub hull: f64,

    /// Armor percentage.
    #[serde(default = "default_armor")]
    pub armor: f64,

    /// Base shield capacity per arc.
    #[serde(default = "default_shields")]
    pub shields: ArcMap<f64>,

    /// Warp core output.
    #[serde(default = "default_warp_core_power")]
    pub warp_core_max_power: u32,

    /// Starting allocation.
    #[serde(default)]
    pub power: PowerDistribution,

    /// Crew complement.
    #[serde(default = "default_max_crew")]
    pub max_crew: u32,

    /// Crew proficiency.
    #[serde(default)]
    pub crew_skill: CrewSkill,

    /// Energy weapon arrays.
    #[serde(default)]
    pub weapons: Vec<WeaponMount>,

    /// Torpedo bays.
    #[serde(default)]
    pub torpedo_bays: Vec<TorpedoMount>,

    /// Bridge officers aboard at commissioning.
    #[serde(default)]
    pub officers: Vec<OfficerPost>,
}

const fn default_impulse_speed() -> u32 {
    5
}

const fn default_sensor_range() -> u32 {
    5
}

const fn default_hull() -> f64 {
    1000.0
}

const fn default_armor() -> f64 {
    50.0
}

const fn default_shields() -> ArcMap<f64> {
    ArcMap::uniform(500.0)
}

const fn default_warp_core_power() -> u32 {
    300
}

const fn default_max_crew() -> u32 {
    200
}

impl ShipTemplate {
    /// Template with every stat at its default.
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            role: String::new(),
            size: SizeClass::default(),
            impulse_speed: default_impulse_speed(),
            sensor_range: default_sensor_range(),
            hull: default_hull(),
            armor: default_armor(),
            shields: default_shields(),
            warp_core_max_power: default_warp_core_power(),
            power: PowerDistribution::default(),
            max_crew: default_max_crew(),
            crew_skill: CrewSkill::default(),
            weapons: Vec::new(),
            torpedo_bays: Vec::new(),
            officers: Vec::new(),
        }
    }

    /// Check the template for out-of-range values.
    ///
    /// Returns a list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let class = &self.class;

        if class.trim().is_empty() {
            errors.push("class name is empty".to_string());
        }
        if self.hull <= 0.0 {
            errors.push(format!("{class}: hull must be positive, got {}", self.hull));
        }
        if !(0.0..=100.0).contains(&self.armor) {
            errors.push(format!("{class}: armor must be within 0..=100, got {}", self.armor));
        }
        for (arc, value) in self.shields.iter() {
            if value < 0.0 {
                errors.push(format!("{class}: {arc} shields are negative"));
            }
        }
        if self.max_crew == 0 {
            errors.push(format!("{class}: crew complement must be positive"));
        }
        if let Err(e) = self.power.check(self.warp_core_max_power) {
            errors.push(format!("{class}: power allocation rejected: {e}"));
        }

        for (i, mount) in self.weapons.iter().enumerate() {
            if !(MIN_MARK..=MAX_MARK).contains(&mount.mark) {
                errors.push(format!("{class}: weapon {i} has mark {} outside 1..=15", mount.mark));
            }
            if mount.arcs.is_empty() {
                errors.push(format!("{class}: weapon {i} has no firing arcs"));
            }
        }
        for (i, mount) in self.torpedo_bays.iter().enumerate() {
            if !(MIN_MARK..=MAX_MARK).contains(&mount.mark) {
                errors.push(format!("{class}: torpedo bay {i} has mark {} outside 1..=15", mount.mark));
            }
            if mount.arcs.is_empty() {
                errors.push(format!("{class}: torpedo bay {i} has no firing arcs"));
            }
        }

        errors
    }

    /// Commission a ship of this class.
    #[must_use]
    pub fn build(
        &self,
        id: ShipId,
        name: impl Into<String>,
        registry: impl Into<String>,
        faction: FactionId,
    ) -> Ship {
        let mut ship = Ship::new(id, name, self.class.clone(), self.size, faction)
            .with_registry(registry)
            .with_performance(self.impulse_speed, self.sensor_range)
            .with_hull(self.hull)
            .with_armor(self.armor)
            .with_power(self.warp_core_max_power, self.power)
            .with_shields(self.shields)
            .with_crew(self.max_crew, self.crew_skill);

        for mount in &self.weapons {
            ship = ship.with_weapon(WeaponArray::new(mount.weapon_type, mount.mark, mount.arcs.clone()));
        }
        for mount in &self.torpedo_bays {
            ship = ship.with_torpedo_bay(TorpedoBay::new(
                mount.torpedo_type,
                mount.mark,
                mount.arcs.clone(),
                mount.capacity,
            ));
        }
        for post in &self.officers {
            ship = ship.with_officer(post.station, post.officer.clone());
        }
        ship
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapons::Weapon;

    #[test]
    fn test_minimal_ron_uses_defaults() {
        let template: ShipTemplate = ron::from_str(r#"(class: "Plain")"#).unwrap();
        assert_eq!(template, ShipTemplate::new("Plain"));
        assert!(template.validate().is_empty());
    }

    #[test]
    fn test_full_ron_parses() {
        let text = r#"
            ShipTemplate(
                class: "Miranda",
                size: Medium,
                impulse_speed: 6,
                hull: 800.0,
                armor: 40.0,
                shields: (fore: 400.0, aft: 300.0, port: 350.0, starboard: 350.0),
                weapons: [(mark: 4, arcs: [Fore, Port])],
                torpedo_bays: [(torpedo_type: Photon, mark: 4, arcs: [Fore], capacity: 50)],
                officers: [(station: Captain, officer: (name: "Reyes", skill: Veteran))],
            )
        "#;
        let template: ShipTemplate = ron::from_str(text).unwrap();
        assert_eq!(template.impulse_speed, 6);
        assert_eq!(template.shields.aft, 300.0);
        assert_eq!(template.weapons[0].arcs, vec![Arc::Fore, Arc::Port]);
        assert_eq!(template.torpedo_bays[0].capacity, 50);
        assert_eq!(template.officers[0].officer.skill, CrewSkill::Veteran);
    }

    #[test]
    fn test_validate_catches_bad_values() {
        let mut template = ShipTemplate::new("Broken");
        template.hull = 0.0;
        template.armor = 120.0;
        template.max_crew = 0;
        template.power = PowerDistribution::new(250, 100, 100);
        template.weapons.push(WeaponMount::phaser(16, &[]));
        let errors = template.validate();
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_build_populates_ship() {
        let mut template = ShipTemplate::new("Saladin");
        template.hull = 850.0;
        template.armor = 45.0;
        template.shields = ArcMap::new(420.0, 360.0, 390.0, 390.0);
        template.weapons.push(WeaponMount::phaser(6, &[Arc::Fore, Arc::Port, Arc::Starboard]));
        template.torpedo_bays.push(TorpedoMount::photon(4, &[Arc::Fore], 60));
        template.officers.push(OfficerPost {
            station: Station::Tactical,
            officer: Officer::new("Okafor", CrewSkill::Elite),
        });

        let ship = template.build(ShipId(7), "Ajax", "NCC-500", FactionId(2));
        assert_eq!(ship.id, ShipId(7));
        assert_eq!(ship.registry, "NCC-500");
        assert_eq!(ship.ship_class, "Saladin");
        assert_eq!(ship.hull(), 850.0);
        assert_eq!(ship.armor(), 45.0);
        assert_eq!(ship.shield(Arc::Aft), 360.0);
        assert_eq!(ship.weapon_arrays[0].mark(), 6);
        assert_eq!(ship.torpedo_bays[0].torpedoes(), 60);
        assert!(ship.command_crew.get(Station::Tactical).is_some());
    }
}

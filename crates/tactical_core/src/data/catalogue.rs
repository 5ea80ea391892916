//! Ship class registry.

use std::collections::BTreeMap;

use super::ship_template::{ShipTemplate, TorpedoMount, WeaponMount};
use crate::error::{CombatError, Result};
use crate::ship::Arc::{Aft, Fore, Port, Starboard};
use crate::ship::{ArcMap, FactionId, PowerDistribution, Ship, ShipId, SizeClass};

/// Ship class templates keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct ShipCatalogue {
    templates: BTreeMap<String, ShipTemplate>,
}

impl ShipCatalogue {
    /// Empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue pre-loaded with the stock Starfleet classes.
    #[must_use]
    pub fn with_builtin_classes() -> Self {
        let mut catalogue = Self::new();
        for template in builtin_classes() {
            catalogue.insert(template);
        }
        catalogue
    }

    /// Add or replace a template, returning the one it replaced.
    pub fn insert(&mut self, template: ShipTemplate) -> Option<ShipTemplate> {
        self.templates.insert(template.class.clone(), template)
    }

    /// Look up a template.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&ShipTemplate> {
        self.templates.get(class)
    }

    /// Class names in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalogue has no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Parse a RON list of templates and add them all.
    ///
    /// Nothing is added unless every template parses and validates.
    /// Returns the number of templates added.
    pub fn load_ron_str(&mut self, source_name: &str, text: &str) -> Result<usize> {
        let templates: Vec<ShipTemplate> =
            ron::from_str(text).map_err(|e| CombatError::DataParse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;

        let errors: Vec<String> = templates.iter().flat_map(ShipTemplate::validate).collect();
        if !errors.is_empty() {
            return Err(CombatError::DataParse {
                source_name: source_name.to_string(),
                message: errors.join("; "),
            });
        }

        let count = templates.len();
        for template in templates {
            tracing::debug!(source = source_name, class = %template.class, "ship class loaded");
            self.insert(template);
        }
        Ok(count)
    }

    /// Commission a ship of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::UnknownShipClass`] if no such class is loaded.
    pub fn build(
        &self,
        class: &str,
        id: ShipId,
        name: impl Into<String>,
        registry: impl Into<String>,
        faction: FactionId,
    ) -> Result<Ship> {
        self.get(class)
            .map(|t| t.build(id, name, registry, faction))
            .ok_or_else(|| CombatError::UnknownShipClass(class.to_string()))
    }
}

fn builtin_classes() -> Vec<ShipTemplate> {
    let constitution = ShipTemplate {
        role: "Heavy Cruiser".to_string(),
        size: SizeClass::Large,
        impulse_speed: 6,
        sensor_range: 8,
        hull: 1200.0,
        armor: 45.0,
        shields: ArcMap::new(500.0, 400.0, 450.0, 450.0),
        warp_core_max_power: 360,
        power: PowerDistribution::new(120, 120, 120),
        max_crew: 430,
        weapons: vec![
            WeaponMount::phaser(6, &[Fore, Port, Starboard]),
            WeaponMount::phaser(6, &[Aft, Port, Starboard]),
            WeaponMount::phaser(5, &[Fore]),
            WeaponMount::phaser(4, &[Aft]),
        ],
        torpedo_bays: vec![
            TorpedoMount::photon(5, &[Fore], 100),
            TorpedoMount::photon(3, &[Aft], 50),
        ],
        ..ShipTemplate::new("Constitution")
    };

    let miranda = ShipTemplate {
        role: "Frigate".to_string(),
        impulse_speed: 6,
        sensor_range: 6,
        hull: 800.0,
        armor: 40.0,
        shields: ArcMap::new(400.0, 300.0, 350.0, 350.0),
        weapons: vec![
            WeaponMount::phaser(4, &[Fore, Port]),
            WeaponMount::phaser(4, &[Fore, Starboard]),
            WeaponMount::phaser(4, &[Aft]),
        ],
        torpedo_bays: vec![TorpedoMount::photon(4, &[Fore], 50)],
        ..ShipTemplate::new("Miranda")
    };

    let oberth = ShipTemplate {
        role: "Science Vessel".to_string(),
        size: SizeClass::Small,
        sensor_range: 10,
        hull: 400.0,
        armor: 15.0,
        shields: ArcMap::new(250.0, 200.0, 200.0, 200.0),
        warp_core_max_power: 240,
        power: PowerDistribution::new(80, 80, 80),
        max_crew: 80,
        weapons: vec![WeaponMount::phaser(2, &[Fore, Port, Starboard])],
        ..ShipTemplate::new("Oberth")
    };

    let saladin = ShipTemplate {
        role: "Destroyer".to_string(),
        impulse_speed: 7,
        sensor_range: 7,
        hull: 850.0,
        armor: 45.0,
        shields: ArcMap::new(420.0, 360.0, 390.0, 390.0),
        weapons: vec![
            WeaponMount::phaser(6, &[Fore, Port, Starboard]),
            WeaponMount::phaser(4, &[Aft]),
        ],
        torpedo_bays: vec![TorpedoMount::photon(4, &[Fore], 60)],
        ..ShipTemplate::new("Saladin")
    };

    let galaxy = ShipTemplate {
        role: "Explorer".to_string(),
        size: SizeClass::VeryLarge,
        impulse_speed: 4,
        sensor_range: 10,
        hull: 5000.0,
        armor: 100.0,
        shields: ArcMap::new(2000.0, 1500.0, 1800.0, 1800.0),
        warp_core_max_power: 500,
        power: PowerDistribution::new(166, 167, 167),
        max_crew: 1000,
        weapons: vec![
            WeaponMount::phaser(12, &[Fore, Port, Starboard]),
            WeaponMount::phaser(12, &[Aft, Port, Starboard]),
            WeaponMount::phaser(12, &[Fore]),
            WeaponMount::phaser(10, &[Aft]),
        ],
        torpedo_bays: vec![
            TorpedoMount::photon(12, &[Fore], 200),
            TorpedoMount::photon(12, &[Aft], 200),
        ],
        ..ShipTemplate::new("Galaxy")
    };

    vec![constitution, miranda, oberth, saladin, galaxy]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classes_are_valid() {
        let catalogue = ShipCatalogue::with_builtin_classes();
        assert_eq!(catalogue.len(), 5);
        assert_eq!(
            catalogue.classes().collect::<Vec<_>>(),
            vec!["Constitution", "Galaxy", "Miranda", "Oberth", "Saladin"]
        );
        for class in catalogue.classes() {
            let errors = catalogue.get(class).map(ShipTemplate::validate).unwrap();
            assert!(errors.is_empty(), "{class}: {errors:?}");
        }
    }

    #[test]
    fn test_build_known_and_unknown() {
        let catalogue = ShipCatalogue::with_builtin_classes();
        let ship = catalogue
            .build("Galaxy", ShipId(1), "Enterprise", "NCC-1701-D", FactionId(0))
            .unwrap();
        assert!(ship.size.is_multi_hex());
        assert_eq!(ship.max_crew(), 1000);
        assert_eq!(ship.torpedo_bays.len(), 2);

        let err = catalogue
            .build("Defiant", ShipId(2), "Defiant", "NX-74205", FactionId(0))
            .unwrap_err();
        assert_eq!(err, CombatError::UnknownShipClass("Defiant".to_string()));
    }

    #[test]
    fn test_load_ron_adds_classes() {
        let mut catalogue = ShipCatalogue::new();
        let text = r#"[
            (class: "Nova", sensor_range: 9, hull: 700.0),
            (class: "Steamrunner", impulse_speed: 7),
        ]"#;
        assert_eq!(catalogue.load_ron_str("test.ron", text).unwrap(), 2);
        assert_eq!(catalogue.get("Nova").map(|t| t.sensor_range), Some(9));
    }

    #[test]
    fn test_load_ron_is_all_or_nothing() {
        let mut catalogue = ShipCatalogue::new();
        let text = r#"[
            (class: "Good"),
            (class: "Bad", hull: -5.0),
        ]"#;
        let err = catalogue.load_ron_str("bad.ron", text).unwrap_err();
        assert!(matches!(err, CombatError::DataParse { .. }));
        assert!(catalogue.is_empty());

        let err = catalogue.load_ron_str("garbled.ron", "[(class: ").unwrap_err();
        assert!(matches!(err, CombatError::DataParse { source_name, .. } if source_name == "garbled.ron"));
    }
}

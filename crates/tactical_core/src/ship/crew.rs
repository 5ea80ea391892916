//! Crew skill and command officers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered crew proficiency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CrewSkill {
    /// Fresh out of the academy.
    Cadet,
    /// Some time in space.
    Green,
    /// Standard line crew.
    #[default]
    Regular,
    /// Seasoned.
    Veteran,
    /// Best that training can produce.
    Elite,
    /// Earned in combat, never trained.
    Legendary,
}

impl CrewSkill {
    /// All levels, lowest first.
    pub const ALL: [CrewSkill; 6] = [
        CrewSkill::Cadet,
        CrewSkill::Green,
        CrewSkill::Regular,
        CrewSkill::Veteran,
        CrewSkill::Elite,
        CrewSkill::Legendary,
    ];

    /// Bonus fraction applied to system efficiency.
    #[must_use]
    pub const fn bonus(self) -> f64 {
        match self {
            CrewSkill::Cadet => 0.0,
            CrewSkill::Green => 0.05,
            CrewSkill::Regular => 0.10,
            CrewSkill::Veteran => 0.15,
            CrewSkill::Elite => 0.20,
            CrewSkill::Legendary => 0.25,
        }
    }

    /// Ordinal position, Cadet = 0.
    #[must_use]
    pub const fn level(self) -> usize {
        self as usize
    }

    /// Level `steps` below this one, floored at Cadet.
    #[must_use]
    pub const fn demoted(self, steps: usize) -> Self {
        let level = self.level().saturating_sub(steps);
        Self::ALL[level]
    }

    /// Next level reachable through training. Legendary cannot be trained.
    #[must_use]
    pub const fn trained(self) -> Option<Self> {
        match self {
            CrewSkill::Cadet => Some(CrewSkill::Green),
            CrewSkill::Green => Some(CrewSkill::Regular),
            CrewSkill::Regular => Some(CrewSkill::Veteran),
            CrewSkill::Veteran => Some(CrewSkill::Elite),
            CrewSkill::Elite | CrewSkill::Legendary => None,
        }
    }

    /// Experience needed to reach this level.
    #[must_use]
    pub const fn experience_required(self) -> u32 {
        match self {
            CrewSkill::Cadet => 0,
            CrewSkill::Green => 100,
            CrewSkill::Regular => 300,
            CrewSkill::Veteran => 600,
            CrewSkill::Elite => 1000,
            CrewSkill::Legendary => 2000,
        }
    }
}

impl fmt::Display for CrewSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Number of skill levels lost for a given surviving crew fraction.
#[must_use]
pub fn degradation_steps(crew_fraction: f64) -> usize {
    if crew_fraction >= 0.75 {
        0
    } else if crew_fraction >= 0.50 {
        1
    } else if crew_fraction >= 0.25 {
        2
    } else {
        3
    }
}

/// Bridge station an officer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Station {
    /// Commanding officer; drives initiative.
    Captain,
    /// Weapons officer; improves hit chance and damage.
    Tactical,
    /// Chief medical officer; reduces casualties.
    Medical,
    /// Chief engineer; speeds repairs and evacuations.
    Engineer,
    /// Helm officer.
    Conn,
    /// Science officer.
    Science,
}

/// A named officer with a skill level and accumulated experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    /// Officer's name.
    pub name: String,
    /// Species, for flavour.
    #[serde(default)]
    pub species: String,
    /// Proficiency.
    pub skill: CrewSkill,
    /// Experience earned so far.
    #[serde(default)]
    pub experience: u32,
}

impl Officer {
    /// Create an officer with no experience.
    #[must_use]
    pub fn new(name: impl Into<String>, skill: CrewSkill) -> Self {
        Self {
            name: name.into(),
            species: String::new(),
            skill,
            experience: 0,
        }
    }

    /// Skill bonus fraction.
    #[must_use]
    pub const fn skill_bonus(&self) -> f64 {
        self.skill.bonus()
    }

    /// Add experience and promote to the highest level now reached.
    ///
    /// Returns `true` if the officer was promoted.
    pub fn gain_experience(&mut self, xp: u32) -> bool {
        self.experience = self.experience.saturating_add(xp);
        let before = self.skill;
        for level in &CrewSkill::ALL[self.skill.level() + 1..] {
            if self.experience >= level.experience_required() {
                self.skill = *level;
            }
        }
        self.skill != before
    }
}

/// Bridge crew: at most one officer per station.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandCrew {
    /// Commanding officer.
    #[serde(default)]
    pub captain: Option<Officer>,
    /// Tactical officer.
    #[serde(default)]
    pub tactical: Option<Officer>,
    /// Medical officer.
    #[serde(default)]
    pub medical: Option<Officer>,
    /// Chief engineer.
    #[serde(default)]
    pub engineer: Option<Officer>,
    /// Helm officer.
    #[serde(default)]
    pub conn: Option<Officer>,
    /// Science officer.
    #[serde(default)]
    pub science: Option<Officer>,
}

impl CommandCrew {
    /// Officer at a station, if posted.
    #[must_use]
    pub const fn get(&self, station: Station) -> Option<&Officer> {
        match station {
            Station::Captain => self.captain.as_ref(),
            Station::Tactical => self.tactical.as_ref(),
            Station::Medical => self.medical.as_ref(),
            Station::Engineer => self.engineer.as_ref(),
            Station::Conn => self.conn.as_ref(),
            Station::Science => self.science.as_ref(),
        }
    }

    /// Post an officer, returning whoever held the station before.
    pub fn assign(&mut self, station: Station, officer: Officer) -> Option<Officer> {
        let slot = match station {
            Station::Captain => &mut self.captain,
            Station::Tactical => &mut self.tactical,
            Station::Medical => &mut self.medical,
            Station::Engineer => &mut self.engineer,
            Station::Conn => &mut self.conn,
            Station::Science => &mut self.science,
        };
        slot.replace(officer)
    }

    /// Skill bonus from a station, 0 when vacant.
    #[must_use]
    pub fn bonus(&self, station: Station) -> f64 {
        self.get(station).map_or(0.0, Officer::skill_bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_bonus_table() {
        assert_eq!(CrewSkill::Cadet.bonus(), 0.0);
        assert_eq!(CrewSkill::Regular.bonus(), 0.10);
        assert_eq!(CrewSkill::Legendary.bonus(), 0.25);
    }

    #[test]
    fn test_demotion_floors_at_cadet() {
        assert_eq!(CrewSkill::Veteran.demoted(1), CrewSkill::Regular);
        assert_eq!(CrewSkill::Green.demoted(3), CrewSkill::Cadet);
    }

    #[test]
    fn test_training_stops_before_legendary() {
        assert_eq!(CrewSkill::Veteran.trained(), Some(CrewSkill::Elite));
        assert_eq!(CrewSkill::Elite.trained(), None);
    }

    #[test]
    fn test_degradation_thresholds() {
        assert_eq!(degradation_steps(1.0), 0);
        assert_eq!(degradation_steps(0.75), 0);
        assert_eq!(degradation_steps(0.74), 1);
        assert_eq!(degradation_steps(0.49), 2);
        assert_eq!(degradation_steps(0.1), 3);
    }

    #[test]
    fn test_officer_experience_promotes() {
        let mut o = Officer::new("T'Vel", CrewSkill::Cadet);
        assert!(!o.gain_experience(50));
        assert!(o.gain_experience(300));
        assert_eq!(o.skill, CrewSkill::Regular);
        o.gain_experience(5000);
        assert_eq!(o.skill, CrewSkill::Legendary);
    }

    #[test]
    fn test_command_crew_assignment() {
        let mut crew = CommandCrew::default();
        assert_eq!(crew.bonus(Station::Medical), 0.0);
        assert!(crew
            .assign(Station::Medical, Officer::new("Okafor", CrewSkill::Elite))
            .is_none());
        assert_eq!(crew.bonus(Station::Medical), 0.20);
        let old = crew.assign(Station::Medical, Officer::new("Reyes", CrewSkill::Green));
        assert_eq!(old.map(|o| o.name), Some("Okafor".to_string()));
    }
}

//! Targeting and firing resolution.

use super::CombatEngine;
use crate::damage::{DamageResult, DamageType};
use crate::error::Result;
use crate::events::CombatEvent;
use crate::rng::CombatRng;
use crate::ship::{Arc, ShipId};
use crate::targeting::{
    hit_chance, shield_facing_hit, shot_damage, target_arc, targeting_accuracy, validate_target,
    TargetPriority,
};
use crate::weapons::Weapon;

/// One weapon's line of fire for a volley.
#[derive(Debug, Clone, Copy)]
struct FireSolution {
    target_idx: usize,
    target: ShipId,
    distance: u32,
    arc: Arc,
    shield_arc: Arc,
    multiplier: f64,
}

impl<R: CombatRng> CombatEngine<R> {
    pub(super) fn assign_target(
        &mut self,
        attacker: ShipId,
        target: ShipId,
        priority: TargetPriority,
    ) -> Result<()> {
        let attacker_idx = self.index_of(attacker)?;
        let target_idx = self.index_of(target)?;
        validate_target(&self.ships[attacker_idx], &self.ships[target_idx], &self.config)?;

        self.targets.entry(attacker).or_default().set(priority, target);
        tracing::debug!(attacker = %attacker, target = %target, ?priority, "target selected");
        self.events.push(CombatEvent::TargetSelected {
            attacker,
            target,
            priority,
        });
        Ok(())
    }

    /// Current fire solutions for `attacker`, primary first. Targets that
    /// are no longer operational or beyond every band are left out.
    fn fire_solutions(&self, attacker_idx: usize) -> Vec<FireSolution> {
        let attacker = &self.ships[attacker_idx];
        let mut solutions = Vec::new();
        for (priority, target) in self.targets(attacker.id).iter() {
            let Ok(target_idx) = self.index_of(target) else {
                continue;
            };
            let defender = &self.ships[target_idx];
            if !defender.is_operational() {
                continue;
            }
            let distance = attacker.position.distance(defender.position);
            if distance > self.config.max_engagement_range {
                continue;
            }
            let Some(range_multiplier) = targeting_accuracy(distance) else {
                continue;
            };
            solutions.push(FireSolution {
                target_idx,
                target,
                distance,
                arc: target_arc(attacker, defender),
                shield_arc: shield_facing_hit(defender, attacker),
                multiplier: range_multiplier * priority.accuracy_multiplier(&self.config),
            });
        }
        solutions
    }

    /// Fire every ready weapon of `ship`. Energy arrays engage each assigned
    /// target inside their arcs and range, primary first. A torpedo bay
    /// launches once, at the highest-priority target it can reach.
    pub(super) fn resolve_fire(&mut self, ship: ShipId) -> Result<()> {
        let attacker_idx = self.index_of(ship)?;
        let solutions = self.fire_solutions(attacker_idx);

        for i in 0..self.ships[attacker_idx].weapon_arrays.len() {
            for solution in &solutions {
                let weapon = &self.ships[attacker_idx].weapon_arrays[i];
                if !weapon.is_ready() {
                    break;
                }
                let cap = weapon.max_range().min(self.config.energy_range_cap);
                if !self.can_engage(solution, cap, |arc| weapon.covers(arc)) {
                    continue;
                }
                let raw = self.ships[attacker_idx].weapon_arrays[i].fire();
                self.deliver(attacker_idx, *solution, raw, DamageType::Energy);
            }
        }

        for i in 0..self.ships[attacker_idx].torpedo_bays.len() {
            let bay = &self.ships[attacker_idx].torpedo_bays[i];
            if !bay.is_ready() {
                continue;
            }
            let cap = bay.max_range().min(self.config.torpedo_range_cap);
            let Some(solution) = solutions
                .iter()
                .find(|s| self.can_engage(s, cap, |arc| bay.covers(arc)))
                .copied()
            else {
                continue;
            };
            let crew_bonus = self.ships[attacker_idx].crew_bonus();
            let raw = self.ships[attacker_idx].torpedo_bays[i].fire(crew_bonus);
            self.deliver(attacker_idx, solution, raw, DamageType::Torpedo);
        }

        Ok(())
    }

    fn can_engage(
        &self,
        solution: &FireSolution,
        range_cap: u32,
        covers: impl Fn(Arc) -> bool,
    ) -> bool {
        solution.distance <= range_cap
            && covers(solution.arc)
            && self.ships[solution.target_idx].is_operational()
    }

    /// Roll one shot and apply it to the target.
    fn deliver(&mut self, attacker_idx: usize, solution: FireSolution, raw: u32, kind: DamageType) {
        let attacker = &self.ships[attacker_idx];
        let attacker_id = attacker.id;
        let chance = hit_chance(attacker, kind, &self.config);
        let damage = (shot_damage(attacker, raw, kind, &self.config) * solution.multiplier).floor();
        let hit = self.rng.roll_hit(chance);

        tracing::debug!(
            attacker = %attacker_id,
            target = %solution.target,
            ?kind,
            hit,
            damage,
            shield_arc = %solution.shield_arc,
            "weapon fired"
        );
        self.events.push(CombatEvent::WeaponFired {
            attacker: attacker_id,
            target: solution.target,
            kind,
            shield_arc: solution.shield_arc,
            hit,
            damage: if hit { damage } else { 0.0 },
        });
        if !hit {
            return;
        }

        let result = self.ships[solution.target_idx].take_damage(
            damage,
            solution.shield_arc,
            kind,
            &mut self.rng,
        );
        self.report_damage(solution.target, &result);
    }

    fn report_damage(&mut self, ship: ShipId, result: &DamageResult) {
        for hit in &result.system_damage {
            self.events.push(CombatEvent::SystemDamaged {
                ship,
                system: hit.system,
                health: hit.new_health,
            });
            if hit.destroyed {
                self.events.push(CombatEvent::SystemDestroyed {
                    ship,
                    system: hit.system,
                    message: hit.system.destruction_message().to_string(),
                });
            }
        }
        if result.hull_failure {
            self.events.push(CombatEvent::HullFailure {
                ship,
                casualties: result.casualties,
            });
        }
        if result.warp_core_breach {
            self.events.push(CombatEvent::WarpCoreBreach {
                ship,
                crew_evacuated: result.breach_survived,
            });
            self.events.push(CombatEvent::ShipDestroyed { ship });
            for assignment in self.targets.values_mut() {
                assignment.remove(ship);
            }
        }
    }
}

//! Property tests for the geometry, damage and power rules.

use proptest::prelude::*;
use tactical_core::prelude::*;
use tactical_core::targeting::targeting_accuracy;
use tactical_test_utils::fixtures::target_ship;
use tactical_test_utils::determinism::strategies::{
    arb_arc, arb_damage, arb_facing, arb_hex, arb_mark, arb_power_request, arb_seed, arb_system,
};

proptest! {
    #[test]
    fn prop_distance_is_a_metric(a in arb_hex(20), b in arb_hex(20), c in arb_hex(20)) {
        prop_assert_eq!(a.distance(b), b.distance(a));
        prop_assert_eq!(a.distance(a), 0);
        prop_assert!(a.distance(c) <= a.distance(b) + b.distance(c));
    }

    #[test]
    fn prop_neighbors_are_adjacent(a in arb_hex(20)) {
        for n in a.neighbors() {
            prop_assert_eq!(a.distance(n), 1);
        }
    }

    #[test]
    fn prop_ring_size_and_radius(a in arb_hex(10), radius in 1u32..6) {
        let ring = a.ring(radius);
        prop_assert_eq!(ring.len(), 6 * radius as usize);
        for hex in ring {
            prop_assert_eq!(a.distance(hex), radius);
        }
    }

    #[test]
    fn prop_line_spans_both_ends(a in arb_hex(15), b in arb_hex(15)) {
        let line = a.line_to(b);
        prop_assert_eq!(line.len(), a.distance(b) as usize + 1);
        prop_assert_eq!(line.first().copied(), Some(a));
        prop_assert_eq!(line.last().copied(), Some(b));
    }

    #[test]
    fn prop_turns_undo_each_other(f in arb_facing()) {
        prop_assert_eq!(f.turned_left().turned_right(), f);
        prop_assert_eq!(f.turned_right().turned_left(), f);
        prop_assert_eq!(f.turns_to(f.turned_right()), 1);
        prop_assert!(f.turns_to(Facing::new(0)) <= 3);
    }

    #[test]
    fn prop_ahead_then_behind_returns(a in arb_hex(20), f in arb_facing()) {
        prop_assert_eq!(a.ahead(f).behind(f), a);
    }

    #[test]
    fn prop_damage_stays_in_bounds(
        amount in arb_damage(),
        arc in arb_arc(),
        torpedo in any::<bool>(),
        seed in arb_seed(),
    ) {
        let mut ship = target_ship(1, 0, 0, 0, 0, 200.0, 30.0);
        let kind = if torpedo { DamageType::Torpedo } else { DamageType::Energy };
        let shield_before = ship.shield(arc);
        let hull_before = ship.hull();

        let result = ship.take_damage(amount, arc, kind, &mut SeededRng::new(seed));

        prop_assert!(ship.shield(arc) >= 0.0 && ship.shield(arc) <= shield_before);
        prop_assert!(ship.hull() >= 0.0 && ship.hull() <= hull_before);
        prop_assert!(result.shield_damage >= 0.0 && result.hull_damage >= 0.0);
        prop_assert!(ship.crew_count() <= ship.max_crew());
        prop_assert!(!(result.disabled && result.destroyed));
        for system in SystemKind::ALL {
            prop_assert!(ship.system_health(system) >= 0.0);
        }
    }

    #[test]
    fn prop_power_request_is_all_or_nothing((e, s, w) in arb_power_request()) {
        let mut ship = target_ship(1, 0, 0, 0, 0, 100.0, 0.0);
        let before = ship.power();
        let fits = e <= 200 && s <= 200 && w <= 200 && e + s + w <= ship.available_power();

        match ship.redistribute_power(e, s, w) {
            Ok(()) => {
                prop_assert!(fits);
                prop_assert_eq!(ship.power(), PowerDistribution::new(e, s, w));
            }
            Err(_) => {
                prop_assert!(!fits);
                prop_assert_eq!(ship.power(), before);
            }
        }
        for arc in Arc::ALL {
            prop_assert!(ship.shield(arc) <= ship.max_shield_for_arc(arc));
        }
    }

    #[test]
    fn prop_higher_marks_hit_harder(mark in arb_mark()) {
        prop_assume!(mark < 15);
        let phaser = |m| WeaponArray::new(EnergyWeaponType::Phaser, m, vec![Arc::Fore]).damage();
        let photon = |m| TorpedoBay::new(TorpedoType::Photon, m, vec![Arc::Fore], 1).damage();
        prop_assert!(phaser(mark + 1) > phaser(mark));
        prop_assert!(photon(mark + 1) > photon(mark));
    }

    #[test]
    fn prop_repair_never_overshoots(system in arb_system(), health in 0u32..=100, amount in 0u32..200) {
        let mut ship = target_ship(1, 0, 0, 0, 0, 100.0, 0.0);
        ship.set_system_health(system, f64::from(health));
        let before = ship.system_health(system);
        let after = ship.repair_system(system, f64::from(amount));
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn prop_shield_regeneration_respects_caps(amount in 0u32..500, drained in 0u32..=200) {
        let mut ship = target_ship(1, 0, 0, 0, 0, 200.0, 0.0);
        for arc in Arc::ALL {
            ship.set_shield(arc, f64::from(200 - drained));
        }
        ship.regenerate_shields(f64::from(amount));
        for arc in Arc::ALL {
            prop_assert!(ship.shield(arc) <= ship.max_shield_for_arc(arc));
            prop_assert!(ship.shield(arc) >= f64::from(200 - drained));
        }
    }
}

#[test]
fn test_accuracy_falls_with_range() {
    let bands: Vec<f64> = (0..=13).filter_map(targeting_accuracy).collect();
    assert_eq!(bands.len(), 14);
    assert!(bands.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(targeting_accuracy(14), None);
}

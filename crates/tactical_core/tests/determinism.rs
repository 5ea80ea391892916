//! Seed-level determinism and record replay across whole encounters.

use proptest::prelude::*;
use tactical_core::prelude::*;
use tactical_test_utils::determinism::{
    find_first_divergence, verify_record_replay, verify_skirmish_determinism,
};
use tactical_test_utils::fixtures::{duel, Skirmish};
use tactical_test_utils::determinism::strategies::{arb_personality, arb_seed};

/// Two ships a side from the built-in catalogue.
fn fleet_action() -> Vec<Ship> {
    let catalogue = ShipCatalogue::with_builtin_classes();
    let place = |class: &str, id: u32, faction: u16, q: i32, r: i32, facing: u8| {
        catalogue
            .build(class, ShipId(id), format!("Ship {id}"), format!("NCC-{id}"), FactionId(faction))
            .unwrap()
            .with_position(HexCoord::new(q, r), Facing::new(facing))
    };
    vec![
        place("Constitution", 1, 0, 0, 0, 0),
        place("Miranda", 2, 0, 0, 4, 0),
        place("Saladin", 3, 1, 9, 0, 3),
        place("Oberth", 4, 1, 9, 4, 3),
    ]
}

#[test]
fn test_fleet_action_is_deterministic() {
    let setup = || {
        Skirmish::new(fleet_action(), 2024, Personality::Aggressive, Personality::Sniper).unwrap()
    };
    verify_skirmish_determinism(setup, 3, 6).assert_deterministic();
    assert_eq!(find_first_divergence(setup, 6), None);
}

#[test]
fn test_fleet_action_record_replays() {
    let ships = fleet_action();
    let mut skirmish =
        Skirmish::new(ships.clone(), 77, Personality::Balanced, Personality::Defensive).unwrap();
    skirmish.run(5);
    assert!(!skirmish.engine.history().is_empty());
    assert!(verify_record_replay(77, &ships, &skirmish.engine));
}

#[test]
fn test_record_survives_bytes() {
    let ships = fleet_action();
    let mut skirmish =
        Skirmish::new(ships.clone(), 5, Personality::Sniper, Personality::Aggressive).unwrap();
    skirmish.run(4);

    let record = EncounterRecord::capture(5, &ships, &skirmish.engine).unwrap();
    let decoded = EncounterRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(decoded.replay().unwrap().state_hash(), skirmish.engine.state_hash());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_any_seed_replays(
        seed in arb_seed(),
        a in arb_personality(),
        b in arb_personality(),
    ) {
        let ships = duel("Constitution", "Saladin", 7).unwrap();
        let mut skirmish = Skirmish::new(ships.clone(), seed, a, b).unwrap();
        skirmish.run(3);
        prop_assert!(verify_record_replay(seed, &ships, &skirmish.engine));
    }
}

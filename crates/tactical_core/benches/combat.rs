//! Combat benchmarks for tactical_core.
//!
//! Run with: `cargo bench -p tactical_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tactical_core::ai::candidate_plans;
use tactical_core::prelude::*;

fn duel(seed: u64) -> (CombatEngine<SeededRng>, Vec<ShipAi>, SeededRng) {
    let catalogue = ShipCatalogue::with_builtin_classes();
    let ships = vec![
        catalogue
            .build("Constitution", ShipId(1), "Alpha", "NCC-1", FactionId(0))
            .unwrap()
            .with_position(HexCoord::ORIGIN, Facing::new(0)),
        catalogue
            .build("Saladin", ShipId(2), "Bravo", "NCC-2", FactionId(1))
            .unwrap()
            .with_position(HexCoord::new(8, 0), Facing::new(3)),
    ];
    let engine = CombatEngine::new(ships, CombatConfig::default(), SeededRng::new(seed)).unwrap();
    let controllers = vec![
        ShipAi::new(ShipId(1), Personality::Aggressive),
        ShipAi::new(ShipId(2), Personality::Balanced),
    ];
    (engine, controllers, controller_rng(seed))
}

/// One full AI-vs-AI turn, and a whole short encounter.
pub fn encounter_benchmark(c: &mut Criterion) {
    c.bench_function("ai_turn", |b| {
        b.iter_batched(
            || duel(7),
            |(mut engine, mut controllers, mut rng)| {
                run_encounter(&mut engine, &mut controllers, &mut rng, 1);
                black_box(engine.state_hash())
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("encounter_10_turns", |b| {
        b.iter_batched(
            || duel(7),
            |(mut engine, mut controllers, mut rng)| {
                black_box(run_encounter(&mut engine, &mut controllers, &mut rng, 10))
            },
            BatchSize::SmallInput,
        )
    });
}

/// Maneuver search at the default depth.
pub fn search_benchmark(c: &mut Criterion) {
    let state = MovementState::new(6);
    c.bench_function("candidate_plans_depth_4", |b| {
        b.iter(|| {
            let plans = candidate_plans(
                black_box(state),
                4,
                HexCoord::ORIGIN,
                Facing::new(0),
                &|_| false,
            );
            black_box(plans.len())
        })
    });
}

/// Hex geometry hot paths.
pub fn geometry_benchmark(c: &mut Criterion) {
    let from = HexCoord::new(-7, 3);
    let to = HexCoord::new(9, -4);
    c.bench_function("line_to", |b| b.iter(|| black_box(from).line_to(black_box(to))));
    c.bench_function("spiral_radius_13", |b| {
        b.iter(|| black_box(HexCoord::ORIGIN).spiral(13).len())
    });
}

criterion_group!(benches, encounter_benchmark, search_benchmark, geometry_benchmark);
criterion_main!(benches);

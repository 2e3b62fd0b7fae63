//! Determinism Test - Golden Master verification.
//!
//! Verifies that the engine produces identical results across runs
//! when given the same input sequence and leaderboard seed.

use arcadia::replay::{read_commands, write_commands};
use arcadia::{AddScore, Command, DeleteItem, Engine, InsertItem, Outcome, RemovePlayer};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a deterministic sequence of commands
fn generate_commands(seed: u64, count: usize) -> Vec<Command> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut commands = Vec::with_capacity(count);
    let mut listed: Vec<i64> = Vec::new();
    let mut next_item_id = 1i64;

    for _ in 0..count {
        let cmd = match rng.gen_range(0..10) {
            // 40% score updates over a small player pool
            0..=3 => Command::AddScore(AddScore {
                player_id: rng.gen_range(1..500),
                delta: rng.gen_range(-50..1_000),
            }),
            // 10% removals, some of absent players
            4 => Command::RemovePlayer(RemovePlayer {
                player_id: rng.gen_range(1..600),
            }),
            // 30% new listings
            5..=7 => {
                let item_id = next_item_id;
                next_item_id += 1;
                listed.push(item_id);
                Command::InsertItem(InsertItem {
                    item_id,
                    price: rng.gen_range(1..10_000),
                })
            }
            // 20% withdrawals
            _ if !listed.is_empty() => {
                let idx = rng.gen_range(0..listed.len());
                Command::DeleteItem(DeleteItem {
                    item_id: listed.swap_remove(idx),
                })
            }
            _ => Command::DeleteItem(DeleteItem { item_id: -1 }),
        };
        commands.push(cmd);
    }

    commands
}

/// Run the engine with a command sequence and return (outcome hash, state hash)
fn run_engine(seed: u64, commands: &[Command]) -> (u64, u64) {
    let mut engine = Engine::with_seed(seed);
    let mut hasher = DefaultHasher::new();

    for cmd in commands {
        engine.process_command(*cmd).hash(&mut hasher);
    }

    engine.leaderboard.validate().unwrap();
    engine.auction.validate().unwrap();

    (hasher.finish(), engine.state_hash())
}

#[test]
fn test_determinism_small() {
    const SEED: u64 = 0xDEADBEEF;
    const COUNT: usize = 1000;
    const RUNS: usize = 10;

    let commands = generate_commands(SEED, COUNT);

    // Run multiple times and verify identical results
    let (first_outcome_hash, first_state_hash) = run_engine(SEED, &commands);

    for run in 1..RUNS {
        let (outcome_hash, state_hash) = run_engine(SEED, &commands);

        assert_eq!(
            outcome_hash, first_outcome_hash,
            "Outcome hash mismatch on run {}", run
        );
        assert_eq!(
            state_hash, first_state_hash,
            "State hash mismatch on run {}", run
        );
    }

    println!("Determinism test passed!");
    println!("  Commands: {}", COUNT);
    println!("  Runs: {}", RUNS);
    println!("  Outcome hash: {:#018x}", first_outcome_hash);
    println!("  State hash: {:#018x}", first_state_hash);
}

#[test]
fn test_determinism_large() {
    const SEED: u64 = 0xCAFEBABE;
    const COUNT: usize = 100_000;
    const RUNS: usize = 3;

    let commands = generate_commands(SEED, COUNT);

    let (first_outcome_hash, first_state_hash) = run_engine(SEED, &commands);

    for run in 1..RUNS {
        let (outcome_hash, state_hash) = run_engine(SEED, &commands);

        assert_eq!(outcome_hash, first_outcome_hash, "Outcome hash mismatch on run {}", run);
        assert_eq!(state_hash, first_state_hash, "State hash mismatch on run {}", run);
    }

    println!("Large determinism test passed!");
    println!("  Commands: {}", COUNT);
    println!("  State hash: {:#018x}", first_state_hash);
}

#[test]
fn test_different_seeds_produce_different_results() {
    let commands1 = generate_commands(1, 1000);
    let commands2 = generate_commands(2, 1000);

    let (_, hash1) = run_engine(7, &commands1);
    let (_, hash2) = run_engine(7, &commands2);

    assert_ne!(hash1, hash2, "Different seeds should produce different results");
}

#[test]
fn test_replay_log_reproduces_state() {
    const SEED: u64 = 0x5EED;
    let commands = generate_commands(SEED, 5_000);

    let mut log = Vec::new();
    write_commands(&mut log, commands.iter().copied()).unwrap();
    let replayed = read_commands(log.as_slice()).unwrap();

    assert_eq!(run_engine(SEED, &commands), run_engine(SEED, &replayed));
}

#[test]
fn test_rankings_independent_of_level_seed() {
    // Levels differ between seeds; the ordering they index must not
    let commands = generate_commands(99, 5_000);

    let mut engine1 = Engine::with_seed(1);
    let mut engine2 = Engine::with_seed(2);
    for cmd in &commands {
        assert_eq!(engine1.process_command(*cmd), engine2.process_command(*cmd));
    }

    let ranking1: Vec<_> = engine1.leaderboard.iter().collect();
    let ranking2: Vec<_> = engine2.leaderboard.iter().collect();
    assert_eq!(ranking1, ranking2);
    assert_eq!(engine1.auction.in_order_ids(), engine2.auction.in_order_ids());
    assert_eq!(engine1.auction.state_hash(), engine2.auction.state_hash());
}

#[test]
fn test_outcomes_report_absent_removals() {
    let mut engine = Engine::with_seed(3);
    let outcome = engine.process_command(Command::RemovePlayer(RemovePlayer { player_id: 1 }));
    assert_eq!(outcome, Outcome::NoOp);
}

//! RNG seed derivation utilities for deterministic game behavior.
//!
//! Provides functions to derive unique-but-deterministic seeds for different
//! consumers (the table, each AI seat, each search worker) from one base seed.

/// Derive the seed for the table RNG (rolls, shuffles, draws, False Tell).
pub fn derive_table_seed(game_seed: u64) -> u64 {
    game_seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1)
}

/// Derive a seed for the AI sitting at `seat`.
///
/// Same game + seat = same AI behaviour, different seats never share a stream.
pub fn derive_ai_seed(game_seed: u64, seat: u8) -> u64 {
    // Different multiplier from the table seed to keep the streams apart
    game_seed
        .wrapping_add((seat as u64).wrapping_mul(1_000_003))
        .wrapping_add(2)
}

/// Derive a seed for one ISMCTS worker during one search.
///
/// # Arguments
///
/// * `ai_seed` - Seed of the AI running the search
/// * `worker` - Worker index within the pool
/// * `search_no` - Monotonic search counter of that AI
pub fn derive_worker_seed(ai_seed: u64, worker: usize, search_no: u64) -> u64 {
    ai_seed
        .wrapping_add(search_no.wrapping_mul(10_000))
        .wrapping_add((worker as u64).wrapping_mul(100))
        .wrapping_add(3)
}

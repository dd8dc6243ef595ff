//! Deterministic seed derivation for placement randomness.
//!
//! Every random decision in the structure-start path is a pure function of
//! the world seed and a chunk or region address, so replaying a start decision
//! yields the same answer on any thread.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::world::ChunkPos;

// ---------------------------------------------------------------------------
// Chunk seeds
// ---------------------------------------------------------------------------

/// Derive a u64 seed for a chunk from the world seed and chunk position.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine the world seed with
/// the chunk coordinates into a well-distributed u64.
pub fn derive_chunk_seed(world_seed: u64, chunk: ChunkPos) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    chunk.x.hash(&mut hasher);
    chunk.z.hash(&mut hasher);
    hasher.finish()
}

/// RNG for generating a structure's pieces in `chunk`.
///
/// Mixes the structure's salt into the chunk seed so two structure types
/// evaluated for the same chunk draw independent sequences.
pub fn structure_rng(world_seed: u64, chunk: ChunkPos, salt: u32) -> ChaCha8Rng {
    let mut hasher = DefaultHasher::new();
    derive_chunk_seed(world_seed, chunk).hash(&mut hasher);
    salt.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

// ---------------------------------------------------------------------------
// Region seeds
// ---------------------------------------------------------------------------

/// Seed of a structure spacing region.
///
/// `rx · 341873128712 + rz · 132897987541 + world_seed + salt`, computed with
/// wrapping 64-bit arithmetic.
pub fn region_seed(world_seed: u64, region_x: i32, region_z: i32, salt: u32) -> u64 {
    (region_x as i64)
        .wrapping_mul(341_873_128_712)
        .wrapping_add((region_z as i64).wrapping_mul(132_897_987_541))
        .wrapping_add(world_seed as i64)
        .wrapping_add(salt as i64) as u64
}

/// Derive a deterministic RNG for a structure spacing region.
pub fn region_rng(world_seed: u64, region_x: i32, region_z: i32, salt: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(region_seed(world_seed, region_x, region_z, salt))
}

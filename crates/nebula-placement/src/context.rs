use glam::IVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biome::BiomeId;
use crate::world::{ChunkGenerator, ChunkPos, WorldAccess};

/// Per-call placement state: where, in which world, with which randomness.
///
/// Built fresh for every call and dropped when it returns.
pub struct PlacementContext<'w> {
    pub origin: IVec3,
    pub world: &'w dyn WorldAccess,
    /// Seeded from the world's shared random source.
    pub random: ChaCha8Rng,
    /// Biome at `origin`.
    pub biome: BiomeId,
}

impl<'w> PlacementContext<'w> {
    pub fn new(world: &'w dyn WorldAccess, origin: IVec3) -> Self {
        Self {
            origin,
            world,
            random: ChaCha8Rng::seed_from_u64(world.next_random_seed()),
            biome: world.biome_at(origin),
        }
    }

    pub fn generator(&self) -> &'w dyn ChunkGenerator {
        self.world.generator()
    }

    /// Chunk containing `origin`.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::containing(self.origin)
    }
}

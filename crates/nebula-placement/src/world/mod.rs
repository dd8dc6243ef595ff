//! Interfaces to the world the engine places content into.
//!
//! Terrain generation, chunk storage and block mutation are owned by the
//! host engine. The placement engine only borrows them through the traits in
//! this module for the duration of one call.

mod memory;

pub use memory::{MemoryStructures, MemoryWorld, SURFACE_Y, SimpleGenerator, ZonedBiomeSource};

use std::sync::Arc;

use glam::IVec3;

use crate::biome::BiomeId;
use crate::block::Block;
use crate::checks::GenerationChecks;
use crate::key::ContentKey;
use crate::registry::Registries;
use crate::structure::{StructurePool, StructureSettings, StructureStart, StructureTemplate};

/// Width of a chunk column in blocks.
pub const CHUNK_WIDTH: i32 = 16;

/// Horizontal chunk coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing a block position.
    pub fn containing(pos: IVec3) -> Self {
        Self::new(pos.x.div_euclid(CHUNK_WIDTH), pos.z.div_euclid(CHUNK_WIDTH))
    }

    /// North-west corner block of this chunk at height `y`.
    pub fn min_block(self, y: i32) -> IVec3 {
        IVec3::new(self.x * CHUNK_WIDTH, y, self.z * CHUNK_WIDTH)
    }

    /// Block near the middle of this chunk at height `y`, used for biome sampling.
    pub fn center_block(self, y: i32) -> IVec3 {
        self.min_block(y) + IVec3::new(9, 0, 9)
    }
}

/// Source of biome assignments for the chunk generator.
pub trait BiomeSource: Send + Sync {
    /// Biome at a block position.
    fn biome_at(&self, pos: IVec3) -> BiomeId;
}

/// The host's chunk generator, as far as placement needs it.
pub trait ChunkGenerator: Send + Sync {
    /// Per-structure spacing and the biome index of configured structures.
    fn structure_settings(&self) -> &StructureSettings;

    /// Biome source the generator samples.
    fn biome_source(&self) -> &dyn BiomeSource;
}

/// Structure-data store: templates, pools and bookkeeping of placed starts.
pub trait StructureStore: Send + Sync {
    /// Looks up a piece template.
    fn template(&self, id: &ContentKey) -> Option<Arc<StructureTemplate>>;

    /// Looks up a template pool referenced by a connector.
    fn pool(&self, id: &ContentKey) -> Option<Arc<StructurePool>>;

    /// Records a structure start that was committed to the world.
    fn record_start(&self, start: &StructureStart);
}

/// Read/write handle to a world, borrowed for one placement call.
///
/// Implementations are shared between threads; every method takes `&self`.
pub trait WorldAccess: Send + Sync {
    /// World seed.
    fn seed(&self) -> u64;

    /// Content registries of this world.
    fn registries(&self) -> &Registries;

    /// Chunk generator of this world.
    fn generator(&self) -> &dyn ChunkGenerator;

    /// Structure-data store of this world.
    fn structures(&self) -> &dyn StructureStore;

    /// Biome at a block position.
    fn biome_at(&self, pos: IVec3) -> BiomeId {
        self.generator().biome_source().biome_at(pos)
    }

    /// Block currently at `pos`.
    fn block_at(&self, pos: IVec3) -> Block;

    /// Writes a block. With [`GenerationChecks::Enforced`] the world may refuse
    /// the write (illegal replacement, fluid adjacency); returns whether the
    /// block was written.
    fn set_block(&self, pos: IVec3, block: Block, checks: GenerationChecks) -> bool;

    /// Draws a seed from the world's shared random source.
    fn next_random_seed(&self) -> u64;
}

//! Structure types, configured structures and structure starts.
//!
//! A [`Structure`] decides, for one chunk, which pieces a start consists of
//! ([`Structure::generate_pieces`]) and can be forced into the world at an
//! arbitrary position ([`Structure::place_anywhere`]).

mod jigsaw;
mod pool;
mod settings;
mod start;

pub use jigsaw::{JigsawStructure, MAX_PIECES};
pub use pool::{
    Connector, JigsawConfig, PoolElement, StartPool, StructurePool, StructureProcessor,
    StructureTemplate,
};
pub use settings::{SpacingError, StructureSettings, StructureSpacing};
pub use start::{BlockBox, StructurePiece, StructureStart};

use std::fmt;
use std::sync::Arc;

use glam::IVec3;
use rand_chacha::ChaCha8Rng;

use crate::biome::BiomeId;
use crate::checks::{GenerationChecks, LockHeld};
use crate::key::ContentKey;
use crate::registry::Registries;
use crate::world::{BiomeSource, ChunkGenerator, ChunkPos, StructureStore, WorldAccess};

/// Inputs to piece generation.
///
/// Piece generation reads engine-global state and only runs while the
/// placement lock is held; `held` is the evidence.
pub struct PieceArgs<'a> {
    pub registries: &'a Registries,
    pub generator: &'a dyn ChunkGenerator,
    pub biome_source: &'a dyn BiomeSource,
    pub structures: &'a dyn StructureStore,
    pub seed: u64,
    pub chunk: ChunkPos,
    /// Where the start piece is anchored.
    pub anchor: IVec3,
    pub random: &'a mut ChaCha8Rng,
    /// Biome eligibility predicate.
    pub is_eligible: &'a dyn Fn(BiomeId) -> bool,
    pub held: LockHeld<'a>,
}

/// Inputs to a forced structure placement.
pub struct PlaceArgs<'a> {
    pub world: &'a dyn WorldAccess,
    pub origin: IVec3,
    pub random: &'a mut ChaCha8Rng,
    /// Align the start to the structure's spacing grid instead of `origin`.
    pub force_grid: bool,
    pub checks: GenerationChecks,
    /// Probability that each block of each piece is kept.
    pub integrity: f64,
    pub held: LockHeld<'a>,
}

/// A structure generation algorithm.
pub trait Structure: Send + Sync {
    /// Registry key of this structure type.
    fn key(&self) -> &ContentKey;

    /// Builds the start for `args.chunk`. An empty start means the structure
    /// does not generate there.
    fn generate_pieces(&self, config: &StructureConfig, args: &mut PieceArgs<'_>)
    -> StructureStart;

    /// Generates and places a start around `args.origin` regardless of biome.
    /// A start that wrote at least one block is recorded in the world's
    /// structure-data store.
    ///
    /// Returns whether anything was placed, or `None` when the structure
    /// cannot tell.
    fn place_anywhere(&self, config: &StructureConfig, mut args: PlaceArgs<'_>) -> Option<bool> {
        let world = args.world;
        let generator = world.generator();
        let mut chunk = ChunkPos::containing(args.origin);
        let mut anchor = args.origin;
        if args.force_grid {
            let Some(spacing) = generator.structure_settings().spacing(self.key()) else {
                tracing::debug!(structure = %self.key(), "no spacing grid, cannot align start");
                return Some(false);
            };
            chunk = spacing.start_chunk(world.seed(), chunk);
            anchor = chunk.min_block(args.origin.y);
        }

        let accept_all = |_: BiomeId| true;
        let start = {
            let mut pieces = PieceArgs {
                registries: world.registries(),
                generator,
                biome_source: generator.biome_source(),
                structures: world.structures(),
                seed: world.seed(),
                chunk,
                anchor,
                random: &mut *args.random,
                is_eligible: &accept_all,
                held: args.held,
            };
            self.generate_pieces(config, &mut pieces)
        };
        if !start.has_children() {
            return Some(false);
        }

        let written = start.place(world, args.random, args.checks, args.integrity);
        if written == 0 {
            return Some(false);
        }
        world.structures().record_start(&start);
        Some(true)
    }
}

/// Configuration payload bound to a structure type.
#[derive(Clone, Debug, PartialEq)]
pub enum StructureConfig {
    Empty,
    Jigsaw(JigsawConfig),
}

/// A structure type bound to its configuration.
pub struct ConfiguredStructure {
    pub structure: Arc<dyn Structure>,
    pub config: StructureConfig,
}

impl ConfiguredStructure {
    pub fn new(structure: Arc<dyn Structure>, config: StructureConfig) -> Self {
        Self { structure, config }
    }

    /// Returns `true` if the underlying type is `ty`.
    pub fn is_instance_of(&self, ty: &dyn Structure) -> bool {
        self.structure.key() == ty.key()
    }

    pub fn generate_pieces(&self, args: &mut PieceArgs<'_>) -> StructureStart {
        self.structure.generate_pieces(&self.config, args)
    }

    pub fn place_anywhere(&self, args: PlaceArgs<'_>) -> Option<bool> {
        self.structure.place_anywhere(&self.config, args)
    }
}

impl fmt::Debug for ConfiguredStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredStructure")
            .field("structure", self.structure.key())
            .field("config", &self.config)
            .finish()
    }
}

//! Structure-start feasibility probe.
//!
//! Replays the start decision the generator would make for the chunk at the
//! placement position, without writing anything to the world.

use std::sync::Arc;

use crate::biome::BiomeId;
use crate::checks::PlacementLock;
use crate::context::PlacementContext;
use crate::defaults::{DefaultConfigResolver, SearchDepth};
use crate::seed::structure_rng;
use crate::structure::{PieceArgs, Structure, StructureStart};

/// Evaluates whether a structure would start in a chunk.
pub struct StructureProbe {
    lock: Arc<PlacementLock>,
    defaults: DefaultConfigResolver,
}

impl StructureProbe {
    pub fn new(lock: Arc<PlacementLock>) -> Self {
        Self {
            lock,
            defaults: DefaultConfigResolver::new(SearchDepth::BiomeOnly),
        }
    }

    pub fn with_lock(mut self, lock: Arc<PlacementLock>) -> Self {
        self.lock = lock;
        self
    }

    /// Generates the start `structure` would have in the chunk containing
    /// `ctx.origin`.
    ///
    /// Returns `None` when the chunk is not the structure's grid candidate,
    /// the local biome declares no configuration for it, or piece generation
    /// produced nothing. A returned start always has at least one piece.
    pub fn try_start(
        &self,
        structure: &dyn Structure,
        ctx: &PlacementContext<'_>,
    ) -> Option<StructureStart> {
        let world = ctx.world;
        let generator = ctx.generator();
        let settings = generator.structure_settings();
        let chunk = ctx.chunk();
        let seed = world.seed();

        let infeasible = |reason: &str| {
            tracing::debug!(
                failure = "infeasible_start",
                structure = %structure.key(),
                chunk = ?chunk,
                reason,
                "structure does not start here"
            );
        };

        let Some(spacing) = settings.spacing(structure.key()) else {
            infeasible("no spacing grid");
            return None;
        };
        if !spacing.is_candidate(seed, chunk) {
            infeasible("not the grid candidate chunk");
            return None;
        }
        let Some(configured) = self.defaults.find_structure(structure, ctx) else {
            infeasible("no configuration in local biome");
            return None;
        };

        let is_eligible = |biome: BiomeId| settings.allows_configured(biome, &configured);
        let mut random = structure_rng(seed, chunk, spacing.salt());

        let start = {
            let token = self.lock.acquire();
            let mut args = PieceArgs {
                registries: world.registries(),
                generator,
                biome_source: generator.biome_source(),
                structures: world.structures(),
                seed,
                chunk,
                anchor: chunk.min_block(ctx.origin.y),
                random: &mut random,
                is_eligible: &is_eligible,
                held: token.held(),
            };
            configured.generate_pieces(&mut args)
        };

        if !start.has_children() {
            infeasible("no pieces generated");
            return None;
        }
        Some(start)
    }
}

impl Default for StructureProbe {
    fn default() -> Self {
        Self::new(PlacementLock::global())
    }
}

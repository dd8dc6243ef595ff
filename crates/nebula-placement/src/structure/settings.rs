//! Per-structure spacing and the biome index of configured structures.

use std::sync::Arc;

use hashbrown::HashMap;
use rand::Rng;
use thiserror::Error;

use super::{ConfiguredStructure, Structure};
use crate::biome::BiomeId;
use crate::key::ContentKey;
use crate::seed::region_rng;
use crate::world::ChunkPos;

/// Errors raised when building a [`StructureSpacing`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpacingError {
    #[error("structure spacing must be positive, got {0}")]
    NonPositiveSpacing(i32),
    #[error("structure separation {separation} must be in [0, {spacing})")]
    SeparationOutOfRange { spacing: i32, separation: i32 },
}

/// Spacing grid of one structure type.
///
/// The world is divided into square regions of `spacing` chunks. Each region
/// holds exactly one candidate chunk, offset from the region corner by a
/// seeded amount in `[0, spacing - separation)` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureSpacing {
    spacing: i32,
    separation: i32,
    salt: u32,
}

impl StructureSpacing {
    /// # Errors
    ///
    /// Returns a [`SpacingError`] unless `spacing > 0` and
    /// `0 <= separation < spacing`.
    pub fn new(spacing: i32, separation: i32, salt: u32) -> Result<Self, SpacingError> {
        if spacing <= 0 {
            return Err(SpacingError::NonPositiveSpacing(spacing));
        }
        if separation < 0 || separation >= spacing {
            return Err(SpacingError::SeparationOutOfRange {
                spacing,
                separation,
            });
        }
        Ok(Self {
            spacing,
            separation,
            salt,
        })
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn separation(&self) -> i32 {
        self.separation
    }

    pub fn salt(&self) -> u32 {
        self.salt
    }

    /// The candidate chunk of the region containing `chunk`.
    pub fn start_chunk(&self, world_seed: u64, chunk: ChunkPos) -> ChunkPos {
        let region_x = chunk.x.div_euclid(self.spacing);
        let region_z = chunk.z.div_euclid(self.spacing);
        let mut rng = region_rng(world_seed, region_x, region_z, self.salt);
        let spread = self.spacing - self.separation;
        let offset_x = rng.random_range(0..spread);
        let offset_z = rng.random_range(0..spread);
        ChunkPos::new(
            region_x * self.spacing + offset_x,
            region_z * self.spacing + offset_z,
        )
    }

    /// Returns `true` if `chunk` is the candidate chunk of its region.
    pub fn is_candidate(&self, world_seed: u64, chunk: ChunkPos) -> bool {
        self.start_chunk(world_seed, chunk) == chunk
    }
}

/// Structure configuration of a chunk generator.
#[derive(Default)]
pub struct StructureSettings {
    /// Spacing grid by structure type key.
    spacing: HashMap<ContentKey, StructureSpacing>,
    /// Configured structures eligible in each biome, in insertion order.
    by_biome: HashMap<BiomeId, Vec<Arc<ConfiguredStructure>>>,
}

impl StructureSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the spacing grid of a structure type.
    pub fn set_spacing(&mut self, structure: ContentKey, spacing: StructureSpacing) {
        self.spacing.insert(structure, spacing);
    }

    /// Spacing grid of a structure type, if it generates naturally.
    pub fn spacing(&self, structure: &ContentKey) -> Option<StructureSpacing> {
        self.spacing.get(structure).copied()
    }

    /// Makes `configured` eligible in `biome`.
    pub fn add_placement(&mut self, biome: BiomeId, configured: Arc<ConfiguredStructure>) {
        self.by_biome.entry(biome).or_default().push(configured);
    }

    /// Configured structures eligible in `biome`.
    pub fn in_biome(&self, biome: BiomeId) -> &[Arc<ConfiguredStructure>] {
        self.by_biome.get(&biome).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` if some configured structure of type `structure` is
    /// eligible in `biome`.
    pub fn allows(&self, biome: BiomeId, structure: &dyn Structure) -> bool {
        self.in_biome(biome)
            .iter()
            .any(|c| c.is_instance_of(structure))
    }

    /// Returns `true` if this exact configured structure is eligible in
    /// `biome`. Other configurations of the same type do not count.
    pub fn allows_configured(
        &self,
        biome: BiomeId,
        configured: &Arc<ConfiguredStructure>,
    ) -> bool {
        self.in_biome(biome).iter().any(|c| Arc::ptr_eq(c, configured))
    }
}

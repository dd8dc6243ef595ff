//! Biomes and their generation profiles.
//!
//! A biome's [`BiomeGenerationProfile`] lists, step by step, the configured
//! features it decorates with. The placement engine only reads it, to find a
//! biome-appropriate configuration for a bare feature type.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::feature::ConfiguredFeature;
use crate::key::ContentKey;
use crate::registry::RegistryError;

/// Unique identifier for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BiomeId(pub u16);

/// Decoration pass a [`GenerationStep`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecorationStage {
    RawGeneration,
    Lakes,
    LocalModifications,
    UndergroundStructures,
    SurfaceStructures,
    Strongholds,
    UndergroundOres,
    UndergroundDecoration,
    FluidSprings,
    VegetalDecoration,
    TopLayerModification,
}

/// One step of a biome's decoration: an ordered list of configured features.
#[derive(Clone, Debug)]
pub struct GenerationStep {
    /// Which decoration pass this step runs in.
    pub stage: DecorationStage,
    /// Features decorated in this step, in declared order.
    pub features: Vec<Arc<ConfiguredFeature>>,
}

/// Ordered sequence of generation steps for one biome.
#[derive(Clone, Debug, Default)]
pub struct BiomeGenerationProfile {
    steps: Vec<GenerationStep>,
}

impl BiomeGenerationProfile {
    /// Creates a profile with no steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step after the existing ones.
    pub fn with_step(
        mut self,
        stage: DecorationStage,
        features: Vec<Arc<ConfiguredFeature>>,
    ) -> Self {
        self.steps.push(GenerationStep { stage, features });
        self
    }

    /// Steps in declared order.
    pub fn steps(&self) -> &[GenerationStep] {
        &self.steps
    }
}

/// Full descriptor for a biome.
#[derive(Clone, Debug)]
pub struct BiomeDef {
    /// Registry key (e.g., `nebula:plains`).
    pub key: ContentKey,
    /// Decoration profile.
    pub profile: BiomeGenerationProfile,
}

/// Stores all registered biome definitions with O(1) lookup by ID.
#[derive(Default)]
pub struct BiomeRegistry {
    biomes: Vec<BiomeDef>,
    key_to_id: HashMap<ContentKey, BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new biome definition, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if a biome with the same key exists.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, RegistryError> {
        if self.key_to_id.contains_key(&def.key) {
            return Err(RegistryError::DuplicateKey(def.key));
        }
        let id = BiomeId(self.biomes.len() as u16);
        self.key_to_id.insert(def.key.clone(), id);
        self.biomes.push(def);
        Ok(id)
    }

    /// Returns the definition for the given biome ID, if registered.
    pub fn get(&self, id: BiomeId) -> Option<&BiomeDef> {
        self.biomes.get(id.0 as usize)
    }

    /// Looks up a biome ID by key.
    pub fn lookup(&self, key: &ContentKey) -> Option<BiomeId> {
        self.key_to_id.get(key).copied()
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

//! Forced content placement: resolve a content name through the override
//! catalog and the worldgen registries, then generate it at a position with
//! biome, spacing and block-validity gating bypassed.

pub mod biome;
pub mod block;
pub mod checks;
pub mod content;
pub mod context;
pub mod defaults;
pub mod engine;
pub mod executor;
pub mod feature;
pub mod key;
pub mod overrides;
pub mod primitive;
pub mod probe;
pub mod registry;
pub mod resolve;
pub mod seed;
pub mod structure;
pub mod world;

pub use biome::{BiomeDef, BiomeGenerationProfile, BiomeId, BiomeRegistry, DecorationStage};
pub use block::Block;
pub use checks::{GenerationChecks, PlacementLock, generation_checks_suppressed};
pub use content::BuiltinContent;
pub use context::PlacementContext;
pub use defaults::{BiomeLocal, DefaultConfigResolver, DefaultSource, GlobalScan, SearchDepth};
pub use engine::PlacementEngine;
pub use executor::{LockedExecutor, PlacementExecutor};
pub use feature::{ConfiguredFeature, Feature, FeatureConfig, FeatureContext};
pub use key::{ContentKey, DEFAULT_NAMESPACE, KeyError};
pub use overrides::{OverrideCatalog, OverrideDefinition, OverrideEntry};
pub use primitive::GenerationPrimitive;
pub use probe::StructureProbe;
pub use registry::{Registries, Registry, RegistryError};
pub use resolve::{ContentResolver, Resolution, Tier};
pub use structure::{ConfiguredStructure, Structure, StructureConfig, StructureStart};
pub use world::{ChunkGenerator, ChunkPos, MemoryWorld, StructureStore, WorldAccess};

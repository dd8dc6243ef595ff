//! Default-configuration recovery for bare content types.
//!
//! A bare feature or structure type cannot be placed on its own; it needs a
//! configuration. The [`DefaultConfigResolver`] asks a list of
//! [`DefaultSource`]s in order and takes the first configuration found.

use std::sync::Arc;

use crate::context::PlacementContext;
use crate::feature::{ConfiguredFeature, Feature};
use crate::primitive::GenerationPrimitive;
use crate::structure::{ConfiguredStructure, Structure};

/// How far default-configuration recovery may search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDepth {
    /// Only what the local biome declares.
    BiomeOnly,
    /// The local biome, then the global configured registries.
    Exhaustive,
}

/// One strategy for finding a default configuration.
pub trait DefaultSource: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    fn structure(
        &self,
        ty: &dyn Structure,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredStructure>>;

    fn feature(
        &self,
        ty: &dyn Feature,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredFeature>>;
}

/// Searches what the biome at the placement position declares.
///
/// Structures come from the generator's biome index of configured
/// structures; features from the biome's generation profile, step by step
/// and entry by entry.
#[derive(Debug, Default)]
pub struct BiomeLocal;

impl DefaultSource for BiomeLocal {
    fn name(&self) -> &'static str {
        "biome"
    }

    fn structure(
        &self,
        ty: &dyn Structure,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredStructure>> {
        ctx.generator()
            .structure_settings()
            .in_biome(ctx.biome)
            .iter()
            .find(|c| c.is_instance_of(ty))
            .cloned()
    }

    fn feature(
        &self,
        ty: &dyn Feature,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredFeature>> {
        let biome = ctx.world.registries().biomes.get(ctx.biome)?;
        biome
            .profile
            .steps()
            .iter()
            .flat_map(|step| step.features.iter())
            .find(|c| c.is_instance_of(ty))
            .cloned()
    }
}

/// Scans the global configured registries in registration order.
#[derive(Debug, Default)]
pub struct GlobalScan;

impl DefaultSource for GlobalScan {
    fn name(&self) -> &'static str {
        "global"
    }

    fn structure(
        &self,
        ty: &dyn Structure,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredStructure>> {
        ctx.world
            .registries()
            .configured_structures
            .iter()
            .map(|(_, c)| c)
            .find(|c| c.is_instance_of(ty))
            .cloned()
    }

    fn feature(
        &self,
        ty: &dyn Feature,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredFeature>> {
        ctx.world
            .registries()
            .configured_features
            .iter()
            .map(|(_, c)| c)
            .find(|c| c.is_instance_of(ty))
            .cloned()
    }
}

/// Ordered list of default sources, first success wins.
pub struct DefaultConfigResolver {
    sources: Vec<Box<dyn DefaultSource>>,
}

impl DefaultConfigResolver {
    pub fn new(depth: SearchDepth) -> Self {
        let mut sources: Vec<Box<dyn DefaultSource>> = vec![Box::new(BiomeLocal)];
        if depth == SearchDepth::Exhaustive {
            sources.push(Box::new(GlobalScan));
        }
        Self { sources }
    }

    pub fn with_sources(sources: Vec<Box<dyn DefaultSource>>) -> Self {
        Self { sources }
    }

    pub fn find_structure(
        &self,
        ty: &dyn Structure,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredStructure>> {
        self.sources.iter().find_map(|source| {
            let found = source.structure(ty, ctx);
            if found.is_some() {
                tracing::debug!(
                    structure = %ty.key(),
                    source = source.name(),
                    "default configuration found"
                );
            }
            found
        })
    }

    pub fn find_feature(
        &self,
        ty: &dyn Feature,
        ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredFeature>> {
        self.sources.iter().find_map(|source| {
            let found = source.feature(ty, ctx);
            if found.is_some() {
                tracing::debug!(
                    feature = %ty.key(),
                    source = source.name(),
                    "default configuration found"
                );
            }
            found
        })
    }

    /// Binds a bare type to its default configuration. Primitives that are
    /// already configured are returned unchanged.
    pub fn find_default_config(
        &self,
        primitive: &GenerationPrimitive,
        ctx: &PlacementContext<'_>,
    ) -> Option<GenerationPrimitive> {
        match primitive {
            GenerationPrimitive::Structure(ty) => self
                .find_structure(ty.as_ref(), ctx)
                .map(GenerationPrimitive::ConfiguredStructure),
            GenerationPrimitive::Feature(ty) => self
                .find_feature(ty.as_ref(), ctx)
                .map(GenerationPrimitive::ConfiguredFeature),
            other => Some(other.clone()),
        }
    }
}

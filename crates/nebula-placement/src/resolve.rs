//! Tiered name resolution.
//!
//! A content key is looked up in five tables in a fixed order and the first
//! hit wins. Hits on bare types are bound to a default configuration; if none
//! is found the search continues with the next tier.

use std::sync::Arc;

use crate::context::PlacementContext;
use crate::defaults::{DefaultConfigResolver, SearchDepth};
use crate::key::ContentKey;
use crate::overrides::OverrideCatalog;
use crate::primitive::GenerationPrimitive;
use crate::registry::Registries;

/// One lookup table of the resolution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Overrides,
    ConfiguredStructures,
    ConfiguredFeatures,
    StructureTypes,
    FeatureTypes,
}

impl Tier {
    /// Resolution order, highest priority first.
    pub const ORDER: [Tier; 5] = [
        Tier::Overrides,
        Tier::ConfiguredStructures,
        Tier::ConfiguredFeatures,
        Tier::StructureTypes,
        Tier::FeatureTypes,
    ];

    /// Exact-key lookup in this tier's table.
    pub fn lookup(
        self,
        key: &ContentKey,
        catalog: &OverrideCatalog,
        registries: &Registries,
    ) -> Option<GenerationPrimitive> {
        match self {
            Tier::Overrides => catalog
                .get(key)
                .cloned()
                .map(GenerationPrimitive::CustomOverride),
            Tier::ConfiguredStructures => registries
                .configured_structures
                .get(key)
                .cloned()
                .map(GenerationPrimitive::ConfiguredStructure),
            Tier::ConfiguredFeatures => registries
                .configured_features
                .get(key)
                .cloned()
                .map(GenerationPrimitive::ConfiguredFeature),
            Tier::StructureTypes => registries
                .structure_types
                .get(key)
                .cloned()
                .map(GenerationPrimitive::Structure),
            Tier::FeatureTypes => registries
                .feature_types
                .get(key)
                .cloned()
                .map(GenerationPrimitive::Feature),
        }
    }

    /// Returns `true` for tiers holding bare types.
    pub fn needs_default_config(self) -> bool {
        matches!(self, Tier::StructureTypes | Tier::FeatureTypes)
    }
}

/// A successful resolution.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Tier that produced the hit.
    pub tier: Tier,
    /// Placeable primitive (bare types already bound to a configuration).
    pub primitive: GenerationPrimitive,
}

/// Resolves content keys against the override catalog and a world's registries.
pub struct ContentResolver {
    catalog: Arc<OverrideCatalog>,
    defaults: DefaultConfigResolver,
}

impl ContentResolver {
    pub fn new(catalog: Arc<OverrideCatalog>, defaults: DefaultConfigResolver) -> Self {
        Self { catalog, defaults }
    }

    pub fn with_catalog(mut self, catalog: Arc<OverrideCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultConfigResolver) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn catalog(&self) -> &OverrideCatalog {
        &self.catalog
    }

    /// Resolves `key` through every tier.
    pub fn resolve(&self, key: &ContentKey, ctx: &PlacementContext<'_>) -> Option<Resolution> {
        self.resolve_in(&Tier::ORDER, key, ctx)
    }

    /// Resolves `key` through `tiers`, in the given order.
    pub fn resolve_in(
        &self,
        tiers: &[Tier],
        key: &ContentKey,
        ctx: &PlacementContext<'_>,
    ) -> Option<Resolution> {
        let registries = ctx.world.registries();
        for &tier in tiers {
            let Some(hit) = tier.lookup(key, &self.catalog, registries) else {
                continue;
            };
            if !tier.needs_default_config() {
                tracing::debug!(%key, ?tier, kind = hit.kind(), "resolved");
                return Some(Resolution {
                    tier,
                    primitive: hit,
                });
            }
            match self.defaults.find_default_config(&hit, ctx) {
                Some(primitive) => {
                    tracing::debug!(
                        %key,
                        ?tier,
                        kind = primitive.kind(),
                        "resolved with default configuration"
                    );
                    return Some(Resolution { tier, primitive });
                }
                None => {
                    tracing::debug!(
                        failure = "no_default_config",
                        %key,
                        ?tier,
                        biome = ctx.biome.0,
                        "no default configuration, trying next tier"
                    );
                }
            }
        }
        None
    }
}

impl Default for ContentResolver {
    fn default() -> Self {
        Self::new(
            OverrideCatalog::global(),
            DefaultConfigResolver::new(SearchDepth::Exhaustive),
        )
    }
}

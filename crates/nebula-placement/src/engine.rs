//! Public placement surface: resolve a name and force it into a world.

use std::sync::Arc;

use glam::IVec3;

use crate::checks::PlacementLock;
use crate::context::PlacementContext;
use crate::defaults::{DefaultConfigResolver, DefaultSource, SearchDepth};
use crate::executor::PlacementExecutor;
use crate::key::{ContentKey, DEFAULT_NAMESPACE};
use crate::overrides::OverrideCatalog;
use crate::primitive::GenerationPrimitive;
use crate::probe::StructureProbe;
use crate::resolve::{ContentResolver, Resolution, Tier};
use crate::structure::{ConfiguredStructure, Structure, StructureStart};
use crate::world::WorldAccess;

/// Tiers that can yield a configured structure.
const STRUCTURE_TIERS: [Tier; 2] = [Tier::ConfiguredStructures, Tier::StructureTypes];

/// Resolves content names and places them, bypassing worldgen gating.
///
/// Every call builds a fresh [`PlacementContext`]; the engine itself only
/// holds shared, read-only state and may be used from many threads.
pub struct PlacementEngine {
    resolver: ContentResolver,
    executor: PlacementExecutor,
    probe: StructureProbe,
    default_namespace: String,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self {
            resolver: ContentResolver::default(),
            executor: PlacementExecutor::default(),
            probe: StructureProbe::default(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Engine configured from the `placement` and `rules` config sections.
    pub fn from_config(config: &nebula_config::Config) -> Self {
        let depth = if config.placement.global_fallback {
            SearchDepth::Exhaustive
        } else {
            SearchDepth::BiomeOnly
        };
        let mut engine = Self::new().with_default_sources(DefaultConfigResolver::new(depth));
        engine.default_namespace = config.placement.default_namespace.clone();
        engine.executor = engine.executor.with_integrity(config.rules.plop_integrity);
        engine
    }

    pub fn with_catalog(mut self, catalog: Arc<OverrideCatalog>) -> Self {
        self.resolver = self.resolver.with_catalog(catalog);
        self
    }

    /// Uses `lock` for forced placement and start probing.
    pub fn with_lock(mut self, lock: Arc<PlacementLock>) -> Self {
        let integrity = self.executor.integrity();
        self.executor = PlacementExecutor::new(Arc::clone(&lock)).with_integrity(integrity);
        self.probe = self.probe.with_lock(lock);
        self
    }

    /// Replaces the default-configuration strategies used by resolution.
    pub fn with_default_sources(mut self, defaults: DefaultConfigResolver) -> Self {
        self.resolver = self.resolver.with_defaults(defaults);
        self
    }

    /// Shorthand for [`Self::with_default_sources`] from a source list.
    pub fn with_sources(self, sources: Vec<Box<dyn DefaultSource>>) -> Self {
        self.with_default_sources(DefaultConfigResolver::with_sources(sources))
    }

    pub fn with_integrity(mut self, integrity: f64) -> Self {
        self.executor = self.executor.with_integrity(integrity);
        self
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn catalog(&self) -> &OverrideCatalog {
        self.resolver.catalog()
    }

    /// Resolves `name` at `position` without placing anything.
    pub fn resolve(
        &self,
        name: &str,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<Resolution> {
        let key = self.parse(name)?;
        let ctx = PlacementContext::new(world, position);
        self.resolve_key(&key, &ctx, &Tier::ORDER)
    }

    /// Resolves `name` through every tier and forces it in at `position`.
    ///
    /// `None` means the name resolved to nothing; `Some` carries whether the
    /// generation call succeeded.
    pub fn resolve_and_place(
        &self,
        name: &str,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<bool> {
        let key = self.parse(name)?;
        let mut ctx = PlacementContext::new(world, position);
        let resolution = self.resolve_key(&key, &ctx, &Tier::ORDER)?;
        Some(self.executor.place(&resolution.primitive, &mut ctx, false))
    }

    /// Places an Override Catalog entry, ignoring every registry.
    pub fn spawn(&self, name: &str, world: &dyn WorldAccess, position: IVec3) -> Option<bool> {
        let key = self.parse(name)?;
        let mut ctx = PlacementContext::new(world, position);
        let resolution = self.resolve_key(&key, &ctx, &[Tier::Overrides])?;
        Some(self.executor.place(&resolution.primitive, &mut ctx, false))
    }

    /// Looks `name` up as a configured structure or a structure type bound to
    /// its default configuration. Nothing is placed.
    pub fn resolve_configured_structure(
        &self,
        name: &str,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<Arc<ConfiguredStructure>> {
        let key = self.parse(name)?;
        let ctx = PlacementContext::new(world, position);
        match self.resolve_key(&key, &ctx, &STRUCTURE_TIERS)?.primitive {
            GenerationPrimitive::ConfiguredStructure(configured) => Some(configured),
            other => {
                tracing::debug!(%key, kind = other.kind(), "not a configured structure");
                None
            }
        }
    }

    /// Forces `structure` in on its spacing grid, in the candidate chunk of
    /// the region containing `position`.
    ///
    /// `None` when the structure has no spacing grid in this world.
    pub fn place_on_grid(
        &self,
        structure: &ConfiguredStructure,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<bool> {
        let key = structure.structure.key();
        if world.generator().structure_settings().spacing(key).is_none() {
            tracing::debug!(
                failure = "infeasible_start",
                structure = %key,
                "no spacing grid to align to"
            );
            return None;
        }
        let mut ctx = PlacementContext::new(world, position);
        Some(self.executor.lock().place_structure(structure, &mut ctx, true))
    }

    /// Would `structure` start in the chunk containing `position`?
    pub fn try_start(
        &self,
        structure: &dyn Structure,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<StructureStart> {
        let ctx = PlacementContext::new(world, position);
        self.probe.try_start(structure, &ctx)
    }

    /// [`Self::try_start`] by name. Configured-structure names probe their
    /// underlying type.
    pub fn probe_start(
        &self,
        name: &str,
        world: &dyn WorldAccess,
        position: IVec3,
    ) -> Option<StructureStart> {
        let key = self.parse(name)?;
        let registries = world.registries();
        let structure = registries
            .configured_structures
            .get(&key)
            .map(|configured| Arc::clone(&configured.structure))
            .or_else(|| registries.structure_types.get(&key).cloned());
        let Some(structure) = structure else {
            tracing::debug!(failure = "not_found", %key, "no structure of that name");
            return None;
        };
        self.try_start(structure.as_ref(), world, position)
    }

    fn parse(&self, name: &str) -> Option<ContentKey> {
        match ContentKey::parse_in(name, &self.default_namespace) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(failure = "not_found", name, %e, "malformed content name");
                None
            }
        }
    }

    fn resolve_key(
        &self,
        key: &ContentKey,
        ctx: &PlacementContext<'_>,
        tiers: &[Tier],
    ) -> Option<Resolution> {
        let resolution = self.resolver.resolve_in(tiers, key, ctx);
        if resolution.is_none() {
            tracing::debug!(failure = "not_found", %key, "name resolved to nothing");
        }
        resolution
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ChunkPos, MemoryWorld};

    fn engine() -> PlacementEngine {
        PlacementEngine::new().with_lock(Arc::new(PlacementLock::new()))
    }

    #[test]
    fn test_malformed_name_is_not_found() {
        let world = MemoryWorld::builtin(0);
        assert_eq!(engine().resolve_and_place("bad name!", &world, IVec3::new(0, 64, 0)), None);
        assert_eq!(engine().resolve_and_place("a:b:c", &world, IVec3::new(0, 64, 0)), None);
    }

    #[test]
    fn test_configured_feature_is_placed() {
        let world = MemoryWorld::builtin(0);
        let placed = engine().resolve_and_place("oak", &world, IVec3::new(0, 64, 0));
        assert_eq!(placed, Some(true));
        assert!(world.changed_blocks() > 0);
    }

    #[test]
    fn test_spawn_ignores_registries() {
        let world = MemoryWorld::builtin(0);
        let engine = engine();
        assert_eq!(engine.spawn("oak", &world, IVec3::new(0, 64, 0)), None);
        assert_eq!(engine.spawn("oak_bees", &world, IVec3::new(0, 64, 0)), Some(true));
    }

    #[test]
    fn test_resolve_configured_structure_skips_features() {
        let world = MemoryWorld::builtin(0);
        let engine = engine();
        let origin = IVec3::new(0, 64, 0);
        assert!(engine.resolve_configured_structure("bastion_remnant", &world, origin).is_some());
        assert!(engine.resolve_configured_structure("oak", &world, origin).is_none());
        // Override entries are not consulted either.
        assert!(engine
            .resolve_configured_structure("bastion_remnant_units", &world, origin)
            .is_none());
    }

    #[test]
    fn test_namespace_from_config() {
        let mut config = nebula_config::Config::default();
        config.placement.default_namespace = "other".to_string();
        let engine = PlacementEngine::from_config(&config)
            .with_lock(Arc::new(PlacementLock::new()));
        let world = MemoryWorld::builtin(0);
        assert_eq!(engine.default_namespace(), "other");
        assert_eq!(engine.resolve_and_place("oak", &world, IVec3::new(0, 64, 0)), None);
        assert_eq!(
            engine.resolve_and_place("nebula:oak", &world, IVec3::new(0, 64, 0)),
            Some(true)
        );
    }

    #[test]
    fn test_probe_start_by_name() {
        let world = MemoryWorld::builtin(5);
        let engine = engine();
        let key = ContentKey::builtin("bastion_remnant");
        let chunk = world
            .generator()
            .structure_settings()
            .spacing(&key)
            .unwrap()
            .start_chunk(world.seed(), ChunkPos::new(0, 0));
        world.set_biome(chunk, world.biome("nether_wastes").unwrap());

        let start = engine.probe_start("bastion_remnant", &world, chunk.center_block(64));
        assert!(start.is_some_and(|s| s.has_children()));
        assert!(engine.probe_start("oak", &world, chunk.center_block(64)).is_none());
    }
}

//! The override catalog: hand-authored content that takes precedence over
//! every registry.
//!
//! Each entry pairs a content definition with the routine that places it.
//! The catalog is built once per process and shared read-only.

use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::block;
use crate::content::{BASTION_REMNANT, EMPTY_POOL, bastion_degradation, bastion_template};
use crate::context::PlacementContext;
use crate::executor::LockedExecutor;
use crate::feature::{
    ConfiguredFeature, CoralFeature, CoralShape, FeatureConfig, RandomSelectorFeature, TreeConfig,
    TreeDecorator, TreeFeature,
};
use crate::key::ContentKey;
use crate::registry::{Registry, RegistryError};
use crate::structure::{
    ConfiguredStructure, JigsawConfig, JigsawStructure, PoolElement, StartPool, StructureConfig,
    StructurePool,
};

/// Placement routine of an override entry.
pub type PlopFn =
    Box<dyn Fn(&mut PlacementContext<'_>, &LockedExecutor<'_>) -> bool + Send + Sync>;

/// Content an override entry places.
#[derive(Clone, Debug)]
pub enum OverrideDefinition {
    Feature(Arc<ConfiguredFeature>),
    Structure(Arc<ConfiguredStructure>),
}

/// A named override: a definition plus how to generate it.
pub struct OverrideEntry {
    key: ContentKey,
    definition: OverrideDefinition,
    plop: PlopFn,
}

impl OverrideEntry {
    pub fn new(key: ContentKey, definition: OverrideDefinition, plop: PlopFn) -> Self {
        Self {
            key,
            definition,
            plop,
        }
    }

    /// Entry whose placement generates `definition` with checks suppressed.
    pub fn from_definition(key: ContentKey, definition: OverrideDefinition) -> Self {
        let plop: PlopFn = match &definition {
            OverrideDefinition::Feature(feature) => {
                let feature = Arc::clone(feature);
                Box::new(
                    move |ctx: &mut PlacementContext<'_>, executor: &LockedExecutor<'_>| {
                        executor.generate_feature(&feature, ctx)
                    },
                )
            }
            OverrideDefinition::Structure(structure) => {
                let structure = Arc::clone(structure);
                Box::new(
                    move |ctx: &mut PlacementContext<'_>, executor: &LockedExecutor<'_>| {
                        executor.place_structure(&structure, ctx, false)
                    },
                )
            }
        };
        Self::new(key, definition, plop)
    }

    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    pub fn definition(&self) -> &OverrideDefinition {
        &self.definition
    }

    /// Runs the entry's placement routine.
    pub fn plop(&self, ctx: &mut PlacementContext<'_>, executor: &LockedExecutor<'_>) -> bool {
        (self.plop)(ctx, executor)
    }
}

impl fmt::Debug for OverrideEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideEntry")
            .field("key", &self.key)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// A tree override that always carries a bee nest.
pub fn tree_with_bees(config: TreeConfig) -> OverrideDefinition {
    let config = config.with_decorators(vec![TreeDecorator::Beehive { probability: 1.0 }]);
    OverrideDefinition::Feature(Arc::new(ConfiguredFeature::new(
        Arc::new(TreeFeature::new()),
        FeatureConfig::Tree(config),
    )))
}

/// A single coral growth shape.
pub fn coral(shape: CoralShape) -> OverrideDefinition {
    OverrideDefinition::Feature(Arc::new(coral_feature(shape)))
}

/// Any of the three coral shapes, picked at random.
pub fn coral_any() -> OverrideDefinition {
    let shapes = [CoralShape::Tree, CoralShape::Claw, CoralShape::Mushroom]
        .map(|shape| Arc::new(coral_feature(shape)))
        .to_vec();
    OverrideDefinition::Feature(Arc::new(ConfiguredFeature::new(
        Arc::new(RandomSelectorFeature::new()),
        FeatureConfig::SimpleRandom(shapes),
    )))
}

/// A bastion grown from one variant's base template.
///
/// The start pool is owned by the definition; only the templates and the
/// pools their connectors name come from the world.
pub fn bastion(variant: &str, size: u32) -> OverrideDefinition {
    let start_pool = StructurePool::new(
        ContentKey::builtin(&format!("bastion/{variant}/start")),
        ContentKey::builtin(EMPTY_POOL),
    )
    .with(PoolElement::processed(bastion_template(variant), bastion_degradation(1.0)), 1);
    OverrideDefinition::Structure(Arc::new(ConfiguredStructure::new(
        Arc::new(JigsawStructure::new(ContentKey::builtin(BASTION_REMNANT))),
        StructureConfig::Jigsaw(JigsawConfig {
            start_pool: StartPool::Inline(Arc::new(start_pool)),
            size,
        }),
    )))
}

fn coral_feature(shape: CoralShape) -> ConfiguredFeature {
    ConfiguredFeature::new(Arc::new(CoralFeature::new(shape)), FeatureConfig::Empty)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<Arc<OverrideCatalog>> =
    LazyLock::new(|| Arc::new(OverrideCatalog::builtin()));

/// Table of override entries keyed by content key.
#[derive(Default)]
pub struct OverrideCatalog {
    entries: Registry<OverrideEntry>,
}

impl OverrideCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide builtin catalog.
    pub fn global() -> Arc<Self> {
        Arc::clone(&*GLOBAL)
    }

    /// Builds the builtin entries.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        let oak = TreeConfig::simple(block::OAK_LOG, block::OAK_LEAVES, 4, 2, 0, 2);
        let birch = TreeConfig::simple(block::BIRCH_LOG, block::BIRCH_LEAVES, 5, 2, 0, 2);
        let fancy_oak = TreeConfig::fancy(block::OAK_LOG, block::OAK_LEAVES);

        let entries = [
            ("oak_bees", tree_with_bees(oak)),
            ("fancy_oak_bees", tree_with_bees(fancy_oak)),
            ("birch_bees", tree_with_bees(birch)),
            ("coral_tree", coral(CoralShape::Tree)),
            ("coral_claw", coral(CoralShape::Claw)),
            ("coral_mushroom", coral(CoralShape::Mushroom)),
            ("coral", coral_any()),
            ("bastion_remnant_units", bastion("units", 6)),
            ("bastion_remnant_hoglin_stable", bastion("hoglin_stable", 6)),
            ("bastion_remnant_treasure", bastion("treasure", 6)),
            ("bastion_remnant_bridge", bastion("bridge", 6)),
        ];
        for (path, definition) in entries {
            let entry = OverrideEntry::from_definition(ContentKey::builtin(path), definition);
            if let Err(e) = catalog.insert(entry) {
                tracing::warn!(%e, "builtin override skipped");
            }
        }
        catalog
    }

    /// Adds an entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if the key is taken.
    pub fn insert(&mut self, entry: OverrideEntry) -> Result<(), RegistryError> {
        self.entries
            .register(entry.key.clone(), Arc::new(entry))
            .map(|_| ())
    }

    pub fn get(&self, key: &ContentKey) -> Option<&Arc<OverrideEntry>> {
        self.entries.get(key)
    }

    /// Entry keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ContentKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

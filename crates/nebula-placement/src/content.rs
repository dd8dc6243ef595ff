//! Builtin content pack: feature and structure types, their default
//! configurations, biomes, structure spacing and the bastion template pools.

use std::sync::Arc;

use glam::IVec3;

use crate::biome::{BiomeDef, BiomeGenerationProfile, BiomeId, DecorationStage};
use crate::block;
use crate::feature::{
    ConfiguredFeature, CoralFeature, CoralShape, Feature, FeatureConfig, RandomSelectorFeature,
    TreeConfig, TreeFeature,
};
use crate::key::ContentKey;
use crate::registry::{Registries, Registry};
use crate::structure::{
    ConfiguredStructure, Connector, JigsawConfig, JigsawStructure, PoolElement, StartPool,
    Structure, StructureConfig, StructurePool, StructureProcessor, StructureSettings,
    StructureSpacing, StructureTemplate,
};
use crate::world::MemoryStructures;

/// Registry path of the bastion structure type.
pub const BASTION_REMNANT: &str = "bastion_remnant";

/// Pool holding only an empty element; the usual fallback.
pub const EMPTY_POOL: &str = "empty";

const BASTION_SPACING: i32 = 27;
const BASTION_SEPARATION: i32 = 4;
const BASTION_SALT: u32 = 30084232;
const BASTION_SIZE: u32 = 6;

/// IDs of the builtin biomes.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinBiomes {
    pub plains: BiomeId,
    pub forest: BiomeId,
    pub warm_ocean: BiomeId,
    pub nether_wastes: BiomeId,
}

/// Everything a world needs to resolve and place builtin content.
pub struct BuiltinContent {
    pub registries: Registries,
    pub settings: StructureSettings,
    pub structures: MemoryStructures,
    pub biomes: BuiltinBiomes,
}

impl BuiltinContent {
    /// Builds the pack. Registration failures are logged and skipped.
    pub fn new() -> Self {
        let mut registries = Registries::new();

        // Feature types.
        let tree = register(
            &mut registries.feature_types,
            TreeFeature::PATH,
            Arc::new(TreeFeature::new()) as Arc<dyn Feature>,
        );
        let coral_types = [CoralShape::Tree, CoralShape::Claw, CoralShape::Mushroom].map(|shape| {
            let feature = CoralFeature::new(shape);
            let path = feature.key().path().to_string();
            register(&mut registries.feature_types, &path, Arc::new(feature) as Arc<dyn Feature>)
        });
        let selector = register(
            &mut registries.feature_types,
            RandomSelectorFeature::PATH,
            Arc::new(RandomSelectorFeature::new()) as Arc<dyn Feature>,
        );

        // Configured features.
        let oak = register(
            &mut registries.configured_features,
            "oak",
            configured_tree(
                &tree,
                TreeConfig::simple(block::OAK_LOG, block::OAK_LEAVES, 4, 2, 0, 2),
            ),
        );
        let birch = register(
            &mut registries.configured_features,
            "birch",
            configured_tree(
                &tree,
                TreeConfig::simple(block::BIRCH_LOG, block::BIRCH_LEAVES, 5, 2, 0, 2),
            ),
        );
        register(
            &mut registries.configured_features,
            "fancy_oak",
            configured_tree(&tree, TreeConfig::fancy(block::OAK_LOG, block::OAK_LEAVES)),
        );
        let corals = coral_types
            .iter()
            .map(|ty| Arc::new(ConfiguredFeature::new(Arc::clone(ty), FeatureConfig::Empty)))
            .collect();
        let coral_reef = register(
            &mut registries.configured_features,
            "coral_reef",
            Arc::new(ConfiguredFeature::new(
                selector,
                FeatureConfig::SimpleRandom(corals),
            )),
        );

        // Structures.
        let bastion = register(
            &mut registries.structure_types,
            BASTION_REMNANT,
            Arc::new(JigsawStructure::new(ContentKey::builtin(BASTION_REMNANT)))
                as Arc<dyn Structure>,
        );
        let bastion_configured = register(
            &mut registries.configured_structures,
            BASTION_REMNANT,
            Arc::new(ConfiguredStructure::new(
                Arc::clone(&bastion),
                StructureConfig::Jigsaw(JigsawConfig {
                    start_pool: StartPool::Registered(ContentKey::builtin("bastion/starts")),
                    size: BASTION_SIZE,
                }),
            )),
        );

        // Biomes.
        let vegetal = DecorationStage::VegetalDecoration;
        let biomes = BuiltinBiomes {
            plains: biome(
                &mut registries,
                "plains",
                BiomeGenerationProfile::new().with_step(vegetal, vec![Arc::clone(&oak)]),
            ),
            forest: biome(
                &mut registries,
                "forest",
                BiomeGenerationProfile::new().with_step(vegetal, vec![birch, oak]),
            ),
            warm_ocean: biome(
                &mut registries,
                "warm_ocean",
                BiomeGenerationProfile::new().with_step(vegetal, vec![coral_reef]),
            ),
            nether_wastes: biome(&mut registries, "nether_wastes", BiomeGenerationProfile::new()),
        };

        let mut settings = StructureSettings::new();
        match StructureSpacing::new(BASTION_SPACING, BASTION_SEPARATION, BASTION_SALT) {
            Ok(spacing) => settings.set_spacing(bastion.key().clone(), spacing),
            Err(e) => tracing::warn!(%e, "builtin bastion spacing rejected"),
        }
        settings.add_placement(biomes.nether_wastes, bastion_configured);

        let structures = MemoryStructures::new();
        add_bastion_pools(&structures);

        Self {
            registries,
            settings,
            structures,
            biomes,
        }
    }
}

impl Default for BuiltinContent {
    fn default() -> Self {
        Self::new()
    }
}

fn register<T: ?Sized>(registry: &mut Registry<T>, path: &str, value: Arc<T>) -> Arc<T> {
    match registry.register(ContentKey::builtin(path), Arc::clone(&value)) {
        Ok(registered) => registered,
        Err(e) => {
            tracing::warn!(%e, "builtin content skipped");
            value
        }
    }
}

fn biome(registries: &mut Registries, path: &str, profile: BiomeGenerationProfile) -> BiomeId {
    let key = ContentKey::builtin(path);
    match registries.biomes.register(BiomeDef {
        key: key.clone(),
        profile,
    }) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(%e, "builtin biome skipped");
            registries.biomes.lookup(&key).unwrap_or(BiomeId(0))
        }
    }
}

fn configured_tree(tree: &Arc<dyn Feature>, config: TreeConfig) -> Arc<ConfiguredFeature> {
    Arc::new(ConfiguredFeature::new(Arc::clone(tree), FeatureConfig::Tree(config)))
}

// ---------------------------------------------------------------------------
// Bastion pools
// ---------------------------------------------------------------------------

/// Processors that crack bricks and knock out a few blocks.
pub fn bastion_degradation(integrity: f32) -> Vec<StructureProcessor> {
    vec![
        StructureProcessor::Replace {
            from: block::POLISHED_BLACKSTONE_BRICKS,
            to: block::CRACKED_POLISHED_BLACKSTONE_BRICKS,
            chance: 0.3,
        },
        StructureProcessor::BlockRot { integrity },
    ]
}

fn key(path: &str) -> ContentKey {
    ContentKey::builtin(path)
}

fn connector(offset: IVec3, facing: IVec3, pool: &str) -> Connector {
    Connector {
        offset,
        facing,
        pool: key(pool),
    }
}

/// The four bastion start variants.
pub const BASTION_VARIANTS: [&str; 4] = ["units", "hoglin_stable", "treasure", "bridge"];

/// Key of the base template of a bastion variant.
pub fn bastion_template(variant: &str) -> ContentKey {
    key(&format!("bastion/{variant}/base"))
}

fn add_bastion_pools(store: &MemoryStructures) {
    store.add_template(
        key("bastion/units/base"),
        StructureTemplate::filled(IVec3::new(7, 4, 7), block::POLISHED_BLACKSTONE_BRICKS)
            .with_block(IVec3::new(3, 1, 3), block::CHEST)
            .with_connector(connector(IVec3::new(6, 0, 3), IVec3::X, "bastion/walls"))
            .with_connector(connector(IVec3::new(0, 0, 3), IVec3::NEG_X, "bastion/walls"))
            .with_connector(connector(IVec3::new(3, 0, 6), IVec3::Z, "bastion/walls")),
    );
    store.add_template(
        key("bastion/hoglin_stable/base"),
        StructureTemplate::filled(IVec3::new(9, 5, 9), block::BLACKSTONE)
            .with_connector(connector(IVec3::new(8, 0, 4), IVec3::X, "bastion/walls"))
            .with_connector(connector(IVec3::new(4, 0, 0), IVec3::NEG_Z, "bastion/walls")),
    );
    store.add_template(
        key("bastion/treasure/base"),
        StructureTemplate::filled(IVec3::splat(7), block::POLISHED_BLACKSTONE_BRICKS)
            .with_block(IVec3::new(3, 3, 3), block::GILDED_BLACKSTONE)
            .with_block(IVec3::new(3, 1, 3), block::CHEST)
            .with_connector(connector(IVec3::new(3, 0, 6), IVec3::Z, "bastion/walls")),
    );
    store.add_template(
        key("bastion/bridge/base"),
        StructureTemplate::filled(IVec3::new(11, 3, 3), block::BLACKSTONE)
            .with_connector(connector(IVec3::new(10, 0, 1), IVec3::X, "bastion/walls"))
            .with_connector(connector(IVec3::new(0, 0, 1), IVec3::NEG_X, "bastion/walls")),
    );
    store.add_template(
        key("bastion/wall"),
        StructureTemplate::filled(IVec3::new(3, 4, 3), block::BASALT)
            .with_connector(connector(IVec3::new(2, 0, 1), IVec3::X, "bastion/walls"))
            .with_connector(connector(IVec3::new(0, 0, 1), IVec3::NEG_X, "bastion/walls"))
            .with_connector(connector(IVec3::new(1, 0, 2), IVec3::Z, "bastion/walls"))
            .with_connector(connector(IVec3::new(1, 0, 0), IVec3::NEG_Z, "bastion/walls")),
    );

    let mut starts = StructurePool::new(key("bastion/starts"), key(EMPTY_POOL));
    for variant in BASTION_VARIANTS {
        let element = PoolElement::processed(bastion_template(variant), bastion_degradation(1.0));
        starts = starts.with(element, 1);
    }
    store.add_pool(starts);
    store.add_pool(
        StructurePool::new(key("bastion/walls"), key(EMPTY_POOL))
            .with(PoolElement::processed(key("bastion/wall"), bastion_degradation(0.9)), 3)
            .with(PoolElement::Empty, 1),
    );
    store.add_pool(
        StructurePool::new(key(EMPTY_POOL), key(EMPTY_POOL)).with(PoolElement::Empty, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::StructureStore;

    #[test]
    fn test_registries_populated() {
        let content = BuiltinContent::new();
        let reg = &content.registries;
        assert_eq!(reg.feature_types.len(), 5);
        assert!(reg.configured_features.contains(&key("oak")));
        assert!(reg.configured_features.contains(&key("coral_reef")));
        assert!(reg.structure_types.contains(&key(BASTION_REMNANT)));
        assert!(reg.configured_structures.contains(&key(BASTION_REMNANT)));
        assert_eq!(reg.biomes.len(), 4);
    }

    #[test]
    fn test_forest_profile_lists_birch_before_oak() {
        let content = BuiltinContent::new();
        let forest = content.registries.biomes.get(content.biomes.forest).unwrap();
        let features = &forest.profile.steps()[0].features;
        let birch = content.registries.configured_features.get(&key("birch")).unwrap();
        assert!(Arc::ptr_eq(&features[0], birch));
    }

    #[test]
    fn test_bastion_only_in_nether() {
        let content = BuiltinContent::new();
        let bastion = content.registries.structure_types.get(&key(BASTION_REMNANT)).unwrap();
        assert!(content.settings.allows(content.biomes.nether_wastes, bastion.as_ref()));
        assert!(!content.settings.allows(content.biomes.plains, bastion.as_ref()));
        let spacing = content.settings.spacing(bastion.key()).unwrap();
        assert_eq!(spacing.salt(), BASTION_SALT);
    }

    #[test]
    fn test_every_pool_reference_resolves() {
        let content = BuiltinContent::new();
        let store = &content.structures;
        for variant in BASTION_VARIANTS {
            let template = bastion_template(variant);
            assert!(store.template(&template).is_some(), "missing template {template}");
        }
        for pool in ["bastion/starts", "bastion/walls", EMPTY_POOL] {
            let pool = store.pool(&key(pool)).unwrap();
            assert!(store.pool(&pool.fallback).is_some());
            for element in pool.elements() {
                if let PoolElement::Single { template, .. } = element {
                    assert!(store.template(template).is_some(), "missing template {template}");
                }
            }
        }
    }
}

//! Feature types and configured features.
//!
//! A [`Feature`] is a generation algorithm ("grow a tree", "grow coral").
//! It only becomes placeable once bound to a [`FeatureConfig`], forming a
//! [`ConfiguredFeature`].

mod coral;
mod selector;
mod tree;

pub use coral::{CoralFeature, CoralShape};
pub use selector::RandomSelectorFeature;
pub use tree::{
    FoliagePlacer, TreeConfig, TreeDecorator, TreeFeature, TrunkPlacer, TwoLayersFeatureSize,
};

use std::fmt;
use std::sync::Arc;

use glam::IVec3;
use rand_chacha::ChaCha8Rng;

use crate::block::Block;
use crate::checks::GenerationChecks;
use crate::key::ContentKey;
use crate::world::WorldAccess;

/// A feature generation algorithm.
pub trait Feature: Send + Sync {
    /// Registry key of this feature type.
    fn key(&self) -> &ContentKey;

    /// Generates the feature at `ctx.origin`.
    ///
    /// Returns `false` when nothing was generated, including when `config`
    /// is not a configuration this feature understands.
    fn generate(&self, config: &FeatureConfig, ctx: &mut FeatureContext<'_>) -> bool;
}

/// Everything one feature generation call may touch.
pub struct FeatureContext<'a> {
    /// World being written to.
    pub world: &'a dyn WorldAccess,
    /// Anchor position of the feature.
    pub origin: IVec3,
    /// Random source for this call.
    pub random: &'a mut ChaCha8Rng,
    /// Whether placement validity checks apply.
    pub checks: GenerationChecks,
}

impl FeatureContext<'_> {
    /// Block currently at `pos`.
    pub fn block_at(&self, pos: IVec3) -> Block {
        self.world.block_at(pos)
    }

    /// Writes a block with this call's check mode.
    pub fn set_block(&self, pos: IVec3, block: Block) -> bool {
        self.world.set_block(pos, block, self.checks)
    }

    /// Returns `true` when validity checks apply to this call.
    pub fn enforcing(&self) -> bool {
        !self.checks.is_suppressed()
    }
}

/// Configuration payload bound to a feature type.
#[derive(Clone, Debug)]
pub enum FeatureConfig {
    /// No parameters.
    Empty,
    /// Tree shape descriptors.
    Tree(TreeConfig),
    /// Candidates for a uniform random pick.
    SimpleRandom(Vec<Arc<ConfiguredFeature>>),
}

/// A feature type bound to its configuration.
pub struct ConfiguredFeature {
    /// Underlying feature type.
    pub feature: Arc<dyn Feature>,
    /// Configuration passed to every generation call.
    pub config: FeatureConfig,
}

impl ConfiguredFeature {
    pub fn new(feature: Arc<dyn Feature>, config: FeatureConfig) -> Self {
        Self { feature, config }
    }

    /// Returns `true` if the underlying type is `ty`.
    pub fn is_instance_of(&self, ty: &dyn Feature) -> bool {
        self.feature.key() == ty.key()
    }

    /// Generates this feature with an existing context.
    pub fn place(&self, ctx: &mut FeatureContext<'_>) -> bool {
        self.feature.generate(&self.config, ctx)
    }

    /// Generates this feature at `origin`.
    pub fn generate(
        &self,
        world: &dyn WorldAccess,
        origin: IVec3,
        random: &mut ChaCha8Rng,
        checks: GenerationChecks,
    ) -> bool {
        let mut ctx = FeatureContext {
            world,
            origin,
            random,
            checks,
        };
        self.place(&mut ctx)
    }
}

impl fmt::Debug for ConfiguredFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredFeature")
            .field("feature", self.feature.key())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MemoryWorld;
    use rand::SeedableRng;

    #[test]
    fn test_instance_check_compares_type_keys() {
        let tree: Arc<dyn Feature> = Arc::new(TreeFeature::new());
        let coral: Arc<dyn Feature> = Arc::new(CoralFeature::new(CoralShape::Claw));
        let configured = ConfiguredFeature::new(Arc::clone(&tree), FeatureConfig::Empty);

        assert!(configured.is_instance_of(tree.as_ref()));
        assert!(configured.is_instance_of(&TreeFeature::new()));
        assert!(!configured.is_instance_of(coral.as_ref()));
    }

    #[test]
    fn test_mismatched_config_generates_nothing() {
        let world = MemoryWorld::builtin(1);
        let tree = ConfiguredFeature::new(Arc::new(TreeFeature::new()), FeatureConfig::Empty);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(!tree.generate(
            &world,
            IVec3::new(0, 64, 0),
            &mut rng,
            GenerationChecks::Suppressed
        ));
        assert_eq!(world.changed_blocks(), 0);
    }
}

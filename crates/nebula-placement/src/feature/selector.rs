use std::sync::LazyLock;

use rand::Rng;

use super::{Feature, FeatureConfig, FeatureContext};
use crate::key::ContentKey;

static KEY: LazyLock<ContentKey> =
    LazyLock::new(|| ContentKey::builtin(RandomSelectorFeature::PATH));

/// Picks one of its configured candidates uniformly and generates it.
#[derive(Debug, Default)]
pub struct RandomSelectorFeature;

impl RandomSelectorFeature {
    pub const PATH: &'static str = "simple_random_selector";

    pub fn new() -> Self {
        Self
    }
}

impl Feature for RandomSelectorFeature {
    fn key(&self) -> &ContentKey {
        &KEY
    }

    fn generate(&self, config: &FeatureConfig, ctx: &mut FeatureContext<'_>) -> bool {
        let FeatureConfig::SimpleRandom(candidates) = config else {
            return false;
        };
        if candidates.is_empty() {
            return false;
        }
        let pick = ctx.random.random_range(0..candidates.len());
        candidates[pick].place(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::GenerationChecks;
    use crate::feature::{ConfiguredFeature, CoralFeature, CoralShape};
    use crate::world::MemoryWorld;
    use glam::IVec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    #[test]
    fn test_empty_selector_generates_nothing() {
        let world = MemoryWorld::builtin(0);
        let selector = ConfiguredFeature::new(
            Arc::new(RandomSelectorFeature::new()),
            FeatureConfig::SimpleRandom(Vec::new()),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(!selector.generate(&world, IVec3::ZERO, &mut rng, GenerationChecks::Suppressed));
    }

    #[test]
    fn test_selector_delegates_to_candidate() {
        let world = MemoryWorld::builtin(0);
        let claw = Arc::new(ConfiguredFeature::new(
            Arc::new(CoralFeature::new(CoralShape::Claw)),
            FeatureConfig::Empty,
        ));
        let selector = ConfiguredFeature::new(
            Arc::new(RandomSelectorFeature::new()),
            FeatureConfig::SimpleRandom(vec![claw]),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(selector.generate(
            &world,
            IVec3::new(0, 70, 0),
            &mut rng,
            GenerationChecks::Suppressed
        ));
        assert!(world.changes().values().any(|b| b.is_coral()));
    }
}

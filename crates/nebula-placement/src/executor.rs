//! Forced placement: generation with validity checks suppressed.
//!
//! Every forced placement runs while the placement lock is held, so the
//! suppression flag raised for one placement can never be observed or reset
//! by another.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::checks::{LockToken, PlacementLock};
use crate::context::PlacementContext;
use crate::feature::ConfiguredFeature;
use crate::key::ContentKey;
use crate::primitive::GenerationPrimitive;
use crate::structure::{ConfiguredStructure, PlaceArgs};

/// Places resolved primitives, bypassing biome, spacing and block-validity
/// gating.
#[derive(Debug)]
pub struct PlacementExecutor {
    lock: Arc<PlacementLock>,
    integrity: f64,
}

impl PlacementExecutor {
    pub fn new(lock: Arc<PlacementLock>) -> Self {
        Self {
            lock,
            integrity: 1.0,
        }
    }

    /// Sets the probability that each block of a structure piece is kept.
    pub fn with_integrity(mut self, integrity: f64) -> Self {
        self.integrity = integrity.clamp(0.0, 1.0);
        self
    }

    pub fn integrity(&self) -> f64 {
        self.integrity
    }

    /// Blocks until the placement lock is free.
    pub fn lock(&self) -> LockedExecutor<'_> {
        LockedExecutor {
            token: self.lock.acquire(),
            integrity: self.integrity,
        }
    }

    /// Places `primitive` at the context's position.
    ///
    /// `force_grid` aligns structures to their spacing grid. Returns whether
    /// the generation call reported success; failures and panics are logged
    /// and reported as `false`.
    pub fn place(
        &self,
        primitive: &GenerationPrimitive,
        ctx: &mut PlacementContext<'_>,
        force_grid: bool,
    ) -> bool {
        self.lock().place(primitive, ctx, force_grid)
    }
}

impl Default for PlacementExecutor {
    fn default() -> Self {
        Self::new(PlacementLock::global())
    }
}

/// A [`PlacementExecutor`] holding the placement lock.
pub struct LockedExecutor<'l> {
    token: LockToken<'l>,
    integrity: f64,
}

impl LockedExecutor<'_> {
    /// Dispatches on the primitive's variant.
    pub fn place(
        &self,
        primitive: &GenerationPrimitive,
        ctx: &mut PlacementContext<'_>,
        force_grid: bool,
    ) -> bool {
        match primitive {
            GenerationPrimitive::CustomOverride(entry) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.plop(ctx, self)));
                report(outcome.map(Some), entry.key(), ctx)
            }
            GenerationPrimitive::ConfiguredStructure(c) => self.place_structure(c, ctx, force_grid),
            GenerationPrimitive::ConfiguredFeature(c) => self.generate_feature(c, ctx),
            GenerationPrimitive::Structure(_) | GenerationPrimitive::Feature(_) => {
                tracing::warn!(
                    failure = "underlying_generation_failure",
                    content = %primitive.type_key(),
                    "bare type has no configuration to generate with"
                );
                false
            }
        }
    }

    /// Generates a configured feature with checks suppressed.
    pub fn generate_feature(
        &self,
        feature: &ConfiguredFeature,
        ctx: &mut PlacementContext<'_>,
    ) -> bool {
        let guard = self.token.suppress_checks();
        let checks = guard.checks();
        let world = ctx.world;
        let origin = ctx.origin;
        let random = &mut ctx.random;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            feature.generate(world, origin, random, checks)
        }));
        drop(guard);
        report(outcome.map(Some), feature.feature.key(), ctx)
    }

    /// Forces a configured structure into the world with checks suppressed.
    ///
    /// An unknown outcome from the structure counts as success.
    pub fn place_structure(
        &self,
        structure: &ConfiguredStructure,
        ctx: &mut PlacementContext<'_>,
        force_grid: bool,
    ) -> bool {
        let guard = self.token.suppress_checks();
        let args = PlaceArgs {
            world: ctx.world,
            origin: ctx.origin,
            random: &mut ctx.random,
            force_grid,
            checks: guard.checks(),
            integrity: self.integrity,
            held: self.token.held(),
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| structure.place_anywhere(args)));
        drop(guard);
        report(outcome, structure.structure.key(), ctx)
    }
}

fn report(
    outcome: Result<Option<bool>, Box<dyn Any + Send>>,
    content: &ContentKey,
    ctx: &PlacementContext<'_>,
) -> bool {
    match outcome {
        Ok(Some(true)) | Ok(None) => {
            tracing::info!(%content, origin = ?ctx.origin, "forced placement");
            true
        }
        Ok(Some(false)) => {
            tracing::warn!(
                failure = "underlying_generation_failure",
                %content,
                origin = ?ctx.origin,
                "generation reported failure"
            );
            false
        }
        Err(payload) => {
            tracing::warn!(
                failure = "underlying_generation_failure",
                %content,
                origin = ?ctx.origin,
                panic = panic_message(payload.as_ref()),
                "generation panicked"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(&s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::GenerationChecks;
    use crate::feature::{Feature, FeatureConfig, FeatureContext};
    use crate::world::MemoryWorld;
    use glam::IVec3;
    use std::sync::Mutex;

    /// Records the check mode and the lock's flag seen during generation.
    struct Probe {
        key: ContentKey,
        lock: Arc<PlacementLock>,
        seen: Mutex<Option<(GenerationChecks, bool)>>,
        panic: bool,
    }

    impl Feature for Probe {
        fn key(&self) -> &ContentKey {
            &self.key
        }

        fn generate(&self, _config: &FeatureConfig, ctx: &mut FeatureContext<'_>) -> bool {
            *self.seen.lock().unwrap() = Some((ctx.checks, self.lock.checks_suppressed()));
            if self.panic {
                panic!("probe feature failure");
            }
            true
        }
    }

    fn probe(lock: &Arc<PlacementLock>, panic: bool) -> Arc<Probe> {
        Arc::new(Probe {
            key: ContentKey::builtin("probe"),
            lock: Arc::clone(lock),
            seen: Mutex::new(None),
            panic,
        })
    }

    #[test]
    fn test_feature_generated_with_checks_suppressed() {
        let lock = Arc::new(PlacementLock::new());
        let feature = probe(&lock, false);
        let configured = Arc::new(ConfiguredFeature::new(feature.clone(), FeatureConfig::Empty));
        let world = MemoryWorld::builtin(0);
        let mut ctx = PlacementContext::new(&world, IVec3::new(0, 64, 0));
        let executor = PlacementExecutor::new(Arc::clone(&lock));

        assert!(!lock.checks_suppressed());
        let primitive = GenerationPrimitive::ConfiguredFeature(configured);
        assert!(executor.place(&primitive, &mut ctx, false));
        assert!(!lock.checks_suppressed());
        assert_eq!(
            *feature.seen.lock().unwrap(),
            Some((GenerationChecks::Suppressed, true))
        );
    }

    #[test]
    fn test_panicking_feature_reports_failure_and_restores_flag() {
        let lock = Arc::new(PlacementLock::new());
        let configured = Arc::new(ConfiguredFeature::new(probe(&lock, true), FeatureConfig::Empty));
        let world = MemoryWorld::builtin(0);
        let mut ctx = PlacementContext::new(&world, IVec3::new(0, 64, 0));
        let executor = PlacementExecutor::new(Arc::clone(&lock));

        let primitive = GenerationPrimitive::ConfiguredFeature(configured);
        assert!(!executor.place(&primitive, &mut ctx, false));
        assert!(!lock.checks_suppressed());
        // The lock is usable again.
        drop(executor.lock());
    }

    #[test]
    fn test_bare_type_is_not_placeable() {
        let lock = Arc::new(PlacementLock::new());
        let world = MemoryWorld::builtin(0);
        let mut ctx = PlacementContext::new(&world, IVec3::new(0, 64, 0));
        let executor = PlacementExecutor::new(Arc::clone(&lock));
        let bare = GenerationPrimitive::Feature(probe(&lock, false));

        assert!(!executor.place(&bare, &mut ctx, false));
        assert_eq!(world.changed_blocks(), 0);
    }

    #[test]
    fn test_integrity_is_clamped() {
        let executor = PlacementExecutor::new(Arc::new(PlacementLock::new())).with_integrity(3.0);
        assert_eq!(executor.integrity(), 1.0);
    }
}

//! Underwater coral growths.

use glam::IVec3;
use rand::Rng;
use rand::seq::SliceRandom;

use super::{Feature, FeatureConfig, FeatureContext};
use crate::block::{self, Block, CORAL_BLOCKS};
use crate::key::ContentKey;

const HORIZONTALS: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];

/// Growth pattern of a [`CoralFeature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoralShape {
    /// A short stem with branches climbing outwards.
    Tree,
    /// A base block with arms that reach out and curl upwards.
    Claw,
    /// A rough cap-shaped box.
    Mushroom,
}

impl CoralShape {
    fn path(self) -> &'static str {
        match self {
            Self::Tree => "coral_tree",
            Self::Claw => "coral_claw",
            Self::Mushroom => "coral_mushroom",
        }
    }
}

/// Coral feature type. Each shape registers as its own type.
#[derive(Debug)]
pub struct CoralFeature {
    key: ContentKey,
    shape: CoralShape,
}

impl CoralFeature {
    pub fn new(shape: CoralShape) -> Self {
        Self {
            key: ContentKey::builtin(shape.path()),
            shape,
        }
    }

    pub fn shape(&self) -> CoralShape {
        self.shape
    }
}

impl Feature for CoralFeature {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn generate(&self, config: &FeatureConfig, ctx: &mut FeatureContext<'_>) -> bool {
        if !matches!(config, FeatureConfig::Empty) {
            return false;
        }
        let coral = CORAL_BLOCKS[ctx.random.random_range(0..CORAL_BLOCKS.len())];
        match self.shape {
            CoralShape::Tree => grow_tree(ctx, coral),
            CoralShape::Claw => grow_claw(ctx, coral),
            CoralShape::Mushroom => grow_mushroom(ctx, coral),
        }
    }
}

/// Places one coral block. With checks enforced, coral only grows into water.
fn place_coral(ctx: &FeatureContext<'_>, pos: IVec3, coral: Block) -> bool {
    if ctx.enforcing() {
        let current = ctx.block_at(pos);
        if current != block::WATER && !current.is_coral() {
            return false;
        }
    }
    ctx.set_block(pos, coral)
}

fn grow_tree(ctx: &mut FeatureContext<'_>, coral: Block) -> bool {
    let stem = ctx.random.random_range(1..=3);
    let mut top = ctx.origin;
    for i in 0..stem {
        top = ctx.origin + IVec3::Y * i;
        if !place_coral(ctx, top, coral) {
            return i > 0;
        }
    }

    let mut dirs = HORIZONTALS;
    dirs.shuffle(&mut *ctx.random);
    let branches = ctx.random.random_range(2..=4);
    for &dir in &dirs[..branches] {
        let mut pos = top + IVec3::Y + dir;
        let length = ctx.random.random_range(1..=5);
        for step in 0..length {
            if !place_coral(ctx, pos, coral) {
                break;
            }
            pos += IVec3::Y;
            if step == 0 || ctx.random.random_bool(0.25) {
                pos += dir;
            }
        }
    }
    true
}

fn grow_claw(ctx: &mut FeatureContext<'_>, coral: Block) -> bool {
    let origin = ctx.origin;
    if !place_coral(ctx, origin, coral) {
        return false;
    }
    let mut dirs = HORIZONTALS;
    dirs.shuffle(&mut *ctx.random);
    let arms = ctx.random.random_range(2..=4);
    for &dir in &dirs[..arms] {
        let reach = ctx.random.random_range(1..=2);
        let rise = ctx.random.random_range(2..=4);
        let mut pos = origin + dir;
        for _ in 0..reach {
            if !place_coral(ctx, pos, coral) {
                break;
            }
            pos += dir;
        }
        pos += IVec3::Y;
        for _ in 0..rise {
            if !place_coral(ctx, pos, coral) {
                break;
            }
            pos += IVec3::Y;
        }
    }
    true
}

fn grow_mushroom(ctx: &mut FeatureContext<'_>, coral: Block) -> bool {
    let width = ctx.random.random_range(3..=5);
    let height = ctx.random.random_range(3..=5);
    let depth = ctx.random.random_range(3..=5);
    let sink = ctx.random.random_range(0..=1);
    let base = ctx.origin - IVec3::Y * sink;

    let mut placed = 0;
    for x in 0..width {
        for y in 0..height {
            for z in 0..depth {
                let on_x = x == 0 || x == width - 1;
                let on_y = y == 0 || y == height - 1;
                let on_z = z == 0 || z == depth - 1;
                let shell = on_x || on_y || on_z;
                let corner = [on_x, on_y, on_z].into_iter().filter(|&e| e).count() >= 2;
                if !shell || corner || (y == 0 && !on_x && !on_z) {
                    continue;
                }
                if ctx.random.random_bool(0.1) {
                    continue;
                }
                if place_coral(ctx, base + IVec3::new(x, y, z), coral) {
                    placed += 1;
                }
            }
        }
    }
    placed > 0
}

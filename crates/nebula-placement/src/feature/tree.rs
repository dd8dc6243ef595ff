//! Trees: a trunk placer, a foliage placer and optional decorators.

use std::sync::LazyLock;

use glam::IVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{Feature, FeatureConfig, FeatureContext};
use crate::block::{self, Block};
use crate::key::ContentKey;

static KEY: LazyLock<ContentKey> = LazyLock::new(|| ContentKey::builtin(TreeFeature::PATH));

const HORIZONTALS: [IVec3; 4] = [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z];

// ---------------------------------------------------------------------------
// Shape descriptors
// ---------------------------------------------------------------------------

/// How the trunk grows.
#[derive(Clone, Debug)]
pub enum TrunkPlacer {
    /// A single vertical column.
    Straight {
        base_height: i32,
        height_rand_a: i32,
        height_rand_b: i32,
    },
    /// A column with short diagonal branches in its upper half, each carrying
    /// its own foliage cluster.
    Fancy {
        base_height: i32,
        height_rand_a: i32,
        height_rand_b: i32,
    },
}

impl TrunkPlacer {
    fn height(&self, random: &mut ChaCha8Rng) -> i32 {
        let (base, a, b) = match *self {
            Self::Straight {
                base_height,
                height_rand_a,
                height_rand_b,
            }
            | Self::Fancy {
                base_height,
                height_rand_a,
                height_rand_b,
            } => (base_height, height_rand_a, height_rand_b),
        };
        base + random.random_range(0..=a.max(0)) + random.random_range(0..=b.max(0))
    }
}

/// How leaves are laid around each foliage attachment.
#[derive(Clone, Debug)]
pub enum FoliagePlacer {
    /// Stacked square layers shrinking towards the top, corners randomly trimmed.
    Blob { radius: i32, offset: i32, height: i32 },
    /// Round layers, one block wider in the middle rows.
    Fancy { radius: i32, offset: i32, height: i32 },
}

/// Clearance the tree needs around its trunk, by height.
#[derive(Clone, Debug)]
pub struct TwoLayersFeatureSize {
    /// Height at which `upper_size` takes over.
    pub limit: i32,
    /// Clearance radius below `limit`.
    pub lower_size: i32,
    /// Clearance radius from `limit` up.
    pub upper_size: i32,
    /// Shortest height the tree may be clipped to when space runs out.
    pub min_clipped_height: Option<i32>,
}

impl TwoLayersFeatureSize {
    fn radius_at(&self, y: i32) -> i32 {
        if y < self.limit {
            self.lower_size
        } else {
            self.upper_size
        }
    }
}

/// Post-processing applied once trunk and foliage are placed.
#[derive(Clone, Debug)]
pub enum TreeDecorator {
    /// Attaches a bee nest under the lowest leaves with the given probability.
    Beehive { probability: f32 },
}

/// Complete tree configuration.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub trunk_block: Block,
    pub foliage_block: Block,
    pub trunk: TrunkPlacer,
    pub foliage: FoliagePlacer,
    pub size: TwoLayersFeatureSize,
    pub decorators: Vec<TreeDecorator>,
}

impl TreeConfig {
    pub fn new(
        trunk_block: Block,
        foliage_block: Block,
        trunk: TrunkPlacer,
        foliage: FoliagePlacer,
        size: TwoLayersFeatureSize,
    ) -> Self {
        Self {
            trunk_block,
            foliage_block,
            trunk,
            foliage,
            size,
            decorators: Vec::new(),
        }
    }

    /// Straight trunk with blob foliage, the shape of oak and birch trees.
    pub fn simple(
        trunk_block: Block,
        foliage_block: Block,
        base_height: i32,
        height_rand_a: i32,
        height_rand_b: i32,
        foliage_radius: i32,
    ) -> Self {
        Self::new(
            trunk_block,
            foliage_block,
            TrunkPlacer::Straight {
                base_height,
                height_rand_a,
                height_rand_b,
            },
            FoliagePlacer::Blob {
                radius: foliage_radius,
                offset: 0,
                height: 3,
            },
            TwoLayersFeatureSize {
                limit: 1,
                lower_size: 0,
                upper_size: 1,
                min_clipped_height: None,
            },
        )
    }

    /// Branching trunk with round foliage clusters.
    pub fn fancy(trunk_block: Block, foliage_block: Block) -> Self {
        Self::new(
            trunk_block,
            foliage_block,
            TrunkPlacer::Fancy {
                base_height: 3,
                height_rand_a: 11,
                height_rand_b: 0,
            },
            FoliagePlacer::Fancy {
                radius: 2,
                offset: 4,
                height: 4,
            },
            TwoLayersFeatureSize {
                limit: 0,
                lower_size: 0,
                upper_size: 0,
                min_clipped_height: Some(4),
            },
        )
    }

    /// Replaces the decorator list.
    pub fn with_decorators(mut self, decorators: Vec<TreeDecorator>) -> Self {
        self.decorators = decorators;
        self
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Where a foliage cluster is grown.
struct Attachment {
    pos: IVec3,
    radius_offset: i32,
}

/// The builtin tree feature type.
#[derive(Debug, Default)]
pub struct TreeFeature;

impl TreeFeature {
    /// Registry path of this feature type.
    pub const PATH: &'static str = "tree";

    pub fn new() -> Self {
        Self
    }
}

impl Feature for TreeFeature {
    fn key(&self) -> &ContentKey {
        &KEY
    }

    fn generate(&self, config: &FeatureConfig, ctx: &mut FeatureContext<'_>) -> bool {
        let FeatureConfig::Tree(config) = config else {
            return false;
        };
        let origin = ctx.origin;
        let below = origin - IVec3::Y;

        let mut height = config.trunk.height(ctx.random);
        if ctx.enforcing() {
            if !ctx.block_at(below).is_soil() {
                return false;
            }
            match free_height(ctx, config, height) {
                Some(free) => height = free,
                None => return false,
            }
        }

        if !ctx.block_at(below).is_soil() {
            ctx.set_block(below, block::DIRT);
        }

        let (logs, attachments) = place_trunk(ctx, config, height);
        if logs == 0 {
            return false;
        }

        let mut lowest_leaves: Option<i32> = None;
        for attachment in &attachments {
            if let Some(y) = place_foliage(ctx, config, attachment) {
                lowest_leaves = Some(lowest_leaves.map_or(y, |low| low.min(y)));
            }
        }

        for decorator in &config.decorators {
            decorate(ctx, decorator, lowest_leaves.unwrap_or(origin.y + height));
        }
        true
    }
}

fn is_free(block: Block, trunk_block: Block) -> bool {
    block.is_air() || block.is_leaves() || block == trunk_block
}

/// Tallest height `<= height` whose clearance is free, or `None` if the tree
/// does not fit at all.
fn free_height(ctx: &FeatureContext<'_>, config: &TreeConfig, height: i32) -> Option<i32> {
    for y in 0..=height + 1 {
        let r = config.size.radius_at(y);
        for dx in -r..=r {
            for dz in -r..=r {
                let pos = ctx.origin + IVec3::new(dx, y, dz);
                if !is_free(ctx.block_at(pos), config.trunk_block) {
                    let clipped = y - 2;
                    return match config.size.min_clipped_height {
                        Some(min) if clipped >= min => Some(clipped),
                        _ => None,
                    };
                }
            }
        }
    }
    Some(height)
}

/// Logs only grow into free space unless checks are suppressed.
fn place_log(ctx: &FeatureContext<'_>, pos: IVec3, trunk_block: Block) -> bool {
    (!ctx.enforcing() || is_free(ctx.block_at(pos), trunk_block)) && ctx.set_block(pos, trunk_block)
}

fn place_trunk(
    ctx: &mut FeatureContext<'_>,
    config: &TreeConfig,
    height: i32,
) -> (usize, Vec<Attachment>) {
    let origin = ctx.origin;
    let mut logs = 0;
    for y in 0..height {
        if place_log(ctx, origin + IVec3::Y * y, config.trunk_block) {
            logs += 1;
        }
    }
    let mut attachments = vec![Attachment {
        pos: origin + IVec3::Y * height,
        radius_offset: 0,
    }];

    if let TrunkPlacer::Fancy { .. } = config.trunk
        && height >= 4
    {
        let branches = (height / 4).max(1);
        for _ in 0..branches {
            let y = ctx.random.random_range(height / 2..height);
            let dir = HORIZONTALS[ctx.random.random_range(0..HORIZONTALS.len())];
            let length = ctx.random.random_range(2..=3);
            let mut pos = origin + IVec3::Y * y;
            for step in 1..=length {
                pos += dir;
                if step == length {
                    pos += IVec3::Y;
                }
                if place_log(ctx, pos, config.trunk_block) {
                    logs += 1;
                }
            }
            attachments.push(Attachment {
                pos,
                radius_offset: -1,
            });
        }
    }
    (logs, attachments)
}

/// Places one foliage cluster. Returns the lowest y that received leaves.
fn place_foliage(
    ctx: &mut FeatureContext<'_>,
    config: &TreeConfig,
    at: &Attachment,
) -> Option<i32> {
    let mut lowest = None;
    let (offset, height) = match config.foliage {
        FoliagePlacer::Blob { offset, height, .. }
        | FoliagePlacer::Fancy { offset, height, .. } => (offset, height),
    };

    let mut layer = offset;
    while layer >= offset - height {
        let r = match config.foliage {
            FoliagePlacer::Blob { radius, .. } => {
                (radius + at.radius_offset - 1 - layer / 2).max(0)
            }
            FoliagePlacer::Fancy { radius, .. } => {
                let edge = layer == offset || layer == offset - height;
                radius + at.radius_offset + if edge { 0 } else { 1 }
            }
        };
        for dx in -r..=r {
            for dz in -r..=r {
                if skip_leaf(ctx.random, &config.foliage, dx, dz, r, layer) {
                    continue;
                }
                let pos = at.pos + IVec3::new(dx, layer, dz);
                if (ctx.block_at(pos).is_air() || ctx.block_at(pos).is_leaves())
                    && ctx.set_block(pos, config.foliage_block)
                {
                    lowest = Some(lowest.map_or(pos.y, |low: i32| low.min(pos.y)));
                }
            }
        }
        layer -= 1;
    }
    lowest
}

fn skip_leaf(
    random: &mut ChaCha8Rng,
    foliage: &FoliagePlacer,
    dx: i32,
    dz: i32,
    r: i32,
    layer: i32,
) -> bool {
    match foliage {
        FoliagePlacer::Blob { .. } => {
            dx.abs() == r && dz.abs() == r && r > 0 && (layer == 0 || random.random_bool(0.5))
        }
        FoliagePlacer::Fancy { .. } => {
            let dist = (dx as f32 + 0.5).powi(2) + (dz as f32 + 0.5).powi(2);
            dist > (r * r) as f32
        }
    }
}

fn decorate(ctx: &mut FeatureContext<'_>, decorator: &TreeDecorator, lowest_leaves: i32) {
    match *decorator {
        TreeDecorator::Beehive { probability } => {
            if ctx.random.random::<f32>() >= probability {
                return;
            }
            let nest_y = (lowest_leaves - 1).max(ctx.origin.y + 1);
            let nest = IVec3::new(ctx.origin.x, nest_y, ctx.origin.z + 1);
            if ctx.block_at(nest).is_air() {
                ctx.set_block(nest, block::BEE_NEST);
            }
        }
    }
}

//! Piece templates, template pools and block processors for pool-assembled
//! structures.

use std::sync::Arc;

use glam::IVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::block::Block;
use crate::key::ContentKey;

/// Configuration of a pool-assembled structure.
#[derive(Clone, Debug, PartialEq)]
pub struct JigsawConfig {
    /// Pool the first piece is drawn from.
    pub start_pool: StartPool,
    /// Maximum connector depth from the start piece.
    pub size: u32,
}

/// Where a pool-assembled structure draws its first piece from.
#[derive(Clone, Debug, PartialEq)]
pub enum StartPool {
    /// A pool registered in the world's structure-data store.
    Registered(ContentKey),
    /// A pool owned by the configuration.
    Inline(Arc<StructurePool>),
}

impl StartPool {
    pub fn id(&self) -> &ContentKey {
        match self {
            Self::Registered(id) => id,
            Self::Inline(pool) => &pool.id,
        }
    }
}

/// Point on a template where another piece attaches.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    /// Position of the connector relative to the template origin.
    pub offset: IVec3,
    /// Unit axis vector pointing out of the template.
    pub facing: IVec3,
    /// Pool the attached piece is drawn from.
    pub pool: ContentKey,
}

/// A fixed block layout.
#[derive(Clone, Debug, Default)]
pub struct StructureTemplate {
    /// Extent of the template; all block offsets lie in `[0, size)`.
    pub size: IVec3,
    pub blocks: Vec<(IVec3, Block)>,
    pub connectors: Vec<Connector>,
}

impl StructureTemplate {
    /// A solid box of `block` with the given extent.
    pub fn filled(size: IVec3, block: Block) -> Self {
        let mut blocks = Vec::with_capacity((size.x * size.y * size.z).max(0) as usize);
        for x in 0..size.x {
            for y in 0..size.y {
                for z in 0..size.z {
                    blocks.push((IVec3::new(x, y, z), block));
                }
            }
        }
        Self {
            size,
            blocks,
            connectors: Vec::new(),
        }
    }

    /// Sets the block at `offset`, replacing any earlier entry.
    pub fn with_block(mut self, offset: IVec3, block: Block) -> Self {
        self.blocks.retain(|(pos, _)| *pos != offset);
        self.blocks.push((offset, block));
        self
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }
}

/// Per-block transformation applied while a piece is placed.
#[derive(Clone, Debug, PartialEq)]
pub enum StructureProcessor {
    /// Keeps each block with probability `integrity`.
    BlockRot { integrity: f32 },
    /// Replaces `from` with `to` with probability `chance`.
    Replace { from: Block, to: Block, chance: f32 },
}

impl StructureProcessor {
    /// Applies this processor to one block. `None` drops the block.
    pub fn process(&self, block: Block, random: &mut ChaCha8Rng) -> Option<Block> {
        match *self {
            Self::BlockRot { integrity } => {
                if integrity >= 1.0 || random.random::<f32>() < integrity {
                    Some(block)
                } else {
                    None
                }
            }
            Self::Replace { from, to, chance } => {
                if block == from && random.random::<f32>() < chance {
                    Some(to)
                } else {
                    Some(block)
                }
            }
        }
    }
}

/// One weighted entry of a [`StructurePool`].
#[derive(Clone, Debug, PartialEq)]
pub enum PoolElement {
    /// A template placed with a processor list.
    Single {
        template: ContentKey,
        processors: Vec<StructureProcessor>,
    },
    /// Places nothing; terminates expansion.
    Empty,
}

impl PoolElement {
    /// `template` placed with `processors`.
    pub fn processed(template: ContentKey, processors: Vec<StructureProcessor>) -> Self {
        Self::Single {
            template,
            processors,
        }
    }
}

/// Weighted list of pool elements.
#[derive(Clone, Debug, PartialEq)]
pub struct StructurePool {
    pub id: ContentKey,
    /// Pool used in place of this one once the depth limit is reached.
    pub fallback: ContentKey,
    elements: Vec<(PoolElement, u32)>,
    total_weight: u32,
}

impl StructurePool {
    pub fn new(id: ContentKey, fallback: ContentKey) -> Self {
        Self {
            id,
            fallback,
            elements: Vec::new(),
            total_weight: 0,
        }
    }

    /// Adds an element. Zero-weight elements are never picked.
    pub fn with(mut self, element: PoolElement, weight: u32) -> Self {
        self.total_weight += weight;
        self.elements.push((element, weight));
        self
    }

    pub fn elements(&self) -> impl Iterator<Item = &PoolElement> {
        self.elements.iter().map(|(element, _)| element)
    }

    /// Weighted random pick. `None` for an empty pool.
    pub fn pick(&self, random: &mut ChaCha8Rng) -> Option<&PoolElement> {
        if self.total_weight == 0 {
            return None;
        }
        let mut roll = random.random_range(0..self.total_weight);
        for (element, weight) in &self.elements {
            if roll < *weight {
                return Some(element);
            }
            roll -= weight;
        }
        None
    }
}

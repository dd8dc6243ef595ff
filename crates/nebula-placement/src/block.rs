//! Block states written by generation primitives.

/// A block, identified by its registry name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block(&'static str);

impl Block {
    /// Creates a block from its registry name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Registry name of the block.
    pub fn name(self) -> &'static str {
        self.0
    }

    /// Returns `true` for air.
    pub fn is_air(self) -> bool {
        self == AIR
    }

    /// Returns `true` for water and lava.
    pub fn is_fluid(self) -> bool {
        self == WATER || self == LAVA
    }

    /// Returns `true` for blocks generation may overwrite while checks are enforced.
    pub fn is_replaceable(self) -> bool {
        self.is_air() || self == WATER || self.is_leaves()
    }

    /// Returns `true` for any leaves block.
    pub fn is_leaves(self) -> bool {
        self.0.ends_with("_leaves")
    }

    /// Returns `true` for coral blocks.
    pub fn is_coral(self) -> bool {
        self.0.ends_with("_coral_block")
    }

    /// Returns `true` for blocks a sapling could grow on.
    pub fn is_soil(self) -> bool {
        self == DIRT || self == GRASS_BLOCK
    }
}

pub const AIR: Block = Block::new("air");
pub const STONE: Block = Block::new("stone");
pub const DIRT: Block = Block::new("dirt");
pub const GRASS_BLOCK: Block = Block::new("grass_block");
pub const SAND: Block = Block::new("sand");
pub const WATER: Block = Block::new("water");
pub const LAVA: Block = Block::new("lava");

pub const OAK_LOG: Block = Block::new("oak_log");
pub const OAK_LEAVES: Block = Block::new("oak_leaves");
pub const BIRCH_LOG: Block = Block::new("birch_log");
pub const BIRCH_LEAVES: Block = Block::new("birch_leaves");
pub const BEE_NEST: Block = Block::new("bee_nest");

pub const TUBE_CORAL_BLOCK: Block = Block::new("tube_coral_block");
pub const BRAIN_CORAL_BLOCK: Block = Block::new("brain_coral_block");
pub const BUBBLE_CORAL_BLOCK: Block = Block::new("bubble_coral_block");
pub const FIRE_CORAL_BLOCK: Block = Block::new("fire_coral_block");
pub const HORN_CORAL_BLOCK: Block = Block::new("horn_coral_block");

/// Coral blocks a coral feature picks its color from.
pub const CORAL_BLOCKS: [Block; 5] = [
    TUBE_CORAL_BLOCK,
    BRAIN_CORAL_BLOCK,
    BUBBLE_CORAL_BLOCK,
    FIRE_CORAL_BLOCK,
    HORN_CORAL_BLOCK,
];

pub const NETHERRACK: Block = Block::new("netherrack");
pub const BLACKSTONE: Block = Block::new("blackstone");
pub const GILDED_BLACKSTONE: Block = Block::new("gilded_blackstone");
pub const POLISHED_BLACKSTONE_BRICKS: Block = Block::new("polished_blackstone_bricks");
pub const CRACKED_POLISHED_BLACKSTONE_BRICKS: Block =
    Block::new("cracked_polished_blackstone_bricks");
pub const BASALT: Block = Block::new("basalt");
pub const CHEST: Block = Block::new("chest");

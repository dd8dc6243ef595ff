use std::sync::Arc;

use glam::IVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::pool::{StructureProcessor, StructureTemplate};
use crate::checks::GenerationChecks;
use crate::key::ContentKey;
use crate::world::{ChunkPos, WorldAccess};

/// Inclusive axis-aligned block box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl BlockBox {
    /// Box covering `size` blocks from `origin`.
    pub fn from_size(origin: IVec3, size: IVec3) -> Self {
        Self {
            min: origin,
            max: origin + (size - IVec3::ONE).max(IVec3::ZERO),
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        self.min.cmple(pos).all() && pos.cmple(self.max).all()
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One placed template of a structure start.
#[derive(Clone, Debug)]
pub struct StructurePiece {
    pub template_id: ContentKey,
    pub template: Arc<StructureTemplate>,
    /// World position of the template origin.
    pub origin: IVec3,
    pub processors: Vec<StructureProcessor>,
    /// Connector depth from the start piece.
    pub depth: u32,
}

impl StructurePiece {
    pub fn bounds(&self) -> BlockBox {
        BlockBox::from_size(self.origin, self.template.size)
    }

    /// Writes the piece into the world. Returns the number of blocks written.
    pub fn place(
        &self,
        world: &dyn WorldAccess,
        random: &mut ChaCha8Rng,
        checks: GenerationChecks,
        integrity: f64,
    ) -> usize {
        let mut written = 0;
        'blocks: for &(offset, block) in &self.template.blocks {
            let mut block = block;
            for processor in &self.processors {
                match processor.process(block, random) {
                    Some(next) => block = next,
                    None => continue 'blocks,
                }
            }
            if integrity < 1.0 && random.random::<f64>() >= integrity {
                continue;
            }
            if world.set_block(self.origin + offset, block, checks) {
                written += 1;
            }
        }
        written
    }
}

/// Outcome of a structure's piece generation for one chunk.
#[derive(Clone, Debug)]
pub struct StructureStart {
    /// Type key of the structure that produced this start.
    pub structure: ContentKey,
    pub chunk: ChunkPos,
    /// Number of chunks referencing this start.
    pub references: u32,
    pieces: Vec<StructurePiece>,
}

impl StructureStart {
    /// A start with no pieces.
    pub fn new(structure: ContentKey, chunk: ChunkPos) -> Self {
        Self {
            structure,
            chunk,
            references: 0,
            pieces: Vec::new(),
        }
    }

    pub fn push(&mut self, piece: StructurePiece) {
        self.pieces.push(piece);
    }

    pub fn pieces(&self) -> &[StructurePiece] {
        &self.pieces
    }

    /// Returns `true` if the start has at least one piece.
    pub fn has_children(&self) -> bool {
        !self.pieces.is_empty()
    }

    /// Box enclosing every piece, or `None` for an empty start.
    pub fn bounding_box(&self) -> Option<BlockBox> {
        self.pieces
            .iter()
            .map(StructurePiece::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Places every piece in order. Returns the number of blocks written.
    pub fn place(
        &self,
        world: &dyn WorldAccess,
        random: &mut ChaCha8Rng,
        checks: GenerationChecks,
        integrity: f64,
    ) -> usize {
        self.pieces
            .iter()
            .map(|piece| piece.place(world, random, checks, integrity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block;
    use crate::world::MemoryWorld;
    use rand::SeedableRng;

    fn piece(origin: IVec3, size: IVec3) -> StructurePiece {
        StructurePiece {
            template_id: ContentKey::builtin("box"),
            template: Arc::new(StructureTemplate::filled(size, block::BLACKSTONE)),
            origin,
            processors: Vec::new(),
            depth: 0,
        }
    }

    #[test]
    fn test_box_intersection() {
        let a = BlockBox::from_size(IVec3::ZERO, IVec3::splat(4));
        let b = BlockBox::from_size(IVec3::new(3, 0, 3), IVec3::splat(2));
        let c = BlockBox::from_size(IVec3::new(4, 0, 0), IVec3::splat(2));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(IVec3::splat(3)));
        assert!(!a.contains(IVec3::splat(4)));
    }

    #[test]
    fn test_empty_start_has_no_bounds() {
        let start = StructureStart::new(ContentKey::builtin("s"), ChunkPos::new(0, 0));
        assert!(!start.has_children());
        assert!(start.bounding_box().is_none());
    }

    #[test]
    fn test_bounding_box_spans_all_pieces() {
        let mut start = StructureStart::new(ContentKey::builtin("s"), ChunkPos::new(0, 0));
        start.push(piece(IVec3::ZERO, IVec3::splat(2)));
        start.push(piece(IVec3::new(5, -1, 0), IVec3::ONE));
        let bounds = start.bounding_box().unwrap();
        assert_eq!(bounds.min, IVec3::new(0, -1, 0));
        assert_eq!(bounds.max, IVec3::new(5, 1, 1));
    }

    #[test]
    fn test_place_writes_every_block_at_full_integrity() {
        let world = MemoryWorld::builtin(0);
        let mut start = StructureStart::new(ContentKey::builtin("s"), ChunkPos::new(0, 0));
        start.push(piece(IVec3::new(0, 100, 0), IVec3::splat(2)));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let written = start.place(&world, &mut rng, GenerationChecks::Suppressed, 1.0);
        assert_eq!(written, 8);
    }

    #[test]
    fn test_zero_integrity_writes_nothing() {
        let world = MemoryWorld::builtin(0);
        let mut start = StructureStart::new(ContentKey::builtin("s"), ChunkPos::new(0, 0));
        start.push(piece(IVec3::new(0, 100, 0), IVec3::splat(2)));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert_eq!(start.place(&world, &mut rng, GenerationChecks::Suppressed, 0.0), 0);
    }
}

use std::collections::VecDeque;
use std::sync::Arc;

use glam::IVec3;

use super::pool::{PoolElement, StartPool, StructurePool, StructureProcessor, StructureTemplate};
use super::start::{StructurePiece, StructureStart};
use super::{PieceArgs, Structure, StructureConfig};
use crate::key::ContentKey;
use crate::world::StructureStore;

/// Upper bound on the number of pieces in one start.
pub const MAX_PIECES: usize = 128;

/// Structure assembled from template pools by following connectors.
///
/// The start piece is drawn from the configured start pool. Each connector
/// then draws an attached piece from its own pool, breadth first, until the
/// configured depth is reached. At the depth limit connectors draw from the
/// pool's fallback instead, which normally only holds terminators.
#[derive(Debug)]
pub struct JigsawStructure {
    key: ContentKey,
}

impl JigsawStructure {
    pub fn new(key: ContentKey) -> Self {
        Self { key }
    }
}

impl Structure for JigsawStructure {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn generate_pieces(
        &self,
        config: &StructureConfig,
        args: &mut PieceArgs<'_>,
    ) -> StructureStart {
        let mut start = StructureStart::new(self.key.clone(), args.chunk);
        let StructureConfig::Jigsaw(config) = config else {
            return start;
        };

        let center = args.chunk.center_block(args.anchor.y);
        if !(args.is_eligible)(args.biome_source.biome_at(center)) {
            return start;
        }

        let pool = match &config.start_pool {
            StartPool::Inline(pool) => Arc::clone(pool),
            StartPool::Registered(id) => match args.structures.pool(id) {
                Some(pool) => pool,
                None => {
                    tracing::warn!(pool = %id, structure = %self.key, "unknown start pool");
                    return start;
                }
            },
        };
        let Some((template_id, template, processors)) = draw(args, &pool) else {
            return start;
        };
        start.push(StructurePiece {
            template_id,
            template,
            origin: args.anchor,
            processors,
            depth: 0,
        });

        let mut queue = VecDeque::from([0usize]);
        while let Some(index) = queue.pop_front() {
            let parent = start.pieces()[index].clone();
            for connector in &parent.template.connectors {
                if start.pieces().len() >= MAX_PIECES {
                    return start;
                }
                let depth = parent.depth + 1;
                let Some(mut pool) = args.structures.pool(&connector.pool) else {
                    continue;
                };
                if depth >= config.size {
                    match args.structures.pool(&pool.fallback) {
                        Some(fallback) => pool = fallback,
                        None => continue,
                    }
                }
                let Some((template_id, template, processors)) = draw(args, &pool) else {
                    continue;
                };

                let joint = parent.origin + connector.offset + connector.facing;
                let origin = attach_origin(joint, connector.facing, template.size);
                let piece = StructurePiece {
                    template_id,
                    template,
                    origin,
                    processors,
                    depth,
                };
                let bounds = piece.bounds();
                if start.pieces().iter().any(|p| p.bounds().intersects(&bounds)) {
                    continue;
                }
                start.push(piece);
                if depth < config.size {
                    queue.push_back(start.pieces().len() - 1);
                }
            }
        }
        start
    }
}

type Drawn = (ContentKey, Arc<StructureTemplate>, Vec<StructureProcessor>);

/// Picks an element from `pool` and resolves its template. `None` for empty
/// elements and unknown templates.
fn draw(args: &mut PieceArgs<'_>, pool: &StructurePool) -> Option<Drawn> {
    match pool.pick(args.random)? {
        PoolElement::Single {
            template,
            processors,
        } => {
            let resolved = lookup_template(args.structures, template)?;
            Some((template.clone(), resolved, processors.clone()))
        }
        PoolElement::Empty => None,
    }
}

fn lookup_template(store: &dyn StructureStore, id: &ContentKey) -> Option<Arc<StructureTemplate>> {
    let template = store.template(id);
    if template.is_none() {
        tracing::warn!(template = %id, "unknown structure template");
    }
    template
}

/// Origin of a template of `size` attached at `joint`, extending away from
/// the parent along `facing`.
fn attach_origin(joint: IVec3, facing: IVec3, size: IVec3) -> IVec3 {
    let back = IVec3::select(facing.cmplt(IVec3::ZERO), size - IVec3::ONE, IVec3::ZERO);
    joint - back
}

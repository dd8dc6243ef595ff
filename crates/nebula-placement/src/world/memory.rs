//! In-memory world used by the operator binary and by tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use glam::IVec3;
use hashbrown::HashMap;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{BiomeSource, ChunkGenerator, ChunkPos, StructureStore, WorldAccess};
use crate::biome::BiomeId;
use crate::block::{self, Block};
use crate::checks::GenerationChecks;
use crate::content::BuiltinContent;
use crate::key::ContentKey;
use crate::registry::Registries;
use crate::structure::{StructurePool, StructureSettings, StructureStart, StructureTemplate};

/// Height of the grass layer of the flat terrain.
pub const SURFACE_Y: i32 = 63;

const NEIGHBORS: [IVec3; 6] = [
    IVec3::X,
    IVec3::NEG_X,
    IVec3::Y,
    IVec3::NEG_Y,
    IVec3::Z,
    IVec3::NEG_Z,
];

// ---------------------------------------------------------------------------
// Biomes and generator
// ---------------------------------------------------------------------------

/// Biome source with one default biome and per-chunk overrides.
pub struct ZonedBiomeSource {
    default: BiomeId,
    zones: RwLock<HashMap<ChunkPos, BiomeId>>,
}

impl ZonedBiomeSource {
    pub fn new(default: BiomeId) -> Self {
        Self {
            default,
            zones: RwLock::new(HashMap::new()),
        }
    }

    /// Assigns `biome` to every block column of `chunk`.
    pub fn set_zone(&self, chunk: ChunkPos, biome: BiomeId) {
        self.zones
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chunk, biome);
    }
}

impl BiomeSource for ZonedBiomeSource {
    fn biome_at(&self, pos: IVec3) -> BiomeId {
        self.zones
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ChunkPos::containing(pos))
            .copied()
            .unwrap_or(self.default)
    }
}

/// Chunk generator holding only what placement reads from it.
pub struct SimpleGenerator {
    settings: StructureSettings,
    biomes: ZonedBiomeSource,
}

impl SimpleGenerator {
    pub fn new(settings: StructureSettings, biomes: ZonedBiomeSource) -> Self {
        Self { settings, biomes }
    }

    pub fn biomes(&self) -> &ZonedBiomeSource {
        &self.biomes
    }
}

impl ChunkGenerator for SimpleGenerator {
    fn structure_settings(&self) -> &StructureSettings {
        &self.settings
    }

    fn biome_source(&self) -> &dyn BiomeSource {
        &self.biomes
    }
}

// ---------------------------------------------------------------------------
// Structure store
// ---------------------------------------------------------------------------

/// Structure-data store backed by hash maps.
#[derive(Default)]
pub struct MemoryStructures {
    templates: RwLock<HashMap<ContentKey, Arc<StructureTemplate>>>,
    pools: RwLock<HashMap<ContentKey, Arc<StructurePool>>>,
    starts: Mutex<Vec<StructureStart>>,
}

impl MemoryStructures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&self, id: ContentKey, template: StructureTemplate) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(template));
    }

    pub fn add_pool(&self, pool: StructurePool) {
        self.pools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pool.id.clone(), Arc::new(pool));
    }

    /// Starts recorded so far, in recording order.
    pub fn starts(&self) -> Vec<StructureStart> {
        self.starts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StructureStore for MemoryStructures {
    fn template(&self, id: &ContentKey) -> Option<Arc<StructureTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn pool(&self, id: &ContentKey) -> Option<Arc<StructurePool>> {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn record_start(&self, start: &StructureStart) {
        self.starts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(start.clone());
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Flat in-memory world.
///
/// Terrain is stone below y=60, dirt up to the grass layer at
/// [`SURFACE_Y`], air above. Blocks written through [`WorldAccess::set_block`]
/// are tracked separately from terrain edits made with [`MemoryWorld::fill`].
pub struct MemoryWorld {
    seed: u64,
    registries: Registries,
    generator: SimpleGenerator,
    structures: MemoryStructures,
    terrain: RwLock<HashMap<IVec3, Block>>,
    changes: RwLock<HashMap<IVec3, Block>>,
    random: Mutex<ChaCha8Rng>,
    poi_updates: AtomicBool,
    notifications: AtomicUsize,
}

impl MemoryWorld {
    pub fn new(
        seed: u64,
        registries: Registries,
        generator: SimpleGenerator,
        structures: MemoryStructures,
    ) -> Self {
        Self {
            seed,
            registries,
            generator,
            structures,
            terrain: RwLock::new(HashMap::new()),
            changes: RwLock::new(HashMap::new()),
            random: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            poi_updates: AtomicBool::new(true),
            notifications: AtomicUsize::new(0),
        }
    }

    /// A world populated with the builtin content pack. Every chunk is plains
    /// until [`MemoryWorld::set_biome`] says otherwise.
    pub fn builtin(seed: u64) -> Self {
        let content = BuiltinContent::new();
        let generator = SimpleGenerator::new(
            content.settings,
            ZonedBiomeSource::new(content.biomes.plains),
        );
        Self::new(seed, content.registries, generator, content.structures)
    }

    /// Looks up a biome by name in this world's registry.
    pub fn biome(&self, name: &str) -> Option<BiomeId> {
        let key = ContentKey::parse(name).ok()?;
        self.registries.biomes.lookup(&key)
    }

    pub fn set_biome(&self, chunk: ChunkPos, biome: BiomeId) {
        self.generator.biomes().set_zone(chunk, biome);
    }

    /// Overwrites terrain in the inclusive box `min..=max` without counting
    /// the blocks as changes.
    pub fn fill(&self, min: IVec3, max: IVec3, block: Block) {
        let mut terrain = self.terrain.write().unwrap_or_else(PoisonError::into_inner);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    terrain.insert(IVec3::new(x, y, z), block);
                }
            }
        }
    }

    /// Blocks written through [`WorldAccess::set_block`].
    pub fn changes(&self) -> HashMap<IVec3, Block> {
        self.changes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn changed_blocks(&self) -> usize {
        self.changes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Concrete structure store, for inspecting recorded starts.
    pub fn structure_store(&self) -> &MemoryStructures {
        &self.structures
    }

    /// Toggles point-of-interest notifications on block changes.
    pub fn set_poi_updates(&self, enabled: bool) {
        self.poi_updates.store(enabled, Ordering::Relaxed);
    }

    /// Number of point-of-interest notifications sent so far.
    pub fn notifications(&self) -> usize {
        self.notifications.load(Ordering::Relaxed)
    }

    fn terrain_at(&self, pos: IVec3) -> Block {
        if let Some(&block) = self
            .terrain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pos)
        {
            return block;
        }
        match pos.y {
            y if y < 60 => block::STONE,
            y if y < SURFACE_Y => block::DIRT,
            SURFACE_Y => block::GRASS_BLOCK,
            _ => block::AIR,
        }
    }

    fn allowed(&self, pos: IVec3, block: Block) -> bool {
        let current = self.block_at(pos);
        if !current.is_replaceable() {
            return false;
        }
        if current.is_air() && !block.is_fluid() {
            return !NEIGHBORS.iter().any(|&n| self.block_at(pos + n).is_fluid());
        }
        true
    }
}

impl WorldAccess for MemoryWorld {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn registries(&self) -> &Registries {
        &self.registries
    }

    fn generator(&self) -> &dyn ChunkGenerator {
        &self.generator
    }

    fn structures(&self) -> &dyn StructureStore {
        &self.structures
    }

    fn block_at(&self, pos: IVec3) -> Block {
        if let Some(&block) = self
            .changes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pos)
        {
            return block;
        }
        self.terrain_at(pos)
    }

    fn set_block(&self, pos: IVec3, block: Block, checks: GenerationChecks) -> bool {
        if !checks.is_suppressed() && !self.allowed(pos, block) {
            return false;
        }
        self.changes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pos, block);
        if self.poi_updates.load(Ordering::Relaxed) {
            self.notifications.fetch_add(1, Ordering::Relaxed);
        }
        true
    }

    fn next_random_seed(&self) -> u64 {
        self.random
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64()
    }
}

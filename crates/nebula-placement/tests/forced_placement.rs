//! End-to-end forced placement against the in-memory world.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use glam::IVec3;
use nebula_placement::block;
use nebula_placement::content::BuiltinContent;
use nebula_placement::defaults::DefaultSource;
use nebula_placement::feature::{
    ConfiguredFeature, Feature, FeatureConfig, TreeConfig, TreeFeature,
};
use nebula_placement::overrides::{
    OverrideCatalog, OverrideDefinition, OverrideEntry, tree_with_bees,
};
use nebula_placement::structure::{
    ConfiguredStructure, PieceArgs, Structure, StructureConfig, StructurePiece, StructureSettings,
    StructureSpacing, StructureStart, StructureTemplate,
};
use nebula_placement::world::{ChunkPos, MemoryStructures, SimpleGenerator, ZonedBiomeSource};
use nebula_placement::{
    BiomeId, ContentKey, GenerationPrimitive, LockedExecutor, MemoryWorld, PlacementContext,
    PlacementEngine, PlacementLock, StructureProbe, StructureStore, Tier, WorldAccess,
};

const ORIGIN: IVec3 = IVec3::new(0, 64, 0);

fn engine(lock: &Arc<PlacementLock>) -> PlacementEngine {
    PlacementEngine::new().with_lock(Arc::clone(lock))
}

fn bastion_grid_chunk(world: &MemoryWorld) -> ChunkPos {
    world
        .generator()
        .structure_settings()
        .spacing(&ContentKey::builtin("bastion_remnant"))
        .unwrap()
        .start_chunk(world.seed(), ChunkPos::new(0, 0))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_names_resolve_to_nothing() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(1);
    let engine = engine(&lock);
    for name in ["nope", "nebula:nope", "elsewhere:oak", ""] {
        assert_eq!(engine.resolve_and_place(name, &world, ORIGIN), None, "{name:?}");
    }
    assert_eq!(world.changed_blocks(), 0);
}

#[test]
fn test_override_wins_over_registry_entry_of_same_name() {
    let mut content = BuiltinContent::new();
    // A plain oak registered under the override's name.
    let plain_oak = ConfiguredFeature::new(
        Arc::new(TreeFeature::new()),
        FeatureConfig::Tree(TreeConfig::simple(block::OAK_LOG, block::OAK_LEAVES, 4, 2, 0, 2)),
    );
    content
        .registries
        .configured_features
        .register(ContentKey::builtin("oak_bees"), Arc::new(plain_oak))
        .unwrap();
    let generator =
        SimpleGenerator::new(content.settings, ZonedBiomeSource::new(content.biomes.plains));
    let world = MemoryWorld::new(3, content.registries, generator, content.structures);

    let lock = Arc::new(PlacementLock::new());
    let engine = engine(&lock);
    let resolution = engine.resolve("oak_bees", &world, ORIGIN).unwrap();
    assert_eq!(resolution.tier, Tier::Overrides);
    assert!(matches!(resolution.primitive, GenerationPrimitive::CustomOverride(_)));

    assert_eq!(engine.resolve_and_place("oak_bees", &world, ORIGIN), Some(true));
    assert!(
        world.changes().values().any(|&b| b == block::BEE_NEST),
        "override tree must carry a bee nest"
    );
}

#[test]
fn test_oak_bees_without_registry_entry() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(9);
    assert!(!world
        .registries()
        .configured_features
        .contains(&ContentKey::builtin("oak_bees")));

    let engine = engine(&lock);
    assert_eq!(engine.resolve_and_place("oak_bees", &world, ORIGIN), Some(true));
    let changes = world.changes();
    assert!(changes.values().any(|&b| b == block::OAK_LOG));
    assert!(changes.values().any(|&b| b == block::BEE_NEST));
}

/// Counts how often default-configuration recovery is consulted.
#[derive(Default)]
struct CountingSource {
    calls: Arc<AtomicUsize>,
}

impl DefaultSource for CountingSource {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn structure(
        &self,
        _ty: &dyn Structure,
        _ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredStructure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn feature(
        &self,
        _ty: &dyn Feature,
        _ctx: &PlacementContext<'_>,
    ) -> Option<Arc<ConfiguredFeature>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

#[test]
fn test_configured_structure_skips_default_search() {
    let world = MemoryWorld::builtin(4);
    // The bastion type is also in this biome's index.
    world.set_biome(ChunkPos::new(0, 0), world.biome("nether_wastes").unwrap());

    let calls = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        calls: Arc::clone(&calls),
    };
    let engine = PlacementEngine::new()
        .with_lock(Arc::new(PlacementLock::new()))
        .with_sources(vec![Box::new(source)]);

    let resolution = engine.resolve("bastion_remnant", &world, ORIGIN).unwrap();
    assert_eq!(resolution.tier, Tier::ConfiguredStructures);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // A bare type does consult it.
    assert!(engine.resolve("tree", &world, ORIGIN).is_none());
    assert!(calls.load(Ordering::SeqCst) > 0);
}

// ---------------------------------------------------------------------------
// Suppression
// ---------------------------------------------------------------------------

#[test]
fn test_suppression_flag_cleared_around_place() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(2);
    let engine = engine(&lock);

    for name in ["oak_bees", "coral", "bastion_remnant_units", "oak"] {
        assert!(!lock.checks_suppressed());
        assert!(engine.resolve_and_place(name, &world, ORIGIN).is_some(), "{name}");
        assert!(!lock.checks_suppressed(), "{name} left the flag raised");
    }
}

#[test]
fn test_suppression_flag_cleared_after_panicking_override() {
    let lock = Arc::new(PlacementLock::new());
    let mut catalog = OverrideCatalog::new();
    let observed = Arc::clone(&lock);
    catalog
        .insert(OverrideEntry::new(
            ContentKey::builtin("exploding_tree"),
            tree_with_bees(TreeConfig::fancy(block::OAK_LOG, block::OAK_LEAVES)),
            Box::new(
                move |_ctx: &mut PlacementContext<'_>, _executor: &LockedExecutor<'_>| -> bool {
                    assert!(!observed.checks_suppressed());
                    panic!("generation blew up");
                },
            ),
        ))
        .unwrap();
    let engine = engine(&lock).with_catalog(Arc::new(catalog));
    let world = MemoryWorld::builtin(2);

    assert_eq!(engine.resolve_and_place("exploding_tree", &world, ORIGIN), Some(false));
    assert!(!lock.checks_suppressed());
    // Not poisoned for the next caller.
    assert_eq!(engine.resolve_and_place("oak", &world, ORIGIN), Some(true));
}

#[test]
fn test_forced_feature_ignores_block_validity() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(6);
    // Bury the spot in water; worldgen would refuse to grow a tree here.
    world.fill(IVec3::new(-4, 64, -4), IVec3::new(4, 80, 4), block::WATER);

    assert_eq!(engine(&lock).resolve_and_place("oak", &world, ORIGIN), Some(true));
    assert_eq!(world.block_at(ORIGIN), block::OAK_LOG);
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

#[test]
fn test_override_structure_recorded() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(8);
    assert_eq!(
        engine(&lock).resolve_and_place("bastion_remnant_treasure", &world, ORIGIN),
        Some(true)
    );
    assert!(world.changed_blocks() > 0);
    let starts = world.structure_store().starts();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].structure, ContentKey::builtin("bastion_remnant"));
}

#[test]
fn test_fully_decayed_structure_is_not_recorded() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(8);
    let engine = engine(&lock).with_integrity(0.0);
    assert_eq!(
        engine.resolve_and_place("bastion_remnant_units", &world, ORIGIN),
        Some(false)
    );
    assert_eq!(world.changed_blocks(), 0);
    assert!(world.structure_store().starts().is_empty());
}

#[test]
fn test_bastion_override_needs_no_registered_start_pool() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(8);
    for variant in ["units", "hoglin_stable", "treasure", "bridge"] {
        let pool = ContentKey::builtin(&format!("bastion/{variant}/start"));
        assert!(world.structure_store().pool(&pool).is_none());
    }
    assert_eq!(engine(&lock).spawn("bastion_remnant_units", &world, ORIGIN), Some(true));
    assert_eq!(world.structure_store().starts().len(), 1);
}

#[test]
fn test_place_on_grid_uses_candidate_chunk() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(8);
    let engine = engine(&lock);
    let bastion = engine
        .resolve_configured_structure("bastion_remnant", &world, ORIGIN)
        .unwrap();

    assert_eq!(engine.place_on_grid(&bastion, &world, ORIGIN), Some(true));
    let starts = world.structure_store().starts();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].chunk, bastion_grid_chunk(&world));
}

#[test]
fn test_place_on_grid_without_spacing() {
    let lock = Arc::new(PlacementLock::new());
    let content = BuiltinContent::new();
    let generator = SimpleGenerator::new(
        StructureSettings::new(),
        ZonedBiomeSource::new(content.biomes.plains),
    );
    let world = MemoryWorld::new(0, content.registries, generator, content.structures);
    let engine = engine(&lock);
    let bastion = engine
        .resolve_configured_structure("bastion_remnant", &world, ORIGIN)
        .unwrap();
    assert_eq!(engine.place_on_grid(&bastion, &world, ORIGIN), None);
    assert_eq!(world.changed_blocks(), 0);
}

#[test]
fn test_poi_updates_rule_disables_notifications() {
    let mut config = nebula_config::Config::default();
    config.rules.set("poi_updates", "false").unwrap();

    let world = MemoryWorld::builtin(3);
    world.set_poi_updates(config.rules.poi_updates);
    let engine = PlacementEngine::from_config(&config).with_lock(Arc::new(PlacementLock::new()));

    assert_eq!(engine.resolve_and_place("birch_bees", &world, ORIGIN), Some(true));
    assert!(world.changed_blocks() > 0);
    assert_eq!(world.notifications(), 0);
}

#[test]
fn test_spawn_only_consults_overrides() {
    let lock = Arc::new(PlacementLock::new());
    let world = MemoryWorld::builtin(3);
    let engine = engine(&lock);
    assert_eq!(engine.spawn("bastion_remnant", &world, ORIGIN), None);
    assert_eq!(engine.spawn("coral_claw", &world, ORIGIN), Some(true));
}

// ---------------------------------------------------------------------------
// Start probing
// ---------------------------------------------------------------------------

/// Structure that tracks how many callers are inside piece generation.
struct Instrumented {
    key: ContentKey,
    inside: Arc<AtomicUsize>,
    max_seen: Arc<AtomicUsize>,
    pieces: bool,
}

impl Structure for Instrumented {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn generate_pieces(
        &self,
        _config: &StructureConfig,
        args: &mut PieceArgs<'_>,
    ) -> StructureStart {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.inside.fetch_sub(1, Ordering::SeqCst);

        let mut start = StructureStart::new(self.key.clone(), args.chunk);
        if self.pieces {
            start.push(StructurePiece {
                template_id: self.key.clone(),
                template: Arc::new(StructureTemplate::filled(IVec3::ONE, block::STONE)),
                origin: args.anchor,
                processors: Vec::new(),
                depth: 0,
            });
        }
        start
    }
}

struct ProbeWorld {
    world: MemoryWorld,
    structures: Vec<Arc<dyn Structure>>,
}

fn probe_world(
    names: &[&str],
    pieces: bool,
    inside: &Arc<AtomicUsize>,
    max_seen: &Arc<AtomicUsize>,
) -> ProbeWorld {
    let content = BuiltinContent::new();
    let mut settings = StructureSettings::new();
    let mut structures = Vec::new();
    for name in names {
        let structure: Arc<dyn Structure> = Arc::new(Instrumented {
            key: ContentKey::builtin(name),
            inside: Arc::clone(inside),
            max_seen: Arc::clone(max_seen),
            pieces,
        });
        // Every chunk is a grid candidate.
        settings.set_spacing(structure.key().clone(), StructureSpacing::new(1, 0, 7).unwrap());
        settings.add_placement(
            content.biomes.plains,
            Arc::new(ConfiguredStructure::new(Arc::clone(&structure), StructureConfig::Empty)),
        );
        structures.push(structure);
    }
    let generator = SimpleGenerator::new(settings, ZonedBiomeSource::new(content.biomes.plains));
    ProbeWorld {
        world: MemoryWorld::new(0, content.registries, generator, MemoryStructures::new()),
        structures,
    }
}

#[test]
fn test_probe_never_yields_empty_start() {
    let inside = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let empty = probe_world(&["hollow"], false, &inside, &max_seen);
    let probe = StructureProbe::new(Arc::new(PlacementLock::new()));
    let ctx = PlacementContext::new(&empty.world, ORIGIN);
    assert!(probe.try_start(empty.structures[0].as_ref(), &ctx).is_none());

    let full = probe_world(&["solid"], true, &inside, &max_seen);
    let ctx = PlacementContext::new(&full.world, ORIGIN);
    let start = probe.try_start(full.structures[0].as_ref(), &ctx).unwrap();
    assert_eq!(start.pieces().len(), 1);
}

/// Structure that only starts when the eligibility predicate accepts the
/// nether.
struct NetherGated {
    key: ContentKey,
    nether: BiomeId,
}

impl Structure for NetherGated {
    fn key(&self) -> &ContentKey {
        &self.key
    }

    fn generate_pieces(
        &self,
        _config: &StructureConfig,
        args: &mut PieceArgs<'_>,
    ) -> StructureStart {
        let mut start = StructureStart::new(self.key.clone(), args.chunk);
        if (args.is_eligible)(self.nether) {
            start.push(StructurePiece {
                template_id: self.key.clone(),
                template: Arc::new(StructureTemplate::filled(IVec3::ONE, block::STONE)),
                origin: args.anchor,
                processors: Vec::new(),
                depth: 0,
            });
        }
        start
    }
}

/// World where one gated structure type has a plains configuration and a
/// separate nether configuration. With `shared`, the plains configuration is
/// also placed in the nether.
fn gated_world(shared: bool) -> (MemoryWorld, Arc<dyn Structure>) {
    let content = BuiltinContent::new();
    let structure: Arc<dyn Structure> = Arc::new(NetherGated {
        key: ContentKey::builtin("gated"),
        nether: content.biomes.nether_wastes,
    });
    let in_plains = Arc::new(ConfiguredStructure::new(
        Arc::clone(&structure),
        StructureConfig::Empty,
    ));
    let in_nether = Arc::new(ConfiguredStructure::new(
        Arc::clone(&structure),
        StructureConfig::Empty,
    ));

    let mut settings = StructureSettings::new();
    settings.set_spacing(structure.key().clone(), StructureSpacing::new(1, 0, 7).unwrap());
    settings.add_placement(content.biomes.plains, Arc::clone(&in_plains));
    settings.add_placement(content.biomes.nether_wastes, in_nether);
    if shared {
        settings.add_placement(content.biomes.nether_wastes, in_plains);
    }
    let generator = SimpleGenerator::new(settings, ZonedBiomeSource::new(content.biomes.plains));
    let world = MemoryWorld::new(0, content.registries, generator, MemoryStructures::new());
    (world, structure)
}

#[test]
fn test_eligibility_follows_the_resolved_configuration() {
    let probe = StructureProbe::new(Arc::new(PlacementLock::new()));

    let (world, structure) = gated_world(false);
    let ctx = PlacementContext::new(&world, ORIGIN);
    assert!(probe.try_start(structure.as_ref(), &ctx).is_none());

    let (world, structure) = gated_world(true);
    let ctx = PlacementContext::new(&world, ORIGIN);
    assert!(probe.try_start(structure.as_ref(), &ctx).is_some());
}

#[test]
fn test_concurrent_probes_are_serialized() {
    let inside = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let setup = Arc::new(probe_world(&["alpha", "beta"], true, &inside, &max_seen));
    let lock = Arc::new(PlacementLock::new());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let setup = Arc::clone(&setup);
            let lock = Arc::clone(&lock);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let probe = StructureProbe::new(lock);
                barrier.wait();
                for round in 0..25 {
                    let pos = ChunkPos::new(round, i).center_block(64);
                    let ctx = PlacementContext::new(&setup.world, pos);
                    assert!(probe.try_start(setup.structures[i as usize].as_ref(), &ctx).is_some());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(inside.load(Ordering::SeqCst), 0);
}

#[test]
fn test_probe_and_forced_placement_share_the_lock() {
    let lock = Arc::new(PlacementLock::new());
    let world = Arc::new(MemoryWorld::builtin(11));
    let engine = Arc::new(engine(&lock));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let world = Arc::clone(&world);
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let pos = IVec3::new(i * 40, 64, 0);
                for _ in 0..5 {
                    assert_eq!(
                        engine.resolve_and_place("fancy_oak_bees", world.as_ref(), pos),
                        Some(true)
                    );
                    let _ = engine.probe_start("bastion_remnant", world.as_ref(), pos);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(!lock.checks_suppressed());
}

#[test]
fn test_override_definition_is_inspectable() {
    let catalog = OverrideCatalog::global();
    let entry = catalog.get(&ContentKey::builtin("bastion_remnant_bridge")).unwrap();
    let OverrideDefinition::Structure(structure) = entry.definition() else {
        panic!("bastion override must be a structure");
    };
    assert_eq!(structure.structure.key(), &ContentKey::builtin("bastion_remnant"));
}

//! Integration tests for the bounded placement strategy against the sandbox.

use cellforge_core::config::PlacementConfig;
use cellforge_core::error::CellforgeError;
use cellforge_core::grid::{CellPos, Direction};
use cellforge_core::error::HostError;
use cellforge_core::host::{ActorId, ActorPose, FreeEntitySpawn, OwnerId, PlacementHost};
use cellforge_core::math::Vec3Fixed;
use cellforge_core::placement::{
    Actionable, ItemPlacementStrategy, PlacementContext, PlacementRequest, PlacementState, PlacementStatus,
};
use cellforge_core::resource::{ItemStack, ResourceKey};
use cellforge_core::sandbox::{MaterialId, Placeable, SandboxWorld};
use cellforge_test_utils::determinism::strategies::{arb_amount, arb_direction};
use cellforge_test_utils::fixtures::{cobblestone, fixed, sandbox_with_ground, seeds, water, ScriptedDraws};
use proptest::prelude::*;

/// Air cell just above the ground.
const TARGET: CellPos = CellPos::new(0, 1, 0);

fn mount(world: &SandboxWorld, config: PlacementConfig) -> ItemPlacementStrategy<ScriptedDraws> {
    ItemPlacementStrategy::new(
        world,
        TARGET,
        Direction::North,
        Some(OwnerId(7)),
        config,
        ScriptedDraws::permille(&[500]),
    )
}

fn commit(amount: i64) -> PlacementRequest {
    PlacementRequest::directional(cobblestone(), amount, Actionable::Commit)
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_initial_state_follows_host() {
    let world = sandbox_with_ground(0);
    let open = mount(&world, PlacementConfig::default());
    assert_eq!(open.state(), PlacementState::Open);
    assert_eq!(open.origin(), CellPos::new(0, 1, -1));
    assert_eq!(open.placement_direction(), Direction::South);

    let blocked = ItemPlacementStrategy::new(
        &world,
        CellPos::new(0, 0, 0),
        Direction::Up,
        None,
        PlacementConfig::default(),
        ScriptedDraws::permille(&[0]),
    );
    assert!(blocked.is_blocked());
}

// =========================================================================
// Invalid requests
// =========================================================================

#[test]
fn test_zero_amount_changes_nothing() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());

    for request in [
        PlacementRequest::directional(cobblestone(), 0, Actionable::Commit),
        PlacementRequest::free_entity(cobblestone(), 0, Actionable::Commit),
        PlacementRequest::directional(cobblestone(), -3, Actionable::Simulate),
    ] {
        let outcome = strategy.place_in_world(&mut world, request).unwrap();
        assert_eq!(outcome.consumed, 0);
        assert_eq!(outcome.status, PlacementStatus::InvalidRequest);
        assert_eq!(strategy.state(), PlacementState::Open);
    }
    assert!(world.placements().is_empty());
    assert!(world.entities().is_empty());
}

#[test]
fn test_zero_amount_keeps_blocked_state() {
    let mut world = sandbox_with_ground(0);
    world.set_material(TARGET, MaterialId::DIRT);
    let mut strategy = mount(&world, PlacementConfig::default());
    assert!(strategy.is_blocked());

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 0, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 0);
    assert!(strategy.is_blocked());
}

#[test]
fn test_zero_stack_size_degenerates_to_nothing() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    let weightless = ResourceKey::item(40, 0);

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(weightless, 10, Actionable::Commit))
        .unwrap();
    assert!(!outcome.worked());
    assert_eq!(outcome.status, PlacementStatus::InvalidRequest);
    assert_eq!(strategy.state(), PlacementState::Open);
    assert!(world.entities().is_empty());
}

#[test]
fn test_fluids_are_rejected() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::directional(water(), 1000, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 0);
    assert_eq!(outcome.status, PlacementStatus::InvalidRequest);
}

// =========================================================================
// Blocked cache
// =========================================================================

#[test]
fn test_blocked_short_circuits_without_queries() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());

    // Placing stone fills the target, so the post-attempt check blocks.
    let first = strategy.place_in_world(&mut world, commit(5)).unwrap();
    assert_eq!(first.consumed, 1);
    assert!(strategy.is_blocked());
    assert_eq!(world.material_at(TARGET), MaterialId::STONE);

    let queries = world.replaceable_queries();
    for _ in 0..5 {
        let outcome = strategy.place_in_world(&mut world, commit(5)).unwrap();
        assert_eq!(outcome.consumed, 0);
        assert_eq!(outcome.status, PlacementStatus::TargetUnavailable);
    }
    assert_eq!(world.replaceable_queries(), queries);
    assert_eq!(world.placements().len(), 1);
}

#[test]
fn test_clear_blocked_requeries() {
    let mut world = sandbox_with_ground(0);
    world.set_material(TARGET, MaterialId::SAND);
    let mut strategy = mount(&world, PlacementConfig::default());
    assert!(strategy.is_blocked());

    // Still occupied: clearing keeps it blocked.
    strategy.clear_blocked(&world);
    assert!(strategy.is_blocked());

    world.set_material(TARGET, MaterialId::AIR);
    strategy.clear_blocked(&world);
    assert_eq!(strategy.state(), PlacementState::Open);

    let outcome = strategy.place_in_world(&mut world, commit(1)).unwrap();
    assert_eq!(outcome.consumed, 1);
}

#[test]
fn test_target_filled_between_calls_blocks() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    world.set_material(TARGET, MaterialId::DIRT);

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 4, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.status, PlacementStatus::TargetUnavailable);
    assert!(strategy.is_blocked());
    assert!(world.entities().is_empty());
}

// =========================================================================
// Free entities
// =========================================================================

#[test]
fn test_free_entity_commit_consumes_clamped_amount() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 100, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 64);
    assert_eq!(outcome.status, PlacementStatus::Placed);
    assert_eq!(strategy.state(), PlacementState::Open);

    let entity = world.entities()[0];
    assert_eq!(entity.stack.count, 64);
    // Drifts south, away from the origin.
    assert!(entity.velocity.z > fixed(0));
    assert!(entity.position.z > fixed(0) && entity.position.z < fixed(1));
}

#[test]
fn test_free_entity_simulate_spawns_nothing() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 10, Actionable::Simulate))
        .unwrap();
    assert_eq!(outcome.consumed, 10);
    assert!(world.entities().is_empty());
}

#[test]
fn test_density_cap_rejects_without_blocking() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default().with_entity_limit(2));
    let request = PlacementRequest::free_entity(cobblestone(), 1, Actionable::Commit);

    assert_eq!(strategy.place_in_world(&mut world, request).unwrap().consumed, 1);
    assert_eq!(strategy.place_in_world(&mut world, request).unwrap().consumed, 1);

    let rejected = strategy.place_in_world(&mut world, request).unwrap();
    assert_eq!(rejected.consumed, 0);
    assert_eq!(rejected.status, PlacementStatus::AdmissionRejected);
    assert_eq!(strategy.state(), PlacementState::Open);
    assert_eq!(world.entities().len(), 2);
}

#[test]
fn test_density_is_counted_around_origin() {
    let mut world = sandbox_with_ground(0);
    let stack = cobblestone().clamped_stack(1);
    // Ten cells south of the target: outside the origin's box, inside the target's.
    let far = Vec3Fixed::new(fixed(0), fixed(1), fixed(9));
    world.add_entity(far, stack);
    let mut strategy = mount(&world, PlacementConfig::default().with_entity_limit(1));

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 1, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 1);
}

#[test]
fn test_density_cap_ignores_directional() {
    let mut world = sandbox_with_ground(0);
    let stack = cobblestone().clamped_stack(1);
    for _ in 0..4 {
        world.add_entity(Vec3Fixed::new(fixed(0), fixed(1), fixed(-1)), stack);
    }
    let mut strategy = mount(&world, PlacementConfig::default().with_entity_limit(1));

    let outcome = strategy.place_in_world(&mut world, commit(3)).unwrap();
    assert_eq!(outcome.consumed, 1);
    assert_eq!(outcome.status, PlacementStatus::Placed);
}

// =========================================================================
// Directional placement
// =========================================================================

#[test]
fn test_directional_simulate_probes_once() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::directional(cobblestone(), 50, Actionable::Simulate))
        .unwrap();
    assert_eq!(outcome.consumed, 1);
    assert!(world.placements().is_empty());
    assert_eq!(world.material_at(TARGET), MaterialId::AIR);
    assert_eq!(strategy.state(), PlacementState::Open);
}

#[test]
fn test_directional_context_reaches_host() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    strategy.place_in_world(&mut world, commit(2)).unwrap();

    let record = world.placements()[0];
    assert_eq!(record.stack.count, 2);
    assert_eq!(record.actor.cell, TARGET);
    assert_eq!(record.actor.facing, Direction::South);
    assert_eq!(record.context.clicked_cell, TARGET);
    assert_eq!(record.context.look_direction, Direction::South);
    assert_eq!(record.context.hit_face, Direction::North);
    assert_eq!(record.context.rotation_degrees, 0);
    assert!(!record.context.secondary_use_active);
}

#[test]
fn test_partial_consumption_from_host() {
    let mut world = sandbox_with_ground(0);
    world.register_placeable(
        seeds().id,
        Placeable {
            material: MaterialId::DIRT,
            units_per_use: 4,
        },
    );
    let mut strategy = mount(&world, PlacementConfig::default());

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::directional(seeds(), 10, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 4);
    assert!(strategy.is_blocked());
}

/// Host reporting a fixed remainder no matter what was used.
struct FixedRemainderHost {
    remaining: i64,
}

impl PlacementHost for FixedRemainderHost {
    fn is_cell_replaceable(&self, _cell: CellPos) -> bool {
        true
    }

    fn count_entities_in_radius(&self, _center: CellPos, _radius: u32) -> u32 {
        0
    }

    fn spawn_free_entity(&mut self, _spawn: FreeEntitySpawn) -> Result<(), HostError> {
        Ok(())
    }

    fn fake_actor(&mut self, _owner: Option<OwnerId>) -> ActorId {
        ActorId(1)
    }

    fn use_resource_on_cell(
        &mut self,
        _actor: &ActorPose,
        _stack: &ItemStack,
        _context: &PlacementContext,
    ) -> Result<i64, HostError> {
        Ok(self.remaining)
    }
}

#[test]
fn test_host_remainder_outside_stack_is_clamped() {
    let cases = [(i64::MIN, 5), (-3, 5), (5, 0), (100, 0), (i64::MAX, 0), (2, 3)];
    for (remaining, expected) in cases {
        let mut host = FixedRemainderHost { remaining };
        let mut strategy = ItemPlacementStrategy::new(
            &host,
            TARGET,
            Direction::North,
            None,
            PlacementConfig::default(),
            ScriptedDraws::permille(&[0]),
        );
        let outcome = strategy.place_in_world(&mut host, commit(5)).unwrap();
        assert_eq!(outcome.consumed, expected, "remaining {remaining}");
        assert_eq!(outcome.status, PlacementStatus::Placed);
    }
}

#[test]
fn test_unusable_item_consumes_nothing_but_stays_open() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    let stick = ResourceKey::item(90, 64);

    let outcome = strategy
        .place_in_world(&mut world, PlacementRequest::directional(stick, 8, Actionable::Commit))
        .unwrap();
    assert_eq!(outcome.consumed, 0);
    assert_eq!(outcome.status, PlacementStatus::Placed);
    assert_eq!(strategy.state(), PlacementState::Open);
}

#[test]
fn test_host_failure_propagates() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = mount(&world, PlacementConfig::default());
    world.fail_next_host_call("chunk unloaded");

    let err = strategy.place_in_world(&mut world, commit(1)).unwrap_err();
    match err {
        CellforgeError::Host(host) => {
            assert_eq!(host.operation, "use_resource_on_cell");
            assert_eq!(host.message, "chunk unloaded");
        }
        other => panic!("unexpected error: {other}"),
    }

    world.fail_next_host_call("entity limit");
    let err = strategy
        .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), 1, Actionable::Commit))
        .unwrap_err();
    assert!(matches!(err, CellforgeError::Host(_)));
}

#[test]
fn test_anonymous_owner_gets_an_actor() {
    let mut world = sandbox_with_ground(0);
    let mut strategy = ItemPlacementStrategy::new(
        &world,
        TARGET,
        Direction::Down,
        None,
        PlacementConfig::default(),
        ScriptedDraws::permille(&[0]),
    );
    strategy.place_in_world(&mut world, commit(1)).unwrap();
    let record = world.placements()[0];
    assert_eq!(record.actor.facing, Direction::Up);
    assert_eq!(record.context.horizontal_direction, Direction::North);
}

proptest! {
    #[test]
    fn prop_simulate_directional_is_one_or_zero(amount in arb_amount(), side in arb_direction()) {
        let mut world = SandboxWorld::new(MaterialId::GRASS);
        let mut strategy = ItemPlacementStrategy::new(
            &world,
            TARGET,
            side,
            None,
            PlacementConfig::default(),
            ScriptedDraws::permille(&[250]),
        );
        let outcome = strategy
            .place_in_world(&mut world, PlacementRequest::directional(cobblestone(), amount, Actionable::Simulate))
            .unwrap();
        prop_assert_eq!(outcome.consumed, i64::from(amount > 0));
        prop_assert!(world.placements().is_empty());
    }

    #[test]
    fn prop_free_entity_commit_consumes_min(amount in 1i64..500, side in arb_direction()) {
        let mut world = SandboxWorld::new(MaterialId::GRASS);
        let mut strategy = ItemPlacementStrategy::new(
            &world,
            TARGET,
            side,
            None,
            PlacementConfig::default(),
            ScriptedDraws::permille(&[125, 875]),
        );
        let outcome = strategy
            .place_in_world(&mut world, PlacementRequest::free_entity(cobblestone(), amount, Actionable::Commit))
            .unwrap();
        prop_assert_eq!(outcome.consumed, amount.min(64));
        prop_assert_eq!(world.entities().len(), 1);
    }

    #[test]
    fn prop_consumption_never_exceeds_request(amount in arb_amount(), free in any::<bool>()) {
        let mut world = SandboxWorld::new(MaterialId::GRASS);
        let mut strategy = ItemPlacementStrategy::new(
            &world,
            TARGET,
            Direction::East,
            None,
            PlacementConfig::default(),
            ScriptedDraws::permille(&[500]),
        );
        let request = PlacementRequest {
            resource: cobblestone(),
            amount,
            mode: Actionable::Commit,
            as_free_entity: free,
        };
        let outcome = strategy.place_in_world(&mut world, request).unwrap();
        prop_assert!(outcome.consumed >= 0);
        prop_assert!(outcome.consumed <= amount.max(0));
    }
}

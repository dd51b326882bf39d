//! Tick-driven placement runs against the sandbox world.
//!
//! One strategy is mounted next to an air cell just above the ground and
//! offered the same request every tick. Optionally the target is cleared
//! every few ticks, standing in for a player mining the placed block, and
//! the strategy is told to re-check it.

use cellforge_core::config::PlacementConfig;
use cellforge_core::error::Result;
use cellforge_core::grid::{CellPos, Direction};
use cellforge_core::host::OwnerId;
use cellforge_core::placement::{
    Actionable, ItemPlacementStrategy, PlacementRequest, PlacementState, PlacementStatus,
};
use cellforge_core::resource::ResourceKey;
use cellforge_core::sandbox::{MaterialId, Placeable, SandboxWorld};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Cell the strategy places into.
pub const TARGET: CellPos = CellPos::new(0, 1, 0);

/// Block item offered every tick.
pub const COBBLESTONE: ResourceKey = ResourceKey::item(1, 64);

/// Parameters of a placement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOptions {
    /// Ticks to run.
    pub ticks: u32,
    /// Amount offered per tick.
    pub amount: i64,
    /// Drop free entities instead of placing blocks.
    pub free_entity: bool,
    /// Only probe.
    pub simulate: bool,
    /// Side of the target the strategy is mounted on.
    pub side: Direction,
    /// Clear a blocked target every this many ticks.
    pub reopen_every: Option<u32>,
    /// Seed for spawn jitter.
    pub seed: u64,
    /// Strategy tuning.
    pub placement: PlacementConfig,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            ticks: 20,
            amount: 16,
            free_entity: false,
            simulate: false,
            side: Direction::North,
            reopen_every: None,
            seed: 12345,
            placement: PlacementConfig::default(),
        }
    }
}

/// Tally of a placement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaceReport {
    /// Ticks run.
    pub ticks: u32,
    /// Total amount consumed.
    pub consumed: i64,
    /// Calls that went through.
    pub placed: u32,
    /// Calls rejected as invalid.
    pub invalid: u32,
    /// Calls that found the target unavailable.
    pub unavailable: u32,
    /// Calls refused by the density cap.
    pub rejected: u32,
    /// Times the target was cleared and re-checked.
    pub reopened: u32,
    /// Free entities in the world afterwards.
    pub entities: usize,
    /// Directional placements the host saw.
    pub host_placements: usize,
    /// Placeability queries the host answered.
    pub replaceable_queries: u32,
    /// Strategy state after the last tick.
    pub final_state: PlacementState,
}

impl PlaceReport {
    fn new(ticks: u32) -> Self {
        Self {
            ticks,
            consumed: 0,
            placed: 0,
            invalid: 0,
            unavailable: 0,
            rejected: 0,
            reopened: 0,
            entities: 0,
            host_placements: 0,
            replaceable_queries: 0,
            final_state: PlacementState::Open,
        }
    }

    fn tally(&mut self, status: PlacementStatus, consumed: i64) {
        self.consumed += consumed;
        match status {
            PlacementStatus::Placed => self.placed += 1,
            PlacementStatus::InvalidRequest => self.invalid += 1,
            PlacementStatus::TargetUnavailable => self.unavailable += 1,
            PlacementStatus::AdmissionRejected => self.rejected += 1,
        }
    }
}

/// Grass world with ground at `y = 0` that turns cobblestone into stone.
#[must_use]
pub fn sandbox() -> SandboxWorld {
    let mut world = SandboxWorld::new(MaterialId::GRASS).with_ground(0);
    world.register_placeable(
        COBBLESTONE.id,
        Placeable {
            material: MaterialId::STONE,
            units_per_use: 1,
        },
    );
    world
}

/// Run a placement strategy for `options.ticks` ticks.
///
/// Host failures abort the run.
pub fn run_placement(options: &PlaceOptions) -> Result<PlaceReport> {
    options.placement.validate()?;

    let mut world = sandbox();
    let mut strategy = ItemPlacementStrategy::new(
        &world,
        TARGET,
        options.side,
        Some(OwnerId(1)),
        options.placement,
        StdRng::seed_from_u64(options.seed),
    );

    let mode = if options.simulate {
        Actionable::Simulate
    } else {
        Actionable::Commit
    };
    let request = if options.free_entity {
        PlacementRequest::free_entity(COBBLESTONE, options.amount, mode)
    } else {
        PlacementRequest::directional(COBBLESTONE, options.amount, mode)
    };

    let mut report = PlaceReport::new(options.ticks);
    for tick in 0..options.ticks {
        if let Some(every) = options.reopen_every.filter(|n| *n > 0) {
            if tick > 0 && tick % every == 0 && strategy.is_blocked() {
                world.set_material(TARGET, MaterialId::AIR);
                strategy.clear_blocked(&world);
                report.reopened += 1;
                tracing::debug!(tick, "Cleared placement target");
            }
        }

        let outcome = strategy.place_in_world(&mut world, request)?;
        report.tally(outcome.status, outcome.consumed);
    }

    report.entities = world.entities().len();
    report.host_placements = world.placements().len();
    report.replaceable_queries = world.replaceable_queries();
    report.final_state = strategy.state();

    tracing::info!(
        ticks = options.ticks,
        consumed = report.consumed,
        final_state = ?report.final_state,
        "Placement run finished"
    );
    Ok(report)
}

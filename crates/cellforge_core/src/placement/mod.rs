//! Bounded placement of resources into one adjacent cell.
//!
//! An [`ItemPlacementStrategy`] is mounted on an origin cell and deposits
//! into the single target cell next to it, either as a free-floating entity
//! or as a directional placement performed by a surrogate actor. It reports
//! exactly how much of the requested amount it consumed.
//!
//! The strategy caches whether the target is blocked. Once an attempt finds
//! the target non-replaceable, every later call returns zero without asking
//! the host again, until the host calls
//! [`clear_blocked`](ItemPlacementStrategy::clear_blocked).

mod context;
mod spawn;

pub use context::{looking_order, PlacementContext};
pub use spawn::free_entity_spawn;

use serde::{Deserialize, Serialize};

use crate::config::PlacementConfig;
use crate::error::Result;
use crate::grid::{CellPos, Direction};
use crate::host::{ActorPose, OwnerId, PlacementHost};
use crate::random::RandomSource;
use crate::resource::{ItemStack, ResourceKey};

/// Whether an operation only probes or actually mutates the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actionable {
    /// Report what would happen.
    Simulate,
    /// Perform the placement.
    Commit,
}

/// One call's worth of placement input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// What to place.
    pub resource: ResourceKey,
    /// How much the caller offers.
    pub amount: i64,
    /// Probe or commit.
    pub mode: Actionable,
    /// Drop as a free-floating entity instead of placing directionally.
    pub as_free_entity: bool,
}

impl PlacementRequest {
    /// Directional placement request.
    #[must_use]
    pub const fn directional(resource: ResourceKey, amount: i64, mode: Actionable) -> Self {
        Self {
            resource,
            amount,
            mode,
            as_free_entity: false,
        }
    }

    /// Free-entity placement request.
    #[must_use]
    pub const fn free_entity(resource: ResourceKey, amount: i64, mode: Actionable) -> Self {
        Self {
            resource,
            amount,
            mode,
            as_free_entity: true,
        }
    }
}

/// Why a call consumed what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementStatus {
    /// The attempt went through. Consumption may still be zero when the
    /// host used none of the stack.
    Placed,
    /// Non-positive amount, zero stack size, or unsupported resource.
    InvalidRequest,
    /// The target cell does not accept placement.
    TargetUnavailable,
    /// Too many free entities nearby; try again later.
    AdmissionRejected,
}

/// Result of one placement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementOutcome {
    /// Amount taken from the request, never more than requested.
    pub consumed: i64,
    /// Classification of the call.
    pub status: PlacementStatus,
}

impl PlacementOutcome {
    const fn nothing(status: PlacementStatus) -> Self {
        Self { consumed: 0, status }
    }

    const fn placed(consumed: i64) -> Self {
        Self {
            consumed,
            status: PlacementStatus::Placed,
        }
    }

    /// Whether anything was consumed.
    #[must_use]
    pub const fn worked(&self) -> bool {
        self.consumed > 0
    }
}

/// Cached placeability of the target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlacementState {
    /// The target accepted placement when last checked.
    #[default]
    Open,
    /// The target refused placement; calls short-circuit.
    Blocked,
}

impl PlacementState {
    /// State matching a placeability query.
    #[must_use]
    pub const fn from_replaceable(replaceable: bool) -> Self {
        if replaceable {
            Self::Open
        } else {
            Self::Blocked
        }
    }
}

/// Places items into the cell in front of a mounted origin.
#[derive(Debug, Clone)]
pub struct ItemPlacementStrategy<R> {
    target: CellPos,
    side: Direction,
    owner: Option<OwnerId>,
    config: PlacementConfig,
    state: PlacementState,
    rng: R,
}

impl<R: RandomSource> ItemPlacementStrategy<R> {
    /// Mount a strategy placing into `target`.
    ///
    /// `side` points from the target back to the origin the strategy is
    /// mounted on. The initial state reflects an immediate host query.
    pub fn new<H>(
        host: &H,
        target: CellPos,
        side: Direction,
        owner: Option<OwnerId>,
        config: PlacementConfig,
        rng: R,
    ) -> Self
    where
        H: PlacementHost + ?Sized,
    {
        let state = PlacementState::from_replaceable(host.is_cell_replaceable(target));
        Self {
            target,
            side,
            owner,
            config,
            state,
            rng,
        }
    }

    /// Cell placed into.
    #[must_use]
    pub const fn target(&self) -> CellPos {
        self.target
    }

    /// Cell the strategy is mounted on.
    #[must_use]
    pub const fn origin(&self) -> CellPos {
        self.target.relative(self.side)
    }

    /// Direction placements travel, from origin to target.
    #[must_use]
    pub const fn placement_direction(&self) -> Direction {
        self.side.opposite()
    }

    /// Current cached state.
    #[must_use]
    pub const fn state(&self) -> PlacementState {
        self.state
    }

    /// Whether calls currently short-circuit.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self.state, PlacementState::Blocked)
    }

    /// Re-query the target, e.g. after a neighbouring cell changed.
    pub fn clear_blocked<H>(&mut self, host: &H)
    where
        H: PlacementHost + ?Sized,
    {
        self.refresh(host);
    }

    /// Try to place up to `request.amount` of `request.resource`.
    ///
    /// Soft failures return zero consumption; only host callback failures
    /// are errors.
    pub fn place_in_world<H>(&mut self, host: &mut H, request: PlacementRequest) -> Result<PlacementOutcome>
    where
        H: PlacementHost + ?Sized,
    {
        if self.is_blocked() {
            return Ok(PlacementOutcome::nothing(PlacementStatus::TargetUnavailable));
        }
        if request.amount <= 0 || !request.resource.is_item() {
            return Ok(PlacementOutcome::nothing(PlacementStatus::InvalidRequest));
        }

        let stack = request.resource.clamped_stack(request.amount);
        if stack.is_empty() {
            return Ok(PlacementOutcome::nothing(PlacementStatus::InvalidRequest));
        }

        if !host.is_cell_replaceable(self.target) {
            self.transition(PlacementState::Blocked);
            return Ok(PlacementOutcome::nothing(PlacementStatus::TargetUnavailable));
        }

        let outcome = if request.as_free_entity {
            self.place_free_entity(host, stack, request.mode)?
        } else {
            self.place_directional(host, stack, request.mode)?
        };

        self.refresh(host);
        Ok(outcome)
    }

    fn place_free_entity<H>(&mut self, host: &mut H, stack: ItemStack, mode: Actionable) -> Result<PlacementOutcome>
    where
        H: PlacementHost + ?Sized,
    {
        let origin = self.origin();
        let nearby = host.count_entities_in_radius(origin, self.config.neighborhood_radius);
        if nearby >= self.config.entity_limit {
            tracing::debug!(
                ?origin,
                nearby,
                limit = self.config.entity_limit,
                "Free entity placement rejected by density cap"
            );
            return Ok(PlacementOutcome::nothing(PlacementStatus::AdmissionRejected));
        }

        if mode == Actionable::Commit {
            let dimensions = host.free_entity_dimensions(&stack.resource);
            let spawn = free_entity_spawn(origin, self.placement_direction(), dimensions, stack, &mut self.rng);
            host.spawn_free_entity(spawn)?;
        }

        Ok(PlacementOutcome::placed(stack.count))
    }

    fn place_directional<H>(&mut self, host: &mut H, stack: ItemStack, mode: Actionable) -> Result<PlacementOutcome>
    where
        H: PlacementHost + ?Sized,
    {
        if mode == Actionable::Simulate {
            return Ok(PlacementOutcome::placed(1));
        }

        let look = self.placement_direction();
        let actor = ActorPose {
            actor: host.fake_actor(self.owner),
            cell: self.target,
            facing: look,
        };
        let context = PlacementContext::new(self.target, look);
        let remaining = host.use_resource_on_cell(&actor, &stack, &context)?;

        Ok(PlacementOutcome::placed(stack.count.saturating_sub(remaining).clamp(0, stack.count)))
    }

    fn refresh<H>(&mut self, host: &H)
    where
        H: PlacementHost + ?Sized,
    {
        self.transition(PlacementState::from_replaceable(host.is_cell_replaceable(self.target)));
    }

    fn transition(&mut self, state: PlacementState) {
        if state != self.state {
            tracing::debug!(target_cell = ?self.target, from = ?self.state, to = ?state, "Placement target state changed");
        }
        self.state = state;
    }
}

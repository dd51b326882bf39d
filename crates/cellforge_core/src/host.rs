//! Capabilities the core needs from the host world.
//!
//! The core never owns the grid. Each call borrows the host for the duration
//! of one operation; the host guarantees exclusive access during its tick
//! callback, so no locking happens here.

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::grid::{CellPos, Direction};
use crate::math::{fixed_serde, ratio, Fixed, Vec3Fixed};
use crate::placement::PlacementContext;
use crate::resource::{ItemStack, ResourceKey};
use crate::substitution::MaterialOutcome;

/// Identity of whoever owns a placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub u128);

/// Host-side surrogate actor used for directional placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Where a surrogate actor stands and which way it faces while placing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPose {
    /// The actor.
    pub actor: ActorId,
    /// Cell the actor is considered to stand in.
    pub cell: CellPos,
    /// Facing direction.
    pub facing: Direction,
}

/// Bounding box of a free-floating entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDimensions {
    /// Horizontal extent.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Vertical extent.
    #[serde(with = "fixed_serde")]
    pub height: Fixed,
}

impl EntityDimensions {
    /// Footprint of a dropped item (0.25 x 0.25).
    #[must_use]
    pub fn item() -> Self {
        Self {
            width: ratio(1, 4),
            height: ratio(1, 4),
        }
    }
}

/// A free-floating entity the host is asked to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeEntitySpawn {
    /// Absolute position.
    pub position: Vec3Fixed,
    /// Initial velocity in cells per tick.
    pub velocity: Vec3Fixed,
    /// Stack carried by the entity.
    pub stack: ItemStack,
}

/// Host capabilities used by the substitution engine.
pub trait SubstitutionHost {
    /// Host material handle.
    type Material: Clone;

    /// Surface material of the region around `cell`.
    ///
    /// Queried once when a policy is bound to a location and then cached.
    fn surface_material_at(&self, cell: CellPos) -> Self::Material;

    /// Write a resolved outcome into `cell`. Fire-and-forget.
    fn put_material(&mut self, cell: CellPos, outcome: &MaterialOutcome<Self::Material>);
}

/// Host capabilities used by the placement strategy.
pub trait PlacementHost {
    /// Whether `cell` currently accepts placement.
    fn is_cell_replaceable(&self, cell: CellPos) -> bool;

    /// Number of free-floating entities within `radius` cells of `center`.
    fn count_entities_in_radius(&self, center: CellPos, radius: u32) -> u32;

    /// Footprint of the entity that would carry `resource`.
    fn free_entity_dimensions(&self, _resource: &ResourceKey) -> EntityDimensions {
        EntityDimensions::item()
    }

    /// Create a free-floating entity.
    fn spawn_free_entity(&mut self, spawn: FreeEntitySpawn) -> Result<(), HostError>;

    /// Surrogate actor bound to `owner`, or an anonymous one.
    fn fake_actor(&mut self, owner: Option<OwnerId>) -> ActorId;

    /// Use `stack` on the cell described by `context` as `actor`.
    ///
    /// Returns how many units of the stack remain afterwards.
    fn use_resource_on_cell(
        &mut self,
        actor: &ActorPose,
        stack: &ItemStack,
        context: &PlacementContext,
    ) -> Result<i64, HostError>;
}

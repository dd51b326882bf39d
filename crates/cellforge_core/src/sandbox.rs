//! In-memory host world.
//!
//! `SandboxWorld` implements both host traits over a sparse cell map. It is
//! what the CLI paints and places into, and what tests use to observe host
//! traffic: it counts placeability queries, records every directional
//! placement context, and can be told to fail its next mutating callback.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::grid::CellPos;
use crate::host::{ActorId, ActorPose, FreeEntitySpawn, OwnerId, PlacementHost, SubstitutionHost};
use crate::math::{Fixed, Vec3Fixed};
use crate::placement::PlacementContext;
use crate::resource::{ItemStack, ResourceId};
use crate::substitution::MaterialOutcome;

/// Sandbox material identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u16);

impl MaterialId {
    /// Empty cell.
    pub const AIR: Self = Self(0);
    /// Bedrock-like filler under the surface.
    pub const STONE: Self = Self(1);
    /// Dirt.
    pub const DIRT: Self = Self(2);
    /// Grass surface.
    pub const GRASS: Self = Self(3);
    /// Sand surface.
    pub const SAND: Self = Self(4);
    /// Snow cover.
    pub const SNOW: Self = Self(5);
    /// Ice.
    pub const ICE: Self = Self(6);
    /// Meteorite stone.
    pub const SKY_STONE: Self = Self(7);

    /// Whether placement may overwrite this material.
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        self.0 == Self::AIR.0
    }

    /// Short display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "air",
            1 => "stone",
            2 => "dirt",
            3 => "grass",
            4 => "sand",
            5 => "snow",
            6 => "ice",
            7 => "sky_stone",
            _ => "custom",
        }
    }
}

/// How directional use of an item changes the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeable {
    /// Material written into the target.
    pub material: MaterialId,
    /// Units used per placement (seeds plant one at a time).
    pub units_per_use: i64,
}

/// A free-floating entity living in the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SandboxEntity {
    /// Position.
    pub position: Vec3Fixed,
    /// Velocity.
    pub velocity: Vec3Fixed,
    /// Carried stack.
    pub stack: ItemStack,
}

/// A directional placement as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRecord {
    /// Acting surrogate.
    pub actor: ActorPose,
    /// Stack handed over.
    pub stack: ItemStack,
    /// Context handed over.
    pub context: PlacementContext,
}

/// Sparse in-memory world.
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    cells: BTreeMap<CellPos, MaterialId>,
    ground_level: Option<i32>,
    surface: MaterialId,
    entities: Vec<SandboxEntity>,
    placeables: BTreeMap<ResourceId, Placeable>,
    actors: BTreeMap<Option<OwnerId>, ActorId>,
    placements: Vec<PlacementRecord>,
    pending_failure: Option<String>,
    replaceable_queries: Cell<u32>,
    surface_queries: Cell<u32>,
}

impl SandboxWorld {
    /// Empty world (all air) whose regions report `surface` as their top
    /// material.
    #[must_use]
    pub fn new(surface: MaterialId) -> Self {
        Self {
            cells: BTreeMap::new(),
            ground_level: None,
            surface,
            entities: Vec::new(),
            placeables: BTreeMap::new(),
            actors: BTreeMap::new(),
            placements: Vec::new(),
            pending_failure: None,
            replaceable_queries: Cell::new(0),
            surface_queries: Cell::new(0),
        }
    }

    /// Fill everything at or below `level`: the surface material on top,
    /// stone underneath.
    #[must_use]
    pub fn with_ground(mut self, level: i32) -> Self {
        self.ground_level = Some(level);
        self
    }

    /// Material currently in `cell`.
    #[must_use]
    pub fn material_at(&self, cell: CellPos) -> MaterialId {
        if let Some(material) = self.cells.get(&cell) {
            return *material;
        }
        match self.ground_level {
            Some(level) if cell.y == level => self.surface,
            Some(level) if cell.y < level => MaterialId::STONE,
            _ => MaterialId::AIR,
        }
    }

    /// Overwrite `cell`.
    pub fn set_material(&mut self, cell: CellPos, material: MaterialId) {
        self.cells.insert(cell, material);
    }

    /// Register how directional use of `resource` behaves.
    pub fn register_placeable(&mut self, resource: ResourceId, placeable: Placeable) {
        self.placeables.insert(resource, placeable);
    }

    /// Drop an entity directly, bypassing any strategy.
    pub fn add_entity(&mut self, position: Vec3Fixed, stack: ItemStack) {
        self.entities.push(SandboxEntity {
            position,
            velocity: Vec3Fixed::ZERO,
            stack,
        });
    }

    /// Make the next `spawn_free_entity` or `use_resource_on_cell` fail.
    pub fn fail_next_host_call(&mut self, message: impl Into<String>) {
        self.pending_failure = Some(message.into());
    }

    /// Free entities in spawn order.
    #[must_use]
    pub fn entities(&self) -> &[SandboxEntity] {
        &self.entities
    }

    /// Directional placements in call order.
    #[must_use]
    pub fn placements(&self) -> &[PlacementRecord] {
        &self.placements
    }

    /// Number of `is_cell_replaceable` calls so far.
    #[must_use]
    pub fn replaceable_queries(&self) -> u32 {
        self.replaceable_queries.get()
    }

    /// Number of `surface_material_at` calls so far.
    #[must_use]
    pub fn surface_queries(&self) -> u32 {
        self.surface_queries.get()
    }

    /// Explicitly written cells, in coordinate order.
    pub fn written_cells(&self) -> impl Iterator<Item = (CellPos, MaterialId)> + '_ {
        self.cells.iter().map(|(cell, material)| (*cell, *material))
    }

    /// Hash of the written cells and entities.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cells.hash(&mut hasher);
        self.entities.hash(&mut hasher);
        hasher.finish()
    }

    fn take_failure(&mut self, operation: &'static str) -> Result<(), HostError> {
        match self.pending_failure.take() {
            Some(message) => Err(HostError::new(operation, message)),
            None => Ok(()),
        }
    }
}

impl SubstitutionHost for SandboxWorld {
    type Material = MaterialId;

    fn surface_material_at(&self, _cell: CellPos) -> MaterialId {
        self.surface_queries.set(self.surface_queries.get() + 1);
        self.surface
    }

    fn put_material(&mut self, cell: CellPos, outcome: &MaterialOutcome<MaterialId>) {
        let material = match outcome {
            MaterialOutcome::CopiedSurfaceMaterial(material) | MaterialOutcome::Custom(material) => *material,
            MaterialOutcome::Air => MaterialId::AIR,
            MaterialOutcome::Snow => MaterialId::SNOW,
            MaterialOutcome::Ice => MaterialId::ICE,
        };
        self.set_material(cell, material);
    }
}

impl PlacementHost for SandboxWorld {
    fn is_cell_replaceable(&self, cell: CellPos) -> bool {
        self.replaceable_queries.set(self.replaceable_queries.get() + 1);
        self.material_at(cell).is_replaceable()
    }

    fn count_entities_in_radius(&self, center: CellPos, radius: u32) -> u32 {
        let r = i64::from(radius);
        let within = |value: Fixed, base: i32| {
            let low = Fixed::from_num(i64::from(base) - r);
            let high = Fixed::from_num(i64::from(base) + 1 + r);
            value >= low && value <= high
        };
        let count = self
            .entities
            .iter()
            .filter(|entity| {
                within(entity.position.x, center.x)
                    && within(entity.position.y, center.y)
                    && within(entity.position.z, center.z)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn spawn_free_entity(&mut self, spawn: FreeEntitySpawn) -> Result<(), HostError> {
        self.take_failure("spawn_free_entity")?;
        self.entities.push(SandboxEntity {
            position: spawn.position,
            velocity: spawn.velocity,
            stack: spawn.stack,
        });
        Ok(())
    }

    fn fake_actor(&mut self, owner: Option<OwnerId>) -> ActorId {
        let next = ActorId(u64::try_from(self.actors.len()).unwrap_or(u64::MAX).saturating_add(1));
        *self.actors.entry(owner).or_insert(next)
    }

    fn use_resource_on_cell(
        &mut self,
        actor: &ActorPose,
        stack: &ItemStack,
        context: &PlacementContext,
    ) -> Result<i64, HostError> {
        self.take_failure("use_resource_on_cell")?;
        self.placements.push(PlacementRecord {
            actor: *actor,
            stack: *stack,
            context: *context,
        });

        let Some(placeable) = self.placeables.get(&stack.resource.id).copied() else {
            return Ok(stack.count);
        };
        if !self.material_at(context.clicked_cell).is_replaceable() {
            return Ok(stack.count);
        }

        self.set_material(context.clicked_cell, placeable.material);
        Ok((stack.count - placeable.units_per_use).max(0))
    }
}

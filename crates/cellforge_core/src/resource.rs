//! Resources that a placement strategy can deposit.

use serde::{Deserialize, Serialize};

/// Unique identifier of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Broad category of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Discrete, stackable units.
    Item,
    /// Continuous quantities.
    Fluid,
}

/// Identity of a resource plus the properties placement needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Resource type.
    pub id: ResourceId,
    /// Category; only items can be placed by the item strategy.
    pub kind: ResourceKind,
    /// Largest quantity a single stack may hold.
    pub max_stack_size: u32,
}

impl ResourceKey {
    /// Create an item resource.
    #[must_use]
    pub const fn item(id: u32, max_stack_size: u32) -> Self {
        Self {
            id: ResourceId(id),
            kind: ResourceKind::Item,
            max_stack_size,
        }
    }

    /// Create a fluid resource.
    #[must_use]
    pub const fn fluid(id: u32) -> Self {
        Self {
            id: ResourceId(id),
            kind: ResourceKind::Fluid,
            max_stack_size: 0,
        }
    }

    /// Whether this is an item resource.
    #[must_use]
    pub const fn is_item(&self) -> bool {
        matches!(self.kind, ResourceKind::Item)
    }

    /// Build a stack of at most one full stack from `amount`.
    #[must_use]
    pub fn clamped_stack(self, amount: i64) -> ItemStack {
        let count = amount.clamp(0, i64::from(self.max_stack_size));
        ItemStack {
            resource: self,
            count,
        }
    }
}

/// A quantity of one resource handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// What the stack holds.
    pub resource: ResourceKey,
    /// How many units.
    pub count: i64,
}

impl ItemStack {
    /// Whether the stack holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

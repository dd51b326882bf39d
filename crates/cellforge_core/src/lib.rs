//! # Cellforge Core
//!
//! Stochastic cell substitution and bounded placement for tick-driven
//! grid worlds.
//!
//! This crate contains **only** host-independent logic:
//! - No rendering
//! - No IO
//! - No global randomness (callers thread a [`random::RandomSource`])
//! - No floating-point math (uses fixed-point)
//!
//! The world itself belongs to the host. The core queries and mutates it
//! through the narrow traits in [`host`], one synchronous call at a time.
//!
//! ## Crate Structure
//!
//! - [`substitution`] - Banded substitution policies and their engine
//! - [`fallout`] - Crater fallout presets built on substitution policies
//! - [`placement`] - Bounded placement strategy state machine
//! - [`host`] - Host capability traits
//! - [`sandbox`] - In-memory host world
//! - [`config`] - RON-loadable configuration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod fallout;
pub mod grid;
pub mod host;
pub mod math;
pub mod placement;
pub mod random;
pub mod resource;
pub mod sandbox;
pub mod substitution;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CellforgeConfig, PaintConfig, PlacementConfig};
    pub use crate::error::{CellforgeError, HostError, Result};
    pub use crate::fallout::{Fallout, FalloutKind, FalloutLayer, PaintSummary};
    pub use crate::grid::{CellPos, Direction};
    pub use crate::host::{OwnerId, PlacementHost, SubstitutionHost};
    pub use crate::math::{Fixed, Threshold, Vec3Fixed};
    pub use crate::placement::{
        Actionable, ItemPlacementStrategy, PlacementContext, PlacementOutcome, PlacementRequest,
        PlacementState, PlacementStatus,
    };
    pub use crate::random::RandomSource;
    pub use crate::resource::{ItemStack, ResourceKey, ResourceKind};
    pub use crate::sandbox::{MaterialId, SandboxWorld};
    pub use crate::substitution::{
        Band, CellSubstitutionEngine, MaterialOutcome, Substitute, SubstitutionPolicy,
    };
}

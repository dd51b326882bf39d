//! Test fixtures and helpers.
//!
//! Pre-built worlds, resources and random sources for consistent testing.

use cellforge_core::grid::CellPos;
use cellforge_core::math::{Fixed, Threshold};
use cellforge_core::random::RandomSource;
use cellforge_core::resource::ResourceKey;
use cellforge_core::sandbox::{MaterialId, Placeable, SandboxWorld};
use fixed::types::I32F32;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Exact draw value for a permille, e.g. `draw(750)` is 0.75.
#[must_use]
pub fn draw(permille: u16) -> Fixed {
    Threshold::from_permille(permille).as_fixed()
}

/// Random source replaying a fixed script of draws.
///
/// Wraps around when the script runs out, so a one-element script is a
/// constant source.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<Fixed>,
    next: usize,
}

impl ScriptedDraws {
    /// Replay `draws` in order.
    #[must_use]
    pub fn new(draws: Vec<Fixed>) -> Self {
        Self { draws, next: 0 }
    }

    /// Replay the given permille values in order.
    #[must_use]
    pub fn permille(values: &[u16]) -> Self {
        Self::new(values.iter().copied().map(draw).collect())
    }

    /// Number of draws taken so far.
    #[must_use]
    pub fn taken(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> Fixed {
        if self.draws.is_empty() {
            return Fixed::ZERO;
        }
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        value
    }
}

/// Seeded generator for reproducible runs.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Placeable block item: one use places the whole stack's first unit.
#[must_use]
pub fn cobblestone() -> ResourceKey {
    ResourceKey::item(1, 64)
}

/// Plantable item that only uses one unit per placement.
#[must_use]
pub fn seeds() -> ResourceKey {
    ResourceKey::item(2, 64)
}

/// A fluid, which the item strategy refuses.
#[must_use]
pub fn water() -> ResourceKey {
    ResourceKey::fluid(100)
}

/// Grass world with ground at `level`, knowing how to place
/// [`cobblestone`] and [`seeds`].
#[must_use]
pub fn sandbox_with_ground(level: i32) -> SandboxWorld {
    let mut world = SandboxWorld::new(MaterialId::GRASS).with_ground(level);
    world.register_placeable(
        cobblestone().id,
        Placeable {
            material: MaterialId::STONE,
            units_per_use: 1,
        },
    );
    world.register_placeable(
        seeds().id,
        Placeable {
            material: MaterialId::DIRT,
            units_per_use: 1,
        },
    );
    world
}

/// Cells of a flat disc of `radius` centred on `center`.
#[must_use]
pub fn disc(center: CellPos, radius: i32) -> Vec<CellPos> {
    let limit = i64::from(radius) * i64::from(radius);
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            if i64::from(dx) * i64::from(dx) + i64::from(dz) * i64::from(dz) <= limit {
                cells.push(CellPos::new(center.x + dx, center.y, center.z + dz));
            }
        }
    }
    cells
}

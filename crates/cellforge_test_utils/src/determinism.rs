//! Determinism testing utilities.
//!
//! Provides a harness for verifying that painting and placement produce
//! identical results given identical seeds.
//!
//! # Testing Strategy
//!
//! Worlds painted from the same seed must come out cell-for-cell identical.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: thresholds and spawn offsets use fixed-point
//!   arithmetic via [`cellforge_core::math::Fixed`].
//!
//! - **HashMap iteration order**: the sandbox keeps cells in a `BTreeMap`.
//!
//! - **System randomness**: every draw comes from an explicitly seeded
//!   [`cellforge_core::random::RandomSource`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use cellforge_core::fallout::{Fallout, FalloutKind, FalloutLayer};
use cellforge_core::grid::CellPos;
use cellforge_core::sandbox::SandboxWorld;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::fixtures::{disc, sandbox_with_ground};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Runs are non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `ticks` - Number of ticks to step per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Paint a crater disc `runs` times from `seed` and compare world hashes.
///
/// Each tick paints one layer of the crater: the fall layer first, then
/// the inset layer one cell lower, alternating.
pub fn verify_paint_determinism(kind: FalloutKind, seed: u64, radius: i32, runs: usize) -> DeterminismResult {
    struct PaintRun {
        world: SandboxWorld,
        rng: StdRng,
        tick: u64,
    }

    verify_determinism(
        runs,
        2,
        || PaintRun {
            world: sandbox_with_ground(0),
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        },
        |run| {
            let fallout = Fallout::new(kind, &run.world, CellPos::default());
            let (layer, y) = if run.tick % 2 == 0 {
                (FalloutLayer::Fall, 0)
            } else {
                (FalloutLayer::Inset, -1)
            };
            let cells = disc(CellPos::new(0, y, 0), radius);
            fallout.paint_cells(&mut run.world, cells, &mut run.rng, layer);
            run.tick += 1;
        },
        |run| run.world.state_hash(),
    )
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for substitution and placement testing.
pub mod strategies {
    use cellforge_core::grid::Direction;
    use cellforge_core::math::{Fixed, Threshold};
    use cellforge_core::substitution::{Band, Substitute, SubstitutionPolicy};
    use proptest::prelude::*;

    /// Generate a draw in `[0, 1)` at full fixed-point resolution.
    pub fn arb_draw() -> impl Strategy<Value = Fixed> {
        any::<u32>().prop_map(|bits| Fixed::from_bits(i64::from(bits)))
    }

    /// Generate a draw on the permille grid, including exact band edges.
    pub fn arb_permille_draw() -> impl Strategy<Value = Fixed> {
        (0u16..1000u16).prop_map(|p| Threshold::from_permille(p).as_fixed())
    }

    /// Generate any of the six directions.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        proptest::sample::select(Direction::ALL.to_vec())
    }

    /// Generate a requested amount, including non-positive ones.
    pub fn arb_amount() -> impl Strategy<Value = i64> {
        -8i64..200i64
    }

    /// Generate a built-in (non-custom) substitute.
    pub fn arb_substitute() -> impl Strategy<Value = Substitute<u16>> {
        prop_oneof![
            Just(Substitute::CopySurface),
            Just(Substitute::Air),
            Just(Substitute::Snow),
            Just(Substitute::Ice),
            any::<u16>().prop_map(Substitute::Custom),
        ]
    }

    /// Generate a valid single-link policy of up to `max_bands` bands.
    pub fn arb_policy(max_bands: usize) -> impl Strategy<Value = SubstitutionPolicy<u16>> {
        proptest::collection::btree_set(0u16..=1000u16, 0..=max_bands)
            .prop_flat_map(|bounds| {
                let len = bounds.len();
                (Just(bounds), proptest::collection::vec(arb_substitute(), len))
            })
            .prop_filter_map("valid policy", |(bounds, outcomes)| {
                let bands = bounds
                    .into_iter()
                    .rev()
                    .zip(outcomes)
                    .map(|(bound, outcome)| Band::new(bound, outcome))
                    .collect();
                SubstitutionPolicy::new(bands).ok()
            })
    }
}

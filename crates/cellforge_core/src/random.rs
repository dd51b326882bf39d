//! Uniform random draws for substitution and spawn jitter.
//!
//! The core never owns a global generator. Callers thread a source through
//! explicitly; seeding it is how a caller gets deterministic replay.

use rand::RngCore;

use crate::math::Fixed;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> Fixed;
}

/// Any `rand` generator is a random source: 32 random bits become the
/// fractional part of the draw.
impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> Fixed {
        Fixed::from_bits(i64::from(self.next_u32()))
    }
}

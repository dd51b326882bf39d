//! Fixed-point math utilities for deterministic resolution.
//!
//! Draws, thresholds, spawn offsets and velocities all use fixed-point
//! arithmetic so that a seeded run produces bit-identical results on every
//! platform. Floating-point operations can produce different results on
//! different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Build `numerator / denominator` as a fixed-point value.
///
/// Used for the decimal constants (0.525, 0.1, ...) that cannot be written
/// as `const` fixed-point literals.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// A probability threshold in permille (0..=1000).
///
/// Serialized as a plain integer so RON policies stay readable; compared
/// against draws as [`Fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Threshold(u16);

impl Threshold {
    /// Largest representable threshold (1.0).
    pub const ONE: Self = Self(1000);

    /// Threshold of 0.0.
    pub const ZERO: Self = Self(0);

    /// Create a threshold from permille. Values above 1000 are clamped.
    #[must_use]
    pub const fn from_permille(permille: u16) -> Self {
        if permille > 1000 {
            Self(1000)
        } else {
            Self(permille)
        }
    }

    /// Threshold holding `permille` as given, even above 1000.
    pub(crate) const fn from_permille_unchecked(permille: u16) -> Self {
        Self(permille)
    }

    /// Permille value.
    #[must_use]
    pub const fn permille(self) -> u16 {
        self.0
    }

    /// Threshold as a fixed-point fraction.
    #[must_use]
    pub fn as_fixed(self) -> Fixed {
        ratio(i32::from(self.0), 1000)
    }
}

impl TryFrom<u16> for Threshold {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value > 1000 {
            Err(format!("threshold {value} exceeds 1000 permille"))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Threshold> for u16 {
    fn from(value: Threshold) -> Self {
        value.0
    }
}

/// Fixed-point 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Z coordinate.
    #[serde(with = "fixed_serde")]
    pub z: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec3Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };

    /// Scale every component by `factor`.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

impl std::ops::Add for Vec3Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vec3Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

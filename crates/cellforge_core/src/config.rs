//! Configuration for placement and painting.
//!
//! All structs deserialize from RON. This module only parses text; reading
//! files is left to the caller.
//!
//! # Example RON
//!
//! ```ron
//! CellforgeConfig(
//!     placement: (
//!         entity_limit: 128,
//!         neighborhood_radius: 8,
//!     ),
//!     paint: (
//!         kind: Snow,
//!         seed: 12345,
//!         radius: 6,
//!     ),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CellforgeError, Result};
use crate::fallout::FalloutKind;

/// Default cap on free entities around a placement origin.
pub const DEFAULT_ENTITY_LIMIT: u32 = 128;

/// Default radius, in cells, of the density check.
pub const DEFAULT_NEIGHBORHOOD_RADIUS: u32 = 8;

/// Placement strategy tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Free-entity placement stops once this many entities are nearby.
    pub entity_limit: u32,
    /// Radius of the neighbourhood counted for the entity limit.
    pub neighborhood_radius: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            entity_limit: DEFAULT_ENTITY_LIMIT,
            neighborhood_radius: DEFAULT_NEIGHBORHOOD_RADIUS,
        }
    }
}

impl PlacementConfig {
    /// Set the entity limit.
    #[must_use]
    pub const fn with_entity_limit(mut self, limit: u32) -> Self {
        self.entity_limit = limit;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.entity_limit == 0 {
            return Err(CellforgeError::InvalidConfig(
                "placement.entity_limit must be greater than 0".into(),
            ));
        }
        if self.neighborhood_radius == 0 {
            return Err(CellforgeError::InvalidConfig(
                "placement.neighborhood_radius must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Largest crater radius accepted by [`PaintConfig::validate`].
pub const MAX_PAINT_RADIUS: u32 = 1024;

/// Crater painting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Fallout preset.
    pub kind: FalloutKind,
    /// Seed for the painting pass.
    pub seed: u64,
    /// Crater radius in cells.
    pub radius: u32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            kind: FalloutKind::Copy,
            seed: 12345,
            radius: 6,
        }
    }
}

impl PaintConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(CellforgeError::InvalidConfig("paint.radius must be greater than 0".into()));
        }
        if self.radius > MAX_PAINT_RADIUS {
            return Err(CellforgeError::InvalidConfig(format!(
                "paint.radius must be at most {MAX_PAINT_RADIUS}, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CellforgeConfig {
    /// Placement tuning.
    pub placement: PlacementConfig,
    /// Painting parameters.
    pub paint: PaintConfig,
}

impl CellforgeConfig {
    /// Parse and validate RON text. `source` names the text in errors.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| CellforgeError::ConfigParse {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.placement.validate()?;
        self.paint.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CellforgeConfig::default();
        assert_eq!(config.placement.entity_limit, 128);
        assert_eq!(config.placement.neighborhood_radius, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full() {
        let text = "CellforgeConfig(
            placement: (entity_limit: 16, neighborhood_radius: 4),
            paint: (kind: Snow, seed: 7, radius: 3),
        )";
        let config = CellforgeConfig::from_ron_str(text, "inline").unwrap();
        assert_eq!(config.placement.entity_limit, 16);
        assert_eq!(config.paint.kind, FalloutKind::Snow);
        assert_eq!(config.paint.radius, 3);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = CellforgeConfig::from_ron_str("(paint: (seed: 99))", "inline").unwrap();
        assert_eq!(config.paint.seed, 99);
        assert_eq!(config.paint.radius, 6);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let err = CellforgeConfig::from_ron_str("(placement: (entity_limit: 0))", "inline").unwrap_err();
        assert!(matches!(err, CellforgeError::InvalidConfig(_)));
    }

    #[test]
    fn test_paint_radius_is_bounded() {
        let err = CellforgeConfig::from_ron_str("(paint: (radius: 46341))", "inline").unwrap_err();
        assert!(matches!(err, CellforgeError::InvalidConfig(_)));

        let widest = PaintConfig {
            radius: MAX_PAINT_RADIUS,
            ..PaintConfig::default()
        };
        assert!(widest.validate().is_ok());
        let too_wide = PaintConfig {
            radius: MAX_PAINT_RADIUS + 1,
            ..widest
        };
        assert!(too_wide.validate().is_err());
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = CellforgeConfig::from_ron_str("(placement: [", "broken.ron").unwrap_err();
        match err {
            CellforgeError::ConfigParse { path, .. } => assert_eq!(path, "broken.ron"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Crater fallout presets built on [`SubstitutionPolicy`].
//!
//! A fallout paints the debris around an impact site in two layers:
//!
//! - **fall**: loose cover on top of the terrain.
//! - **inset**: the cells of the crater bowl itself, which may also be
//!   cleared to air.
//!
//! `Copy` fallout scatters the local surface material. `Snow` fallout does
//! the same and fills the remaining draws with snow and ice. The inset layer
//! hands its fallback a draw reduced by one step (0.1), so the snow/ice bands
//! see shifted values there; the fall layer does not shift.

use serde::{Deserialize, Serialize};

use crate::grid::CellPos;
use crate::host::SubstitutionHost;
use crate::math::Threshold;
use crate::random::RandomSource;
use crate::substitution::{Band, CellSubstitutionEngine, MaterialOutcome, Substitute, SubstitutionPolicy};

/// Lower bound of the copy-surface band.
pub const COPY_THRESHOLD: Threshold = Threshold::from_permille(900);
/// Lower bound of the air band (inset only).
pub const AIR_THRESHOLD: Threshold = Threshold::from_permille(800);
/// Shift applied to the draw before the inset fallback.
pub const INSET_STEP: Threshold = Threshold::from_permille(100);
/// Lower bound of the snow band.
pub const SNOW_THRESHOLD: Threshold = Threshold::from_permille(700);
/// Lower bound of the ice band.
pub const ICE_THRESHOLD: Threshold = Threshold::from_permille(500);

/// Which fallout preset to paint with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FalloutKind {
    /// Copy the surface material, otherwise leave or clear.
    #[default]
    Copy,
    /// Like `Copy`, with snow and ice filling the remainder.
    Snow,
}

/// Painting layer of a crater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FalloutLayer {
    /// Loose cover on top of the terrain.
    Fall,
    /// Cells of the crater bowl.
    Inset,
}

fn band<M>(threshold: Threshold, outcome: Substitute<M>) -> Band<M> {
    Band {
        lower_bound: threshold,
        outcome,
    }
}

/// Base fall policy: copy the surface above 0.9.
#[must_use]
pub fn copy_fall_policy<M>() -> SubstitutionPolicy<M> {
    SubstitutionPolicy::from_ordered(vec![band(COPY_THRESHOLD, Substitute::CopySurface)])
}

/// Base inset policy: copy above 0.9, air above 0.8, shifted fallback.
#[must_use]
pub fn copy_inset_policy<M>() -> SubstitutionPolicy<M> {
    SubstitutionPolicy::from_ordered(vec![
        band(COPY_THRESHOLD, Substitute::CopySurface),
        band(AIR_THRESHOLD, Substitute::Air),
    ])
    .with_fallback_shift(INSET_STEP)
}

/// Snow overlay: snow above 0.7, ice above 0.5, otherwise unchanged.
#[must_use]
pub fn snow_overlay_policy<M>() -> SubstitutionPolicy<M> {
    SubstitutionPolicy::from_ordered(vec![
        band(SNOW_THRESHOLD, Substitute::Snow),
        band(ICE_THRESHOLD, Substitute::Ice),
    ])
}

/// Per-cell counts of a painting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaintSummary {
    /// Cells given the surface material.
    pub copied: u32,
    /// Cells cleared to air.
    pub air: u32,
    /// Cells covered in snow.
    pub snow: u32,
    /// Cells turned to ice.
    pub ice: u32,
    /// Cells given a custom material.
    pub custom: u32,
    /// Cells left unchanged.
    pub unchanged: u32,
}

impl PaintSummary {
    /// Count one resolution.
    pub fn record<M>(&mut self, outcome: Option<&MaterialOutcome<M>>) {
        match outcome {
            Some(MaterialOutcome::CopiedSurfaceMaterial(_)) => self.copied += 1,
            Some(MaterialOutcome::Air) => self.air += 1,
            Some(MaterialOutcome::Snow) => self.snow += 1,
            Some(MaterialOutcome::Ice) => self.ice += 1,
            Some(MaterialOutcome::Custom(_)) => self.custom += 1,
            None => self.unchanged += 1,
        }
    }

    /// Total cells visited.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.copied + self.air + self.snow + self.ice + self.custom + self.unchanged
    }
}

/// A fallout preset bound to one impact site.
#[derive(Debug, Clone)]
pub struct Fallout<M> {
    kind: FalloutKind,
    engine: CellSubstitutionEngine<M>,
    fall: SubstitutionPolicy<M>,
    inset: SubstitutionPolicy<M>,
}

impl<M: Clone> Fallout<M> {
    /// Bind a preset to `origin`, caching the host's surface material there.
    pub fn new<H>(kind: FalloutKind, host: &H, origin: CellPos) -> Self
    where
        H: SubstitutionHost<Material = M>,
    {
        Self::with_engine(kind, CellSubstitutionEngine::from_host(host, origin))
    }

    /// Build a preset around an existing engine.
    #[must_use]
    pub fn with_engine(kind: FalloutKind, engine: CellSubstitutionEngine<M>) -> Self {
        let (fall, inset) = match kind {
            FalloutKind::Copy => (copy_fall_policy(), copy_inset_policy()),
            FalloutKind::Snow => (
                copy_fall_policy().wrap(snow_overlay_policy()),
                copy_inset_policy().wrap(snow_overlay_policy()),
            ),
        };
        Self {
            kind,
            engine,
            fall,
            inset,
        }
    }

    /// Preset kind.
    #[must_use]
    pub const fn kind(&self) -> FalloutKind {
        self.kind
    }

    /// Extra crater depth this preset asks for.
    #[must_use]
    pub const fn adjust_crater(&self) -> i32 {
        match self.kind {
            FalloutKind::Copy => 0,
            FalloutKind::Snow => 2,
        }
    }

    /// Engine holding the cached surface material.
    #[must_use]
    pub const fn engine(&self) -> &CellSubstitutionEngine<M> {
        &self.engine
    }

    /// Policy used for `layer`.
    #[must_use]
    pub const fn policy(&self, layer: FalloutLayer) -> &SubstitutionPolicy<M> {
        match layer {
            FalloutLayer::Fall => &self.fall,
            FalloutLayer::Inset => &self.inset,
        }
    }

    /// Paint one cell of the fall layer.
    pub fn random_fall<H, R>(&self, host: &mut H, cell: CellPos, rng: &mut R) -> Option<MaterialOutcome<M>>
    where
        H: SubstitutionHost<Material = M>,
        R: RandomSource + ?Sized,
    {
        self.engine.apply(host, cell, &self.fall, rng)
    }

    /// Paint one cell of the inset layer.
    pub fn random_inset<H, R>(&self, host: &mut H, cell: CellPos, rng: &mut R) -> Option<MaterialOutcome<M>>
    where
        H: SubstitutionHost<Material = M>,
        R: RandomSource + ?Sized,
    {
        self.engine.apply(host, cell, &self.inset, rng)
    }

    /// Paint every cell of `cells` once on `layer`.
    pub fn paint_cells<H, R, I>(&self, host: &mut H, cells: I, rng: &mut R, layer: FalloutLayer) -> PaintSummary
    where
        H: SubstitutionHost<Material = M>,
        R: RandomSource + ?Sized,
        I: IntoIterator<Item = CellPos>,
    {
        let policy = self.policy(layer);
        let mut summary = PaintSummary::default();
        for cell in cells {
            let outcome = self.engine.apply(host, cell, policy, rng);
            summary.record(outcome.as_ref());
        }
        tracing::debug!(
            kind = ?self.kind,
            ?layer,
            cells = summary.total(),
            copied = summary.copied,
            unchanged = summary.unchanged,
            "Painted fallout layer"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{ratio, Fixed};

    fn draw(permille: i32) -> Fixed {
        ratio(permille, 1000)
    }

    fn snow() -> Fallout<&'static str> {
        Fallout::with_engine(FalloutKind::Snow, CellSubstitutionEngine::new("grass"))
    }

    #[test]
    fn test_snow_inset_bands() {
        let fallout = snow();
        let engine = fallout.engine();
        let inset = fallout.policy(FalloutLayer::Inset);

        assert_eq!(
            engine.resolve_draw(inset, draw(950)),
            Some(MaterialOutcome::CopiedSurfaceMaterial("grass"))
        );
        assert_eq!(engine.resolve_draw(inset, draw(850)), Some(MaterialOutcome::Air));
        // 0.75 reaches the overlay as 0.65, below the snow band
        assert_eq!(engine.resolve_draw(inset, draw(750)), Some(MaterialOutcome::Ice));
        assert_eq!(engine.resolve_draw(inset, draw(799)), Some(MaterialOutcome::Ice));
        assert_eq!(engine.resolve_draw(inset, draw(650)), Some(MaterialOutcome::Ice));
        assert_eq!(engine.resolve_draw(inset, draw(550)), None);
        assert_eq!(engine.resolve_draw(inset, draw(300)), None);
    }

    #[test]
    fn test_snow_fall_bands() {
        let fallout = snow();
        let engine = fallout.engine();
        let fall = fallout.policy(FalloutLayer::Fall);

        assert_eq!(
            engine.resolve_draw(fall, draw(950)),
            Some(MaterialOutcome::CopiedSurfaceMaterial("grass"))
        );
        assert_eq!(engine.resolve_draw(fall, draw(850)), Some(MaterialOutcome::Snow));
        assert_eq!(engine.resolve_draw(fall, draw(750)), Some(MaterialOutcome::Snow));
        assert_eq!(engine.resolve_draw(fall, draw(600)), Some(MaterialOutcome::Ice));
        assert_eq!(engine.resolve_draw(fall, draw(300)), None);
    }

    #[test]
    fn test_copy_presets() {
        let fallout = Fallout::with_engine(FalloutKind::Copy, CellSubstitutionEngine::new(9u16));
        let engine = fallout.engine();

        assert_eq!(
            engine.resolve_draw(fallout.policy(FalloutLayer::Fall), draw(910)),
            Some(MaterialOutcome::CopiedSurfaceMaterial(9))
        );
        assert_eq!(engine.resolve_draw(fallout.policy(FalloutLayer::Fall), draw(850)), None);
        assert_eq!(
            engine.resolve_draw(fallout.policy(FalloutLayer::Inset), draw(850)),
            Some(MaterialOutcome::Air)
        );
        assert_eq!(engine.resolve_draw(fallout.policy(FalloutLayer::Inset), draw(700)), None);
    }

    #[test]
    fn test_crater_adjustment() {
        assert_eq!(snow().adjust_crater(), 2);
        let copy = Fallout::with_engine(FalloutKind::Copy, CellSubstitutionEngine::new(0u8));
        assert_eq!(copy.adjust_crater(), 0);
    }

    #[test]
    fn test_preset_shapes() {
        assert_eq!(copy_inset_policy::<u8>().depth(), 1);
        assert_eq!(snow().policy(FalloutLayer::Inset).depth(), 2);
        assert_eq!(snow().policy(FalloutLayer::Fall).depth(), 2);
        assert!(snow().policy(FalloutLayer::Inset).validate().is_ok());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = PaintSummary::default();
        summary.record(Some(&MaterialOutcome::<u8>::Snow));
        summary.record(Some(&MaterialOutcome::CopiedSurfaceMaterial(1u8)));
        summary.record::<u8>(None);
        assert_eq!(summary.snow, 1);
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total(), 3);
    }
}

//! Banded, probabilistic material substitution.
//!
//! A [`SubstitutionPolicy`] is an ordered list of bands, each a lower bound
//! paired with an outcome, plus an optional fallback policy. Resolution draws
//! one uniform value and walks the bands top-down; the first band whose lower
//! bound is at or below the draw fires. When nothing matches, the draw is
//! shifted by the policy's `fallback_shift` and handed to the fallback
//! policy, recursively, until a band fires or a policy without a fallback
//! leaves the cell unchanged.
//!
//! Layering a more specific policy over a base one is done with
//! [`SubstitutionPolicy::wrap`], which attaches the overlay to the deepest
//! unset fallback slot of the base.

use serde::{Deserialize, Serialize};

use crate::error::{CellforgeError, Result};
use crate::grid::CellPos;
use crate::host::SubstitutionHost;
use crate::math::{Fixed, Threshold};
use crate::random::RandomSource;

/// What a band produces when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Substitute<M> {
    /// Copy the cached surface material of the region.
    CopySurface,
    /// Clear the cell.
    Air,
    /// Snow cover.
    Snow,
    /// Ice.
    Ice,
    /// A caller-supplied material.
    Custom(M),
}

/// Resolved substitution for a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialOutcome<M> {
    /// The region's surface material.
    CopiedSurfaceMaterial(M),
    /// Cleared cell.
    Air,
    /// Snow cover.
    Snow,
    /// Ice.
    Ice,
    /// A caller-supplied material.
    Custom(M),
}

/// A `(lower_bound, outcome)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band<M> {
    /// Smallest draw that fires this band.
    pub lower_bound: Threshold,
    /// Outcome when it fires.
    pub outcome: Substitute<M>,
}

impl<M> Band<M> {
    /// Create a band from a permille lower bound.
    #[must_use]
    ///
    /// Bounds above 1000 are kept as given and rejected when the policy is
    /// validated.
    pub const fn new(lower_bound_permille: u16, outcome: Substitute<M>) -> Self {
        Self {
            lower_bound: Threshold::from_permille_unchecked(lower_bound_permille),
            outcome,
        }
    }
}

/// Ordered bands with an optional fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "M: Deserialize<'de>"))]
pub struct SubstitutionPolicy<M> {
    bands: Vec<Band<M>>,
    /// Amount subtracted from the draw before it reaches `fallback`.
    #[serde(default)]
    fallback_shift: Threshold,
    #[serde(default)]
    fallback: Option<Box<SubstitutionPolicy<M>>>,
}

impl<M> SubstitutionPolicy<M> {
    /// Create a policy from bands ordered by strictly decreasing lower bound.
    pub fn new(bands: Vec<Band<M>>) -> Result<Self> {
        let policy = Self::from_ordered(bands);
        policy.validate()?;
        Ok(policy)
    }

    /// Create a policy from bands already known to be ordered.
    pub(crate) const fn from_ordered(bands: Vec<Band<M>>) -> Self {
        Self {
            bands,
            fallback_shift: Threshold::ZERO,
            fallback: None,
        }
    }

    /// A policy with no bands; every resolution leaves the cell unchanged
    /// unless a fallback is attached.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_ordered(Vec::new())
    }

    /// Subtract `shift` from the draw before handing it to the fallback.
    #[must_use]
    pub fn with_fallback_shift(mut self, shift: Threshold) -> Self {
        self.fallback_shift = shift;
        self
    }

    /// Attach `overlay` at the deepest unset fallback slot of this chain.
    ///
    /// The shift configured on the policy that owns that slot is kept.
    #[must_use]
    pub fn wrap(mut self, overlay: Self) -> Self {
        let inner = match self.fallback.take() {
            Some(next) => (*next).wrap(overlay),
            None => overlay,
        };
        self.fallback = Some(Box::new(inner));
        self
    }

    /// Bands of this link of the chain.
    #[must_use]
    pub fn bands(&self) -> &[Band<M>] {
        &self.bands
    }

    /// Fallback policy, if any.
    #[must_use]
    pub fn fallback(&self) -> Option<&Self> {
        self.fallback.as_deref()
    }

    /// Number of links in the chain, this one included.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.fallback().map_or(0, Self::depth)
    }

    /// Check band ordering for every link of the chain.
    pub fn validate(&self) -> Result<()> {
        let mut link = Some(self);
        let mut depth = 0usize;
        while let Some(policy) = link {
            if let Some(band) = policy.bands.iter().find(|band| band.lower_bound > Threshold::ONE) {
                return Err(CellforgeError::InvalidPolicy(format!(
                    "link {depth}: band lower bound {} exceeds 1000 permille",
                    band.lower_bound.permille()
                )));
            }
            for pair in policy.bands.windows(2) {
                if pair[1].lower_bound >= pair[0].lower_bound {
                    return Err(CellforgeError::InvalidPolicy(format!(
                        "link {depth}: band lower bounds must strictly decrease, found {} then {}",
                        pair[0].lower_bound.permille(),
                        pair[1].lower_bound.permille()
                    )));
                }
            }
            link = policy.fallback();
            depth += 1;
        }
        Ok(())
    }

    /// Outcome selected for `draw`, or `None` when the cell stays unchanged.
    ///
    /// Pure: the same draw always selects the same outcome.
    #[must_use]
    pub fn select(&self, draw: Fixed) -> Option<&Substitute<M>> {
        let mut policy = self;
        let mut draw = draw;
        loop {
            if let Some(band) = policy
                .bands
                .iter()
                .find(|band| band.lower_bound.as_fixed() <= draw)
            {
                return Some(&band.outcome);
            }
            let next = policy.fallback.as_deref()?;
            draw -= policy.fallback_shift.as_fixed();
            policy = next;
        }
    }
}

/// Resolves policies against a cached surface material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSubstitutionEngine<M> {
    surface: M,
}

impl<M: Clone> CellSubstitutionEngine<M> {
    /// Create an engine copying `surface` for [`Substitute::CopySurface`].
    #[must_use]
    pub const fn new(surface: M) -> Self {
        Self { surface }
    }

    /// Create an engine from the host's surface material at `origin`.
    ///
    /// This is the only host query the engine ever makes for its surface.
    pub fn from_host<H>(host: &H, origin: CellPos) -> Self
    where
        H: SubstitutionHost<Material = M>,
    {
        Self::new(host.surface_material_at(origin))
    }

    /// Cached surface material.
    #[must_use]
    pub fn surface(&self) -> &M {
        &self.surface
    }

    /// Resolve `policy` for an explicit draw.
    #[must_use]
    pub fn resolve_draw(&self, policy: &SubstitutionPolicy<M>, draw: Fixed) -> Option<MaterialOutcome<M>> {
        policy.select(draw).map(|substitute| match substitute {
            Substitute::CopySurface => MaterialOutcome::CopiedSurfaceMaterial(self.surface.clone()),
            Substitute::Air => MaterialOutcome::Air,
            Substitute::Snow => MaterialOutcome::Snow,
            Substitute::Ice => MaterialOutcome::Ice,
            Substitute::Custom(material) => MaterialOutcome::Custom(material.clone()),
        })
    }

    /// Draw once from `rng` and resolve `policy`.
    pub fn resolve<R>(&self, policy: &SubstitutionPolicy<M>, rng: &mut R) -> Option<MaterialOutcome<M>>
    where
        R: RandomSource + ?Sized,
    {
        let draw = rng.next_unit();
        self.resolve_draw(policy, draw)
    }

    /// Resolve `policy` for `cell` and write the outcome through the host.
    ///
    /// Nothing is written when the chain ends without a match.
    pub fn apply<H, R>(
        &self,
        host: &mut H,
        cell: CellPos,
        policy: &SubstitutionPolicy<M>,
        rng: &mut R,
    ) -> Option<MaterialOutcome<M>>
    where
        H: SubstitutionHost<Material = M>,
        R: RandomSource + ?Sized,
    {
        let outcome = self.resolve(policy, rng)?;
        tracing::trace!(?cell, "substituting cell");
        host.put_material(cell, &outcome);
        Some(outcome)
    }
}

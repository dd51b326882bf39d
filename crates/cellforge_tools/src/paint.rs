//! Crater painting into a fresh sandbox world.
//!
//! The crater is centred on the origin of a flat world whose ground sits at
//! `y = 0`. The bowl is painted with the inset layer, one disc per depth
//! step and shrinking by one cell per step. Debris is then painted with the
//! fall layer over a disc one cell wider, resting on top of the ground.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use cellforge_core::config::PaintConfig;
use cellforge_core::fallout::{Fallout, FalloutKind, FalloutLayer, PaintSummary};
use cellforge_core::grid::CellPos;
use cellforge_core::sandbox::{MaterialId, SandboxWorld};
use cellforge_core::substitution::SubstitutionPolicy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::Result;

/// Outcome of a painting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaintReport {
    /// Preset used.
    pub kind: FalloutKind,
    /// Seed used.
    pub seed: u64,
    /// Crater radius.
    pub radius: u32,
    /// Number of inset discs painted.
    pub crater_depth: i32,
    /// Whether a custom overlay filled the fall layer's fallback.
    pub custom_overlay: bool,
    /// Counts for the crater bowl.
    pub inset: PaintSummary,
    /// Counts for the debris layer.
    pub fall: PaintSummary,
    /// Written cells by material name.
    pub materials: BTreeMap<String, usize>,
    /// Hash of the painted world.
    pub world_hash: u64,
}

/// Cells of a flat disc, in row order.
pub fn disc(center: CellPos, radius: i32) -> impl Iterator<Item = CellPos> {
    let limit = i64::from(radius) * i64::from(radius);
    (-radius..=radius).flat_map(move |dx| {
        (-radius..=radius)
            .filter(move |&dz| i64::from(dx) * i64::from(dx) + i64::from(dz) * i64::from(dz) <= limit)
            .map(move |dz| CellPos::new(center.x + dx, center.y, center.z + dz))
    })
}

/// Paint one crater as described by `config`.
///
/// `overlay`, when given, is attached at the deepest fallback of the fall
/// layer and decides the draws the preset leaves unchanged. Fails when
/// `config` does not validate.
pub fn paint_crater(
    config: &PaintConfig,
    surface: MaterialId,
    overlay: Option<SubstitutionPolicy<MaterialId>>,
) -> Result<PaintReport> {
    config.validate()?;
    let mut world = SandboxWorld::new(surface).with_ground(0);
    let fallout = Fallout::new(config.kind, &world, CellPos::default());
    let mut rng = StdRng::seed_from_u64(config.seed);

    let radius = i32::try_from(config.radius).unwrap_or(i32::MAX);
    let depth = 1 + fallout.adjust_crater();

    let bowl = (0..depth)
        .filter(|d| radius - d >= 0)
        .flat_map(|d| disc(CellPos::new(0, -d, 0), radius - d));
    let inset = fallout.paint_cells(&mut world, bowl, &mut rng, FalloutLayer::Inset);

    let debris = disc(CellPos::new(0, 1, 0), radius.saturating_add(1));
    let custom_overlay = overlay.is_some();
    let fall = match overlay {
        Some(overlay) => {
            let policy = fallout.policy(FalloutLayer::Fall).clone().wrap(overlay);
            let mut summary = PaintSummary::default();
            for cell in debris {
                let outcome = fallout.engine().apply(&mut world, cell, &policy, &mut rng);
                summary.record(outcome.as_ref());
            }
            summary
        }
        None => fallout.paint_cells(&mut world, debris, &mut rng, FalloutLayer::Fall),
    };

    let mut materials = BTreeMap::new();
    for (_, material) in world.written_cells() {
        *materials.entry(material.name().to_string()).or_insert(0) += 1;
    }

    tracing::info!(
        kind = ?config.kind,
        seed = config.seed,
        radius = config.radius,
        written = world.written_cells().count(),
        "Painted crater"
    );

    Ok(PaintReport {
        kind: config.kind,
        seed: config.seed,
        radius: config.radius,
        crater_depth: depth,
        custom_overlay,
        inset,
        fall,
        materials,
        world_hash: world.state_hash(),
    })
}

fn summary_line(name: &str, summary: &PaintSummary) -> String {
    format!(
        "{name:<6} cells={:<5} copied={:<4} air={:<4} snow={:<4} ice={:<4} custom={:<4} unchanged={}",
        summary.total(),
        summary.copied,
        summary.air,
        summary.snow,
        summary.ice,
        summary.custom,
        summary.unchanged
    )
}

/// Plain-text rendering of a report.
#[must_use]
pub fn render_text(report: &PaintReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:?} fallout, seed {}, radius {}, depth {}",
        report.kind, report.seed, report.radius, report.crater_depth
    );
    let _ = writeln!(out, "{}", summary_line("inset", &report.inset));
    let _ = writeln!(out, "{}", summary_line("fall", &report.fall));
    for (name, count) in &report.materials {
        let _ = writeln!(out, "  {name:<10} {count}");
    }
    out
}

/// JSON rendering of a report.
pub fn render_json(report: &PaintReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: FalloutKind) -> PaintConfig {
        PaintConfig {
            kind,
            seed: 99,
            radius: 4,
        }
    }

    #[test]
    fn test_wide_disc_does_not_overflow() {
        let first = disc(CellPos::default(), 46_341).next();
        assert_eq!(first, Some(CellPos::new(-46_341, 0, 0)));
    }

    #[test]
    fn test_oversized_radius_is_rejected() {
        let config = PaintConfig {
            radius: 50_000,
            ..config(FalloutKind::Copy)
        };
        assert!(paint_crater(&config, MaterialId::GRASS, None).is_err());
    }

    #[test]
    fn test_disc_is_symmetric() {
        let cells: Vec<_> = disc(CellPos::default(), 2).collect();
        assert_eq!(cells.len(), 13);
        assert!(cells.contains(&CellPos::new(-2, 0, 0)));
        assert!(!cells.contains(&CellPos::new(2, 0, 2)));
    }

    #[test]
    fn test_snow_crater_is_deeper() {
        let copy = paint_crater(&config(FalloutKind::Copy), MaterialId::GRASS, None).unwrap();
        let snow = paint_crater(&config(FalloutKind::Snow), MaterialId::GRASS, None).unwrap();
        assert_eq!(copy.crater_depth, 1);
        assert_eq!(snow.crater_depth, 3);
        assert!(snow.inset.total() > copy.inset.total());
    }

    #[test]
    fn test_copy_fall_never_writes_snow() {
        let report = paint_crater(&config(FalloutKind::Copy), MaterialId::SAND, None).unwrap();
        assert_eq!(report.fall.snow + report.fall.ice + report.fall.air, 0);
        assert!(!report.materials.contains_key("snow"));
    }

    #[test]
    fn test_same_seed_same_report() {
        let a = paint_crater(&config(FalloutKind::Snow), MaterialId::GRASS, None).unwrap();
        let b = paint_crater(&config(FalloutKind::Snow), MaterialId::GRASS, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_has_summaries() {
        let report = paint_crater(&config(FalloutKind::Copy), MaterialId::GRASS, None).unwrap();
        let json = render_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "Copy");
        assert_eq!(value["radius"], 4);
        assert!(value["inset"]["copied"].is_u64());
    }

    #[test]
    fn test_text_lists_layers() {
        let report = paint_crater(&config(FalloutKind::Snow), MaterialId::GRASS, None).unwrap();
        let text = render_text(&report);
        assert!(text.starts_with("Snow fallout"));
        assert!(text.contains("inset"));
        assert!(text.contains("fall"));
    }
}

//! Cellforge - Development Tools
//!
//! # Usage
//!
//! ```bash
//! # Paint a snow crater and print a histogram
//! cargo run -p cellforge_tools -- paint --kind snow --radius 8
//!
//! # Same, from a config file, with a custom overlay policy, as JSON
//! cargo run -p cellforge_tools -- paint --config data/cellforge.ron --policy data/policies/ash.ron --json
//!
//! # Run a placement strategy for 50 ticks
//! cargo run -p cellforge_tools -- place --ticks 50 --free-entity --limit 8
//!
//! # Validate data files
//! cargo run -p cellforge_tools -- validate data/policies --kind policy
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cellforge_core::config::{CellforgeConfig, PaintConfig};
use cellforge_core::fallout::FalloutKind;
use cellforge_core::grid::Direction;
use cellforge_core::sandbox::MaterialId;
use cellforge_tools::error::Result;
use cellforge_tools::load::{load_config, load_policy};
use cellforge_tools::paint::{paint_crater, render_json, render_text};
use cellforge_tools::place::{run_placement, PlaceOptions};
use cellforge_tools::validate::{validate_path, FileKind};

#[derive(Parser)]
#[command(name = "cellforge")]
#[command(about = "Development tools for cell substitution and placement")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paint a crater into a fresh sandbox world
    Paint {
        /// Config file supplying paint defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fallout preset
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Crater radius in cells
        #[arg(short, long)]
        radius: Option<u32>,

        /// Surface material of the world
        #[arg(long, value_enum, default_value = "grass")]
        surface: SurfaceArg,

        /// Policy file filling the fall layer's fallback
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a placement strategy against the sandbox world
    Place {
        /// Config file supplying placement tuning
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of ticks to run
        #[arg(short, long, default_value = "20")]
        ticks: u32,

        /// Amount offered per tick
        #[arg(short, long, default_value = "16")]
        amount: i64,

        /// Drop free entities instead of placing blocks
        #[arg(long)]
        free_entity: bool,

        /// Only probe, never mutate the world
        #[arg(long)]
        simulate: bool,

        /// Side of the target the strategy is mounted on
        #[arg(long, value_enum, default_value = "north")]
        side: SideArg,

        /// Clear a blocked target every N ticks
        #[arg(long)]
        reopen_every: Option<u32>,

        /// Free entity cap (overrides config)
        #[arg(long)]
        limit: Option<u32>,

        /// Random seed for spawn jitter
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate config or policy files
    Validate {
        /// File or directory of RON files
        #[arg(default_value = "data")]
        path: PathBuf,

        /// What the files contain
        #[arg(short, long, value_enum, default_value = "config")]
        kind: KindOfFile,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Copy,
    Snow,
}

impl From<KindArg> for FalloutKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Copy => Self::Copy,
            KindArg::Snow => Self::Snow,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SurfaceArg {
    Grass,
    Sand,
    Dirt,
    Stone,
}

impl From<SurfaceArg> for MaterialId {
    fn from(surface: SurfaceArg) -> Self {
        match surface {
            SurfaceArg::Grass => Self::GRASS,
            SurfaceArg::Sand => Self::SAND,
            SurfaceArg::Dirt => Self::DIRT,
            SurfaceArg::Stone => Self::STONE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl From<SideArg> for Direction {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Down => Self::Down,
            SideArg::Up => Self::Up,
            SideArg::North => Self::North,
            SideArg::South => Self::South,
            SideArg::West => Self::West,
            SideArg::East => Self::East,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindOfFile {
    Config,
    Policy,
}

impl From<KindOfFile> for FileKind {
    fn from(kind: KindOfFile) -> Self {
        match kind {
            KindOfFile::Config => Self::Config,
            KindOfFile::Policy => Self::Policy,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries reports.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let result = match cli.command {
        Commands::Paint {
            config,
            kind,
            seed,
            radius,
            surface,
            policy,
            json,
        } => cmd_paint(config, kind, seed, radius, surface, policy, json),
        Commands::Place {
            config,
            ticks,
            amount,
            free_entity,
            simulate,
            side,
            reopen_every,
            limit,
            seed,
            json,
        } => {
            let options = PlaceOptions {
                ticks,
                amount,
                free_entity,
                simulate,
                side: side.into(),
                reopen_every,
                seed,
                ..PlaceOptions::default()
            };
            cmd_place(config, options, limit, json)
        }
        Commands::Validate { path, kind } => cmd_validate(&path, kind.into()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_optional_config(path: Option<PathBuf>) -> Result<CellforgeConfig> {
    match path {
        Some(path) => Ok(load_config(&path)?),
        None => Ok(CellforgeConfig::default()),
    }
}

/// Paint a crater and print its report
fn cmd_paint(
    config: Option<PathBuf>,
    kind: Option<KindArg>,
    seed: Option<u64>,
    radius: Option<u32>,
    surface: SurfaceArg,
    policy: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let base = load_optional_config(config)?.paint;
    let paint = PaintConfig {
        kind: kind.map_or(base.kind, FalloutKind::from),
        seed: seed.unwrap_or(base.seed),
        radius: radius.unwrap_or(base.radius),
    };
    let overlay = policy.map(|path| load_policy(&path)).transpose()?;
    let report = paint_crater(&paint, surface.into(), overlay)?;

    if json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(ExitCode::SUCCESS)
}

/// Run a placement strategy and print its tally
fn cmd_place(config: Option<PathBuf>, mut options: PlaceOptions, limit: Option<u32>, json: bool) -> Result<ExitCode> {
    options.placement = load_optional_config(config)?.placement;
    if let Some(limit) = limit {
        options.placement = options.placement.with_entity_limit(limit);
    }

    let report = run_placement(&options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "ticks={} consumed={} placed={} invalid={} unavailable={} rejected={} reopened={}",
            report.ticks,
            report.consumed,
            report.placed,
            report.invalid,
            report.unavailable,
            report.rejected,
            report.reopened
        );
        println!(
            "entities={} host_placements={} queries={} state={:?}",
            report.entities, report.host_placements, report.replaceable_queries, report.final_state
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate data files
fn cmd_validate(path: &std::path::Path, kind: FileKind) -> Result<ExitCode> {
    tracing::info!("Validating {kind:?} files in: {}", path.display());
    let report = validate_path(path, kind)?;
    if report.passed() {
        tracing::info!(checked = report.checked, "Validation passed");
        Ok(ExitCode::SUCCESS)
    } else {
        for failure in &report.failures {
            println!("{}: {}", failure.path, failure.message);
        }
        tracing::error!(
            checked = report.checked,
            failed = report.failures.len(),
            "Validation failed"
        );
        Ok(ExitCode::FAILURE)
    }
}

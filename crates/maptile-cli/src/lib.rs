//! # Maptile CLI
//!
//! Command-line interface for map tile geometry files.
//!
//! ## Commands
//! - `inspect` - Summarise layers and decode anomalies
//! - `dump` - Write the decoded tile as JSON
//! - `resave` - Decode and re-encode a tile
//! - `clear` - Remove lines and/or terrain layers
//! - `add-line` - Append a line quad to a line layer

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Serialize;

use maptile_core::{DecodeReport, Theme, TileConfig, TileGeometry, Trailing};

/// Map tile geometry tool
#[derive(Parser)]
#[command(name = "maptile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use the lunar layer theme
    #[arg(long)]
    pub moon: bool,

    /// Treat a missing input file as an empty tile
    #[arg(long)]
    pub allow_missing: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Summarise a tile's layers
    Inspect {
        /// Tile file
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the decoded tile as JSON
    Dump {
        /// Tile file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode and re-encode a tile
    Resave {
        /// Tile file
        input: PathBuf,

        /// Output tile file
        output: PathBuf,
    },

    /// Remove lines and/or terrain
    Clear {
        /// Tile file
        input: PathBuf,

        /// Output tile file
        output: PathBuf,

        /// Clear all line layers
        #[arg(long)]
        lines: bool,

        /// Clear all mesh layers
        #[arg(long)]
        geometry: bool,

        /// Clear a single mesh layer by name
        #[arg(long)]
        layer: Vec<String>,
    },

    /// Append a line quad
    AddLine {
        /// Tile file
        input: PathBuf,

        /// Output tile file
        output: PathBuf,

        /// Line layer slot (0-9)
        #[arg(short, long)]
        layer: usize,

        /// Start point as x,y
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        from: Vec2,

        /// End point as x,y
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        to: Vec2,

        /// Half-width of the quad (defaults to the configured thickness)
        #[arg(short, long)]
        thickness: Option<f32>,
    },
}

/// Parse an `x,y` pair
pub fn parse_coordinate(value: &str) -> std::result::Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", value))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok(Vec2::new(x, y))
}

/// Per-layer counts for `inspect`
#[derive(Debug, Serialize)]
pub struct TileSummary {
    pub theme: Theme,
    pub bytes_consumed: usize,
    pub dropped_quads: usize,
    pub trailing: String,
    pub meshes: Vec<MeshSummary>,
    pub line_quads: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct MeshSummary {
    pub name: &'static str,
    pub vertices: usize,
    pub triangles: usize,
}

impl TileSummary {
    pub fn new(tile: &TileGeometry, report: Option<&DecodeReport>) -> Self {
        let trailing = match report.map(|r| &r.trailing) {
            None => "missing file".to_string(),
            Some(Trailing::None) => "none".to_string(),
            Some(Trailing::ZeroTerminator) => "zero terminator".to_string(),
            Some(Trailing::Anomalous(bytes)) => format!("{} unexpected bytes", bytes.len()),
        };

        Self {
            theme: tile.theme(),
            bytes_consumed: report.map_or(0, |r| r.bytes_consumed),
            dropped_quads: report.map_or(0, |r| r.dropped_quads),
            trailing,
            meshes: tile
                .mesh_layers()
                .map(|(name, mesh)| MeshSummary {
                    name,
                    vertices: mesh.vertices.len(),
                    triangles: mesh.triangles.len(),
                })
                .collect(),
            line_quads: tile.line_layers().iter().map(|l| l.len()).collect(),
        }
    }
}

/// Resolved settings for a run
struct Session {
    config: TileConfig,
    allow_missing: bool,
}

impl Session {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => TileConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TileConfig::default(),
        };
        if cli.moon {
            config.theme = Theme::Moon;
        }

        Ok(Self {
            config,
            allow_missing: cli.allow_missing,
        })
    }

    /// Load a tile, substituting an empty one for a missing file when allowed
    fn load(&self, path: &Path) -> Result<(TileGeometry, Option<DecodeReport>)> {
        let theme = self.config.theme;
        if self.allow_missing && !path.exists() {
            log::warn!("{} not found, using an empty tile", path.display());
            return Ok((TileGeometry::empty(theme), None));
        }

        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let (tile, report) = TileGeometry::decode_with_report(&bytes, theme)
            .with_context(|| format!("decoding {}", path.display()))?;
        log::info!(
            "Decoded {} ({} of {} bytes, {} quads dropped)",
            path.display(),
            report.bytes_consumed,
            bytes.len(),
            report.dropped_quads
        );
        Ok((tile, Some(report)))
    }

    fn save(&self, tile: &TileGeometry, path: &Path) -> Result<()> {
        tile.save_as(path)
            .with_context(|| format!("saving {}", path.display()))
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).try_init();

    run(cli)
}

/// Run the CLI command with logging already configured
pub fn run(cli: Cli) -> Result<()> {
    let session = Session::from_cli(&cli)?;

    match cli.command {
        Commands::Inspect { input, json } => {
            let (tile, report) = session.load(&input)?;
            let summary = TileSummary::new(&tile, report.as_ref());

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} ({} theme)", input.display(), summary.theme);
                for mesh in &summary.meshes {
                    println!("  {:<10} {:>6} vertices {:>6} triangles", mesh.name, mesh.vertices, mesh.triangles);
                }
                for (index, count) in summary.line_quads.iter().enumerate() {
                    println!("  line {:<5} {:>6} quads", index, count);
                }
                println!("  trailing: {}", summary.trailing);
            }
        }

        Commands::Dump { input, output } => {
            let (tile, _) = session.load(&input)?;
            let json = serde_json::to_string_pretty(&tile)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    log::info!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Resave { input, output } => {
            let (tile, _) = session.load(&input)?;
            session.save(&tile, &output)?;
        }

        Commands::Clear { input, output, lines, geometry, layer } => {
            if !lines && !geometry && layer.is_empty() {
                bail!("nothing to clear: pass --lines, --geometry or --layer");
            }

            let (mut tile, _) = session.load(&input)?;
            if lines {
                tile.clear_all_lines();
            }
            if geometry {
                tile.clear_all_geometry();
            }
            for name in &layer {
                tile.clear_layer(name)?;
                log::info!("  Cleared {}", name);
            }
            session.save(&tile, &output)?;
        }

        Commands::AddLine { input, output, layer, from, to, thickness } => {
            let (mut tile, _) = session.load(&input)?;
            let thickness = thickness.unwrap_or(session.config.line_thickness);
            tile.add_line(layer, from, to, thickness)?;
            log::info!("Added line {} -> {} on layer {}", from, to, layer);
            session.save(&tile, &output)?;
        }
    }

    Ok(())
}

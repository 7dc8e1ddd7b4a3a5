//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod edit;
mod import;
mod info;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::color::Pixel;
use crate::config::{self, IconsmithConfig};
use crate::icon::{self, IconMetadata};
use crate::grid::PixelGrid;
use crate::raster::{self, Resample};
use crate::stamp::Anchor;

pub use info::PaletteAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Iconsmith - edit pixel-art icons from the command line
#[derive(Parser)]
#[command(name = "iconsmith")]
#[command(about = "Iconsmith - create, edit, and convert pixel-art icons")]
#[command(version)]
pub struct Cli {
    /// Path to iconsmith.toml (default: search upward from the current directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new blank icon document
    New {
        /// Output .json file
        output: PathBuf,

        /// Edge length in cells (default: editor.size from config)
        #[arg(long)]
        size: Option<usize>,

        /// Background color, or "transparent"
        #[arg(long, default_value = "#FFFFFF")]
        background: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Paint, erase, and fill cells of an icon
    Draw {
        /// Icon to modify (.json or bitmap)
        input: PathBuf,

        /// Drawing color for operations that do not name one
        #[arg(long)]
        color: Option<String>,

        /// Set a cell: X,Y[=COLOR] (e.g. --set 3,4=#FF0000)
        #[arg(long, value_name = "X,Y[=COLOR]")]
        set: Vec<String>,

        /// Make a cell transparent: X,Y
        #[arg(long, value_name = "X,Y")]
        erase: Vec<String>,

        /// Flood fill from a seed cell: X,Y[=COLOR]
        #[arg(long, value_name = "X,Y[=COLOR]")]
        fill: Vec<String>,

        /// Tolerance for --fill and --fill-similar (default: editor.fill_tolerance)
        #[arg(long)]
        tolerance: Option<i64>,

        /// Replace every cell close to TARGET with REPLACEMENT
        #[arg(long, value_name = "TARGET=REPLACEMENT")]
        fill_similar: Vec<String>,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply whole-image transforms in order (e.g. flip-h rotate:90 quantize:8)
    Transform {
        /// Icon to modify
        input: PathBuf,

        /// Transform operations
        #[arg(required = true, value_name = "OP")]
        ops: Vec<String>,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Overlay a stamp (icon or bitmap) onto an icon
    Stamp {
        /// Icon to modify
        input: PathBuf,

        /// Stamp file (.json or bitmap), used at its native size
        stamp: PathBuf,

        /// Top-left offset X,Y (may be negative)
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true, conflicts_with = "anchor")]
        at: Option<String>,

        /// Quick placement
        #[arg(long, value_enum)]
        anchor: Option<Anchor>,

        /// Scale factor applied to the stamp (e.g. 0.5, 2)
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Treat this color as transparent in the stamp
        #[arg(long, value_name = "COLOR")]
        chroma: Option<String>,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert bitmaps into icon documents
    Import {
        /// Image file or glob pattern (e.g. "art/*.png")
        input: String,

        /// Output .json file (single input) or directory
        /// (default: storage.icons_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Edge length in cells (default: editor.size from config)
        #[arg(long)]
        size: Option<usize>,

        /// Resampling filter (default: editor.resample from config)
        #[arg(long, value_enum)]
        resample: Option<Resample>,
    },

    /// Render an icon to PNG
    Render {
        /// Icon to render
        input: PathBuf,

        /// Output PNG (default: {input}.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Integer upscale factor
        #[arg(long, default_value_t = 1)]
        scale: u32,
    },

    /// Show icon metadata and a terminal preview
    Info {
        /// Icon to inspect
        input: PathBuf,

        /// Skip the colored preview
        #[arg(long)]
        no_preview: bool,
    },

    /// List and inspect color palettes
    Palettes {
        #[command(subcommand)]
        action: PaletteAction,
    },
}

/// Initialize `env_logger`; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::New { output, size, background, title, author, tags, description } => {
            let metadata = IconMetadata {
                title: title.unwrap_or_default(),
                author: author.unwrap_or_default(),
                tags: tags.as_deref().map(IconMetadata::parse_tags).unwrap_or_default(),
                description: description.unwrap_or_default(),
                ..IconMetadata::default()
            };
            edit::run_new(&config, &output, size, &background, metadata)
        }
        Commands::Draw { input, color, set, erase, fill, tolerance, fill_similar, output } => {
            edit::run_draw(
                &config,
                &input,
                &edit::DrawArgs {
                    color: color.as_deref(),
                    set: &set,
                    erase: &erase,
                    fill: &fill,
                    tolerance,
                    fill_similar: &fill_similar,
                },
                output.as_deref(),
            )
        }
        Commands::Transform { input, ops, output } => {
            edit::run_transform(&config, &input, &ops, output.as_deref())
        }
        Commands::Stamp { input, stamp, at, anchor, scale, chroma, output } => edit::run_stamp(
            &config,
            &input,
            &stamp,
            at.as_deref(),
            anchor,
            scale,
            chroma.as_deref(),
            output.as_deref(),
        ),
        Commands::Import { input, output, size, resample } => {
            import::run_import(&config, &input, output.as_deref(), size, resample)
        }
        Commands::Render { input, output, scale } => {
            import::run_render(&config, &input, output.as_deref(), scale)
        }
        Commands::Info { input, no_preview } => info::run_info(&config, &input, !no_preview),
        Commands::Palettes { action } => info::run_palettes(&config, action),
    }
}

/// Parse `X,Y` into unsigned cell coordinates.
/// Validate an icon edge length given on the command line.
pub(crate) fn check_size(size: usize) -> Result<usize, String> {
    if size == 0 || size > config::MAX_SIZE {
        return Err(format!("--size must be between 1 and {}, got {}", config::MAX_SIZE, size));
    }
    Ok(size)
}

pub(crate) fn parse_cell(s: &str) -> Result<(usize, usize), String> {
    let (x, y) = parse_offset(s)?;
    if x < 0 || y < 0 {
        return Err(format!("coordinates must not be negative: '{}'", s));
    }
    Ok((x as usize, y as usize))
}

/// Parse `X,Y` into signed offsets.
pub(crate) fn parse_offset(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let parse = |v: &str| {
        v.trim().parse::<i64>().map_err(|_| format!("invalid coordinate '{}' in '{}'", v.trim(), s))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Parse a color argument (hex, rgb()/rgba(), numeric list, or "transparent").
pub(crate) fn parse_pixel_arg(s: &str) -> Result<Pixel, String> {
    Pixel::parse(s).map_err(|e| format!("invalid color '{}': {}", s, e))
}

/// Parse `X,Y[=COLOR]`; a missing color yields `None`.
pub(crate) fn parse_cell_assignment(s: &str) -> Result<((usize, usize), Option<Pixel>), String> {
    match s.split_once('=') {
        Some((cell, color)) => Ok((parse_cell(cell)?, Some(parse_pixel_arg(color)?))),
        None => Ok((parse_cell(s)?, None)),
    }
}

/// Load an icon at its own size.
pub(crate) fn load_icon(
    config: &IconsmithConfig,
    path: &Path,
) -> Result<(PixelGrid, IconMetadata), icon::IconError> {
    icon::load_icon(path, None, config.editor.resample)
}

/// Write a grid to `path`: a `.json` document, or a PNG for anything else.
pub(crate) fn write_icon(
    path: &Path,
    grid: &PixelGrid,
    metadata: &IconMetadata,
) -> Result<(), icon::IconError> {
    let is_json =
        path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        icon::save_icon(path, grid, metadata)
    } else {
        Ok(raster::save_png(&raster::to_image(grid), path)?)
    }
}

/// "Did you mean" hint for a mistyped name.
pub(crate) fn did_you_mean(query: &str, candidates: &[&str]) -> Option<String> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .map(|c| (c, edit_distance(&query, &c.to_lowercase())))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| format!("Did you mean '{}'?", c))
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1).min(row[j] + 1).min(diag + usize::from(ca != *cb));
            diag = above;
        }
    }
    row[b.len()]
}

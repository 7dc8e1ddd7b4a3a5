//! Editing commands: new, draw, transform, stamp.
//!
//! Each command opens the icon in an [`EditorSession`], performs its
//! operations through the session, and writes the result.

use std::path::Path;
use std::process::ExitCode;

use crate::config::IconsmithConfig;
use crate::grid::PixelGrid;
use crate::icon::{self, IconMetadata};
use crate::session::EditorSession;
use crate::stamp::{Anchor, Stamp};
use crate::transforms::{parse_transform_str, TransformError};

use super::{
    check_size, did_you_mean, load_icon, parse_cell, parse_cell_assignment, parse_offset,
    parse_pixel_arg, write_icon, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS,
};

const TRANSFORM_OPS: &[&str] = &[
    "flip-h", "flip-v", "rotate", "invert", "grayscale", "hue", "sepia", "opacity", "pixelate",
    "quantize", "blur", "sharpen", "adjust", "overlay", "replace",
];

/// Open `input` in a session, reporting failures the CLI way.
fn open(config: &IconsmithConfig, input: &Path) -> Result<(EditorSession, IconMetadata), ExitCode> {
    let (grid, metadata) = load_icon(config, input).map_err(|e| {
        eprintln!("Error: cannot load '{}': {}", input.display(), e);
        ExitCode::from(EXIT_ERROR)
    })?;
    let session = EditorSession::load(grid, &config.editor).map_err(|e| {
        eprintln!("Error: '{}': {}", input.display(), e);
        ExitCode::from(EXIT_ERROR)
    })?;
    Ok((session, metadata))
}

fn finish(session: &EditorSession, metadata: &IconMetadata, target: &Path) -> ExitCode {
    match write_icon(target, session.grid(), metadata) {
        Ok(()) => {
            eprintln!("Wrote: {}", target.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn invalid_args(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("Error: {}", message);
    ExitCode::from(EXIT_INVALID_ARGS)
}

/// Execute the new command.
pub fn run_new(
    config: &IconsmithConfig,
    output: &Path,
    size: Option<usize>,
    background: &str,
    metadata: IconMetadata,
) -> ExitCode {
    let size = match check_size(size.unwrap_or(config.editor.size)) {
        Ok(s) => s,
        Err(e) => return invalid_args(e),
    };
    let fill = match parse_pixel_arg(background) {
        Ok(p) => p,
        Err(e) => return invalid_args(e),
    };

    let grid = PixelGrid::filled(size, size, fill);
    match icon::save_icon(output, &grid, &metadata) {
        Ok(()) => {
            eprintln!("Wrote: {} ({}x{})", output.display(), size, size);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Arguments of the draw command, grouped.
pub struct DrawArgs<'a> {
    pub color: Option<&'a str>,
    pub set: &'a [String],
    pub erase: &'a [String],
    pub fill: &'a [String],
    pub tolerance: Option<i64>,
    pub fill_similar: &'a [String],
}

/// Execute the draw command.
///
/// Operations run in this order: set, erase, fill, fill-similar. Each one is
/// a separate undoable action in the session.
pub fn run_draw(
    config: &IconsmithConfig,
    input: &Path,
    args: &DrawArgs<'_>,
    output: Option<&Path>,
) -> ExitCode {
    if args.set.is_empty()
        && args.erase.is_empty()
        && args.fill.is_empty()
        && args.fill_similar.is_empty()
    {
        return invalid_args("nothing to draw (use --set, --erase, --fill or --fill-similar)");
    }

    // Validate every argument before touching the icon.
    let base_color = match args.color.map(parse_pixel_arg).transpose() {
        Ok(c) => c,
        Err(e) => return invalid_args(e),
    };
    let sets: Result<Vec<_>, _> = args.set.iter().map(|s| parse_cell_assignment(s)).collect();
    let erases: Result<Vec<_>, _> = args.erase.iter().map(|s| parse_cell(s)).collect();
    let fills: Result<Vec<_>, _> = args.fill.iter().map(|s| parse_cell_assignment(s)).collect();
    let similar: Result<Vec<_>, String> = args
        .fill_similar
        .iter()
        .map(|s| {
            let (target, repl) = s
                .split_once('=')
                .ok_or_else(|| format!("expected TARGET=REPLACEMENT but got '{}'", s))?;
            Ok((parse_pixel_arg(target)?, parse_pixel_arg(repl)?))
        })
        .collect();
    let (sets, erases, fills, similar) = match (sets, erases, fills, similar) {
        (Ok(a), Ok(b), Ok(c), Ok(d)) => (a, b, c, d),
        (Err(e), ..) | (_, Err(e), ..) | (_, _, Err(e), _) | (.., Err(e)) => {
            return invalid_args(e)
        }
    };

    let (mut session, metadata) = match open(config, input) {
        Ok(v) => v,
        Err(code) => return code,
    };
    if let Some(color) = base_color {
        session.set_color(color);
    }
    if let Some(tolerance) = args.tolerance {
        session.set_fill_tolerance(tolerance);
    }
    let default_color = session.color();
    let tolerance = session.fill_tolerance();

    for ((x, y), color) in sets {
        session.set_color(color.unwrap_or(default_color));
        if let Err(e) = session.paint(x, y) {
            eprintln!("Error: --set {},{}: {}", x, y, e);
            return ExitCode::from(EXIT_ERROR);
        }
    }
    for (x, y) in erases {
        if let Err(e) = session.erase(x, y) {
            eprintln!("Error: --erase {},{}: {}", x, y, e);
            return ExitCode::from(EXIT_ERROR);
        }
    }
    for ((x, y), color) in fills {
        session.set_color(color.unwrap_or(default_color));
        match session.fill_at(x, y, tolerance) {
            Ok(outcome) => log::info!("fill at ({}, {}) changed {} cells", x, y, outcome.changed),
            Err(e) => {
                eprintln!("Error: --fill {},{}: {}", x, y, e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    for (target, replacement) in similar {
        session.set_color(replacement);
        match session.fill_similar(target, tolerance) {
            Ok(outcome) => log::info!("fill-similar {} changed {} cells", target, outcome.changed),
            Err(e) => {
                eprintln!("Error: --fill-similar: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    finish(&session, &metadata, output.unwrap_or(input))
}

/// Execute the transform command.
pub fn run_transform(
    config: &IconsmithConfig,
    input: &Path,
    ops: &[String],
    output: Option<&Path>,
) -> ExitCode {
    let mut transforms = Vec::with_capacity(ops.len());
    for op in ops {
        match parse_transform_str(op) {
            Ok(t) => transforms.push(t),
            Err(e) => {
                eprintln!("Error: {}", e);
                if let TransformError::UnknownOperation(name) = &e {
                    if let Some(hint) = did_you_mean(name, TRANSFORM_OPS) {
                        eprintln!("{}", hint);
                    }
                    eprintln!("Available operations: {}", TRANSFORM_OPS.join(", "));
                }
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let (mut session, metadata) = match open(config, input) {
        Ok(v) => v,
        Err(code) => return code,
    };
    for transform in &transforms {
        log::debug!("applying {}", transform.name());
        if let Err(e) = session.apply_transform(transform) {
            eprintln!("Error: {}: {}", transform.name(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    finish(&session, &metadata, output.unwrap_or(input))
}

/// Execute the stamp command.
pub fn run_stamp(
    config: &IconsmithConfig,
    input: &Path,
    stamp_path: &Path,
    at: Option<&str>,
    anchor: Option<Anchor>,
    scale: f32,
    chroma: Option<&str>,
    output: Option<&Path>,
) -> ExitCode {
    if !scale.is_finite() || scale <= 0.0 {
        return invalid_args(format!("--scale must be positive, got {}", scale));
    }
    let explicit_offset = match at.map(parse_offset).transpose() {
        Ok(o) => o,
        Err(e) => return invalid_args(e),
    };
    let chroma = match chroma.map(parse_pixel_arg).transpose() {
        Ok(c) => c,
        Err(e) => return invalid_args(e),
    };

    let stamp_grid = match icon::load_stamp_grid(stamp_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: cannot load stamp '{}': {}", stamp_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (mut session, metadata) = match open(config, input) {
        Ok(v) => v,
        Err(code) => return code,
    };

    // Only the part of the scaled stamp that can land on the icon is built.
    // A negative offset skips that many scaled cells and places the rest at 0.
    let skip = |v: i64| usize::try_from(v.min(0).unsigned_abs()).unwrap_or(usize::MAX);
    let origin = explicit_offset.map(|(x, y)| (skip(x), skip(y))).unwrap_or((0, 0));
    let mut stamp = Stamp::new(stamp_grid).scaled_from(scale, origin, session.size());
    if let Some(key) = chroma {
        stamp = stamp.with_chroma_key(key);
    }
    let offset = match explicit_offset {
        Some((x, y)) => (x.max(0), y.max(0)),
        None => anchor.unwrap_or_default().offset(session.size(), stamp.width(), stamp.height()),
    };

    match session.stamp(&stamp, offset) {
        Ok(written) => log::info!(
            "stamped {} of {} cells at {:?}",
            written,
            stamp.opaque_cells(),
            offset
        ),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    finish(&session, &metadata, output.unwrap_or(input))
}

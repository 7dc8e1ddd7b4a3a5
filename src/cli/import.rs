//! Import and render commands: bitmaps in, PNGs out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::IconsmithConfig;
use crate::icon::{self, IconMetadata};
use crate::raster::{self, RasterError, Resample};

use super::{check_size, load_icon, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Expand a path or glob pattern into existing files.
fn expand_inputs(pattern: &str) -> Result<Vec<PathBuf>, String> {
    let literal = Path::new(pattern);
    if literal.is_file() {
        return Ok(vec![literal.to_path_buf()]);
    }
    let paths = glob(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
    files.sort();
    Ok(files)
}

/// Where the document for `source` goes.
fn import_target(source: &Path, output: Option<&Path>, single: bool, icons_dir: &Path) -> PathBuf {
    let stem = source.file_stem().map(|s| s.to_string_lossy().into_owned());
    let file_name = format!("{}.json", stem.as_deref().unwrap_or("icon"));
    match output {
        Some(out) if single && out.extension().is_some_and(|e| e == "json") => out.to_path_buf(),
        Some(dir) => dir.join(file_name),
        None => icons_dir.join(file_name),
    }
}

/// Execute the import command.
pub fn run_import(
    config: &IconsmithConfig,
    input: &str,
    output: Option<&Path>,
    size: Option<usize>,
    resample: Option<Resample>,
) -> ExitCode {
    let size = match check_size(size.unwrap_or(config.editor.size)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let resample = resample.unwrap_or(config.editor.resample);

    let files = match expand_inputs(input) {
        Ok(f) if f.is_empty() => {
            eprintln!("Error: no files match '{}'", input);
            return ExitCode::from(EXIT_ERROR);
        }
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let single = files.len() == 1;
    let mut failures = 0;
    for file in &files {
        let target = import_target(file, output, single, &config.storage.icons_dir);
        let result = icon::load_icon(file, Some(size), resample).and_then(|(grid, mut metadata)| {
            if metadata.title.is_empty() {
                if let Some(stem) = file.file_stem() {
                    metadata.title = stem.to_string_lossy().into_owned();
                }
            }
            icon::save_icon(&target, &grid, &metadata)
        });
        match result {
            Ok(()) => eprintln!("Wrote: {}", target.display()),
            Err(e) => {
                eprintln!("Error: {}: {}", file.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} imports failed", failures, files.len());
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Execute the render command.
pub fn run_render(
    config: &IconsmithConfig,
    input: &Path,
    output: Option<&Path>,
    scale: u32,
) -> ExitCode {
    if scale == 0 {
        eprintln!("Error: --scale must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let (grid, _): (_, IconMetadata) = match load_icon(config, input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: cannot load '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let target = output.map(Path::to_path_buf).unwrap_or_else(|| input.with_extension("png"));
    if target == input {
        eprintln!("Error: refusing to overwrite '{}'; pass --output", input.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let image = match raster::scale_image(raster::to_image(&grid), scale) {
        Ok(img) => img,
        Err(e @ RasterError::TooLarge { .. }) => {
            eprintln!("Error: --scale {}: {}", scale, e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    match raster::save_png(&image, &target) {
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

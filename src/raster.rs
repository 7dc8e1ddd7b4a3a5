//! Raster conversion between pixel grids and RGBA bitmaps, plus PNG I/O.
//!
//! A transparent cell becomes alpha 0; any other cell keeps its RGBA value.
//! Sampling a bitmap back into cells quantizes alpha the same way, so
//! `from_image(&to_image(&grid), n, _)` returns `grid` whenever no resize
//! happens.

use std::io;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Pixel;
use crate::grid::PixelGrid;

/// Error type for raster operations
#[derive(Debug, Error)]
pub enum RasterError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Source bytes are not a decodable bitmap
    #[error("cannot decode image: {0}")]
    Decode(#[source] image::ImageError),
    /// PNG encoding failed
    #[error("cannot encode PNG: {0}")]
    Encode(#[source] image::ImageError),
    /// Image has a zero dimension
    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    /// Scaled output would exceed `MAX_SCALED_EDGE`
    #[error("{width}x{height} scaled by {factor} exceeds {max} pixels per side")]
    TooLarge { width: u32, height: u32, factor: u32, max: u32 },
}

/// Largest edge `scale_image` will produce.
pub const MAX_SCALED_EDGE: u32 = 16_384;

/// Resampling filter used when a bitmap has to be resized to the grid size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    /// Nearest-neighbor (keeps hard pixel edges)
    Nearest,
    /// Cubic interpolation
    Bicubic,
    /// Lanczos with window 3 (smooth downsampling of photos)
    #[default]
    Lanczos,
}

impl Resample {
    pub fn filter(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Bicubic => FilterType::CatmullRom,
            Resample::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Render a grid (square or not) to an RGBA bitmap of the same dimensions.
pub fn to_image(grid: &PixelGrid) -> RgbaImage {
    let mut img = RgbaImage::new(grid.width() as u32, grid.height() as u32);
    for (y, row) in grid.rows().enumerate() {
        for (x, pixel) in row.iter().enumerate() {
            img.put_pixel(x as u32, y as u32, pixel.to_rgba());
        }
    }
    img
}

/// Sample a bitmap into a `size`×`size` grid, resizing first if needed.
pub fn from_image(image: &RgbaImage, size: usize, resample: Resample) -> PixelGrid {
    from_image_sized(image, size, size, resample)
}

/// Sample a bitmap into a `width`×`height` grid, resizing first if needed.
pub fn from_image_sized(
    image: &RgbaImage,
    width: usize,
    height: usize,
    resample: Resample,
) -> PixelGrid {
    let (w, h) = (width as u32, height as u32);
    if image.dimensions() == (w, h) {
        return from_image_native(image);
    }
    log::debug!(
        "resampling {}x{} image to {}x{} ({:?})",
        image.width(),
        image.height(),
        w,
        h,
        resample
    );
    let resized = image::imageops::resize(image, w, h, resample.filter());
    from_image_native(&resized)
}

/// Sample a bitmap cell-for-pixel, without resizing.
pub fn from_image_native(image: &RgbaImage) -> PixelGrid {
    let (w, h) = image.dimensions();
    let mut grid = PixelGrid::transparent(w as usize, h as usize);
    for (x, y, px) in image.enumerate_pixels() {
        // enumerate_pixels stays inside the image, which matches the grid
        let _ = grid.set(x as usize, y as usize, Pixel::from_image(*px));
    }
    grid
}

/// Decode PNG (or any format the `image` crate recognizes) from memory.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RasterError> {
    let img = image::load_from_memory(bytes).map_err(RasterError::Decode)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(RasterError::Empty { width: img.width(), height: img.height() });
    }
    Ok(img)
}

/// Read and decode a bitmap file.
pub fn load_image(path: &Path) -> Result<RgbaImage, RasterError> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

/// Encode an RGBA bitmap as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(RasterError::Encode)?;
    Ok(bytes)
}

/// Render a grid and encode it as PNG bytes.
pub fn grid_to_png(grid: &PixelGrid) -> Result<Vec<u8>, RasterError> {
    encode_png(&to_image(grid))
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// This preserves crisp pixel edges for pixel art.
pub fn scale_image(image: RgbaImage, factor: u32) -> Result<RgbaImage, RasterError> {
    if factor <= 1 {
        return Ok(image);
    }
    let (w, h) = image.dimensions();
    let too_large = || RasterError::TooLarge { width: w, height: h, factor, max: MAX_SCALED_EDGE };
    let nw = w.checked_mul(factor).filter(|&v| v <= MAX_SCALED_EDGE).ok_or_else(too_large)?;
    let nh = h.checked_mul(factor).filter(|&v| v <= MAX_SCALED_EDGE).ok_or_else(too_large)?;
    Ok(image::imageops::resize(&image, nw, nh, FilterType::Nearest))
}

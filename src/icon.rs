//! Persisted icon documents.
//!
//! An icon is stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "metadata": { "title": "", "author": "", "tags": [], "description": "", "created_by": "iconsmith" },
//!   "pixels": [["#FF0000", null, ...], ...],
//!   "png_base64": "iVBORw0KGgo..."
//! }
//! ```
//!
//! Loading prefers `pixels`, then `png_base64`. Files with any other
//! extension are decoded as bitmaps through the raster converter.

use std::io;
use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::grid::{GridError, PixelGrid};
use crate::raster::{self, RasterError, Resample};

/// Value written to `metadata.created_by` for new documents.
pub const CREATED_BY: &str = "iconsmith";

/// Error type for icon loading and saving
#[derive(Debug, Error)]
pub enum IconError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid icon JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid png_base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    /// Document has neither `pixels` nor `png_base64`
    #[error("icon document has no pixel data")]
    NoPixelData,
}

/// Descriptive fields stored alongside the pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, alias = "publicTags", deserialize_with = "tags_from_list_or_string")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
}

impl Default for IconMetadata {
    fn default() -> Self {
        IconMetadata {
            title: String::new(),
            author: String::new(),
            tags: Vec::new(),
            description: String::new(),
            created_by: CREATED_BY.to_string(),
        }
    }
}

impl IconMetadata {
    /// Split a comma-separated tag field, dropping blanks.
    pub fn parse_tags(text: &str) -> Vec<String> {
        text.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn tags_from_list_or_string<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Tags::List(list)) => {
            list.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect()
        }
        Some(Tags::Text(text)) => IconMetadata::parse_tags(&text),
    })
}

/// The on-disk icon record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IconDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: IconMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<Vec<Option<String>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png_base64: Option<String>,
}

impl IconDocument {
    /// Build a document from a grid, rendering a fresh `png_base64`.
    pub fn from_grid(grid: &PixelGrid, metadata: IconMetadata) -> Result<Self, IconError> {
        let png = raster::grid_to_png(grid)?;
        Ok(IconDocument {
            metadata,
            pixels: Some(grid.to_text_rows()),
            png_base64: Some(base64::engine::general_purpose::STANDARD.encode(png)),
        })
    }

    /// Decode the document into a square icon grid.
    ///
    /// With `size`, the result is exactly `size`×`size`: `pixels` must
    /// already have that shape, while a `png_base64` render is resampled to
    /// it. Without `size`, the document's own square dimensions are used.
    pub fn to_grid(&self, size: Option<usize>, resample: Resample) -> Result<PixelGrid, IconError> {
        if let Some(rows) = &self.pixels {
            let grid = PixelGrid::from_text_rows(rows)?;
            if grid.is_empty() {
                return Err(GridError::InvalidShape("icon has no pixels".to_string()).into());
            }
            let expected = size.unwrap_or(grid.height());
            if grid.width() != expected || grid.height() != expected {
                return Err(GridError::InvalidShape(format!(
                    "expected {}x{} pixels, found {}x{}",
                    expected,
                    expected,
                    grid.width(),
                    grid.height()
                ))
                .into());
            }
            return Ok(grid);
        }

        let image = self.decode_png()?;
        match size {
            Some(n) => Ok(raster::from_image(&image, n, resample)),
            None if image.width() == image.height() => Ok(raster::from_image_native(&image)),
            None => Err(GridError::InvalidShape(format!(
                "embedded PNG is {}x{}, not square",
                image.width(),
                image.height()
            ))
            .into()),
        }
    }

    /// Decode the document at its native dimensions, square or not.
    pub fn to_native_grid(&self) -> Result<PixelGrid, IconError> {
        if let Some(rows) = &self.pixels {
            return Ok(PixelGrid::from_text_rows(rows)?);
        }
        Ok(raster::from_image_native(&self.decode_png()?))
    }

    fn decode_png(&self) -> Result<image::RgbaImage, IconError> {
        let encoded = self.png_base64.as_deref().ok_or(IconError::NoPixelData)?;
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Ok(raster::decode_image(&bytes)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Read and parse an icon JSON document.
pub fn load_document(path: &Path) -> Result<IconDocument, IconError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write an icon document as 2-space indented JSON, creating parent
/// directories as needed.
pub fn save_document(path: &Path, doc: &IconDocument) -> Result<(), IconError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    std::fs::write(path, json)?;
    log::debug!("saved icon document to {}", path.display());
    Ok(())
}

/// Load an icon from a `.json` document or any bitmap file.
///
/// Bitmaps keep their size when square and `size` is `None`; otherwise they
/// are resampled to `size` (or to their larger side).
pub fn load_icon(
    path: &Path,
    size: Option<usize>,
    resample: Resample,
) -> Result<(PixelGrid, IconMetadata), IconError> {
    if is_json(path) {
        let doc = load_document(path)?;
        let grid = doc.to_grid(size, resample)?;
        log::debug!("loaded {}x{} icon from {}", grid.width(), grid.height(), path.display());
        return Ok((grid, doc.metadata));
    }

    let image = raster::load_image(path)?;
    let target = size.unwrap_or_else(|| image.width().max(image.height()) as usize);
    let grid = raster::from_image(&image, target, resample);
    log::debug!("imported {} as {}x{} icon", path.display(), target, target);
    Ok((grid, IconMetadata::default()))
}

/// Load a stamp at its native dimensions from a `.json` document or bitmap.
pub fn load_stamp_grid(path: &Path) -> Result<PixelGrid, IconError> {
    if is_json(path) {
        return load_document(path)?.to_native_grid();
    }
    Ok(raster::from_image_native(&raster::load_image(path)?))
}

/// Save a grid and its metadata as an icon document.
pub fn save_icon(path: &Path, grid: &PixelGrid, metadata: &IconMetadata) -> Result<(), IconError> {
    save_document(path, &IconDocument::from_grid(grid, metadata.clone())?)
}

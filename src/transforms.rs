//! Whole-image transforms applied through the raster converter.
//!
//! Each transform renders the grid to an RGBA bitmap, operates on the
//! bitmap, and samples the result back into a grid of the original size.
//! Alpha is preserved by every color operation; only `opacity` and
//! `overlay` change it.
//!
//! String syntax (used by the CLI): `flip-h`, `flip-v`, `rotate:90`,
//! `invert`, `grayscale`, `hue:30`, `sepia`, `opacity:0.5`, `pixelate:2`,
//! `quantize:8`, `blur:1.5`, `sharpen[:SIGMA[,THRESHOLD]]`,
//! `adjust:BRIGHTNESS,CONTRAST,SATURATION`, `overlay:#RRGGBBAA`,
//! `replace:#FROM=#TO`.

use image::imageops;
use image::{Rgba, RgbaImage};

use crate::color::parse_color;
use crate::grid::PixelGrid;
use crate::raster::{self, Resample};

/// Errors that can occur during transform parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
    /// Unknown transform operation
    #[error("unknown transform operation: {0}")]
    UnknownOperation(String),

    /// Invalid parameter value
    #[error("invalid parameter for {op}: {message}")]
    InvalidParameter { op: String, message: String },

    /// Missing required parameter
    #[error("missing required parameter for {op}: {param}")]
    MissingParameter { op: String, param: String },

    /// Invalid rotation degrees (must be 90, 180, or 270)
    #[error("invalid rotation degrees: {0} (must be 90, 180, or 270)")]
    InvalidRotation(u16),
}

/// A single whole-image operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    FlipHorizontal,
    FlipVertical,
    /// Clockwise quarter turns: 90, 180 or 270 degrees
    Rotate { degrees: u16 },
    Invert,
    Grayscale,
    HueShift { degrees: i32 },
    Sepia,
    /// Multiply alpha by `factor` (0.0-1.0)
    Opacity { factor: f32 },
    /// Nearest-neighbor downscale by `block`, then back up
    Pixelate { block: u32 },
    /// Reduce to at most `colors` colors
    Quantize { colors: usize },
    Blur { sigma: f32 },
    Sharpen { sigma: f32, threshold: i32 },
    /// Enhance factors; 1.0 leaves the channel unchanged
    Adjust { brightness: f32, contrast: f32, saturation: f32 },
    /// Composite a uniform color over the image
    Overlay { color: Rgba<u8> },
    /// Replace cells whose RGB equals `from` exactly
    ReplaceColor { from: Rgba<u8>, to: Rgba<u8> },
}

impl Transform {
    /// Short operation name, as accepted by [`parse_transform_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Transform::FlipHorizontal => "flip-h",
            Transform::FlipVertical => "flip-v",
            Transform::Rotate { .. } => "rotate",
            Transform::Invert => "invert",
            Transform::Grayscale => "grayscale",
            Transform::HueShift { .. } => "hue",
            Transform::Sepia => "sepia",
            Transform::Opacity { .. } => "opacity",
            Transform::Pixelate { .. } => "pixelate",
            Transform::Quantize { .. } => "quantize",
            Transform::Blur { .. } => "blur",
            Transform::Sharpen { .. } => "sharpen",
            Transform::Adjust { .. } => "adjust",
            Transform::Overlay { .. } => "overlay",
            Transform::ReplaceColor { .. } => "replace",
        }
    }
}

/// Parse transform from string syntax: "flip-h", "rotate:90", "quantize:8"
///
/// # Alias Resolution
/// - `mirror-h` → `FlipHorizontal`, `mirror-v` → `FlipVertical`
/// - `rot` → `Rotate`
/// - `greyscale` → `Grayscale`
pub fn parse_transform_str(s: &str) -> Result<Transform, TransformError> {
    let s = s.trim();

    let (op, params) =
        if let Some(idx) = s.find(':') { (&s[..idx], Some(&s[idx + 1..])) } else { (s, None) };

    let op_lower = op.to_lowercase();

    match op_lower.as_str() {
        "flip-h" | "mirror-h" => Ok(Transform::FlipHorizontal),
        "flip-v" | "mirror-v" => Ok(Transform::FlipVertical),
        "rotate" | "rot" => {
            let degrees: u16 = parse_param("rotate", "degrees", params)?;
            if !matches!(degrees, 90 | 180 | 270) {
                return Err(TransformError::InvalidRotation(degrees));
            }
            Ok(Transform::Rotate { degrees })
        }
        "invert" => Ok(Transform::Invert),
        "grayscale" | "greyscale" => Ok(Transform::Grayscale),
        "hue" => Ok(Transform::HueShift { degrees: parse_param("hue", "degrees", params)? }),
        "sepia" => Ok(Transform::Sepia),
        "opacity" => {
            let factor: f32 = parse_param("opacity", "factor", params)?;
            if !(0.0..=1.0).contains(&factor) {
                return Err(invalid("opacity", format!("{} is outside 0.0-1.0", factor)));
            }
            Ok(Transform::Opacity { factor })
        }
        "pixelate" => {
            let block: u32 = parse_param("pixelate", "block", params)?;
            if block == 0 {
                return Err(invalid("pixelate", "block size must be at least 1".to_string()));
            }
            Ok(Transform::Pixelate { block })
        }
        "quantize" => {
            let colors: usize = parse_param("quantize", "colors", params)?;
            if !(2..=256).contains(&colors) {
                return Err(invalid("quantize", format!("{} colors is outside 2-256", colors)));
            }
            Ok(Transform::Quantize { colors })
        }
        "blur" => {
            let sigma = match params {
                Some(_) => parse_param("blur", "sigma", params)?,
                None => 1.0,
            };
            Ok(Transform::Blur { sigma })
        }
        "sharpen" => {
            let (sigma, threshold) = match params {
                None => (1.0, 0),
                Some(p) => match p.split_once(',') {
                    Some((s, t)) => (
                        parse_param("sharpen", "sigma", Some(s))?,
                        parse_param("sharpen", "threshold", Some(t))?,
                    ),
                    None => (parse_param("sharpen", "sigma", Some(p))?, 0),
                },
            };
            Ok(Transform::Sharpen { sigma, threshold })
        }
        "adjust" => {
            let raw = params.ok_or_else(|| missing("adjust", "BRIGHTNESS,CONTRAST,SATURATION"))?;
            let parts: Vec<&str> = raw.split(',').collect();
            if parts.len() != 3 {
                return Err(invalid("adjust", format!("expected 3 factors, got {}", parts.len())));
            }
            Ok(Transform::Adjust {
                brightness: parse_param("adjust", "brightness", Some(parts[0]))?,
                contrast: parse_param("adjust", "contrast", Some(parts[1]))?,
                saturation: parse_param("adjust", "saturation", Some(parts[2]))?,
            })
        }
        "overlay" => {
            let raw = params.ok_or_else(|| missing("overlay", "color"))?;
            let color = parse_color(raw).map_err(|e| invalid("overlay", e.to_string()))?;
            Ok(Transform::Overlay { color })
        }
        "replace" => {
            let raw = params.ok_or_else(|| missing("replace", "FROM=TO"))?;
            let (from, to) = raw
                .split_once('=')
                .ok_or_else(|| invalid("replace", format!("expected FROM=TO, got '{}'", raw)))?;
            Ok(Transform::ReplaceColor {
                from: parse_color(from).map_err(|e| invalid("replace", e.to_string()))?,
                to: parse_color(to).map_err(|e| invalid("replace", e.to_string()))?,
            })
        }
        _ => Err(TransformError::UnknownOperation(op.to_string())),
    }
}

fn missing(op: &str, param: &str) -> TransformError {
    TransformError::MissingParameter { op: op.to_string(), param: param.to_string() }
}

fn invalid(op: &str, message: String) -> TransformError {
    TransformError::InvalidParameter { op: op.to_string(), message }
}

fn parse_param<T: std::str::FromStr>(
    op: &str,
    param: &str,
    raw: Option<&str>,
) -> Result<T, TransformError> {
    let raw = raw.ok_or_else(|| missing(op, param))?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| invalid(op, format!("cannot parse '{}' as {}", raw.trim(), param)))
}

/// Apply a transform to a grid, returning a grid of the same dimensions.
pub fn apply(grid: &PixelGrid, transform: &Transform, resample: Resample) -> PixelGrid {
    let image = apply_to_image(raster::to_image(grid), transform);
    raster::from_image_sized(&image, grid.width(), grid.height(), resample)
}

/// Apply a transform to a bitmap.
pub fn apply_to_image(image: RgbaImage, transform: &Transform) -> RgbaImage {
    match transform {
        Transform::FlipHorizontal => imageops::flip_horizontal(&image),
        Transform::FlipVertical => imageops::flip_vertical(&image),
        Transform::Rotate { degrees: 90 } => imageops::rotate90(&image),
        Transform::Rotate { degrees: 180 } => imageops::rotate180(&image),
        Transform::Rotate { degrees: 270 } => imageops::rotate270(&image),
        Transform::Rotate { .. } => image,
        Transform::Invert => map_pixels(image, |[r, g, b, a]| [255 - r, 255 - g, 255 - b, a]),
        Transform::Grayscale => map_pixels(image, |[r, g, b, a]| {
            let l = luma(r, g, b);
            [l, l, l, a]
        }),
        Transform::HueShift { degrees } => imageops::huerotate(&image, *degrees),
        Transform::Sepia => map_pixels(image, |[r, g, b, a]| {
            let (r, g, b) = (r as f32, g as f32, b as f32);
            [
                clamp_channel(r * 0.393 + g * 0.769 + b * 0.189),
                clamp_channel(r * 0.349 + g * 0.686 + b * 0.168),
                clamp_channel(r * 0.272 + g * 0.534 + b * 0.131),
                a,
            ]
        }),
        Transform::Opacity { factor } => {
            map_pixels(image, |[r, g, b, a]| [r, g, b, (a as f32 * factor) as u8])
        }
        Transform::Pixelate { block } => pixelate(&image, *block),
        Transform::Quantize { colors } => quantize(image, *colors),
        Transform::Blur { sigma } => imageops::blur(&image, *sigma),
        Transform::Sharpen { sigma, threshold } => imageops::unsharpen(&image, *sigma, *threshold),
        Transform::Adjust { brightness, contrast, saturation } => {
            adjust(image, *brightness, *contrast, *saturation)
        }
        Transform::Overlay { color } => overlay(image, *color),
        Transform::ReplaceColor { from, to } => {
            let (from, to) = (from.0, to.0);
            map_pixels(image, |px| {
                if px[3] != 0 && px[..3] == from[..3] {
                    to
                } else {
                    px
                }
            })
        }
    }
}

fn map_pixels(mut image: RgbaImage, f: impl Fn([u8; 4]) -> [u8; 4]) -> RgbaImage {
    for px in image.pixels_mut() {
        px.0 = f(px.0);
    }
    image
}

/// ITU-R 601-2 luma.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

fn clamp_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn pixelate(image: &RgbaImage, block: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let small_w = (w / block).max(1);
    let small_h = (h / block).max(1);
    let small = imageops::resize(image, small_w, small_h, imageops::FilterType::Nearest);
    imageops::resize(&small, w, h, imageops::FilterType::Nearest)
}

fn quantize(image: RgbaImage, colors: usize) -> RgbaImage {
    let quantizer = color_quant::NeuQuant::new(1, colors, image.as_raw());
    let map = quantizer.color_map_rgba();
    map_pixels(image, |px| {
        if px[3] == 0 {
            return px;
        }
        let idx = quantizer.index_of(&px) * 4;
        [map[idx], map[idx + 1], map[idx + 2], px[3]]
    })
}

/// Blend each pixel between a degenerate image and itself, the way
/// brightness, contrast and saturation enhancers are usually defined.
fn adjust(image: RgbaImage, brightness: f32, contrast: f32, saturation: f32) -> RgbaImage {
    let blend = |degenerate: f32, value: u8, factor: f32| -> u8 {
        clamp_channel(degenerate + (value as f32 - degenerate) * factor)
    };

    let image = map_pixels(image, |[r, g, b, a]| {
        [blend(0.0, r, brightness), blend(0.0, g, brightness), blend(0.0, b, brightness), a]
    });

    let visible: Vec<u8> =
        image.pixels().filter(|p| p[3] != 0).map(|p| luma(p[0], p[1], p[2])).collect();
    let mean = if visible.is_empty() {
        0.0
    } else {
        (visible.iter().map(|&l| l as f32).sum::<f32>() / visible.len() as f32).round()
    };
    let image = map_pixels(image, |[r, g, b, a]| {
        [blend(mean, r, contrast), blend(mean, g, contrast), blend(mean, b, contrast), a]
    });

    map_pixels(image, |[r, g, b, a]| {
        let l = luma(r, g, b) as f32;
        [blend(l, r, saturation), blend(l, g, saturation), blend(l, b, saturation), a]
    })
}

/// Source-over composite of a uniform `color` onto every pixel.
fn overlay(image: RgbaImage, color: Rgba<u8>) -> RgbaImage {
    let [or, og, ob, oa] = color.0;
    let top_a = oa as f32 / 255.0;
    map_pixels(image, |[r, g, b, a]| {
        let base_a = a as f32 / 255.0;
        let out_a = top_a + base_a * (1.0 - top_a);
        if out_a <= 0.0 {
            return [0, 0, 0, 0];
        }
        let mix = |top: u8, base: u8| -> u8 {
            clamp_channel((top as f32 * top_a + base as f32 * base_a * (1.0 - top_a)) / out_a)
        };
        [mix(or, r), mix(og, g), mix(ob, b), clamp_channel(out_a * 255.0)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Pixel;

    const RED: Pixel = Pixel::Opaque(255, 0, 0);
    const BLUE: Pixel = Pixel::Opaque(0, 0, 255);

    fn corner_grid() -> PixelGrid {
        let mut grid = PixelGrid::new(3);
        grid.set(0, 0, RED).unwrap();
        grid.set(2, 2, Pixel::Transparent).unwrap();
        grid
    }

    #[test]
    fn test_parse_simple_ops() {
        assert_eq!(parse_transform_str("flip-h").unwrap(), Transform::FlipHorizontal);
        assert_eq!(parse_transform_str("MIRROR-V").unwrap(), Transform::FlipVertical);
        assert_eq!(parse_transform_str("rotate:90").unwrap(), Transform::Rotate { degrees: 90 });
        assert_eq!(parse_transform_str("quantize:4").unwrap(), Transform::Quantize { colors: 4 });
        assert_eq!(parse_transform_str("blur").unwrap(), Transform::Blur { sigma: 1.0 });
        assert_eq!(
            parse_transform_str("sharpen:2,5").unwrap(),
            Transform::Sharpen { sigma: 2.0, threshold: 5 }
        );
    }

    #[test]
    fn test_parse_color_params() {
        assert_eq!(
            parse_transform_str("replace:#FF0000=#00FF00").unwrap(),
            Transform::ReplaceColor { from: Rgba([255, 0, 0, 255]), to: Rgba([0, 255, 0, 255]) }
        );
        assert_eq!(
            parse_transform_str("overlay:#0000FF80").unwrap(),
            Transform::Overlay { color: Rgba([0, 0, 255, 128]) }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_transform_str("rotate:45"), Err(TransformError::InvalidRotation(45)));
        assert!(matches!(
            parse_transform_str("rotate"),
            Err(TransformError::MissingParameter { .. })
        ));
        assert!(matches!(
            parse_transform_str("quantize:1"),
            Err(TransformError::InvalidParameter { .. })
        ));
        assert!(matches!(
            parse_transform_str("adjust:1,2"),
            Err(TransformError::InvalidParameter { .. })
        ));
        assert!(matches!(
            parse_transform_str("explode"),
            Err(TransformError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_flip_horizontal() {
        let out = apply(&corner_grid(), &Transform::FlipHorizontal, Resample::Nearest);
        assert_eq!(out.get(2, 0), Some(RED));
        assert_eq!(out.get(0, 2), Some(Pixel::Transparent));
    }

    #[test]
    fn test_flip_vertical() {
        let out = apply(&corner_grid(), &Transform::FlipVertical, Resample::Nearest);
        assert_eq!(out.get(0, 2), Some(RED));
        assert_eq!(out.get(2, 0), Some(Pixel::Transparent));
    }

    #[test]
    fn test_rotate_quarter_turns() {
        let grid = corner_grid();
        let once = apply(&grid, &Transform::Rotate { degrees: 90 }, Resample::Nearest);
        assert_eq!(once.get(2, 0), Some(RED));
        let back = apply(&once, &Transform::Rotate { degrees: 270 }, Resample::Nearest);
        assert_eq!(back, grid);
        let half = apply(&grid, &Transform::Rotate { degrees: 180 }, Resample::Nearest);
        assert_eq!(half.get(2, 2), Some(RED));
    }

    #[test]
    fn test_invert_keeps_alpha() {
        let out = apply(&corner_grid(), &Transform::Invert, Resample::Nearest);
        assert_eq!(out.get(0, 0), Some(Pixel::Opaque(0, 255, 255)));
        assert_eq!(out.get(1, 1), Some(Pixel::BLACK));
        assert_eq!(out.get(2, 2), Some(Pixel::Transparent));
    }

    #[test]
    fn test_grayscale() {
        let out = apply(&corner_grid(), &Transform::Grayscale, Resample::Nearest);
        assert_eq!(out.get(0, 0), Some(Pixel::Opaque(76, 76, 76)));
        assert_eq!(out.get(1, 1), Some(Pixel::WHITE));
        assert_eq!(out.get(2, 2), Some(Pixel::Transparent));
    }

    #[test]
    fn test_opacity() {
        let out = apply(&corner_grid(), &Transform::Opacity { factor: 0.5 }, Resample::Nearest);
        assert_eq!(out.get(0, 0), Some(Pixel::Translucent(255, 0, 0, 127)));
        let cleared = apply(&corner_grid(), &Transform::Opacity { factor: 0.0 }, Resample::Nearest);
        assert_eq!(cleared.count_transparent(), 9);
    }

    #[test]
    fn test_replace_color_exact_rgb() {
        let transform = Transform::ReplaceColor {
            from: Rgba([255, 0, 0, 255]),
            to: Rgba([0, 0, 255, 255]),
        };
        let out = apply(&corner_grid(), &transform, Resample::Nearest);
        assert_eq!(out.get(0, 0), Some(BLUE));
        assert_eq!(out.get(1, 0), Some(Pixel::WHITE));
    }

    #[test]
    fn test_replace_black_leaves_transparent_cells() {
        let transform = Transform::ReplaceColor {
            from: Rgba([0, 0, 0, 255]),
            to: Rgba([0, 0, 255, 255]),
        };
        let out = apply(&corner_grid(), &transform, Resample::Nearest);
        assert_eq!(out.get(2, 2), Some(Pixel::Transparent));
    }

    #[test]
    fn test_overlay_opaque_color_covers_everything() {
        let out = apply(
            &corner_grid(),
            &Transform::Overlay { color: Rgba([0, 0, 255, 255]) },
            Resample::Nearest,
        );
        assert!(out.cells().iter().all(|p| *p == BLUE));
    }

    #[test]
    fn test_adjust_identity() {
        let grid = corner_grid();
        let transform = Transform::Adjust { brightness: 1.0, contrast: 1.0, saturation: 1.0 };
        assert_eq!(apply(&grid, &transform, Resample::Nearest), grid);
    }

    #[test]
    fn test_adjust_zero_brightness_is_black() {
        let transform = Transform::Adjust { brightness: 0.0, contrast: 1.0, saturation: 1.0 };
        let out = apply(&corner_grid(), &transform, Resample::Nearest);
        assert_eq!(out.get(1, 1), Some(Pixel::BLACK));
        assert_eq!(out.get(2, 2), Some(Pixel::Transparent));
    }

    #[test]
    fn test_adjust_zero_saturation_is_gray() {
        let transform = Transform::Adjust { brightness: 1.0, contrast: 1.0, saturation: 0.0 };
        let out = apply(&corner_grid(), &transform, Resample::Nearest);
        assert_eq!(out.get(0, 0), Some(Pixel::Opaque(76, 76, 76)));
    }

    #[test]
    fn test_pixelate_keeps_size() {
        let mut grid = PixelGrid::new(4);
        grid.set(1, 1, RED).unwrap();
        let out = apply(&grid, &Transform::Pixelate { block: 2 }, Resample::Nearest);
        assert_eq!((out.width(), out.height()), (4, 4));
        // each 2x2 block is now uniform
        for (bx, by) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            let c = out.get(bx, by);
            assert_eq!(out.get(bx + 1, by), c);
            assert_eq!(out.get(bx, by + 1), c);
            assert_eq!(out.get(bx + 1, by + 1), c);
        }
    }

    #[test]
    fn test_quantize_limits_colors() {
        let mut grid = PixelGrid::new(8);
        for y in 0..8 {
            for x in 0..8 {
                grid.set(x, y, Pixel::Opaque((x * 32) as u8, (y * 32) as u8, 128)).unwrap();
            }
        }
        let out = apply(&grid, &Transform::Quantize { colors: 4 }, Resample::Nearest);
        assert!(out.count_distinct() <= 4);
    }

    #[test]
    fn test_hue_shift_keeps_transparency() {
        let out = apply(&corner_grid(), &Transform::HueShift { degrees: 120 }, Resample::Nearest);
        assert_eq!(out.get(2, 2), Some(Pixel::Transparent));
        assert_ne!(out.get(0, 0), Some(RED));
    }

    #[test]
    fn test_sepia_white() {
        let out = apply(&corner_grid(), &Transform::Sepia, Resample::Nearest);
        assert_eq!(out.get(1, 1), Some(Pixel::Opaque(255, 255, 239)));
    }
}

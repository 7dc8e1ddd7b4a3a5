//! Color codec for icon cells
//!
//! Supports the following textual formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` (the `#` is optional)
//! - Functional: `rgb(r, g, b)` and `rgba(r, g, b, a)` where `a` is a 0-1
//!   fraction or a 0-255 integer
//! - Numeric lists: `r,g,b` / `r g b a`
//!
//! A cell is a [`Pixel`]: transparent, opaque, or translucent. The canonical
//! text form is uppercase `#RRGGBB` for opaque cells, `#RRGGBBAA` for
//! translucent cells, and no text at all (`null` in JSON) for transparent ones.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use image::Rgba;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance reported between a transparent cell and any concrete color.
pub const MAX_DISTANCE_SENTINEL: u32 = 255;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// A numeric component is missing, negative, or above 255
    #[error("invalid color component '{0}'")]
    InvalidComponent(String),
    /// Input matches none of the supported notations
    #[error("unrecognized color '{0}'")]
    Unrecognized(String),
}

/// One grid cell.
///
/// Built with [`Pixel::from_rgba`], which keeps the three variants canonical:
/// alpha 0 always becomes `Transparent` and alpha 255 always becomes `Opaque`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pixel {
    /// Fully transparent / unset cell
    #[default]
    Transparent,
    /// Fully opaque RGB color
    Opaque(u8, u8, u8),
    /// RGB color with partial alpha (1..=254)
    Translucent(u8, u8, u8, u8),
}

impl Pixel {
    pub const WHITE: Pixel = Pixel::Opaque(255, 255, 255);
    pub const BLACK: Pixel = Pixel::Opaque(0, 0, 0);

    /// Build a cell from RGBA components, normalizing the alpha extremes.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        match a {
            0 => Pixel::Transparent,
            255 => Pixel::Opaque(r, g, b),
            _ => Pixel::Translucent(r, g, b, a),
        }
    }

    /// Build a cell from an `image` RGBA pixel.
    pub fn from_image(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self::from_rgba(r, g, b, a)
    }

    /// RGBA components; transparent cells map to `[0, 0, 0, 0]`.
    pub fn to_rgba(self) -> Rgba<u8> {
        match self {
            Pixel::Transparent => Rgba([0, 0, 0, 0]),
            Pixel::Opaque(r, g, b) => Rgba([r, g, b, 255]),
            Pixel::Translucent(r, g, b, a) => Rgba([r, g, b, a]),
        }
    }

    /// RGB components, or `None` for a transparent cell.
    pub fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Pixel::Transparent => None,
            Pixel::Opaque(r, g, b) | Pixel::Translucent(r, g, b, _) => Some((r, g, b)),
        }
    }

    pub fn alpha(self) -> u8 {
        self.to_rgba()[3]
    }

    pub fn is_transparent(self) -> bool {
        matches!(self, Pixel::Transparent)
    }

    /// Canonical hex text, `None` for a transparent cell.
    pub fn to_hex(self) -> Option<String> {
        match self {
            Pixel::Transparent => None,
            other => Some(encode(other.to_rgba())),
        }
    }

    /// Strictly parse a cell. Empty text, `none` and `transparent` yield
    /// [`Pixel::Transparent`]; everything else goes through [`parse_color`].
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("transparent")
        {
            return Ok(Pixel::Transparent);
        }
        parse_color(trimmed).map(Pixel::from_image)
    }

    /// The opaque color a translucent cell shows when drawn over white.
    pub fn composite_over_white(self) -> Option<(u8, u8, u8)> {
        let [r, g, b, a] = self.to_rgba().0;
        if a == 0 {
            return None;
        }
        let blend = |c: u8| -> u8 {
            ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8
        };
        Some((blend(r), blend(g), blend(b)))
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_hex() {
            Some(hex) => f.write_str(&hex),
            None => f.write_str("transparent"),
        }
    }
}

impl FromStr for Pixel {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pixel::parse(s)
    }
}

impl Serialize for Pixel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_hex() {
            Some(hex) => serializer.serialize_str(&hex),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Pixel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(Pixel::Transparent),
            Some(s) => Pixel::parse(&s).map_err(de::Error::custom),
        }
    }
}

/// Parse a color string into RGBA components.
///
/// # Examples
///
/// ```
/// use iconsmith::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("#00FF0080").unwrap(), image::Rgba([0, 255, 0, 128]));
/// assert_eq!(parse_color("rgba(0, 0, 255, 0.5)").unwrap(), image::Rgba([0, 0, 255, 127]));
/// assert_eq!(parse_color("10, 20, 30").unwrap(), image::Rgba([10, 20, 30, 255]));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is invalid or unparseable.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    let lower = s.to_ascii_lowercase();
    if lower.starts_with("rgba") || lower.starts_with("rgb(") {
        return parse_functional(s);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    if s.contains(|c: char| c == ',' || c.is_whitespace()) {
        return parse_numeric_list(s);
    }

    if s.chars().all(|c| c.is_ascii_hexdigit()) {
        return parse_hex_color(s);
    }

    Err(ColorError::Unrecognized(s.to_string()))
}

/// Decode a color, falling back to opaque black when the text is malformed.
///
/// This keeps the forgiving behavior of free-text color fields; callers that
/// need to report bad input use [`parse_color`] instead.
pub fn decode_lenient(s: &str) -> Rgba<u8> {
    match parse_color(s) {
        Ok(rgba) => rgba,
        Err(e) => {
            log::warn!("color '{}' could not be decoded ({}), using black", s, e);
            Rgba([0, 0, 0, 255])
        }
    }
}

/// Encode RGBA components as `#RRGGBB` (alpha 255) or `#RRGGBBAA`.
pub fn encode(rgba: Rgba<u8>) -> String {
    let [r, g, b, a] = rgba.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

/// Alpha-blind Euclidean RGB distance between two cells.
///
/// Two transparent cells are at distance 0; a transparent cell and any
/// concrete color are at [`MAX_DISTANCE_SENTINEL`].
pub fn distance(a: Pixel, b: Pixel) -> u32 {
    match (a.rgb(), b.rgb()) {
        (None, None) => 0,
        (None, Some(_)) | (Some(_), None) => MAX_DISTANCE_SENTINEL,
        (Some((r1, g1, b1)), Some((r2, g2, b2))) => {
            let dr = r1 as i32 - r2 as i32;
            let dg = g1 as i32 - g2 as i32;
            let db = b1 as i32 - b2 as i32;
            ((dr * dr + dg * dg + db * db) as f64).sqrt() as u32
        }
    }
}

/// Squared RGB distance, used for nearest-color searches.
pub fn distance_sq(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Parse hex digits (without `#`) of length 3, 4, 6 or 8.
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<u8> = hex.bytes().map(hex_value).collect();
    match digits.len() {
        3 => Ok(Rgba([digits[0] * 17, digits[1] * 17, digits[2] * 17, 255])),
        4 => Ok(Rgba([digits[0] * 17, digits[1] * 17, digits[2] * 17, digits[3] * 17])),
        6 | 8 => {
            let pair = |i: usize| digits[i] * 16 + digits[i + 1];
            let a = if digits.len() == 8 { pair(6) } else { 255 };
            Ok(Rgba([pair(0), pair(2), pair(4), a]))
        }
        len => Err(ColorError::InvalidLength(len)),
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"-?[0-9]*\.?[0-9]+").expect("valid number pattern"))
}

/// `rgb(...)` / `rgba(...)`. A fourth component of at most 1 is a fraction.
fn parse_functional(s: &str) -> Result<Rgba<u8>, ColorError> {
    let nums: Vec<&str> = number_regex().find_iter(s).map(|m| m.as_str()).collect();
    if nums.len() < 3 {
        return Err(ColorError::InvalidComponent(s.to_string()));
    }
    let r = component(nums[0])?;
    let g = component(nums[1])?;
    let b = component(nums[2])?;
    let a = match nums.get(3) {
        None => 255,
        Some(raw) => {
            let value: f64 = raw.parse().map_err(|_| ColorError::InvalidComponent(raw.to_string()))?;
            if (0.0..=1.0).contains(&value) {
                (value * 255.0) as u8
            } else {
                component(raw)?
            }
        }
    };
    Ok(Rgba([r, g, b, a]))
}

/// `r,g,b[,a]` separated by commas and/or whitespace; alpha is 0-255.
fn parse_numeric_list(s: &str) -> Result<Rgba<u8>, ColorError> {
    let parts: Vec<&str> =
        s.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(ColorError::Unrecognized(s.to_string()));
    }
    let r = component(parts[0])?;
    let g = component(parts[1])?;
    let b = component(parts[2])?;
    let a = match parts.get(3) {
        Some(raw) => component(raw)?,
        None => 255,
    };
    Ok(Rgba([r, g, b, a]))
}

/// A 0-255 component; fractional values are truncated.
fn component(raw: &str) -> Result<u8, ColorError> {
    let value: f64 = raw.parse().map_err(|_| ColorError::InvalidComponent(raw.to_string()))?;
    if !(0.0..256.0).contains(&value) {
        return Err(ColorError::InvalidComponent(raw.to_string()));
    }
    Ok(value as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse_color("#F00").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("#F008").unwrap(), Rgba([255, 0, 0, 136]));
    }

    #[test]
    fn test_parse_hex_without_hash() {
        assert_eq!(parse_color("00ff00").unwrap(), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        assert_eq!(parse_color("#11223344").unwrap(), Rgba([0x11, 0x22, 0x33, 0x44]));
    }

    #[test]
    fn test_parse_invalid_hex() {
        assert_eq!(parse_color("#GG0000"), Err(ColorError::InvalidHex('G')));
        assert_eq!(parse_color("#12345"), Err(ColorError::InvalidLength(5)));
        assert_eq!(parse_color(""), Err(ColorError::Empty));
        assert!(matches!(parse_color("banana"), Err(ColorError::Unrecognized(_))));
    }

    #[test]
    fn test_parse_rgba_fraction_and_integer_alpha() {
        assert_eq!(parse_color("rgba(10, 20, 30, 0.5)").unwrap(), Rgba([10, 20, 30, 127]));
        assert_eq!(parse_color("rgba(10, 20, 30, 200)").unwrap(), Rgba([10, 20, 30, 200]));
        assert_eq!(parse_color("rgb(1, 2, 3)").unwrap(), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_parse_numeric_lists() {
        assert_eq!(parse_color("1,2,3").unwrap(), Rgba([1, 2, 3, 255]));
        assert_eq!(parse_color("1 2 3 4").unwrap(), Rgba([1, 2, 3, 4]));
        assert!(matches!(parse_color("1,2,300"), Err(ColorError::InvalidComponent(_))));
    }

    #[test]
    fn test_decode_lenient_falls_back_to_black() {
        assert_eq!(decode_lenient("not a color"), Rgba([0, 0, 0, 255]));
        assert_eq!(decode_lenient("#0000FF"), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_encode_drops_opaque_alpha() {
        assert_eq!(encode(Rgba([255, 0, 0, 255])), "#FF0000");
        assert_eq!(encode(Rgba([255, 0, 0, 128])), "#FF000080");
    }

    #[test]
    fn test_hex_roundtrip_normalizes() {
        for (input, expected) in [
            ("#ff8800", "#FF8800"),
            ("#FF8800FF", "#FF8800"),
            ("#ff880080", "#FF880080"),
            ("#00000001", "#00000001"),
        ] {
            assert_eq!(encode(parse_color(input).unwrap()), expected);
        }
    }

    #[test]
    fn test_pixel_from_rgba_normalizes_alpha() {
        assert_eq!(Pixel::from_rgba(9, 9, 9, 0), Pixel::Transparent);
        assert_eq!(Pixel::from_rgba(9, 9, 9, 255), Pixel::Opaque(9, 9, 9));
        assert_eq!(Pixel::from_rgba(9, 9, 9, 7), Pixel::Translucent(9, 9, 9, 7));
    }

    #[test]
    fn test_pixel_parse_transparent_forms() {
        assert_eq!(Pixel::parse("").unwrap(), Pixel::Transparent);
        assert_eq!(Pixel::parse("none").unwrap(), Pixel::Transparent);
        assert_eq!(Pixel::parse("#12345600").unwrap(), Pixel::Transparent);
        assert_eq!(Pixel::parse("#123456").unwrap(), Pixel::Opaque(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_distance_properties() {
        let red = Pixel::Opaque(255, 0, 0);
        let faded_red = Pixel::Translucent(255, 0, 0, 10);
        assert_eq!(distance(red, red), 0);
        assert_eq!(distance(red, faded_red), 0);
        assert_eq!(distance(Pixel::Transparent, Pixel::Transparent), 0);
        assert_eq!(distance(Pixel::Transparent, red), 255);
        assert_eq!(distance(Pixel::BLACK, Pixel::Transparent), 255);
        assert_eq!(distance(Pixel::BLACK, Pixel::WHITE), 441);
        assert_eq!(distance(Pixel::Opaque(0, 0, 0), Pixel::Opaque(3, 4, 0)), 5);
    }

    #[test]
    fn test_serde_pixel() {
        let cells = vec![Pixel::Opaque(1, 2, 3), Pixel::Transparent, Pixel::Translucent(1, 2, 3, 4)];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r##"["#010203",null,"#01020304"]"##);
        let back: Vec<Pixel> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_serde_rejects_bad_color() {
        let result: Result<Vec<Pixel>, _> = serde_json::from_str(r##"["#XYZ"]"##);
        assert!(result.is_err());
    }

    #[test]
    fn test_composite_over_white() {
        assert_eq!(Pixel::Opaque(10, 20, 30).composite_over_white(), Some((10, 20, 30)));
        assert_eq!(Pixel::Transparent.composite_over_white(), None);
        assert_eq!(Pixel::Translucent(0, 0, 0, 128).composite_over_white(), Some((127, 127, 127)));
    }
}

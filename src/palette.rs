//! Built-in color sets and palette snapping.
//!
//! Palettes are looked up by name, case-insensitively; spaces, dashes and
//! underscores are interchangeable, so `earth-tones` finds "Earth Tones".

use std::collections::HashMap;

use crate::color::{decode_lenient, distance_sq, parse_color, Pixel};
use crate::grid::PixelGrid;

/// A named, ordered list of opaque colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<Pixel>,
}

impl Palette {
    /// Build a palette from color text, decoding leniently.
    ///
    /// Entries that fail to parse fall back to opaque black with a warning.
    /// Duplicate colors are dropped, keeping the first occurrence.
    pub fn from_text<S: AsRef<str>>(name: &str, entries: &[S]) -> Self {
        let colors =
            dedup(entries.iter().map(|e| Pixel::from_image(decode_lenient(e.as_ref()))));
        Palette { name: name.to_string(), colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Nearest palette color by squared RGB distance; the first entry wins
    /// ties. Transparent cells (and an empty palette) map to themselves.
    pub fn nearest(&self, pixel: Pixel) -> Pixel {
        let Some(rgb) = pixel.rgb() else {
            return pixel;
        };
        self.colors
            .iter()
            .filter_map(|c| c.rgb().map(|crgb| (*c, distance_sq(rgb, crgb))))
            .min_by_key(|(_, d)| *d)
            .map(|(c, _)| c)
            .unwrap_or(pixel)
    }
}

fn dedup(pixels: impl Iterator<Item = Pixel>) -> Vec<Pixel> {
    let mut colors: Vec<Pixel> = Vec::new();
    for pixel in pixels {
        if !colors.contains(&pixel) {
            colors.push(pixel);
        }
    }
    colors
}

const DEFAULT: &[&str] = &[
    "#000000", "#222222", "#444444", "#666666", "#888888", "#AAAAAA", "#CCCCCC", "#FFFFFF",
    "#FF0000", "#CC3333", "#FF6666", "#FF9999", "#FFCCCC", "#00FF00", "#33CC33", "#66FF66",
    "#99FF99", "#CCFFCC", "#0000FF", "#3333CC", "#6666FF", "#9999FF", "#CCCCFF", "#FFFF00",
    "#FFCC00", "#FF9900", "#FF6600", "#FFA500", "#FF00FF", "#CC33CC", "#FF66FF", "#FF99FF",
    "#FFCCFF", "#00FFFF", "#33CCCC", "#66FFFF", "#99FFFF", "#CCFFFF", "#800080", "#A52A2A",
    "#008000", "#808000", "#008080", "#C0C0C0", "#FFD700", "#B22222", "#228B22", "#4169E1",
    "#FF69B4", "#00CED1", "#F5DEB3", "#2F4F4F",
];

const PASTEL: &[&str] = &[
    "#FFD1DC", "#FFB7B2", "#FFDAC1", "#E2F0CB", "#B5EAD7", "#C7CEEA", "#B0E0E6", "#E0BBE4",
    "#F3E5AB", "#E6E6FA", "#F5DEB3", "#D8BFD8", "#E0FFFF", "#F0FFF0", "#F5F5DC", "#FFE4E1",
    "#F3C6E2", "#F7CAC9", "#B5B9D6", "#C1F0F6", "#F8BBD0", "#FADADD", "#E6CFCF", "#F9E3E3",
    "#F6E3B4", "#FFFACD", "#FFF5E1", "#FDFD96", "#E0F7FA", "#B2EBF2", "#B2DFDB", "#DCEDC8",
    "#C8E6C9", "#D1F2EB", "#E0F2F1", "#D7BDE2", "#A9DFBF", "#F9E79F", "#F7DC6F", "#F5CBA7",
    "#FAD7A0", "#FDEBD0", "#F6DDCC", "#E3E4FA", "#D6CADD", "#C3B1E1", "#B39EB5", "#B2A1C7",
    "#C1B2D7", "#D1CFE2", "#E2D6F7",
];

const VIVID: &[&str] = &[
    "#FF0000", "#FF4000", "#FF8000", "#FFBF00", "#FFFF00", "#BFFF00", "#80FF00", "#40FF00",
    "#00FF00", "#00FF40", "#00FF80", "#00FFBF", "#00FFFF", "#00BFFF", "#0080FF", "#0040FF",
    "#0000FF", "#4000FF", "#8000FF", "#BF00FF", "#FF00FF", "#FF00BF", "#FF0080", "#FF0040",
    "#FFA500", "#800080", "#008000", "#808000", "#008080", "#C0C0C0", "#A52A2A", "#FFD700",
    "#B22222", "#228B22", "#4169E1", "#FF69B4", "#00CED1", "#F5DEB3", "#2F4F4F",
];

const EARTH_TONES: &[&str] = &[
    "#3B2F2F", "#8B5C2A", "#A0522D", "#C19A6B", "#BDB76B", "#DEB887", "#F4A460", "#D2B48C",
    "#EEDC82", "#C2B280", "#8B7D6B", "#6B4226", "#4E3629", "#7C482B", "#A67B5B", "#B2996E",
    "#C9AE5D", "#8B8000", "#556B2F", "#228B22", "#2E8B57", "#6B8E23", "#8FBC8F", "#BC8F8F",
    "#CD853F", "#D2691E", "#8B4513", "#FFF8DC", "#F5DEB3", "#FFE4C4", "#FFDAB9", "#6E260E",
    "#FFF5EE", "#FAEBD7", "#FFEBCD", "#FFEFD5",
];

const NEON: &[&str] = &[
    "#39FF14", "#FF073A", "#FDFD96", "#FF6EC7", "#FFB347", "#FF44CC", "#00FFFF", "#FF00FF",
    "#FFFF00", "#FF3131", "#FFB3DE", "#B3FFB3", "#B3B3FF", "#FFB3B3", "#B3FFFF", "#FFFFB3",
    "#B3FFEC", "#FFB3EC", "#ECFFB3", "#B3ECFF", "#ECB3FF", "#FFECB3", "#B3FF39", "#39B3FF",
    "#FF39B3", "#B339FF", "#39FFB3", "#FF3939", "#39FF39", "#3939FF", "#FF39FF", "#39FFFF",
    "#FFFF39", "#FF1493", "#FF4500", "#FF6347", "#FF69B4", "#FF7F50", "#FF8C00", "#FFA07A",
    "#FFA500", "#FFB6C1", "#FFC0CB", "#FFD700", "#FFE4B5", "#FFE4E1", "#FFEBCD", "#FFEFD5",
];

const GREYSCALE: &[&str] = &[
    "#000000", "#1A1A1A", "#333333", "#4D4D4D", "#666666", "#808080", "#999999", "#B3B3B3",
    "#CCCCCC", "#E6E6E6", "#FFFFFF",
];

const RETRO: &[&str] = &[
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#C0C0C0", "#808080", "#800000", "#808000", "#008000", "#800080", "#008080", "#000080",
    "#FFA500", "#A52A2A", "#F5DEB3", "#B22222", "#228B22", "#4169E1", "#FF69B4", "#FFD700",
    "#B39EB5", "#F49AC2", "#B2EC5D", "#77DD77", "#CB99C9", "#779ECB",
];

/// Built-in palette names, in display order.
const BUILTIN_NAMES: &[&str] =
    &["Default", "Pastel", "Vivid", "Earth Tones", "Neon", "Greyscale", "Retro"];

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', '_'], " ")
}

/// Returns a built-in palette by name, or None if not found.
pub fn get_builtin(name: &str) -> Option<Palette> {
    let (display, entries) = match normalize_name(name).as_str() {
        "default" => ("Default", DEFAULT),
        "pastel" => ("Pastel", PASTEL),
        "vivid" => ("Vivid", VIVID),
        "earth tones" => ("Earth Tones", EARTH_TONES),
        "neon" => ("Neon", NEON),
        "greyscale" | "grayscale" => ("Greyscale", GREYSCALE),
        "retro" => ("Retro", RETRO),
        _ => return None,
    };
    let colors = dedup(entries.iter().filter_map(|c| parse_color(c).ok()).map(Pixel::from_image));
    Some(Palette { name: display.to_string(), colors })
}

/// Resolve a palette name against user palettes first, then built-ins.
pub fn resolve(name: &str, custom: &HashMap<String, Vec<String>>) -> Option<Palette> {
    let wanted = normalize_name(name);
    custom
        .iter()
        .find(|(k, _)| normalize_name(k) == wanted)
        .map(|(k, entries)| Palette::from_text(k, entries))
        .or_else(|| get_builtin(name))
}

/// Replace every non-transparent cell with its nearest palette color.
///
/// Returns the number of cells whose value changed. Alpha of translucent
/// cells is dropped; snapped cells are opaque palette colors.
pub fn snap_to_palette(grid: &mut PixelGrid, palette: &Palette) -> usize {
    if palette.is_empty() {
        return 0;
    }
    let mut changed = 0;
    for cell in grid.cells_mut() {
        let snapped = palette.nearest(*cell);
        if snapped != *cell {
            *cell = snapped;
            changed += 1;
        }
    }
    changed
}

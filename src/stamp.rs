//! Stamps: small grids overlaid onto an icon at an offset.
//!
//! Transparent stamp cells are skipped, so only the drawn part of a stamp
//! lands on the icon. Cells that fall outside the icon are clipped.

use std::fmt;
use std::str::FromStr;

use crate::color::Pixel;
use crate::grid::PixelGrid;

/// A rectangular grid of cells to be overlaid onto an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    grid: PixelGrid,
}

impl Stamp {
    pub fn new(grid: PixelGrid) -> Self {
        Stamp { grid }
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Nearest-neighbor rescale. Integer factors replicate each cell into a
    /// `factor`×`factor` block; fractional factors shrink the stamp. The
    /// result is never smaller than 1×1 unless the stamp is empty.
    ///
    /// At most `max_edge` cells per side are kept, from the top-left. Pass
    /// the icon size: larger stamps are clipped when stamped anyway.
    pub fn scaled(&self, factor: f32, max_edge: usize) -> Stamp {
        self.scaled_from(factor, (0, 0), max_edge)
    }

    /// Like [`Stamp::scaled`], but the kept window starts `origin` cells
    /// into the scaled stamp. A window past the scaled stamp is empty.
    pub fn scaled_from(&self, factor: f32, origin: (usize, usize), max_edge: usize) -> Stamp {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return self.clone();
        }
        let factor = if factor.is_finite() && factor > 0.0 { f64::from(factor) } else { 1.0 };
        // `as` saturates, so absurd factors stay representable.
        let scaled_len = |extent: usize| ((extent as f64 * factor).round() as usize).max(1);
        let (nw, nh) = (scaled_len(w), scaled_len(h));
        let out_w = nw.saturating_sub(origin.0).min(max_edge);
        let out_h = nh.saturating_sub(origin.1).min(max_edge);
        let source = |t: usize, extent: usize, scaled: usize| {
            let s = t as u128 * extent as u128 / scaled as u128;
            (s as usize).min(extent - 1)
        };

        let mut out = PixelGrid::transparent(out_w, out_h);
        for ty in 0..out_h {
            let sy = source(origin.1 + ty, h, nh);
            for tx in 0..out_w {
                let sx = source(origin.0 + tx, w, nw);
                if let Some(p) = self.grid.get(sx, sy) {
                    let _ = out.set(tx, ty, p);
                }
            }
        }
        Stamp { grid: out }
    }

    /// Make every cell whose RGB equals `key` transparent, ignoring alpha.
    pub fn with_chroma_key(&self, key: Pixel) -> Stamp {
        let mut grid = self.grid.clone();
        if let Some(key_rgb) = key.rgb() {
            for cell in grid.cells_mut() {
                if cell.rgb() == Some(key_rgb) {
                    *cell = Pixel::Transparent;
                }
            }
        }
        Stamp { grid }
    }

    /// Number of cells that would be written when stamped fully inside.
    pub fn opaque_cells(&self) -> usize {
        self.grid.cells().len() - self.grid.count_transparent()
    }
}

/// Overlay `stamp` onto `grid` with its top-left corner at `offset`.
///
/// Offsets may be negative; the part of the stamp outside the grid is
/// clipped. Returns the number of cells written.
pub fn stamp_onto(grid: &mut PixelGrid, stamp: &Stamp, offset: (i64, i64)) -> usize {
    let (ox, oy) = offset;
    let (gw, gh) = (grid.width() as i64, grid.height() as i64);
    let mut written = 0;
    for (sy, row) in stamp.grid.rows().enumerate() {
        let y = oy + sy as i64;
        if y < 0 || y >= gh {
            continue;
        }
        for (sx, &pixel) in row.iter().enumerate() {
            let x = ox + sx as i64;
            if pixel.is_transparent() || x < 0 || x >= gw {
                continue;
            }
            if grid.set(x as usize, y as usize, pixel).is_ok() {
                written += 1;
            }
        }
    }
    written
}

/// Quick placement positions on a 3×3 layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Offset that places a `stamp_w`×`stamp_h` stamp at this anchor on a
    /// square grid of `size`. A stamp larger than the grid pins to 0.
    pub fn offset(self, size: usize, stamp_w: usize, stamp_h: usize) -> (i64, i64) {
        let start = |_: usize| 0usize;
        let middle = |extent: usize| size.saturating_sub(extent) / 2;
        let end = |extent: usize| size.saturating_sub(extent);

        let (x, y) = match self {
            Anchor::TopLeft => (start(stamp_w), start(stamp_h)),
            Anchor::TopCenter => (middle(stamp_w), start(stamp_h)),
            Anchor::TopRight => (end(stamp_w), start(stamp_h)),
            Anchor::MiddleLeft => (start(stamp_w), middle(stamp_h)),
            Anchor::Center => (middle(stamp_w), middle(stamp_h)),
            Anchor::MiddleRight => (end(stamp_w), middle(stamp_h)),
            Anchor::BottomLeft => (start(stamp_w), end(stamp_h)),
            Anchor::BottomCenter => (middle(stamp_w), end(stamp_h)),
            Anchor::BottomRight => (end(stamp_w), end(stamp_h)),
        };
        (x as i64, y as i64)
    }

    pub fn label(self) -> &'static str {
        match self {
            Anchor::TopLeft => "Top Left",
            Anchor::TopCenter => "Top Center",
            Anchor::TopRight => "Top Right",
            Anchor::MiddleLeft => "Middle Left",
            Anchor::Center => "Center",
            Anchor::MiddleRight => "Middle Right",
            Anchor::BottomLeft => "Bottom Left",
            Anchor::BottomCenter => "Bottom Center",
            Anchor::BottomRight => "Bottom Right",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        Anchor::ALL
            .into_iter()
            .find(|a| a.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown anchor '{}'", s))
    }
}

//! Terminal preview of icons using 24-bit ANSI background colors.

use crate::color::Pixel;
use crate::grid::PixelGrid;

/// ANSI escape sequence to reset all formatting
pub const ANSI_RESET: &str = "\x1b[0m";

/// Background escape for one cell.
///
/// Transparent cells use a dark gray so they stand apart from black;
/// translucent cells show the color they would have over white.
///
/// ```
/// use iconsmith::color::Pixel;
/// use iconsmith::terminal::color_to_ansi_bg;
///
/// assert_eq!(color_to_ansi_bg(Pixel::Opaque(255, 0, 0)), "\x1b[48;2;255;0;0m");
/// assert_eq!(color_to_ansi_bg(Pixel::Transparent), "\x1b[48;5;236m");
/// ```
pub fn color_to_ansi_bg(pixel: Pixel) -> String {
    match pixel.composite_over_white() {
        Some((r, g, b)) => format!("\x1b[48;2;{};{};{}m", r, g, b),
        None => "\x1b[48;5;236m".to_string(),
    }
}

/// Render a grid as rows of two-space cells, one text line per grid row.
pub fn render_ansi_grid(grid: &PixelGrid) -> String {
    let mut output = String::new();
    for row in grid.rows() {
        for &pixel in row {
            output.push_str(&color_to_ansi_bg(pixel));
            output.push_str("  ");
        }
        output.push_str(ANSI_RESET);
        output.push('\n');
    }
    output
}

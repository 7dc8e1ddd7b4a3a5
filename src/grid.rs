//! Pixel grid: a fixed-size matrix of [`Pixel`] cells.
//!
//! Cells are stored flat in row-major order and addressed with `(x, y)`
//! coordinates where `(0, 0)` is the top-left corner, `x` is the column and
//! `y` is the row. Dimensions are fixed at construction; every public
//! constructor validates that the rows form a full rectangle.

use std::collections::HashSet;

use thiserror::Error;

use crate::color::{ColorError, Pixel};

/// Error type for grid construction and access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Rows do not form the expected matrix.
    #[error("invalid grid shape: {0}")]
    InvalidShape(String),
    /// Coordinate outside the grid.
    #[error("coordinates ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    /// A cell held an undecodable color.
    #[error("cell ({x}, {y}): {source}")]
    InvalidCell {
        x: usize,
        y: usize,
        #[source]
        source: ColorError,
    },
}

/// A rectangular grid of cells. Icons are square; stamps may be rectangular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    cells: Vec<Pixel>,
    width: usize,
    height: usize,
}

impl PixelGrid {
    /// A `size`×`size` grid filled with opaque white.
    pub fn new(size: usize) -> Self {
        Self::filled(size, size, Pixel::WHITE)
    }

    /// A `width`×`height` grid with every cell set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Pixel) -> Self {
        PixelGrid { cells: vec![fill; width * height], width, height }
    }

    /// A fully transparent `width`×`height` grid.
    pub fn transparent(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::Transparent)
    }

    /// Build a grid from rows, requiring every row to have the same length.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::InvalidShape(format!(
                    "row {} has {} cells, expected {} (rows must have consistent width)",
                    y,
                    row.len(),
                    width
                )));
            }
        }

        Ok(PixelGrid { cells: rows.into_iter().flatten().collect(), width, height })
    }

    /// Build a square grid from rows, rejecting anything that is not `size`×`size`.
    pub fn from_rows_square(rows: Vec<Vec<Pixel>>, size: usize) -> Result<Self, GridError> {
        if rows.len() != size {
            return Err(GridError::InvalidShape(format!(
                "expected {} rows, found {}",
                size,
                rows.len()
            )));
        }
        let grid = Self::from_rows(rows)?;
        if grid.width != size {
            return Err(GridError::InvalidShape(format!(
                "expected {} columns, found {}",
                size, grid.width
            )));
        }
        Ok(grid)
    }

    /// Decode rows of optional color strings (`None` is transparent).
    pub fn from_text_rows(rows: &[Vec<Option<String>>]) -> Result<Self, GridError> {
        let mut decoded = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            for (x, cell) in row.iter().enumerate() {
                let pixel = match cell {
                    None => Pixel::Transparent,
                    Some(text) => Pixel::parse(text)
                        .map_err(|source| GridError::InvalidCell { x, y, source })?,
                };
                cells.push(pixel);
            }
            decoded.push(cells);
        }
        Self::from_rows(decoded)
    }

    /// Grid width (number of columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (number of rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> GridError {
        GridError::OutOfBounds { x, y, width: self.width, height: self.height }
    }

    /// Get the cell at (x, y). Returns `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get the cell at (x, y) or an `OutOfBounds` error.
    pub fn try_get(&self, x: usize, y: usize) -> Result<Pixel, GridError> {
        self.get(x, y).ok_or_else(|| self.out_of_bounds(x, y))
    }

    /// Set the cell at (x, y). Returns error if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) -> Result<(), GridError> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        let idx = self.index(x, y);
        self.cells[idx] = pixel;
        Ok(())
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[Pixel] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Pixel] {
        &mut self.cells
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        // chunks(0) panics, and an empty grid has no rows anyway
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Pixel>> {
        self.rows().map(<[Pixel]>::to_vec).collect()
    }

    /// Rows of canonical hex strings (`None` for transparent cells).
    pub fn to_text_rows(&self) -> Vec<Vec<Option<String>>> {
        self.rows().map(|row| row.iter().map(|p| p.to_hex()).collect()).collect()
    }

    /// Set every cell to `pixel`.
    pub fn fill_all(&mut self, pixel: Pixel) {
        self.cells.iter_mut().for_each(|c| *c = pixel);
    }

    /// Number of distinct non-transparent colors.
    pub fn count_distinct(&self) -> usize {
        self.cells.iter().filter(|p| !p.is_transparent()).collect::<HashSet<_>>().len()
    }

    /// Number of transparent cells.
    pub fn count_transparent(&self) -> usize {
        self.cells.iter().filter(|p| p.is_transparent()).count()
    }
}

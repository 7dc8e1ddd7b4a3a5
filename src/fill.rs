//! Flood fill and fill-similar over a [`PixelGrid`].
//!
//! Both operations use the alpha-blind [`distance`] metric: a cell matches
//! when `distance(cell, target) <= tolerance`.

use crate::color::{distance, Pixel};
use crate::grid::{GridError, PixelGrid};

/// Default tolerance used by the editor's fill tool.
pub const DEFAULT_TOLERANCE: u32 = 32;

/// Result of a fill operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillOutcome {
    /// Number of cells written.
    pub changed: usize,
}

impl FillOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed == 0
    }
}

/// Flood fill the 4-connected region reachable from `seed`.
///
/// Every cell reachable from the seed through matching cells (the seed
/// included) is set to `replacement`. The seed is held to the same predicate
/// as every other cell, so a seed that does not match `target` fills
/// nothing. Filling with `replacement == target` is a no-op.
///
/// Traversal uses an explicit stack and a visited bitmap, so each cell is
/// evaluated at most once.
pub fn flood_fill(
    grid: &mut PixelGrid,
    seed: (usize, usize),
    target: Pixel,
    replacement: Pixel,
    tolerance: i64,
) -> Result<FillOutcome, GridError> {
    let (sx, sy) = seed;
    grid.try_get(sx, sy)?;

    if replacement == target {
        log::debug!("flood fill at ({},{}) with {} is a no-op (same as target)", sx, sy, target);
        return Ok(FillOutcome::default());
    }

    let tolerance = tolerance.max(0) as u64;
    let width = grid.width();
    let height = grid.height();
    let mut visited = vec![false; width * height];
    let mut stack = vec![(sx, sy)];
    let mut changed = 0;

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        let current = grid.cells()[idx];
        if distance(current, target) as u64 > tolerance {
            continue;
        }

        grid.cells_mut()[idx] = replacement;
        changed += 1;

        // Neighbors past the edge are dropped; the boundary does not wrap.
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if x > 0 {
            stack.push((x - 1, y));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
    }

    Ok(FillOutcome { changed })
}

/// Replace every cell within `tolerance` of `target`, connected or not.
pub fn fill_similar(
    grid: &mut PixelGrid,
    target: Pixel,
    replacement: Pixel,
    tolerance: i64,
) -> FillOutcome {
    if replacement == target {
        return FillOutcome::default();
    }
    let tolerance = tolerance.max(0) as u64;
    let mut changed = 0;
    for cell in grid.cells_mut() {
        if distance(*cell, target) as u64 <= tolerance {
            *cell = replacement;
            changed += 1;
        }
    }
    FillOutcome { changed }
}

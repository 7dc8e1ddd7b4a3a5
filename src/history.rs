//! Bounded undo/redo history of grid snapshots.

use std::collections::VecDeque;

use crate::grid::PixelGrid;

/// Undo depth used when nothing else is configured.
pub const DEFAULT_DEPTH: usize = 50;

/// Two stacks of deep-copied grids.
///
/// `push_undo` records the pre-mutation grid and clears redo. `undo` and
/// `redo` move snapshots between the stacks and never clear either one.
/// When the undo stack is full the oldest snapshot is dropped silently.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<PixelGrid>,
    redo: Vec<PixelGrid>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl History {
    /// Create a history holding at most `depth` undo snapshots (at least one).
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        History { undo: VecDeque::with_capacity(depth), redo: Vec::new(), depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Record `grid` as the state before a new mutation.
    pub fn push_undo(&mut self, grid: &PixelGrid) {
        self.undo.push_back(grid.clone());
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
        log::debug!("history: push (undo={}, redo cleared)", self.undo.len());
    }

    /// Step back. Returns the previous grid, or `None` when there is nothing
    /// to undo (an empty stack is a no-op, not an error).
    pub fn undo(&mut self, current: &PixelGrid) -> Option<PixelGrid> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        log::debug!("history: undo (undo={}, redo={})", self.undo.len(), self.redo.len());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &PixelGrid) -> Option<PixelGrid> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        log::debug!("history: redo (undo={}, redo={})", self.undo.len(), self.redo.len());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Forget every snapshot.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Pixel;

    fn grid_with(value: u8) -> PixelGrid {
        PixelGrid::filled(2, 2, Pixel::Opaque(value, value, value))
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut history = History::default();
        assert!(history.undo(&grid_with(0)).is_none());
        assert!(history.redo(&grid_with(0)).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::default();
        let before = grid_with(1);
        let after = grid_with(2);
        history.push_undo(&before);

        assert_eq!(history.undo(&after), Some(before.clone()));
        assert!(history.can_redo());
        assert_eq!(history.redo(&before), Some(after));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::default();
        history.push_undo(&grid_with(1));
        history.push_undo(&grid_with(2));
        history.undo(&grid_with(3));
        assert_eq!(history.redo_len(), 1);
        history.push_undo(&grid_with(4));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_depth_cap_drops_oldest() {
        let mut history = History::new(3);
        for v in 0..5 {
            history.push_undo(&grid_with(v));
        }
        assert_eq!(history.undo_len(), 3);
        let current = grid_with(9);
        assert_eq!(history.undo(&current), Some(grid_with(4)));
        assert_eq!(history.undo(&current), Some(grid_with(3)));
        assert_eq!(history.undo(&current), Some(grid_with(2)));
        assert_eq!(history.undo(&current), None);
    }

    #[test]
    fn test_default_depth_is_fifty() {
        let mut history = History::default();
        for v in 0..60 {
            history.push_undo(&grid_with(v));
        }
        assert_eq!(history.undo_len(), 50);
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut history = History::default();
        let mut grid = grid_with(1);
        history.push_undo(&grid);
        grid.set(0, 0, Pixel::BLACK).unwrap();
        assert_eq!(history.undo(&grid), Some(grid_with(1)));
    }
}

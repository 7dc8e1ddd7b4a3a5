//! Editor session: one live grid, a current color, and undo history.
//!
//! Every successful mutating operation is one logical action and records
//! exactly one history snapshot, even when no cell changed, so a new action
//! always clears redo. Operations run against a working copy, so a failed
//! operation leaves the grid untouched and records nothing.
//!
//! Drag painting is a gesture: `begin_stroke`, any number of `stroke_to`
//! calls, then `end_stroke`. The whole stroke undoes as one step.

use std::fmt;

use thiserror::Error;

use crate::color::Pixel;
use crate::config::EditorConfig;
use crate::fill::{self, FillOutcome};
use crate::grid::{GridError, PixelGrid};
use crate::history::History;
use crate::icon::IconMetadata;
use crate::palette::{self, Palette};
use crate::raster::Resample;
use crate::stamp::{self, Stamp};
use crate::transforms::{self, Transform};

/// What the session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Painting,
    Filling,
    Stamping,
    /// Whole-grid operations: transforms, palette snapping, clear, replace
    Transforming,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::Idle => "idle",
            Gesture::Painting => "painting",
            Gesture::Filling => "filling",
            Gesture::Stamping => "stamping",
            Gesture::Transforming => "transforming",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Another gesture has not finished yet
    #[error("cannot start a new action while {0}")]
    GestureInProgress(Gesture),
    /// `stroke_to`/`end_stroke` without `begin_stroke`
    #[error("no stroke in progress")]
    NoActiveStroke,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The editor's state for one icon.
#[derive(Debug, Clone)]
pub struct EditorSession {
    grid: PixelGrid,
    size: usize,
    color: Pixel,
    history: History,
    gesture: Gesture,
    stroke_base: Option<PixelGrid>,
    fill_tolerance: i64,
    resample: Resample,
    pub metadata: IconMetadata,
}

impl EditorSession {
    /// A session with an all-white `size`×`size` grid and default settings.
    pub fn new(size: usize) -> Self {
        EditorSession {
            grid: PixelGrid::new(size),
            size,
            color: Pixel::BLACK,
            history: History::default(),
            gesture: Gesture::Idle,
            stroke_base: None,
            fill_tolerance: fill::DEFAULT_TOLERANCE as i64,
            resample: Resample::default(),
            metadata: IconMetadata::default(),
        }
    }

    /// A session using the editor section of the configuration.
    pub fn with_config(config: &EditorConfig) -> Self {
        EditorSession {
            color: config.color(),
            history: History::new(config.history_depth),
            fill_tolerance: config.fill_tolerance as i64,
            resample: config.resample,
            ..Self::new(config.size)
        }
    }

    /// Open an existing square grid. Its edge length overrides
    /// `config.size`, and the history starts empty.
    pub fn load(grid: PixelGrid, config: &EditorConfig) -> Result<Self, SessionError> {
        if grid.is_empty() {
            return Err(GridError::InvalidShape("icon has no pixels".to_string()).into());
        }
        if !grid.is_square() {
            return Err(GridError::InvalidShape(format!(
                "icons must be square, got {}x{}",
                grid.width(),
                grid.height()
            ))
            .into());
        }
        let mut session = Self::with_config(config);
        session.size = grid.width();
        session.grid = grid;
        Ok(session)
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn color(&self) -> Pixel {
        self.color
    }

    pub fn set_color(&mut self, color: Pixel) {
        self.color = color;
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn fill_tolerance(&self) -> i64 {
        self.fill_tolerance
    }

    pub fn set_fill_tolerance(&mut self, tolerance: i64) {
        self.fill_tolerance = tolerance.max(0);
    }

    pub fn resample(&self) -> Resample {
        self.resample
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            active => Err(SessionError::GestureInProgress(active)),
        }
    }

    /// Run one logical action against a working copy of the grid.
    fn mutate<T>(
        &mut self,
        kind: Gesture,
        op: impl FnOnce(&mut PixelGrid) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        self.ensure_idle()?;
        self.gesture = kind;
        let mut working = self.grid.clone();
        let result = op(&mut working);
        self.gesture = Gesture::Idle;

        let value = result?;
        self.commit(working);
        Ok(value)
    }

    fn commit(&mut self, next: PixelGrid) {
        if next == self.grid {
            log::debug!("action changed no cells");
        }
        self.history.push_undo(&self.grid);
        self.grid = next;
    }

    /// Set one cell to the current color.
    pub fn paint(&mut self, x: usize, y: usize) -> Result<(), SessionError> {
        let color = self.color;
        self.mutate(Gesture::Painting, |grid| Ok(grid.set(x, y, color)?))
    }

    /// Make one cell transparent.
    pub fn erase(&mut self, x: usize, y: usize) -> Result<(), SessionError> {
        self.mutate(Gesture::Painting, |grid| Ok(grid.set(x, y, Pixel::Transparent)?))
    }

    /// Start a drag-paint gesture.
    pub fn begin_stroke(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.gesture = Gesture::Painting;
        self.stroke_base = Some(self.grid.clone());
        log::debug!("stroke started with {}", self.color);
        Ok(())
    }

    /// Paint a cell as part of the current stroke.
    ///
    /// An out-of-bounds cell is reported and skipped; the stroke continues.
    pub fn stroke_to(&mut self, x: usize, y: usize) -> Result<(), SessionError> {
        if self.stroke_base.is_none() {
            return Err(SessionError::NoActiveStroke);
        }
        Ok(self.grid.set(x, y, self.color)?)
    }

    /// Finish the stroke, recording one snapshot for the whole gesture.
    pub fn end_stroke(&mut self) -> Result<(), SessionError> {
        let base = self.stroke_base.take().ok_or(SessionError::NoActiveStroke)?;
        self.gesture = Gesture::Idle;
        self.history.push_undo(&base);
        log::debug!("stroke finished");
        Ok(())
    }

    /// Abandon the stroke and restore the grid as it was before it began.
    pub fn cancel_stroke(&mut self) -> Result<(), SessionError> {
        let base = self.stroke_base.take().ok_or(SessionError::NoActiveStroke)?;
        self.gesture = Gesture::Idle;
        self.grid = base;
        Ok(())
    }

    /// Flood fill from `(x, y)` with the current color. The target is the
    /// seed cell's color.
    pub fn fill_at(&mut self, x: usize, y: usize, tolerance: i64) -> Result<FillOutcome, SessionError> {
        let replacement = self.color;
        self.mutate(Gesture::Filling, |grid| {
            let target = grid.try_get(x, y)?;
            Ok(fill::flood_fill(grid, (x, y), target, replacement, tolerance)?)
        })
    }

    /// Replace every cell within `tolerance` of `target` with the current color.
    pub fn fill_similar(&mut self, target: Pixel, tolerance: i64) -> Result<FillOutcome, SessionError> {
        let replacement = self.color;
        self.mutate(Gesture::Filling, |grid| {
            Ok(fill::fill_similar(grid, target, replacement, tolerance))
        })
    }

    /// Overlay a stamp with its top-left corner at `offset`.
    pub fn stamp(&mut self, stamp: &Stamp, offset: (i64, i64)) -> Result<usize, SessionError> {
        self.mutate(Gesture::Stamping, |grid| Ok(stamp::stamp_onto(grid, stamp, offset)))
    }

    /// Apply a whole-image transform.
    pub fn apply_transform(&mut self, transform: &Transform) -> Result<(), SessionError> {
        let resample = self.resample;
        self.mutate(Gesture::Transforming, |grid| {
            *grid = transforms::apply(grid, transform, resample);
            Ok(())
        })
    }

    /// Snap every visible cell to its nearest palette color.
    pub fn snap_to_palette(&mut self, palette: &Palette) -> Result<usize, SessionError> {
        self.mutate(Gesture::Transforming, |grid| Ok(palette::snap_to_palette(grid, palette)))
    }

    /// Reset every cell to opaque white.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.mutate(Gesture::Transforming, |grid| {
            grid.fill_all(Pixel::WHITE);
            Ok(())
        })
    }

    /// Swap in a loaded grid. It must match the session size.
    pub fn replace_grid(&mut self, grid: PixelGrid) -> Result<(), SessionError> {
        let size = self.size;
        self.mutate(Gesture::Transforming, move |current| {
            if grid.width() != size || grid.height() != size {
                return Err(GridError::InvalidShape(format!(
                    "expected {}x{} grid, got {}x{}",
                    size,
                    size,
                    grid.width(),
                    grid.height()
                ))
                .into());
            }
            *current = grid;
            Ok(())
        })
    }

    /// Eyedropper: make the color at `(x, y)` the current color.
    pub fn sample(&mut self, x: usize, y: usize) -> Result<Pixel, SessionError> {
        let picked = self.grid.try_get(x, y)?;
        self.color = picked;
        log::debug!("sampled {} at ({}, {})", picked, x, y);
        Ok(picked)
    }

    /// Step back one action. Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        match self.history.undo(&self.grid) {
            Some(previous) => {
                self.grid = previous;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-apply the last undone action. Returns false when there was nothing
    /// to redo.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        match self.history.redo(&self.grid) {
            Some(next) => {
                self.grid = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

//! Iconsmith - core of a pixel-art icon editor
//!
//! This library provides:
//! - A color codec and a fixed-size pixel grid
//! - Conversion between grids and RGBA bitmaps, with PNG I/O
//! - Flood fill, stamps, palettes and whole-image transforms
//! - Bounded undo/redo history and an editor session tying them together
//! - The icon JSON document format and a headless CLI

pub mod cli;
pub mod color;
pub mod config;
pub mod fill;
pub mod grid;
pub mod history;
pub mod icon;
pub mod palette;
pub mod raster;
pub mod session;
pub mod stamp;
pub mod terminal;
pub mod transforms;

//! Info command implementations (info, palettes)

use clap::Subcommand;
use std::path::Path;
use std::process::ExitCode;

use crate::config::IconsmithConfig;
use crate::palette::{self, Palette};
use crate::terminal::{color_to_ansi_bg, render_ansi_grid, ANSI_RESET};

use super::{did_you_mean, load_icon, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum PaletteAction {
    /// List built-in and configured palettes
    List,
    /// Show the colors of a palette
    Show {
        /// Name of the palette to show
        name: String,
    },
}

/// Execute the info command
pub fn run_info(config: &IconsmithConfig, input: &Path, preview: bool) -> ExitCode {
    let (grid, metadata) = match load_icon(config, input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: cannot load '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    println!("File:        {}", input.display());
    println!("Size:        {}x{}", grid.width(), grid.height());
    println!("Colors:      {}", grid.count_distinct());
    println!("Transparent: {}", grid.count_transparent());
    if !metadata.title.is_empty() {
        println!("Title:       {}", metadata.title);
    }
    if !metadata.author.is_empty() {
        println!("Author:      {}", metadata.author);
    }
    if !metadata.tags.is_empty() {
        println!("Tags:        {}", metadata.tags.join(", "));
    }
    if !metadata.description.is_empty() {
        println!("Description: {}", metadata.description);
    }
    if !metadata.created_by.is_empty() {
        println!("Created by:  {}", metadata.created_by);
    }

    if preview {
        println!();
        print!("{}", render_ansi_grid(&grid));
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn print_palette(palette: &Palette) {
    println!("Palette: {} ({} colors)", palette.name, palette.len());
    println!();
    for color in &palette.colors {
        println!("  {}    {} {}", color_to_ansi_bg(*color), ANSI_RESET, color);
    }
}

/// Execute the palettes command
pub fn run_palettes(config: &IconsmithConfig, action: PaletteAction) -> ExitCode {
    match action {
        PaletteAction::List => {
            println!("Built-in palettes:");
            for name in palette::list_builtins() {
                println!("  {}", name);
            }
            if !config.palettes.is_empty() {
                let mut custom: Vec<&String> = config.palettes.keys().collect();
                custom.sort();
                println!();
                println!("Configured palettes:");
                for name in custom {
                    println!("  {}", name);
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show { name } => match palette::resolve(&name, &config.palettes) {
            Some(palette) => {
                print_palette(&palette);
                ExitCode::from(EXIT_SUCCESS)
            }
            None => {
                eprintln!("Error: Unknown palette '{}'", name);
                let mut names = palette::list_builtins();
                names.extend(config.palettes.keys().map(String::as_str));
                if let Some(hint) = did_you_mean(&name, &names) {
                    eprintln!("{}", hint);
                }
                eprintln!();
                eprintln!("Available palettes:");
                for n in names {
                    eprintln!("  {}", n);
                }
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}

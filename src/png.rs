//! PNG export
//!
//! Each maze cell becomes a square block of pixels. Block size shrinks
//! with the maze so that large mazes still produce a usable image.

use std::path::Path;

use anyhow::Context;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::grid::{Cell, CellMask, Point};
use crate::Maze;

/// Largest image side most decoders accept
pub const MAX_IMAGE_SIDE: usize = 32_767;

const WALL: Rgb<u8> = Rgb([0, 0, 0]);
const OPEN: Rgb<u8> = Rgb([255, 255, 255]);
const START: Rgb<u8> = Rgb([0, 255, 0]);
const END: Rgb<u8> = Rgb([255, 0, 0]);
const SOLUTION: Rgb<u8> = Rgb([100, 149, 237]);

/// Side of one cell in pixels for a maze of `width` x `height` cells.
pub fn cell_size(width: usize, height: usize) -> u32 {
    let cells = width * height;
    let preferred = match cells {
        0..=10_000 => 25,
        10_001..=100_000 => 20,
        100_001..=1_000_000 => 15,
        1_000_001..=4_000_000 => 12,
        4_000_001..=10_000_000 => 8,
        _ => 5,
    };
    let longest = width.max(height).max(1);
    let fitting = (MAX_IMAGE_SIDE / longest).max(1);
    preferred.min(fitting) as u32
}

/// Draw `maze`, highlighting `solution` cells when given.
pub fn render(maze: &Maze, solution: Option<&CellMask>) -> RgbImage {
    let grid = maze.grid();
    let size = cell_size(grid.width(), grid.height());
    let (start, end) = (maze.start(), maze.end());

    ImageBuffer::from_fn(
        grid.width() as u32 * size,
        grid.height() as u32 * size,
        |px, py| {
            let point = Point {
                y: (py / size) as usize,
                x: (px / size) as usize,
            };
            if point == start {
                START
            } else if point == end {
                END
            } else if solution.is_some_and(|mask| mask.get(point)) {
                SOLUTION
            } else {
                match grid.cell(point) {
                    Some(Cell::Open) => OPEN,
                    _ => WALL,
                }
            }
        },
    )
}

/// Render and write a PNG file to `path`.
pub fn export(maze: &Maze, solution: Option<&CellMask>, path: &Path) -> anyhow::Result<()> {
    let image = render(maze, solution);
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Could not write image {}", path.display()))?;
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "image saved"
    );
    Ok(())
}

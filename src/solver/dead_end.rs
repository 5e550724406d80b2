//! Dead-end filling
//!
//! Each pass scans the whole grid row by row and collects every open cell
//! with exactly one open neighbour. The collected cells are filled at once
//! and the next pass starts over. In a perfect maze the cells left when no
//! dead end remains are exactly the path between start and end.

use tracing::debug;

use super::Outcome;
use crate::error::MazeError;
use crate::grid::{CellMask, Grid, Point};
use crate::observer::Monitor;

pub(super) fn solve(
    grid: &Grid,
    start: Point,
    end: Point,
    monitor: &mut Monitor<'_>,
) -> Result<Outcome, MazeError> {
    let mut filled = CellMask::for_grid(grid);
    let mut passes: u64 = 0;
    let mut total_filled: u64 = 0;
    let mut dead_ends = Vec::new();

    let is_open = |filled: &CellMask, point: Point| grid.is_open(point) && !filled.get(point);

    loop {
        passes += 1;
        dead_ends.clear();

        for point in grid.open_cells() {
            if point == start || point == end || filled.get(point) {
                continue;
            }
            let exits = grid
                .neighbors4(point)
                .filter(|&(_, next)| is_open(&filled, next))
                .count();
            if exits == 1 {
                dead_ends.push(point);
            }
        }

        if dead_ends.is_empty() {
            break;
        }
        for &point in &dead_ends {
            filled.set(point, true);
        }
        total_filled += dead_ends.len() as u64;

        if passes % 10 == 0 {
            debug!(passes, found = dead_ends.len(), total_filled, "filled dead ends");
        }
        monitor.checkpoint(passes, grid, Some(&filled))?;
    }

    let mut path = CellMask::for_grid(grid);
    for point in grid.open_cells() {
        if !filled.get(point) {
            path.set(point, true);
        }
    }

    Ok(Outcome {
        path,
        counter: passes,
        filled: Some(total_filled),
    })
}

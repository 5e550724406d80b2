//! Left-hand rule
//!
//! The walker keeps its left hand on the wall: at every step it prefers
//! turning left, then going straight, then right, and only reverses when
//! all three are blocked. The reported path is the whole walked
//! trajectory, not necessarily the shortest route.

use tracing::debug;

use super::Outcome;
use crate::error::MazeError;
use crate::grid::{CellMask, Grid, Point};
use crate::observer::Monitor;

pub(super) fn solve(
    grid: &Grid,
    start: Point,
    end: Point,
    step_limit: u64,
    monitor: &mut Monitor<'_>,
) -> Result<Outcome, MazeError> {
    let mut heading = grid
        .neighbors4(start)
        .find(|&(_, next)| grid.is_open(next))
        .map(|(direction, _)| direction)
        .ok_or(MazeError::EnclosedStart(start))?;
    debug!(?heading, "initial heading");

    let mut path = CellMask::for_grid(grid);
    path.set(start, true);
    let mut position = start;
    let mut steps: u64 = 0;

    while position != end {
        steps += 1;
        if steps > step_limit {
            return Err(MazeError::StepLimitExceeded { limit: step_limit });
        }

        let turns = [
            heading.left(),
            heading,
            heading.right(),
            heading.reverse(),
        ];
        if let Some((direction, next)) = turns.into_iter().find_map(|direction| {
            grid.step(position, direction)
                .filter(|&next| grid.is_open(next))
                .map(|next| (direction, next))
        }) {
            heading = direction;
            position = next;
        }

        path.set(position, true);
        monitor.checkpoint(steps, grid, Some(&path))?;
    }

    Ok(Outcome {
        path,
        counter: steps,
        filled: None,
    })
}

//! Recursive backtracking
//!
//! Depth-first search that marks cells on the current path and unmarks
//! them again when a branch turns out to be a dead end. The recursion is
//! unrolled into an explicit stack of frames, each remembering which
//! neighbour to try next, so search depth is bounded by memory only.

use super::Outcome;
use crate::error::MazeError;
use crate::grid::{CellMask, Direction, Grid, Point};
use crate::observer::Monitor;

/// Neighbour order tried at every cell.
const ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

/// Cell being explored and the index into [ORDER] to try next
struct Frame {
    at: Point,
    next: usize,
}

pub(super) fn solve(
    grid: &Grid,
    start: Point,
    end: Point,
    monitor: &mut Monitor<'_>,
) -> Result<Outcome, MazeError> {
    let mut visited = CellMask::for_grid(grid);
    let mut path = CellMask::for_grid(grid);
    let mut steps: u64 = 0;
    let mut stack = Vec::new();

    if grid.is_open(start) {
        visited.set(start, true);
        path.set(start, true);
        steps += 1;
        stack.push(Frame { at: start, next: 0 });
    }

    while let Some(frame) = stack.last_mut() {
        let Some(&direction) = ORDER.get(frame.next) else {
            // Every neighbour failed: leave the path and fail upward
            path.set(frame.at, false);
            stack.pop();
            continue;
        };
        frame.next += 1;

        let Some(next) = grid.step(frame.at, direction) else {
            continue;
        };
        if next == end {
            path.set(next, true);
            return Ok(Outcome {
                path,
                counter: steps,
                filled: None,
            });
        }
        if visited.get(next) || !grid.is_open(next) {
            continue;
        }

        visited.set(next, true);
        path.set(next, true);
        steps += 1;
        stack.push(Frame { at: next, next: 0 });
        monitor.checkpoint(steps, grid, Some(&path))?;
    }

    Err(MazeError::NoPathFound { start, end })
}

#[cfg(test)]
mod tests {
    use crate::Maze;

    use super::*;

    fn search(emojis: &str) -> Result<(Maze, Outcome), MazeError> {
        let maze = Maze::parse_emojis(emojis.trim()).unwrap();
        let mut monitor = Monitor::new(None, 1);
        let outcome = solve(maze.grid(), maze.start(), maze.end(), &mut monitor)?;
        Ok((maze, outcome))
    }

    #[test]
    fn wrong_turns_are_unmarked() {
        // Right is tried first and leads into a dead end
        let (_, outcome) = search(
            "
######
#S..##
#.####
#E####
######",
        )
        .unwrap();
        assert_eq!(outcome.path.count(), 3);
        assert!(!outcome.path.get(Point::new(1, 2)));
        assert!(!outcome.path.get(Point::new(1, 3)));
        // S, the two cells of the dead end and (2, 1)
        assert_eq!(outcome.counter, 4);
    }

    #[test]
    fn first_found_path_on_loops() {
        // Two routes around the pillar; right-first order takes the top one
        let (_, outcome) = search(
            "
#####
#S..#
#.#.#
#..E#
#####",
        )
        .unwrap();
        assert_eq!(outcome.path.count(), 5);
        assert!(outcome.path.get(Point::new(1, 3)));
        assert!(!outcome.path.get(Point::new(3, 1)));
    }

    #[test]
    fn unreachable_end() {
        let result = search(
            "
#####
#S.##
#####
#..E#
#####",
        );
        assert_eq!(
            result.unwrap_err(),
            MazeError::NoPathFound {
                start: Point::new(1, 1),
                end: Point::new(3, 3)
            }
        );
    }

    #[test]
    fn deep_corridor_does_not_overflow() {
        // A single winding corridor far deeper than any call stack allows
        let width = 2001;
        let height = 401;
        let mut rows = vec![vec!['#'; width]; height];
        for y in (1..height - 1).step_by(2) {
            for x in 1..width - 1 {
                rows[y][x] = '.';
            }
            let turn = if (y / 2) % 2 == 0 { width - 2 } else { 1 };
            if y + 1 < height - 1 {
                rows[y + 1][turn] = '.';
            }
        }
        rows[1][1] = 'S';
        let last = height - 2;
        let end_x = if (last / 2) % 2 == 0 { width - 2 } else { 1 };
        rows[last][end_x] = 'E';
        let text: Vec<String> = rows.into_iter().map(|row| row.into_iter().collect()).collect();

        let (maze, outcome) = search(&text.join("\n")).unwrap();
        assert_eq!(outcome.path.count(), maze.grid().open_count());
    }
}

//! Maze solving strategies
//!
//! All solvers treat the grid as read-only and keep their markers in
//! private overlays. Given the same maze they always return the same
//! solution: there is no randomness at solve time.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MazeError;
use crate::grid::{CellMask, Grid, Point};
use crate::observer::{Monitor, Observer};
use crate::Maze;

mod backtracking;
mod dead_end;
mod wall_follower;

/// Solving strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Depth-first search, unmarking cells on backtrack
    RecursiveBacktracking,
    /// Fill single-exit cells until only the path remains
    DeadEndFilling,
    /// Keep the left hand on the wall
    LeftHandRule,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::RecursiveBacktracking,
        Algorithm::DeadEndFilling,
        Algorithm::LeftHandRule,
    ];

    /// What [Solution::counter] counts for this algorithm.
    pub fn counter_name(self) -> &'static str {
        match self {
            Algorithm::DeadEndFilling => "iterations",
            Algorithm::RecursiveBacktracking | Algorithm::LeftHandRule => "steps",
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "recursive_backtracking" | "backtracking" => Ok(Algorithm::RecursiveBacktracking),
            "dead_end_filling" | "dead_end" => Ok(Algorithm::DeadEndFilling),
            "left_hand_rule" | "left_hand" => Ok(Algorithm::LeftHandRule),
            _ => Err(format!(
                "Invalid algorithm: '{}'. Must be 'recursive_backtracking', 'dead_end_filling', or 'left_hand_rule'",
                s
            )),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::RecursiveBacktracking => write!(f, "recursive_backtracking"),
            Algorithm::DeadEndFilling => write!(f, "dead_end_filling"),
            Algorithm::LeftHandRule => write!(f, "left_hand_rule"),
        }
    }
}

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Moves the left-hand rule may take before giving up
    pub step_limit: u64,
    /// Counter increments between observer calls, `None` for the
    /// algorithm's default
    pub progress_interval: Option<u64>,
    /// Never call the observer
    pub headless: bool,
}

impl SolveOptions {
    pub const DEFAULT_STEP_LIMIT: u64 = 10_000_000;
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            step_limit: Self::DEFAULT_STEP_LIMIT,
            progress_interval: None,
            headless: false,
        }
    }
}

/// Result of a successful solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub algorithm: Algorithm,
    /// Cells on the reported path from start to end
    pub path: CellMask,
    /// Passes for dead-end filling, steps otherwise
    pub counter: u64,
    /// Number of cells filled, dead-end filling only
    pub filled: Option<u64>,
    pub elapsed: Duration,
}

impl Solution {
    /// Number of marked cells.
    pub fn path_length(&self) -> usize {
        self.path.count()
    }

    /// Print report
    pub fn print_report(&self) {
        println!("Algorithm: {}", self.algorithm);
        println!("Total {}: {}", self.algorithm.counter_name(), self.counter);
        if let Some(filled) = self.filled {
            println!("Dead ends filled: {}", filled);
        }
        println!("Path length: {} cells", self.path_length());
        println!("Solve time: {:.3} seconds", self.elapsed.as_secs_f64());
    }
}

/// Intermediate result of one of the algorithms.
#[derive(Debug)]
struct Outcome {
    path: CellMask,
    counter: u64,
    filled: Option<u64>,
}

/// Solve `maze` with `algorithm`.
///
/// `observer` is called at throttled checkpoints unless
/// `options.headless` is set; returning `false` from it aborts the solve
/// with [MazeError::Cancelled].
pub fn solve(
    maze: &Maze,
    algorithm: Algorithm,
    options: &SolveOptions,
    observer: Option<&mut dyn Observer>,
) -> Result<Solution, MazeError> {
    let grid = maze.grid();
    let observer = if options.headless { None } else { observer };
    let interval = options
        .progress_interval
        .unwrap_or_else(|| default_interval(algorithm, grid));
    let mut monitor = Monitor::new(observer, interval);

    let outcome = if maze.start() == maze.end() {
        single_cell(grid, maze.start())?
    } else {
        match algorithm {
            Algorithm::RecursiveBacktracking => {
                backtracking::solve(grid, maze.start(), maze.end(), &mut monitor)?
            }
            Algorithm::DeadEndFilling => {
                dead_end::solve(grid, maze.start(), maze.end(), &mut monitor)?
            }
            Algorithm::LeftHandRule => wall_follower::solve(
                grid,
                maze.start(),
                maze.end(),
                options.step_limit,
                &mut monitor,
            )?,
        }
    };
    monitor.finish(outcome.counter, grid, Some(&outcome.path));

    let solution = Solution {
        algorithm,
        path: outcome.path,
        counter: outcome.counter,
        filled: outcome.filled,
        elapsed: monitor.elapsed(),
    };
    info!(
        %algorithm,
        counter = solution.counter,
        path_length = solution.path_length(),
        elapsed_ms = solution.elapsed.as_millis() as u64,
        "maze solved"
    );
    Ok(solution)
}

/// Start and end coincide: the path is that one cell, unless it is a wall.
fn single_cell(grid: &Grid, point: Point) -> Result<Outcome, MazeError> {
    if !grid.is_open(point) {
        return Err(MazeError::NoPathFound {
            start: point,
            end: point,
        });
    }
    let mut path = CellMask::for_grid(grid);
    path.set(point, true);
    Ok(Outcome {
        path,
        counter: 0,
        filled: None,
    })
}

fn default_interval(algorithm: Algorithm, grid: &Grid) -> u64 {
    match algorithm {
        Algorithm::DeadEndFilling => match grid.len() {
            n if n > 10_000_000 => 10,
            n if n > 1_000_000 => 5,
            _ => 1,
        },
        Algorithm::LeftHandRule => 2,
        Algorithm::RecursiveBacktracking => 5,
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::analysis::PassageGraph;
    use crate::generator::MazeGenerator;
    use crate::observer::Progress;

    /// Start walled in on all sides, end reachable through a dead-end tree.
    const ENCLOSED_START: &str = "
#######
#S#...#
###.###
#.....#
#.###.#
#...#E#
#######";

    #[test]
    fn parse_algorithm_names() {
        assert_eq!(
            "dead_end_filling".parse::<Algorithm>(),
            Ok(Algorithm::DeadEndFilling)
        );
        assert_eq!(
            "Left-Hand-Rule".parse::<Algorithm>(),
            Ok(Algorithm::LeftHandRule)
        );
        assert_eq!(
            "backtracking".parse::<Algorithm>(),
            Ok(Algorithm::RecursiveBacktracking)
        );
        assert!("flood".parse::<Algorithm>().is_err());
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>(), Ok(algorithm));
        }
    }

    #[test]
    fn algorithm_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Algorithm::LeftHandRule).unwrap(),
            "\"left_hand_rule\""
        );
        assert_eq!(
            serde_json::to_string(&Algorithm::DeadEndFilling).unwrap(),
            "\"dead_end_filling\""
        );
    }

    #[test]
    fn five_by_five_paths() {
        for seed in 0..20 {
            let maze = MazeGenerator::new(Some(seed)).generate(5, 5).unwrap();
            let filled = maze.solve(Algorithm::DeadEndFilling).unwrap();
            let searched = maze.solve(Algorithm::RecursiveBacktracking).unwrap();
            let walked = maze.solve(Algorithm::LeftHandRule).unwrap();

            // Opposite corners of a 2x2 lattice are always two passages apart
            assert_eq!(filled.path_length(), 5);
            assert_eq!(searched.path_length(), 5);
            assert!(walked.path_length() >= 5);
        }
    }

    #[test]
    fn start_equals_end() {
        let maze = MazeGenerator::new(Some(0)).generate(3, 3).unwrap();
        for algorithm in Algorithm::ALL {
            let solution = maze.solve(algorithm).unwrap();
            assert_eq!(solution.path_length(), 1, "{algorithm}");
            assert!(solution.path.get(Point::new(1, 1)));
            assert_eq!(solution.counter, 0);
        }
    }

    #[test]
    fn start_equals_end_on_a_wall() {
        let grid = Grid::walled(5, 5).unwrap();
        let maze = Maze::new(grid, Point::new(2, 2), Point::new(2, 2)).unwrap();
        for algorithm in Algorithm::ALL {
            assert_eq!(
                maze.solve(algorithm),
                Err(MazeError::NoPathFound {
                    start: Point::new(2, 2),
                    end: Point::new(2, 2)
                }),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn enclosed_start() {
        let maze = Maze::parse_emojis(ENCLOSED_START.trim()).unwrap();

        assert_eq!(
            maze.solve(Algorithm::LeftHandRule),
            Err(MazeError::EnclosedStart(maze.start()))
        );
        assert_eq!(
            maze.solve(Algorithm::RecursiveBacktracking),
            Err(MazeError::NoPathFound {
                start: maze.start(),
                end: maze.end()
            })
        );

        let filled = maze.solve(Algorithm::DeadEndFilling).unwrap();
        assert!(filled.path.get(maze.start()));
        assert!(filled.path.get(maze.end()));
        let end_neighbors = maze
            .grid()
            .neighbors4(maze.end())
            .filter(|&(_, p)| filled.path.get(p))
            .count();
        assert_eq!(end_neighbors, 0, "end should be cut off from the rest");
    }

    #[test]
    fn headless_option_skips_observer() {
        let maze = MazeGenerator::new(Some(4)).generate(15, 15).unwrap();
        let mut observer = |_: &Progress<'_>| -> bool { panic!("observer called in headless mode") };
        let options = SolveOptions {
            progress_interval: Some(1),
            headless: true,
            ..SolveOptions::default()
        };
        for algorithm in Algorithm::ALL {
            maze.solve_with(algorithm, &options, Some(&mut observer))
                .unwrap();
        }
    }

    #[test]
    fn observer_receives_final_state() {
        let maze = MazeGenerator::new(Some(4)).generate(15, 15).unwrap();
        let mut last_length = 0;
        let mut observer = |progress: &Progress<'_>| {
            last_length = progress.overlay.map_or(0, CellMask::count);
            true
        };
        let options = SolveOptions {
            progress_interval: Some(1_000_000),
            ..SolveOptions::default()
        };
        let solution = maze
            .solve_with(Algorithm::RecursiveBacktracking, &options, Some(&mut observer))
            .unwrap();
        assert_eq!(last_length, solution.path_length());
    }

    #[test]
    fn cancellation_is_reported() {
        let maze = MazeGenerator::new(Some(8)).generate(41, 41).unwrap();
        let mut stop = |_: &Progress<'_>| false;
        let options = SolveOptions {
            progress_interval: Some(1),
            ..SolveOptions::default()
        };
        for algorithm in Algorithm::ALL {
            let result = maze.solve_with(algorithm, &options, Some(&mut stop));
            assert!(
                matches!(result, Err(MazeError::Cancelled { .. })),
                "{algorithm} was not cancelled"
            );
        }
    }

    #[quickcheck]
    fn dead_end_filling_finds_the_unique_path(seed: u64, half_width: u8, half_height: u8) -> bool {
        let width = 5 + 2 * (half_width % 15) as usize;
        let height = 5 + 2 * (half_height % 15) as usize;
        let maze = MazeGenerator::new(Some(seed))
            .generate(width, height)
            .unwrap();

        let solution = maze.solve(Algorithm::DeadEndFilling).unwrap();
        let expected = PassageGraph::new(maze.grid())
            .shortest_path(maze.start(), maze.end())
            .unwrap();

        solution.path_length() == expected.len()
            && expected.iter().all(|&point| solution.path.get(point))
    }

    #[quickcheck]
    fn backtracking_matches_dead_end_filling(seed: u64) -> bool {
        let maze = MazeGenerator::new(Some(seed)).generate(31, 17).unwrap();
        let filled = maze.solve(Algorithm::DeadEndFilling).unwrap();
        let searched = maze.solve(Algorithm::RecursiveBacktracking).unwrap();
        filled.path == searched.path
    }

    #[quickcheck]
    fn left_hand_rule_covers_path_within_bound(seed: u64) -> bool {
        let maze = MazeGenerator::new(Some(seed)).generate(31, 17).unwrap();
        let walked = maze.solve(Algorithm::LeftHandRule).unwrap();
        let unique = maze.solve(Algorithm::DeadEndFilling).unwrap();

        let open_cells = maze.grid().open_count() as u64;
        walked.counter <= 2 * open_cells
            && unique.path.marked().all(|point| walked.path.get(point))
            && walked.path.marked().all(|point| maze.grid().is_open(point))
    }

    #[quickcheck]
    fn solving_is_idempotent(seed: u64) -> bool {
        let maze = MazeGenerator::new(Some(seed)).generate(25, 25).unwrap();
        Algorithm::ALL.into_iter().all(|algorithm| {
            let first = maze.solve(algorithm).unwrap();
            let second = maze.solve(algorithm).unwrap();
            first.path == second.path
                && first.counter == second.counter
                && first.filled == second.filled
        })
    }
}

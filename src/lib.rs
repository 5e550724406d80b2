//! Generate rectangular grid mazes and find a way through them
//!
//! Mazes are carved by [generator::MazeGenerator] and solved with one of
//! three classic strategies, see [Algorithm].
//!
//! # Examples
//! ## Solve a hand-drawn maze
//! ```
//! use maze_solvers::{Algorithm, Maze};
//!
//! let maze_emojis = "
//! 🟫🟫🟫🟫🟫🟫🟫
//! 🟫🏃🟩🟩🟩🟩🟫
//! 🟫🟫🟫🟩🟫🟫🟫
//! 🟫🟩🟩🟩🟩🟩🟫
//! 🟫🟩🟫🟫🟫🟫🟫
//! 🟫🟩🟩🟩🟩❎🟫
//! 🟫🟫🟫🟫🟫🟫🟫";
//! let maze = Maze::parse_emojis(maze_emojis.trim()).unwrap();
//! let solution = maze.solve(Algorithm::DeadEndFilling).unwrap();
//! solution.print_report();
//! assert_eq!(solution.path_length(), 13);
//! ```
//!
//! ## Generate and solve
//! ```
//! use maze_solvers::generator::MazeGenerator;
//! use maze_solvers::Algorithm;
//!
//! let maze = MazeGenerator::new(Some(7)).generate(21, 11).unwrap();
//! let filled = maze.solve(Algorithm::DeadEndFilling).unwrap();
//! let searched = maze.solve(Algorithm::RecursiveBacktracking).unwrap();
//! // A perfect maze has exactly one path
//! assert_eq!(filled.path, searched.path);
//! ```

use std::fmt;

pub mod analysis;
pub mod error;
pub mod generator;
pub mod grid;
pub mod observer;
pub mod persistence;
pub mod render;
pub mod solver;

#[cfg(feature = "png")]
pub mod png;

pub use error::MazeError;
pub use grid::{Cell, CellMask, Direction, Grid, Point};
pub use observer::{Observer, Progress};
pub use solver::{Algorithm, Solution, SolveOptions};

/// Grid together with its designated start and end cells
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Maze {
    grid: Grid,
    start: Point,
    end: Point,
}

impl Maze {
    pub const S_START: char = '🏃';
    pub const S_END: char = '❎';
    pub const S_OPEN: char = '🟩';
    pub const S_WALL: char = '🟫';

    /// Returns [MazeError::OutOfBounds] if `start` or `end` lie outside
    /// the grid.
    ///
    /// `start` may equal `end`; every solver then reports a one-cell path.
    pub fn new(grid: Grid, start: Point, end: Point) -> Result<Self, MazeError> {
        grid.check_bounds(start)?;
        grid.check_bounds(end)?;
        Ok(Self { grid, start, end })
    }

    /// Parse a maze drawn with emojis or ASCII.
    ///
    /// - `🟫`, `#` or `█`: wall
    /// - `🟩`, `.` or space: open
    /// - `🏃` or `S`: start (open)
    /// - `❎` or `E`: end (open)
    ///
    /// Returns error if the drawing contains unknown characters, rows of
    /// different lengths, or lacks a start or an end.
    ///
    /// # Examples
    /// ```
    /// use maze_solvers::{Maze, Point};
    ///
    /// let maze = Maze::parse_emojis("#####\n#S..#\n###E#").unwrap();
    /// assert_eq!(maze.start(), Point::new(1, 1));
    /// assert_eq!(maze.end(), Point::new(2, 3));
    /// ```
    pub fn parse_emojis(emojis: &str) -> Result<Self, MazeError> {
        let mut start = None;
        let mut end = None;
        let mut rows = Vec::new();

        for (y, line) in emojis.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut row = Vec::new();
            for (x, c) in line.chars().enumerate() {
                let cell = match c {
                    Self::S_WALL | '#' | '█' => Cell::Wall,
                    Self::S_OPEN | '.' | ' ' => Cell::Open,
                    Self::S_START | 'S' => {
                        start = Some(Point { y, x });
                        Cell::Open
                    }
                    Self::S_END | 'E' => {
                        end = Some(Point { y, x });
                        Cell::Open
                    }
                    found => return Err(MazeError::UnexpectedCharacter { found, y, x }),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        let grid = Grid::from_rows(rows)?;
        let start = start.ok_or(MazeError::MissingMarker("Start"))?;
        let end = end.ok_or(MazeError::MissingMarker("End"))?;
        Self::new(grid, start, end)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Solve headless with default options.
    pub fn solve(&self, algorithm: Algorithm) -> Result<Solution, MazeError> {
        solver::solve(self, algorithm, &SolveOptions::default(), None)
    }

    /// Solve with explicit options, reporting progress to `observer`.
    pub fn solve_with(
        &self,
        algorithm: Algorithm,
        options: &SolveOptions,
        observer: Option<&mut dyn Observer>,
    ) -> Result<Solution, MazeError> {
        solver::solve(self, algorithm, options, observer)
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::format_maze(self, None))
    }
}

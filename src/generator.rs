//! Maze generation
//!
//! Perfect mazes are carved with randomized backtracking over the odd
//! "lattice" coordinates of the grid. The work stack is an explicit heap
//! allocated `Vec`, so arbitrarily large mazes can be built without deep
//! recursion.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::MazeError;
use crate::grid::{Cell, CellMask, Grid, Point, MIN_DIMENSION};
use crate::observer::{Monitor, Observer};
use crate::Maze;

/// Grids above this many cells are reported as very large.
const LARGE_MAZE_CELLS: usize = 10_000_000;

/// Perfect maze generator.
pub struct MazeGenerator {
    random: StdRng,
    progress_interval: Option<u64>,
    headless: bool,
}

impl MazeGenerator {
    /// Lattice steps (dy, dx): north, south, west, east.
    const DIRECTIONS: [(isize, isize); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

    /// Generator seeded with `seed`, or with OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
            progress_interval: None,
            headless: false,
        }
    }

    /// Call observers every `interval` carved passages instead of the
    /// size-dependent default.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Ignore any observer passed to [Self::generate_observed].
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Round an even dimension up to the next odd value.
    ///
    /// Carving moves in strides of two cells starting from `(1, 1)`, so
    /// the outer wall only lines up with odd sizes.
    pub fn odd_dimension(size: usize) -> usize {
        if size % 2 == 0 {
            size + 1
        } else {
            size
        }
    }

    /// Generate a perfect maze of (at least) `width` x `height` cells.
    ///
    /// Even sizes are rounded up with [Self::odd_dimension]. Start is
    /// `(1, 1)` and end is `(height - 2, width - 2)`.
    ///
    /// ```
    /// use maze_solvers::generator::MazeGenerator;
    ///
    /// let maze = MazeGenerator::new(Some(3)).generate(10, 7).unwrap();
    /// assert_eq!((maze.grid().width(), maze.grid().height()), (11, 7));
    /// ```
    pub fn generate(&mut self, width: usize, height: usize) -> Result<Maze, MazeError> {
        self.carve(width, height, None)
    }

    /// Like [Self::generate], reporting carved passages to `observer`.
    pub fn generate_observed(
        &mut self,
        width: usize,
        height: usize,
        observer: &mut dyn Observer,
    ) -> Result<Maze, MazeError> {
        let observer = (!self.headless).then_some(observer);
        self.carve(width, height, observer)
    }

    fn carve(
        &mut self,
        width: usize,
        height: usize,
        observer: Option<&mut dyn Observer>,
    ) -> Result<Maze, MazeError> {
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        let (width, height) = (Self::odd_dimension(width), Self::odd_dimension(height));
        let total_cells = width * height;
        let lattice_cells = (width / 2) * (height / 2);
        if total_cells > LARGE_MAZE_CELLS {
            warn!(total_cells, "generating a very large maze, this may take a while");
        }

        let interval = self
            .progress_interval
            .unwrap_or_else(|| auto_interval(total_cells, lattice_cells));
        let mut monitor = Monitor::new(observer, interval);
        let log_every = log_interval(total_cells);

        let mut grid = Grid::walled(width, height)?;
        let mut visited = CellMask::for_grid(&grid);
        let origin = Point::new(1, 1);
        grid.set(origin, Cell::Open);
        visited.set(origin, true);
        let mut stack = vec![origin];
        let mut carved: u64 = 0;

        while let Some(&current) = stack.last() {
            let mut candidates = [(origin, origin); 4];
            let mut count = 0;
            for (dy, dx) in Self::DIRECTIONS {
                let (Some(ny), Some(nx)) = (
                    current.y.checked_add_signed(dy),
                    current.x.checked_add_signed(dx),
                ) else {
                    continue;
                };
                let next = Point::new(ny, nx);
                if 0 < ny && ny < height - 1 && 0 < nx && nx < width - 1 && !visited.get(next) {
                    let between = Point::new(
                        current.y.wrapping_add_signed(dy / 2),
                        current.x.wrapping_add_signed(dx / 2),
                    );
                    candidates[count] = (next, between);
                    count += 1;
                }
            }

            if let Some(&(next, between)) = candidates[..count].choose(&mut self.random) {
                grid.set(between, Cell::Open);
                grid.set(next, Cell::Open);
                visited.set(next, true);
                stack.push(next);

                carved += 1;
                if carved % log_every == 0 {
                    debug!(carved, lattice_cells, "carving");
                }
                monitor.checkpoint(carved, &grid, Some(&visited))?;
            } else {
                stack.pop();
            }
        }
        monitor.finish(carved, &grid, Some(&visited));

        debug!(carved, lattice_cells, "carving finished");
        info!(
            width,
            height,
            elapsed_ms = monitor.elapsed().as_millis() as u64,
            "maze generated"
        );

        Maze::new(grid, origin, Point::new(height - 2, width - 2))
    }
}

/// Carved passages between progress log lines.
fn log_interval(total_cells: usize) -> u64 {
    if total_cells > LARGE_MAZE_CELLS {
        50_000
    } else {
        10_000
    }
}

/// Progress interval in carved passages, coarser for larger mazes.
fn auto_interval(total_cells: usize, lattice_cells: usize) -> u64 {
    let interval = if total_cells > LARGE_MAZE_CELLS {
        (lattice_cells / 20).max(10_000)
    } else if total_cells > 1_000_000 {
        (lattice_cells / 50).max(5_000)
    } else {
        (lattice_cells / 100).max(100)
    };
    interval as u64
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::analysis::PassageGraph;
    use crate::observer::Progress;

    #[test]
    fn even_dimensions_round_up() {
        let maze = MazeGenerator::new(Some(0)).generate(8, 6).unwrap();
        assert_eq!(maze.grid().width(), 9);
        assert_eq!(maze.grid().height(), 7);
        assert_eq!(maze.end(), Point::new(5, 7));
    }

    #[test]
    fn reject_too_small() {
        let result = MazeGenerator::new(Some(0)).generate(2, 9);
        assert_eq!(
            result.unwrap_err(),
            MazeError::InvalidDimensions {
                width: 2,
                height: 9
            }
        );
    }

    #[test]
    fn smallest_maze_is_single_cell() {
        let maze = MazeGenerator::new(Some(0)).generate(3, 3).unwrap();
        assert_eq!(maze.grid().open_count(), 1);
        assert_eq!(maze.start(), maze.end());
    }

    #[test]
    fn progress_log_interval() {
        assert_eq!(log_interval(39 * 19), 10_000);
        assert_eq!(log_interval(LARGE_MAZE_CELLS), 10_000);
        assert_eq!(log_interval(LARGE_MAZE_CELLS + 1), 50_000);
    }

    #[test]
    fn same_seed_same_maze() {
        let first = MazeGenerator::new(Some(42)).generate(31, 21).unwrap();
        let second = MazeGenerator::new(Some(42)).generate(31, 21).unwrap();
        assert_eq!(first.grid(), second.grid());
    }

    #[test]
    fn different_seeds_differ() {
        let first = MazeGenerator::new(Some(1)).generate(41, 41).unwrap();
        let second = MazeGenerator::new(Some(2)).generate(41, 41).unwrap();
        assert_ne!(first.grid(), second.grid());
    }

    #[test]
    fn border_stays_walled() {
        let maze = MazeGenerator::new(Some(5)).generate(25, 15).unwrap();
        let grid = maze.grid();
        for point in grid.points() {
            let on_border = point.y == 0
                || point.x == 0
                || point.y == grid.height() - 1
                || point.x == grid.width() - 1;
            if on_border {
                assert!(!grid.is_open(point), "border cell {point} is open");
            }
        }
    }

    #[test]
    fn observer_sees_carving_and_may_cancel() {
        let mut calls = 0;
        let mut observer = |progress: &Progress<'_>| {
            calls += 1;
            assert!(progress.overlay.is_some());
            progress.counter < 20
        };
        let result = MazeGenerator::new(Some(9))
            .with_progress_interval(5)
            .generate_observed(21, 21, &mut observer);
        assert_eq!(result.unwrap_err(), MazeError::Cancelled { counter: 20 });
        assert_eq!(calls, 4);
    }

    #[test]
    fn headless_ignores_observer() {
        let mut observer = |_: &Progress<'_>| false;
        let result = MazeGenerator::new(Some(9))
            .with_progress_interval(1)
            .headless(true)
            .generate_observed(21, 21, &mut observer);
        assert!(result.is_ok());
    }

    #[quickcheck]
    fn generated_mazes_are_perfect(seed: u64, half_width: u8, half_height: u8) -> bool {
        let width = 3 + 2 * (half_width % 20) as usize;
        let height = 3 + 2 * (half_height % 20) as usize;
        let maze = MazeGenerator::new(Some(seed))
            .generate(width, height)
            .unwrap();

        let lattice_cells = (width / 2) * (height / 2);
        let graph = PassageGraph::new(maze.grid());
        maze.grid().open_count() == 2 * lattice_cells - 1
            && graph.node_count() == 2 * lattice_cells - 1
            && graph.is_perfect()
    }
}

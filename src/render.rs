//! Text rendering and terminal playback

use std::thread;
use std::time::Duration;

use itertools::Itertools;

use crate::grid::{Cell, CellMask, Grid, Point};
use crate::observer::{Observer, Progress};
use crate::Maze;

/// Marker for overlay cells, such as the solution path
pub const S_OVERLAY: char = '🟦';

/// Clear screen and move the cursor home
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Render `maze` as emoji rows, marking `overlay` cells.
///
/// Rows are joined with `\n` without a trailing newline. Without an
/// overlay the result parses back with [Maze::parse_emojis].
pub fn format_maze(maze: &Maze, overlay: Option<&CellMask>) -> String {
    format_grid(maze.grid(), Some((maze.start(), maze.end())), overlay)
}

/// Render `grid`, with optional start and end markers.
///
/// Endpoint markers take precedence over the overlay.
pub fn format_grid(
    grid: &Grid,
    endpoints: Option<(Point, Point)>,
    overlay: Option<&CellMask>,
) -> String {
    (0..grid.height())
        .map(|y| {
            (0..grid.width())
                .map(|x| symbol(grid, endpoints, overlay, Point { y, x }))
                .join("")
        })
        .join("\n")
}

fn symbol(
    grid: &Grid,
    endpoints: Option<(Point, Point)>,
    overlay: Option<&CellMask>,
    point: Point,
) -> char {
    match endpoints {
        Some((start, _)) if point == start => return Maze::S_START,
        Some((_, end)) if point == end => return Maze::S_END,
        _ => {}
    }
    if overlay.is_some_and(|mask| mask.get(point)) {
        return S_OVERLAY;
    }
    match grid.cell(point) {
        Some(Cell::Open) => Maze::S_OPEN,
        _ => Maze::S_WALL,
    }
}

/// Observer that redraws the terminal on every checkpoint
///
/// Each frame clears the screen, prints the grid with the overlay and a
/// status line, then sleeps for the frame length.
pub struct TerminalPlayback {
    label: &'static str,
    frame: Duration,
    endpoints: Option<(Point, Point)>,
}

impl TerminalPlayback {
    /// `label` names the counter shown on the status line.
    pub fn new(label: &'static str, frame: Duration) -> Self {
        Self {
            label,
            frame,
            endpoints: None,
        }
    }

    /// Draw start and end markers on every frame.
    pub fn with_endpoints(mut self, start: Point, end: Point) -> Self {
        self.endpoints = Some((start, end));
        self
    }

    /// Playback for solving `maze`.
    pub fn for_maze(maze: &Maze, label: &'static str, frame: Duration) -> Self {
        Self::new(label, frame).with_endpoints(maze.start(), maze.end())
    }

    fn status(&self, progress: &Progress<'_>) -> String {
        let mut status = format!(
            "{}: {} | {:.1}s",
            self.label,
            progress.counter,
            progress.elapsed.as_secs_f64()
        );
        if let Some(overlay) = progress.overlay {
            status.push_str(&format!(" | marked: {}", overlay.count()));
        }
        status
    }
}

impl Observer for TerminalPlayback {
    fn on_progress(&mut self, progress: &Progress<'_>) -> bool {
        print!("{CLEAR_SCREEN}");
        println!(
            "{}",
            format_grid(progress.grid, self.endpoints, progress.overlay)
        );
        println!("{}", self.status(progress));
        thread::sleep(self.frame);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "#####\n#S..#\n#.#.#\n#..E#\n#####";

    #[test]
    fn plain_rendering() {
        let maze = Maze::parse_emojis(CORRIDOR).unwrap();
        assert_eq!(
            format_maze(&maze, None),
            "🟫🟫🟫🟫🟫\n🟫🏃🟩🟩🟫\n🟫🟩🟫🟩🟫\n🟫🟩🟩❎🟫\n🟫🟫🟫🟫🟫"
        );
    }

    #[test]
    fn overlay_keeps_endpoint_markers() {
        let maze = Maze::parse_emojis(CORRIDOR).unwrap();
        let solution = maze.solve(crate::Algorithm::RecursiveBacktracking).unwrap();
        let rendered = format_maze(&maze, Some(&solution.path));
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows[1], "🟫🏃🟦🟦🟫");
        assert_eq!(rows[2], "🟫🟩🟫🟦🟫");
        assert_eq!(rows[3], "🟫🟩🟩❎🟫");
    }

    #[test]
    fn grid_without_endpoints() {
        let grid = Grid::walled(3, 3).unwrap();
        assert_eq!(format_grid(&grid, None, None), "🟫🟫🟫\n🟫🟫🟫\n🟫🟫🟫");
    }

    #[test]
    fn status_line() {
        let grid = Grid::walled(3, 3).unwrap();
        let mut mask = CellMask::for_grid(&grid);
        mask.set(Point::new(1, 1), true);
        let playback = TerminalPlayback::new("Steps", Duration::ZERO);
        let progress = Progress {
            counter: 42,
            elapsed: Duration::from_millis(1500),
            grid: &grid,
            overlay: Some(&mask),
        };
        assert_eq!(playback.status(&progress), "Steps: 42 | 1.5s | marked: 1");
    }
}

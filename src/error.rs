//! Errors reported by the grid model, generator and solvers

use thiserror::Error;

use crate::grid::Point;

/// Failure of a maze operation.
///
/// Operations are all-or-nothing: when an error is returned, no partial
/// grid or solution escapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Width or height below the minimum of 3 cells.
    #[error("maze dimensions {width}x{height} are too small, both must be at least 3")]
    InvalidDimensions { width: usize, height: usize },

    /// Start or end lies outside the grid.
    #[error("{point} lies outside the {width}x{height} grid")]
    OutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },

    /// Left-hand rule cannot pick an initial heading.
    #[error("start {0} is enclosed by walls, the left-hand rule cannot begin")]
    EnclosedStart(Point),

    /// Left-hand rule walked for longer than its step budget.
    #[error("left-hand rule exceeded the step limit of {limit}, the maze likely contains loops")]
    StepLimitExceeded { limit: u64 },

    /// Exhaustive search did not reach the end.
    #[error("no path from {start} to {end}")]
    NoPathFound { start: Point, end: Point },

    /// Observer asked to stop at a progress checkpoint.
    #[error("cancelled by observer at counter {counter}")]
    Cancelled { counter: u64 },

    /// Maze text contains an unknown symbol.
    #[error("unexpected character `{found}` at y={y}, x={x}")]
    UnexpectedCharacter { found: char, y: usize, x: usize },

    /// Rows of a maze do not share one length.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Maze text lacks a start or end marker.
    #[error("{0} is not found in maze")]
    MissingMarker(&'static str),
}

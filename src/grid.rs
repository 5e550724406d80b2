//! Rectangular cell grid and per-cell overlays
//!
//! The grid holds the permanent wall/open state of a maze. Solvers never
//! change it; their visited, on-path and filled markers live in separate
//! [CellMask] overlays of the same shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// Smallest legal width or height.
pub const MIN_DIMENSION: usize = 3;

/// Location in the grid
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Point {
    /// Row
    pub y: usize,
    /// Column
    pub x: usize,
}

impl Point {
    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

impl From<(usize, usize)> for Point {
    fn from((y, x): (usize, usize)) -> Self {
        Self { y, x }
    }
}

impl From<Point> for (usize, usize) {
    fn from(point: Point) -> Self {
        (point.y, point.x)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

/// One of the four orthogonal headings
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise enumeration order shared by the grid queries.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Row and column offset of a single step.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Heading after turning a quarter counter-clockwise.
    pub const fn left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Right => Direction::Up,
            Direction::Down => Direction::Right,
            Direction::Left => Direction::Down,
        }
    }

    /// Heading after turning a quarter clockwise.
    pub const fn right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

/// Permanent state of a grid cell
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Cell {
    Wall,
    Open,
}

/// Rectangular grid of walls and open cells, stored row-major
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid with every cell set to [Cell::Wall].
    ///
    /// Returns [MazeError::InvalidDimensions] before allocating if either
    /// side is below [MIN_DIMENSION].
    pub fn walled(width: usize, height: usize) -> Result<Self, MazeError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        })
    }

    /// Build a grid from rows of cells.
    ///
    /// All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_dimensions(width, height)?;

        let mut cells = Vec::with_capacity(width * height);
        for (row, cells_in_row) in rows.into_iter().enumerate() {
            if cells_in_row.len() != width {
                return Err(MazeError::RaggedRows {
                    row,
                    expected: width,
                    found: cells_in_row.len(),
                });
            }
            cells.extend(cells_in_row);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells, walls included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a grid has at least 3x3 cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.y < self.height && point.x < self.width
    }

    /// Error unless `point` lies inside the grid.
    pub fn check_bounds(&self, point: Point) -> Result<(), MazeError> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                point,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Cell state, or `None` outside the grid.
    pub fn cell(&self, point: Point) -> Option<Cell> {
        self.contains(point).then(|| self.cells[self.index(point)])
    }

    /// False if out of bounds or a wall.
    pub fn is_open(&self, point: Point) -> bool {
        self.cell(point) == Some(Cell::Open)
    }

    pub(crate) fn set(&mut self, point: Point, cell: Cell) {
        let index = self.index(point);
        self.cells[index] = cell;
    }

    /// Neighbour one step towards `direction`, if it is inside the grid.
    pub fn step(&self, point: Point, direction: Direction) -> Option<Point> {
        let (dy, dx) = direction.delta();
        let y = point.y.checked_add_signed(dy)?;
        let x = point.x.checked_add_signed(dx)?;
        let next = Point { y, x };
        self.contains(next).then_some(next)
    }

    /// In-bounds orthogonal neighbours in the order up, right, down, left.
    pub fn neighbors4(&self, point: Point) -> impl Iterator<Item = (Direction, Point)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.step(point, direction)?)))
    }

    /// Number of open orthogonal neighbours.
    pub fn open_neighbors(&self, point: Point) -> usize {
        self.neighbors4(point)
            .filter(|&(_, next)| self.is_open(next))
            .count()
    }

    /// Every point, row-major.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point { y, x }))
    }

    /// Open points, row-major.
    pub fn open_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.points().filter(|&point| self.is_open(point))
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Cell::Open).count()
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    fn index(&self, point: Point) -> usize {
        point.y * self.width + point.x
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), MazeError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        Err(MazeError::InvalidDimensions { width, height })
    } else {
        Ok(())
    }
}

/// Boolean overlay with the same shape as a [Grid]
///
/// Used for visited and on-path markers, filled dead ends and the final
/// solution mask.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CellMask {
    width: usize,
    height: usize,
    marks: Vec<bool>,
}

impl CellMask {
    /// Unmarked overlay for `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.width, grid.height)
    }

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            marks: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `point` is marked; false outside the overlay.
    pub fn get(&self, point: Point) -> bool {
        point.y < self.height && point.x < self.width && self.marks[point.y * self.width + point.x]
    }

    /// Mark or unmark `point`.
    ///
    /// # Panics
    /// If `point` lies outside the overlay.
    pub fn set(&mut self, point: Point, marked: bool) {
        assert!(
            point.y < self.height && point.x < self.width,
            "{point} outside {}x{} overlay",
            self.width,
            self.height
        );
        self.marks[point.y * self.width + point.x] = marked;
    }

    /// Number of marked cells.
    pub fn count(&self) -> usize {
        self.marks.iter().filter(|&&marked| marked).count()
    }

    /// Marked points, row-major.
    pub fn marked(&self) -> impl Iterator<Item = Point> + '_ {
        let width = self.width;
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, &marked)| marked)
            .map(move |(index, _)| Point {
                y: index / width,
                x: index % width,
            })
    }

    /// Rows of marks, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.marks.chunks(self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        // ###
        // #..
        // ###
        let mut grid = Grid::walled(3, 3).unwrap();
        grid.set(Point::new(1, 1), Cell::Open);
        grid.set(Point::new(1, 2), Cell::Open);
        grid
    }

    #[test]
    fn reject_small_dimensions() {
        assert_eq!(
            Grid::walled(2, 5),
            Err(MazeError::InvalidDimensions {
                width: 2,
                height: 5
            })
        );
        assert!(Grid::walled(3, 3).is_ok());
    }

    #[test]
    fn reject_ragged_rows() {
        let rows = vec![vec![Cell::Wall; 3], vec![Cell::Wall; 4], vec![Cell::Wall; 3]];
        assert_eq!(
            Grid::from_rows(rows),
            Err(MazeError::RaggedRows {
                row: 1,
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn neighbors_in_fixed_order() {
        let grid = Grid::walled(3, 3).unwrap();
        let neighbors: Vec<_> = grid.neighbors4(Point::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                (Direction::Up, Point::new(0, 1)),
                (Direction::Right, Point::new(1, 2)),
                (Direction::Down, Point::new(2, 1)),
                (Direction::Left, Point::new(1, 0)),
            ]
        );
    }

    #[test]
    fn corner_has_two_neighbors() {
        let grid = Grid::walled(3, 3).unwrap();
        let neighbors: Vec<_> = grid.neighbors4(Point::new(0, 0)).map(|(_, p)| p).collect();
        assert_eq!(neighbors, vec![Point::new(0, 1), Point::new(1, 0)]);
    }

    #[test]
    fn out_of_bounds_is_not_open() {
        let grid = corridor();
        assert!(grid.is_open(Point::new(1, 2)));
        assert!(!grid.is_open(Point::new(1, 3)));
        assert!(!grid.is_open(Point::new(0, 0)));
        assert_eq!(grid.open_neighbors(Point::new(1, 1)), 1);
        assert_eq!(grid.open_count(), 2);
        assert_eq!(grid.cell(Point::new(1, 1)), Some(Cell::Open));
        assert_eq!(grid.cell(Point::new(3, 1)), None);
    }

    #[test]
    fn check_bounds_reports_extent() {
        let grid = corridor();
        assert_eq!(
            grid.check_bounds(Point::new(3, 0)),
            Err(MazeError::OutOfBounds {
                point: Point::new(3, 0),
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn turns_are_consistent() {
        for direction in Direction::ALL {
            assert_eq!(direction.left().right(), direction);
            assert_eq!(direction.right().right(), direction.reverse());
            assert_eq!(direction.left().left(), direction.reverse());
        }
    }

    #[test]
    fn mask_marks_and_counts() {
        let grid = corridor();
        let mut mask = CellMask::for_grid(&grid);
        mask.set(Point::new(1, 1), true);
        mask.set(Point::new(2, 0), true);
        mask.set(Point::new(2, 0), false);
        assert_eq!(mask.count(), 1);
        assert!(mask.get(Point::new(1, 1)));
        assert!(!mask.get(Point::new(9, 9)));
        assert_eq!(mask.marked().collect::<Vec<_>>(), vec![Point::new(1, 1)]);
    }

    #[test]
    fn point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let point: Point = serde_json::from_str("[5, 1]").unwrap();
        assert_eq!(point, Point::new(5, 1));
    }
}

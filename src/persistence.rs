//! Maze files on disk
//!
//! A maze is stored as pretty-printed JSON. Cells are encoded as rows of
//! `1` (wall) and `0` (open). Mazes above the inline limit keep their
//! cells in a binary sidecar next to the JSON file instead.
//!
//! Sidecar format (little endian):
//! - u32: height
//! - u32: width
//! - height * width bytes, row-major: 1 for wall, 0 for open

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::grid::{Cell, CellMask, Grid, Point, MIN_DIMENSION};
use crate::solver::{Algorithm, Solution};
use crate::Maze;

/// Directory used when none is given.
pub const DEFAULT_DIRECTORY: &str = "mazes";

/// Mazes with more cells than this are written to a sidecar file.
pub const INLINE_CELL_LIMIT: usize = 100_000_000;

const WALL: u8 = 1;
const OPEN: u8 = 0;
const SIDECAR_EXTENSION: &str = "bin";
const SIDECAR_HEADER_LEN: usize = 8;

/// `YYYYmmdd_HHMMSS` in UTC, or bare seconds since the Unix epoch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(u64),
    Formatted(String),
}

impl Timestamp {
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self::from_unix(secs)
    }

    /// Format `secs` since the epoch as `YYYYmmdd_HHMMSS`, UTC.
    pub fn from_unix(secs: u64) -> Self {
        let (days, time) = (secs / 86_400, secs % 86_400);
        let (year, month, day) = civil_date(days);
        Timestamp::Formatted(format!(
            "{:04}{:02}{:02}_{:02}{:02}{:02}",
            year,
            month,
            day,
            time / 3600,
            time % 3600 / 60,
            time % 60
        ))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Unix(secs) => write!(f, "{secs}"),
            Timestamp::Formatted(text) => f.write_str(text),
        }
    }
}

/// Gregorian (year, month, day) of `days` since 1970-01-01.
fn civil_date(days: u64) -> (u64, u64, u64) {
    // Eras of 400 years starting on March 1st, year 0
    let z = days + 719_468;
    let era = z / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

/// Contents of a maze JSON file
///
/// Keys this crate does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MazeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cells: Option<usize>,
    pub start: Point,
    pub end: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub solved: bool,
    /// Inline cells, `1` wall and `0` open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maze: Option<Vec<Vec<u8>>>,
    /// Sidecar file name, relative to the JSON file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maze_file: Option<String>,
    /// Solution mask, `1` on the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<Vec<Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_ends_filled: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_path_length: Option<usize>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solve_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_timestamp: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MazeRecord {
    /// Record for a freshly generated, unsolved maze without cell data.
    fn describe(maze: &Maze) -> Self {
        let grid = maze.grid();
        MazeRecord {
            width: Some(grid.width()),
            height: Some(grid.height()),
            total_cells: Some(grid.len()),
            start: maze.start(),
            end: maze.end(),
            timestamp: Some(Timestamp::now()),
            solved: false,
            maze: None,
            maze_file: None,
            solution: None,
            algorithm: None,
            steps: None,
            iterations: None,
            dead_ends_filled: None,
            solution_path_length: None,
            solve_time: None,
            solved_timestamp: None,
            extra: Map::new(),
        }
    }

    /// Store `solution` and its statistics, replacing earlier results.
    pub fn record_solution(&mut self, solution: &Solution) {
        self.solved = true;
        self.solution = Some(mask_to_rows(&solution.path));
        self.algorithm = Some(solution.algorithm);
        self.solution_path_length = Some(solution.path_length());
        self.solve_time = Some(solution.elapsed.as_secs_f64());
        self.solved_timestamp = Some(Timestamp::now());
        match solution.algorithm {
            Algorithm::DeadEndFilling => {
                self.iterations = Some(solution.counter);
                self.dead_ends_filled = solution.filled;
                self.steps = None;
            }
            Algorithm::RecursiveBacktracking | Algorithm::LeftHandRule => {
                self.steps = Some(solution.counter);
                self.iterations = None;
                self.dead_ends_filled = None;
            }
        }
    }
}

/// Directory of maze files
pub struct MazeStore {
    directory: PathBuf,
    inline_cell_limit: usize,
}

impl MazeStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            inline_cell_limit: INLINE_CELL_LIMIT,
        }
    }

    /// Move mazes with more than `limit` cells to a sidecar file.
    pub fn with_inline_cell_limit(mut self, limit: usize) -> Self {
        self.inline_cell_limit = limit;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `maze` to a new `maze_{W}x{H}_{timestamp}.json` file.
    ///
    /// Returns the path of the JSON file.
    pub fn save(&self, maze: &Maze) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.directory).with_context(|| {
            format!("Could not create directory {}", self.directory.display())
        })?;

        let grid = maze.grid();
        let mut record = MazeRecord::describe(maze);
        let stem = self.unused_stem(grid, &record)?;
        let path = self.directory.join(format!("{stem}.json"));

        if grid.len() > self.inline_cell_limit {
            let sidecar = format!("{stem}.{SIDECAR_EXTENSION}");
            write_sidecar(&self.directory.join(&sidecar), grid)?;
            info!(file = %sidecar, "maze too large to inline, cells written to sidecar");
            record.maze_file = Some(sidecar);
        } else {
            record.maze = Some(grid_to_rows(grid));
        }

        write_record(&path, &record)?;
        info!(path = %path.display(), "maze saved");
        Ok(path)
    }

    /// Most recently modified `maze_*.json` file in the directory.
    pub fn latest(&self) -> anyhow::Result<Option<PathBuf>> {
        if !self.directory.exists() {
            return Ok(None);
        }
        let entries = fs::read_dir(&self.directory)
            .with_context(|| format!("Could not list {}", self.directory.display()))?;

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_maze = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("maze_") && name.ends_with(".json"));
            if !is_maze {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if latest.as_ref().map_or(true, |(newest, _)| modified > *newest) {
                latest = Some((modified, path));
            }
        }
        Ok(latest.map(|(_, path)| path))
    }

    fn unused_stem(&self, grid: &Grid, record: &MazeRecord) -> anyhow::Result<String> {
        let stamp = record
            .timestamp
            .clone()
            .unwrap_or_else(|| Timestamp::from_unix(0));
        let base = format!("maze_{}x{}_{}", grid.width(), grid.height(), stamp);
        for suffix in 0..1000 {
            let stem = if suffix == 0 {
                base.clone()
            } else {
                format!("{base}_{suffix}")
            };
            if !self.directory.join(format!("{stem}.json")).exists() {
                return Ok(stem);
            }
        }
        bail!("Could not find a free file name for {base}")
    }
}

impl Default for MazeStore {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY)
    }
}

/// Load a maze file, resolving a sidecar relative to it.
pub fn load(path: &Path) -> anyhow::Result<(Maze, MazeRecord)> {
    let file =
        File::open(path).with_context(|| format!("Maze file not found: {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    load_from_reader(BufReader::new(file), base)
        .with_context(|| format!("Could not load maze from {}", path.display()))
}

/// Load maze JSON from `reader`; a sidecar is looked up in `base`.
pub fn load_from_reader(reader: impl Read, base: &Path) -> anyhow::Result<(Maze, MazeRecord)> {
    let record: MazeRecord = serde_json::from_reader(reader).context("Invalid maze JSON")?;

    let grid = if let Some(rows) = &record.maze {
        rows_to_grid(rows)?
    } else if let Some(name) = &record.maze_file {
        read_sidecar(&base.join(name))?
    } else {
        bail!("No maze data found in file");
    };

    if let (Some(width), Some(height)) = (record.width, record.height) {
        if (width, height) != (grid.width(), grid.height()) {
            bail!(
                "Declared size {}x{} does not match cell data {}x{}",
                width,
                height,
                grid.width(),
                grid.height()
            );
        }
    }

    let maze = Maze::new(grid, record.start, record.end)?;
    debug!(
        width = maze.grid().width(),
        height = maze.grid().height(),
        "maze loaded"
    );
    Ok((maze, record))
}

/// Store `solution` in the maze file at `path`, keeping everything else.
pub fn save_solution(path: &Path, solution: &Solution) -> anyhow::Result<()> {
    let file =
        File::open(path).with_context(|| format!("Maze file not found: {}", path.display()))?;
    let mut record: MazeRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid maze JSON in {}", path.display()))?;

    record.record_solution(solution);
    write_record(path, &record)?;
    info!(path = %path.display(), algorithm = %solution.algorithm, "solution saved");
    Ok(())
}

/// Solution mask stored in `record`, if any.
pub fn stored_solution(record: &MazeRecord) -> anyhow::Result<Option<CellMask>> {
    let Some(rows) = &record.solution else {
        return Ok(None);
    };
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        bail!("Stored solution is empty");
    }
    let mut mask = CellMask::new(width, height);
    for (y, row) in rows.iter().enumerate() {
        if row.len() != width {
            bail!("Solution row {} has {} cells, expected {}", y, row.len(), width);
        }
        for (x, &value) in row.iter().enumerate() {
            mask.set(Point { y, x }, value != 0);
        }
    }
    Ok(Some(mask))
}

fn write_record(path: &Path, record: &MazeRecord) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record)?;
    writer.flush()?;
    Ok(())
}

fn grid_to_rows(grid: &Grid) -> Vec<Vec<u8>> {
    grid.rows()
        .map(|row| row.iter().map(|&cell| encode(cell)).collect())
        .collect()
}

fn mask_to_rows(mask: &CellMask) -> Vec<Vec<u8>> {
    mask.rows()
        .map(|row| row.iter().map(|&marked| u8::from(marked)).collect())
        .collect()
}

fn rows_to_grid(rows: &[Vec<u8>]) -> anyhow::Result<Grid> {
    let cells = rows
        .iter()
        .enumerate()
        .map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(|(x, &value)| decode(value).ok_or_else(|| bad_cell(value, y, x)))
                .collect::<anyhow::Result<Vec<_>>>()
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Grid::from_rows(cells)?)
}

fn encode(cell: Cell) -> u8 {
    match cell {
        Cell::Wall => WALL,
        Cell::Open => OPEN,
    }
}

fn decode(value: u8) -> Option<Cell> {
    match value {
        WALL => Some(Cell::Wall),
        OPEN => Some(Cell::Open),
        _ => None,
    }
}

fn bad_cell(value: u8, y: usize, x: usize) -> anyhow::Error {
    anyhow!("Unexpected cell value {} at y={}, x={}", value, y, x)
}

fn write_sidecar(path: &Path, grid: &Grid) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&u32::try_from(grid.height())?.to_le_bytes())?;
    writer.write_all(&u32::try_from(grid.width())?.to_le_bytes())?;
    for row in grid.rows() {
        let bytes: Vec<u8> = row.iter().map(|&cell| encode(cell)).collect();
        writer.write_all(&bytes)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_sidecar(path: &Path) -> anyhow::Result<Grid> {
    let file = File::open(path)
        .with_context(|| format!("Maze data file not found: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut u32_buffer = [0u8; 4];

    reader.read_exact(&mut u32_buffer)?;
    let height = u32::from_le_bytes(u32_buffer) as usize;
    reader.read_exact(&mut u32_buffer)?;
    let width = u32::from_le_bytes(u32_buffer) as usize;

    if height < MIN_DIMENSION || width < MIN_DIMENSION {
        bail!("Maze data file declares invalid size {}x{}", width, height);
    }
    let expected = height
        .checked_mul(width)
        .and_then(|cells| cells.checked_add(SIDECAR_HEADER_LEN))
        .ok_or_else(|| anyhow!("Maze data file declares oversized {}x{} maze", width, height))?;
    let actual = reader.get_ref().metadata()?.len();
    if actual != expected as u64 {
        bail!(
            "Maze data file is {} bytes, a {}x{} maze needs {}",
            actual,
            width,
            height,
            expected
        );
    }

    let mut rows = Vec::with_capacity(height);
    let mut bytes = vec![0u8; width];
    for y in 0..height {
        reader
            .read_exact(&mut bytes)
            .with_context(|| format!("Maze data file ends at row {}", y))?;
        let row = bytes
            .iter()
            .enumerate()
            .map(|(x, &value)| decode(value).ok_or_else(|| bad_cell(value, y, x)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        rows.push(row);
    }
    Ok(Grid::from_rows(rows)?)
}

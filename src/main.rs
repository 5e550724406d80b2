//! CLI for maze solving

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use clap::Parser;
use maze_solvers::{
    analysis::MazeStats,
    persistence::{self, MazeStore, DEFAULT_DIRECTORY},
    render::{format_maze, TerminalPlayback},
    Algorithm, Maze, Observer, SolveOptions,
};
use tracing::info;

/// Larger solved mazes are not printed
const PRINT_LIMIT: usize = 10_000;

/// Solve a maze with one of three classic algorithms
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze file: JSON or emoji text. Use `-` for stdin, omit for the
    /// newest maze in `--dir`.
    file: Option<PathBuf>,

    /// Directory searched for the newest maze
    #[arg(long, default_value = DEFAULT_DIRECTORY)]
    dir: PathBuf,

    /// Solving algorithm
    #[arg(short, long, default_value_t = Algorithm::DeadEndFilling)]
    algorithm: Algorithm,

    /// Moves the left-hand rule may take before giving up
    #[arg(long, default_value_t = SolveOptions::DEFAULT_STEP_LIMIT)]
    step_limit: u64,

    /// Counter increments between playback frames
    #[arg(long)]
    progress_interval: Option<u64>,

    /// Display progress on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 50)]
    frame_length: u64,

    /// Do not write the solution back to the maze file
    #[arg(long)]
    no_save: bool,

    /// Print structural statistics of the maze
    #[arg(long)]
    stats: bool,

    /// Write a PNG image of the solution next to the maze file
    #[cfg(feature = "png")]
    #[arg(long)]
    png: bool,
}

/// Where the maze came from
enum Source {
    Json(PathBuf),
    Text,
}

/// Read maze, solve it, print report
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    let args = Args::parse();

    let (maze, source) = read_maze(&args)?;
    info!(
        width = maze.grid().width(),
        height = maze.grid().height(),
        start = %maze.start(),
        end = %maze.end(),
        "maze loaded"
    );

    if args.stats {
        let stats = MazeStats::of(maze.grid());
        println!("Open cells: {}", stats.open_cells);
        println!("Dead ends: {}", stats.dead_ends);
        println!("Junctions: {}", stats.junctions);
        println!("Perfect: {}", stats.perfect);
    }

    let options = SolveOptions {
        step_limit: args.step_limit,
        progress_interval: args.progress_interval,
        headless: !args.playback,
    };
    let mut playback = TerminalPlayback::for_maze(
        &maze,
        args.algorithm.counter_name(),
        Duration::from_millis(args.frame_length),
    );
    let observer = args.playback.then_some(&mut playback as &mut dyn Observer);
    let solution = maze
        .solve_with(args.algorithm, &options, observer)
        .with_context(|| format!("Solving with {} failed", args.algorithm))?;

    if !args.playback && maze.grid().len() <= PRINT_LIMIT {
        println!("{}", format_maze(&maze, Some(&solution.path)));
    }
    solution.print_report();

    if let Source::Json(path) = &source {
        if !args.no_save {
            persistence::save_solution(path, &solution)?;
        }
        #[cfg(feature = "png")]
        if args.png {
            let image = path.with_extension("png");
            maze_solvers::png::export(&maze, Some(&solution.path), &image)?;
            println!("Image saved to {}", image.display());
        }
    }
    Ok(())
}

fn read_maze(args: &Args) -> anyhow::Result<(Maze, Source)> {
    let path = match &args.file {
        Some(path) if path.to_str() == Some("-") => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            return Ok((parse_text(&buf, Path::new("."))?, Source::Text));
        }
        Some(path) if path.to_str() != Some("latest") => path.clone(),
        _ => MazeStore::new(&args.dir)
            .latest()?
            .ok_or_else(|| anyhow!("No maze files found in {}", args.dir.display()))?,
    };

    if path.extension().is_some_and(|ext| ext == "json") {
        let (maze, _) = persistence::load(&path)?;
        Ok((maze, Source::Json(path)))
    } else {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Ok((parse_text(&text, Path::new("."))?, Source::Text))
    }
}

/// JSON or emoji drawing, whichever `text` looks like.
fn parse_text(text: &str, base: &Path) -> anyhow::Result<Maze> {
    let text = text.trim();
    if text.starts_with('{') {
        let (maze, _) = persistence::load_from_reader(text.as_bytes(), base)?;
        Ok(maze)
    } else {
        Ok(Maze::parse_emojis(text)?)
    }
}

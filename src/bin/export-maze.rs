//! CLI for maze image export

use std::{io, path::PathBuf};

use anyhow::{anyhow, bail};
use clap::Parser;
use maze_solvers::persistence::{self, MazeStore, DEFAULT_DIRECTORY};

/// Export a saved maze as a PNG image
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze JSON file, omit for the newest maze in `--dir`
    file: Option<PathBuf>,

    /// Directory searched for the newest maze
    #[arg(long, default_value = DEFAULT_DIRECTORY)]
    dir: PathBuf,

    /// Image path, defaults to the maze file with a `.png` extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Draw the stored solution
    #[arg(long)]
    with_solution: bool,
}

/// Load maze, write image
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    let args = Args::parse();

    let path = match args.file {
        Some(path) => path,
        None => MazeStore::new(&args.dir)
            .latest()?
            .ok_or_else(|| anyhow!("No maze files found in {}", args.dir.display()))?,
    };
    let (maze, record) = persistence::load(&path)?;

    let solution = if args.with_solution {
        let solution = persistence::stored_solution(&record)?;
        if let Some(mask) = &solution {
            let grid = maze.grid();
            if (mask.width(), mask.height()) != (grid.width(), grid.height()) {
                bail!(
                    "Stored solution is {}x{}, maze is {}x{}",
                    mask.width(),
                    mask.height(),
                    grid.width(),
                    grid.height()
                );
            }
        } else {
            println!("Maze has no stored solution, exporting without one");
        }
        solution
    } else {
        None
    };

    let output = args.output.unwrap_or_else(|| path.with_extension("png"));
    maze_solvers::png::export(&maze, solution.as_ref(), &output)?;
    println!("Image saved to {}", output.display());
    Ok(())
}

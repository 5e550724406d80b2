//! CLI for maze generation

use std::{io, path::PathBuf, time::Duration};

use clap::Parser;
use maze_solvers::{
    generator::MazeGenerator,
    persistence::{MazeStore, DEFAULT_DIRECTORY},
    render::TerminalPlayback,
    Point,
};

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width in cells, even values are rounded up
    #[arg(long, default_value_t = 39)]
    width: usize,

    /// Maze height in cells, even values are rounded up
    #[arg(long, default_value_t = 19)]
    height: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory where the maze is saved
    #[arg(long, default_value = DEFAULT_DIRECTORY)]
    dir: PathBuf,

    /// Print the maze to stdout instead of saving it
    #[arg(long)]
    print: bool,

    /// Display carving on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 20)]
    frame_length: u64,

    /// Carved passages between playback frames
    #[arg(long)]
    progress_interval: Option<u64>,

    /// Also write a PNG image next to the saved maze
    #[cfg(feature = "png")]
    #[arg(long)]
    png: bool,
}

/// Generate maze, save or print it
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
    let args = Args::parse();

    let mut generator = MazeGenerator::new(args.seed);
    if let Some(interval) = args.progress_interval {
        generator = generator.with_progress_interval(interval);
    }

    let maze = if args.playback {
        let width = MazeGenerator::odd_dimension(args.width);
        let height = MazeGenerator::odd_dimension(args.height);
        let mut playback =
            TerminalPlayback::new("Carved", Duration::from_millis(args.frame_length))
                .with_endpoints(
                    Point::new(1, 1),
                    Point::new(height.saturating_sub(2), width.saturating_sub(2)),
                );
        generator.generate_observed(args.width, args.height, &mut playback)?
    } else {
        generator.generate(args.width, args.height)?
    };

    if args.print {
        println!("{maze}");
        return Ok(());
    }

    let path = MazeStore::new(&args.dir).save(&maze)?;
    println!("Maze saved to {}", path.display());

    #[cfg(feature = "png")]
    if args.png {
        let image = path.with_extension("png");
        maze_solvers::png::export(&maze, None, &image)?;
        println!("Image saved to {}", image.display());
    }
    Ok(())
}

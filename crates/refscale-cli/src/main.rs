mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Workspace;

#[derive(Parser)]
#[command(name = "refscale", about = "Scale and square up reference images on a drafting board")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory the board is stored in
    #[arg(long, global = true, default_value = ".refscale")]
    store: PathBuf,

    /// TOML config file (see `refscale config`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board and its images
    Info,
    /// Add image files to the board
    Add(commands::add::AddArgs),
    /// Set the paper size and orientation
    Paper(commands::paper::PaperArgs),
    /// Set the drafting scale, e.g. "1/4\" = 1'-0\""
    Scale(commands::scale::ScaleArgs),
    /// Calibrate an image from a line of known real-world length
    Calibrate(commands::calibrate::CalibrateArgs),
    /// Measure a real-world distance between two board points
    Measure(commands::measure::MeasureArgs),
    /// Crop an image to a rectangle
    Crop(commands::crop::CropArgs),
    /// Correct perspective from four corners
    Rectify(commands::rectify::RectifyArgs),
    /// Restore an image's original pixels
    Reset(commands::edit::IdArgs),
    /// Remove an image from the board
    Remove(commands::edit::IdArgs),
    /// Move an image on the board
    Move(commands::edit::MoveArgs),
    /// Export the board as a PDF
    Export(commands::export::ExportArgs),
    /// Print or save the default configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Config(args) = &cli.command {
        return commands::config::run(args);
    }

    let mut ws = Workspace::open(&cli.store, cli.config.as_deref())?;
    match &cli.command {
        Commands::Info => commands::info::run(&ws),
        Commands::Add(args) => commands::add::run(&mut ws, args),
        Commands::Paper(args) => commands::paper::run(&mut ws, args),
        Commands::Scale(args) => commands::scale::run(&mut ws, args),
        Commands::Calibrate(args) => commands::calibrate::run(&mut ws, args),
        Commands::Measure(args) => commands::measure::run(&ws, args),
        Commands::Crop(args) => commands::crop::run(&mut ws, args),
        Commands::Rectify(args) => commands::rectify::run(&mut ws, args),
        Commands::Reset(args) => commands::edit::reset(&mut ws, args),
        Commands::Remove(args) => commands::edit::remove(&mut ws, args),
        Commands::Move(args) => commands::edit::move_image(&mut ws, args),
        Commands::Export(args) => commands::export::run(&ws, args),
        Commands::Config(args) => commands::config::run(args),
    }
}

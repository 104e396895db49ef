//! Tether demo
//!
//! Builds a widget scene on the headless host and replays a script of
//! clicks, resizes, closes and destroys against it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod runner;
mod scene;

use scene::Scene;

const BUILTIN_SCENE: &str = include_str!("../scenes/demo.toml");

#[derive(Parser)]
#[command(name = "tether-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay widget scenes against a headless host", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a scene and replay its steps
    Run {
        /// Scene file (the bundled demo scene when omitted)
        scene: Option<PathBuf>,
    },

    /// Check a scene file without running it
    Validate {
        /// Scene file
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { scene } => cmd_run(scene),
        Commands::Validate { scene } => cmd_validate(scene),
    }
}

fn cmd_run(path: Option<PathBuf>) -> Result<()> {
    let scene = match &path {
        Some(path) => {
            info!("Loading scene from {}", path.display());
            Scene::load(path)?
        }
        None => {
            info!("Running the bundled demo scene");
            Scene::parse(BUILTIN_SCENE)?
        }
    };

    if let Some(description) = &scene.scene.description {
        info!("{}: {}", scene.scene.name, description);
    }

    let report = runner::run(&scene)?;
    println!("{report}");
    Ok(())
}

fn cmd_validate(path: PathBuf) -> Result<()> {
    let scene = Scene::load(&path)?;
    info!(
        "{} is valid: {} widgets, {} subscriptions, {} steps",
        path.display(),
        scene.widgets.len(),
        scene.subscriptions.len(),
        scene.steps.len()
    );
    Ok(())
}

//! Aria CLI - Command-line interface for scene-aware music

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{music, preset};

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Scene-aware music selection and generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the best preset for a scene without generating anything
    Select {
        /// Path to a scene TOML file
        scene: String,

        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,
    },

    /// Resolve music for a scene: best preset first, generation on a miss
    Generate {
        /// Path to a scene TOML file
        scene: String,

        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,

        /// Use the offline mock service instead of the real API
        #[arg(long)]
        mock: bool,

        /// Play the resulting track
        #[arg(long)]
        play: bool,

        /// Crossfade duration in seconds when playing
        #[arg(long, default_value_t = 0.5)]
        crossfade: f64,
    },

    /// Generate presets for many scenes under the service rate limit
    Batch {
        /// Path to a scenes TOML file (`[[scenes]]` entries with label + scene)
        scenes: String,

        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,

        /// Use the offline mock service instead of the real API
        #[arg(long)]
        mock: bool,

        /// Re-queue failed submissions (up to 3 attempts) instead of dropping
        #[arg(long)]
        requeue: bool,
    },

    /// Preset library operations
    #[command(subcommand)]
    Preset(preset::PresetCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Select { scene, store } => music::run_select(&scene, &store),
        Commands::Generate {
            scene,
            store,
            mock,
            play,
            crossfade,
        } => music::run_generate(&scene, &store, mock, play, crossfade),
        Commands::Batch {
            scenes,
            store,
            mock,
            requeue,
        } => music::run_batch(&scenes, &store, mock, requeue),
        Commands::Preset(cmd) => preset::run(cmd),
    }
}

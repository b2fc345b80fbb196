//! Preset library commands

use anyhow::Result;
use aria_preset::{PresetLibrary, PresetStore};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum PresetCommands {
    /// List all presets
    List {
        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,
    },

    /// Show library statistics
    Stats {
        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,
    },

    /// Delete every preset and persist the empty library
    Clear {
        /// Preset store directory
        #[arg(long, default_value = ".aria/presets")]
        store: String,

        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(cmd: PresetCommands) -> Result<()> {
    match cmd {
        PresetCommands::List { store } => {
            let library = PresetLibrary::load(PresetStore::new(&store))?;
            if library.is_empty() {
                println!("No presets in {}", store);
                return Ok(());
            }
            for entry in library.entries() {
                println!(
                    "{}  intensity {:.2}  {}",
                    entry.id,
                    entry.intensity,
                    entry.audio_file.as_deref().unwrap_or("<no audio file>")
                );
            }
            Ok(())
        }
        PresetCommands::Stats { store } => {
            let library = PresetLibrary::load(PresetStore::new(&store))?;
            println!("{}", library.stats());
            Ok(())
        }
        PresetCommands::Clear { store, yes } => {
            let mut library = PresetLibrary::load(PresetStore::new(&store))?;
            if library.is_empty() {
                println!("Library is already empty");
                return Ok(());
            }
            if !yes {
                print!("Delete {} presets? [y/N] ", library.len());
                use std::io::Write;
                std::io::stdout().flush()?;
                let mut line = String::new();
                std::io::stdin().read_line(&mut line)?;
                if !line.trim().eq_ignore_ascii_case("y") {
                    println!("Aborted");
                    return Ok(());
                }
            }
            library.clear_all()?;
            println!("Cleared");
            Ok(())
        }
    }
}

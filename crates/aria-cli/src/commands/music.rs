//! Select, generate, and batch commands

use anyhow::{Context, Result};
use aria_core::SceneDescriptor;
use aria_gen::{
    create_service, AriaConfig, BatchConfig, BatchScheduler, DirectorConfig, JobEvent,
    MusicDirector, MusicSelection, SubmitFailurePolicy,
};
use aria_playback::MusicPlayer;
use aria_preset::{similarity, PresetLibrary, PresetStore};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Deserialize)]
struct ScenesFile {
    #[serde(default)]
    scenes: Vec<SceneRow>,
}

#[derive(Deserialize)]
struct SceneRow {
    label: String,
    #[serde(default)]
    scene: SceneDescriptor,
}

fn load_scene(path: &str) -> Result<SceneDescriptor> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let scene: SceneDescriptor =
        toml::from_str(&content).with_context(|| format!("Failed to parse scene {}", path))?;
    Ok(scene)
}

fn load_library(store: &str, config: &AriaConfig) -> Result<PresetLibrary> {
    let mut library = PresetLibrary::load(PresetStore::new(store))?;
    library.similarity_threshold = config.generation.similarity_threshold;
    Ok(library)
}

pub fn run_select(scene_path: &str, store: &str) -> Result<()> {
    let config = AriaConfig::load()?;
    let scene = load_scene(scene_path)?;
    let library = load_library(store, &config)?;

    println!("Library: {}", library.stats());
    println!(
        "Scene: {} (intensity {:.2})",
        scene.scene_key(),
        scene.intensity()
    );

    match library.select_best(&scene) {
        Some(entry) => {
            let score = similarity(&scene, &entry.scene);
            println!(
                "Selected {} ({}) score {:.2} intensity {:.2}",
                entry.id, entry.name, score, entry.intensity
            );
        }
        None => println!("No preset with a resolvable artifact; generation required"),
    }
    Ok(())
}

pub fn run_generate(
    scene_path: &str,
    store: &str,
    mock: bool,
    play: bool,
    crossfade: f64,
) -> Result<()> {
    let config = AriaConfig::load()?;
    let scene = load_scene(scene_path)?;
    let service = create_service(if mock { "mock" } else { "suno" }, &config)?;
    let library = load_library(store, &config)?;
    let director = MusicDirector::new(service, library, DirectorConfig::from(&config));

    let track = match director.music_for_scene(&scene)? {
        MusicSelection::Preset { entry, track } => {
            println!("Matched preset {} ({})", entry.id, entry.name);
            track
        }
        MusicSelection::Cached { key, track } => {
            println!("Cache hit: {}", key);
            track
        }
        MusicSelection::Generating(handle) => {
            println!("No preset matched; generating \"{}\"", scene.style_prompt());
            let mut last_decile = 0;
            let mut outcome = None;
            for event in handle.events().iter() {
                match event {
                    JobEvent::Progress(fraction) => {
                        let decile = (fraction * 10.0) as u32;
                        if decile > last_decile {
                            eprintln!("  waiting... {}%", decile * 10);
                            last_decile = decile;
                        }
                    }
                    JobEvent::Complete(track) => {
                        outcome = Some(track);
                        break;
                    }
                    JobEvent::Failed(reason) => anyhow::bail!("Generation failed: {}", reason),
                }
            }
            let track = outcome.context("Job ended without a result")?;
            println!("Generated {} bytes", track.len());
            track
        }
    };

    if play {
        let mut player = MusicPlayer::new();
        player.play(&track, Duration::from_secs_f64(crossfade))?;
        println!("Playing; press Enter to stop");
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        player.stop(Duration::from_secs_f64(crossfade));
    }

    Ok(())
}

pub fn run_batch(scenes_path: &str, store: &str, mock: bool, requeue: bool) -> Result<()> {
    let config = AriaConfig::load()?;
    let content = std::fs::read_to_string(scenes_path)
        .with_context(|| format!("Failed to read {}", scenes_path))?;
    let file: ScenesFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", scenes_path))?;
    anyhow::ensure!(!file.scenes.is_empty(), "No scenes in {}", scenes_path);

    let service = create_service(if mock { "mock" } else { "suno" }, &config)?;
    let library = Arc::new(Mutex::new(load_library(store, &config)?));

    let mut batch_config = BatchConfig {
        poll: config.poll_config(),
        ..Default::default()
    };
    if requeue {
        batch_config.submit_failure = SubmitFailurePolicy::Requeue { max_attempts: 3 };
    }

    let mut scheduler = BatchScheduler::new(service, library, batch_config);
    for row in file.scenes {
        scheduler.enqueue_scene(row.label, row.scene);
    }

    println!("Generating {} scenes...", scheduler.pending_len());
    let report = scheduler.run();
    println!("Batch finished: {}", report);
    Ok(())
}

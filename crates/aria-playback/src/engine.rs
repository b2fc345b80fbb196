//! Music player wrapping Kira's AudioManager
//!
//! Accepts raw artifact bytes and crossfades between tracks. Degrades
//! gracefully when no audio device is available.

use aria_core::{AriaError, Result};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend, Tween};
use std::io::Cursor;
use std::time::Duration;

/// Plays one music track at a time, crossfading on changeover
pub struct MusicPlayer {
    manager: Option<AudioManager<DefaultBackend>>,
    current: Option<StaticSoundHandle>,
    master_volume: f64,
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicPlayer {
    pub fn new() -> Self {
        // Try to create the audio manager; gracefully fail if no device
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| eprintln!("Audio: no device available ({e}), running silent"))
            .ok();

        Self {
            manager,
            current: None,
            master_volume: 1.0,
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 2.0);
    }

    /// Start a track from raw bytes, fading the previous one out over the
    /// crossfade duration. Tracks loop until replaced or stopped.
    pub fn play(&mut self, bytes: &[u8], crossfade: Duration) -> Result<()> {
        let manager = match &mut self.manager {
            Some(m) => m,
            None => return Ok(()),
        };

        let data = StaticSoundData::from_cursor(Cursor::new(bytes.to_vec()))
            .map_err(|e| AriaError::AudioError(format!("Failed to decode track: {}", e)))?
            .volume(amplitude_to_db(self.master_volume))
            .fade_in_tween(Tween {
                duration: crossfade,
                ..Default::default()
            })
            .loop_region(..);

        if let Some(mut old) = self.current.take() {
            old.stop(Tween {
                duration: crossfade,
                ..Default::default()
            });
        }

        let handle = manager
            .play(data)
            .map_err(|e| AriaError::AudioError(format!("Failed to play track: {}", e)))?;
        self.current = Some(handle);
        Ok(())
    }

    /// Fade the current track out
    pub fn stop(&mut self, fade_out: Duration) {
        if let Some(mut handle) = self.current.take() {
            handle.stop(Tween {
                duration: fade_out,
                ..Default::default()
            });
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }
}

/// Convert linear amplitude (0.0–2.0) to decibels
fn amplitude_to_db(amplitude: f64) -> kira::Decibels {
    if amplitude <= 0.0 {
        kira::Decibels(-60.0) // silence
    } else {
        kira::Decibels((20.0 * (amplitude as f32).log10()).max(-60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_player() -> MusicPlayer {
        MusicPlayer {
            manager: None,
            current: None,
            master_volume: 1.0,
        }
    }

    #[test]
    fn test_play_without_device_is_silent_noop() {
        let mut player = silent_player();
        assert!(!player.is_available());
        // garbage bytes never reach the decoder without a device
        assert!(player.play(&[0u8; 4], Duration::from_millis(500)).is_ok());
        assert!(!player.is_playing());
    }

    #[test]
    fn test_master_volume_clamped() {
        let mut player = silent_player();
        player.set_master_volume(5.0);
        assert_eq!(player.master_volume, 2.0);
        player.set_master_volume(-1.0);
        assert_eq!(player.master_volume, 0.0);
    }

    #[test]
    fn test_amplitude_to_db() {
        assert_eq!(amplitude_to_db(1.0).0, 0.0);
        assert_eq!(amplitude_to_db(0.0).0, -60.0);
        assert!(amplitude_to_db(0.5).0 < 0.0);
        assert!(amplitude_to_db(2.0).0 > 0.0);
        // tiny amplitudes clamp at the silence floor
        assert_eq!(amplitude_to_db(1e-9).0, -60.0);
    }
}

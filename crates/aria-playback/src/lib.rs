//! Aria Playback - Music playback sink (Kira backend)
//!
//! The generation and preset crates hand resolved artifact bytes to
//! `MusicPlayer`; this crate owns nothing about selection or generation.

pub mod engine;

pub use engine::MusicPlayer;

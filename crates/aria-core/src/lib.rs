//! Aria Core - Foundational types for the Aria adaptive-music toolkit
//!
//! This crate provides the types every other Aria crate depends on:
//! - `SceneDescriptor` - Snapshot of gameplay state driving music selection
//! - `ContentHash` - SHA-256 based hashing for cache keys and artifacts
//! - Error types and Result alias

mod error;
mod hash;
mod scene;
mod time;

pub use error::{AriaError, Result};
pub use hash::ContentHash;
pub use scene::{
    Action, EnemyPresence, Environment, GameLevel, SceneDescriptor, TimeOfDay, Weather,
};
pub use time::now_iso8601;

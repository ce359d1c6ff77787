//! Playback state management for the sound and music layer of a game.
//!
//! See [`audio_system::SoundBoard`] for the entry point.

pub mod audio_system;
pub mod config;
pub mod error;

pub use audio_system::SoundBoard;
pub use error::{AudioError, ConfigError, LibraryBuildError, SoundError, StoreError};

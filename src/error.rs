use thiserror::Error;

/// Errors surfaced by the sound board API.
///
/// Every variant is local to the failing call: the board is never left
/// partially mutated when one of these is returned.
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Unknown sound: {0}")]
    UnknownSound(String),

    #[error("Invalid volume {0}: must be within 0.0..=1.0")]
    InvalidVolume(f32),

    #[error("No playing instance named {0}")]
    NoSuchInstance(String),

    #[error("Failed to start playback of {name}")]
    Playback {
        name: String,
        #[source]
        source: AudioError,
    },
}

/// Startup-fatal errors raised while building the asset library.
#[derive(Error, Debug)]
pub enum LibraryBuildError {
    #[error("No file types configured for the sound library")]
    NoFileTypes,

    #[error("Missing {file_type} asset for sound {name}: {path}")]
    MissingAsset {
        name: String,
        file_type: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sound {name} is listed under both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Playback backend failures.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No playable source for sound: {0}")]
    NoPlayableSource(String),
}

/// Persistent settings store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to load settings from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save settings to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = SoundError::UnknownSound("boom".to_string());
        assert_eq!(err.to_string(), "Unknown sound: boom");

        let err = SoundError::InvalidVolume(1.5);
        assert_eq!(err.to_string(), "Invalid volume 1.5: must be within 0.0..=1.0");

        let err = LibraryBuildError::NoFileTypes;
        assert_eq!(err.to_string(), "No file types configured for the sound library");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = LibraryBuildError::MissingAsset {
            name: "jump".to_string(),
            file_type: "ogg".to_string(),
            path: "/sounds/sfx/jump.ogg".to_string(),
            source: io_err,
        };

        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Missing ogg asset for sound jump: /sounds/sfx/jump.ogg"
        );

        let err = SoundError::Playback {
            name: "jump".to_string(),
            source: AudioError::NoPlayableSource("jump".to_string()),
        };
        assert!(err.source().is_some());
    }
}

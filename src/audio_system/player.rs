/// Playback primitives
///
/// `Playable` is one audible copy of a sound; `AudioBackend` creates them.
/// `RodioBackend` plays through the default output device.

use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::library::{AssetFile, SoundAsset};
use crate::error::AudioError;

/// A single playing copy of a sound
pub trait Playable {
    /// Start or continue playback
    fn play(&mut self);

    fn pause(&mut self);

    /// End playback for good; the voice is not played again
    fn stop(&mut self);

    /// Go back to the start, paused
    fn rewind(&mut self);

    /// Rewind and play again from the start
    fn restart(&mut self) {
        self.rewind();
        self.play();
    }

    /// Set volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    fn is_paused(&self) -> bool;

    /// Whether playback reached the end on its own
    fn is_finished(&self) -> bool;
}

/// Creates playable instances from library assets
pub trait AudioBackend {
    fn instantiate(&mut self, asset: &SoundAsset) -> Result<Box<dyn Playable>, AudioError>;
}

/// Backend playing on the system's default output device
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl RodioBackend {
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;
        tracing::debug!("Opened default audio output stream");
        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn instantiate(&mut self, asset: &SoundAsset) -> Result<Box<dyn Playable>, AudioError> {
        // First file type that decodes wins
        for file in asset.files() {
            match RodioVoice::new(self.stream_handle.clone(), file) {
                Ok(voice) => return Ok(Box::new(voice)),
                Err(e) => tracing::debug!(
                    "Skipping {} for {}: {}",
                    file.path.display(),
                    asset.name(),
                    e
                ),
            }
        }
        Err(AudioError::NoPlayableSource(asset.name().to_string()))
    }
}

/// One rodio sink playing one decoded file
struct RodioVoice {
    stream_handle: OutputStreamHandle,
    audio_data: Arc<Vec<u8>>,
    sink: Sink,
    volume: f32,
    started: bool,
}

impl RodioVoice {
    fn new(stream_handle: OutputStreamHandle, file: &AssetFile) -> Result<Self, AudioError> {
        let sink = Self::load_sink(&stream_handle, &file.data, 1.0)?;
        Ok(Self {
            stream_handle,
            audio_data: Arc::clone(&file.data),
            sink,
            volume: 1.0,
            started: false,
        })
    }

    /// Build a paused sink with the whole sound queued
    fn load_sink(
        stream_handle: &OutputStreamHandle,
        audio_data: &Arc<Vec<u8>>,
        volume: f32,
    ) -> Result<Sink, AudioError> {
        // rodio's Decoder requires owned data with 'static lifetime
        let cursor = Cursor::new((**audio_data).clone());
        let decoder = Decoder::new(cursor).map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

        let sink =
            Sink::try_new(stream_handle).map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        sink.pause();
        sink.set_volume(volume);
        sink.append(decoder);
        Ok(sink)
    }
}

impl Playable for RodioVoice {
    fn play(&mut self) {
        self.started = true;
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.started = false;
    }

    fn rewind(&mut self) {
        self.sink.stop();
        self.started = false;
        // A stopped sink can't be rewound, queue a fresh copy instead
        match Self::load_sink(&self.stream_handle, &self.audio_data, self.volume) {
            Ok(sink) => self.sink = sink,
            Err(e) => tracing::warn!("Failed to rewind audio: {}", e),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn is_finished(&self) -> bool {
        self.started && self.sink.empty()
    }
}

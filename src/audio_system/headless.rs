/// Headless playback backend
///
/// Keeps every voice's state in memory instead of producing sound. Useful on
/// servers, in CI and in tests: a `HeadlessMonitor` can inspect voices and make
/// them reach their end.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::library::SoundAsset;
use super::player::{AudioBackend, Playable};
use crate::error::AudioError;

/// Observable state of one headless voice
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSnapshot {
    pub name: String,
    pub volume: f32,
    pub playing: bool,
    pub paused: bool,
    pub finished: bool,
    /// Times playback began from the start
    pub starts: u32,
    pub rewinds: u32,
    pub stops: u32,
}

type SharedVoice = Arc<Mutex<VoiceSnapshot>>;

#[derive(Default)]
struct Shared {
    voices: Vec<SharedVoice>,
    failing: HashSet<String>,
}

/// Backend that plays nothing
#[derive(Default)]
pub struct HeadlessBackend {
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting and driving voices after the backend is handed off
    pub fn monitor(&self) -> HeadlessMonitor {
        HeadlessMonitor {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl AudioBackend for HeadlessBackend {
    fn instantiate(&mut self, asset: &SoundAsset) -> Result<Box<dyn Playable>, AudioError> {
        let mut shared = self.shared.lock();
        if shared.failing.contains(asset.name()) {
            return Err(AudioError::NoPlayableSource(asset.name().to_string()));
        }

        let voice = Arc::new(Mutex::new(VoiceSnapshot {
            name: asset.name().to_string(),
            volume: 1.0,
            playing: false,
            paused: false,
            finished: false,
            starts: 0,
            rewinds: 0,
            stops: 0,
        }));
        shared.voices.push(Arc::clone(&voice));
        Ok(Box::new(HeadlessVoice { state: voice }))
    }
}

struct HeadlessVoice {
    state: SharedVoice,
}

impl Playable for HeadlessVoice {
    fn play(&mut self) {
        let mut state = self.state.lock();
        if !state.playing {
            state.starts += 1;
        }
        state.playing = true;
        state.paused = false;
        state.finished = false;
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        if state.playing {
            state.paused = true;
        }
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.paused = false;
        state.finished = false;
        state.stops += 1;
    }

    fn rewind(&mut self) {
        let mut state = self.state.lock();
        state.playing = false;
        state.paused = false;
        state.finished = false;
        state.rewinds += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn is_finished(&self) -> bool {
        self.state.lock().finished
    }
}

/// Inspection handle shared with a `HeadlessBackend`
#[derive(Clone)]
pub struct HeadlessMonitor {
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessMonitor {
    /// Every voice ever created for `name`, oldest first
    pub fn voices(&self, name: &str) -> Vec<VoiceSnapshot> {
        self.shared
            .lock()
            .voices
            .iter()
            .map(|v| v.lock().clone())
            .filter(|v| v.name == name)
            .collect()
    }

    /// Most recent voice created for `name`
    pub fn latest(&self, name: &str) -> Option<VoiceSnapshot> {
        self.voices(name).pop()
    }

    /// Voices currently playing (paused ones included)
    pub fn active(&self) -> Vec<VoiceSnapshot> {
        self.shared
            .lock()
            .voices
            .iter()
            .map(|v| v.lock().clone())
            .filter(|v| v.playing)
            .collect()
    }

    pub fn voice_count(&self) -> usize {
        self.shared.lock().voices.len()
    }

    /// Make the playing voices for `name` reach their end. Returns how many did.
    pub fn finish(&self, name: &str) -> usize {
        let shared = self.shared.lock();
        let mut finished = 0;
        for voice in &shared.voices {
            let mut state = voice.lock();
            if state.name == name && state.playing && !state.paused {
                state.playing = false;
                state.finished = true;
                finished += 1;
            }
        }
        finished
    }

    /// Make `instantiate` fail for `name` until cleared
    pub fn set_failing(&self, name: &str, failing: bool) {
        let mut shared = self.shared.lock();
        if failing {
            shared.failing.insert(name.to_string());
        } else {
            shared.failing.remove(name);
        }
    }
}

/// Sound board
///
/// The public face of the audio system. Composes the asset library, volume
/// controller, playback registry and theme slot, and dispatches playback
/// events to the listeners attached to live instances.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::instance::{InstanceId, PlaybackInstance, VolumeMode};
use super::library::{AssetLibrary, AssetLoader};
use super::listeners::{Listener, PlaybackEvent, SoundCallback};
use super::player::AudioBackend;
use super::registry::PlaybackRegistry;
use super::resolvable::{LocalVolume, Location, Resolvable, ThemeDefault};
use super::store::KeyValueStore;
use super::theme::{ThemeController, ThemeState};
use super::volume::VolumeController;
use crate::config::SoundConfig;
use crate::error::{LibraryBuildError, SoundError};

/// An event reported for a specific instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceEvent {
    pub instance: InstanceId,
    pub event: PlaybackEvent,
}

/// Playback state manager for sounds and the theme.
///
/// Single-threaded: call [`SoundBoard::update`] regularly (e.g. once per
/// frame) so instances that finished playing are noticed and their listeners
/// run. Other threads can report events through [`SoundBoard::event_sender`].
pub struct SoundBoard {
    library: AssetLibrary,
    backend: Box<dyn AudioBackend>,
    volume: VolumeController,
    local_volume: LocalVolume,
    registry: PlaybackRegistry,
    theme: ThemeController,
    events_tx: Sender<InstanceEvent>,
    events_rx: Receiver<InstanceEvent>,
}

impl SoundBoard {
    /// Create a board, restoring volume and mute state from `store`
    pub fn new(
        library: AssetLibrary,
        backend: Box<dyn AudioBackend>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            library,
            backend,
            volume: VolumeController::new(store),
            local_volume: LocalVolume::default(),
            registry: PlaybackRegistry::new(),
            theme: ThemeController::new(),
            events_tx,
            events_rx,
        }
    }

    /// Build the library described by `config` and a board around it
    pub fn from_config(
        config: &SoundConfig,
        loader: &dyn AssetLoader,
        backend: Box<dyn AudioBackend>,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, LibraryBuildError> {
        let library = AssetLibrary::build(config.library.clone(), loader)?;
        let mut board = Self::new(library, backend, store);

        if let Some(level) = config.local_volume {
            board.local_volume = Resolvable::Constant(level);
        }
        if let Some(theme) = &config.default_theme {
            board.theme.set_default_theme(Resolvable::Constant(theme.clone()));
        }
        Ok(board)
    }

    pub fn with_local_volume(mut self, local_volume: LocalVolume) -> Self {
        self.local_volume = local_volume;
        self
    }

    pub fn with_theme_default(mut self, theme_default: ThemeDefault) -> Self {
        self.theme.set_default_theme(theme_default);
        self
    }

    // ---- getters ----

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn file_types(&self) -> &[String] {
        self.library.file_types()
    }

    pub fn directory(&self) -> &Path {
        self.library.directory()
    }

    /// Every live instance, theme included, keyed by name
    pub fn sounds(&self) -> &HashMap<String, PlaybackInstance> {
        self.registry.instances()
    }

    pub fn sound(&self, name: &str) -> Option<&PlaybackInstance> {
        self.registry.get(name)
    }

    pub fn theme(&self) -> Option<&PlaybackInstance> {
        self.theme
            .current()
            .and_then(|state| self.registry.get(&state.name))
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme.current().map(|state| state.name.as_str())
    }

    pub fn theme_state(&self) -> Option<&ThemeState> {
        self.theme.current()
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn muted(&self) -> bool {
        self.volume.muted()
    }

    pub fn local_volume(&self) -> &LocalVolume {
        &self.local_volume
    }

    pub fn theme_default(&self) -> &ThemeDefault {
        self.theme.default_theme()
    }

    /// Listeners held by all live instances
    pub fn tracked_listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    // ---- volume ----

    /// Set the global volume (0.0-1.0) and push it to every live instance
    pub fn set_volume(&mut self, level: f32) -> Result<(), SoundError> {
        self.volume.set_level(level)?;
        if !self.volume.muted() {
            self.apply_volume();
        }
        tracing::debug!("Volume set to {}", level);
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.apply_volume();
        tracing::debug!("Muted: {}", muted);
    }

    /// Flip mute, returning the new state
    pub fn toggle_muted(&mut self) -> bool {
        let muted = self.volume.toggle_muted();
        self.apply_volume();
        tracing::debug!("Muted: {}", muted);
        muted
    }

    /// Replace the local-volume multiplier; local instances pick it up now
    pub fn set_local_volume(&mut self, local_volume: LocalVolume) {
        self.local_volume = local_volume;
        self.apply_volume();
    }

    pub fn set_theme_default(&mut self, theme_default: ThemeDefault) {
        self.theme.set_default_theme(theme_default);
    }

    fn apply_volume(&mut self) {
        for instance in self.registry.iter_mut() {
            let volume = self
                .volume
                .effective_volume(instance.mode(), &self.local_volume);
            instance.handle.set_volume(volume);
        }
    }

    // ---- playback ----

    /// Play `name` from the start, replacing any instance already playing
    /// under that name.
    pub fn play(&mut self, name: &str) -> Result<&mut PlaybackInstance, SoundError> {
        self.start(name, VolumeMode::Global, Listener::Retire)?;
        self.live_mut(name)
    }

    /// Like [`SoundBoard::play`], with the volume scaled by the local-volume
    /// multiplier for `location`.
    pub fn play_local(
        &mut self,
        name: &str,
        location: Option<Location>,
    ) -> Result<&mut PlaybackInstance, SoundError> {
        self.start(name, VolumeMode::Local(location), Listener::Retire)?;
        self.live_mut(name)
    }

    /// Make `name` the theme, replacing the current one. Without a name the
    /// theme default is used. Looping themes restart whenever they end.
    pub fn play_theme(
        &mut self,
        name: Option<&str>,
        looping: bool,
    ) -> Result<&mut PlaybackInstance, SoundError> {
        let name = self.theme.resolve_name(name);
        self.library.resolve(&name)?;

        self.clear_theme();

        let on_end = if looping {
            Listener::RestartTheme
        } else {
            Listener::Retire
        };
        let id = self.start(&name, VolumeMode::Global, on_end)?;
        self.theme.begin(name.clone(), id, looping);
        self.live_mut(&name)
    }

    /// Play `prefix` as an ordinary sound, then start the theme once it ends.
    ///
    /// Returns the prefix instance. Without a prefix the theme starts now and
    /// its instance is returned instead.
    pub fn play_theme_prefixed(
        &mut self,
        prefix: Option<&str>,
        name: Option<&str>,
        looping: bool,
    ) -> Result<&mut PlaybackInstance, SoundError> {
        let prefix = match prefix {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => return self.play_theme(name, looping),
        };

        let name = name.filter(|n| !n.is_empty()).map(str::to_string);
        if let Some(name) = &name {
            self.library.resolve(name)?;
        }

        self.start(prefix, VolumeMode::Global, Listener::Retire)?;
        let instance = self.live_mut(prefix)?;
        instance
            .listeners
            .add(PlaybackEvent::Ended, Listener::ChainTheme { name, looping });
        Ok(instance)
    }

    /// Resolve, instantiate and register a new instance
    fn start(
        &mut self,
        name: &str,
        mode: VolumeMode,
        on_end: Listener,
    ) -> Result<InstanceId, SoundError> {
        let asset = Arc::clone(self.library.resolve(name)?);
        let handle = self
            .backend
            .instantiate(&asset)
            .map_err(|source| SoundError::Playback {
                name: name.to_string(),
                source,
            })?;

        self.retire(name);

        let id = self.registry.allocate_id();
        let mut instance = PlaybackInstance::new(id, name.to_string(), mode, handle);
        let volume = self.volume.effective_volume(&mode, &self.local_volume);
        instance.handle.set_volume(volume);
        instance.handle.play();
        instance.listeners.add(PlaybackEvent::Ended, on_end);

        let (_, previous) = self.registry.insert(instance);
        if let Some(previous) = previous {
            previous.retire();
        }

        tracing::debug!("Playing {} {} at volume {}", name, id, volume);
        Ok(id)
    }

    fn live_mut(&mut self, name: &str) -> Result<&mut PlaybackInstance, SoundError> {
        self.registry
            .get_mut(name)
            .ok_or_else(|| SoundError::NoSuchInstance(name.to_string()))
    }

    /// Stop and discard the instance under `name`, detaching its listeners
    fn retire(&mut self, name: &str) -> bool {
        match self.registry.remove(name) {
            Some(instance) => {
                if self.theme.forget(instance.id()) {
                    tracing::debug!("Theme {} cleared", name);
                }
                instance.retire();
                true
            }
            None => false,
        }
    }

    pub fn pause_all(&mut self) {
        for id in self.registry.ids() {
            self.set_paused(id, true);
        }
    }

    pub fn resume_all(&mut self) {
        for id in self.registry.ids() {
            self.set_paused(id, false);
        }
    }

    pub fn pause_theme(&mut self) {
        if let Some(id) = self.theme.current().map(|state| state.instance) {
            self.set_paused(id, true);
        }
    }

    pub fn resume_theme(&mut self) {
        if let Some(id) = self.theme.current().map(|state| state.instance) {
            self.set_paused(id, false);
        }
    }

    fn set_paused(&mut self, id: InstanceId, paused: bool) {
        let Some(name) = self.registry.name_of(id).map(str::to_string) else {
            return;
        };
        let Some(instance) = self.registry.get_mut(&name) else {
            return;
        };
        if instance.is_paused() == paused {
            return;
        }

        if paused {
            instance.handle.pause();
            self.dispatch(id, PlaybackEvent::Pause);
        } else {
            instance.handle.play();
            self.dispatch(id, PlaybackEvent::Play);
        }
    }

    /// Stop and discard every instance, theme included
    pub fn clear_all(&mut self) {
        let instances = self.registry.drain();
        let count = instances.len();
        for instance in instances {
            instance.retire();
        }
        self.theme.take();
        tracing::debug!("Cleared {} sounds", count);
    }

    /// Stop and discard the theme, including its loop listener
    pub fn clear_theme(&mut self) {
        if let Some(state) = self.theme.take() {
            if self.registry.name_of(state.instance).is_some() {
                if let Some(instance) = self.registry.remove(&state.name) {
                    instance.retire();
                }
            }
            tracing::debug!("Theme {} cleared", state.name);
        }
    }

    // ---- listeners ----

    /// Attach `callback` to the live instance under `name`
    pub fn add_event_listener(
        &mut self,
        name: &str,
        event: PlaybackEvent,
        callback: impl Fn(&mut SoundBoard) + 'static,
    ) -> Result<(), SoundError> {
        let callback: SoundCallback = Rc::new(callback);
        self.live_mut(name)?
            .listeners
            .add(event, Listener::Callback(callback));
        Ok(())
    }

    /// Detach every callback attached through this board for `event`.
    ///
    /// Listeners the board installs itself are left alone. Returns how many
    /// callbacks were removed.
    pub fn remove_event_listeners(
        &mut self,
        name: &str,
        event: PlaybackEvent,
    ) -> Result<usize, SoundError> {
        Ok(self.live_mut(name)?.listeners.remove_callbacks(event))
    }

    /// Attach `callback`, or run it right away if nothing is playing under
    /// `name` (never started or already over).
    pub fn add_event_immediate(
        &mut self,
        name: &str,
        event: PlaybackEvent,
        callback: impl Fn(&mut SoundBoard) + 'static,
    ) {
        match self.registry.get_mut(name) {
            Some(instance) => instance
                .listeners
                .add(event, Listener::Callback(Rc::new(callback))),
            None => callback(self),
        }
    }

    // ---- events ----

    /// Sender for reporting instance events from other threads. They are
    /// processed on the next [`SoundBoard::update`].
    pub fn event_sender(&self) -> Sender<InstanceEvent> {
        self.events_tx.clone()
    }

    /// Process reported events and notice instances that finished playing.
    /// Returns how many events reached a live instance.
    pub fn update(&mut self) -> usize {
        let mut pending: Vec<InstanceEvent> = self.events_rx.try_iter().collect();
        pending.extend(
            self.registry
                .finished_ids()
                .into_iter()
                .map(|instance| InstanceEvent {
                    instance,
                    event: PlaybackEvent::Ended,
                }),
        );

        let mut seen = HashSet::new();
        let mut dispatched = 0;
        for event in pending {
            if seen.insert(event) && self.dispatch(event.instance, event.event) {
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Run the listeners `id` has for `event`.
    ///
    /// Events for instances that are no longer registered are ignored.
    /// Returns whether the event reached a live instance.
    pub fn dispatch(&mut self, id: InstanceId, event: PlaybackEvent) -> bool {
        let Some(name) = self.registry.name_of(id).map(str::to_string) else {
            tracing::trace!("Ignoring {} for stale instance {}", event, id);
            return false;
        };
        let listeners = match self.registry.get(&name) {
            Some(instance) => instance.listeners().snapshot(event),
            None => return false,
        };

        let mut restarted = false;
        let mut retired = false;
        if event == PlaybackEvent::Ended {
            if listeners.iter().any(|l| matches!(l, Listener::RestartTheme)) {
                if let Some(instance) = self.registry.get_mut(&name) {
                    instance.handle.restart();
                    restarted = true;
                    tracing::debug!("Theme {} looped", name);
                }
            } else if listeners.iter().any(|l| matches!(l, Listener::Retire)) {
                retired = self.retire(&name);
            }
        }

        for listener in listeners {
            // A callback may have discarded the instance; its listeners go with it
            if !retired && self.registry.name_of(id).is_none() {
                tracing::trace!("{} {} discarded during {}", name, id, event);
                return true;
            }
            match listener {
                Listener::Callback(callback) => callback(self),
                Listener::ChainTheme { name: theme, looping } => {
                    if let Err(e) = self.play_theme(theme.as_deref(), looping) {
                        tracing::warn!("Failed to start theme after {}: {}", name, e);
                    }
                }
                Listener::Retire | Listener::RestartTheme => {}
            }
        }

        if restarted {
            self.dispatch(id, PlaybackEvent::Play);
        }
        true
    }
}

pub mod headless;
pub mod instance;
pub mod library;
pub mod listeners;
pub mod manager;
pub mod player;
pub mod registry;
pub mod resolvable;
pub mod store;
pub mod theme;
/// Audio system module
///
/// Playback state management for a game's sound layer:
/// - Named sounds, at most one live instance per name
/// - A single theme (background music) with looping and prefix intros
/// - Global volume and mute, persisted across sessions
/// - Listener bookkeeping per playing instance
///
/// ## Architecture
///
/// ```text
/// SoundBoard
///   ├── AssetLibrary        (preloaded, read-only)
///   ├── VolumeController ── KeyValueStore
///   ├── PlaybackRegistry
///   │     └── PlaybackInstance ─┬─ Box<dyn Playable>
///   │                           └─ ListenerTable
///   ├── ThemeController     (refers to one registry instance)
///   └── Box<dyn AudioBackend>   (RodioBackend / HeadlessBackend)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use soundstage::audio_system::{SoundBoard, PlaybackEvent, FsLoader, RodioBackend, JsonFileStore};
///
/// let mut board = SoundBoard::from_config(&config, &FsLoader, Box::new(RodioBackend::new()?), Box::new(store))?;
///
/// board.play_theme_prefixed(Some("intro"), Some("town"), true)?;
/// board.play("coin")?;
/// board.add_event_listener("coin", PlaybackEvent::Ended, |board| {
///     let _ = board.play("fanfare");
/// })?;
///
/// // Once per frame
/// board.update();
/// ```
pub mod volume;

// Re-export commonly used types
pub use headless::{HeadlessBackend, HeadlessMonitor, VoiceSnapshot};
pub use instance::{InstanceId, PlaybackInstance, VolumeMode};
pub use library::{AssetFile, AssetLibrary, AssetLoader, FsLoader, SoundAsset};
pub use listeners::{PlaybackEvent, SoundCallback};
pub use manager::{InstanceEvent, SoundBoard};
pub use player::{AudioBackend, Playable, RodioBackend};
pub use resolvable::{LocalVolume, Location, Resolvable, ThemeDefault};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use theme::ThemeState;
pub use volume::VolumeState;

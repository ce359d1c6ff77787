/// Listener bookkeeping for playing instances
///
/// Each instance owns a `ListenerTable`. The table is dropped together with
/// the instance, so no callback can outlive the sound it was attached to.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use super::manager::SoundBoard;

/// Callback invoked with the board when an event fires
pub type SoundCallback = Rc<dyn Fn(&mut SoundBoard)>;

/// Events an instance can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackEvent {
    /// Playback started again after a pause or loop restart
    Play,
    Pause,
    /// Playback reached the end naturally
    Ended,
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackEvent::Play => write!(f, "play"),
            PlaybackEvent::Pause => write!(f, "pause"),
            PlaybackEvent::Ended => write!(f, "ended"),
        }
    }
}

impl FromStr for PlaybackEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(PlaybackEvent::Play),
            "pause" => Ok(PlaybackEvent::Pause),
            "ended" => Ok(PlaybackEvent::Ended),
            other => Err(format!("Unknown playback event: {}", other)),
        }
    }
}

/// Something attached to an instance event.
///
/// Only `Callback` entries are caller-attached; the rest belong to the board
/// and survive `remove_event_listeners`.
#[derive(Clone)]
pub enum Listener {
    Callback(SoundCallback),
    /// Remove the instance from the registry
    Retire,
    /// Restart the theme from the beginning
    RestartTheme,
    /// Start a theme once this (prefix) sound is done
    ChainTheme { name: Option<String>, looping: bool },
}

impl Listener {
    pub fn is_callback(&self) -> bool {
        matches!(self, Listener::Callback(_))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Callback(_) => f.write_str("Callback(..)"),
            Listener::Retire => f.write_str("Retire"),
            Listener::RestartTheme => f.write_str("RestartTheme"),
            Listener::ChainTheme { name, looping } => f
                .debug_struct("ChainTheme")
                .field("name", name)
                .field("looping", looping)
                .finish(),
        }
    }
}

/// Event → listeners, in attach order
#[derive(Debug, Default)]
pub struct ListenerTable {
    events: HashMap<PlaybackEvent, Vec<Listener>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: PlaybackEvent, listener: Listener) {
        self.events.entry(event).or_default().push(listener);
    }

    /// Detach caller-attached callbacks for `event`, returning how many went
    pub fn remove_callbacks(&mut self, event: PlaybackEvent) -> usize {
        let Some(listeners) = self.events.get_mut(&event) else {
            return 0;
        };
        let before = listeners.len();
        listeners.retain(|l| !l.is_callback());
        let removed = before - listeners.len();
        if listeners.is_empty() {
            self.events.remove(&event);
        }
        removed
    }

    /// Copy of the listeners for `event`, safe to run while the table changes
    pub fn snapshot(&self, event: PlaybackEvent) -> Vec<Listener> {
        self.events.get(&event).cloned().unwrap_or_default()
    }

    pub fn callback_count(&self, event: PlaybackEvent) -> usize {
        self.events
            .get(&event)
            .map(|listeners| listeners.iter().filter(|l| l.is_callback()).count())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detach everything
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

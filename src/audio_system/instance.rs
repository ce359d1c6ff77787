/// Playing sound instances

use std::fmt;

use super::listeners::ListenerTable;
use super::player::Playable;
use super::resolvable::Location;

/// Unique for the lifetime of a board; used to spot stale events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an instance's volume is derived from the global level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VolumeMode {
    #[default]
    Global,
    /// Scaled by the local-volume multiplier for this location
    Local(Option<Location>),
}

impl VolumeMode {
    pub fn is_local(&self) -> bool {
        matches!(self, VolumeMode::Local(_))
    }
}

pub struct PlaybackInstance {
    id: InstanceId,
    name: String,
    mode: VolumeMode,
    pub(crate) handle: Box<dyn Playable>,
    pub(crate) listeners: ListenerTable,
}

impl PlaybackInstance {
    pub(crate) fn new(
        id: InstanceId,
        name: String,
        mode: VolumeMode,
        handle: Box<dyn Playable>,
    ) -> Self {
        Self {
            id,
            name,
            mode,
            handle,
            listeners: ListenerTable::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> &VolumeMode {
        &self.mode
    }

    pub fn is_local(&self) -> bool {
        self.mode.is_local()
    }

    /// Listeners attached to this instance
    pub fn listeners(&self) -> &ListenerTable {
        &self.listeners
    }

    /// Volume currently applied to the playback handle
    pub fn volume(&self) -> f32 {
        self.handle.volume()
    }

    pub fn is_paused(&self) -> bool {
        self.handle.is_paused()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop playback and detach every listener
    pub(crate) fn retire(mut self) {
        self.listeners.clear();
        self.handle.stop();
        tracing::debug!("Retired {} {}", self.name, self.id);
    }
}

impl fmt::Debug for PlaybackInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("volume", &self.handle.volume())
            .field("listeners", &self.listeners)
            .finish()
    }
}

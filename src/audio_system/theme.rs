/// Theme (background music) slot
///
/// Tracks the single theme instance. The instance itself lives in the
/// playback registry; the theme only remembers which one it is.

use super::instance::InstanceId;
use super::resolvable::{Resolvable, ThemeDefault};

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeState {
    pub name: String,
    pub instance: InstanceId,
    /// Restart when playback ends
    pub looping: bool,
}

#[derive(Debug)]
pub struct ThemeController {
    state: Option<ThemeState>,
    last_name: Option<String>,
    default: ThemeDefault,
}

impl ThemeController {
    pub fn new() -> Self {
        Self {
            state: None,
            last_name: None,
            default: Resolvable::Constant(String::new()),
        }
    }

    /// Name to play: `requested` unless omitted or empty, else the default
    pub fn resolve_name(&self, requested: Option<&str>) -> String {
        match requested {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.default.resolve(&self.last_name),
        }
    }

    pub fn begin(&mut self, name: String, instance: InstanceId, looping: bool) {
        tracing::info!("Theme {} started {} (looping: {})", name, instance, looping);
        self.last_name = Some(name.clone());
        self.state = Some(ThemeState {
            name,
            instance,
            looping,
        });
    }

    pub fn current(&self) -> Option<&ThemeState> {
        self.state.as_ref()
    }

    /// Empty the slot, returning what was in it
    pub fn take(&mut self) -> Option<ThemeState> {
        self.state.take()
    }

    /// Empty the slot if it holds `instance`
    pub fn forget(&mut self, instance: InstanceId) -> bool {
        if self.state.as_ref().is_some_and(|s| s.instance == instance) {
            self.state = None;
            true
        } else {
            false
        }
    }

    pub fn default_theme(&self) -> &ThemeDefault {
        &self.default
    }

    pub fn set_default_theme(&mut self, default: ThemeDefault) {
        self.default = default;
    }
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new()
    }
}

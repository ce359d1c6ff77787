/// Global volume and mute control
///
/// Owns the single volume level and mute flag, writing both through to a
/// persistent store on every change.

use serde_json::Value;

use super::instance::VolumeMode;
use super::resolvable::LocalVolume;
use super::store::KeyValueStore;
use crate::error::SoundError;

pub const VOLUME_KEY: &str = "volume";
pub const MUTED_KEY: &str = "muted";

/// Current volume settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeState {
    /// Volume level (0.0-1.0)
    pub level: f32,
    pub muted: bool,
}

impl Default for VolumeState {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

pub struct VolumeController {
    state: VolumeState,
    store: Box<dyn KeyValueStore>,
}

impl VolumeController {
    /// Create a controller, restoring the persisted settings from `store`.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let mut state = VolumeState::default();

        match store.get(VOLUME_KEY) {
            Some(value) => match value.as_f64().map(|v| v as f32) {
                Some(level) if (0.0..=1.0).contains(&level) => state.level = level,
                _ => tracing::warn!("Ignoring invalid persisted volume: {}", value),
            },
            None => {}
        }

        match store.get(MUTED_KEY) {
            Some(Value::Bool(muted)) => state.muted = muted,
            Some(value) => tracing::warn!("Ignoring invalid persisted mute flag: {}", value),
            None => {}
        }

        tracing::debug!("Volume restored: level={}, muted={}", state.level, state.muted);
        Self { state, store }
    }

    pub fn level(&self) -> f32 {
        self.state.level
    }

    pub fn muted(&self) -> bool {
        self.state.muted
    }

    /// Set the volume level. Values outside 0.0-1.0 are rejected untouched.
    pub fn set_level(&mut self, level: f32) -> Result<(), SoundError> {
        if !(0.0..=1.0).contains(&level) {
            return Err(SoundError::InvalidVolume(level));
        }
        self.state.level = level;
        self.persist(VOLUME_KEY, Value::from(f64::from(level)));
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
        self.persist(MUTED_KEY, Value::Bool(muted));
    }

    /// Flip the mute flag, returning the new value
    pub fn toggle_muted(&mut self) -> bool {
        let muted = !self.state.muted;
        self.set_muted(muted);
        muted
    }

    /// Volume to apply to an instance playing in `mode`
    pub fn effective_volume(&self, mode: &VolumeMode, local: &LocalVolume) -> f32 {
        if self.state.muted {
            return 0.0;
        }
        match mode {
            VolumeMode::Global => self.state.level,
            VolumeMode::Local(location) => {
                let multiplier = local.resolve(location);
                if multiplier.is_nan() {
                    0.0
                } else {
                    (self.state.level * multiplier).clamp(0.0, 1.0)
                }
            }
        }
    }

    fn persist(&mut self, key: &str, value: Value) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::resolvable::{Location, Resolvable};
    use crate::audio_system::store::MemoryStore;
    use crate::error::StoreError;
    use serde_json::json;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<Value> {
            None
        }

        fn set(&mut self, key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::SaveFailed {
                path: key.to_string(),
                source: "read-only".into(),
            })
        }
    }

    #[test]
    fn test_defaults_without_persisted_values() {
        let controller = VolumeController::new(Box::new(MemoryStore::new()));
        assert_eq!(controller.level(), 1.0);
        assert!(!controller.muted());
    }

    #[test]
    fn test_restores_persisted_values() {
        let mut store = MemoryStore::new();
        store.set(VOLUME_KEY, json!(0.5)).unwrap();
        store.set(MUTED_KEY, json!(true)).unwrap();

        let controller = VolumeController::new(Box::new(store));
        assert_eq!(controller.level(), 0.5);
        assert!(controller.muted());
    }

    #[test]
    fn test_ignores_invalid_persisted_values() {
        let mut store = MemoryStore::new();
        store.set(VOLUME_KEY, json!(3.0)).unwrap();
        store.set(MUTED_KEY, json!("yes")).unwrap();

        let controller = VolumeController::new(Box::new(store));
        assert_eq!(controller.level(), VolumeState::default().level);
        assert!(!controller.muted());
    }

    #[test]
    fn test_set_level_validation() {
        let mut controller = VolumeController::new(Box::new(MemoryStore::new()));
        controller.set_level(0.3).unwrap();

        for bad in [-0.1, 1.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                controller.set_level(bad),
                Err(SoundError::InvalidVolume(_))
            ));
            assert_eq!(controller.level(), 0.3);
        }
    }

    #[test]
    fn test_toggle_keeps_level() {
        let mut controller = VolumeController::new(Box::new(MemoryStore::new()));
        controller.set_level(0.6).unwrap();

        assert!(controller.toggle_muted());
        assert!(!controller.toggle_muted());
        assert!(controller.toggle_muted());
        assert_eq!(controller.level(), 0.6);
    }

    #[test]
    fn test_effective_volume() {
        let mut controller = VolumeController::new(Box::new(MemoryStore::new()));
        controller.set_level(0.8).unwrap();
        let local: LocalVolume = Resolvable::Constant(0.5);
        let at = VolumeMode::Local(Some(Location::new(1.0, 1.0)));

        assert_eq!(controller.effective_volume(&VolumeMode::Global, &local), 0.8);
        assert!((controller.effective_volume(&at, &local) - 0.4).abs() < 1e-6);

        controller.set_muted(true);
        assert_eq!(controller.effective_volume(&VolumeMode::Global, &local), 0.0);
        assert_eq!(controller.effective_volume(&at, &local), 0.0);
    }

    #[test]
    fn test_effective_volume_clamps_local_multiplier() {
        let controller = VolumeController::new(Box::new(MemoryStore::new()));
        let loud: LocalVolume = Resolvable::Constant(4.0);
        let broken: LocalVolume = Resolvable::Constant(f32::NAN);

        assert_eq!(controller.effective_volume(&VolumeMode::Local(None), &loud), 1.0);
        assert_eq!(controller.effective_volume(&VolumeMode::Local(None), &broken), 0.0);
    }

    #[test]
    fn test_store_failure_does_not_fail_mutation() {
        let mut controller = VolumeController::new(Box::new(FailingStore));
        controller.set_level(0.2).unwrap();
        controller.set_muted(true);

        assert_eq!(controller.level(), 0.2);
        assert!(controller.muted());
    }
}

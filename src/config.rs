use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Where the asset library comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root directory all library paths are relative to
    pub directory: PathBuf,

    /// Allowed file extensions, in order of preference (e.g. `["ogg", "mp3"]`)
    pub file_types: Vec<String>,

    /// Sub-directory → logical sound names expected under it
    pub library: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(flatten)]
    pub library: LibraryConfig,

    /// Theme played when `play_theme` is called without a name
    #[serde(default)]
    pub default_theme: Option<String>,

    /// Constant multiplier applied to local sounds
    #[serde(default)]
    pub local_volume: Option<f32>,

    /// Override for the persisted volume/mute settings file
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
}

impl SoundConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        let mut config: SoundConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        // A relative library directory is relative to the config file
        if config.library.directory.is_relative() {
            if let Some(parent) = path.parent() {
                config.library.directory = parent.join(&config.library.directory);
            }
        }

        config.validate()?;
        tracing::info!("Loaded sound config from: {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.file_types.is_empty() {
            return Err(ConfigError::Invalid("file_types must not be empty".to_string()));
        }
        if let Some(level) = self.local_volume {
            if !(0.0..=1.0).contains(&level) {
                return Err(ConfigError::Invalid(format!(
                    "local_volume {} is outside 0.0..=1.0",
                    level
                )));
            }
        }
        if let Some(theme) = &self.default_theme {
            let listed = self.library.library.values().any(|names| names.contains(theme));
            if !listed {
                return Err(ConfigError::Invalid(format!(
                    "default_theme {} is not in the library",
                    theme
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "directory": "assets/sounds",
        "file_types": ["ogg", "mp3"],
        "library": {
            "music": ["title", "battle"],
            "sfx": ["jump", "coin"]
        },
        "default_theme": "title"
    }"#;

    #[test]
    fn test_config_deserialization() {
        let config: SoundConfig = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(config.library.directory, PathBuf::from("assets/sounds"));
        assert_eq!(config.library.file_types, vec!["ogg", "mp3"]);
        assert_eq!(config.library.library["sfx"], vec!["jump", "coin"]);
        assert_eq!(config.default_theme.as_deref(), Some("title"));
        assert_eq!(config.local_volume, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_default_theme() {
        let mut config: SoundConfig = serde_json::from_str(SAMPLE).unwrap();
        config.default_theme = Some("credits".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_local_volume() {
        let mut config: SoundConfig = serde_json::from_str(SAMPLE).unwrap();
        config.local_volume = Some(1.5);
        assert!(config.validate().is_err());

        config.local_volume = Some(0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_resolves_relative_directory() {
        let dir = std::env::temp_dir().join(format!("soundstage-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sounds.json");
        fs::write(&path, SAMPLE).unwrap();

        let config = SoundConfig::load(&path).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(config.library.directory, dir.join("assets/sounds"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SoundConfig::load(Path::new("/nonexistent/soundstage.json"));
        assert!(matches!(result, Err(ConfigError::LoadFailed { .. })));
    }
}

// Planckrs Settings Module
// User settings for the simulator: audio, storage location, keymap file

use std::path::{Path, PathBuf};

/// Queue depth used when the settings file does not give one
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

/// Settings loaded from `~/.config/planckrs/settings.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Play songs through the tone player
    pub audio_enabled: bool,

    /// Songs the tone queue holds before dropping new ones
    pub queue_depth: usize,

    /// File emulating the EEPROM default layer slot
    pub storage_path: Option<PathBuf>,

    /// Keymap file; the built-in Planck keymap when absent
    pub keymap_path: Option<PathBuf>,

    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    audio: Option<AudioSettings>,

    #[serde(default)]
    storage: Option<StorageSettings>,

    #[serde(default)]
    keymap: Option<KeymapSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AudioSettings {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    queue_depth: Option<i64>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct StorageSettings {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct KeymapSettings {
    #[serde(default)]
    path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self {
            audio_enabled: true,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            storage_path: None,
            keymap_path: None,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let raw: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(audio) = raw.audio {
            if let Some(enabled) = audio.enabled {
                settings.audio_enabled = enabled;
            }
            if let Some(depth) = audio.queue_depth {
                if depth < 1 {
                    return Err(SettingsError::InvalidValue(format!(
                        "audio.queue_depth must be at least 1, got {}",
                        depth
                    )));
                }
                settings.queue_depth = depth as usize;
            }
        }

        if let Some(storage) = raw.storage {
            settings.storage_path = storage.path;
        }

        if let Some(keymap) = raw.keymap {
            settings.keymap_path = keymap.path;
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("planckrs").join("settings.toml"))
    }

    /// Load from default location (~/.config/planckrs/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::new())
    }

    /// File these settings were read from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_are_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::new());
        assert!(settings.audio_enabled);
        assert_eq!(settings.queue_depth, DEFAULT_QUEUE_DEPTH);
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::from_toml(
            r#"
[audio]
enabled = false
queue_depth = 2

[storage]
path = "/tmp/planck-eeprom"

[keymap]
path = "keymaps/planck.toml"
"#,
        )
        .unwrap();
        assert!(!settings.audio_enabled);
        assert_eq!(settings.queue_depth, 2);
        assert_eq!(settings.storage_path, Some(PathBuf::from("/tmp/planck-eeprom")));
        assert_eq!(settings.keymap_path, Some(PathBuf::from("keymaps/planck.toml")));
    }

    #[test]
    fn test_invalid_queue_depth() {
        let result = Settings::from_toml("[audio]\nqueue_depth = 0\n");
        assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = Settings::from_toml("[rgb]\nenabled = true\n");
        assert!(matches!(result, Err(SettingsError::TomlParse(_))));
    }

    #[test]
    fn test_from_file_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[audio]\nenabled = false\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert!(!settings.audio_enabled);
        assert_eq!(settings.source_path(), Some(path.as_path()));
    }
}

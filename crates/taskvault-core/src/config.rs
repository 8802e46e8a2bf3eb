use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not resolve a home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct General {
    pub vault_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(default = "default_pomodoro_duration")]
    pub pomodoro_duration: u32,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            pomodoro_duration: default_pomodoro_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            long_break_interval: default_long_break_interval(),
        }
    }
}

fn default_pomodoro_duration() -> u32 {
    25
}

fn default_short_break_duration() -> u32 {
    5
}

fn default_long_break_duration() -> u32 {
    15
}

fn default_long_break_interval() -> u32 {
    4
}

/// Optional WAV files played by the CLI on the matching events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, rename = "break", skip_serializing_if = "Option::is_none")]
    pub break_sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<String>,
}

/// Resolved settings value object. Constructed once at startup and passed
/// into every store/lifecycle call; there is no ambient global config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub general: General,
    #[serde(default)]
    pub pomodoro: PomodoroSettings,
    #[serde(default)]
    pub sounds: Sounds,
}

impl Settings {
    pub fn with_vault(vault_path: impl Into<String>) -> Self {
        Self {
            general: General {
                vault_path: vault_path.into(),
            },
            pomodoro: PomodoroSettings::default(),
            sounds: Sounds::default(),
        }
    }

    /// Loads the settings file, creating one with defaults on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if let Some(settings) = load(&path)? {
            return Ok(settings);
        }
        let home = resolve_user_home_dir().ok_or(ConfigError::NoHomeDir)?;
        let settings = Settings::with_vault(default_vault_path(&home).display().to_string());
        save(&path, &settings)?;
        Ok(settings)
    }
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        let trimmed = profile.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    None
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(value) = std::env::var("TASKVAULT_CONFIG_DIR") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    let home = resolve_user_home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".config").join("taskvault"))
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn default_vault_path(home: &Path) -> PathBuf {
    home.join("Documents").join("Obsidian")
}

/// Reads settings from `path`; Ok(None) when no file exists yet.
pub fn load(path: &Path) -> Result<Option<Settings>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let settings = toml::from_str::<Settings>(&text)?;
    Ok(Some(settings))
}

pub fn save(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(settings)?;
    fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_is_none() {
        let temp = TempDir::new().expect("tempdir");
        let loaded = load(&temp.path().join("config.toml")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        let mut settings = Settings::with_vault("/tmp/vault");
        settings.pomodoro.pomodoro_duration = 30;
        settings.sounds.done = Some("/tmp/done.wav".to_string());
        save(&path, &settings).expect("save");

        let loaded = load(&path).expect("load").expect("some");
        assert_eq!(loaded.general.vault_path, "/tmp/vault");
        assert_eq!(loaded.pomodoro.pomodoro_duration, 30);
        assert_eq!(loaded.pomodoro.short_break_duration, 5);
        assert_eq!(loaded.sounds.done.as_deref(), Some("/tmp/done.wav"));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[general]\nvault_path = \"/tmp/vault\"\n").expect("write");

        let loaded = load(&path).expect("load").expect("some");
        assert_eq!(loaded.pomodoro.pomodoro_duration, 25);
        assert_eq!(loaded.pomodoro.short_break_duration, 5);
        assert_eq!(loaded.pomodoro.long_break_duration, 15);
        assert_eq!(loaded.pomodoro.long_break_interval, 4);
        assert!(loaded.sounds.start.is_none());
    }

    #[test]
    fn break_sound_uses_break_key() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[general]\nvault_path = \"/tmp/vault\"\n\n[sounds]\nbreak = \"/tmp/break.wav\"\n",
        )
        .expect("write");

        let loaded = load(&path).expect("load").expect("some");
        assert_eq!(loaded.sounds.break_sound.as_deref(), Some("/tmp/break.wav"));
    }
}

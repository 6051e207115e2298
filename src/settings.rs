//! Game settings
//!
//! Loaded from defaults, then an optional JSON file, then environment overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::FRAME_RATE;
use crate::error::{ModeError, SettingsError};
use crate::sim::GameMode;

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "BOUNCE_FILL_CONFIG";
/// Environment override for `start`
pub const START_ENV: &str = "BOUNCE_FILL_START";
/// Environment override for `seed`
pub const SEED_ENV: &str = "BOUNCE_FILL_SEED";

/// What the session does before the first episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Show the mode menu
    Menu,
    /// Pick a mode at random and start playing
    Random,
    /// Start playing the given mode
    Mode(GameMode),
}

impl FromStr for StartMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "menu" => Ok(StartMode::Menu),
            "random" => Ok(StartMode::Random),
            _ => s.parse().map(StartMode::Mode),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `"menu"`, `"random"` or a mode name
    pub start: String,
    /// RNG seed (random when absent)
    pub seed: Option<u64>,
    /// Target frames per second; 0 runs unpaced
    pub frame_rate: u32,
    /// File written while recording is on
    pub recording_path: PathBuf,
    /// Frames the recorder may queue before dropping
    pub recording_buffer: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start: "menu".to_string(),
            seed: None,
            frame_rate: FRAME_RATE,
            recording_path: PathBuf::from("gameplay.jsonl"),
            recording_buffer: 120,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.start_mode()?;
        Ok(settings)
    }

    /// Read a JSON settings file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings for the binary: explicit path, else `BOUNCE_FILL_CONFIG`,
    /// else defaults; then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut settings = match path.or(env_path.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply `BOUNCE_FILL_START` / `BOUNCE_FILL_SEED` style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(start) = lookup(START_ENV) {
            start.parse::<StartMode>()?;
            self.start = start;
        }
        if let Some(seed) = lookup(SEED_ENV) {
            self.seed = Some(seed.trim().parse().map_err(|_| SettingsError::Env {
                key: SEED_ENV,
                value: seed.clone(),
            })?);
        }
        Ok(())
    }

    /// Resolve `start` into a start mode
    pub fn start_mode(&self) -> Result<StartMode, ModeError> {
        self.start.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.start_mode(), Ok(StartMode::Menu));
        assert_eq!(settings.frame_rate, 60);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{ "start": "gravity", "seed": 9 }"#).unwrap();
        assert_eq!(settings.start_mode(), Ok(StartMode::Mode(GameMode::Gravity)));
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.recording_buffer, 120);
    }

    #[test]
    fn test_random_start() {
        let settings = Settings::from_json(r#"{ "start": "Random" }"#).unwrap();
        assert_eq!(settings.start_mode(), Ok(StartMode::Random));
    }

    #[test]
    fn test_unknown_start_mode_fails_fast() {
        let err = Settings::from_json(r#"{ "start": "pinball" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Mode(ModeError::Unknown(ref name)) if name == "pinball"));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Settings::from_json("{ start: }"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(|key| match key {
                START_ENV => Some("pulse".to_string()),
                SEED_ENV => Some("77".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(settings.start_mode(), Ok(StartMode::Mode(GameMode::Pulse)));
        assert_eq!(settings.seed, Some(77));
    }

    #[test]
    fn test_bad_seed_override() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(|key| (key == SEED_ENV).then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Env { key: SEED_ENV, .. }));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("bounce-fill-no-such-settings.json");
        assert!(matches!(
            Settings::from_file(&path),
            Err(SettingsError::Io(_))
        ));
    }
}

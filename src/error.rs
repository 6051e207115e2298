//! Error types for mode selection and configuration

use std::fmt;

/// Rejected mode selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    /// Name does not match any game mode
    Unknown(String),
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeError::Unknown(name) => write!(f, "unknown game mode `{name}`"),
        }
    }
}

impl std::error::Error for ModeError {}

/// Failure while loading settings
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Mode(ModeError),
    /// An environment override held a value of the wrong shape
    Env { key: &'static str, value: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "failed to read settings: {e}"),
            SettingsError::Parse(e) => write!(f, "invalid settings file: {e}"),
            SettingsError::Mode(e) => write!(f, "invalid start mode: {e}"),
            SettingsError::Env { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Mode(e) => Some(e),
            SettingsError::Env { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<ModeError> for SettingsError {
    fn from(e: ModeError) -> Self {
        SettingsError::Mode(e)
    }
}

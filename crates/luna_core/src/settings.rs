//! User-facing cycle settings.
//!
//! # Responsibility
//! - Hold the configured average cycle length fed to phase calculation.
//! - Load the settings blob tolerantly, falling back to defaults.
//!
//! # Invariants
//! - `cycle_length` always lies in `CYCLE_LENGTH_MIN..=CYCLE_LENGTH_MAX`.
//! - Loading never fails on bad content; only I/O errors surface.

use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const CYCLE_LENGTH_MIN: u32 = 21;
pub const CYCLE_LENGTH_MAX: u32 = 35;

#[derive(Debug)]
pub enum SettingsError {
    CycleLengthOutOfRange(u32),
    Io(std::io::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleLengthOutOfRange(value) => write!(
                f,
                "cycle length {value} is outside {CYCLE_LENGTH_MIN}..={CYCLE_LENGTH_MAX}"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::CycleLengthOutOfRange(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Validated cycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSettings {
    cycle_length: u32,
}

// Stored blobs may carry unrelated keys (theme, reminders); they are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    #[serde(default)]
    cycle_length: Option<u32>,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
        }
    }
}

impl CycleSettings {
    pub fn new(cycle_length: u32) -> Result<Self, SettingsError> {
        if !(CYCLE_LENGTH_MIN..=CYCLE_LENGTH_MAX).contains(&cycle_length) {
            return Err(SettingsError::CycleLengthOutOfRange(cycle_length));
        }
        Ok(Self { cycle_length })
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Parses a stored settings blob.
    ///
    /// Malformed JSON or an out-of-range length yields defaults.
    pub fn from_json_str(raw: &str) -> Self {
        let stored = match serde_json::from_str::<StoredSettings>(raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("event=settings_load module=settings status=fallback reason=parse error={err}");
                return Self::default();
            }
        };

        match stored.cycle_length {
            None => Self::default(),
            Some(value) => Self::new(value).unwrap_or_else(|err| {
                warn!("event=settings_load module=settings status=fallback reason=range error={err}");
                Self::default()
            }),
        }
    }

    /// Loads settings from a JSON file; a missing file means defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self::from_json_str(&raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

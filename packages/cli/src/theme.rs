//! Light/dark theme, remembered in the state file between runs

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid state file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Headings and highlighted names
    pub fn accent(self, text: &str) -> ColoredString {
        match self {
            Theme::Light => text.blue().bold(),
            Theme::Dark => text.bright_cyan().bold(),
        }
    }

    /// Secondary detail such as ids and locations
    pub fn muted(self, text: &str) -> ColoredString {
        match self {
            Theme::Light => text.bright_black(),
            Theme::Dark => text.white().dimmed(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

/// Contents of the state file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    #[serde(default)]
    pub theme: Theme,
}

impl UiState {
    /// Missing file means first run
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ThemeError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ThemeError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ThemeError> {
        let write_err = |source| ThemeError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        // Serializing a two-variant enum cannot fail
        let content = serde_json::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, content).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_state_defaults_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let state = UiState::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn test_theme_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let state = UiState {
            theme: Theme::Light.toggled(),
        };
        state.save(&path).unwrap();

        let reloaded = UiState::load(&path).unwrap();
        assert_eq!(reloaded.theme, Theme::Dark);
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"dark\""));
    }

    #[test]
    fn test_corrupt_state_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = UiState::load(&path).unwrap_err();
        assert!(matches!(err, ThemeError::Parse { .. }));
    }
}

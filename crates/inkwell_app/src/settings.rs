use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use editor_logging::{editor_info, editor_warn};
use inkwell_core::EditorSettings;
use inkwell_engine::TransportSettings;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_SETTINGS_FILE: &str = "inkwell.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub editor: EditorSettings,
    pub transport: TransportSettings,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SettingsError {
    #[error("settings file {path:?} not found")]
    Missing { path: PathBuf },
    #[error("failed to read settings from {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Loads settings from `explicit`, or from `./inkwell.ron` when no path is
/// given. Only the implicit file may be absent.
pub(crate) fn load_settings(explicit: Option<&Path>) -> Result<AppSettings, SettingsError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if explicit.is_some() {
                return Err(SettingsError::Missing { path });
            }
            editor_info!("No settings file at {:?}; using defaults", path);
            return Ok(AppSettings::default());
        }
        Err(source) => return Err(SettingsError::Read { path, source }),
    };

    let settings: AppSettings =
        ron::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
    if settings.transport.endpoint.trim().is_empty() {
        editor_warn!("Settings {:?} leave the upload endpoint empty", path);
    }
    editor_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

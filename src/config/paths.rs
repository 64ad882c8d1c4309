//! Where settings and Whisper models live on disk.
//!
//! By default `settings.toml` sits in the platform config directory
//! (`~/.config/garden-voice/` on Linux) and models in the local data
//! directory (`~/.local/share/garden-voice/models/`). Setting
//! `GARDEN_VOICE_HOME` puts both under one directory instead, which is how
//! the Raspberry Pi image ships.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "garden-voice";
const HOME_VAR: &str = "GARDEN_VOICE_HOME";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub settings_file: PathBuf,
    /// Directory searched for `ggml-*.bin` files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    /// Resolve from `GARDEN_VOICE_HOME`, else the platform directories,
    /// else the working directory.
    pub fn new() -> Self {
        if let Some(home) = std::env::var_os(HOME_VAR).filter(|v| !v.is_empty()) {
            return Self::under(home);
        }

        let platform =
            |dir: Option<PathBuf>| dir.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR);
        Self {
            settings_file: platform(dirs::config_dir()).join("settings.toml"),
            models_dir: platform(dirs::data_local_dir()).join("models"),
        }
    }

    /// Everything below a single `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            settings_file: root.join("settings.toml"),
            models_dir: root.join("models"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

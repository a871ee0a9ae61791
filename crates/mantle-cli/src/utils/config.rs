//! The CLI's own settings, stored as `config.toml` next to the executable.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::io;
use std::{env, fs};

/// Settings that persist between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Profile directory used when a command is run without `--profile`.
    pub profile_dir: Option<Utf8PathBuf>,
}

/// Where `config.toml` lives: next to the running executable.
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let dir = Utf8PathBuf::from_path_buf(exe.parent()?.to_path_buf()).ok()?;
    Some(dir.join("config.toml"))
}

/// Reads the stored settings. A missing or unparsable file yields the
/// defaults; a broken config never blocks a command.
pub fn load_config() -> AppConfig {
    let Some(path) = default_config_path() else {
        return AppConfig::default();
    };
    fs::read_to_string(&path)
        .ok()
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

/// Writes the settings back to `config.toml`.
pub fn save_config(cfg: &AppConfig) -> io::Result<()> {
    let path = default_config_path().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not locate the executable")
    })?;
    let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
    fs::write(&path, content)
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path, must exist)
/// 2. `$WF_BOARD_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/wf-board/config.toml`
/// 4. `~/.config/wf-board/config.toml`
///
/// Falls back to defaults when nothing is found.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_global_config(),
    };

    let Some(path) = path else {
        tracing::debug!("no config file found, using defaults");
        return Ok(AppConfig::default());
    };

    tracing::debug!("loading config from {}", path.display());
    parse_config_file(&path)
}

/// Read and parse one TOML config file.
pub fn parse_config_file(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn find_global_config() -> Option<PathBuf> {
    // $WF_BOARD_CONFIG
    if let Ok(path) = std::env::var("WF_BOARD_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/wf-board/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("wf-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/wf-board/config.toml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wf-board/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Expand a leading `~/` in a configured path.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

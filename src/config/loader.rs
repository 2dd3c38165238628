use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::BridgeConfig;

/// Discover and load the bridge config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$ORCHESTRA_BRIDGE_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/orchestra-bridge/config.toml`
/// 4. `~/.config/orchestra-bridge/config.toml`
///
/// Falls back to built-in defaults when no file is found. An explicit path
/// that does not exist is an error.
pub fn load_config(explicit_path: Option<&Path>) -> Result<BridgeConfig> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_global_config(),
    };

    let Some(path) = path else {
        tracing::debug!("config: no config file found, using defaults");
        return Ok(BridgeConfig::default());
    };

    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("parsing TOML from {}", path.display()))?;
    tracing::debug!("config: loaded {}", path.display());
    Ok(config)
}

/// Parse a config document. Unknown keys are ignored.
pub fn parse_config(contents: &str) -> Result<BridgeConfig> {
    let config: BridgeConfig = toml::from_str(contents)?;
    Ok(config)
}

fn find_global_config() -> Option<PathBuf> {
    // $ORCHESTRA_BRIDGE_CONFIG
    if let Ok(path) = std::env::var("ORCHESTRA_BRIDGE_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/orchestra-bridge/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("orchestra-bridge/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/orchestra-bridge/config.toml
    if let Some(home) = std::env::var("HOME").ok().map(PathBuf::from) {
        let p = home.join(".config/orchestra-bridge/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Directory name used under `~/.config` when no config dir is set.
const APP_DIR_NAME: &str = "gamedeck";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./gamedeck.toml", "~/.config/gamedeck/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(shellexpand::tilde(text).as_ref()),
        None => path.to_path_buf(),
    }
}

fn expand_paths(config: &mut Config) {
    if let Some(dir) = config.paths.config_dir.as_mut() {
        *dir = expand_path(dir);
    }
    for dir in &mut config.scan.game_dirs {
        *dir = expand_path(dir);
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    for dir in &config.scan.game_dirs {
        if dir.as_os_str().is_empty() {
            anyhow::bail!("Game directory entries cannot be empty");
        }
        if !dir.exists() {
            tracing::warn!("Game directory does not exist: {:?}", dir);
        }
    }

    if let Some(dir) = &config.paths.config_dir {
        if dir.is_file() {
            anyhow::bail!("Config directory {:?} is a file", dir);
        }
    }

    Ok(())
}

impl Config {
    /// Writable directory for list files and global metadata files.
    pub fn config_dir(&self) -> PathBuf {
        if let Some(dir) = &self.paths.config_dir {
            return dir.clone();
        }
        if self.paths.portable {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf));
            if let Some(dir) = exe_dir {
                return dir.join("config");
            }
        }
        PathBuf::from(shellexpand::tilde(&format!("~/.config/{APP_DIR_NAME}")).as_ref())
    }
}

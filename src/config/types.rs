use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Writable directory holding `game_dirs.txt`, favorites and whitelists.
    /// Defaults to `~/.config/gamedeck`, or the executable's directory in
    /// portable mode.
    #[serde(default)]
    pub config_dir: Option<PathBuf>,

    /// Keep all state next to the executable and write list files with
    /// paths relative to the config dir.
    #[serde(default)]
    pub portable: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Directories searched for metadata files, in addition to the entries
    /// of `game_dirs.txt`.
    #[serde(default)]
    pub game_dirs: Vec<PathBuf>,

    /// Descend into subdirectories when expanding collection file filters.
    #[serde(default)]
    pub recursive_directories: bool,

    /// Also read `*.metadata.txt` files from `<config_dir>/metafiles`.
    #[serde(default = "default_true")]
    pub global_metafiles: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            game_dirs: Vec::new(),
            recursive_directories: false,
            global_metafiles: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_true")]
    pub metadata: bool,

    #[serde(default = "default_true")]
    pub favorites: bool,

    #[serde(default = "default_true")]
    pub whitelists: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            metadata: true,
            favorites: true,
            whitelists: true,
        }
    }
}

fn default_true() -> bool {
    true
}

use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    assets: AssetsConfig,
    #[serde(default)]
    dev: DevConfig,
}

#[derive(Deserialize, Default)]
struct AssetsConfig {
    manifest_file: Option<String>,
    entry_file: Option<String>,
}

#[derive(Deserialize, Default)]
struct DevConfig {
    reload: Option<bool>,
}

/// Bridge configuration: asset file names and development switches.
///
/// The asset base path itself is not configuration; the host resolves it and
/// passes it to the bridge constructor.
pub struct Config {
    assets: AssetsConfig,
    dev: DevConfig,
}

impl Config {
    /// Load the embedded defaults, merged with the user override file if one
    /// exists. A malformed override is ignored with a warning.
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_assets(&mut base.assets, user.assets);
                            merge_dev(&mut base.dev, user.dev);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            assets: base.assets,
            dev: base.dev,
        }
    }

    /// Load the embedded defaults merged with an override document. Used by
    /// hosts that manage their own configuration storage.
    pub fn from_toml(text: &str) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        match toml::from_str::<ConfigFile>(text) {
            Ok(user) => {
                merge_assets(&mut base.assets, user.assets);
                merge_dev(&mut base.dev, user.dev);
            }
            Err(e) => log::warn!(target: "config", "ignoring malformed config override: {}", e),
        }

        Config {
            assets: base.assets,
            dev: base.dev,
        }
    }

    /// Manifest file name, resolved relative to the asset base path.
    pub fn manifest_file(&self) -> &str {
        self.assets.manifest_file.as_deref().unwrap_or("manifest.json")
    }

    /// Script entry file name, resolved relative to the asset base path.
    pub fn entry_file(&self) -> &str {
        self.assets.entry_file.as_deref().unwrap_or("dsp.main.js")
    }

    /// Whether the UI "reload" message may force re-initialization.
    pub fn dev_reload(&self) -> bool {
        self.dev.reload.unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Config {
            assets: base.assets,
            dev: base.dev,
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beltane").join("config.toml"))
}

fn merge_assets(base: &mut AssetsConfig, user: AssetsConfig) {
    if user.manifest_file.is_some() {
        base.manifest_file = user.manifest_file;
    }
    if user.entry_file.is_some() {
        base.entry_file = user.entry_file;
    }
}

fn merge_dev(base: &mut DevConfig, user: DevConfig) {
    if user.reload.is_some() {
        base.reload = user.reload;
    }
}

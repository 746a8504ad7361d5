//! Configuration file support for habitree
//!
//! Reads from ~/.microhabittree/config.toml (or `$HABITREE_CONFIG`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::DATA_DIR_NAME;
use crate::tree::TreeParams;

/// Env var pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "HABITREE_CONFIG";

/// Deeper trees are clamped to this many levels
pub const MAX_TREE_DEPTH: u32 = 12;

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Where the habit data lives
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shape of the generated tree
    #[serde(default)]
    pub tree: TreeConfig,

    /// Log level for the CLI
    #[serde(default)]
    pub log: LogConfig,
}

/// Storage-related configuration
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct StorageConfig {
    /// Data file path. `HABITREE_DATA_PATH` still takes priority.
    /// Default: ~/.microhabittree/habits.json
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

/// Tree generation tuning
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TreeConfig {
    /// Recursion depth of the branch generator
    /// Default: 8
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Degrees between a branch and each of its children
    /// Default: 28
    #[serde(default = "default_angle_spread")]
    pub angle_spread: f32,

    /// Trunk thickness in layout units
    /// Default: 28
    #[serde(default = "default_trunk_thickness")]
    pub trunk_thickness: f32,
}

fn default_depth() -> u32 {
    TreeParams::default().depth
}

fn default_angle_spread() -> f32 {
    TreeParams::default().angle_spread
}

fn default_trunk_thickness() -> f32 {
    TreeParams::default().trunk_thickness
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            angle_spread: default_angle_spread(),
            trunk_thickness: default_trunk_thickness(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` overrides it.
    /// Default: "warn"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load config from the config file.
    /// A missing file gives the default config; a file that doesn't parse is
    /// an error the caller reports once logging is up.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Ok(Self::default());
        };
        Self::parse(&contents)
            .map_err(|e| format!("ignoring invalid config {}: {}", path.display(), e))
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// `$HABITREE_CONFIG`, else config.toml next to the default data file
    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::home_dir().map(|home| home.join(DATA_DIR_NAME).join("config.toml"))
    }

    /// Generator parameters with the depth clamped and sizes kept positive
    pub fn tree_params(&self) -> TreeParams {
        let defaults = TreeParams::default();
        TreeParams {
            depth: self.tree.depth.min(MAX_TREE_DEPTH),
            angle_spread: self.tree.angle_spread,
            trunk_thickness: if self.tree.trunk_thickness > 0.0 {
                self.tree.trunk_thickness
            } else {
                defaults.trunk_thickness
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_path, None);
        assert_eq!(config.tree_params(), TreeParams::default());
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[storage]
data_path = "/tmp/habits.json"

[tree]
depth = 6
angle_spread = 35.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.data_path, Some(PathBuf::from("/tmp/habits.json")));
        let params = config.tree_params();
        assert_eq!(params.depth, 6);
        assert_eq!(params.angle_spread, 35.0);
        assert_eq!(params.trunk_thickness, 28.0);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_parse_rejects_broken_toml() {
        assert!(Config::parse("[tree\ndepth = ").is_err());
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_tree_params_are_sanitized() {
        let toml = r#"
[tree]
depth = 40
trunk_thickness = -3.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let params = config.tree_params();
        assert_eq!(params.depth, MAX_TREE_DEPTH);
        assert_eq!(params.trunk_thickness, 28.0);
    }
}

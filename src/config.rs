//! Configuration file support for book-autosplit
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./autosplit.toml` - current directory
//! 3. `~/.config/autosplit/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [split]
//! trim = true
//! fudge_factor = 1.5
//! spine_side = "center"
//!
//! [join]
//! verso_split = 88.0
//! deskew = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::JoinOptions;
use crate::spine::SpineSide;
use crate::split::SplitOptions;

/// Current-directory config file name
pub const LOCAL_CONFIG_FILE: &str = "autosplit.toml";

/// Directory under the user config dir
pub const CONFIG_DIR_NAME: &str = "autosplit";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// `[split]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SplitConfig {
    /// Trim scanner-bed borders
    #[serde(default)]
    pub trim: Option<bool>,

    /// Fixed cut position (percent of width)
    #[serde(default)]
    pub fixed_split: Option<f64>,

    /// Draw the cut line instead of cropping
    #[serde(default)]
    pub line_only: Option<bool>,

    /// Source is bound along its top/bottom edge
    #[serde(default)]
    pub vertical: Option<bool>,

    /// Overlap margin (percent of width)
    #[serde(default)]
    pub fudge_factor: Option<f64>,

    /// Spine position
    #[serde(default)]
    pub spine_side: Option<SpineSide>,

    /// Correct rotational tilt
    #[serde(default)]
    pub deskew: Option<bool>,
}

/// `[join]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JoinConfig {
    /// Verso cut position (percent of width)
    #[serde(default)]
    pub verso_split: Option<f64>,

    /// Detect the verso spine instead of cutting at `verso_split`
    #[serde(default)]
    pub detect_verso: Option<bool>,

    /// Trim scanner-bed borders
    #[serde(default)]
    pub trim: Option<bool>,

    /// Correct rotational tilt
    #[serde(default)]
    pub deskew: Option<bool>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Split settings
    #[serde(default)]
    pub split: SplitConfig,

    /// Batch join settings
    #[serde(default)]
    pub join: JoinConfig,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./autosplit.toml`
    /// 2. `~/.config/autosplit/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load `explicit` if given, else search the default paths
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Convert the `[split]` section to SplitOptions
    pub fn to_split_options(&self) -> SplitOptions {
        self.merge_with_cli(&CliOverrides::default())
    }

    /// Merge `[split]` with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> SplitOptions {
        let file = &self.split;
        let defaults = SplitOptions::default();

        SplitOptions::builder()
            .trim(cli.trim.or(file.trim).unwrap_or(defaults.trim))
            .fixed_split_percent(cli.fixed_split.or(file.fixed_split))
            .line_only(cli.line_only.or(file.line_only).unwrap_or(defaults.line_only))
            .vertical(cli.vertical.or(file.vertical).unwrap_or(defaults.vertical))
            .fudge_factor_percent(
                cli.fudge_factor
                    .or(file.fudge_factor)
                    .unwrap_or(defaults.fudge_factor_percent),
            )
            .spine_side(cli.spine_side.or(file.spine_side).unwrap_or(defaults.spine_side))
            .deskew(cli.deskew.or(file.deskew).unwrap_or(defaults.deskew))
            .build()
    }

    /// Convert the `[join]` section to JoinOptions
    pub fn to_join_options(&self) -> JoinOptions {
        self.merge_join_with_cli(&JoinOverrides::default())
    }

    /// Merge `[join]` with CLI arguments (CLI takes precedence)
    pub fn merge_join_with_cli(&self, cli: &JoinOverrides) -> JoinOptions {
        let file = &self.join;
        let defaults = JoinOptions::default();

        JoinOptions::default()
            .with_verso_split(
                cli.verso_split
                    .or(file.verso_split)
                    .unwrap_or(defaults.verso_split_percent),
            )
            .with_detect_verso(
                cli.detect_verso
                    .or(file.detect_verso)
                    .unwrap_or(defaults.detect_verso),
            )
            .with_trim(cli.trim.or(file.trim).unwrap_or(defaults.trim))
            .with_deskew(cli.deskew.or(file.deskew).unwrap_or(defaults.deskew))
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }

        paths
    }
}

/// Split CLI values for merging with the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub trim: Option<bool>,
    pub fixed_split: Option<f64>,
    pub line_only: Option<bool>,
    pub vertical: Option<bool>,
    pub fudge_factor: Option<f64>,
    pub spine_side: Option<SpineSide>,
    pub deskew: Option<bool>,
}

impl CliOverrides {
    /// Create new empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn with_fixed_split(mut self, percent: f64) -> Self {
        self.fixed_split = Some(percent);
        self
    }

    pub fn with_fudge_factor(mut self, percent: f64) -> Self {
        self.fudge_factor = Some(percent);
        self
    }

    pub fn with_spine_side(mut self, side: SpineSide) -> Self {
        self.spine_side = Some(side);
        self
    }

    pub fn with_deskew(mut self, deskew: bool) -> Self {
        self.deskew = Some(deskew);
        self
    }
}

/// Join CLI values for merging with the config file
#[derive(Debug, Clone, Default)]
pub struct JoinOverrides {
    pub verso_split: Option<f64>,
    pub detect_verso: Option<bool>,
    pub trim: Option<bool>,
    pub deskew: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // CFG-001: Config::default
    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.split.trim, None);
        assert_eq!(config.split.spine_side, None);
        assert_eq!(config.join.verso_split, None);
        assert_eq!(config.to_split_options(), SplitOptions::default());
        assert_eq!(config.to_join_options(), JoinOptions::default());
    }

    // CFG-002: Config::load_from_path (existing file)
    #[test]
    fn test_config_load_from_path_existing() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[split]
fudge_factor = 1.0
spine_side = "right"

[join]
detect_verso = true
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.split.fudge_factor, Some(1.0));
        assert_eq!(config.split.spine_side, Some(SpineSide::Right));
        assert_eq!(config.join.detect_verso, Some(true));
    }

    // CFG-003: Config::load_from_path (non-existent file)
    #[test]
    fn test_config_load_from_path_not_found() {
        let result = Config::load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));

        let result = Config::resolve(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    // CFG-004: search order
    #[test]
    fn test_config_search_paths() {
        let paths = Config::search_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths[0], PathBuf::from("autosplit.toml"));
        if paths.len() > 1 {
            assert!(paths[1].ends_with("autosplit/config.toml"));
        }
    }

    // CFG-005: CLI priority
    #[test]
    fn test_config_merge_cli_priority() {
        let config = Config {
            split: SplitConfig {
                trim: Some(true),
                fudge_factor: Some(5.0),
                spine_side: Some(SpineSide::Left),
                ..Default::default()
            },
            ..Default::default()
        };

        let cli = CliOverrides::new()
            .with_fudge_factor(1.0)
            .with_deskew(false);
        let opts = config.merge_with_cli(&cli);

        assert!(opts.trim); // file value kept
        assert_eq!(opts.fudge_factor_percent, 1.0); // CLI wins
        assert_eq!(opts.spine_side, SpineSide::Left);
        assert!(!opts.deskew);
    }

    #[test]
    fn test_config_fudge_factor_clamped() {
        let config = Config::from_toml("[split]\nfudge_factor = 75.0").unwrap();
        assert_eq!(config.to_split_options().fudge_factor_percent, 50.0);
    }

    #[test]
    fn test_config_fixed_split() {
        let config = Config::from_toml("[split]\nfixed_split = 40.0").unwrap();
        assert_eq!(config.to_split_options().fixed_split_percent, Some(40.0));

        let cli = CliOverrides::new().with_fixed_split(55.0);
        assert_eq!(config.merge_with_cli(&cli).fixed_split_percent, Some(55.0));
    }

    #[test]
    fn test_join_merge() {
        let config = Config::from_toml("[join]\nverso_split = 85.0\ntrim = false").unwrap();
        let opts = config.to_join_options();
        assert_eq!(opts.verso_split_percent, 85.0);
        assert!(!opts.trim);
        assert!(opts.deskew);

        let cli = JoinOverrides {
            verso_split: Some(92.0),
            deskew: Some(false),
            ..Default::default()
        };
        let opts = config.merge_join_with_cli(&cli);
        assert_eq!(opts.verso_split_percent, 92.0);
        assert!(!opts.deskew);
        assert!(!opts.trim);
    }

    #[test]
    fn test_config_toml_parse_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_toml_parse_invalid() {
        let result = Config::from_toml("[split]\nspine_side = \"diagonal\"");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));

        let result = Config::from_toml("this is not toml [");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_config_to_toml_roundtrip() {
        let config = Config {
            split: SplitConfig {
                vertical: Some(true),
                spine_side: Some(SpineSide::Center),
                ..Default::default()
            },
            join: JoinConfig {
                verso_split: Some(90.0),
                ..Default::default()
            },
        };

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("spine_side = \"center\""));
        assert_eq!(Config::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound(PathBuf::from("/test/config.toml"));
        assert!(err.to_string().contains("/test/config.toml"));
    }
}

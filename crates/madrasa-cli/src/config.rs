//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use madrasa_core::MonthFilter;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Records file read when no `--input` is given. Stdin if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_path: Option<PathBuf>,

    /// Year reported when no `--year` is given. Current year if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_year: Option<i32>,

    /// Month filter used when no `--month` is given.
    #[serde(default)]
    pub default_month: MonthFilter,
}

impl Config {
    /// Loads configuration from default locations, plus `config_path` if given.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables (MADRASA_*)
        figment = figment.merge(Env::prefixed("MADRASA_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for madrasa.
///
/// On Linux: `~/.config/madrasa`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("madrasa"))
}

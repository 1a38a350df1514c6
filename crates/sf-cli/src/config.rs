//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::commands::summary::GroupBy;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Reject payloads whose `start`/`end` text does not parse as a date.
    pub strict_dates: bool,

    /// Default grouping for `sf summary`.
    pub group_by: GroupBy,

    /// Print summaries as JSON unless overridden.
    pub summary_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_dates: false,
            group_by: GroupBy::Resource,
            summary_json: false,
        }
    }
}

impl Config {
    /// Loads configuration from the default location, then an optional
    /// explicit file, then `SF_*` environment variables.
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

        // SF_STRICT_DATES, SF_GROUP_BY, ...
        figment = figment.merge(Env::prefixed("SF_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for sf.
///
/// On Linux: `~/.config/sf`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sf"))
}

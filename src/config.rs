//! Provider configuration
//!
//! Each metadata provider can be switched on per artifact category. The host
//! application keeps these switches as a pipe-separated string of ten `0`/`1`
//! flags; this module converts between that string and [`MetadataConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of flags in a provider configuration string.
pub const CONFIG_FLAG_COUNT: usize = 10;

/// Errors that can occur while parsing a provider configuration string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The string did not contain the expected number of flags
    #[error("Expected {expected} flags but found {found} in config string '{value}'")]
    WrongFlagCount {
        expected: usize,
        found: usize,
        value: String,
    },

    /// A flag was neither `0` nor `1`
    #[error("Invalid flag '{flag}' at position {position}, expected 0 or 1")]
    InvalidFlag { position: usize, flag: String },
}

/// Which metadata artifacts a provider should create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub show_metadata: bool,
    pub episode_metadata: bool,
    pub fanart: bool,
    pub poster: bool,
    pub banner: bool,
    pub episode_thumbnails: bool,
    pub season_posters: bool,
    pub season_banners: bool,
    pub season_all_poster: bool,
    pub season_all_banner: bool,
}

impl MetadataConfig {
    /// A configuration with every artifact category enabled.
    pub fn all() -> Self {
        Self::from_flags([true; CONFIG_FLAG_COUNT])
    }

    /// True if at least one artifact category is enabled.
    pub fn is_enabled(&self) -> bool {
        self.flags().iter().any(|flag| *flag)
    }

    fn from_flags(flags: [bool; CONFIG_FLAG_COUNT]) -> Self {
        let [
            show_metadata,
            episode_metadata,
            fanart,
            poster,
            banner,
            episode_thumbnails,
            season_posters,
            season_banners,
            season_all_poster,
            season_all_banner,
        ] = flags;

        Self {
            show_metadata,
            episode_metadata,
            fanart,
            poster,
            banner,
            episode_thumbnails,
            season_posters,
            season_banners,
            season_all_poster,
            season_all_banner,
        }
    }

    fn flags(&self) -> [bool; CONFIG_FLAG_COUNT] {
        [
            self.show_metadata,
            self.episode_metadata,
            self.fanart,
            self.poster,
            self.banner,
            self.episode_thumbnails,
            self.season_posters,
            self.season_banners,
            self.season_all_poster,
            self.season_all_banner,
        ]
    }

    /// Parses a configuration string such as `"1|1|0|1|0|0|1|0|0|0"`.
    pub fn from_config_string(value: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = value.trim().split('|').collect();

        if parts.len() != CONFIG_FLAG_COUNT {
            return Err(ConfigError::WrongFlagCount {
                expected: CONFIG_FLAG_COUNT,
                found: parts.len(),
                value: value.to_string(),
            });
        }

        let mut flags = [false; CONFIG_FLAG_COUNT];
        for (position, part) in parts.iter().enumerate() {
            flags[position] = match part.trim() {
                "1" => true,
                "0" => false,
                other => {
                    return Err(ConfigError::InvalidFlag {
                        position,
                        flag: other.to_string(),
                    });
                }
            };
        }

        Ok(Self::from_flags(flags))
    }

    /// Renders the configuration in the host application's string format.
    pub fn to_config_string(&self) -> String {
        self.flags()
            .iter()
            .map(|flag| if *flag { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl FromStr for MetadataConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_config_string(s)
    }
}

impl fmt::Display for MetadataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_config_string())
    }
}

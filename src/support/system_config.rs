//-
// Copyright (c) 2026, the spf-breakdown authors
//
// This file is part of spf-breakdown.
//
// spf-breakdown is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// spf-breakdown is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with spf-breakdown. If not, see <http://www.gnu.org/licenses/>.

use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The configuration for spf-breakdown.
///
/// This is stored in a file named `spf-breakdown.toml`, typically under
/// `/etc/spf-breakdown` or `/usr/local/etc/spf-breakdown`. Every section is
/// optional.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct SystemConfig {
    /// How DNS queries are made.
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Bounds on policy resolution.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// The name servers to query, in order.
    ///
    /// If empty, the system resolver configuration (`/etc/resolv.conf`) is
    /// used.
    pub name_servers: Vec<IpAddr>,
    /// The port on which `name_servers` listen.
    pub port: u16,
    /// Timeout for a single query, in seconds.
    pub timeout_secs: u64,
    /// How many times a query is attempted before giving up.
    pub attempts: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            name_servers: vec![],
            port: 53,
            timeout_secs: 5,
            attempts: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// The deepest chain of `include:` mechanisms that will be followed.
    pub max_include_depth: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_include_depth: crate::spf::resolve::DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// The level at which to log to standard error, e.g. `warn` or `debug`.
    ///
    /// Ignored if `config_file` is set.
    pub level: String,
    /// A `log4rs` configuration file to use instead of the standard error
    /// logger. A relative path is resolved against the directory containing
    /// this configuration.
    pub config_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            config_file: None,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| ConfigError::LogLevel(self.level.clone()))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("unknown log level: {0:?}")]
    LogLevel(String),
}

impl SystemConfig {
    /// Reads and sanitises the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.sanitise();
        config.log.level_filter()?;
        Ok(config)
    }

    /// Raises values which would make resolution impossible to their
    /// minimums.
    pub fn sanitise(&mut self) {
        if self.resolver.timeout_secs < 1 {
            self.resolver.timeout_secs = 1;
        }
        if self.resolver.attempts < 1 {
            self.resolver.attempts = 1;
        }
        if self.limits.max_include_depth < 1 {
            self.limits.max_include_depth = 1;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = SystemConfig::parse("").unwrap();
        assert!(config.resolver.name_servers.is_empty());
        assert_eq!(53, config.resolver.port);
        assert_eq!(5, config.resolver.timeout_secs);
        assert_eq!(2, config.resolver.attempts);
        assert_eq!(10, config.limits.max_include_depth);
        assert_eq!(LevelFilter::Warn, config.log.level_filter().unwrap());
        assert_eq!(None, config.log.config_file);
    }

    #[test]
    fn full_file() {
        let config = SystemConfig::parse(
            r#"
[resolver]
name_servers = ["192.0.2.53", "2001:db8::53"]
port = 5353
timeout_secs = 2
attempts = 4

[limits]
max_include_depth = 4

[log]
level = "debug"
config_file = "logging.toml"
"#,
        )
        .unwrap();

        assert_eq!(
            vec![
                "192.0.2.53".parse::<IpAddr>().unwrap(),
                "2001:db8::53".parse::<IpAddr>().unwrap(),
            ],
            config.resolver.name_servers,
        );
        assert_eq!(5353, config.resolver.port);
        assert_eq!(2, config.resolver.timeout_secs);
        assert_eq!(4, config.resolver.attempts);
        assert_eq!(4, config.limits.max_include_depth);
        assert_eq!(LevelFilter::Debug, config.log.level_filter().unwrap());
        assert_eq!(
            Some(PathBuf::from("logging.toml")),
            config.log.config_file,
        );
    }

    #[test]
    fn sanitise_raises_zeroes() {
        let config = SystemConfig::parse(
            "[resolver]\ntimeout_secs = 0\nattempts = 0\n\
             [limits]\nmax_include_depth = 0\n",
        )
        .unwrap();
        assert_eq!(1, config.resolver.timeout_secs);
        assert_eq!(1, config.resolver.attempts);
        assert_eq!(1, config.limits.max_include_depth);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert_matches!(
            Err(ConfigError::LogLevel(_)),
            SystemConfig::parse("[log]\nlevel = \"chatty\"\n"),
        );
        assert_matches!(
            Err(ConfigError::Toml(_)),
            SystemConfig::parse("[resolver]\nname_servers = [\"nope\"]\n"),
        );
        assert_matches!(
            Err(ConfigError::Io(_)),
            SystemConfig::load(Path::new("/nonexistent/spf-breakdown.toml")),
        );
    }
}

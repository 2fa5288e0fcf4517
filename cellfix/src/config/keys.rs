//! Typed `section.key` names for `config get` and `config set`.

use std::fmt;
use std::str::FromStr;

use super::file::{expand_tilde, parse_secs, ConfigError, ConfigFile};

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    StorePath,
    SessionObservationTimeout,
    SessionCapabilityTimeout,
    LoggingDirectory,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::StorePath,
            ConfigKey::SessionObservationTimeout,
            ConfigKey::SessionCapabilityTimeout,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingFile,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::StorePath => "store.path",
            ConfigKey::SessionObservationTimeout => "session.observation_timeout",
            ConfigKey::SessionCapabilityTimeout => "session.capability_timeout",
            ConfigKey::LoggingDirectory => "logging.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        self.name().split_once('.').unwrap_or((self.name(), ""))
    }

    /// Current value as a string. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::StorePath => config.store.path.display().to_string(),
            ConfigKey::SessionObservationTimeout => config.session.observation_timeout.to_string(),
            ConfigKey::SessionCapabilityTimeout => config
                .session
                .capability_timeout
                .map(|s| s.to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingFile => config.logging.file.clone(),
        }
    }

    /// Validates and applies `value`.
    ///
    /// An empty value clears `session.capability_timeout`. Other keys
    /// require a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() && *self != ConfigKey::SessionCapabilityTimeout {
            return Err(ConfigError::InvalidValue {
                key: self.name().to_string(),
                value: value.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }

        match self {
            ConfigKey::StorePath => config.store.path = expand_tilde(value),
            ConfigKey::SessionObservationTimeout => {
                config.session.observation_timeout = parse_secs(self.name(), value)?
            }
            ConfigKey::SessionCapabilityTimeout => {
                config.session.capability_timeout = if value.is_empty() {
                    None
                } else {
                    Some(parse_secs(self.name(), value)?)
                }
            }
            ConfigKey::LoggingDirectory => config.logging.directory = expand_tilde(value),
            ConfigKey::LoggingFile => config.logging.file = value.to_string(),
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| format!("unknown configuration key: {}", s))
    }
}

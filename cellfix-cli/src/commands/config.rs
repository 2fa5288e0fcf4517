//! `cellfix config` subcommands.

use cellfix::config::{config_file_path, ConfigFile, ConfigKey};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g., store.path)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g., session.observation_timeout)
        key: String,

        /// New value; empty clears session.capability_timeout
        value: String,
    },

    /// Print every setting
    List,

    /// Print the configuration file path
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(key, &config));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            // A file that fails to parse is reported rather than replaced.
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            println!("{} = {}", key, display_value(key, &config));
        }
        ConfigCommands::List => {
            let config = ConfigFile::load()?;
            print!("{}", render_list(&config));
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<_> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "unknown key '{}', expected one of: {}",
            key,
            known.join(", ")
        ))
    })
}

fn display_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    match (key, value.is_empty()) {
        (ConfigKey::SessionCapabilityTimeout, true) => "(unbounded)".to_string(),
        (_, true) => "(not set)".to_string(),
        _ => value,
    }
}

/// `[section]` blocks in key order, one `key = value` line per setting.
fn render_list(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                out.push('\n');
            }
            section = key.section();
            out.push_str(&format!("[{}]\n", section));
        }
        out.push_str(&format!(
            "{} = {}\n",
            key.key_name(),
            display_value(*key, config)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_key_lists_known_keys() {
        let err = parse_key("store.location").unwrap_err();
        assert!(err.to_string().contains("store.path"));
        assert_eq!(parse_key("logging.file").unwrap(), ConfigKey::LoggingFile);
    }

    #[test]
    fn test_render_list_groups_sections() {
        let mut config = ConfigFile::default();
        config.store.path = PathBuf::from("/srv/towers.db");

        let listing = render_list(&config);
        assert!(listing.starts_with("[store]\npath = /srv/towers.db\n\n[session]\n"));
        assert!(listing.contains("capability_timeout = (unbounded)\n"));
        assert!(listing.contains("[logging]\n"));
    }
}

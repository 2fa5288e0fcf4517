//! INI configuration file.
//!
//! Settings live in `~/.config/cellfix/config.ini` (or the platform
//! equivalent). A missing file is not an error: every setting has a default,
//! and command-line flags override whatever the file says.
//!
//! ```ini
//! [store]
//! path = /home/user/.local/share/cellfix/celltowers.db
//!
//! [session]
//! observation_timeout = 10
//! capability_timeout =
//!
//! [logging]
//! directory = /home/user/.local/share/cellfix/logs
//! file = cellfix.log
//! ```

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, data_directory, ConfigError, ConfigFile, LoggingSettings,
    SessionSettings, StoreSettings, DEFAULT_LOG_FILE, DEFAULT_STORE_FILE,
};
pub use keys::ConfigKey;

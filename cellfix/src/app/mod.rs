//! Application bootstrap and lifecycle management.
//!
//! [`CellfixApp`] owns a Tokio runtime and turns an [`AppConfig`] into
//! ready-to-run lookups: one-shot resolutions against the tower database and
//! full acquisition attempts through a [`SessionController`].
//!
//! ```text
//! ConfigFile ──► AppConfig ──► CellfixApp ──┬─► locate()     SessionController
//!                                           ├─► lookup()     resolver::resolve_key
//!                                           └─► store_info() LookupStore::info
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cellfix::app::{AppConfig, CellfixApp};
//!
//! let app = CellfixApp::start_sync(AppConfig::from_config_file(&config))?;
//! let report = app.locate(capabilities, observations)?;
//! println!("{}", report.state.phase());
//! ```
//!
//! [`SessionController`]: crate::session::SessionController

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{CellfixApp, LocateReport};
pub use config::AppConfig;
pub use error::AppError;

//! cellfix - offline position estimates from the serving cell tower
//!
//! This library reads the serving cell's identifiers (cell id, location area
//! code, mobile country and network codes) and resolves them against a
//! bundled, read-only database of known tower locations. No GPS and no
//! network access are involved.
//!
//! # Pipeline
//!
//! ```text
//! capability::CapabilityGate ──► observation::ObservationProvider
//!                                        │
//!                                        ▼
//!                 store::LookupStore ◄── resolver::resolve
//!                                        │
//!                                        ▼
//!                       session::SessionController ──► SessionState updates
//! ```
//!
//! The [`session`] module ties the pieces together into a state machine;
//! [`app`] wires it from a [`config::ConfigFile`].

use std::future::Future;
use std::pin::Pin;

pub mod app;
pub mod capability;
pub mod cell;
pub mod config;
pub mod location;
pub mod logging;
pub mod observation;
pub mod resolver;
pub mod session;
pub mod store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

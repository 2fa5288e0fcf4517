//! Cell observation providers
//!
//! An [`ObservationProvider`] is the boundary to the radio layer. It yields a
//! single raw [`CellObservation`](crate::cell::CellObservation) per call, or a
//! [`ProviderError`]. The pipeline treats it as opaque and validates whatever
//! it returns.
//!
//! Bundled implementations:
//!
//! - [`FixedObservationProvider`] - always returns the same observation
//!   (values given on the command line)
//! - [`FileObservationProvider`] - reads a JSON dump of the radio layer's
//!   cell list and picks the serving cell

mod file;
mod fixed;
mod types;

pub use file::{select_serving_cell, FileObservationProvider, ObservationFile, RadioCell, RadioType};
pub use fixed::FixedObservationProvider;
pub use types::{ObservationProvider, ProviderError};

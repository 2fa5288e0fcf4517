//! Cell identity module
//!
//! Provides the validated [`CellIdentity`] value the rest of the pipeline
//! works with, and the raw [`CellObservation`] payload delivered by an
//! observation provider.
//!
//! Validation happens exactly once, when a raw observation is converted:
//!
//! ```
//! use cellfix::cell::{CellIdentity, CellObservation};
//!
//! let raw = CellObservation::new(100, 200, 310, 410, -70);
//! let identity = CellIdentity::try_from(raw).unwrap();
//! assert_eq!(identity.key().mcc, 310);
//! ```

mod types;

pub use types::{
    CellError, CellIdentity, CellKey, CellObservation, MAX_MCC, MAX_MNC, UNAVAILABLE,
};

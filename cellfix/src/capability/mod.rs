//! Capability gate.
//!
//! Reading the serving cell requires three runtime permissions. The gate asks
//! a [`CapabilityProvider`] (the operating system boundary) for all of them in
//! one call and only reports [`CapabilityResult::Granted`] when every one was
//! granted. A partial grant is a denial; there is no degraded mode.
//!
//! ```ignore
//! use cellfix::capability::{CapabilityGate, StaticCapabilityProvider};
//!
//! let gate = CapabilityGate::new(Arc::new(StaticCapabilityProvider::granting_all()));
//! assert!(gate.request_capabilities().await.is_granted());
//! ```

mod gate;
mod provider;

pub use gate::{CapabilityGate, CapabilityResult, Denial, DenialCause, PERMISSION_DENIED_REASON};
pub use provider::{
    Capability, CapabilityError, CapabilityProvider, StaticCapabilityProvider,
    REQUIRED_CAPABILITIES,
};

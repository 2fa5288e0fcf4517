//! Provider returning a preset observation.

use crate::cell::CellObservation;
use crate::BoxFuture;

use super::types::{ObservationProvider, ProviderError};

/// Returns the same observation on every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedObservationProvider {
    observation: CellObservation,
}

impl FixedObservationProvider {
    pub fn new(observation: CellObservation) -> Self {
        Self { observation }
    }
}

impl ObservationProvider for FixedObservationProvider {
    fn fetch_one(&self) -> BoxFuture<'_, Result<CellObservation, ProviderError>> {
        let observation = self.observation;
        Box::pin(async move { Ok(observation) })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

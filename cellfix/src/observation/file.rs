//! JSON file observation provider.
//!
//! Reads a dump of the radio layer's state. Two shapes are accepted:
//!
//! ```text
//! { "cellId": 100, "lac": 200, "mcc": 310, "mnc": 410, "signalStrength": -70 }
//!
//! [
//!   { "radio": "gsm", "registered": false, "cellId": 7, ... },
//!   { "radio": "lte", "registered": true,  "cellId": 100, ... }
//! ]
//! ```
//!
//! A single object is taken as the serving cell. For a list, the serving cell
//! is the first registered LTE entry, in list order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::CellObservation;
use crate::BoxFuture;

use super::types::{ObservationProvider, ProviderError};

/// Radio access technology of a visible cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioType {
    Gsm,
    Cdma,
    Wcdma,
    Lte,
    Nr,
}

/// One entry of the radio layer's visible-cell list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioCell {
    pub radio: RadioType,
    #[serde(default)]
    pub registered: bool,
    #[serde(flatten)]
    pub observation: CellObservation,
}

/// Contents of an observation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationFile {
    Single(CellObservation),
    Cells(Vec<RadioCell>),
}

impl ObservationFile {
    /// Picks the serving cell's observation.
    pub fn serving_cell(&self) -> Result<CellObservation, ProviderError> {
        match self {
            ObservationFile::Single(observation) => Ok(*observation),
            ObservationFile::Cells(cells) => select_serving_cell(cells),
        }
    }
}

/// Returns the first registered LTE cell in `cells`.
///
/// Fails with [`ProviderError::NoServingCell`] when the list is empty or holds
/// no registered LTE cell.
pub fn select_serving_cell(cells: &[RadioCell]) -> Result<CellObservation, ProviderError> {
    cells
        .iter()
        .find(|cell| cell.radio == RadioType::Lte && cell.registered)
        .map(|cell| cell.observation)
        .ok_or(ProviderError::NoServingCell)
}

/// Reads an observation from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct FileObservationProvider {
    path: PathBuf,
}

impl FileObservationProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<CellObservation, ProviderError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| ProviderError::Read {
                    path: self.path.clone(),
                    source,
                })?;

        let file: ObservationFile = serde_json::from_str(&contents)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let observation = file.serving_cell()?;
        debug!(path = %self.path.display(), ?observation, "Read observation file");
        Ok(observation)
    }
}

impl ObservationProvider for FileObservationProvider {
    fn fetch_one(&self) -> BoxFuture<'_, Result<CellObservation, ProviderError>> {
        Box::pin(self.read())
    }

    fn name(&self) -> &str {
        "file"
    }
}

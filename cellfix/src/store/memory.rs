//! In-memory lookup store.

use std::sync::Arc;

use tracing::debug;

use crate::cell::CellKey;
use crate::BoxFuture;

use super::types::{LookupStore, StoreError, StoreInfo, StoreSource, TowerRecord};

/// Lookup store over an ordered list of records.
///
/// Natural iteration order is insertion order, so among duplicate keys the
/// earliest inserted record comes first.
#[derive(Debug, Clone)]
pub struct MemoryLookupStore {
    records: Option<Arc<Vec<(CellKey, TowerRecord)>>>,
}

impl MemoryLookupStore {
    pub fn new(records: Vec<(CellKey, TowerRecord)>) -> Self {
        Self {
            records: Some(Arc::new(records)),
        }
    }

    fn records(&self) -> Result<&[(CellKey, TowerRecord)], StoreError> {
        self.records
            .as_deref()
            .map(Vec::as_slice)
            .ok_or(StoreError::Unavailable)
    }
}

impl LookupStore for MemoryLookupStore {
    fn find_all(&self, key: &CellKey) -> Result<Vec<TowerRecord>, StoreError> {
        Ok(self
            .records()?
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, record)| *record)
            .collect())
    }

    fn info(&self) -> Result<StoreInfo, StoreError> {
        Ok(StoreInfo {
            source: "memory".to_string(),
            records: self.records()?.len() as u64,
        })
    }

    fn is_open(&self) -> bool {
        self.records.is_some()
    }

    fn close(&mut self) {
        if self.records.take().is_some() {
            debug!("Memory lookup store closed");
        }
    }
}

/// Opens [`MemoryLookupStore`]s that share one record list.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Arc<Vec<(CellKey, TowerRecord)>>,
}

impl MemorySource {
    pub fn new(records: Vec<(CellKey, TowerRecord)>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

impl StoreSource for MemorySource {
    fn open(&self) -> BoxFuture<'_, Result<Box<dyn LookupStore>, StoreError>> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            Ok(Box::new(MemoryLookupStore {
                records: Some(records),
            }) as Box<dyn LookupStore>)
        })
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

//! Cell identity to location resolution.
//!
//! Resolution is an exact-match lookup on the four-field [`CellKey`]. Cell
//! identifiers are administrative codes with no spatial meaning, so there is
//! no fuzzy, partial-key or nearest-neighbor matching.
//!
//! Outcomes:
//!
//! - [`Resolution::Found`] - the first matching record in the store's natural
//!   order, validated into a [`LocationEstimate`]
//! - [`Resolution::NotFound`] - the query succeeded and nothing matched
//! - [`ResolveError`] - the store is closed or the query failed
//!
//! Each call is an independent read. Nothing is cached between calls.

use thiserror::Error;
use tracing::{debug, warn};

use crate::cell::{CellIdentity, CellKey};
use crate::location::LocationEstimate;
use crate::store::{LookupStore, StoreError};

/// Errors that prevent a resolution from completing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The store handle is closed.
    #[error("lookup store is not open")]
    StoreUnavailable,

    /// The store query failed, or returned a record that is not a valid
    /// position.
    #[error("lookup failed: {0}")]
    QueryFailed(String),
}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable => ResolveError::StoreUnavailable,
            StoreError::QueryFailed(reason) => ResolveError::QueryFailed(reason),
            other => ResolveError::QueryFailed(other.to_string()),
        }
    }
}

/// Successful resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(LocationEstimate),
    NotFound,
}

impl Resolution {
    /// The estimate, if one was found.
    pub fn estimate(&self) -> Option<LocationEstimate> {
        match self {
            Resolution::Found(estimate) => Some(*estimate),
            Resolution::NotFound => None,
        }
    }
}

/// Resolves `identity` against `store`.
///
/// When the dataset holds several records for the key, the first one in the
/// store's natural iteration order wins. This is a fixed rule, not an error.
///
/// # Errors
///
/// - [`ResolveError::StoreUnavailable`] if `store` is closed
/// - [`ResolveError::QueryFailed`] on a store read error or an out-of-range
///   record
pub fn resolve(
    store: &dyn LookupStore,
    identity: &CellIdentity,
) -> Result<Resolution, ResolveError> {
    resolve_key(store, &identity.key())
}

/// Resolves a bare key. See [`resolve`].
pub fn resolve_key(store: &dyn LookupStore, key: &CellKey) -> Result<Resolution, ResolveError> {
    if !store.is_open() {
        return Err(ResolveError::StoreUnavailable);
    }

    let records = store.find_all(key)?;

    let Some(first) = records.first() else {
        debug!(key = %key, "No record for cell");
        return Ok(Resolution::NotFound);
    };

    if records.len() > 1 {
        warn!(
            key = %key,
            matches = records.len(),
            "Dataset holds duplicate records for cell, using the first"
        );
    }

    let estimate = LocationEstimate::new(first.latitude, first.longitude, first.accuracy)
        .map_err(|e| ResolveError::QueryFailed(format!("invalid record for {}: {}", key, e)))?;

    debug!(
        key = %key,
        latitude = estimate.latitude(),
        longitude = estimate.longitude(),
        accuracy = estimate.accuracy(),
        "Resolved cell"
    );
    Ok(Resolution::Found(estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryLookupStore, TowerRecord};
    use proptest::prelude::*;

    fn identity(cell_id: u32, lac: u32, mcc: u16, mnc: u16) -> CellIdentity {
        CellIdentity::new(CellKey::new(cell_id, lac, mcc, mnc), -70)
    }

    fn reference_store() -> MemoryLookupStore {
        MemoryLookupStore::new(vec![(
            CellKey::new(100, 200, 310, 410),
            TowerRecord::new(37.422, -122.084, 150.0),
        )])
    }

    /// Store that fails every query.
    struct BrokenStore;

    impl LookupStore for BrokenStore {
        fn find_all(&self, _key: &CellKey) -> Result<Vec<TowerRecord>, StoreError> {
            Err(StoreError::QueryFailed("disk I/O error".to_string()))
        }

        fn info(&self) -> Result<crate::store::StoreInfo, StoreError> {
            Err(StoreError::QueryFailed("disk I/O error".to_string()))
        }

        fn is_open(&self) -> bool {
            true
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_resolve_found() {
        let store = reference_store();
        let resolution = resolve(&store, &identity(100, 200, 310, 410)).unwrap();

        let estimate = resolution.estimate().unwrap();
        assert_eq!(estimate.latitude(), 37.422);
        assert_eq!(estimate.longitude(), -122.084);
        assert_eq!(estimate.accuracy(), 150.0);
    }

    #[test]
    fn test_resolve_not_found_is_not_an_error() {
        let store = reference_store();
        assert_eq!(
            resolve(&store, &identity(101, 200, 310, 410)),
            Ok(Resolution::NotFound)
        );
    }

    #[test]
    fn test_signal_strength_does_not_affect_lookup() {
        let store = reference_store();
        let weak = CellIdentity::new(CellKey::new(100, 200, 310, 410), -120);
        assert!(resolve(&store, &weak).unwrap().estimate().is_some());
    }

    #[test]
    fn test_duplicate_keys_return_first_record() {
        let key = CellKey::new(1, 1, 262, 1);
        let store = MemoryLookupStore::new(vec![
            (key, TowerRecord::new(52.0, 13.0, 500.0)),
            (key, TowerRecord::new(48.0, 11.0, 900.0)),
        ]);

        for _ in 0..10 {
            let estimate = resolve_key(&store, &key).unwrap().estimate().unwrap();
            assert_eq!(estimate.latitude(), 52.0);
            assert_eq!(estimate.accuracy(), 500.0);
        }
    }

    #[test]
    fn test_closed_store_is_unavailable() {
        let mut store = reference_store();
        store.close();
        assert_eq!(
            resolve(&store, &identity(100, 200, 310, 410)),
            Err(ResolveError::StoreUnavailable)
        );
    }

    #[test]
    fn test_query_error_is_query_failed() {
        assert_eq!(
            resolve(&BrokenStore, &identity(1, 2, 3, 4)),
            Err(ResolveError::QueryFailed("disk I/O error".to_string()))
        );
    }

    #[test]
    fn test_invalid_record_is_query_failed() {
        let key = CellKey::new(1, 2, 3, 4);
        let store = MemoryLookupStore::new(vec![(key, TowerRecord::new(95.0, 0.0, 10.0))]);
        assert!(matches!(
            resolve_key(&store, &key),
            Err(ResolveError::QueryFailed(_))
        ));
    }

    proptest! {
        /// Changing any single key field of a stored key never matches.
        #[test]
        fn prop_no_partial_key_fallback(
            cell_id in 0u32..1_000_000,
            lac in 0u32..65_536,
            mcc in 0u16..=999,
            mnc in 0u16..=999,
            field in 0usize..4,
            delta in 1u32..1000,
        ) {
            let stored = CellKey::new(cell_id, lac, mcc, mnc);
            let store = MemoryLookupStore::new(vec![(stored, TowerRecord::new(10.0, 20.0, 30.0))]);

            let mut probe = stored;
            match field {
                0 => probe.cell_id = cell_id.wrapping_add(delta),
                1 => probe.lac = lac.wrapping_add(delta),
                2 => probe.mcc = (mcc + delta as u16) % 1000,
                _ => probe.mnc = (mnc + delta as u16) % 1000,
            }
            prop_assume!(probe != stored);

            prop_assert_eq!(resolve_key(&store, &probe), Ok(Resolution::NotFound));
            prop_assert!(resolve_key(&store, &stored).unwrap().estimate().is_some());
        }

        /// Repeated resolution of the same key gives the same outcome.
        #[test]
        fn prop_resolution_is_deterministic(
            keys in proptest::collection::vec((0u32..5, 0u32..5), 1..20),
            probe in (0u32..5, 0u32..5),
        ) {
            let records = keys
                .iter()
                .enumerate()
                .map(|(i, (cell_id, lac))| {
                    (CellKey::new(*cell_id, *lac, 310, 410), TowerRecord::new(i as f64, 0.0, 1.0))
                })
                .collect();
            let store = MemoryLookupStore::new(records);
            let key = CellKey::new(probe.0, probe.1, 310, 410);

            let first = resolve_key(&store, &key);
            for _ in 0..3 {
                prop_assert_eq!(resolve_key(&store, &key), first.clone());
            }
        }
    }
}

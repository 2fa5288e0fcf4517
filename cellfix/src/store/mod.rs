//! Read-only lookup store of known cell tower locations.
//!
//! A store is opened once through a [`StoreSource`], queried any number of
//! times, and closed exactly once. Closing is idempotent; any query after
//! close fails with [`StoreError::Unavailable`] and never reopens the store.
//! Dropping a store closes it.
//!
//! # Backends
//!
//! - [`SqliteLookupStore`] - the bundled `celltowers.db` dataset, opened
//!   read-only. Natural order is ascending `rowid`.
//! - [`MemoryLookupStore`] - an ordered list of records. Natural order is
//!   insertion order.
//!
//! # Example
//!
//! ```ignore
//! use cellfix::store::{SqliteSource, StoreSource};
//!
//! let mut store = SqliteSource::new("celltowers.db").open().await?;
//! let rows = store.find_all(&key)?;
//! store.close();
//! ```

mod memory;
mod sqlite;
mod types;

pub use memory::{MemoryLookupStore, MemorySource};
pub use sqlite::{SqliteLookupStore, SqliteSource, REQUIRED_COLUMNS, TABLE_NAME};
pub use types::{LookupStore, StoreError, StoreInfo, StoreSource, TowerRecord};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use agristock_core::ExpectedVersion;
use std::sync::Arc;

/// The three persisted collections.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Fields,
    Movements,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Products, Collection::Fields, Collection::Movements];

    /// Stable storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Fields => "fields",
            Collection::Movements => "movements",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// Full contents of one collection at a given version.
///
/// Version 0 means the collection has never been written (absent), which is
/// what seeding keys off.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub version: u64,
    pub records: Vec<JsonValue>,
}

impl Snapshot {
    pub fn is_absent(&self) -> bool {
        self.version == 0
    }
}

/// Typed view of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub records: Vec<T>,
}

impl<T> Versioned<T> {
    /// Expectation to commit this collection back unchanged-underneath.
    pub fn expected(&self) -> ExpectedVersion {
        ExpectedVersion::Exact(self.version)
    }
}

/// Replace the whole contents of one collection, guarded by a version check.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionWrite {
    pub collection: Collection,
    pub expected: ExpectedVersion,
    pub records: Vec<JsonValue>,
}

impl CollectionWrite {
    pub fn new(collection: Collection, expected: ExpectedVersion, records: Vec<JsonValue>) -> Self {
        Self {
            collection,
            expected,
            records,
        }
    }

    /// Serialize typed records into a write.
    pub fn typed<T: Serialize>(
        collection: Collection,
        expected: ExpectedVersion,
        records: &[T],
    ) -> Result<Self, StoreError> {
        let records = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Serialization(format!("{collection}: {e}")))?;
        Ok(Self::new(collection, expected, records))
    }
}

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, invariants).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("optimistic concurrency check failed on {collection} (expected: {expected:?}, actual: {actual})")]
    Conflict {
        collection: Collection,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("invalid commit: {0}")]
    InvalidCommit(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Load-entire-collection / commit-entire-collections persistence surface.
///
/// ## Commit semantics
///
/// `commit()`:
/// - rejects a batch naming the same collection twice
/// - checks **every** expected version before writing anything
/// - replaces every named collection, or none of them
/// - bumps each written collection's version by one and returns the new
///   versions in batch order
///
/// Writers are serialized inside the store, so a load → decide → commit
/// sequence that passes the version check saw no interleaved write.
pub trait DataStore: Send + Sync {
    fn load(&self, collection: Collection) -> Result<Snapshot, StoreError>;

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<Vec<u64>, StoreError>;
}

impl<S> DataStore for Arc<S>
where
    S: DataStore + ?Sized,
{
    fn load(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        (**self).load(collection)
    }

    fn commit(&self, writes: Vec<CollectionWrite>) -> Result<Vec<u64>, StoreError> {
        (**self).commit(writes)
    }
}

/// Load and deserialize one collection.
pub fn load_typed<T, S>(store: &S, collection: Collection) -> Result<Versioned<T>, StoreError>
where
    T: DeserializeOwned,
    S: DataStore + ?Sized,
{
    let snapshot = store.load(collection)?;
    let records = snapshot
        .records
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| StoreError::Serialization(format!("{collection}: {e}")))?;
    Ok(Versioned {
        version: snapshot.version,
        records,
    })
}

/// Shared pre-write validation: no duplicate collections, all versions match.
pub(crate) fn check_commit(
    writes: &[CollectionWrite],
    current_version: impl Fn(Collection) -> u64,
) -> Result<(), StoreError> {
    for (idx, w) in writes.iter().enumerate() {
        if writes[..idx].iter().any(|prev| prev.collection == w.collection) {
            return Err(StoreError::InvalidCommit(format!(
                "batch names {} more than once (index {idx})",
                w.collection
            )));
        }
        let actual = current_version(w.collection);
        if !w.expected.matches(actual) {
            return Err(StoreError::Conflict {
                collection: w.collection,
                expected: w.expected,
                actual,
            });
        }
    }
    Ok(())
}

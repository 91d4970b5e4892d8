//! Optimistic concurrency expectations for persisted collections.

/// Expected version of a persisted collection at commit time.
///
/// Every collection carries a monotonically increasing version (0 means the
/// collection was never written). Writers load a snapshot, decide, and commit
/// with the version they loaded; a mismatch means someone else wrote in
/// between.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (seeding, migrations).
    Any,
    /// Require the collection to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

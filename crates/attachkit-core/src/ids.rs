//! Client-scoped upload item ids.
//!
//! Queue items need an identifier before the server has seen the file, so
//! ids are minted locally: the seven low-order digits of the current
//! millisecond timestamp followed by a monotonically increasing sequence
//! number padded to three digits. Ten characters for the first thousand
//! ids, unique for the lifetime of the generator, never persisted, and
//! structurally disjoint from the server's `Uuid`s.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Client-generated id for a queued upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadItemId(String);

impl UploadItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues [`UploadItemId`]s. Cheap to clone; clones share the sequence.
#[derive(Debug, Clone, Default)]
pub struct UploadIdGenerator {
    seq: Arc<AtomicU64>,
}

impl UploadIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> UploadItemId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        // The sequence is never truncated, so two ids can only collide if
        // both the timestamp slice and the sequence match, and the sequence
        // never repeats.
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        UploadItemId(format!("{:07}{:03}", millis % 10_000_000, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_ten_digits_initially() {
        let gen = UploadIdGenerator::new();
        let id = gen.next_id();
        assert_eq!(id.as_str().len(), 10);
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn tight_loop_yields_distinct_ids() {
        let gen = UploadIdGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(gen.next_id()));
        }
    }

    #[test]
    fn clones_share_the_sequence() {
        let gen = UploadIdGenerator::new();
        let other = gen.clone();
        let a = gen.next_id();
        let b = other.next_id();
        assert_ne!(a, b);
    }
}

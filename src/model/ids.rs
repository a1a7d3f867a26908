use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_DRAFT: AtomicU64 = AtomicU64::new(1);

/// Identity of a query draft for the lifetime of the process.
///
/// Allocated from a monotonic counter, so an id is never reused and never
/// tied to a draft's position in the collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(String);

impl DraftId {
    pub fn fresh() -> Self {
        let n = NEXT_DRAFT.fetch_add(1, Ordering::Relaxed);
        DraftId(format!("q-{}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

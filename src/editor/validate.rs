//! Whether drafts are complete enough to save.

use crate::model::{Draft, QueryConfig};

/// A query can be saved if it has raw text, or if the builder has picked a
/// measurement, a database and at least one field.
pub fn is_query_savable(q: &QueryConfig) -> bool {
    q.raw_text().is_some()
        || (!q.measurement.is_empty() && !q.database.is_empty() && !q.fields.is_empty())
}

/// Every draft must be savable for the cell to be savable.
pub fn is_savable(drafts: &[Draft]) -> bool {
    drafts.iter().all(|d| is_query_savable(d.config()))
}

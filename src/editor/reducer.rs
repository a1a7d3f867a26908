//! Dispatches registry transforms against the draft store.

use super::store::DraftStore;
use super::transform::Transform;
use crate::model::{Draft, DraftId, QueryConfig, SourceLink};

/// Source a draft should carry after an edit: the edited draft's own source
/// if it has one, else the one it had before.
pub fn reconcile_source(prev: &Draft, next: &Draft) -> Option<SourceLink> {
    next.config()
        .source
        .clone()
        .or_else(|| prev.config().source.clone())
}

impl DraftStore {
    /// Apply `transform` to the draft identified by `id`.
    ///
    /// An id that is no longer in the collection is ignored: a delete may land
    /// between a user action and its dispatch, and the edit is then moot.
    /// Returns whether a draft was updated.
    pub fn dispatch(&mut self, id: &DraftId, transform: &Transform) -> bool {
        let updated = self.replace_with(id, |prev| {
            let next = transform.apply(prev);
            let source = reconcile_source(prev, &next);
            next.with_config(QueryConfig {
                source,
                ..next.config().clone()
            })
        });

        if updated {
            let revision = self.bump_revision(id);
            tracing::trace!(draft = %id, op = transform.name(), revision, "draft edited");
        } else {
            tracing::debug!(draft = %id, op = transform.name(), "edit for unknown draft ignored");
        }
        updated
    }
}

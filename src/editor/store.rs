//! Working set of query drafts while the editor is open.

use std::collections::HashMap;

use crate::model::{Draft, DraftId, QueryConfig, QueryStatus, SourceLink};

/// Result of merging a parse-service resolution into the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    /// The draft was edited after the request was issued.
    Stale,
    /// The draft no longer exists.
    Missing,
}

#[derive(Debug)]
pub struct DraftStore {
    drafts: Vec<Draft>,
    active: usize,
    display_options_active: bool,
    static_legend: bool,

    // Bumped on every edit of a draft; tags in-flight raw text resolutions.
    revisions: HashMap<DraftId, u64>,
}

impl DraftStore {
    /// Build the store; an empty `drafts` gets one blank draft so the
    /// collection is never empty.
    pub fn new(mut drafts: Vec<Draft>, static_legend: bool) -> Self {
        if drafts.is_empty() {
            drafts.push(Draft::empty());
        }
        Self {
            drafts,
            active: 0,
            display_options_active: false,
            static_legend,
            revisions: HashMap::new(),
        }
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active draft, or the first one if the index is out of range.
    pub fn active_draft(&self) -> &Draft {
        self.drafts.get(self.active).unwrap_or(&self.drafts[0])
    }

    pub fn draft(&self, id: &DraftId) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.id() == id)
    }

    pub fn is_display_options_active(&self) -> bool {
        self.display_options_active
    }

    pub fn is_static_legend(&self) -> bool {
        self.static_legend
    }

    /// Append a blank draft and make it active.
    pub fn add_draft(&mut self) -> DraftId {
        let draft = Draft::empty();
        let id = draft.id().clone();
        self.drafts.push(draft);
        self.active = self.drafts.len() - 1;
        id
    }

    /// Remove the draft at `index`.
    ///
    /// The active index is left alone; callers follow up with
    /// [`DraftStore::set_active_index`]. Removing the only draft, or an index
    /// past the end, is refused.
    pub fn remove_draft(&mut self, index: usize) -> Option<Draft> {
        if index >= self.drafts.len() || self.drafts.len() == 1 {
            tracing::debug!(index, len = self.drafts.len(), "draft removal refused");
            return None;
        }
        let removed = self.drafts.remove(index);
        self.revisions.remove(removed.id());
        Some(removed)
    }

    pub fn set_active_index(&mut self, index: usize) {
        self.active = index;
    }

    /// Point every draft at `link`.
    pub fn set_source_for_all(&mut self, link: &SourceLink) {
        self.drafts = self
            .drafts
            .iter()
            .map(|d| {
                d.with_config(QueryConfig {
                    source: Some(link.clone()),
                    ..d.config().clone()
                })
            })
            .collect();
    }

    pub fn toggle_display_options(&mut self, active: bool) {
        self.display_options_active = active;
    }

    pub fn toggle_static_legend(&mut self, active: bool) {
        self.static_legend = active;
    }

    /// Record an execution status reported for one draft.
    pub fn apply_status_update(&mut self, id: &DraftId, status: QueryStatus) {
        self.replace_with(id, |d| {
            d.with_config(QueryConfig {
                status: Some(status.clone()),
                ..d.config().clone()
            })
        });
    }

    /// Current edit revision of a draft.
    pub fn revision(&self, id: &DraftId) -> Option<u64> {
        self.draft(id)
            .map(|_| self.revisions.get(id).copied().unwrap_or(0))
    }

    /// Merge a config returned by the parse service.
    ///
    /// Source and status stay with the draft; the service owns neither. The
    /// merge is skipped when the draft was edited after `revision` was taken.
    pub fn merge_resolved(
        &mut self,
        id: &DraftId,
        revision: u64,
        resolved: QueryConfig,
    ) -> MergeOutcome {
        let Some(current) = self.revision(id) else {
            return MergeOutcome::Missing;
        };
        if current != revision {
            return MergeOutcome::Stale;
        }
        self.replace_with(id, |d| {
            d.with_config(QueryConfig {
                source: d.config().source.clone(),
                status: d.config().status.clone(),
                ..resolved.clone()
            })
        });
        MergeOutcome::Applied
    }

    /// Swap one draft for `f(draft)` in place, keeping every other element
    /// and the order untouched. Returns false if `id` is not present.
    pub(super) fn replace_with(&mut self, id: &DraftId, f: impl FnOnce(&Draft) -> Draft) -> bool {
        let Some(pos) = self.drafts.iter().position(|d| d.id() == id) else {
            return false;
        };
        let next = f(&self.drafts[pos]);
        debug_assert_eq!(next.id(), id);
        self.drafts[pos] = next;
        true
    }

    pub(super) fn bump_revision(&mut self, id: &DraftId) -> u64 {
        let r = self.revisions.entry(id.clone()).or_insert(0);
        *r += 1;
        *r
    }
}

#[cfg(test)]
#[path = "../tests/editor/store_tests.rs"]
mod tests;

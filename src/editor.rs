//! The cell editor overlay.
//!
//! A [`CellEditor`] is created when the overlay opens and dropped when it
//! closes. It owns the working drafts and is the only writer to them; renderers
//! read a snapshot through [`CellEditor::store`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::{
    Cell, Draft, DraftId, Field, QueryConfig, QueryStatus, Source, SourceLink, Template, TimeRange,
};
use crate::remote::ParseService;

mod input;
mod keys;
mod reducer;
mod resolver;
mod save;
mod store;
mod transform;
mod validate;

pub use self::input::Input;
pub use self::keys::{FocusTarget, InputField, KeyEffect, has_save_modifier, interpret};
pub use self::reducer::reconcile_source;
pub use self::resolver::{RawTextResolver, Resolution, ResolveError};
pub use self::save::{CellPalettes, ColorAssigner, assemble_cell, resolve_query_text};
pub use self::store::{DraftStore, MergeOutcome};
pub use self::transform::Transform;
pub use self::validate::{is_query_savable, is_savable};

/// Delay between blurring a focused input and the save it precedes.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(50);

/// Receives the overlay's result. Exactly one of the two is called per
/// user-triggered save or cancel.
pub trait CellSink {
    fn on_save(&mut self, cell: Cell);
    fn on_cancel(&mut self);
}

/// Everything the overlay is opened with.
#[derive(Clone, Debug)]
pub struct EditorInputs {
    pub cell: Cell,
    pub sources: Vec<Source>,
    pub default_source: Source,
    pub templates: Vec<Template>,
    pub time_range: TimeRange,
    pub auto_refresh: Duration,
    pub palettes: CellPalettes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Open,
    Saved,
    Cancelled,
}

pub struct CellEditor {
    inputs: EditorInputs,
    store: DraftStore,

    // None once a blur has dropped focus and nothing has taken it yet.
    focus: Option<FocusTarget>,
    input: Input,
    editing: Option<DraftId>,

    resolver: RawTextResolver,
    save_delay: Duration,
    pending_save: Option<Instant>,
    state: EditorState,
}

impl CellEditor {
    pub fn open(
        inputs: EditorInputs,
        service: Arc<dyn ParseService>,
        save_delay: Duration,
    ) -> Self {
        let link = inputs
            .cell
            .queries
            .first()
            .and_then(|q| q.source.clone())
            .unwrap_or_else(|| inputs.default_source.link());

        let mut drafts: Vec<Draft> = inputs
            .cell
            .queries
            .iter()
            .map(|q| {
                Draft::new(QueryConfig {
                    source: Some(link.clone()),
                    status: None,
                    ..q.query_config.clone()
                })
            })
            .collect();
        if drafts.is_empty() {
            drafts.push(Draft::new(QueryConfig {
                source: Some(link),
                ..QueryConfig::default()
            }));
        }

        let store = DraftStore::new(drafts, inputs.cell.legend.is_static());
        tracing::debug!(cell = %inputs.cell.i, drafts = store.len(), "cell editor opened");

        Self {
            inputs,
            store,
            focus: Some(FocusTarget::Container),
            input: Input::default(),
            editing: None,
            resolver: RawTextResolver::new(service),
            save_delay,
            pending_save: None,
            state: EditorState::Open,
        }
    }

    /// Tear the overlay down. In-flight resolutions are dropped.
    pub fn close(self) -> EditorState {
        tracing::debug!(cell = %self.inputs.cell.i, state = ?self.state, "cell editor closed");
        self.state
    }

    pub fn inputs(&self) -> &EditorInputs {
        &self.inputs
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == EditorState::Open
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_some()
    }

    pub fn pending_resolutions(&self) -> usize {
        self.resolver.in_flight()
    }

    pub fn dispatch(&mut self, id: &DraftId, transform: &Transform) -> bool {
        self.store.dispatch(id, transform)
    }

    pub fn add_query(&mut self) -> DraftId {
        self.store.add_draft()
    }

    /// Remove the query at `index` and pick the next active one.
    ///
    /// The last remaining query cannot be removed.
    pub fn delete_query(&mut self, index: usize) -> bool {
        if self.store.len() <= 1 {
            tracing::debug!(index, "refusing to delete the only query");
            return false;
        }
        if self.store.remove_draft(index).is_none() {
            return false;
        }

        let active = self.store.active_index();
        let next = if index < active {
            active - 1
        } else {
            active.min(self.store.len() - 1)
        };
        self.store.set_active_index(next);
        true
    }

    pub fn set_active_query(&mut self, index: usize) -> bool {
        if index >= self.store.len() {
            return false;
        }
        self.store.set_active_index(index);
        true
    }

    pub fn set_query_source(&mut self, source: &Source) {
        self.store.set_source_for_all(&source.link());
    }

    pub fn toggle_display_options(&mut self, active: bool) {
        self.store.toggle_display_options(active);
    }

    pub fn toggle_static_legend(&mut self, active: bool) {
        self.store.toggle_static_legend(active);
    }

    pub fn apply_status_update(&mut self, id: &DraftId, status: QueryStatus) {
        self.store.apply_status_update(id, status);
    }

    fn find_source(&self, link: &SourceLink) -> Option<&Source> {
        self.inputs
            .sources
            .iter()
            .find(|s| s.links.self_link == link.as_str())
    }

    /// Source the query builder works against: the first draft's, falling
    /// back to the default source.
    pub fn effective_source(&self) -> &Source {
        self.store.drafts()[0]
            .config()
            .source
            .as_ref()
            .and_then(|link| self.find_source(link))
            .unwrap_or(&self.inputs.default_source)
    }

    /// Label for the source selector.
    pub fn selected_source_label(&self) -> String {
        let found = match self.store.drafts()[0].config().source.as_ref() {
            Some(link) => self.find_source(link),
            None => self
                .inputs
                .sources
                .iter()
                .find(|s| s.id == self.inputs.default_source.id),
        };
        found
            .map(Source::label)
            .unwrap_or_else(|| "No sources".to_string())
    }

    /// Store `text` on the draft and resolve it through the parse service.
    pub fn submit_raw_text(&mut self, id: &DraftId, text: &str) {
        if !self.store.dispatch(id, &Transform::EditRawText(text.to_string())) {
            return;
        }
        let Some(revision) = self.store.revision(id) else {
            return;
        };
        let endpoint = self.effective_source().links.queries.clone();
        self.resolver.submit(
            &endpoint,
            id.clone(),
            revision,
            text.to_string(),
            &self.inputs.templates,
        );
    }

    /// Merge every resolution that has completed. Returns how many merged.
    pub fn poll_resolutions(&mut self) -> usize {
        let done = self.resolver.drain();
        self.merge_resolutions(done)
    }

    /// Block up to `timeout` for each outstanding resolution, then merge.
    pub fn wait_for_resolutions(&mut self, timeout: Duration) -> usize {
        let mut done = Vec::new();
        while self.resolver.in_flight() > 0 {
            match self.resolver.wait(timeout) {
                Some(r) => done.push(r),
                None => break,
            }
        }
        self.merge_resolutions(done)
    }

    fn merge_resolutions(&mut self, done: Vec<Resolution>) -> usize {
        let mut merged = 0;
        for r in done {
            match r.result {
                Ok(config) => match self.store.merge_resolved(&r.draft, r.revision, config) {
                    MergeOutcome::Applied => merged += 1,
                    MergeOutcome::Stale => {
                        tracing::debug!(draft = %r.draft, revision = r.revision, "discarding stale resolution");
                    }
                    MergeOutcome::Missing => {
                        tracing::debug!(draft = %r.draft, "resolution for removed draft ignored");
                    }
                },
                Err(err) => {
                    tracing::warn!(draft = %r.draft, error = %err, "raw text resolution failed");
                }
            }
        }
        merged
    }

    pub fn is_savable(&self) -> bool {
        is_savable(self.store.drafts())
    }

    /// Hand the assembled cell to `sink`. Does nothing unless every draft is
    /// savable and the overlay is still open.
    pub fn save(&mut self, sink: &mut dyn CellSink) -> bool {
        self.pending_save = None;
        if !self.is_open() {
            return false;
        }
        if !self.is_savable() {
            tracing::info!(cell = %self.inputs.cell.i, "save ignored: queries incomplete");
            return false;
        }

        let cell = assemble_cell(
            &self.inputs.cell,
            self.store.drafts(),
            self.store.is_static_legend(),
            &self.inputs.palettes,
        );
        tracing::info!(cell = %cell.i, queries = cell.queries.len(), "saving cell");
        self.state = EditorState::Saved;
        sink.on_save(cell);
        true
    }

    pub fn cancel(&mut self, sink: &mut dyn CellSink) {
        if !self.is_open() {
            return;
        }
        self.pending_save = None;
        self.state = EditorState::Cancelled;
        sink.on_cancel();
    }

    pub fn focus_container(&mut self) {
        self.blur();
        self.focus = Some(FocusTarget::Container);
    }

    pub fn focus_control(&mut self, target: FocusTarget) {
        self.blur();
        self.focus = Some(target);
    }

    /// Focus a text input on the active draft, loading its current value.
    pub fn focus_input(&mut self, field: InputField) {
        self.blur();
        let draft = self.store.active_draft();
        self.input = Input::new(&field_value(draft.config(), field));
        self.editing = Some(draft.id().clone());
        self.focus = Some(FocusTarget::Input(field));
    }

    /// Drop focus, committing a focused input's value first.
    pub fn blur(&mut self) {
        if let Some(FocusTarget::Input(field)) = self.focus
            && let Some(id) = self.editing.take()
        {
            let text = std::mem::take(&mut self.input).buf;
            self.commit_input(&id, field, text.trim());
        }
        self.focus = None;
    }

    fn commit_input(&mut self, id: &DraftId, field: InputField, text: &str) {
        let Some(draft) = self.store.draft(id) else {
            return;
        };
        let current = draft.config().clone();
        if field_value(&current, field) == text {
            return;
        }

        let none_if_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        match field {
            InputField::RawText => {
                if text.is_empty() {
                    self.store.dispatch(id, &Transform::ClearRawText);
                } else {
                    self.submit_raw_text(id, text);
                }
            }
            InputField::Database => {
                self.store.dispatch(
                    id,
                    &Transform::ChooseNamespace {
                        database: text.to_string(),
                        retention_policy: current.retention_policy.clone(),
                    },
                );
            }
            InputField::RetentionPolicy => {
                self.store.dispatch(
                    id,
                    &Transform::ChooseNamespace {
                        database: current.database.clone(),
                        retention_policy: text.to_string(),
                    },
                );
            }
            InputField::Measurement => {
                self.store
                    .dispatch(id, &Transform::ChooseMeasurement(text.to_string()));
            }
            InputField::Fields => {
                for t in field_edits(&current.fields, &parse_field_list(text)) {
                    self.store.dispatch(id, &t);
                }
            }
            InputField::GroupByTime => {
                self.store
                    .dispatch(id, &Transform::GroupByTime(none_if_empty(text)));
            }
            InputField::TimeRange => {
                let range = none_if_empty(text).map(|l| TimeRange::relative(&l));
                self.store.dispatch(id, &Transform::SetTimeRange(range));
            }
        }
    }

    /// Run the overlay key bindings. Returns false if the key had no
    /// overlay-level meaning and should be handled by the focused element.
    pub fn handle_key(
        &mut self,
        key: &crossterm::event::KeyEvent,
        now: Instant,
        sink: &mut dyn CellSink,
    ) -> bool {
        let target = self.focus.unwrap_or(FocusTarget::Container);
        let effects = interpret(key, target, self.save_delay);
        for effect in &effects {
            match *effect {
                KeyEffect::Save => {
                    self.save(sink);
                }
                KeyEffect::SaveAfter(delay) => self.pending_save = Some(now + delay),
                KeyEffect::Cancel => self.cancel(sink),
                KeyEffect::Blur => self.blur(),
                KeyEffect::FocusContainer => self.focus = Some(FocusTarget::Container),
            }
        }
        !effects.is_empty()
    }

    /// Advance timers and merge finished resolutions.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn CellSink) {
        self.poll_resolutions();
        if self.pending_save.is_some_and(|due| now >= due) {
            self.save(sink);
        }
    }
}

/// Text shown in an input for the current config.
pub fn field_value(q: &QueryConfig, field: InputField) -> String {
    match field {
        InputField::RawText => q.raw_text.clone().unwrap_or_default(),
        InputField::Database => q.database.clone(),
        InputField::RetentionPolicy => q.retention_policy.clone(),
        InputField::Measurement => q.measurement.clone(),
        InputField::Fields => q
            .fields
            .iter()
            .map(|f| match &f.func {
                Some(func) => format!("{}({})", func, f.value),
                None => f.value.clone(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        InputField::GroupByTime => q.group_by.time.clone().unwrap_or_default(),
        InputField::TimeRange => q.range.as_ref().map(|r| r.lower.clone()).unwrap_or_default(),
    }
}

/// Parse `mean(usage_idle), usage_user` into fields.
fn parse_field_list(text: &str) -> Vec<Field> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.split_once('(') {
            Some((func, rest)) if rest.ends_with(')') => {
                Field::with_func(rest.trim_end_matches(')').trim(), func.trim())
            }
            _ => Field::new(s),
        })
        .collect()
}

/// Registry edits that turn `current` into `wanted`.
fn field_edits(current: &[Field], wanted: &[Field]) -> Vec<Transform> {
    let mut out = Vec::new();
    for f in current {
        if !wanted.iter().any(|w| w.value == f.value) {
            out.push(Transform::RemoveField(f.value.clone()));
        }
    }
    for w in wanted {
        match current.iter().find(|f| f.value == w.value) {
            None => out.push(Transform::AddField(w.clone())),
            Some(f) if f.func != w.func => out.push(Transform::ApplyFunc {
                field: w.value.clone(),
                func: w.func.clone(),
            }),
            Some(_) => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/editor/editor_tests.rs"]
mod tests;

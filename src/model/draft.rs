use super::{DraftId, QueryConfig};

/// One query being edited inside the overlay.
///
/// The id is fixed at construction. Edits produce a new draft through
/// [`Draft::with_config`] rather than mutating fields in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    id: DraftId,
    config: QueryConfig,
}

impl Draft {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            id: DraftId::fresh(),
            config,
        }
    }

    pub fn empty() -> Self {
        Self::new(QueryConfig::default())
    }

    pub fn id(&self) -> &DraftId {
        &self.id
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn with_config(&self, config: QueryConfig) -> Self {
        Self {
            id: self.id.clone(),
            config,
        }
    }
}

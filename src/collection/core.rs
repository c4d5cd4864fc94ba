use crate::document::Document;
use crate::types::DocumentId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// An in-memory collection. Iteration follows insertion order (the natural order).
pub struct Collection {
    pub(crate) name: String,
    pub(crate) state: RwLock<CollectionState>,
}

#[derive(Default)]
pub(crate) struct CollectionState {
    pub(crate) docs: BTreeMap<u64, Document>,
    pub(crate) ids: HashMap<DocumentId, u64>,
    pub(crate) next_seq: u64,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: RwLock::new(CollectionState::default()) }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).field("len", &self.len()).finish()
    }
}

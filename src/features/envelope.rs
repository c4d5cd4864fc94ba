use crate::document::Document;
use serde::Serialize;

use super::pagination::PageMetadata;

/// The one transport contract for list queries: records plus count metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub records: Vec<Document>,
    pub metadata: PageMetadata,
}

impl ResultSet {
    #[must_use]
    pub fn new(records: Vec<Document>, metadata: PageMetadata) -> Self {
        Self { records, metadata }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// # Errors
    /// Fails only if a record cannot be represented as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

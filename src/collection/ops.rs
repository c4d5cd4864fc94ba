use super::core::Collection;
use crate::document::Document;
use crate::errors::DbError;
use crate::types::DocumentId;
use bson::Document as BsonDocument;

impl Collection {
    /// # Errors
    /// Returns `InvalidDocumentId` when a document with the same `_id` is already stored.
    pub fn insert_document(&self, document: Document) -> Result<DocumentId, DbError> {
        let mut st = self.state.write();
        let id = document.id;
        if st.ids.contains_key(&id) {
            return Err(DbError::InvalidDocumentId(format!("duplicate _id {id} in {}", self.name)));
        }
        let seq = st.next_seq;
        st.next_seq += 1;
        st.ids.insert(id, seq);
        st.docs.insert(seq, document);
        log::debug!("insert {} into {}", id, self.name);
        Ok(id)
    }

    /// # Errors
    /// Propagates `_id` validation and duplicate-key failures.
    pub fn insert(&self, data: BsonDocument) -> Result<DocumentId, DbError> {
        self.insert_document(Document::new(data)?)
    }

    #[must_use]
    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        let st = self.state.read();
        st.ids.get(id).and_then(|seq| st.docs.get(seq)).cloned()
    }

    /// Visits documents in natural order under the read lock.
    pub fn for_each<F: FnMut(&Document)>(&self, mut f: F) {
        for d in self.state.read().docs.values() {
            f(d);
        }
    }
}

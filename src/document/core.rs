use crate::document::types::Metadata;
use crate::errors::DbError;
use crate::types::DocumentId;
use crate::utils::json::document_to_json;
use bson::{Bson, Document as BsonDocument};
use serde::{Serialize, Serializer};

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    /// Always carries `_id` as its first key.
    pub data: BsonDocument,
    pub metadata: Metadata,
}

impl Document {
    /// Wraps `data`, taking its `_id` when present or assigning a fresh one.
    ///
    /// # Errors
    /// Returns `InvalidDocumentId` when `_id` is present but is neither an ObjectId nor its hex form.
    pub fn new(data: BsonDocument) -> Result<Self, DbError> {
        let id = match data.get(ID_FIELD) {
            None => DocumentId::new(),
            Some(v) => DocumentId::from_bson(v)
                .ok_or_else(|| DbError::InvalidDocumentId(format!("{v}")))?,
        };
        Ok(Self { id, data: with_id_first(id, data), metadata: Metadata::new() })
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(document_to_json(&self.data))
    }
}

fn with_id_first(id: DocumentId, data: BsonDocument) -> BsonDocument {
    let mut out = BsonDocument::new();
    out.insert(ID_FIELD, Bson::ObjectId(id.0));
    for (k, v) in data {
        if k != ID_FIELD {
            out.insert(k, v);
        }
    }
    out
}

// Transport form: the data as a plain JSON object.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        document_to_json(&self.data).serialize(serializer)
    }
}

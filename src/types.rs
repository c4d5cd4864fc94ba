use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub type CollectionName = String;

/// Identity of a stored document; mirrors the `_id` field inside its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub ObjectId);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parses a 24-character hex id as sent in query strings and references.
    #[must_use]
    pub fn parse_hex(s: &str) -> Option<Self> {
        if s.len() != 24 {
            return None;
        }
        ObjectId::parse_str(s).ok().map(Self)
    }

    /// Resolves a reference value stored in a document.
    #[must_use]
    pub fn from_bson(v: &bson::Bson) -> Option<Self> {
        match v {
            bson::Bson::ObjectId(oid) => Some(Self(*oid)),
            bson::Bson::String(s) => Self::parse_hex(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// `chrono::DateTime<Utc>` serialized as RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializableDateTime(pub DateTime<Utc>);

impl Serialize for SerializableDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for SerializableDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let dt =
            DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)?.with_timezone(&Utc);
        Ok(Self(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_rejects_wrong_length() {
        assert!(DocumentId::parse_hex("abc").is_none());
        assert!(DocumentId::parse_hex("zzzzzzzzzzzzzzzzzzzzzzzz").is_none());
        let id = DocumentId::new();
        assert_eq!(DocumentId::parse_hex(&id.to_hex()), Some(id));
    }

    #[test]
    fn from_bson_accepts_oid_and_hex_string() {
        let id = DocumentId::new();
        assert_eq!(DocumentId::from_bson(&bson::Bson::ObjectId(id.0)), Some(id));
        assert_eq!(DocumentId::from_bson(&bson::Bson::String(id.to_hex())), Some(id));
        assert_eq!(DocumentId::from_bson(&bson::Bson::Int32(3)), None);
    }

    #[test]
    fn datetime_roundtrips_through_rfc3339() {
        let now = SerializableDateTime(Utc::now());
        let s = serde_json::to_string(&now).unwrap();
        let back: SerializableDateTime = serde_json::from_str(&s).unwrap();
        assert_eq!(back, now);
    }
}

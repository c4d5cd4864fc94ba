//! JSON <-> BSON conversion for fixtures, filter payloads and transport.
//!
//! Input side understands the two extended-JSON wrappers fixtures use (`{"$oid": ..}` and
//! `{"$date": ..}`). Output side produces plain JSON: ids as hex strings, dates as RFC 3339.

use bson::{Bson, Document as BsonDocument};
use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use std::io;

#[must_use]
pub fn json_to_bson(val: &Value) -> Bson {
    match val {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => number_to_bson(n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(obj) => {
            if let Some(b) = extended_scalar(obj) {
                return b;
            }
            Bson::Document(object_to_document(obj))
        }
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32);
    }
    Bson::Double(n.as_f64().unwrap_or(f64::NAN))
}

fn extended_scalar(obj: &Map<String, Value>) -> Option<Bson> {
    if obj.len() != 1 {
        return None;
    }
    match obj.iter().next() {
        Some((k, Value::String(s))) if k == "$oid" => {
            bson::oid::ObjectId::parse_str(s).ok().map(Bson::ObjectId)
        }
        Some((k, Value::String(s))) if k == "$date" => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis()))),
        _ => None,
    }
}

#[must_use]
pub fn object_to_document(obj: &Map<String, Value>) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (k, v) in obj {
        out.insert(k.clone(), json_to_bson(v));
    }
    out
}

/// Convert a serde_json::Value that must be an object into a bson::Document.
/// Returns io::Error with InvalidData on malformed input.
pub fn json_value_to_bson_document(val: &Value) -> io::Result<BsonDocument> {
    let obj = val
        .as_object()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "expected JSON object"))?;
    Ok(object_to_document(obj))
}

/// Parse a JSON string into a bson::Document. The JSON must be a top-level object.
pub fn parse_json_to_bson_document(json: &str) -> io::Result<BsonDocument> {
    let val: Value =
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json_value_to_bson_document(&val)
}

#[must_use]
pub fn bson_to_json(val: &Bson) -> Value {
    match val {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map_or(Value::Null, |d| Value::String(d.to_rfc3339())),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(d) => Value::Object(document_to_json(d)),
        other => Value::String(other.to_string()),
    }
}

#[must_use]
pub fn document_to_json(doc: &BsonDocument) -> Map<String, Value> {
    doc.iter().map(|(k, v)| (k.clone(), bson_to_json(v))).collect()
}

/// Schema-less cast of a query-string scalar.
///
/// Only canonical spellings are cast, so `007`, `+1`, `1e3` and `2.` stay strings.
#[must_use]
pub fn coerce_query_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if is_canonical_integer(raw)
        && let Ok(i) = raw.parse::<i64>()
    {
        return Value::from(i);
    }
    if is_canonical_decimal(raw)
        && let Ok(f) = raw.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && s != "-0"
}

fn is_canonical_decimal(s: &str) -> bool {
    let Some((int, frac)) = s.split_once('.') else {
        return false;
    };
    (is_canonical_integer(int) || int == "-0")
        && !frac.is_empty()
        && frac.bytes().all(|b| b.is_ascii_digit())
}

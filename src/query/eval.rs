use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, Projection, SortSpec};
use crate::document::ID_FIELD;

#[must_use]
pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Cmp { path, op, value } => match get_path(doc, path) {
            Some(v) => matches_cmp(v, *op, value),
            // a missing field only equals null
            None => *op == CmpOp::Eq && matches!(value, Bson::Null),
        },
        Filter::In { path, values } => match get_path(doc, path) {
            Some(whole @ Bson::Array(items)) => {
                values.iter().any(|q| loose_eq(whole, q))
                    || items.iter().any(|v| values.iter().any(|q| loose_eq(v, q)))
            }
            Some(v) => values.iter().any(|q| loose_eq(v, q)),
            None => values.iter().any(|q| matches!(q, Bson::Null)),
        },
    }
}

fn matches_cmp(v: &Bson, op: CmpOp, q: &Bson) -> bool {
    if let Bson::Array(items) = v
        && !matches!(q, Bson::Array(_))
    {
        return items.iter().any(|item| matches_cmp(item, op, q));
    }
    match op {
        CmpOp::Eq => loose_eq(v, q),
        CmpOp::Gt => comparable(v, q) && compare_bson(v, q) == Ordering::Greater,
        CmpOp::Gte => comparable(v, q) && compare_bson(v, q) != Ordering::Less,
        CmpOp::Lt => comparable(v, q) && compare_bson(v, q) == Ordering::Less,
        CmpOp::Lte => comparable(v, q) && compare_bson(v, q) != Ordering::Greater,
    }
}

/// Equality with the casts a schema-aware store would apply: numbers compare by value and an
/// ObjectId equals its hex string.
#[must_use]
pub fn loose_eq(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        _ if is_num(a) && is_num(b) => as_f64_num(a).total_cmp(&as_f64_num(b)) == Ordering::Equal,
        (Bson::ObjectId(o), Bson::String(s)) | (Bson::String(s), Bson::ObjectId(o)) => {
            o.to_hex() == s.to_ascii_lowercase()
        }
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        _ => a == b,
    }
}

// Range operators only match within one type bracket.
fn comparable(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return true;
    }
    matches!(
        (a, b),
        (Bson::String(_), Bson::String(_))
            | (Bson::Boolean(_), Bson::Boolean(_))
            | (Bson::DateTime(_), Bson::DateTime(_))
            | (Bson::ObjectId(_), Bson::ObjectId(_))
    )
}

#[must_use]
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let va = get_path(a, &s.field);
        let vb = get_path(b, &s.field);
        // missing sorts like null: first when ascending
        let ord = match (va, vb) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

#[must_use]
pub fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').peekable();
    let mut segs = 0usize;
    while let Some(part) = parts.next() {
        segs += 1;
        if segs > MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[must_use]
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Cross-type sort order of the document store: null < numbers < strings < objects < arrays < ...
fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 255,
        _ => 12,
    }
}

#[must_use]
pub fn apply_projection(doc: &BsonDocument, projection: &Projection) -> BsonDocument {
    match projection {
        Projection::Include { fields, keep_id } => {
            let mut out = BsonDocument::new();
            if *keep_id && let Some(id) = doc.get(ID_FIELD) {
                out.insert(ID_FIELD, id.clone());
            }
            for f in fields {
                if let Some(v) = get_path(doc, f) {
                    set_path(&mut out, f, v.clone());
                }
            }
            out
        }
        Projection::Exclude { fields } => {
            let mut out = doc.clone();
            for f in fields {
                unset_path(&mut out, f);
            }
            out
        }
    }
}

pub(crate) fn set_path(root: &mut BsonDocument, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            if !matches!(root.get(head), Some(Bson::Document(_))) {
                root.insert(head.to_string(), Bson::Document(BsonDocument::new()));
            }
            if let Some(Bson::Document(child)) = root.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

fn unset_path(root: &mut BsonDocument, path: &str) {
    match path.split_once('.') {
        None => {
            root.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(child)) = root.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

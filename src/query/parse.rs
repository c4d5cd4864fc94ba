//! Typed filter-expression parser.
//!
//! A filter payload is a JSON object of `field -> condition`. A condition is either a literal
//! (equality) or an object whose keys are all operator tokens (`gt`, `gte`, `lt`, `lte`, `in`,
//! bare or `$`-prefixed). Only those keys are ever treated as operators: field names and string
//! values that happen to spell an operator are left alone.

use crate::errors::DbError;
use crate::utils::json::json_to_bson;
use bson::Bson;
use serde_json::{Map, Value};

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH};

#[derive(Debug, Clone, Copy)]
pub struct FilterLimits {
    pub max_in_set: usize,
    pub max_path_depth: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self { max_in_set: MAX_IN_SET, max_path_depth: MAX_PATH_DEPTH }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpToken {
    Cmp(CmpOp),
    In,
}

fn op_token(key: &str) -> Option<OpToken> {
    match key.strip_prefix('$').unwrap_or(key) {
        "gt" => Some(OpToken::Cmp(CmpOp::Gt)),
        "gte" => Some(OpToken::Cmp(CmpOp::Gte)),
        "lt" => Some(OpToken::Cmp(CmpOp::Lt)),
        "lte" => Some(OpToken::Cmp(CmpOp::Lte)),
        "in" => Some(OpToken::In),
        _ => None,
    }
}

/// # Errors
/// Returns `BadRequest` for malformed JSON or an invalid filter structure.
pub fn parse_filter_json(json: &str, limits: &FilterLimits) -> Result<Filter, DbError> {
    let val: Value = serde_json::from_str(json)
        .map_err(|e| DbError::bad_request(format!("malformed filter JSON: {e}")))?;
    parse_filter_value(&val, limits)
}

/// # Errors
/// Returns `BadRequest` when the payload is not an object or a condition is invalid.
pub fn parse_filter_value(val: &Value, limits: &FilterLimits) -> Result<Filter, DbError> {
    let obj = val
        .as_object()
        .ok_or_else(|| DbError::bad_request("filter must be a JSON object"))?;
    parse_filter_object(obj, limits)
}

/// # Errors
/// Returns `BadRequest` when a field name or condition is invalid.
pub fn parse_filter_object(obj: &Map<String, Value>, limits: &FilterLimits) -> Result<Filter, DbError> {
    let mut parts = Vec::with_capacity(obj.len());
    for (field, cond) in obj {
        validate_path(field, limits)?;
        parts.push(field_condition(field, cond, limits)?);
    }
    Ok(Filter::and(parts))
}

fn validate_path(path: &str, limits: &FilterLimits) -> Result<(), DbError> {
    if path.is_empty() {
        return Err(DbError::bad_request("empty field name in filter"));
    }
    if path.starts_with('$') {
        return Err(DbError::bad_request(format!("operator '{path}' is not allowed as a field")));
    }
    let mut depth = 0usize;
    for seg in path.split('.') {
        depth += 1;
        if seg.is_empty() {
            return Err(DbError::bad_request(format!("invalid field path '{path}'")));
        }
    }
    if depth > limits.max_path_depth {
        return Err(DbError::bad_request(format!("field path '{path}' is too deep")));
    }
    Ok(())
}

fn field_condition(path: &str, cond: &Value, limits: &FilterLimits) -> Result<Filter, DbError> {
    let Value::Object(obj) = cond else {
        return Ok(Filter::eq(path, json_to_bson(cond)));
    };
    let ops: Vec<(Option<OpToken>, &String, &Value)> =
        obj.iter().map(|(k, v)| (op_token(k), k, v)).collect();
    if let Some((_, k, _)) = ops.iter().find(|(t, k, _)| t.is_none() && k.starts_with('$')) {
        return Err(DbError::bad_request(format!("unknown operator '{k}' on '{path}'")));
    }
    let n_ops = ops.iter().filter(|(t, _, _)| t.is_some()).count();
    if n_ops == 0 {
        // embedded document literal
        return Ok(Filter::eq(path, json_to_bson(cond)));
    }
    if n_ops != ops.len() {
        return Err(DbError::bad_request(format!(
            "condition on '{path}' mixes operators and field names"
        )));
    }
    let mut parts = Vec::with_capacity(ops.len());
    for (tok, _, v) in ops {
        match tok {
            Some(OpToken::Cmp(op)) => {
                parts.push(Filter::Cmp { path: path.to_string(), op, value: json_to_bson(v) });
            }
            Some(OpToken::In) => parts.push(in_condition(path, v, limits)?),
            None => {}
        }
    }
    Ok(Filter::and(parts))
}

fn in_condition(path: &str, v: &Value, limits: &FilterLimits) -> Result<Filter, DbError> {
    let values: Vec<Bson> = match v {
        Value::Array(items) => items.iter().map(json_to_bson).collect(),
        scalar => vec![json_to_bson(scalar)],
    };
    if values.len() > limits.max_in_set {
        return Err(DbError::bad_request(format!(
            "'in' on '{path}' has {} values (max {})",
            values.len(),
            limits.max_in_set
        )));
    }
    Ok(Filter::In { path: path.to_string(), values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Result<Filter, DbError> {
        parse_filter_value(&v, &FilterLimits::default())
    }

    #[test]
    fn operator_keys_become_comparisons() {
        let f = parse(json!({"price": {"gt": 100}})).unwrap();
        assert_eq!(f, Filter::Cmp { path: "price".into(), op: CmpOp::Gt, value: Bson::Int32(100) });
        let f = parse(json!({"price": {"$gte": 1, "$lt": 5}})).unwrap();
        assert!(matches!(f, Filter::And(ref v) if v.len() == 2));
    }

    #[test]
    fn operator_words_elsewhere_are_untouched() {
        // a field literally named `gt` and a value containing `in`
        let f = parse(json!({"gt": "login", "title": "gt in lt"})).unwrap();
        assert_eq!(f, Filter::And(vec![Filter::eq("gt", "login"), Filter::eq("title", "gt in lt")]));
    }

    #[test]
    fn in_accepts_array_or_scalar() {
        let f = parse(json!({"color": {"in": ["red", "blue"]}})).unwrap();
        assert_eq!(f, Filter::In { path: "color".into(), values: vec!["red".into(), "blue".into()] });
        let f = parse(json!({"color": {"in": "red"}})).unwrap();
        assert_eq!(f, Filter::In { path: "color".into(), values: vec!["red".into()] });
    }

    #[test]
    fn embedded_document_literal_is_equality() {
        let f = parse(json!({"dims": {"w": 1, "h": 2}})).unwrap();
        assert_eq!(f, Filter::eq("dims", Bson::Document(bson::doc! {"w": 1, "h": 2})));
    }

    #[test]
    fn empty_object_is_match_all() {
        assert_eq!(parse(json!({})).unwrap(), Filter::True);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(parse(json!([1, 2])).unwrap_err().is_bad_request());
        assert!(parse(json!({"$where": "1"})).unwrap_err().is_bad_request());
        assert!(parse(json!({"price": {"$regex": "x"}})).unwrap_err().is_bad_request());
        assert!(parse(json!({"price": {"gt": 1, "currency": "EUR"}})).unwrap_err().is_bad_request());
        assert!(parse(json!({"a..b": 1})).unwrap_err().is_bad_request());
        assert!(parse(json!({"": 1})).unwrap_err().is_bad_request());
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let e = parse_filter_json("{\"price\":", &FilterLimits::default()).unwrap_err();
        assert!(e.is_bad_request());
    }

    #[test]
    fn in_set_limit_enforced() {
        let limits = FilterLimits { max_in_set: 2, ..FilterLimits::default() };
        let e = parse_filter_value(&json!({"a": {"in": [1, 2, 3]}}), &limits).unwrap_err();
        assert!(e.is_bad_request());
    }

    #[test]
    fn path_depth_limit_enforced() {
        let limits = FilterLimits { max_path_depth: 2, ..FilterLimits::default() };
        assert!(parse_filter_value(&json!({"a.b": 1}), &limits).is_ok());
        assert!(parse_filter_value(&json!({"a.b.c": 1}), &limits).is_err());
    }
}

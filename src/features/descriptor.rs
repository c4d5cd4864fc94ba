//! Query Descriptor: the request's query-string parameters.

use crate::errors::DbError;
use crate::utils::json::coerce_query_scalar;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const SELECT: &str = "select";
pub const SORT: &str = "sort";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const FILTER: &str = "filter";

/// Keys the translator consumes itself; everything else is a field filter.
pub const RESERVED_KEYS: [&str; 5] = [SELECT, SORT, PAGE, LIMIT, FILTER];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query string (with or without leading `?`).
    #[must_use]
    pub fn from_query_string(qs: &str) -> Self {
        let qs = qs.strip_prefix('?').unwrap_or(qs);
        Self::from_pairs(url::form_urlencoded::parse(qs.as_bytes()))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut d = Self::default();
        for (k, v) in pairs {
            d.push(k, v);
        }
        d
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        self.params.entry(key).or_default().push(value.into());
    }

    /// Overlays preset parameters (e.g. an alias route's fixed `limit`/`sort`); preset keys win.
    #[must_use]
    pub fn with_preset<'a, I>(mut self, preset: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in preset {
            self.params.insert(k.to_string(), vec![v.to_string()]);
        }
        self
    }

    /// Last value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.last()).map(String::as_str)
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn select(&self) -> Option<&str> {
        self.get(SELECT)
    }

    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.get(SORT)
    }

    #[must_use]
    pub fn page(&self) -> Option<&str> {
        self.get(PAGE)
    }

    #[must_use]
    pub fn limit(&self) -> Option<&str> {
        self.get(LIMIT)
    }

    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.get(FILTER)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Non-reserved parameters in key order.
    pub fn residual(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Builds the filter object implied by the non-reserved parameters.
    ///
    /// Bracket keys nest (`price[gt]=1` gives `{"price": {"gt": 1}}`), repeated keys or `key[]`
    /// become membership (`{"key": {"in": [..]}}`), and scalars are cast from their canonical
    /// spelling.
    ///
    /// # Errors
    /// Returns `BadRequest` when two parameters address the same slot incompatibly, or when a
    /// bracketed key is rooted at a reserved name (`sort[]`, `filter[price]`).
    pub fn residual_filter(&self) -> Result<Map<String, Value>, DbError> {
        let mut root = Map::new();
        for (key, values) in self.residual() {
            let (mut segs, append) = split_brackets(key);
            if let Some(head) = segs.first()
                && RESERVED_KEYS.contains(&head.as_str())
            {
                return Err(DbError::bad_request(format!("'{head}' does not take brackets: '{key}'")));
            }
            let leaf = if append || values.len() > 1 {
                let arr = Value::Array(values.iter().map(|v| coerce_query_scalar(v)).collect());
                if segs.len() == 1 {
                    segs.push("in".to_string());
                }
                arr
            } else {
                values.last().map_or(Value::Null, |v| coerce_query_scalar(v))
            };
            insert_nested(&mut root, &segs, leaf, key)?;
        }
        Ok(root)
    }
}

/// `a[b][c]` -> (["a","b","c"], false); `a[]` -> (["a"], true). Malformed keys stay literal.
fn split_brackets(key: &str) -> (Vec<String>, bool) {
    let Some(open) = key.find('[') else {
        return (vec![key.to_string()], false);
    };
    if open == 0 || !key.ends_with(']') {
        return (vec![key.to_string()], false);
    }
    let head = &key[..open];
    let inner = &key[open + 1..key.len() - 1];
    let parts: Vec<&str> = inner.split("][").collect();
    if parts.iter().any(|p| p.contains('[') || p.contains(']')) {
        return (vec![key.to_string()], false);
    }
    let mut segs = vec![head.to_string()];
    let mut append = false;
    for (i, p) in parts.iter().enumerate() {
        if p.is_empty() {
            if i + 1 == parts.len() {
                append = true;
            } else {
                return (vec![key.to_string()], false);
            }
        } else {
            segs.push((*p).to_string());
        }
    }
    (segs, append)
}

fn insert_nested(
    root: &mut Map<String, Value>,
    segs: &[String],
    leaf: Value,
    key: &str,
) -> Result<(), DbError> {
    let conflict = || DbError::bad_request(format!("conflicting query parameter '{key}'"));
    let Some((last, parents)) = segs.split_last() else {
        return Ok(());
    };
    let mut cur = root;
    for seg in parents {
        let slot = cur.entry(seg.clone()).or_insert_with(|| Value::Object(Map::new()));
        cur = slot.as_object_mut().ok_or_else(conflict)?;
    }
    if cur.contains_key(last) {
        return Err(conflict());
    }
    cur.insert(last.clone(), leaf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_query_string_with_decoding() {
        let d = QueryDescriptor::from_query_string("?select=name,price&sort=-price&name=blue+mug&q=%7Bx%7D");
        assert_eq!(d.select(), Some("name,price"));
        assert_eq!(d.sort(), Some("-price"));
        assert_eq!(d.get("name"), Some("blue mug"));
        assert_eq!(d.get("q"), Some("{x}"));
        assert!(d.page().is_none());
    }

    #[test]
    fn reserved_keys_last_value_wins() {
        let d = QueryDescriptor::from_query_string("page=1&page=3");
        assert_eq!(d.page(), Some("3"));
        assert_eq!(d.get_all("page"), ["1", "3"]);
    }

    #[test]
    fn residual_excludes_reserved_keys() {
        let d = QueryDescriptor::from_pairs([("limit", "5"), ("status", "active"), ("filter", "{}")]);
        let keys: Vec<&str> = d.residual().map(|(k, _)| k).collect();
        assert_eq!(keys, ["status"]);
    }

    #[test]
    fn residual_filter_casts_and_nests() {
        let d = QueryDescriptor::from_query_string("status=active&price[gt]=100&price[lte]=250.5&stock=0");
        let f = d.residual_filter().unwrap();
        assert_eq!(
            Value::Object(f),
            json!({"status": "active", "price": {"gt": 100, "lte": 250.5}, "stock": 0})
        );
    }

    #[test]
    fn repeated_and_bracket_array_keys_become_in() {
        let d = QueryDescriptor::from_query_string("color=red&color=blue&size[]=42");
        let f = d.residual_filter().unwrap();
        assert_eq!(
            Value::Object(f),
            json!({"color": {"in": ["red", "blue"]}, "size": {"in": [42]}})
        );
    }

    #[test]
    fn conflicting_slots_are_rejected() {
        let d = QueryDescriptor::from_query_string("price=5&price[gt]=1");
        assert!(d.residual_filter().unwrap_err().is_bad_request());
    }

    #[test]
    fn bracketed_reserved_keys_are_rejected() {
        for qs in ["filter[price]=1", "sort[]=x", "limit[gt]=3", "status=active&page[]=2"] {
            let d = QueryDescriptor::from_query_string(qs);
            assert!(d.residual_filter().unwrap_err().is_bad_request(), "{qs}");
        }
        let d = QueryDescriptor::from_query_string("sorted[]=x&pages=2");
        assert_eq!(Value::Object(d.residual_filter().unwrap()), json!({"sorted": {"in": ["x"]}, "pages": 2}));
    }

    #[test]
    fn malformed_brackets_stay_literal() {
        assert_eq!(split_brackets("a[b"), (vec!["a[b".to_string()], false));
        assert_eq!(split_brackets("[x]"), (vec!["[x]".to_string()], false));
        assert_eq!(split_brackets("a[b][c]"), (vec!["a".into(), "b".into(), "c".into()], false));
        assert_eq!(split_brackets("a[]"), (vec!["a".to_string()], true));
    }

    #[test]
    fn preset_overrides_request_values() {
        let d = QueryDescriptor::from_query_string("limit=50&genre=men")
            .with_preset([("limit", "5"), ("sort", "price")]);
        assert_eq!(d.limit(), Some("5"));
        assert_eq!(d.sort(), Some("price"));
        assert_eq!(d.get("genre"), Some("men"));
    }
}

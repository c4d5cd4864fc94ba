use crate::query::{Order, SortSpec};

/// Parses a `sort` parameter: `price,-createdAt` sorts ascending by price, then newest first.
///
/// The older spelling with a leading direction token (`-1,price,name` or `1,price`) applies that
/// direction to every field that follows. Duplicate fields keep their first position; keys past
/// `max_fields` are dropped with a warning.
#[must_use]
pub fn parse_sort(raw: &str, max_fields: usize) -> Vec<SortSpec> {
    let tokens: Vec<&str> = raw.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    let (legacy, fields) = match tokens.split_first() {
        Some((&"1", rest)) if !rest.is_empty() => (Some(Order::Asc), rest),
        Some((&"-1", rest)) if !rest.is_empty() => (Some(Order::Desc), rest),
        _ => (None, tokens.as_slice()),
    };
    let mut out: Vec<SortSpec> = Vec::with_capacity(fields.len());
    for &tok in fields {
        let spec = match legacy {
            Some(order) => SortSpec { field: tok.to_string(), order },
            None => match tok.strip_prefix('-') {
                Some(f) => SortSpec::desc(f),
                None => SortSpec::asc(tok.strip_prefix('+').unwrap_or(tok)),
            },
        };
        if spec.field.is_empty() || out.iter().any(|s| s.field == spec.field) {
            continue;
        }
        out.push(spec);
    }
    if out.len() > max_fields {
        log::warn!("sort has {} keys; keeping the first {max_fields}", out.len());
        out.truncate(max_fields);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_minus_is_descending() {
        assert_eq!(parse_sort("-price", 8), vec![SortSpec::desc("price")]);
        assert_eq!(
            parse_sort("price, name", 8),
            vec![SortSpec::asc("price"), SortSpec::asc("name")]
        );
        assert_eq!(parse_sort("+price", 8), vec![SortSpec::asc("price")]);
    }

    #[test]
    fn legacy_direction_prefix() {
        assert_eq!(
            parse_sort("-1,price,name", 8),
            vec![SortSpec::desc("price"), SortSpec::desc("name")]
        );
        assert_eq!(parse_sort("1,price", 8), vec![SortSpec::asc("price")]);
        // a lone numeric token is a field name
        assert_eq!(parse_sort("1", 8), vec![SortSpec::asc("1")]);
    }

    #[test]
    fn blanks_duplicates_and_overflow() {
        assert!(parse_sort(" , ,", 8).is_empty());
        assert!(parse_sort("-", 8).is_empty());
        assert_eq!(parse_sort("a,-a,b", 8), vec![SortSpec::asc("a"), SortSpec::asc("b")]);
        assert_eq!(parse_sort("a,b,c", 2).len(), 2);
    }
}

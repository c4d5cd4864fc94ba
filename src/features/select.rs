use crate::document::ID_FIELD;
use crate::errors::DbError;
use crate::query::Projection;

/// Parses a `select` parameter into a projection.
///
/// Fields are separated by commas or spaces; `-field` excludes. Inclusion and exclusion cannot be
/// mixed, except that `-_id` may accompany an inclusion list.
///
/// # Errors
/// Returns `BadRequest` when inclusion and exclusion are mixed.
pub fn parse_select(raw: &str, max_fields: usize) -> Result<Option<Projection>, DbError> {
    let mut include: Vec<String> = Vec::new();
    let mut exclude: Vec<String> = Vec::new();
    for tok in raw.split([',', ' ']).map(str::trim).filter(|t| !t.is_empty()) {
        let (list, field) = match tok.strip_prefix('-') {
            Some(f) => (&mut exclude, f),
            None => (&mut include, tok.strip_prefix('+').unwrap_or(tok)),
        };
        if !field.is_empty() && !list.iter().any(|f| f == field) {
            list.push(field.to_string());
        }
    }
    let drop_id = exclude.iter().any(|f| f == ID_FIELD);
    let projection = match (include.is_empty(), exclude.is_empty()) {
        (true, true) => return Ok(None),
        (false, _) if exclude.iter().all(|f| f == ID_FIELD) => {
            Projection::Include { fields: capped(include, max_fields), keep_id: !drop_id }
        }
        (false, _) => {
            return Err(DbError::bad_request("select cannot mix included and excluded fields"));
        }
        (true, false) => Projection::Exclude { fields: capped(exclude, max_fields) },
    };
    Ok(Some(projection))
}

fn capped(mut fields: Vec<String>, max_fields: usize) -> Vec<String> {
    if fields.len() > max_fields {
        log::warn!("select has {} fields; keeping the first {max_fields}", fields.len());
        fields.truncate(max_fields);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusion_keeps_id() {
        let p = parse_select("name,price", 64).unwrap().unwrap();
        assert_eq!(p, Projection::Include { fields: vec!["name".into(), "price".into()], keep_id: true });
        let p = parse_select("name price -_id", 64).unwrap().unwrap();
        assert_eq!(p, Projection::Include { fields: vec!["name".into(), "price".into()], keep_id: false });
    }

    #[test]
    fn exclusion_list() {
        let p = parse_select("-password,-__v", 64).unwrap().unwrap();
        assert_eq!(p, Projection::Exclude { fields: vec!["password".into(), "__v".into()] });
    }

    #[test]
    fn mixing_is_bad_request() {
        assert!(parse_select("name,-password", 64).unwrap_err().is_bad_request());
    }

    #[test]
    fn blank_select_is_no_projection() {
        assert_eq!(parse_select(" , ", 64).unwrap(), None);
    }

    #[test]
    fn overflow_is_truncated() {
        let p = parse_select("a,b,c", 2).unwrap().unwrap();
        assert_eq!(p, Projection::Include { fields: vec!["a".into(), "b".into()], keep_id: true });
    }
}

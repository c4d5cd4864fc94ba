use serde::{Deserialize, Serialize};

/// Resolved page window for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl PaginationState {
    /// Resolves raw `page`/`limit` values. Anything that is not a positive integer falls back to
    /// the default; `limit` is capped at `max_limit`.
    #[must_use]
    pub fn resolve(page: Option<&str>, limit: Option<&str>, default_limit: u64, max_limit: u64) -> Self {
        let page = positive(page).unwrap_or(1);
        let mut limit = positive(limit).unwrap_or(default_limit).max(1);
        if limit > max_limit {
            log::warn!("limit {limit} exceeds max {max_limit}; capping");
            limit = max_limit.max(1);
        }
        Self { page, limit, skip: (page - 1).saturating_mul(limit) }
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

/// Count metadata returned next to every page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub total_records: u64,
    pub total_pages: u64,
    pub per_page: u64,
    pub current_page: u64,
}

impl PageMetadata {
    #[must_use]
    pub fn compute(total_records: u64, pagination: &PaginationState) -> Self {
        let limit = pagination.limit.max(1);
        Self {
            total_records,
            total_pages: total_records.div_ceil(limit),
            per_page: limit,
            current_page: pagination.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent_or_invalid() {
        let d = PaginationState::resolve(None, None, 100, 10_000);
        assert_eq!(d, PaginationState { page: 1, limit: 100, skip: 0 });
        for bad in ["0", "-2", "abc", "2.5", ""] {
            let p = PaginationState::resolve(Some(bad), Some(bad), 100, 10_000);
            assert_eq!((p.page, p.limit), (1, 100), "input {bad:?}");
        }
    }

    #[test]
    fn skip_is_page_minus_one_times_limit() {
        let p = PaginationState::resolve(Some("3"), Some("25"), 100, 10_000);
        assert_eq!(p, PaginationState { page: 3, limit: 25, skip: 50 });
    }

    #[test]
    fn limit_capped_at_max() {
        let p = PaginationState::resolve(None, Some("50000"), 100, 10_000);
        assert_eq!(p.limit, 10_000);
    }

    #[test]
    fn huge_page_saturates() {
        let p = PaginationState::resolve(Some(u64::MAX.to_string().as_str()), Some("100"), 100, 10_000);
        assert_eq!(p.skip, u64::MAX);
    }

    #[test]
    fn metadata_rounds_pages_up() {
        let p = PaginationState::resolve(None, None, 100, 10_000);
        assert_eq!(PageMetadata::compute(101, &p).total_pages, 2);
        assert_eq!(PageMetadata::compute(100, &p).total_pages, 1);
        let z = PageMetadata::compute(0, &p);
        assert_eq!((z.total_records, z.total_pages, z.per_page, z.current_page), (0, 0, 100, 1));
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let p = PaginationState::resolve(Some("2"), Some("10"), 100, 10_000);
        let v = serde_json::to_value(PageMetadata::compute(250, &p)).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"totalRecords": 250, "totalPages": 25, "perPage": 10, "currentPage": 2})
        );
    }
}

use crate::collection::Collection;
use crate::document::Document;
use crate::utils::num::{millis_u64, usize_to_u64};

use super::eval::{apply_projection, compare_docs, eval_filter};
use super::types::{Filter, FindOptions, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Projection};

/// Filter, sort, paginate and project one collection. Population is the store's job.
#[must_use]
pub fn find_docs(col: &Collection, filter: &Filter, opts: &FindOptions) -> Vec<Document> {
    let bench_start = std::time::Instant::now();
    let mut docs: Vec<Document> = Vec::new();
    col.for_each(|d| {
        if eval_filter(&d.data, filter) {
            docs.push(d.clone());
        }
    });
    let matched = docs.len();

    if let Some(sort) = &opts.sort {
        if sort.len() > MAX_SORT_FIELDS {
            log::warn!("sort has {} keys; only the first {MAX_SORT_FIELDS} apply", sort.len());
        }
        // stable: ties keep natural order
        docs.sort_by(|a, b| compare_docs(&a.data, &b.data, sort));
    }

    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX);
    let mut docs: Vec<Document> = docs.into_iter().skip(skip).take(limit).collect();

    if let Some(projection) = &opts.projection {
        let projection = capped(projection);
        for d in &mut docs {
            d.data = apply_projection(&d.data, &projection);
        }
    }

    crate::dev6!(
        "{{\"bench\":\"query\",\"op\":\"find\",\"collection\":\"{}\",\"duration_ms\":{},\"matched\":{},\"result_count\":{},\"limit\":{},\"skip\":{}}}",
        col.name(),
        millis_u64(bench_start.elapsed()),
        usize_to_u64(matched),
        usize_to_u64(docs.len()),
        usize_to_u64(opts.limit.unwrap_or(0)),
        usize_to_u64(skip)
    );
    docs
}

#[must_use]
pub fn count_docs(col: &Collection, filter: &Filter) -> u64 {
    let start = std::time::Instant::now();
    let mut n = 0u64;
    col.for_each(|d| {
        if eval_filter(&d.data, filter) {
            n += 1;
        }
    });
    crate::dev6!(
        "{{\"bench\":\"query\",\"op\":\"count\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{}}}",
        col.name(),
        millis_u64(start.elapsed()),
        n
    );
    n
}

fn capped(p: &Projection) -> Projection {
    match p {
        Projection::Include { fields, keep_id } => Projection::Include {
            fields: fields.iter().take(MAX_PROJECTION_FIELDS).cloned().collect(),
            keep_id: *keep_id,
        },
        Projection::Exclude { fields } => {
            Projection::Exclude { fields: fields.iter().take(MAX_PROJECTION_FIELDS).cloned().collect() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CmpOp, Order, SortSpec};
    use bson::doc;

    fn seeded() -> Collection {
        let col = Collection::new("u_find");
        col.insert(doc! {"k": 1, "v": 3, "x": 0}).unwrap();
        col.insert(doc! {"k": 2, "v": 1, "x": 0}).unwrap();
        col.insert(doc! {"k": 3, "v": 2, "x": 0}).unwrap();
        col.insert(doc! {"k": 4, "v": 2, "x": 1}).unwrap();
        col
    }

    #[test]
    fn find_docs_projection_sort_and_pagination() {
        let col = seeded();
        let filter = Filter::Cmp { path: "x".into(), op: CmpOp::Eq, value: bson::Bson::Int32(0) };
        let opts = FindOptions {
            projection: Some(Projection::Include { fields: vec!["k".into()], keep_id: false }),
            sort: Some(vec![SortSpec { field: "v".into(), order: Order::Asc }]),
            limit: Some(2),
            ..FindOptions::default()
        };
        let docs = find_docs(&col, &filter, &opts);
        assert_eq!(docs.len(), 2);
        assert!(docs[0].data.get("v").is_none());
        assert_eq!(docs[0].data.get_i32("k").unwrap(), 2);
        assert_eq!(docs[1].data.get_i32("k").unwrap(), 3);
    }

    #[test]
    fn skip_past_end_is_empty() {
        let col = seeded();
        let opts = FindOptions { skip: Some(usize::MAX / 2), limit: Some(50), ..FindOptions::default() };
        assert!(find_docs(&col, &Filter::True, &opts).is_empty());
    }

    #[test]
    fn count_ignores_pagination() {
        let col = seeded();
        assert_eq!(count_docs(&col, &Filter::eq("x", 0)), 3);
        assert_eq!(count_docs(&col, &Filter::True), 4);
    }

    #[test]
    fn bench_lines_are_emitted() {
        let _g = crate::utils::devlog::enable_thread_sink();
        let col = seeded();
        let _ = find_docs(&col, &Filter::True, &FindOptions::default());
        let _ = count_docs(&col, &Filter::True);
        let lines = crate::utils::devlog::drain();
        assert!(lines.iter().any(|l| l.contains("\"op\":\"find\"") && l.contains("\"result_count\":4")));
        assert!(lines.iter().any(|l| l.contains("\"op\":\"count\"")));
    }
}

use bson::doc;
use docquery::DocumentStore;
use docquery::config::QueryConfig;
use docquery::document::Document;
use docquery::engine::Engine;
use docquery::errors::DbError;
use docquery::features::{QueryDescriptor, QueryTranslator};
use docquery::query::{Filter, FindOptions};
use std::sync::atomic::{AtomicU64, Ordering};

/// Delegates to an `Engine`, inserting one matching document right after every count.
struct WriteAfterCount {
    inner: Engine,
    counts: AtomicU64,
}

impl DocumentStore for WriteAfterCount {
    async fn find(&self, collection: &str, filter: &Filter, opts: &FindOptions) -> Result<Vec<Document>, DbError> {
        self.inner.find(collection, filter, opts).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, DbError> {
        let n = self.inner.count(collection, filter).await?;
        let seq = self.counts.fetch_add(1, Ordering::SeqCst);
        if let Some(col) = self.inner.get_collection(collection) {
            col.insert(doc! {"name": format!("late{seq}"), "status": "active"})?;
        }
        Ok(n)
    }
}

fn skewed_store(active: i32) -> WriteAfterCount {
    let inner = Engine::new();
    let col = inner.create_collection("products");
    for i in 0..active {
        col.insert(doc! {"name": format!("p{i}"), "status": "active"}).unwrap();
    }
    col.insert(doc! {"name": "old", "status": "archived"}).unwrap();
    WriteAfterCount { inner, counts: AtomicU64::new(0) }
}

#[tokio::test]
async fn insert_between_count_and_find_shows_in_records_but_not_total() {
    let store = skewed_store(3);
    let cfg = QueryConfig::default();
    let rs = QueryTranslator::new(&store, &cfg)
        .execute("products", &QueryDescriptor::from_query_string("status=active"), None)
        .await
        .unwrap();
    assert_eq!(rs.metadata.total_records, 3);
    assert_eq!(rs.metadata.total_pages, 1);
    assert_eq!(rs.len(), 4);
    assert_ne!(rs.metadata.total_records, rs.len() as u64);
    assert_eq!(rs.records[3].data.get_str("name").unwrap(), "late0");
}

#[tokio::test]
async fn each_request_counts_before_it_finds() {
    let store = skewed_store(2);
    let cfg = QueryConfig::default();
    let translator = QueryTranslator::new(&store, &cfg);
    let d = QueryDescriptor::from_query_string("status=active");

    let first = translator.execute("products", &d, None).await.unwrap();
    let second = translator.execute("products", &d, None).await.unwrap();
    assert_eq!((first.metadata.total_records, first.len()), (2, 3));
    assert_eq!((second.metadata.total_records, second.len()), (3, 4));
    assert_eq!(store.counts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_collection_fails_before_any_write() {
    let store = skewed_store(1);
    let cfg = QueryConfig::default();
    let e = QueryTranslator::new(&store, &cfg)
        .execute("nope", &QueryDescriptor::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(e, DbError::NoSuchCollection(_)));
    assert_eq!(store.inner.get_collection("products").unwrap().len(), 2);
}

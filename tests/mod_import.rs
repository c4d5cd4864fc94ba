use docquery::Database;
use docquery::import::{ImportOptions, import_file};

#[tokio::test]
async fn imported_fixtures_are_queryable() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("products.ndjson");
    let lines = (0..30).map(|i| format!("{{\"name\":\"p{i}\",\"price\":{i}.5,\"tags\":[\"t{}\"]}}", i % 3)).collect::<Vec<_>>();
    std::fs::write(&p, lines.join("\n")).unwrap();

    let db = Database::new().unwrap();
    let col = db.create_collection("products");
    let report = import_file(&col, &p, &ImportOptions::default()).unwrap();
    assert_eq!(report.inserted, 30);

    let d = docquery::QueryDescriptor::from_query_string("tags=t1&price[gte]=10&sort=-price&limit=3");
    let rs = db.query("products", &d, None).await.unwrap();
    // t1 with price >= 10: 10,13,...,28 -> 7 docs
    assert_eq!(rs.metadata.total_records, 7);
    let prices: Vec<f64> = rs.records.iter().map(|r| r.data.get_f64("price").unwrap()).collect();
    assert_eq!(prices, vec![28.5, 25.5, 22.5]);
}

#![cfg(test)]

use bson::doc;

use crate::engine::Engine;
use crate::types::DocumentId;

/// `n` products with `price = i`, `category` cycling a/b/c and `status` active for even `i`.
pub fn seeded_products(engine: &Engine, n: i32) -> Vec<DocumentId> {
    let col = engine.create_collection("products");
    let cats = ["a", "b", "c"];
    (0..n)
        .map(|i| {
            let status = if i % 2 == 0 { "active" } else { "archived" };
            let cat = cats[usize::try_from(i).unwrap_or(0) % cats.len()];
            col.insert(doc! {"name": format!("p{i}"), "price": i, "category": cat, "status": status})
                .unwrap()
        })
        .collect()
}

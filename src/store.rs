//! The collection abstraction the query translator talks to.
//!
//! Any backend that can filter, project, sort, skip/limit, expand one relation level and count
//! matches over a named collection can serve list endpoints. Every call is a suspension point;
//! implementations own their own timeouts and cancellation.

use crate::document::Document;
use crate::errors::DbError;
use crate::query::{Filter, FindOptions};
use std::future::Future;

pub trait DocumentStore: Send + Sync {
    /// Matching documents after sort, skip/limit, projection and population.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        opts: &FindOptions,
    ) -> impl Future<Output = Result<Vec<Document>, DbError>> + Send;

    /// Number of documents matching `filter`, independent of any pagination.
    fn count(&self, collection: &str, filter: &Filter) -> impl Future<Output = Result<u64, DbError>> + Send;
}
